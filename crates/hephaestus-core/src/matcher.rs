//! Material matchers: the predicate algebra recipes use to describe which
//! held materials can fill an input slot, and what an output slot produces.
//!
//! A matcher is one of four kinds, ranked by how selective it is:
//!
//! | kind                | matches when                                   | specificity |
//! |---------------------|------------------------------------------------|-------------|
//! | [`MatcherKind::Id`] | the material id is exactly the one named       | 1000        |
//! | `AllOfCategories`   | the material belongs to every listed category  | 200         |
//! | `AnyOfCategories`   | the material belongs to at least one category  | 100         |
//! | `Any`               | always                                         | 0           |
//!
//! Equality and hashing go through [`MaterialMatcher::key`], so two matchers
//! that accept the same materials are interchangeable as map keys regardless
//! of their quantity.

use crate::id::MaterialId;
use crate::registry::Catalog;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

/// The kind of matching a [`MaterialMatcher`] performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum MatcherKind {
    Id,
    AnyOfCategories,
    AllOfCategories,
    Any,
}

impl MatcherKind {
    /// Fixed selectivity ranking used to break ties between recipes.
    pub fn specificity_score(self) -> u32 {
        match self {
            MatcherKind::Id => 1000,
            MatcherKind::AllOfCategories => 200,
            MatcherKind::AnyOfCategories => 100,
            MatcherKind::Any => 0,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MatcherError {
    #[error("material id cannot be blank")]
    BlankId,
    #[error("quantity must be positive, got {0}")]
    NonPositiveQuantity(u32),
    #[error("category set cannot be empty")]
    EmptyCategories,
    #[error("category key cannot be blank")]
    BlankCategory,
}

/// What the matcher tests against. Exactly one target per kind, so a
/// matcher can never carry both an id and a category set.
#[derive(Debug, Clone)]
enum Target {
    Any,
    Id(MaterialId),
    AnyOf(BTreeSet<String>),
    AllOf(BTreeSet<String>),
}

/// An immutable predicate over a material identity plus a quantity.
///
/// For recipe inputs the quantity is the minimum required amount, for outputs
/// it is the produced amount. Always positive.
#[derive(Debug, Clone)]
pub struct MaterialMatcher {
    target: Target,
    quantity: u32,
}

impl MaterialMatcher {
    fn new(target: Target, quantity: u32) -> Result<Self, MatcherError> {
        if quantity == 0 {
            return Err(MatcherError::NonPositiveQuantity(quantity));
        }
        Ok(Self { target, quantity })
    }

    /// Matches any material, quantity 1.
    pub fn any() -> Self {
        Self {
            target: Target::Any,
            quantity: 1,
        }
    }

    pub fn any_qty(quantity: u32) -> Result<Self, MatcherError> {
        Self::new(Target::Any, quantity)
    }

    /// Matches exactly one material identity, quantity 1.
    pub fn id(material_id: impl Into<MaterialId>) -> Result<Self, MatcherError> {
        Self::id_qty(material_id, 1)
    }

    pub fn id_qty(material_id: impl Into<MaterialId>, quantity: u32) -> Result<Self, MatcherError> {
        let material_id = material_id.into();
        if material_id.is_blank() {
            return Err(MatcherError::BlankId);
        }
        Self::new(Target::Id(material_id), quantity)
    }

    /// Matches a material belonging to at least one of `categories`.
    pub fn any_of_categories<I, S>(categories: I) -> Result<Self, MatcherError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::any_of_categories_qty(categories, 1)
    }

    pub fn any_of_categories_qty<I, S>(categories: I, quantity: u32) -> Result<Self, MatcherError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Target::AnyOf(category_keys(categories)?), quantity)
    }

    /// Matches a material belonging to every one of `categories`.
    pub fn all_of_categories<I, S>(categories: I) -> Result<Self, MatcherError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::all_of_categories_qty(categories, 1)
    }

    pub fn all_of_categories_qty<I, S>(categories: I, quantity: u32) -> Result<Self, MatcherError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Target::AllOf(category_keys(categories)?), quantity)
    }

    pub fn kind(&self) -> MatcherKind {
        match self.target {
            Target::Any => MatcherKind::Any,
            Target::Id(_) => MatcherKind::Id,
            Target::AnyOf(_) => MatcherKind::AnyOfCategories,
            Target::AllOf(_) => MatcherKind::AllOfCategories,
        }
    }

    /// The material id, present only for [`MatcherKind::Id`].
    pub fn material_id(&self) -> Option<&MaterialId> {
        match &self.target {
            Target::Id(id) => Some(id),
            _ => None,
        }
    }

    /// The sorted category keys, present only for the category kinds.
    pub fn category_keys(&self) -> Option<&BTreeSet<String>> {
        match &self.target {
            Target::AnyOf(keys) | Target::AllOf(keys) => Some(keys),
            _ => None,
        }
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn specificity_score(&self) -> u32 {
        self.kind().specificity_score()
    }

    /// Whether `material_id` satisfies this matcher. Category kinds look the
    /// material's categories up in `catalog`; an unknown material has none.
    pub fn matches(&self, material_id: &MaterialId, catalog: &Catalog<'_>) -> bool {
        match &self.target {
            Target::Any => true,
            Target::Id(id) => id == material_id,
            Target::AnyOf(keys) => catalog
                .material_category_keys(material_id)
                .is_some_and(|cats| !cats.is_disjoint(keys)),
            Target::AllOf(keys) => catalog
                .material_category_keys(material_id)
                .is_some_and(|cats| keys.is_subset(cats)),
        }
    }

    /// Canonical key: kind discriminant plus id or sorted category set.
    pub fn key(&self) -> String {
        match &self.target {
            Target::Any => "ANY".to_string(),
            Target::Id(id) => format!("ID:{id}"),
            Target::AnyOf(keys) => format!("CAT_ANY:[{}]", join_keys(keys)),
            Target::AllOf(keys) => format!("CAT_ALL:[{}]", join_keys(keys)),
        }
    }
}

fn category_keys<I, S>(categories: I) -> Result<BTreeSet<String>, MatcherError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut keys = BTreeSet::new();
    for key in categories {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(MatcherError::BlankCategory);
        }
        keys.insert(key);
    }
    if keys.is_empty() {
        return Err(MatcherError::EmptyCategories);
    }
    Ok(keys)
}

fn join_keys(keys: &BTreeSet<String>) -> String {
    keys.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

impl PartialEq for MaterialMatcher {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for MaterialMatcher {}

impl Hash for MaterialMatcher {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for MaterialMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use std::collections::{HashMap, HashSet};

    #[test]
    fn any_matches_everything() {
        let data = sample_data();
        let catalog = data.catalog();
        let m = MaterialMatcher::any();
        assert!(m.matches(&iron_ore(), &catalog));
        assert!(m.matches(&MaterialId::from("unregistered"), &catalog));
        assert_eq!(m.quantity(), 1);
    }

    #[test]
    fn id_matches_only_exact_identity() {
        let data = sample_data();
        let catalog = data.catalog();
        let m = MaterialMatcher::id_qty("iron_ore", 3).unwrap();
        assert!(m.matches(&iron_ore(), &catalog));
        assert!(!m.matches(&coal(), &catalog));
        assert!(!m.matches(&iron_ingot(), &catalog));
        assert_eq!(m.quantity(), 3);
        assert_eq!(m.material_id(), Some(&iron_ore()));
        assert!(m.category_keys().is_none());
    }

    #[test]
    fn any_of_categories_needs_one_shared_category() {
        let data = sample_data();
        let catalog = data.catalog();
        let m = MaterialMatcher::any_of_categories(["fuel", "metal"]).unwrap();
        assert!(m.matches(&coal(), &catalog));
        assert!(m.matches(&iron_ingot(), &catalog));
        assert!(!m.matches(&sand(), &catalog));
    }

    #[test]
    fn all_of_categories_needs_every_category() {
        let data = sample_data();
        let catalog = data.catalog();
        let m = MaterialMatcher::all_of_categories(["fuel", "mineral"]).unwrap();
        assert!(m.matches(&coal(), &catalog));
        assert!(!m.matches(&charcoal(), &catalog));
        assert!(!m.matches(&iron_ore(), &catalog));
    }

    #[test]
    fn unknown_material_has_no_categories() {
        let data = sample_data();
        let catalog = data.catalog();
        let ghost = MaterialId::from("ghost");
        assert!(!MaterialMatcher::any_of_categories(["fuel"]).unwrap().matches(&ghost, &catalog));
        assert!(!MaterialMatcher::all_of_categories(["fuel"]).unwrap().matches(&ghost, &catalog));
    }

    // -----------------------------------------------------------------------
    // Construction errors
    // -----------------------------------------------------------------------

    #[test]
    fn blank_id_is_rejected() {
        assert_eq!(MaterialMatcher::id("").unwrap_err(), MatcherError::BlankId);
        assert_eq!(MaterialMatcher::id_qty("   ", 2).unwrap_err(), MatcherError::BlankId);
    }

    #[test]
    fn zero_quantity_is_rejected() {
        assert_eq!(
            MaterialMatcher::any_qty(0).unwrap_err(),
            MatcherError::NonPositiveQuantity(0)
        );
        assert!(MaterialMatcher::id_qty("ore", 0).is_err());
        assert!(MaterialMatcher::any_of_categories_qty(["fuel"], 0).is_err());
        assert!(MaterialMatcher::all_of_categories_qty(["fuel"], 0).is_err());
    }

    #[test]
    fn empty_category_set_is_rejected() {
        let none: [&str; 0] = [];
        assert_eq!(
            MaterialMatcher::any_of_categories(none).unwrap_err(),
            MatcherError::EmptyCategories
        );
        assert_eq!(
            MaterialMatcher::all_of_categories_qty(Vec::<String>::new(), 4).unwrap_err(),
            MatcherError::EmptyCategories
        );
    }

    #[test]
    fn blank_category_key_is_rejected() {
        assert_eq!(
            MaterialMatcher::any_of_categories(["fuel", " "]).unwrap_err(),
            MatcherError::BlankCategory
        );
    }

    // -----------------------------------------------------------------------
    // Specificity and keys
    // -----------------------------------------------------------------------

    #[test]
    fn specificity_is_strictly_ordered_by_kind() {
        let id = MaterialMatcher::id("coal").unwrap();
        let all = MaterialMatcher::all_of_categories(["fuel"]).unwrap();
        let any_of = MaterialMatcher::any_of_categories(["fuel"]).unwrap();
        let any = MaterialMatcher::any();
        assert_eq!(id.specificity_score(), 1000);
        assert_eq!(all.specificity_score(), 200);
        assert_eq!(any_of.specificity_score(), 100);
        assert_eq!(any.specificity_score(), 0);
        assert!(id.specificity_score() > all.specificity_score());
        assert!(all.specificity_score() > any_of.specificity_score());
        assert!(any_of.specificity_score() > any.specificity_score());
    }

    #[test]
    fn keys_are_canonical() {
        assert_eq!(MaterialMatcher::any().key(), "ANY");
        assert_eq!(MaterialMatcher::id("coal").unwrap().key(), "ID:coal");
        assert_eq!(
            MaterialMatcher::any_of_categories(["metal", "fuel"]).unwrap().key(),
            "CAT_ANY:[fuel, metal]"
        );
        assert_eq!(
            MaterialMatcher::all_of_categories(["metal"]).unwrap().to_string(),
            "CAT_ALL:[metal]"
        );
    }

    #[test]
    fn equality_ignores_quantity_and_category_order() {
        let a = MaterialMatcher::any_of_categories_qty(["fuel", "metal"], 1).unwrap();
        let b = MaterialMatcher::any_of_categories_qty(["metal", "fuel", "fuel"], 5).unwrap();
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(!set.insert(b));
    }

    #[test]
    fn matchers_differing_in_kind_or_content_are_distinct() {
        let any_of = MaterialMatcher::any_of_categories(["fuel"]).unwrap();
        let all_of = MaterialMatcher::all_of_categories(["fuel"]).unwrap();
        let other = MaterialMatcher::any_of_categories(["metal"]).unwrap();
        assert_ne!(any_of, all_of);
        assert_ne!(any_of, other);
        assert_ne!(
            MaterialMatcher::id("coal").unwrap(),
            MaterialMatcher::id("charcoal").unwrap()
        );
    }

    #[test]
    fn matchers_work_as_map_keys() {
        let mut demand: HashMap<MaterialMatcher, u32> = HashMap::new();
        *demand.entry(MaterialMatcher::id_qty("coal", 2).unwrap()).or_default() += 2;
        *demand.entry(MaterialMatcher::id_qty("coal", 7).unwrap()).or_default() += 7;
        assert_eq!(demand.len(), 1);
        assert_eq!(demand[&MaterialMatcher::id("coal").unwrap()], 9);
    }
}
