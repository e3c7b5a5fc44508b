//! Recipe selectors: which factories a recipe may run in, and the ranking
//! contract used to pick among several eligible recipes.

use crate::id::FactoryId;
use crate::recipe::{ProcessContext, ProcessRecipe};
use crate::registry::Catalog;
use std::cmp::Reverse;
use std::collections::BTreeSet;

/// Descriptor a factory kind declares: the groups it belongs to and its tier.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FactoryMeta {
    #[serde(default)]
    pub groups: BTreeSet<String>,
    #[serde(default)]
    pub level: u32,
}

impl FactoryMeta {
    pub fn new(level: u32) -> Self {
        Self {
            groups: BTreeSet::new(),
            level,
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.groups.insert(group.into());
        self
    }
}

/// Opaque lookup key attached to a recipe at registration.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipeSelector {
    /// Runs only in the factory registered under this id.
    Factory(FactoryId),
    /// Runs in any factory of `group` whose level is at least `min_level`.
    Group {
        group: String,
        #[serde(default)]
        min_level: u32,
    },
}

impl RecipeSelector {
    pub fn factory(id: impl Into<FactoryId>) -> Self {
        RecipeSelector::Factory(id.into())
    }

    pub fn group(group: impl Into<String>, min_level: u32) -> Self {
        RecipeSelector::Group {
            group: group.into(),
            min_level,
        }
    }

    pub fn accepts(&self, factory: &FactoryId, meta: &FactoryMeta) -> bool {
        match self {
            RecipeSelector::Factory(id) => id == factory,
            RecipeSelector::Group { group, min_level } => {
                meta.groups.contains(group) && meta.level >= *min_level
            }
        }
    }
}

/// Filters `candidates` to those that can start on `context` and orders them
/// best first: higher priority, then higher specificity, then recipe id.
pub fn rank_candidates<'r>(
    candidates: impl IntoIterator<Item = &'r dyn ProcessRecipe>,
    context: &dyn ProcessContext,
    catalog: &Catalog<'_>,
) -> Vec<&'r dyn ProcessRecipe> {
    let mut eligible: Vec<&dyn ProcessRecipe> = candidates
        .into_iter()
        .filter(|r| r.can_start(context, catalog))
        .collect();
    eligible.sort_by_key(|r| (Reverse(r.priority()), Reverse(r.specificity_score()), r.id().clone()));
    eligible
}
