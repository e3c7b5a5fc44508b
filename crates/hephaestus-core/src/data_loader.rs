//! Data-driven world loading from JSON, RON or TOML.
//!
//! Feature-gated behind `data-loader`. A definitions file lists materials
//! and recipes; [`WorldData::register_into`] validates every entry through
//! the same constructors code would use and registers them.

use crate::id::MaterialId;
use crate::material::Material;
use crate::matcher::{MaterialMatcher, MatcherError};
use crate::recipe::{RecipeDraft, RecipeError, TimeWindow};
use crate::registry::{HephaestusData, RegistryError};
use crate::selector::RecipeSelector;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },
    #[error("parse error in {source_name}: {detail}")]
    Parse { source_name: String, detail: String },
    #[error("invalid matcher in recipe '{recipe}': {source}")]
    Matcher {
        recipe: String,
        #[source]
        source: MatcherError,
    },
    #[error("invalid recipe '{recipe}': {source}")]
    Recipe {
        recipe: String,
        #[source]
        source: RecipeError,
    },
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Format detection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Ron,
    Toml,
}

pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => Ok(Format::Json),
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ---------------------------------------------------------------------------
// On-disk structures
// ---------------------------------------------------------------------------

/// Top-level definitions file.
#[derive(Debug, Default, Deserialize)]
pub struct WorldData {
    #[serde(default)]
    pub materials: Vec<MaterialData>,
    #[serde(default)]
    pub recipes: Vec<RecipeData>,
}

#[derive(Debug, Deserialize)]
pub struct MaterialData {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub categories: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecipeData {
    pub id: String,
    pub selector: SelectorData,
    #[serde(default)]
    pub ordered: bool,
    #[serde(default)]
    pub inputs: Vec<MatcherData>,
    #[serde(default)]
    pub outputs: Vec<MatcherData>,
    #[serde(default)]
    pub window: Option<WindowData>,
    #[serde(default)]
    pub priority: Option<i32>,
}

/// A selector, written as `{ factory = "bench" }` or
/// `{ group = "furnace", min_level = 2 }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SelectorData {
    Factory(FactorySelectorData),
    Group(GroupSelectorData),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FactorySelectorData {
    pub factory: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupSelectorData {
    pub group: String,
    #[serde(default)]
    pub min_level: u32,
}

/// A matcher, written as `{ id = "ore", quantity = 2 }`,
/// `{ any_of = ["fuel"] }`, `{ all_of = [...] }` or `{ any = 1 }`.
/// Each form takes only its own keys, so mixed forms are rejected.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum MatcherData {
    Id(IdMatcherData),
    AnyOf(AnyOfMatcherData),
    AllOf(AllOfMatcherData),
    Any(AnyMatcherData),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdMatcherData {
    pub id: String,
    #[serde(default = "one")]
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnyOfMatcherData {
    pub any_of: Vec<String>,
    #[serde(default = "one")]
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AllOfMatcherData {
    pub all_of: Vec<String>,
    #[serde(default = "one")]
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnyMatcherData {
    pub any: u32,
}

fn one() -> u32 {
    1
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct WindowData {
    pub min: f32,
    pub max: f32,
}

// ---------------------------------------------------------------------------
// Conversion
// ---------------------------------------------------------------------------

impl SelectorData {
    fn to_selector(&self) -> RecipeSelector {
        match self {
            SelectorData::Factory(f) => RecipeSelector::factory(f.factory.as_str()),
            SelectorData::Group(g) => RecipeSelector::group(g.group.as_str(), g.min_level),
        }
    }
}

impl MatcherData {
    fn to_matcher(&self) -> Result<MaterialMatcher, MatcherError> {
        match self {
            MatcherData::Id(m) => MaterialMatcher::id_qty(m.id.as_str(), m.quantity),
            MatcherData::AnyOf(m) => MaterialMatcher::any_of_categories_qty(m.any_of.iter().cloned(), m.quantity),
            MatcherData::AllOf(m) => MaterialMatcher::all_of_categories_qty(m.all_of.iter().cloned(), m.quantity),
            MatcherData::Any(m) => MaterialMatcher::any_qty(m.any),
        }
    }
}

fn matchers(recipe: &str, data: &[MatcherData]) -> Result<Vec<MaterialMatcher>, DataLoadError> {
    data.iter()
        .map(|m| {
            m.to_matcher().map_err(|source| DataLoadError::Matcher {
                recipe: recipe.to_string(),
                source,
            })
        })
        .collect()
}

impl WorldData {
    /// Validates and registers every material, then every recipe.
    pub fn register_into(self, data: &mut HephaestusData) -> Result<(), DataLoadError> {
        let material_count = self.materials.len();
        let recipe_count = self.recipes.len();

        for m in self.materials {
            let material = Material::new(m.name).with_categories(m.categories);
            data.register_material(MaterialId::new(m.id), material)?;
        }

        for r in self.recipes {
            let recipe_err = |source: RecipeError| DataLoadError::Recipe {
                recipe: r.id.clone(),
                source,
            };
            let inputs = matchers(&r.id, &r.inputs)?;
            let outputs = matchers(&r.id, &r.outputs)?;
            let window = r
                .window
                .map(|w| TimeWindow::new(w.min, w.max))
                .transpose()
                .map_err(recipe_err)?;
            let mut draft = RecipeDraft::new(r.ordered, &inputs, &outputs, window);
            if let Some(priority) = r.priority {
                draft = draft.with_priority(priority);
            }
            let recipe = draft
                .register_meta(r.id.as_str(), r.selector.to_selector())
                .map_err(recipe_err)?;
            debug!(recipe = %r.id, inputs = inputs.len(), outputs = outputs.len(), "Loaded recipe");
            data.register_recipe(recipe)?;
        }

        info!(materials = material_count, recipes = recipe_count, "World data loaded");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Loading functions
// ---------------------------------------------------------------------------

/// Parses definitions from a string in the given format.
pub fn parse_world(content: &str, format: Format, source_name: &str) -> Result<WorldData, DataLoadError> {
    let parse_err = |detail: String| DataLoadError::Parse {
        source_name: source_name.to_string(),
        detail,
    };
    match format {
        Format::Json => serde_json::from_str(content).map_err(|e| parse_err(e.to_string())),
        Format::Ron => ron::from_str(content).map_err(|e| parse_err(e.to_string())),
        Format::Toml => toml::from_str(content).map_err(|e| parse_err(e.to_string())),
    }
}

/// Reads a definitions file, detecting the format from its extension.
pub fn read_world_file(path: &Path) -> Result<WorldData, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    parse_world(&content, format, &path.display().to_string())
}

/// Reads a definitions file into a fresh registry.
pub fn load_world_file(path: &Path) -> Result<HephaestusData, DataLoadError> {
    let mut data = HephaestusData::new();
    read_world_file(path)?.register_into(&mut data)?;
    Ok(data)
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::RecipeId;
    use crate::matcher::MatcherKind;
    use crate::test_utils::held;

    const FORGE_JSON: &str = r#"{
        "materials": [
            { "id": "iron_ore", "name": "Iron Ore", "categories": ["ore"] },
            { "id": "coal", "name": "Coal", "categories": ["fuel", "mineral"] },
            { "id": "iron_ingot", "name": "Iron Ingot", "categories": ["metal"] }
        ],
        "recipes": [
            {
                "id": "smelt_iron",
                "selector": { "group": "furnace", "min_level": 1 },
                "inputs": [ { "id": "iron_ore", "quantity": 2 }, { "any_of": ["fuel"] } ],
                "outputs": [ { "id": "iron_ingot" } ],
                "window": { "min": 10.0, "max": 20.0 },
                "priority": 120
            },
            {
                "id": "burn_anything",
                "selector": { "factory": "incinerator" },
                "inputs": [ { "any": 1 } ]
            }
        ]
    }"#;

    fn load(content: &str, format: Format) -> Result<HephaestusData, DataLoadError> {
        let mut data = HephaestusData::new();
        parse_world(content, format, "inline")?.register_into(&mut data)?;
        Ok(data)
    }

    #[test]
    fn load_json_world() {
        let data = load(FORGE_JSON, Format::Json).unwrap();
        assert_eq!(data.material_count(), 3);
        assert_eq!(data.recipe_count(), 2);

        let catalog = data.catalog();
        let smelt = catalog.recipe(&RecipeId::from("smelt_iron")).unwrap();
        assert_eq!(smelt.priority(), 120);
        assert_eq!(smelt.cost(), &[2, 1]);
        assert_eq!(smelt.inputs()[1].kind(), MatcherKind::AnyOfCategories);
        assert_eq!(smelt.time_window().unwrap().min(), 10.0);
        assert_eq!(smelt.selector(), &RecipeSelector::group("furnace", 1));
        assert!(smelt.can_start(&held(&["coal", "iron_ore"]), &catalog));

        let burn = catalog.recipe(&RecipeId::from("burn_anything")).unwrap();
        assert_eq!(burn.priority(), 100);
        assert!(burn.time_window().is_none());
        assert_eq!(burn.selector(), &RecipeSelector::factory("incinerator"));
    }

    #[test]
    fn load_toml_world() {
        let toml = r#"
            [[materials]]
            id = "wood"
            name = "Wood"
            categories = ["fuel", "organic"]

            [[materials]]
            id = "charcoal"
            name = "Charcoal"
            categories = ["fuel"]

            [[recipes]]
            id = "char_wood"
            selector = { group = "charcoal" }
            inputs = [{ all_of = ["fuel", "organic"], quantity = 4 }]
            outputs = [{ id = "charcoal", quantity = 2 }]
            window = { min = 30.0, max = 60.0 }
        "#;
        let data = load(toml, Format::Toml).unwrap();
        let catalog = data.catalog();
        let recipe = catalog.recipe(&RecipeId::from("char_wood")).unwrap();
        assert_eq!(recipe.cost(), &[4]);
        assert_eq!(recipe.outputs()[0].quantity(), 2);
        assert_eq!(recipe.selector(), &RecipeSelector::group("charcoal", 0));
        assert!(recipe.can_start(&held(&["wood"]), &catalog));
        assert!(!recipe.can_start(&held(&["charcoal"]), &catalog));
    }

    #[test]
    fn load_ron_world() {
        let ron = r#"(
            materials: [
                (id: "iron_ore", name: "Iron Ore", categories: ["ore", "mineral"]),
                (id: "coal", name: "Coal", categories: ["fuel", "mineral"]),
            ],
            recipes: [
                (
                    id: "smelt_iron",
                    selector: (group: "furnace", min_level: 2),
                    inputs: [(id: "iron_ore", quantity: 2), (any_of: ["fuel"])],
                    outputs: [(id: "iron_ingot")],
                    window: Some((min: 10.0, max: 20.0)),
                    priority: Some(120),
                ),
                (
                    id: "crush",
                    selector: (factory: "crusher"),
                    inputs: [(all_of: ["ore", "mineral"], quantity: 3), (any: 1)],
                ),
            ],
        )"#;
        let data = load(ron, Format::Ron).unwrap();
        assert_eq!(data.material_count(), 2);
        let catalog = data.catalog();

        let smelt = catalog.recipe(&RecipeId::from("smelt_iron")).unwrap();
        assert_eq!(smelt.selector(), &RecipeSelector::group("furnace", 2));
        assert_eq!(smelt.cost(), &[2, 1]);
        assert_eq!(smelt.inputs()[0].kind(), MatcherKind::Id);
        assert_eq!(smelt.inputs()[1].kind(), MatcherKind::AnyOfCategories);
        assert_eq!(smelt.priority(), 120);
        assert_eq!(smelt.time_window().unwrap().max(), 20.0);

        let crush = catalog.recipe(&RecipeId::from("crush")).unwrap();
        assert_eq!(crush.selector(), &RecipeSelector::factory("crusher"));
        assert_eq!(crush.inputs()[0].kind(), MatcherKind::AllOfCategories);
        assert_eq!(crush.inputs()[1].kind(), MatcherKind::Any);
        assert_eq!(crush.cost(), &[3, 1]);
        assert!(crush.time_window().is_none());
    }

    #[test]
    fn mixed_matcher_forms_are_rejected() {
        let json = r#"{ "recipes": [
            { "id": "mixed", "selector": { "factory": "x" }, "inputs": [ { "id": "ore", "any_of": ["fuel"] } ] }
        ] }"#;
        assert!(matches!(load(json, Format::Json), Err(DataLoadError::Parse { .. })));

        let toml = r#"
            [[recipes]]
            id = "mixed"
            selector = { factory = "x", group = "furnace" }
        "#;
        assert!(matches!(load(toml, Format::Toml), Err(DataLoadError::Parse { .. })));
    }

    #[test]
    fn invalid_matcher_names_the_recipe() {
        let json = r#"{ "recipes": [
            { "id": "bad", "selector": { "factory": "x" }, "inputs": [ { "any_of": [] } ] }
        ] }"#;
        let err = load(json, Format::Json).unwrap_err();
        match err {
            DataLoadError::Matcher { recipe, source } => {
                assert_eq!(recipe, "bad");
                assert_eq!(source, MatcherError::EmptyCategories);
            }
            other => panic!("expected Matcher error, got: {other:?}"),
        }
    }

    #[test]
    fn invalid_window_is_reported() {
        let json = r#"{ "recipes": [
            { "id": "slow", "selector": { "factory": "x" }, "window": { "min": 5.0, "max": 1.0 } }
        ] }"#;
        assert!(matches!(
            load(json, Format::Json),
            Err(DataLoadError::Recipe { ref recipe, .. }) if recipe == "slow"
        ));
    }

    #[test]
    fn duplicate_material_surfaces_registry_error() {
        let json = r#"{ "materials": [
            { "id": "coal", "name": "Coal" },
            { "id": "coal", "name": "Coke" }
        ] }"#;
        let err = load(json, Format::Json).unwrap_err();
        assert!(matches!(
            err,
            DataLoadError::Registry(RegistryError::DuplicateMaterial { .. })
        ));
        assert!(err.to_string().contains("Coke"));
    }

    #[test]
    fn malformed_input_is_a_parse_error() {
        let err = load("{ not json", Format::Json).unwrap_err();
        assert!(matches!(err, DataLoadError::Parse { ref source_name, .. } if source_name == "inline"));
    }

    #[test]
    fn format_detection() {
        assert_eq!(detect_format(Path::new("world.json")).unwrap(), Format::Json);
        assert_eq!(detect_format(Path::new("world.ron")).unwrap(), Format::Ron);
        assert_eq!(detect_format(Path::new("a/b/world.toml")).unwrap(), Format::Toml);
        assert!(detect_format(Path::new("world.yaml")).is_err());
        assert!(detect_format(Path::new("world")).is_err());
    }

    #[test]
    fn load_world_file_from_disk() {
        let dir = std::env::temp_dir().join(format!("hephaestus-loader-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("forge.json");
        std::fs::write(&path, FORGE_JSON).unwrap();

        let data = load_world_file(&path).unwrap();
        assert_eq!(data.recipe_count(), 2);

        let missing = load_world_file(&dir.join("missing.json"));
        assert!(matches!(missing, Err(DataLoadError::Io(_))));
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
