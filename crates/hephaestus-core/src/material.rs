use crate::id::MaterialId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A material definition: a display name plus the category keys it belongs
/// to. The identity lives in the registry key, not in the definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    #[serde(default)]
    pub categories: BTreeSet<String>,
}

impl Material {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            categories: BTreeSet::new(),
        }
    }

    pub fn with_category(mut self, key: impl Into<String>) -> Self {
        self.categories.insert(key.into());
        self
    }

    pub fn with_categories<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories.extend(keys.into_iter().map(Into::into));
        self
    }

    pub fn in_category(&self, key: &str) -> bool {
        self.categories.contains(key)
    }
}

/// A concrete unit of material held by a factory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MaterialInstance {
    material_id: MaterialId,
}

impl MaterialInstance {
    pub fn new(material_id: impl Into<MaterialId>) -> Self {
        Self {
            material_id: material_id.into(),
        }
    }

    pub fn material_id(&self) -> &MaterialId {
        &self.material_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn material_categories_accumulate() {
        let coal = Material::new("Coal")
            .with_category("fuel")
            .with_categories(["mineral", "fuel"]);
        assert_eq!(coal.categories.len(), 2);
        assert!(coal.in_category("fuel"));
        assert!(coal.in_category("mineral"));
        assert!(!coal.in_category("metal"));
    }

    #[test]
    fn instance_exposes_material_id() {
        let ore = MaterialInstance::new("iron_ore");
        assert_eq!(ore.material_id().as_str(), "iron_ore");
    }
}
