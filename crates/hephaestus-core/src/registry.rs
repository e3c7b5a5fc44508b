use crate::factory::Factory;
use crate::id::{FactoryId, MaterialId, RecipeId};
use crate::material::Material;
use crate::recipe::ProcessRecipe;
use crate::selector::FactoryMeta;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("material with id {id} and {name} is already registered")]
    DuplicateMaterial { id: MaterialId, name: String },
    #[error("factory with id {id} and {name} is already registered")]
    DuplicateFactory { id: FactoryId, name: String },
    #[error("recipe with id {id} is already registered")]
    DuplicateRecipe { id: RecipeId },
}

/// Insert-only registry of materials, recipes and factories.
///
/// Ids are unique per namespace; a duplicate registration is rejected and the
/// first entry stays. Nothing is ever removed. Maps are ordered so iteration
/// (and therefore ticking) is deterministic.
#[derive(Debug, Default)]
pub struct HephaestusData {
    materials: BTreeMap<MaterialId, Material>,
    recipes: BTreeMap<RecipeId, Box<dyn ProcessRecipe>>,
    factories: BTreeMap<FactoryId, Factory>,
}

impl HephaestusData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_material(
        &mut self,
        id: impl Into<MaterialId>,
        material: Material,
    ) -> Result<(), RegistryError> {
        let id = id.into();
        if self.materials.contains_key(&id) {
            return Err(RegistryError::DuplicateMaterial {
                id,
                name: material.name,
            });
        }
        debug!(material = %id, name = %material.name, "Registered material");
        self.materials.insert(id, material);
        Ok(())
    }

    /// Inserts `factory` under `id`, which also becomes the factory's own
    /// [`Factory::id`].
    pub fn register_factory(
        &mut self,
        id: impl Into<FactoryId>,
        mut factory: Factory,
    ) -> Result<(), RegistryError> {
        let id = id.into();
        if self.factories.contains_key(&id) {
            return Err(RegistryError::DuplicateFactory {
                id,
                name: factory.name().to_string(),
            });
        }
        debug!(factory = %id, name = factory.name(), "Registered factory");
        factory.assign_id(id.clone());
        self.factories.insert(id, factory);
        Ok(())
    }

    /// Registers a recipe under its own id.
    pub fn register_recipe(
        &mut self,
        recipe: impl ProcessRecipe + 'static,
    ) -> Result<(), RegistryError> {
        let id = recipe.id().clone();
        if self.recipes.contains_key(&id) {
            return Err(RegistryError::DuplicateRecipe { id });
        }
        debug!(recipe = %id, selector = ?recipe.selector(), "Registered recipe");
        self.recipes.insert(id, Box::new(recipe));
        Ok(())
    }

    pub fn materials(&self) -> &BTreeMap<MaterialId, Material> {
        &self.materials
    }

    pub fn factories(&self) -> &BTreeMap<FactoryId, Factory> {
        &self.factories
    }

    /// Factories in id order, for draining products or feeding inputs.
    pub fn factories_mut(&mut self) -> impl Iterator<Item = (&FactoryId, &mut Factory)> {
        self.factories.iter_mut()
    }

    pub fn recipes(&self) -> impl Iterator<Item = &dyn ProcessRecipe> {
        self.recipes.values().map(as_recipe)
    }

    pub fn factory(&self, id: &str) -> Option<&Factory> {
        self.factories.get(id)
    }

    pub fn factory_mut(&mut self, id: &str) -> Option<&mut Factory> {
        self.factories.get_mut(id)
    }

    pub fn material_category_keys(&self, id: &MaterialId) -> Option<&BTreeSet<String>> {
        self.materials.get(id).map(|m| &m.categories)
    }

    /// Read-only view over materials and recipes, usable while factories are
    /// borrowed mutably.
    pub fn catalog(&self) -> Catalog<'_> {
        Catalog {
            materials: &self.materials,
            recipes: &self.recipes,
        }
    }

    /// Recipes whose selector accepts the factory registered under `id`.
    pub fn recipes_for(&self, id: &FactoryId) -> Vec<&dyn ProcessRecipe> {
        match self.factories.get(id) {
            Some(factory) => self.catalog().recipes_for(id, factory.core().meta()),
            None => Vec::new(),
        }
    }

    /// Calls [`Factory::update`] once on every factory, in id order.
    pub fn update_factories(&mut self, dt: f32) {
        let catalog = Catalog {
            materials: &self.materials,
            recipes: &self.recipes,
        };
        for factory in self.factories.values_mut() {
            factory.update(dt, &catalog);
        }
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    pub fn recipe_count(&self) -> usize {
        self.recipes.len()
    }

    pub fn factory_count(&self) -> usize {
        self.factories.len()
    }
}

fn as_recipe(recipe: &Box<dyn ProcessRecipe>) -> &dyn ProcessRecipe {
    &**recipe
}

/// Borrowed view of the registry's materials and recipes.
#[derive(Debug, Clone, Copy)]
pub struct Catalog<'a> {
    materials: &'a BTreeMap<MaterialId, Material>,
    recipes: &'a BTreeMap<RecipeId, Box<dyn ProcessRecipe>>,
}

impl<'a> Catalog<'a> {
    pub fn material(&self, id: &MaterialId) -> Option<&'a Material> {
        self.materials.get(id)
    }

    /// Categories of `id`, or `None` when the material is not registered.
    pub fn material_category_keys(&self, id: &MaterialId) -> Option<&'a BTreeSet<String>> {
        self.materials.get(id).map(|m| &m.categories)
    }

    pub fn recipe(&self, id: &RecipeId) -> Option<&'a dyn ProcessRecipe> {
        self.recipes.get(id).map(as_recipe)
    }

    pub fn recipes(self) -> impl Iterator<Item = &'a dyn ProcessRecipe> {
        self.recipes.values().map(as_recipe)
    }

    /// Recipes whose selector accepts `factory`, in recipe id order.
    pub fn recipes_for(
        &self,
        factory: &FactoryId,
        meta: &FactoryMeta,
    ) -> Vec<&'a dyn ProcessRecipe> {
        self.recipes()
            .filter(|r| r.selector().accepts(factory, meta))
            .collect()
    }
}
