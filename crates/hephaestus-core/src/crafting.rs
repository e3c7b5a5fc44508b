//! A stock [`FactoryLogic`] that runs the registry's recipes.
//!
//! Each tick, an idle runner ranks the recipes its factory may run (see
//! [`rank_candidates`]), consumes the held instances the best one needs, and
//! marks the first of them as the treated material. Recipes are resolved
//! against the factory's registry id. A running recipe is asked to complete
//! every tick; elapsed time comes from the factory's automatic timer when it
//! has one. Completion turns id outputs into product instances and fires
//! [`FactoryLogic::process_finished`].

use crate::factory::{FactoryCore, FactoryLogic};
use crate::id::RecipeId;
use crate::material::MaterialInstance;
use crate::matcher::MaterialMatcher;
use crate::recipe::{ProcessRecipe, ProcessingPhase};
use crate::registry::Catalog;
use crate::selector::rank_candidates;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
struct ActiveProcess {
    recipe: RecipeId,
    elapsed: f32,
}

#[derive(Debug, Default)]
pub struct RecipeRunner {
    active: Option<ActiveProcess>,
    completed: u32,
}

impl RecipeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_recipe(&self) -> Option<&RecipeId> {
        self.active.as_ref().map(|a| &a.recipe)
    }

    pub fn completed(&self) -> u32 {
        self.completed
    }

    fn begin(&mut self, factory: &mut FactoryCore, catalog: &Catalog<'_>) {
        let candidates = catalog.recipes_for(factory.id(), factory.meta());
        let picked = rank_candidates(candidates, &*factory, catalog)
            .into_iter()
            .find_map(|r| claim_inputs(r, factory.held(), catalog).map(|claimed| (r, claimed)));
        let Some((recipe, claimed)) = picked else {
            return;
        };

        let consumed = factory.take_held(&claimed);
        debug!(
            factory = %factory.id(),
            recipe = %recipe.id(),
            consumed = consumed.len(),
            "Recipe started"
        );
        factory.set_treated_material(consumed.into_iter().next());
        if let Some(timer) = factory.automatic_mut() {
            timer.set_current_processing_time(0.0);
        }
        self.active = Some(ActiveProcess {
            recipe: recipe.id().clone(),
            elapsed: 0.0,
        });
    }

    fn finish(&mut self, factory: &mut FactoryCore, recipe: &dyn ProcessRecipe) {
        for output in recipe.outputs() {
            match output.material_id() {
                Some(id) => {
                    for _ in 0..output.quantity() {
                        factory.push_product(MaterialInstance::new(id.clone()));
                    }
                }
                None => debug!(recipe = %recipe.id(), output = %output, "Output is not a concrete material"),
            }
        }
        factory.set_treated_material(None);
        self.active = None;
        self.completed += 1;
        debug!(factory = %factory.id(), recipe = %recipe.id(), "Recipe completed");
        self.process_finished(factory, recipe.outputs());
    }
}

/// Picks the held instances a run of `recipe` consumes: `cost()[i]`
/// instances for input `i`, first unused match first, inputs in declaration
/// order. `None` when some input cannot be filled.
fn claim_inputs(
    recipe: &dyn ProcessRecipe,
    contents: &[MaterialInstance],
    catalog: &Catalog<'_>,
) -> Option<Vec<usize>> {
    let mut used = vec![false; contents.len()];
    let mut claimed = Vec::new();

    for (need, &count) in recipe.inputs().iter().zip(recipe.cost()) {
        for _ in 0..count {
            let found = (0..contents.len())
                .find(|&i| !used[i] && need.matches(contents[i].material_id(), catalog))?;
            used[found] = true;
            claimed.push(found);
        }
    }

    Some(claimed)
}

impl FactoryLogic for RecipeRunner {
    fn update_factory(&mut self, factory: &mut FactoryCore, catalog: &Catalog<'_>, dt: f32) {
        let phase = match &mut self.active {
            Some(active) => {
                active.elapsed += dt;
                ProcessingPhase::Processing
            }
            None => {
                self.begin(factory, catalog);
                ProcessingPhase::Idle
            }
        };

        let Some(active) = &self.active else {
            return;
        };
        let Some(recipe) = catalog.recipe(&active.recipe) else {
            warn!(factory = %factory.id(), recipe = %active.recipe, "Active recipe is not registered");
            self.active = None;
            return;
        };

        let elapsed = factory
            .automatic()
            .map_or(active.elapsed, |t| t.current_processing_time());
        // Finishing once the window minimum is reached, or at once without a window.
        let phase = match recipe.time_window() {
            Some(window) if window.before_min(elapsed) => phase,
            _ => ProcessingPhase::Finishing,
        };
        if recipe.try_complete(&*factory, catalog, elapsed, phase) {
            self.finish(factory, recipe);
        }
    }

    fn process_finished(&mut self, factory: &mut FactoryCore, outputs: &[MaterialMatcher]) {
        debug!(factory = %factory.name(), outputs = outputs.len(), "Process finished");
    }
}
