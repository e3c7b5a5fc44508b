//! Hephaestus Core -- recipe matching and factory ticking for crafting worlds.
//!
//! Factories hold materials and run declarative recipes over simulated time.
//! This crate provides the matcher algebra, the recipe contract with its
//! default matching and completion rules, the factory state machine, and the
//! insert-only registry that owns every material, recipe and factory.
//!
//! # Tick Flow
//!
//! Each call to [`hephaestus::Hephaestus::step`] updates every registered
//! factory once, in id order:
//!
//! 1. **Stopped** factories return immediately.
//! 2. **Operating** factories run their kind's [`factory::FactoryLogic`],
//!    which typically ranks candidate recipes and asks them to
//!    [`recipe::ProcessRecipe::can_start`] / `try_complete`.
//! 3. Factories carrying an [`factory::AutomaticFactory`] timer advance it
//!    by the tick's `dt`.
//!
//! # Two-Phase Recipes
//!
//! A recipe has no identity until it is registered:
//!
//! ```rust,ignore
//! let recipe = RecipeDraft::new(false, &inputs, &outputs, None)
//!     .register_meta("smelt_iron", RecipeSelector::group("furnace", 1))?;
//! data.register_recipe(recipe)?;
//! ```
//!
//! # Key Types
//!
//! - [`matcher::MaterialMatcher`] -- Id, AnyOfCategories, AllOfCategories
//!   and Any predicates with a quantity and a specificity score.
//! - [`recipe::ProcessRecipe`] -- Recipe contract; greedy first-fit input
//!   matching and minimum-dwell completion by default.
//! - [`factory::Factory`] -- Stopped/Operating state machine with an optional
//!   automatic timer.
//! - [`registry::HephaestusData`] -- Insert-only registry; duplicate ids are
//!   rejected.
//! - [`crafting::RecipeRunner`] -- Stock factory logic that ranks, starts
//!   and completes the recipes a factory may run.
//! - [`layout::Layout`] -- Three-axis cell flag grid for factory footprints.
//! - [`data_loader`] -- Definitions from JSON, RON or TOML (feature
//!   `data-loader`).

pub mod crafting;
#[cfg(feature = "data-loader")]
pub mod data_loader;
pub mod factory;
pub mod hephaestus;
pub mod id;
pub mod layout;
pub mod matcher;
pub mod material;
pub mod recipe;
pub mod registry;
pub mod selector;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
