//! Forge world example: a workbench, a charcoal pit and a blast furnace.
//!
//! Loads materials and recipes from `data/forge.toml`, registers three
//! factories in code, feeds them raw materials and steps the world until
//! every factory has drained its inputs. The charcoal pit is automatic and
//! keeps its own processing timer; the other two count elapsed time
//! themselves.
//!
//! Run with: `cargo run -p hephaestus-examples --example forge_world`
//! Set `RUST_LOG=hephaestus_core=debug` to watch recipes start and finish.

use std::error::Error;
use std::path::Path;

use hephaestus_core::crafting::RecipeRunner;
use hephaestus_core::factory::{Factory, ProcessingTimer};
use hephaestus_core::hephaestus::Hephaestus;
use hephaestus_core::layout::LayoutBuilder;
use hephaestus_core::material::MaterialInstance;
use hephaestus_core::selector::FactoryMeta;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DT: f32 = 1.0;
const STEPS: u32 = 30;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/forge.toml");
    let mut world = Hephaestus::load(&path)?;

    // --- Factories ---

    let bench_layout = LayoutBuilder::new(3, 1, 3)
        .present(0, 0, 0)
        .present(1, 0, 0)
        .present(2, 0, 0)
        .mutable(1, 0, 1)
        .build()?;
    let mut workbench = Factory::new("Workbench", RecipeRunner::new())
        .with_meta(FactoryMeta::new(1).with_group("crafting"));
    workbench.set_layout(bench_layout);

    let charcoal_pit = Factory::new("Charcoal Pit", RecipeRunner::new())
        .with_meta(FactoryMeta::new(1))
        .with_automatic(ProcessingTimer::new(3.0, 6.0));

    let blast_furnace = Factory::new("Blast Furnace", RecipeRunner::new())
        .with_meta(FactoryMeta::new(2).with_group("furnace"));

    let data = world.data_mut();
    data.register_factory("workbench", workbench)?;
    data.register_factory("charcoal_pit", charcoal_pit)?;
    data.register_factory("blast_furnace", blast_furnace)?;

    // --- Inputs ---

    for (factory, inputs) in [
        ("workbench", &["wood", "wood"][..]),
        ("charcoal_pit", &["wood", "wood", "wood"][..]),
        ("blast_furnace", &["iron_ore", "coal", "iron_ore", "coal"][..]),
    ] {
        if let Some(f) = data.factory_mut(factory) {
            for id in inputs {
                f.hold(MaterialInstance::new(*id));
            }
            f.start_factory();
        }
    }

    // --- Run ---

    for _ in 0..STEPS {
        world.step(DT);
    }

    for (id, factory) in world.data_mut().factories_mut() {
        let products = factory.take_products();
        let mut names: Vec<&str> = products.iter().map(|p| p.material_id().as_str()).collect();
        names.sort_unstable();
        info!(factory = %id, held = factory.core().held().len(), ?names, "Products collected");
    }
    info!(tick = world.tick(), "Done");

    Ok(())
}
