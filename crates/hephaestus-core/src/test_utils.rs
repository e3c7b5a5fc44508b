//! Shared test helpers for unit tests, integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]`.

use crate::factory::{FactoryCore, FactoryLogic};
use crate::id::MaterialId;
use crate::material::{Material, MaterialInstance};
use crate::registry::{Catalog, HephaestusData};
use crate::selector::RecipeSelector;
use std::cell::Cell;
use std::rc::Rc;

// ===========================================================================
// Materials
// ===========================================================================

pub fn iron_ore() -> MaterialId {
    MaterialId::from("iron_ore")
}
pub fn iron_ingot() -> MaterialId {
    MaterialId::from("iron_ingot")
}
pub fn coal() -> MaterialId {
    MaterialId::from("coal")
}
pub fn charcoal() -> MaterialId {
    MaterialId::from("charcoal")
}
pub fn wood() -> MaterialId {
    MaterialId::from("wood")
}
pub fn sand() -> MaterialId {
    MaterialId::from("sand")
}

/// Registry with six materials:
///
/// | id         | categories       |
/// |------------|------------------|
/// | iron_ore   | ore, mineral     |
/// | iron_ingot | metal            |
/// | coal       | fuel, mineral    |
/// | charcoal   | fuel             |
/// | wood       | fuel, organic    |
/// | sand       | mineral          |
pub fn sample_data() -> HephaestusData {
    let mut data = HephaestusData::new();
    let defs = [
        (iron_ore(), Material::new("Iron Ore").with_categories(["ore", "mineral"])),
        (iron_ingot(), Material::new("Iron Ingot").with_category("metal")),
        (coal(), Material::new("Coal").with_categories(["fuel", "mineral"])),
        (charcoal(), Material::new("Charcoal").with_category("fuel")),
        (wood(), Material::new("Wood").with_categories(["fuel", "organic"])),
        (sand(), Material::new("Sand").with_category("mineral")),
    ];
    for (id, material) in defs {
        data.register_material(id, material)
            .expect("sample materials are unique");
    }
    data
}

pub fn held(ids: &[&str]) -> Vec<MaterialInstance> {
    ids.iter().map(|id| MaterialInstance::new(*id)).collect()
}

pub fn workbench_selector() -> RecipeSelector {
    RecipeSelector::factory("workbench")
}

// ===========================================================================
// Factory logic doubles
// ===========================================================================

/// Observes what a [`CountingLogic`] saw, after it has moved into a factory.
#[derive(Debug, Default)]
pub struct TickProbe {
    ticks: Cell<u32>,
    finished: Cell<u32>,
    last_dt: Cell<f32>,
}

impl TickProbe {
    pub fn ticks(&self) -> u32 {
        self.ticks.get()
    }

    pub fn finished(&self) -> u32 {
        self.finished.get()
    }

    pub fn last_dt(&self) -> f32 {
        self.last_dt.get()
    }
}

/// Counts ticks and finished processes.
#[derive(Debug, Default)]
pub struct CountingLogic {
    probe: Rc<TickProbe>,
}

impl CountingLogic {
    pub fn with_probe() -> (Self, Rc<TickProbe>) {
        let logic = Self::default();
        let probe = Rc::clone(&logic.probe);
        (logic, probe)
    }
}

impl FactoryLogic for CountingLogic {
    fn update_factory(&mut self, _factory: &mut FactoryCore, _catalog: &Catalog<'_>, dt: f32) {
        self.probe.ticks.set(self.probe.ticks.get() + 1);
        self.probe.last_dt.set(dt);
    }

    fn process_finished(&mut self, _factory: &mut FactoryCore, _outputs: &[crate::matcher::MaterialMatcher]) {
        self.probe.finished.set(self.probe.finished.get() + 1);
    }
}

/// Stops its factory during the first tick it sees.
#[derive(Debug, Default)]
pub struct StopAfterFirstTick;

impl FactoryLogic for StopAfterFirstTick {
    fn update_factory(&mut self, factory: &mut FactoryCore, _catalog: &Catalog<'_>, _dt: f32) {
        factory.stop_factory();
    }
}
