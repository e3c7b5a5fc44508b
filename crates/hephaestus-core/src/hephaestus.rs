//! The composition root: one owned world per simulation.
//!
//! A [`Hephaestus`] is built once at startup from a populated registry and
//! handed to whatever drives the simulation. There is no global instance, so
//! "initialised twice" and "used before initialisation" cannot be expressed.

use crate::registry::HephaestusData;
use tracing::trace;

#[derive(Debug, Default)]
pub struct Hephaestus {
    data: HephaestusData,
    tick: u64,
}

impl Hephaestus {
    pub fn new(data: HephaestusData) -> Self {
        Self { data, tick: 0 }
    }

    /// Builds a world from a definitions file (JSON, RON or TOML).
    #[cfg(feature = "data-loader")]
    pub fn load(path: &std::path::Path) -> Result<Self, crate::data_loader::DataLoadError> {
        Ok(Self::new(crate::data_loader::load_world_file(path)?))
    }

    pub fn data(&self) -> &HephaestusData {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut HephaestusData {
        &mut self.data
    }

    pub fn into_data(self) -> HephaestusData {
        self.data
    }

    /// Number of completed steps.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Runs one simulation step: every factory is updated exactly once.
    pub fn step(&mut self, dt: f32) {
        self.data.update_factories(dt);
        self.tick += 1;
        trace!(tick = self.tick, dt, "Step complete");
    }
}
