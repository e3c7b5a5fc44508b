//! Factories: the stateful entities that hold materials and run recipes.
//!
//! A [`Factory`] is either stopped or operating. While operating, each
//! [`Factory::update`] runs the kind's [`FactoryLogic`] and then, when the
//! factory carries an [`AutomaticFactory`] timer, advances that timer by the
//! tick's `dt`. Stopped factories ignore updates entirely.

use crate::id::{FactoryId, MaterialId};
use crate::layout::Layout;
use crate::material::MaterialInstance;
use crate::matcher::MaterialMatcher;
use crate::recipe::ProcessContext;
use crate::registry::Catalog;
use crate::selector::FactoryMeta;
use std::fmt;
use tracing::{debug, trace};

// ---------------------------------------------------------------------------
// Automatic capability
// ---------------------------------------------------------------------------

/// A self-driven processing timer a factory may carry.
///
/// The bounds are advisory: the default update adds `dt` without clamping,
/// and it is up to the factory kind to act on them.
pub trait AutomaticFactory: fmt::Debug {
    /// `[min, max]` processing time in seconds.
    fn processing_time_bounds(&self) -> [f32; 2];
    fn current_processing_time(&self) -> f32;
    fn set_current_processing_time(&mut self, time: f32);

    fn update_automatic_factory(&mut self, dt: f32) {
        let t = self.current_processing_time();
        self.set_current_processing_time(t + dt);
    }
}

/// Stock [`AutomaticFactory`] implementation.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingTimer {
    bounds: [f32; 2],
    current: f32,
}

impl ProcessingTimer {
    pub fn new(min: f32, max: f32) -> Self {
        Self {
            bounds: [min, max],
            current: 0.0,
        }
    }

    pub fn reset(&mut self) {
        self.current = 0.0;
    }
}

impl AutomaticFactory for ProcessingTimer {
    fn processing_time_bounds(&self) -> [f32; 2] {
        self.bounds
    }

    fn current_processing_time(&self) -> f32 {
        self.current
    }

    fn set_current_processing_time(&mut self, time: f32) {
        self.current = time;
    }
}

// ---------------------------------------------------------------------------
// Factory kinds
// ---------------------------------------------------------------------------

/// Per-kind behaviour plugged into a [`Factory`].
pub trait FactoryLogic: fmt::Debug {
    /// Runs once per tick while the factory is operating.
    fn update_factory(&mut self, factory: &mut FactoryCore, catalog: &Catalog<'_>, dt: f32);

    /// Called by the kind itself when a recipe finishes with `outputs`.
    fn process_finished(&mut self, _factory: &mut FactoryCore, _outputs: &[MaterialMatcher]) {}
}

/// Operating state of a factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum OperatingState {
    #[default]
    Stopped,
    Operating,
}

/// The state a factory kind's logic may read and change during its tick.
#[derive(Debug)]
pub struct FactoryCore {
    id: FactoryId,
    name: String,
    meta: FactoryMeta,
    input_materials: Vec<MaterialId>,
    output_materials: Vec<MaterialId>,
    held: Vec<MaterialInstance>,
    products: Vec<MaterialInstance>,
    treated_material: Option<MaterialInstance>,
    state: OperatingState,
    layout: Option<Layout>,
    automatic: Option<Box<dyn AutomaticFactory>>,
}

impl FactoryCore {
    /// The registry key, empty until the factory is registered. Factory
    /// selectors are resolved against it.
    pub fn id(&self) -> &FactoryId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn meta(&self) -> &FactoryMeta {
        &self.meta
    }

    pub fn input_materials(&self) -> &[MaterialId] {
        &self.input_materials
    }

    pub fn output_materials(&self) -> &[MaterialId] {
        &self.output_materials
    }

    pub fn state(&self) -> OperatingState {
        self.state
    }

    pub fn is_operating(&self) -> bool {
        self.state == OperatingState::Operating
    }

    pub fn start_factory(&mut self) {
        if self.state != OperatingState::Operating {
            debug!(factory = %self.name, "Factory started");
        }
        self.state = OperatingState::Operating;
    }

    pub fn stop_factory(&mut self) {
        if self.state != OperatingState::Stopped {
            debug!(factory = %self.name, "Factory stopped");
        }
        self.state = OperatingState::Stopped;
    }

    pub fn treated_material(&self) -> Option<&MaterialInstance> {
        self.treated_material.as_ref()
    }

    pub fn set_treated_material(&mut self, material: Option<MaterialInstance>) {
        self.treated_material = material;
    }

    /// Material instances waiting to be processed, in arrival order.
    pub fn held(&self) -> &[MaterialInstance] {
        &self.held
    }

    pub fn hold(&mut self, instance: MaterialInstance) {
        self.held.push(instance);
    }

    /// Removes the held instances at `indices`, returning them in the order
    /// given. Out-of-range and repeated indices are ignored.
    pub fn take_held(&mut self, indices: &[usize]) -> Vec<MaterialInstance> {
        let mut order: Vec<usize> = Vec::with_capacity(indices.len());
        for &i in indices {
            if i < self.held.len() && !order.contains(&i) {
                order.push(i);
            }
        }
        let taken = order.iter().map(|&i| self.held[i].clone()).collect();
        let mut index = 0;
        self.held.retain(|_| {
            let keep = !order.contains(&index);
            index += 1;
            keep
        });
        taken
    }

    pub fn products(&self) -> &[MaterialInstance] {
        &self.products
    }

    pub fn push_product(&mut self, instance: MaterialInstance) {
        self.products.push(instance);
    }

    pub fn take_products(&mut self) -> Vec<MaterialInstance> {
        std::mem::take(&mut self.products)
    }

    pub fn layout(&self) -> Option<&Layout> {
        self.layout.as_ref()
    }

    pub fn layout_mut(&mut self) -> Option<&mut Layout> {
        self.layout.as_mut()
    }

    pub fn set_layout(&mut self, layout: Layout) {
        self.layout = Some(layout);
    }

    /// The automatic timer, when this factory carries one.
    pub fn automatic(&self) -> Option<&dyn AutomaticFactory> {
        self.automatic.as_deref()
    }

    pub fn automatic_mut(&mut self) -> Option<&mut (dyn AutomaticFactory + 'static)> {
        self.automatic.as_deref_mut()
    }
}

impl ProcessContext for FactoryCore {
    fn contents(&self) -> &[MaterialInstance] {
        &self.held
    }
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

/// A factory instance: shared state plus its kind's logic.
#[derive(Debug)]
pub struct Factory {
    core: FactoryCore,
    logic: Box<dyn FactoryLogic>,
}

impl Factory {
    /// Creates a stopped factory with no materials, layout or timer.
    pub fn new(name: impl Into<String>, logic: impl FactoryLogic + 'static) -> Self {
        Self {
            core: FactoryCore {
                id: FactoryId::default(),
                name: name.into(),
                meta: FactoryMeta::default(),
                input_materials: Vec::new(),
                output_materials: Vec::new(),
                held: Vec::new(),
                products: Vec::new(),
                treated_material: None,
                state: OperatingState::Stopped,
                layout: None,
                automatic: None,
            },
            logic: Box::new(logic),
        }
    }

    pub fn with_meta(mut self, meta: FactoryMeta) -> Self {
        self.core.meta = meta;
        self
    }

    pub fn with_materials(mut self, inputs: Vec<MaterialId>, outputs: Vec<MaterialId>) -> Self {
        self.core.input_materials = inputs;
        self.core.output_materials = outputs;
        self
    }

    /// Attaches the automatic capability.
    pub fn with_automatic(mut self, timer: impl AutomaticFactory + 'static) -> Self {
        self.core.automatic = Some(Box::new(timer));
        self
    }

    pub fn core(&self) -> &FactoryCore {
        &self.core
    }

    pub fn core_mut(&mut self) -> &mut FactoryCore {
        &mut self.core
    }

    pub fn id(&self) -> &FactoryId {
        self.core.id()
    }

    /// Set by the registry on insertion.
    pub(crate) fn assign_id(&mut self, id: FactoryId) {
        self.core.id = id;
    }

    pub fn name(&self) -> &str {
        self.core.name()
    }

    pub fn is_operating(&self) -> bool {
        self.core.is_operating()
    }

    pub fn start_factory(&mut self) {
        self.core.start_factory();
    }

    pub fn stop_factory(&mut self) {
        self.core.stop_factory();
    }

    pub fn treated_material(&self) -> Option<&MaterialInstance> {
        self.core.treated_material()
    }

    pub fn set_treated_material(&mut self, material: Option<MaterialInstance>) {
        self.core.set_treated_material(material);
    }

    pub fn set_layout(&mut self, layout: Layout) {
        self.core.set_layout(layout);
    }

    pub fn hold(&mut self, instance: MaterialInstance) {
        self.core.hold(instance);
    }

    pub fn take_products(&mut self) -> Vec<MaterialInstance> {
        self.core.take_products()
    }

    pub fn automatic(&self) -> Option<&dyn AutomaticFactory> {
        self.core.automatic()
    }

    /// Advances the factory by one tick of `dt` seconds.
    pub fn update(&mut self, dt: f32, catalog: &Catalog<'_>) {
        if !self.core.is_operating() {
            return;
        }
        trace!(factory = %self.core.name, dt, "Factory tick");
        self.logic.update_factory(&mut self.core, catalog, dt);
        if let Some(timer) = self.core.automatic.as_deref_mut() {
            timer.update_automatic_factory(dt);
        }
    }

    /// Forwards a finished recipe's outputs to the kind's hook.
    pub fn process_finished(&mut self, outputs: &[MaterialMatcher]) {
        self.logic.process_finished(&mut self.core, outputs);
    }
}
