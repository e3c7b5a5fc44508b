//! Recipes: declarative input/output matchers plus the default matching and
//! completion rules a factory applies each tick.
//!
//! Recipes are built in two phases. A [`RecipeDraft`] holds the matchers and
//! timing but has no identity; [`RecipeDraft::register_meta`] consumes it and
//! yields a [`DefaultProcessRecipe`] whose id and selector can never change.

use crate::id::RecipeId;
use crate::material::MaterialInstance;
use crate::matcher::{MaterialMatcher, MatcherError};
use crate::registry::Catalog;
use crate::selector::RecipeSelector;
use std::fmt;

pub const DEFAULT_PRIORITY: i32 = 100;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum RecipeError {
    #[error("recipe id cannot be blank")]
    BlankId,
    #[error("invalid time window [{min}, {max}]")]
    InvalidWindow { min: f32, max: f32 },
    #[error(transparent)]
    Matcher(#[from] MatcherError),
}

// ---------------------------------------------------------------------------
// Time window
// ---------------------------------------------------------------------------

/// Minimum and maximum elapsed seconds for a timed recipe.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TimeWindow {
    min: f32,
    max: f32,
}

impl TimeWindow {
    pub fn new(min: f32, max: f32) -> Result<Self, RecipeError> {
        if !min.is_finite() || !max.is_finite() || min < 0.0 || min > max {
            return Err(RecipeError::InvalidWindow { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> f32 {
        self.min
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn before_min(&self, elapsed_seconds: f32) -> bool {
        elapsed_seconds < self.min
    }

    pub fn after_max(&self, elapsed_seconds: f32) -> bool {
        elapsed_seconds > self.max
    }

    pub fn contains(&self, elapsed_seconds: f32) -> bool {
        !self.before_min(elapsed_seconds) && !self.after_max(elapsed_seconds)
    }
}

// ---------------------------------------------------------------------------
// Process context
// ---------------------------------------------------------------------------

/// The material instances a factory currently holds, in a stable order.
pub trait ProcessContext {
    fn contents(&self) -> &[MaterialInstance];
}

impl ProcessContext for [MaterialInstance] {
    fn contents(&self) -> &[MaterialInstance] {
        self
    }
}

impl ProcessContext for Vec<MaterialInstance> {
    fn contents(&self) -> &[MaterialInstance] {
        self
    }
}

/// Where a factory is in its processing cycle when it asks a recipe to
/// complete. The default completion rule ignores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum ProcessingPhase {
    #[default]
    Idle,
    Processing,
    Finishing,
}

// ---------------------------------------------------------------------------
// Recipe contract
// ---------------------------------------------------------------------------

/// The recipe contract factories and selectors build on.
///
/// Implementors supply the data accessors; matching, completion, priority and
/// specificity have default implementations that recipes may override.
pub trait ProcessRecipe: fmt::Debug {
    fn id(&self) -> &RecipeId;
    fn selector(&self) -> &RecipeSelector;
    fn ordered(&self) -> bool;
    fn inputs(&self) -> &[MaterialMatcher];
    fn outputs(&self) -> &[MaterialMatcher];
    /// Input quantities, in input order.
    fn cost(&self) -> &[u32];
    /// `None` for manual recipes that complete the tick they are invoked.
    fn time_window(&self) -> Option<&TimeWindow>;

    /// Larger values are preferred when several recipes are eligible.
    fn priority(&self) -> i32 {
        DEFAULT_PRIORITY
    }

    /// Sum of the input matchers' specificity. Secondary tie-break.
    fn specificity_score(&self) -> u32 {
        self.inputs().iter().map(MaterialMatcher::specificity_score).sum()
    }

    fn input_count(&self) -> usize {
        self.inputs().len()
    }

    fn output_count(&self) -> usize {
        self.outputs().len()
    }

    /// Whether every input matcher can be assigned a distinct held instance.
    /// See [`greedy_first_fit`] for the exact (order-sensitive) rule.
    fn can_start(&self, context: &dyn ProcessContext, catalog: &Catalog<'_>) -> bool {
        greedy_first_fit(self.inputs(), context.contents(), catalog).is_some()
    }

    /// Manual recipes always complete. Timed recipes complete once
    /// `elapsed_seconds` reaches the window minimum; the maximum is not
    /// checked.
    fn try_complete(
        &self,
        _context: &dyn ProcessContext,
        _catalog: &Catalog<'_>,
        elapsed_seconds: f32,
        _phase: ProcessingPhase,
    ) -> bool {
        match self.time_window() {
            None => true,
            Some(window) => !window.before_min(elapsed_seconds),
        }
    }
}

/// Assigns held instances to input matchers in a single greedy pass.
///
/// For each matcher, in declaration order, the first unused instance (in
/// context order) that it matches is taken. If any matcher finds nothing the
/// whole assignment fails. This is not an optimal bipartite matching: an
/// early generic matcher can take the only instance a later, more specific
/// matcher could use. Returns the chosen content index per input.
pub fn greedy_first_fit(
    inputs: &[MaterialMatcher],
    contents: &[MaterialInstance],
    catalog: &Catalog<'_>,
) -> Option<Vec<usize>> {
    let mut used = vec![false; contents.len()];
    let mut assignment = Vec::with_capacity(inputs.len());

    for need in inputs {
        let found = contents
            .iter()
            .enumerate()
            .find(|(i, held)| !used[*i] && need.matches(held.material_id(), catalog))
            .map(|(i, _)| i)?;
        used[found] = true;
        assignment.push(found);
    }

    Some(assignment)
}

// ---------------------------------------------------------------------------
// Draft and registered recipe
// ---------------------------------------------------------------------------

/// A recipe without identity. Cannot be evaluated until registered.
#[derive(Debug, Clone)]
pub struct RecipeDraft {
    ordered: bool,
    inputs: Vec<MaterialMatcher>,
    outputs: Vec<MaterialMatcher>,
    window: Option<TimeWindow>,
    priority: i32,
}

impl RecipeDraft {
    pub fn new(
        ordered: bool,
        inputs: &[MaterialMatcher],
        outputs: &[MaterialMatcher],
        window: Option<TimeWindow>,
    ) -> Self {
        Self {
            ordered,
            inputs: inputs.to_vec(),
            outputs: outputs.to_vec(),
            window,
            priority: DEFAULT_PRIORITY,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Assigns the permanent identity and selector. The draft is consumed,
    /// so a recipe's identity is set exactly once.
    pub fn register_meta(
        self,
        id: impl Into<RecipeId>,
        selector: RecipeSelector,
    ) -> Result<DefaultProcessRecipe, RecipeError> {
        let id = id.into();
        if id.is_blank() {
            return Err(RecipeError::BlankId);
        }
        let cost = self.inputs.iter().map(MaterialMatcher::quantity).collect();
        Ok(DefaultProcessRecipe {
            id,
            selector,
            ordered: self.ordered,
            inputs: self.inputs,
            outputs: self.outputs,
            cost,
            window: self.window,
            priority: self.priority,
        })
    }
}

/// A registered recipe using the default matching and timing rules.
#[derive(Debug, Clone)]
pub struct DefaultProcessRecipe {
    id: RecipeId,
    selector: RecipeSelector,
    ordered: bool,
    inputs: Vec<MaterialMatcher>,
    outputs: Vec<MaterialMatcher>,
    cost: Vec<u32>,
    window: Option<TimeWindow>,
    priority: i32,
}

impl ProcessRecipe for DefaultProcessRecipe {
    fn id(&self) -> &RecipeId {
        &self.id
    }

    fn selector(&self) -> &RecipeSelector {
        &self.selector
    }

    fn ordered(&self) -> bool {
        self.ordered
    }

    fn inputs(&self) -> &[MaterialMatcher] {
        &self.inputs
    }

    fn outputs(&self) -> &[MaterialMatcher] {
        &self.outputs
    }

    fn cost(&self) -> &[u32] {
        &self.cost
    }

    fn time_window(&self) -> Option<&TimeWindow> {
        self.window.as_ref()
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}
