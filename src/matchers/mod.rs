use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::context::ComparisonContext;
use crate::equality::CustomEqualityTester;
use crate::errors::{MatchError, Result};
use crate::value::Value;

pub mod builtins;

/// Raw outcome of `Matcher::compare`, before negation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    pub pass: bool,
    /// Overrides the default message when present.
    pub message: Option<String>,
}

impl Comparison {
    pub fn new(pass: bool) -> Self {
        Self { pass, message: None }
    }

    pub fn with_message(pass: bool, message: impl Into<String>) -> Self {
        Self { pass, message: Some(message.into()) }
    }
}

impl From<bool> for Comparison {
    fn from(pass: bool) -> Self {
        Comparison::new(pass)
    }
}

/// A comparison strategy. Must not keep state between calls.
pub trait Matcher {
    fn compare(&self, actual: &Value, expected: &[Value]) -> Result<Comparison>;
}

impl<F> Matcher for F
where
    F: Fn(&Value, &[Value]) -> Result<Comparison>,
{
    fn compare(&self, actual: &Value, expected: &[Value]) -> Result<Comparison> {
        self(actual, expected)
    }
}

/// Builds a matcher for one evaluation, given the active comparison context.
pub trait MatcherFactory: Send + Sync {
    fn create(&self, ctx: &ComparisonContext) -> Box<dyn Matcher>;
}

impl<F> MatcherFactory for F
where
    F: Fn(&ComparisonContext) -> Box<dyn Matcher> + Send + Sync,
{
    fn create(&self, ctx: &ComparisonContext) -> Box<dyn Matcher> {
        self(ctx)
    }
}

/// Box a closure as a matcher.
pub fn matcher<F>(f: F) -> Box<dyn Matcher>
where
    F: Fn(&Value, &[Value]) -> Result<Comparison> + 'static,
{
    Box::new(f)
}

/// Wrap a closure as a shareable factory, ready for `add_matchers`.
pub fn factory<F>(f: F) -> Arc<dyn MatcherFactory>
where
    F: Fn(&ComparisonContext) -> Box<dyn Matcher> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// The `n`th expected argument, `undefined` when missing.
pub fn arg(expected: &[Value], n: usize) -> Value {
    expected.get(n).cloned().unwrap_or_default()
}

#[derive(Clone, Default)]
struct Layer {
    label: String,
    matchers: HashMap<String, Arc<dyn MatcherFactory>>,
    testers: Vec<Arc<dyn CustomEqualityTester>>,
}

impl Layer {
    fn new(label: &str) -> Self {
        Self { label: label.to_string(), ..Self::default() }
    }
}

/// Scoped matcher registry. Layer 0 is the root; every nested scope pushes a
/// layer whose registrations shadow outer ones until it is popped.
#[derive(Clone)]
pub struct Registry {
    layers: Vec<Layer>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// A registry with an empty root scope.
    pub fn new() -> Self {
        Self { layers: vec![Layer::new("root")] }
    }

    /// A registry whose root scope holds the built-in matchers.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for (name, f) in builtins::all() {
            registry.register(name, f);
        }
        registry
    }

    /// Add or replace `name` in the innermost scope.
    pub fn register(&mut self, name: impl Into<String>, factory: Arc<dyn MatcherFactory>) {
        let name = name.into();
        let layer = self.innermost_mut();
        trace!(matcher = %name, scope = %layer.label, "register matcher");
        layer.matchers.insert(name, factory);
    }

    pub fn add_custom_equality_tester(&mut self, tester: Arc<dyn CustomEqualityTester>) {
        self.innermost_mut().testers.push(tester);
    }

    /// Find `name` from the innermost scope outward.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn MatcherFactory>> {
        self.layers
            .iter()
            .rev()
            .find_map(|layer| layer.matchers.get(name).cloned())
            .ok_or_else(|| MatchError::UnknownMatcher(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.resolve(name).is_ok()
    }

    /// Testers visible here: innermost scope first, and within a scope the
    /// most recently added first.
    pub fn custom_equality_testers(&self) -> Vec<Arc<dyn CustomEqualityTester>> {
        self.layers
            .iter()
            .rev()
            .flat_map(|layer| layer.testers.iter().rev().cloned())
            .collect()
    }

    pub fn push_scope(&mut self, label: &str) {
        self.layers.push(Layer::new(label));
        debug!(scope = %label, depth = self.depth(), "enter scope");
    }

    /// Drop the innermost scope and everything registered in it.
    pub fn pop_scope(&mut self) -> Result<()> {
        if self.layers.len() <= 1 {
            return Err(MatchError::ScopeUnderflow);
        }
        if let Some(layer) = self.layers.pop() {
            debug!(
                scope = %layer.label,
                matchers = layer.matchers.len(),
                testers = layer.testers.len(),
                "exit scope"
            );
        }
        Ok(())
    }

    /// Number of scopes above the root.
    pub fn depth(&self) -> usize {
        self.layers.len() - 1
    }

    fn innermost_mut(&mut self) -> &mut Layer {
        if self.layers.is_empty() {
            self.layers.push(Layer::new("root"));
        }
        let last = self.layers.len() - 1;
        &mut self.layers[last]
    }
}
