//! Rule capability traits, rule modules and the module registry.

use std::collections::BTreeMap;
use std::fmt;

use tabula_model::{Row, Value};

use crate::error::RuleResolutionError;

/// Computes one output value from a read-only input row.
///
/// Implementations must be pure: the same row always yields the same value.
pub trait ComputeRule: Send + Sync {
    fn compute(&self, row: &Row<'_>) -> Value;
}

impl<F> ComputeRule for F
where
    F: Fn(&Row<'_>) -> Value + Send + Sync,
{
    fn compute(&self, row: &Row<'_>) -> Value {
        self(row)
    }
}

/// Decides whether a row is left out of the derived table.
pub trait RowFilter: Send + Sync {
    fn exclude(&self, row: &Row<'_>) -> bool;
}

impl<F> RowFilter for F
where
    F: Fn(&Row<'_>) -> bool + Send + Sync,
{
    fn exclude(&self, row: &Row<'_>) -> bool {
        self(row)
    }
}

/// A named set of compute rules plus an optional row filter.
pub struct RuleModule {
    name: String,
    rules: BTreeMap<String, Box<dyn ComputeRule>>,
    filter: Option<Box<dyn RowFilter>>,
}

impl RuleModule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: BTreeMap::new(),
            filter: None,
        }
    }

    /// Registers a rule. An existing rule with the same name is replaced.
    pub fn register(&mut self, name: impl Into<String>, rule: impl ComputeRule + 'static) {
        self.rules.insert(name.into(), Box::new(rule));
    }

    pub fn set_filter(&mut self, filter: impl RowFilter + 'static) {
        self.filter = Some(Box::new(filter));
    }

    #[must_use]
    pub fn with_rule(mut self, name: impl Into<String>, rule: impl ComputeRule + 'static) -> Self {
        self.register(name, rule);
        self
    }

    /// Registers a closure as a rule.
    #[must_use]
    pub fn with_compute_fn<F>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Row<'_>) -> Value + Send + Sync + 'static,
    {
        self.with_rule(name, f)
    }

    #[must_use]
    pub fn with_filter(mut self, filter: impl RowFilter + 'static) -> Self {
        self.set_filter(filter);
        self
    }

    /// Installs a closure as the row filter.
    #[must_use]
    pub fn with_filter_fn<F>(self, f: F) -> Self
    where
        F: Fn(&Row<'_>) -> bool + Send + Sync + 'static,
    {
        self.with_filter(f)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rule(&self, name: &str) -> Option<&dyn ComputeRule> {
        self.rules.get(name).map(|rule| rule.as_ref())
    }

    pub fn filter(&self) -> Option<&dyn RowFilter> {
        self.filter.as_deref()
    }

    /// Rule names in sorted order.
    pub fn rule_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.rules.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl fmt::Debug for RuleModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleModule")
            .field("name", &self.name)
            .field("rules", &self.rules.keys().collect::<Vec<_>>())
            .field("filter", &self.filter.is_some())
            .finish()
    }
}

/// Rule modules indexed by name.
#[derive(Debug, Default)]
pub struct RuleRegistry {
    modules: BTreeMap<String, RuleModule>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a module under its own name, returning any module it replaces.
    pub fn register(&mut self, module: RuleModule) -> Option<RuleModule> {
        self.modules.insert(module.name().to_string(), module)
    }

    #[must_use]
    pub fn with_module(mut self, module: RuleModule) -> Self {
        self.register(module);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    /// Resolves a module by name.
    pub fn resolve(&self, name: &str) -> Result<&RuleModule, RuleResolutionError> {
        self.modules
            .get(name)
            .ok_or_else(|| RuleResolutionError::MissingModule {
                module: name.to_string(),
            })
    }

    pub fn module_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.modules.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
