//! Rule registry keyed by rule id

use super::base::Rule;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Rules keyed by id; iteration is in ascending id order
#[derive(Clone, Default)]
pub struct RuleRegistry {
    rules: BTreeMap<&'static str, Arc<dyn Rule>>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in rule
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register_all(super::builtin_rules());
        registry
    }

    /// Register a rule, replacing any rule with the same id
    pub fn register(&mut self, rule: Arc<dyn Rule>) {
        debug!("Registering rule: {}", rule.id());
        if let Some(previous) = self.rules.insert(rule.id(), rule) {
            warn!("Rule {} registered twice; keeping the latest", previous.id());
        }
    }

    pub fn register_all(&mut self, rules: impl IntoIterator<Item = Arc<dyn Rule>>) {
        for rule in rules {
            self.register(rule);
        }
    }

    pub fn get(&self, id: &str) -> Option<&Arc<dyn Rule>> {
        self.rules.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.rules.contains_key(id)
    }

    pub fn ids(&self) -> Vec<&'static str> {
        self.rules.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Rule>> {
        self.rules.values()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl std::fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleRegistry")
            .field("rules", &self.ids())
            .finish()
    }
}
