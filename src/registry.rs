use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, RwLock};

use lazy_static::lazy_static;
use tracing::{debug, warn};

use crate::error::{FieldRuleError, Result};
use crate::iso;
use crate::rule::{FieldRule, RuleHasher};

// ------------- RuleRegistry -------------
/// Keeps rules by id and guarantees that no two share one.
#[derive(Debug, Default)]
pub struct RuleRegistry {
    kept: RwLock<HashMap<String, Arc<FieldRule>, RuleHasher>>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn register(&self, rule: FieldRule) -> Result<Arc<FieldRule>> {
        self.keep(Arc::new(rule))
    }
    pub fn keep(&self, rule: Arc<FieldRule>) -> Result<Arc<FieldRule>> {
        let mut kept = self
            .kept
            .write()
            .map_err(|e| FieldRuleError::Lock(e.to_string()))?;
        match kept.entry(rule.id().to_owned()) {
            Entry::Occupied(e) => {
                // the very same rule may be kept twice
                if Arc::ptr_eq(e.get(), &rule) {
                    Ok(Arc::clone(e.get()))
                } else {
                    Err(FieldRuleError::DuplicateRule { id: rule.id().to_owned() })
                }
            }
            Entry::Vacant(e) => {
                debug!(rule = %rule, "registered rule");
                Ok(Arc::clone(e.insert(rule)))
            }
        }
    }
    pub fn get(&self, id: &str) -> Option<Arc<FieldRule>> {
        self.kept.read().ok()?.get(id).cloned()
    }
    /// All rules in rule order.
    pub fn rules(&self) -> Vec<Arc<FieldRule>> {
        let mut rules: Vec<Arc<FieldRule>> = match self.kept.read() {
            Ok(kept) => kept.values().cloned().collect(),
            Err(_) => Vec::new(),
        };
        rules.sort();
        rules
    }
    pub fn len(&self) -> usize {
        self.kept.read().map(|kept| kept.len()).unwrap_or(0)
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

lazy_static! {
    static ref GLOBAL: RuleRegistry = {
        let registry = RuleRegistry::new();
        for rule in iso::rules() {
            if let Err(e) = registry.keep(rule) {
                warn!(error = %e, "ISO rule not registered");
            }
        }
        registry
    };
}

/// The process wide registry, holding the ISO rules from the start.
pub fn global() -> &'static RuleRegistry {
    &GLOBAL
}
