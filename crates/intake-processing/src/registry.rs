//! Validator registry for custom validators selected by name

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::validator::Validator;

/// Registry of named validators.
///
/// Upload options refer to a custom validator by name; the pipeline resolves
/// the name here and falls back to its default validator when it is unknown.
#[derive(Clone)]
pub struct ValidatorRegistry {
    validators: Arc<RwLock<HashMap<String, Arc<dyn Validator>>>>,
}

impl ValidatorRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            validators: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register a validator under its own name, replacing any previous one.
    pub async fn register(&self, validator: Arc<dyn Validator>) {
        let name = validator.name().to_string();
        let mut validators = self.validators.write().await;

        if validators.insert(name.clone(), validator).is_some() {
            tracing::debug!(validator = %name, "Replaced registered validator");
        }
    }

    /// Get a validator by name
    pub async fn get(&self, name: &str) -> Result<Arc<dyn Validator>> {
        let validators = self.validators.read().await;

        validators
            .get(name)
            .cloned()
            .with_context(|| format!("Validator '{}' not found", name))
    }

    pub async fn contains(&self, name: &str) -> bool {
        self.validators.read().await.contains_key(name)
    }

    /// Registered names, sorted
    pub async fn names(&self) -> Vec<String> {
        let validators = self.validators.read().await;
        let mut names: Vec<String> = validators.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for ValidatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
