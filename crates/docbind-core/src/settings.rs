//! The persisted settings document.
//!
//! Settings are a single JSON object with one recognized key, `formulas`,
//! holding the full binding map. Save and load move the whole map; there
//! is no partial update.

use serde::{Deserialize, Serialize};

use crate::binding::BindingMap;
use crate::store::BindingStore;

/// The key under which the binding map is stored.
pub const SETTINGS_KEY: &str = "formulas";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub formulas: BindingMap,
}

impl Settings {
    pub fn new(formulas: BindingMap) -> Self {
        Self { formulas }
    }

    pub fn from_store(store: &BindingStore) -> Self {
        Self::new(store.snapshot())
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
