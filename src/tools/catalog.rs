//! Tool catalog - the process-wide registry of tool specs
//!
//! Built once from the built-in tools and read-only afterwards.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde_json::Value;

use super::{ToolSpec, builtin_tools};
use crate::error::{Result, ToolbeltError};

static GLOBAL: Lazy<ToolCatalog> = Lazy::new(|| ToolCatalog::from_specs(builtin_tools().iter().map(|t| t.spec())));

/// Ordered name -> ToolSpec registry
#[derive(Debug, Clone, Default)]
pub struct ToolCatalog {
    specs: Vec<ToolSpec>,
    index: HashMap<String, usize>,
}

impl ToolCatalog {
    /// The catalog of every built-in tool
    pub fn global() -> &'static ToolCatalog {
        &GLOBAL
    }

    /// Build from specs; a later spec with a duplicate name replaces the earlier one
    pub fn from_specs(specs: impl IntoIterator<Item = ToolSpec>) -> Self {
        let mut catalog = Self::default();
        for spec in specs {
            match catalog.index.get(&spec.name) {
                Some(&i) => {
                    log::warn!("Duplicate tool spec '{}' replaced", spec.name);
                    catalog.specs[i] = spec;
                }
                None => {
                    catalog.index.insert(spec.name.clone(), catalog.specs.len());
                    catalog.specs.push(spec);
                }
            }
        }
        catalog
    }

    /// Look up a tool by exact name
    pub fn get(&self, name: &str) -> Result<&ToolSpec> {
        self.index
            .get(name)
            .map(|&i| &self.specs[i])
            .ok_or_else(|| ToolbeltError::UnknownTool { name: name.to_string() })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.specs.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ToolSpec> {
        self.specs.iter()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Every spec in `{name, description, parameters}` form
    pub fn to_schemas(&self) -> Vec<Value> {
        self.specs.iter().map(ToolSpec::to_schema).collect()
    }

    pub fn to_function_declarations(&self) -> Vec<Value> {
        self.specs.iter().map(ToolSpec::to_function_declaration).collect()
    }
}
