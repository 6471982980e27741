//! Tool catalog — typed descriptors, parameter validation, schema generation.
//!
//! The catalog is built once at startup and never mutated; every `tools/list`
//! answer is rendered from the same descriptors.

use crate::types::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identifier of the single tool this bridge exposes.
pub const EXECUTE_ACTION: &str = "execute_action";

// =============================================================================
// Parameter types
// =============================================================================

/// Parameter type for tool inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    String,
    /// Advertised as a string; numbers and booleans are accepted and
    /// forwarded in their textual form.
    Text,
}

impl ParamType {
    /// Validate a JSON value against this parameter type.
    pub fn validate(&self, value: &Value) -> std::result::Result<(), String> {
        let ok = match self {
            ParamType::String => value.is_string(),
            ParamType::Text => value.is_string() || value.is_number() || value.is_boolean(),
        };
        if ok {
            Ok(())
        } else {
            Err(format!(
                "expected {}, got {}",
                self.json_type(),
                value_type_name(value)
            ))
        }
    }

    /// JSON Schema `type` keyword.
    pub fn json_type(&self) -> &'static str {
        match self {
            ParamType::String | ParamType::Text => "string",
        }
    }
}

fn value_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// =============================================================================
// Parameter definition
// =============================================================================

/// A single parameter definition for a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamDef {
    pub name: String,
    pub param_type: ParamType,
    pub description: String,
    pub required: bool,
    /// Alternative argument names accepted on input (never advertised).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

impl ParamDef {
    pub fn required(name: &str, param_type: ParamType, description: &str) -> Self {
        Self {
            name: name.to_string(),
            param_type,
            description: description.to_string(),
            required: true,
            aliases: Vec::new(),
        }
    }

    pub fn optional(name: &str, param_type: ParamType, description: &str) -> Self {
        Self {
            required: false,
            ..Self::required(name, param_type, description)
        }
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_string());
        self
    }

    /// True when `key` names this parameter directly or through an alias.
    pub fn matches(&self, key: &str) -> bool {
        self.name == key || self.aliases.iter().any(|a| a == key)
    }
}

// =============================================================================
// Tool descriptor
// =============================================================================

/// Complete metadata for one advertised tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: Vec<ParamDef>,
}

impl ToolDescriptor {
    /// JSON Schema object describing the tool's arguments.
    pub fn input_schema(&self) -> Value {
        let mut properties = Map::new();
        for param in &self.parameters {
            properties.insert(
                param.name.clone(),
                serde_json::json!({
                    "type": param.param_type.json_type(),
                    "description": param.description,
                }),
            );
        }
        let required: Vec<&str> = self
            .parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();

        serde_json::json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Wire form used in `tools/list` results.
    pub fn to_listing(&self) -> Value {
        serde_json::json!({
            "name": self.name,
            "description": self.description,
            "inputSchema": self.input_schema(),
        })
    }
}

/// Descriptor for the automation action tool.
pub fn execute_action_descriptor() -> ToolDescriptor {
    ToolDescriptor {
        name: EXECUTE_ACTION.to_string(),
        description: "Runs an action or automation in the n8n system: lights, tasks, data, etc."
            .to_string(),
        parameters: vec![
            ParamDef::required(
                "action",
                ParamType::String,
                "Action name, e.g. \"encender_luces\", \"crear_tarea\"",
            )
            .with_alias("accion"),
            ParamDef::optional(
                "target",
                ParamType::Text,
                "Target of the action, e.g. \"salon\", \"comprar leche\"",
            )
            .with_alias("objetivo"),
            ParamDef::optional(
                "value",
                ParamType::Text,
                "Optional value, e.g. \"22\", \"alta\"",
            )
            .with_alias("valor"),
        ],
    }
}

// =============================================================================
// Tool catalog
// =============================================================================

/// Immutable, ordered tool catalog.
#[derive(Debug, Clone)]
pub struct ToolCatalog {
    entries: Vec<ToolDescriptor>,
}

impl ToolCatalog {
    /// The catalog this bridge advertises.
    pub fn builtin() -> Self {
        Self {
            entries: vec![execute_action_descriptor()],
        }
    }

    /// Get a tool descriptor by name.
    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Check if a tool exists.
    pub fn has_tool(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// All descriptors, in registration order.
    pub fn list(&self) -> &[ToolDescriptor] {
        &self.entries
    }

    /// Validate arguments against a tool's parameter definitions.
    ///
    /// Keys the tool does not define are ignored. Returns a list of
    /// validation errors (empty = valid).
    pub fn validate_params(&self, name: &str, params: &Value) -> Result<Vec<String>> {
        let entry = self.get(name).ok_or_else(|| Error::unknown_tool(name))?;

        let param_map = params
            .as_object()
            .ok_or_else(|| Error::validation("Arguments must be a JSON object"))?;

        let mut errors = Vec::new();

        for param_def in &entry.parameters {
            let present = param_map.keys().any(|k| param_def.matches(k));
            if param_def.required && !present {
                errors.push(format!("Missing required parameter: {}", param_def.name));
            }
        }

        for (key, value) in param_map {
            match entry.parameters.iter().find(|p| p.matches(key)) {
                // Explicit nulls read as "not provided".
                Some(_) if value.is_null() => {}
                Some(param_def) => {
                    if let Err(e) = param_def.param_type.validate(value) {
                        errors.push(format!("Parameter '{}': {}", key, e));
                    }
                }
                None => tracing::debug!(tool = name, key = %key, "Ignoring unknown argument"),
            }
        }

        Ok(errors)
    }

    /// Number of tools.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ToolCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

// =============================================================================
// Tests
// =============================================================================
