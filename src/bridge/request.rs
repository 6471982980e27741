//! Typed invocation request, validated at the session boundary.

use serde::Deserialize;
use serde_json::Value;

use crate::tools::{ToolCatalog, EXECUTE_ACTION};
use crate::types::{Error, Result};

/// Arguments of an `execute_action` invocation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExecuteAction {
    #[serde(alias = "accion")]
    pub action: String,

    #[serde(default, alias = "objetivo", deserialize_with = "scalar_as_text")]
    pub target: String,

    #[serde(default, alias = "valor", deserialize_with = "scalar_as_text")]
    pub value: String,
}

impl ExecuteAction {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            target: String::new(),
            value: String::new(),
        }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// Validate a raw argument mapping against the catalog and type it.
    pub fn from_arguments(catalog: &ToolCatalog, arguments: &Value) -> Result<Self> {
        let errors = catalog.validate_params(EXECUTE_ACTION, arguments)?;
        if !errors.is_empty() {
            return Err(Error::validation(errors.join("; ")));
        }

        let request: Self = serde_json::from_value(arguments.clone())
            .map_err(|e| Error::validation(format!("Invalid arguments: {}", e)))?;
        validate_non_empty(&request.action, "action")?;
        Ok(request)
    }
}

/// Null reads as empty; numbers and booleans keep their JSON text.
fn scalar_as_text<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string, got {}",
            other
        ))),
    }
}

/// Validate that a string is not blank.
fn validate_non_empty(s: &str, field: &str) -> Result<()> {
    if s.trim().is_empty() {
        return Err(Error::validation(format!("{} cannot be empty", field)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn parse(args: Value) -> Result<ExecuteAction> {
        ExecuteAction::from_arguments(&ToolCatalog::builtin(), &args)
    }

    #[test]
    fn test_full_arguments() {
        let req = parse(json!({"action": "encender_luces", "target": "salon", "value": "22"}))
            .unwrap();
        assert_eq!(
            req,
            ExecuteAction::new("encender_luces")
                .with_target("salon")
                .with_value("22")
        );
    }

    #[test]
    fn test_optional_arguments_default_to_empty() {
        let req = parse(json!({"action": "crear_tarea"})).unwrap();
        assert_eq!(req.target, "");
        assert_eq!(req.value, "");
    }

    #[test]
    fn test_null_optionals_default_to_empty() {
        let req = parse(json!({"action": "crear_tarea", "target": null})).unwrap();
        assert_eq!(req.target, "");
    }

    #[test]
    fn test_spanish_aliases() {
        let req = parse(json!({"accion": "encender_luces", "objetivo": "salon", "valor": "alta"}))
            .unwrap();
        assert_eq!(req.action, "encender_luces");
        assert_eq!(req.target, "salon");
        assert_eq!(req.value, "alta");
    }

    #[test]
    fn test_missing_action_is_validation_error() {
        let err = parse(json!({"target": "salon"})).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(err.to_string().contains("action"));
    }

    #[test]
    fn test_blank_action_is_validation_error() {
        let err = parse(json!({"action": "   "})).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_scalar_value_is_forwarded_as_text() {
        let req = parse(json!({"action": "set_temp", "value": 22, "objetivo": true})).unwrap();
        assert_eq!(req.value, "22");
        assert_eq!(req.target, "true");
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let req = parse(json!({"action": "encender_luces", "target": "salon", "room_id": "3"}))
            .unwrap();
        assert_eq!(req, ExecuteAction::new("encender_luces").with_target("salon"));
    }

    #[test]
    fn test_structured_value_is_validation_error() {
        let err = parse(json!({"action": "set_temp", "value": [22]})).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(err.to_string().contains("Parameter 'value'"));
    }
}
