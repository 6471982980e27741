//! Uniform response envelope returned for every invocation.

use serde::{Deserialize, Serialize};

/// One content block. Only text blocks are produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },
}

/// `tools/call` result body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub content: Vec<ContentBlock>,

    #[serde(
        rename = "isError",
        default,
        skip_serializing_if = "std::ops::Not::not"
    )]
    pub is_error: bool,
}

impl ResponseEnvelope {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::Text { text: text.into() }],
            is_error: false,
        }
    }

    pub fn failure(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::Text { text: text.into() }],
            is_error: true,
        }
    }

    /// Concatenated text of all blocks.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .map(|block| match block {
                ContentBlock::Text { text } => text.as_str(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_success_omits_is_error() {
        let value = serde_json::to_value(ResponseEnvelope::success("done")).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"content": [{"type": "text", "text": "done"}]})
        );
    }

    #[test]
    fn test_failure_sets_is_error() {
        let value = serde_json::to_value(ResponseEnvelope::failure("boom")).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"content": [{"type": "text", "text": "boom"}], "isError": true})
        );
    }

    #[test]
    fn test_deserialize_without_is_error() {
        let envelope: ResponseEnvelope =
            serde_json::from_str(r#"{"content":[{"type":"text","text":"ok"}]}"#).unwrap();
        assert!(!envelope.is_error);
        assert_eq!(envelope.text(), "ok");
    }
}
