//! Outbound webhook payload.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::request::ExecuteAction;

/// JSON document POSTed to the automation backend.
///
/// Field names on the wire are the ones the n8n workflow reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundPayload {
    #[serde(rename = "comando")]
    pub command: String,

    #[serde(rename = "objetivo")]
    pub target: String,

    #[serde(rename = "valor")]
    pub value: String,

    /// ISO-8601 UTC with millisecond precision.
    pub timestamp: String,

    #[serde(rename = "origen")]
    pub origin: String,
}

impl OutboundPayload {
    /// Build the payload for `request` stamped with `sent_at`.
    pub fn build(request: &ExecuteAction, origin: &str, sent_at: DateTime<Utc>) -> Self {
        Self {
            command: request.action.clone(),
            target: request.target.clone(),
            value: request.value.clone(),
            timestamp: sent_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            origin: origin.to_string(),
        }
    }

    /// Build the payload stamped with the current wall-clock time.
    pub fn stamp_now(request: &ExecuteAction, origin: &str) -> Self {
        Self::build(request, origin, Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_wire_field_names() {
        let sent_at = Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap();
        let request = ExecuteAction::new("encender_luces").with_target("salon");
        let payload = OutboundPayload::build(&request, "xiaozhi_ai_mcp", sent_at);

        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            serde_json::json!({
                "comando": "encender_luces",
                "objetivo": "salon",
                "valor": "",
                "timestamp": "2025-03-14T09:26:53.000Z",
                "origen": "xiaozhi_ai_mcp",
            })
        );
    }

    #[test]
    fn test_stamp_now_is_parseable_iso8601() {
        let before = Utc::now();
        let payload = OutboundPayload::stamp_now(&ExecuteAction::new("x"), "tag");
        let parsed = DateTime::parse_from_rfc3339(&payload.timestamp).unwrap();
        assert!(parsed.with_timezone(&Utc) >= before - chrono::Duration::milliseconds(1));
    }

    proptest! {
        #[test]
        fn prop_fields_map_one_to_one(
            action in "[a-z_]{1,24}",
            target in ".{0,32}",
            value in ".{0,16}",
        ) {
            let request = ExecuteAction::new(action.clone())
                .with_target(target.clone())
                .with_value(value.clone());
            let payload = OutboundPayload::stamp_now(&request, "origin");
            let wire = serde_json::to_value(&payload).unwrap();

            prop_assert_eq!(wire["comando"].as_str(), Some(action.as_str()));
            prop_assert_eq!(wire["objetivo"].as_str(), Some(target.as_str()));
            prop_assert_eq!(wire["valor"].as_str(), Some(value.as_str()));
            prop_assert_eq!(wire["origen"].as_str(), Some("origin"));
        }
    }
}
