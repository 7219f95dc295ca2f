//! Push notification payloads.
//!
//! Payloads arrive as optional JSON. Anything missing or unparseable falls
//! back to defaults; building a notification never fails.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_TITLE: &str = "PostgreSQL Brasil";
pub const DEFAULT_BODY: &str = "You have a new notification";
pub const ICON: &str = "/icon-192.png";
pub const BADGE: &str = "/badge-72.png";

/// Where the `open` action navigates.
pub const OPEN_TARGET: &str = "/";

/// Raw push payload as sent by the push service.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PushPayload {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

impl PushPayload {
    /// Parse tolerantly: absent, malformed, or non-object payloads yield defaults.
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Self::default();
        };
        match serde_json::from_str::<Value>(raw) {
            Ok(value @ Value::Object(_)) => Self::from_value(value),
            Ok(other) => {
                tracing::warn!(kind = %json_kind(&other), "push payload is not an object, using defaults");
                Self::default()
            }
            Err(e) => {
                tracing::warn!(error = %e, "malformed push payload, using defaults");
                Self::default()
            }
        }
    }

    fn from_value(value: Value) -> Self {
        let text = |field: &str| value.get(field).and_then(Value::as_str).map(str::to_string);
        Self { title: text("title"), body: text("body"), data: value.get("data").cloned() }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// User actions offered on every notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum NotificationAction {
    Open,
    Close,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ActionButton {
    pub action: NotificationAction,
    pub title: String,
}

/// A notification ready to be displayed by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub data: Value,
    pub actions: Vec<ActionButton>,
}

impl Notification {
    pub fn from_payload(payload: PushPayload) -> Self {
        Self {
            title: payload.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            body: payload.body.unwrap_or_else(|| DEFAULT_BODY.to_string()),
            icon: ICON.to_string(),
            badge: BADGE.to_string(),
            data: payload.data.filter(|d| !d.is_null()).unwrap_or_else(|| Value::Object(Default::default())),
            actions: vec![
                ActionButton { action: NotificationAction::Open, title: "Open".into() },
                ActionButton { action: NotificationAction::Close, title: "Close".into() },
            ],
        }
    }
}

/// What the host should do after a notification is clicked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClickOutcome {
    /// Close the notification and open a window at `url`.
    OpenWindow { url: String },
    /// Close the notification only.
    Dismiss,
}

/// Resolve a click on a notification. Unknown actions just dismiss.
pub fn on_click(action: Option<&str>) -> ClickOutcome {
    match action {
        Some("open") => ClickOutcome::OpenWindow { url: OPEN_TARGET.to_string() },
        _ => ClickOutcome::Dismiss,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_payload() {
        let payload = PushPayload::parse(Some(r#"{"title":"Meetup","body":"Tonight","data":{"id":7}}"#));
        let n = Notification::from_payload(payload);
        assert_eq!(n.title, "Meetup");
        assert_eq!(n.body, "Tonight");
        assert_eq!(n.data["id"], 7);
        assert_eq!(n.icon, ICON);
        assert_eq!(n.badge, BADGE);
    }

    #[test]
    fn test_absent_payload_defaults() {
        let n = Notification::from_payload(PushPayload::parse(None));
        assert_eq!(n.title, DEFAULT_TITLE);
        assert_eq!(n.body, DEFAULT_BODY);
        assert!(n.data.as_object().unwrap().is_empty());
    }

    #[test]
    fn test_malformed_payload_defaults() {
        for raw in ["{not json", "[1,2]", "\"text\"", "null", "   "] {
            let n = Notification::from_payload(PushPayload::parse(Some(raw)));
            assert_eq!(n.title, DEFAULT_TITLE, "{raw}");
        }
    }

    #[test]
    fn test_wrong_field_types_fall_back() {
        let n = Notification::from_payload(PushPayload::parse(Some(r#"{"title":42,"body":null,"data":null}"#)));
        assert_eq!(n.title, DEFAULT_TITLE);
        assert_eq!(n.body, DEFAULT_BODY);
        assert!(n.data.is_object());
    }

    #[test]
    fn test_two_actions() {
        let n = Notification::from_payload(PushPayload::default());
        let actions: Vec<_> = n.actions.iter().map(|a| a.action).collect();
        assert_eq!(actions, vec![NotificationAction::Open, NotificationAction::Close]);
    }

    #[test]
    fn test_click_outcomes() {
        assert_eq!(on_click(Some("open")), ClickOutcome::OpenWindow { url: "/".into() });
        assert_eq!(on_click(Some("close")), ClickOutcome::Dismiss);
        assert_eq!(on_click(None), ClickOutcome::Dismiss);
    }
}
