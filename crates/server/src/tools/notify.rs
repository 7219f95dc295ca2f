//! push_notify and notification_click tool implementations.

use offcache_core::notify::{ClickOutcome, Notification, PushPayload, on_click};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;

/// Parameters for the push_notify tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct PushNotifyParams {
    /// Raw push payload, normally JSON `{title, body, data}`. Anything else
    /// falls back to the default notification.
    #[serde(default)]
    pub payload: Option<String>,
}

/// Parameters for the notification_click tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct NotificationClickParams {
    /// Action identifier of the clicked button; "open" navigates home.
    #[serde(default)]
    pub action: Option<String>,
}

/// Implementation of the push_notify tool.
pub fn push_impl(params: PushNotifyParams) -> Result<CallToolResult, McpError> {
    let notification = Notification::from_payload(PushPayload::parse(params.payload.as_deref()));
    tracing::debug!(title = %notification.title, "built notification");
    json_result(&notification)
}

/// Implementation of the notification_click tool.
pub fn click_impl(params: NotificationClickParams) -> Result<CallToolResult, McpError> {
    let outcome: ClickOutcome = on_click(params.action.as_deref());
    json_result(&outcome)
}
