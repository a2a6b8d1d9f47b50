use crate::locale::Scheme;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A message stored in a chat room log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRecord {
    /// Unique record identifier
    pub id: String,

    pub text: String,

    /// Whether the user (rather than the assistant or an agent) wrote it
    #[serde(default)]
    pub is_user: bool,

    #[serde(default = "default_user_id")]
    pub user_id: String,

    /// When the record was appended
    pub timestamp: DateTime<Utc>,
}

/// A record about to be appended; the store assigns id and timestamp
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRecord {
    pub text: String,
    #[serde(default = "default_is_user")]
    pub is_user: bool,
    pub user_id: Option<String>,
}

impl ChatRecord {
    pub fn from_new(record: NewRecord) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            text: record.text,
            is_user: record.is_user,
            user_id: record.user_id.unwrap_or_else(default_user_id),
            timestamp: Utc::now(),
        }
    }
}

fn default_user_id() -> String {
    "user".to_string()
}

fn default_is_user() -> bool {
    true
}

/// Room identifier for a user's conversation about a scheme
///
/// Format: `chats/<scheme>/<user>`; without a user a fresh anonymous id is generated.
pub fn room_id(scheme: Scheme, user_id: Option<&str>) -> String {
    let user = match user_id {
        Some(user) if !user.trim().is_empty() => user.trim().to_string(),
        _ => anonymous_user_id(),
    };
    format!("chats/{}/{}", scheme.key(), user)
}

/// `user_<unix millis>_<9 random chars>`
pub fn anonymous_user_id() -> String {
    let suffix: String = uuid::Uuid::new_v4().simple().to_string().chars().take(9).collect();
    format!("user_{}_{}", Utc::now().timestamp_millis(), suffix)
}
