use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::validation::FieldError;

/// Request body for both register and login.
/// Fields stay untyped JSON so a missing or mistyped one surfaces as a field error,
/// not a parse failure of the whole body.
#[derive(Debug, Default, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default, deserialize_with = "present")]
    pub username: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub password: Option<Value>,
}

impl CredentialsRequest {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: Some(Value::String(username.into())),
            password: Some(Value::String(password.into())),
        }
    }
}

// An explicit `null` is a present field of the wrong type, not a missing one.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }
}
