use std::collections::HashMap;

use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use crate::auth::repo_types::UserRecord;

const KEY_PREFIX: &str = "user:";

pub(crate) const FIELD_USERNAME: &str = "username";
pub(crate) const FIELD_PASSWORD_HASH: &str = "passwordHash";
pub(crate) const FIELD_CREATED_AT: &str = "createdAt";

impl UserRecord {
    /// Build a fresh record stamped with the current time.
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password_hash: password_hash.into(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    /// Store key for a username.
    pub fn key(username: &str) -> String {
        format!("{}{}", KEY_PREFIX, username)
    }

    /// Flatten into string hash fields.
    pub fn to_fields(&self) -> anyhow::Result<Vec<(&'static str, String)>> {
        Ok(vec![
            (FIELD_USERNAME, self.username.clone()),
            (FIELD_PASSWORD_HASH, self.password_hash.clone()),
            (FIELD_CREATED_AT, self.created_at.format(&Rfc3339)?),
        ])
    }

    /// Rebuild a record from hash fields. A hash without `passwordHash` is no record at all.
    pub fn from_fields(
        username: &str,
        mut fields: HashMap<String, String>,
    ) -> anyhow::Result<Option<Self>> {
        let Some(password_hash) = fields.remove(FIELD_PASSWORD_HASH).filter(|h| !h.is_empty())
        else {
            return Ok(None);
        };

        let created_at = match fields.remove(FIELD_CREATED_AT) {
            Some(raw) => OffsetDateTime::parse(&raw, &Rfc3339)
                .map_err(|e| anyhow::anyhow!("bad createdAt for {}: {}", username, e))?,
            None => anyhow::bail!("record for {} has no createdAt", username),
        };

        Ok(Some(Self {
            username: fields
                .remove(FIELD_USERNAME)
                .unwrap_or_else(|| username.to_string()),
            password_hash,
            created_at,
        }))
    }
}
