use time::OffsetDateTime;

/// Persisted user record, one per username. Stored as a Redis hash via `to_fields`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub username: String,           // primary key
    pub password_hash: String,      // Argon2id PHC string
    pub created_at: OffsetDateTime, // creation timestamp
}
