/// User and account identifiers are PostgreSQL BIGINT. Job ids are opaque
/// UUIDs and use [`uuid::Uuid`] directly.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
