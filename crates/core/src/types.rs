/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// External auth-provider user identifier (opaque string).
pub type UserId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
