/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Outcome of a resolve-or-create lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved<T> {
    /// The entity did not exist and was created by this call.
    Created(T),
    /// The entity already existed and was returned unchanged.
    Existing(T),
}

impl<T> Resolved<T> {
    pub fn is_created(&self) -> bool {
        matches!(self, Resolved::Created(_))
    }

    pub fn get(&self) -> &T {
        match self {
            Resolved::Created(v) | Resolved::Existing(v) => v,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Resolved::Created(v) | Resolved::Existing(v) => v,
        }
    }
}
