/// Database primary keys handed over by the persistence layer.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Section identifiers are opaque strings assigned by the page editor.
pub type SectionId = String;
