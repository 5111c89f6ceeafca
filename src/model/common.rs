/// Persistent identifier (PI) of one digitized record.
pub type Pi = String;
