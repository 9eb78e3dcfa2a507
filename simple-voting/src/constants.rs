/// NEP-297 `standard` field of the events emitted by this contract.
pub const EVENT_STANDARD: &str = "simple-voting";
pub const EVENT_VERSION: &str = "1.0.0";

/// Max number of questions returned by a single `get_questions` query.
pub const MAX_LIMIT: u32 = 100;
