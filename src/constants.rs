pub const MAX_SCORES: usize = 10;
pub const SCORES_KEY: &str = "high-scores";

pub const MAX_NAME_LENGTH: usize = 15;
pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 100_000.0;

// Times tables a game can be played on
pub const MIN_TABLE: f64 = 2.0;
pub const MAX_TABLE: f64 = 12.0;

// Largest request body read before a submission is rejected as invalid
pub const MAX_PAYLOAD_BYTES: usize = 4 * 1024 * 1024;
