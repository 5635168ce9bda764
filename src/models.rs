use serde::{Deserialize, Serialize};
use serde_json::Number;

/// One recorded result on the leaderboard.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ScoreEntry {
    pub name: String,
    pub score: i64,
    #[serde(default)]
    pub questions: Option<Number>,
    #[serde(default)]
    pub tables: Option<Vec<Number>>,
    pub date: String,
    pub ts: i64,
}

/// Highest score first, at most `MAX_SCORES` long.
pub type Leaderboard = Vec<ScoreEntry>;
