use crate::api::error::ApiError;
use crate::constants::{
    MAX_NAME_LENGTH, MAX_SCORE, MAX_SCORES, MAX_TABLE, MIN_SCORE, MIN_TABLE, SCORES_KEY,
};
use crate::error::StoreError;
use crate::models::{Leaderboard, ScoreEntry};
use crate::store::ScoreStore;
use crate::util::{function, is_truthy, to_display_string, to_number};
use anyhow::Result;
use chrono::{DateTime, Datelike, Utc};
use serde_json::{Number, Value};

/// A submission that passed validation and is ready to be merged.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreSubmission {
    pub name: String,
    pub score: f64,
    pub questions: Option<Number>,
    pub tables: Option<Vec<Number>>,
}

impl ScoreSubmission {
    pub fn parse(body: &[u8]) -> Result<Self, ApiError> {
        let body: Value = serde_json::from_slice(body).map_err(|_| ApiError::InvalidPayload)?;
        Self::from_value(&body)
    }

    /// Checks are applied in order: name, then score. Optional fields never fail.
    pub fn from_value(body: &Value) -> Result<Self, ApiError> {
        let field = |key: &str| body.get(key).unwrap_or(&Value::Null);

        let name: String = [field("name"), field("initials")]
            .into_iter()
            .find(|value| is_truthy(value))
            .map(to_display_string)
            .unwrap_or_default()
            .trim()
            .chars()
            .take(MAX_NAME_LENGTH)
            .collect();
        if name.is_empty() {
            return Err(ApiError::InvalidName);
        }

        let score = match field("score") {
            Value::Number(n) => n.as_f64(),
            _ => None,
        }
        .filter(|score| (MIN_SCORE..=MAX_SCORE).contains(score))
        .ok_or(ApiError::InvalidScore)?;

        let questions = match field("questions") {
            Value::Number(n) => Some(n.clone()),
            _ => None,
        };

        // Elements that are out of range or not numeric at all are dropped
        let tables = field("tables").as_array().map(|items| {
            items
                .iter()
                .map(to_number)
                .filter(|n| (MIN_TABLE..=MAX_TABLE).contains(n))
                .filter_map(number_from_f64)
                .collect::<Vec<_>>()
        });

        Ok(ScoreSubmission {
            name,
            score,
            questions,
            tables,
        })
    }
}

fn number_from_f64(n: f64) -> Option<Number> {
    if n.fract() == 0.0 {
        Some(Number::from(n as i64))
    } else {
        Number::from_f64(n)
    }
}

pub fn new_entry(submission: ScoreSubmission, now: DateTime<Utc>) -> ScoreEntry {
    ScoreEntry {
        name: submission.name,
        score: submission.score.round() as i64,
        questions: submission.questions,
        tables: submission.tables,
        date: format!("{}/{}", now.day(), now.month()),
        ts: now.timestamp_millis(),
    }
}

/// Appends `entry`, orders by descending score and keeps the top `MAX_SCORES`.
///
/// The sort is stable, so an entry tying an existing score lands after it.
pub fn merge_entry(mut leaderboard: Leaderboard, entry: ScoreEntry) -> Leaderboard {
    leaderboard.push(entry);
    leaderboard.sort_by(|a, b| b.score.cmp(&a.score));
    leaderboard.truncate(MAX_SCORES);
    leaderboard
}

pub fn get_scores(store: &dyn ScoreStore) -> Result<Leaderboard> {
    let leaderboard = match store.get(SCORES_KEY)? {
        None | Some(Value::Null) => Vec::new(),
        Some(value) => serde_json::from_value(value).map_err(|err| StoreError {
            key: SCORES_KEY.to_owned(),
            function: function!(),
            error: err.into(),
        })?,
    };
    Ok(leaderboard)
}

/// Read-modify-write of the stored leaderboard.
///
/// Not atomic: two submissions racing each other can read the same snapshot
/// and the later write silently discards the other entry.
pub fn add_score(
    store: &dyn ScoreStore,
    submission: ScoreSubmission,
    now: DateTime<Utc>,
) -> Result<Leaderboard> {
    let leaderboard = get_scores(store)?;
    let leaderboard = merge_entry(leaderboard, new_entry(submission, now));
    store.put(SCORES_KEY, &serde_json::to_string(&leaderboard)?)?;
    Ok(leaderboard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::TimeZone;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn submission(body: Value) -> Result<ScoreSubmission, ApiError> {
        ScoreSubmission::from_value(&body)
    }

    fn entry(name: &str, score: i64) -> ScoreEntry {
        ScoreEntry {
            name: name.to_owned(),
            score,
            questions: None,
            tables: None,
            date: String::from("1/1"),
            ts: 0,
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 7, 12, 0, 0).unwrap()
    }

    /// Counts writes so tests can tell an unchanged board was still stored.
    #[derive(Default)]
    struct CountingStore {
        inner: MemoryStore,
        puts: AtomicUsize,
    }

    impl ScoreStore for CountingStore {
        fn get(&self, key: &str) -> Result<Option<Value>> {
            self.inner.get(key)
        }

        fn put(&self, key: &str, value: &str) -> Result<()> {
            self.puts.fetch_add(1, Ordering::SeqCst);
            self.inner.put(key, value)
        }
    }

    #[test]
    fn rejects_unparseable_body() {
        assert!(matches!(
            ScoreSubmission::parse(b"{not json"),
            Err(ApiError::InvalidPayload)
        ));
    }

    #[test]
    fn name_falls_back_to_initials() {
        let parsed = submission(json!({"initials": " JD ", "score": 10})).unwrap();
        assert_eq!(parsed.name, "JD");
        let parsed = submission(json!({"name": "", "initials": "AB", "score": 10})).unwrap();
        assert_eq!(parsed.name, "AB");
    }

    #[test]
    fn blank_name_is_rejected() {
        assert!(matches!(
            submission(json!({"name": "   ", "score": 10})),
            Err(ApiError::InvalidName)
        ));
        assert!(matches!(
            submission(json!({"score": 10})),
            Err(ApiError::InvalidName)
        ));
        // A whitespace name is still chosen over initials before trimming
        assert!(matches!(
            submission(json!({"name": "  ", "initials": "AB", "score": 10})),
            Err(ApiError::InvalidName)
        ));
    }

    #[test]
    fn non_string_names_are_stringified() {
        let parsed = submission(json!({"name": 42, "score": 1})).unwrap();
        assert_eq!(parsed.name, "42");
    }

    #[test]
    fn long_names_are_truncated() {
        let parsed = submission(json!({"name": "Bartholomew Fitzgerald", "score": 1})).unwrap();
        assert_eq!(parsed.name, "Bartholomew Fit");
        assert_eq!(parsed.name.chars().count(), MAX_NAME_LENGTH);
    }

    #[test]
    fn score_must_be_an_in_range_number() {
        for score in [json!(-1), json!(100001), json!("50"), json!(null), json!([5])] {
            assert!(matches!(
                submission(json!({"name": "Ann", "score": score})),
                Err(ApiError::InvalidScore)
            ));
        }
        assert!(submission(json!({"name": "Ann", "score": 0})).is_ok());
        assert!(submission(json!({"name": "Ann", "score": 100000})).is_ok());
    }

    #[test]
    fn name_is_checked_before_score() {
        assert!(matches!(
            submission(json!({"score": -5})),
            Err(ApiError::InvalidName)
        ));
    }

    #[test]
    fn optional_fields_are_normalized() {
        let parsed = submission(json!({
            "name": "Ann",
            "score": 5,
            "questions": "twenty",
            "tables": [1, 2, 13, 7],
        }))
        .unwrap();
        assert_eq!(parsed.questions, None);
        assert_eq!(parsed.tables, Some(vec![Number::from(2), Number::from(7)]));

        let parsed = submission(json!({
            "name": "Ann",
            "score": 5,
            "questions": 20,
            "tables": ["3", "x", null, {}, 12, 2.5],
        }))
        .unwrap();
        assert_eq!(parsed.questions, Some(Number::from(20)));
        assert_eq!(
            parsed.tables,
            Some(vec![
                Number::from(3),
                Number::from(12),
                Number::from_f64(2.5).unwrap()
            ])
        );

        let parsed = submission(json!({"name": "Ann", "score": 5, "tables": "2,3"})).unwrap();
        assert_eq!(parsed.tables, None);
    }

    #[test]
    fn date_uses_utc_calendar_day() {
        let parsed = submission(json!({"name": "Ann", "score": 1})).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 0).unwrap();
        assert_eq!(new_entry(parsed, late).date, "31/12");
    }

    #[test]
    fn new_entry_rounds_and_stamps() {
        let parsed = submission(json!({"name": "Ann", "score": 49.5})).unwrap();
        let entry = new_entry(parsed, fixed_now());
        assert_eq!(entry.score, 50);
        assert_eq!(entry.date, "7/3");
        assert_eq!(entry.ts, fixed_now().timestamp_millis());
    }

    #[test]
    fn merge_sorts_and_truncates() {
        let leaderboard: Leaderboard = (1..=10).map(|i| entry(&format!("p{i}"), i * 10)).collect();
        let merged = merge_entry(leaderboard, entry("new", 55));
        assert_eq!(merged.len(), MAX_SCORES);
        assert_eq!(merged[0].score, 100);
        assert_eq!(merged[5].name, "new");
        assert!(merged.windows(2).all(|w| w[0].score >= w[1].score));
        assert!(merged.iter().all(|e| e.score != 10));
    }

    #[test]
    fn merge_keeps_existing_entry_ahead_on_tie() {
        let merged = merge_entry(vec![entry("old", 30)], entry("new", 30));
        assert_eq!(merged[0].name, "old");
        assert_eq!(merged[1].name, "new");
    }

    #[test]
    fn add_score_persists_the_merged_board() {
        let store = MemoryStore::new();
        let parsed = submission(json!({"name": "Ann", "score": 50})).unwrap();
        let leaderboard = add_score(&store, parsed, fixed_now()).unwrap();
        assert_eq!(leaderboard.len(), 1);
        assert_eq!(get_scores(&store).unwrap(), leaderboard);
        assert_eq!(
            store.get(SCORES_KEY).unwrap().unwrap(),
            json!([{
                "name": "Ann",
                "score": 50,
                "questions": null,
                "tables": null,
                "date": "7/3",
                "ts": fixed_now().timestamp_millis(),
            }])
        );
    }

    #[test]
    fn low_score_on_full_board_is_dropped_but_rewritten() {
        let store = CountingStore::default();
        let full: Leaderboard = (1..=10).map(|i| entry(&format!("p{i}"), i * 10)).collect();
        store
            .inner
            .put(SCORES_KEY, &serde_json::to_string(&full).unwrap())
            .unwrap();
        let parsed = submission(json!({"name": "Low", "score": 1})).unwrap();
        let leaderboard = add_score(&store, parsed, fixed_now()).unwrap();
        let mut expected = full;
        expected.reverse();
        assert_eq!(leaderboard, expected);
        assert_eq!(get_scores(&store).unwrap(), expected);
        assert_eq!(store.puts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn stored_null_reads_as_empty() {
        let store = MemoryStore::new();
        store.put(SCORES_KEY, "null").unwrap();
        assert!(get_scores(&store).unwrap().is_empty());
    }
}
