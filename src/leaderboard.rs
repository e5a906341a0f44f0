//! Leaderboard
//!
//! Score records live in an external store reached over HTTP. The same
//! validation rules run on both sides so a bad submission never costs a round
//! trip. `MemoryLeaderboard` follows the store's ordering rules for offline play
//! and tests.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Entries returned by a leaderboard query
pub const LEADERBOARD_SIZE: usize = 10;

/// Longest accepted player name (UTF-16 code units, as the store counts)
pub const MAX_NAME_LEN: usize = 20;

/// A stored score record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub id: u64,
    pub name: String,
    pub score: u32,
}

/// A validated submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSubmission {
    pub name: String,
    pub score: u32,
}

/// Generic text shown when the store gave no usable message
const FALLBACK_MESSAGE: &str = "Could not reach the leaderboard, try again later.";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LeaderboardError {
    #[error("Name and score are required")]
    MissingName,
    #[error("Name must be less than {} characters.", MAX_NAME_LEN)]
    NameTooLong { len: usize },
    #[error("Name and score are required")]
    MissingScore,
    #[error("Score must be a non-negative integer")]
    InvalidScore,
    #[error("leaderboard unreachable: {0}")]
    Transport(String),
    #[error("leaderboard answered {status}: {message}")]
    Server { status: u16, message: String },
    #[error("unexpected leaderboard response: {0}")]
    Decode(String),
}

impl LeaderboardError {
    /// HTTP status this error corresponds to, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::MissingName
            | Self::NameTooLong { .. }
            | Self::MissingScore
            | Self::InvalidScore => Some(400),
            Self::Server { status, .. } => Some(*status),
            Self::Transport(_) | Self::Decode(_) => None,
        }
    }

    /// Text to show the player
    pub fn user_message(&self) -> String {
        match self {
            Self::Server { message, .. } if !message.is_empty() => message.clone(),
            Self::Server { .. } | Self::Transport(_) | Self::Decode(_) => FALLBACK_MESSAGE.to_string(),
            _ => self.to_string(),
        }
    }
}

/// Check a raw submission body against the store's rules
pub fn validate_submission(body: &Value) -> Result<ScoreSubmission, LeaderboardError> {
    let name = body
        .get("name")
        .filter(|v| is_present(v))
        .ok_or(LeaderboardError::MissingName)?;
    let score = body
        .get("score")
        .filter(|v| !v.is_null())
        .ok_or(LeaderboardError::MissingScore)?;

    // Present but not text: the store reports it with the length message
    let name = name
        .as_str()
        .ok_or(LeaderboardError::NameTooLong { len: 0 })?;
    check_name(name)?;

    let score = score
        .as_u64()
        .and_then(|s| u32::try_from(s).ok())
        .ok_or(LeaderboardError::InvalidScore)?;

    Ok(ScoreSubmission {
        name: name.to_string(),
        score,
    })
}

/// Falsy JSON values count as missing
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        _ => true,
    }
}

fn check_name(name: &str) -> Result<(), LeaderboardError> {
    if name.is_empty() {
        return Err(LeaderboardError::MissingName);
    }
    let len = name.encode_utf16().count();
    if len > MAX_NAME_LEN {
        return Err(LeaderboardError::NameTooLong { len });
    }
    Ok(())
}

/// Something scores can be reported to and read back from
pub trait ScoreReporter {
    /// Best scores, highest first
    fn top_scores(&self) -> Result<Vec<LeaderboardEntry>, LeaderboardError>;

    /// Record a score; returns the stored entry
    fn submit(&mut self, name: &str, score: u32) -> Result<LeaderboardEntry, LeaderboardError>;
}

/// In-process record store
#[derive(Debug, Clone, Default)]
pub struct MemoryLeaderboard {
    entries: Vec<LeaderboardEntry>,
    next_id: u64,
}

impl MemoryLeaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ScoreReporter for MemoryLeaderboard {
    fn top_scores(&self) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        let mut top = self.entries.clone();
        // Stable sort keeps insertion order between equal scores
        top.sort_by(|a, b| b.score.cmp(&a.score));
        top.truncate(LEADERBOARD_SIZE);
        Ok(top)
    }

    fn submit(&mut self, name: &str, score: u32) -> Result<LeaderboardEntry, LeaderboardError> {
        check_name(name)?;
        self.next_id += 1;
        let entry = LeaderboardEntry {
            id: self.next_id,
            name: name.to_string(),
            score,
        };
        self.entries.push(entry.clone());
        log::info!("Recorded {} for {} (id {})", score, name, entry.id);
        Ok(entry)
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use remote::HttpLeaderboard;

#[cfg(not(target_arch = "wasm32"))]
mod remote {
    use std::time::Duration;

    use serde::de::DeserializeOwned;
    use serde_json::Value;

    use super::{LeaderboardEntry, LeaderboardError, ScoreReporter, ScoreSubmission, check_name};

    const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

    /// Leaderboard served over HTTP
    pub struct HttpLeaderboard {
        base_url: String,
        agent: ureq::Agent,
    }

    impl HttpLeaderboard {
        pub fn new(base_url: impl Into<String>) -> Self {
            let agent = ureq::Agent::config_builder()
                .timeout_global(Some(REQUEST_TIMEOUT))
                .http_status_as_error(false)
                .build()
                .into();
            Self {
                base_url: base_url.into().trim_end_matches('/').to_string(),
                agent,
            }
        }

        fn read<T: DeserializeOwned>(
            response: ureq::http::Response<ureq::Body>,
        ) -> Result<T, LeaderboardError> {
            let status = response.status().as_u16();
            let mut body = response.into_body();
            if (200..300).contains(&status) {
                return body
                    .read_json::<T>()
                    .map_err(|e| LeaderboardError::Decode(e.to_string()));
            }

            let message = body
                .read_json::<Value>()
                .ok()
                .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
                .unwrap_or_default();
            Err(LeaderboardError::Server { status, message })
        }
    }

    impl ScoreReporter for HttpLeaderboard {
        fn top_scores(&self) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
            let url = format!("{}/leaderboard", self.base_url);
            let response = self
                .agent
                .get(&url)
                .call()
                .map_err(|e| LeaderboardError::Transport(e.to_string()))?;
            Self::read(response)
        }

        fn submit(&mut self, name: &str, score: u32) -> Result<LeaderboardEntry, LeaderboardError> {
            check_name(name)?;
            let url = format!("{}/add-score", self.base_url);
            let submission = ScoreSubmission {
                name: name.to_string(),
                score,
            };
            let response = self
                .agent
                .post(&url)
                .send_json(&submission)
                .map_err(|e| LeaderboardError::Transport(e.to_string()))?;
            let entry: LeaderboardEntry = Self::read(response)?;
            log::info!("Submitted {} for {} (id {})", score, name, entry.id);
            Ok(entry)
        }
    }
}
