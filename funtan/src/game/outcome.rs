//! Uniform operation result handed to dispatchers.

use super::errors::{GameResult, ReasonCode};
use serde::{Deserialize, Serialize};

/// Serializable result of one engine call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Client-safe message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<ReasonCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_secs: Option<i64>,
}

impl<T> Outcome<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            reason: None,
            retry_after_secs: None,
        }
    }

    /// Whether a failure is a "not yet" rather than a real error
    pub fn is_informational(&self) -> bool {
        self.reason.is_some_and(|r| r.is_informational())
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome {
            success: self.success,
            data: self.data.map(f),
            error: self.error,
            reason: self.reason,
            retry_after_secs: self.retry_after_secs,
        }
    }
}

impl<T> From<GameResult<T>> for Outcome<T> {
    fn from(result: GameResult<T>) -> Self {
        match result {
            Ok(data) => Outcome::ok(data),
            Err(err) => Outcome {
                success: false,
                data: None,
                error: Some(err.client_message()),
                reason: Some(err.reason()),
                retry_after_secs: err.remaining_secs(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::errors::GameError;

    #[test]
    fn test_success_outcome() {
        let outcome: Outcome<i64> = Ok(42).into();
        assert!(outcome.success);
        assert_eq!(outcome.data, Some(42));
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            serde_json::json!({"success": true, "data": 42})
        );
    }

    #[test]
    fn test_failure_outcome_carries_reason_and_retry() {
        let outcome: Outcome<i64> = Err(GameError::StillWorking { remaining_secs: 90 }).into();
        assert!(!outcome.success);
        assert_eq!(outcome.reason, Some(ReasonCode::StillWorking));
        assert_eq!(outcome.retry_after_secs, Some(90));
        assert!(outcome.is_informational());
        assert!(outcome.error.unwrap().contains("1 minute, 30 seconds"));
    }

    #[test]
    fn test_internal_failure_hides_details() {
        let outcome: Outcome<()> = Err(GameError::Store("disk on fire".to_string())).into();
        assert_eq!(outcome.reason, Some(ReasonCode::Error));
        assert!(!outcome.error.as_ref().unwrap().contains("disk"));
        assert!(!outcome.is_informational());
    }
}
