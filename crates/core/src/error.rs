use chrono::TimeDelta;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// The cooldown window since the last aggregation has not elapsed yet.
    #[error("Rate limit: please wait {} more minute(s) before updating", remaining_minutes(.remaining))]
    RateLimited { remaining: TimeDelta },
}

/// Whole minutes left in a cooldown window, rounded up.
pub fn remaining_minutes(remaining: &TimeDelta) -> i64 {
    let secs = remaining.num_seconds().max(0);
    (secs + 59) / 60
}
