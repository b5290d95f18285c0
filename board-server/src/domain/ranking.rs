use std::cmp::Ordering;

use chrono::{DateTime, Utc};

const MILLIS_PER_HOUR: f64 = 3_600_000.0;
const AGE_EXPONENT: f64 = 1.5;

/// Decay-weighted ranking value: `(score + 1) / (1 + age_hours)^1.5`.
///
/// Age is clamped at zero, so posts stamped slightly in the future (clock
/// skew between writers) rank as brand new instead of blowing up.
///
/// Decay only pulls values towards zero: a score of -1 is always 0, and
/// anything below -1 rises towards 0 as the post ages.
pub(crate) fn hot_score(raw_score: i64, created_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let age_hours = ((now - created_at).num_milliseconds() as f64 / MILLIS_PER_HOUR).max(0.0);
    (raw_score as f64 + 1.0) / (1.0 + age_hours).powf(AGE_EXPONENT)
}

/// Feed order: higher hot score first, then newer post, then higher id.
pub(crate) fn compare_ranked(
    (a_hot, a_created, a_id): (f64, DateTime<Utc>, i64),
    (b_hot, b_created, b_id): (f64, DateTime<Utc>, i64),
) -> Ordering {
    b_hot
        .total_cmp(&a_hot)
        .then_with(|| b_created.cmp(&a_created))
        .then_with(|| b_id.cmp(&a_id))
}
