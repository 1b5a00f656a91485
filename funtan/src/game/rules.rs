//! Pure reward, streak and timing rules.
//!
//! Everything here is a plain function of its inputs so the engine can stay a
//! thin transaction wrapper and the arithmetic can be tested in isolation.

use chrono::{DateTime, Duration, Utc};

/// Next streak value.
///
/// Continues (+1, capped) when there was a previous event no older than
/// `window`, otherwise restarts at 1.
pub fn next_streak(
    previous: i32,
    last: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    window: Duration,
    cap: i32,
) -> i32 {
    match last {
        Some(last) if now - last <= window && previous > 0 => previous.saturating_add(1).min(cap),
        _ => 1,
    }
}

/// Daily bronze for a streak: `base + (streak - 1) * bonus`, never negative
pub fn daily_reward(base: i64, bonus_per_day: i64, streak: i32) -> i64 {
    let extra_days = i64::from(streak.max(1) - 1);
    base.saturating_add(extra_days.saturating_mul(bonus_per_day))
        .max(0)
}

/// Work streak bonus: `bonus_per_day * (streak - 1)`, capped
pub fn work_bonus(bonus_per_day: i64, streak: i32, cap: i64) -> i64 {
    let extra_days = i64::from(streak.max(1) - 1);
    extra_days.saturating_mul(bonus_per_day).clamp(0, cap.max(0))
}

/// Win probability under the chance policy
pub fn hunt_chance(power: i64, threshold: i64) -> f64 {
    if threshold <= 0 {
        return 0.95;
    }
    (power as f64 / threshold as f64).clamp(0.05, 0.95)
}

/// `start + after`, or `None` when the result leaves chrono's range
pub fn deadline(start: DateTime<Utc>, after: Duration) -> Option<DateTime<Utc>> {
    start.checked_add_signed(after)
}

/// Whole seconds left until `deadline`, rounded up, never negative
pub fn remaining_secs(deadline: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let left = deadline - now;
    if left <= Duration::zero() {
        return 0;
    }
    let secs = left.num_seconds();
    if left > Duration::seconds(secs) {
        secs + 1
    } else {
        secs
    }
}

/// Human duration such as "2 hours, 5 minutes, 1 second".
///
/// Seconds are shown only when the value is under a minute or has a
/// non-zero seconds part. Zero renders as "0 seconds".
pub fn format_duration(total_secs: i64) -> String {
    let total = total_secs.max(0);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    let mut parts = Vec::with_capacity(3);
    if hours > 0 {
        parts.push(unit(hours, "hour"));
    }
    if minutes > 0 {
        parts.push(unit(minutes, "minute"));
    }
    if seconds > 0 || parts.is_empty() {
        parts.push(unit(seconds, "second"));
    }
    parts.join(", ")
}

fn unit(value: i64, name: &str) -> String {
    if value == 1 {
        format!("{value} {name}")
    } else {
        format!("{value} {name}s")
    }
}
