//! Temporal Matcher
//!
//! Nearest-in-time lookup over an unordered record list. Records whose
//! timestamp does not parse are skipped. Ties go to the first record
//! encountered so results are stable for a given input order.

use chrono::{DateTime, TimeDelta, Utc};

use super::records::Timestamped;

/// A matched record with its parsed timestamp
#[derive(Debug)]
pub struct Match<'a, T> {
    pub record: &'a T,
    pub timestamp: DateTime<Utc>,
}

impl<T> Clone for Match<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Match<'_, T> {}

fn distance(a: DateTime<Utc>, b: DateTime<Utc>) -> TimeDelta {
    if a >= b { a - b } else { b - a }
}

/// Closest record to `target`, with the timestamp it was matched on
pub fn closest_match<T: Timestamped>(records: &[T], target: DateTime<Utc>) -> Option<Match<'_, T>> {
    let mut best: Option<(Match<'_, T>, TimeDelta)> = None;

    for record in records {
        let Some(timestamp) = record.timestamp() else {
            continue;
        };
        let diff = distance(timestamp, target);

        let better = match &best {
            Some((_, best_diff)) => diff < *best_diff,
            None => true,
        };
        if better {
            best = Some((Match { record, timestamp }, diff));
        }
    }

    best.map(|(m, _)| m)
}

/// Closest record to `target`, or `None` for an empty/unparseable list
pub fn closest<T: Timestamped>(records: &[T], target: DateTime<Utc>) -> Option<&T> {
    closest_match(records, target).map(|m| m.record)
}
