//! Per-id record of the last upstream check.
//!
//! Process lifetime only. After a restart every id is stale once, which
//! costs one extra upstream check; the snapshots on disk stay authoritative.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, TimeDelta, Utc};
use seadex_rss_core::TrackedId;

#[derive(Debug)]
pub struct StalenessTracker {
    interval: TimeDelta,
    last_checked: Mutex<HashMap<TrackedId, DateTime<Utc>>>,
}

impl StalenessTracker {
    #[must_use]
    pub fn new(interval: TimeDelta) -> Self {
        Self { interval, last_checked: Mutex::new(HashMap::new()) }
    }

    #[must_use]
    pub const fn interval(&self) -> TimeDelta {
        self.interval
    }

    // A panic while holding the lock cannot leave the map half-written.
    fn lock(&self) -> MutexGuard<'_, HashMap<TrackedId, DateTime<Utc>>> {
        self.last_checked.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// True if `id` was never checked or its last check is more than one
    /// interval before `now`.
    #[must_use]
    pub fn should_refresh(&self, id: TrackedId, now: DateTime<Utc>) -> bool {
        is_stale(self.lock().get(&id).copied(), now, self.interval)
    }

    /// Record an attempt at `now`, whatever its result.
    pub fn mark_checked(&self, id: TrackedId, now: DateTime<Utc>) {
        self.lock().insert(id, now);
    }

    /// Check and mark under one lock. Of several concurrent callers for the
    /// same stale id, exactly one gets `true`.
    #[must_use]
    pub fn try_claim(&self, id: TrackedId, now: DateTime<Utc>) -> bool {
        let mut map = self.lock();
        if is_stale(map.get(&id).copied(), now, self.interval) {
            map.insert(id, now);
            true
        } else {
            false
        }
    }

    #[must_use]
    pub fn last_checked(&self, id: TrackedId) -> Option<DateTime<Utc>> {
        self.lock().get(&id).copied()
    }
}

fn is_stale(last: Option<DateTime<Utc>>, now: DateTime<Utc>, interval: TimeDelta) -> bool {
    last.is_none_or(|last| now.signed_duration_since(last) > interval)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn tracker() -> StalenessTracker {
        StalenessTracker::new(TimeDelta::minutes(240))
    }

    #[test]
    fn unknown_id_is_stale() {
        assert!(tracker().should_refresh(TrackedId::new(1), t0()));
    }

    #[test]
    fn fresh_within_interval() {
        let tracker = tracker();
        let id = TrackedId::new(1);
        tracker.mark_checked(id, t0());
        assert!(!tracker.should_refresh(id, t0() + TimeDelta::minutes(239)));
    }

    #[test]
    fn exactly_one_interval_is_still_fresh() {
        let tracker = tracker();
        let id = TrackedId::new(1);
        tracker.mark_checked(id, t0());
        assert!(!tracker.should_refresh(id, t0() + TimeDelta::minutes(240)));
        assert!(tracker.should_refresh(id, t0() + TimeDelta::minutes(240) + TimeDelta::seconds(1)));
    }

    #[test]
    fn clock_going_backwards_is_not_stale() {
        let tracker = tracker();
        let id = TrackedId::new(1);
        tracker.mark_checked(id, t0());
        assert!(!tracker.should_refresh(id, t0() - TimeDelta::hours(10)));
    }

    #[test]
    fn ids_are_independent() {
        let tracker = tracker();
        tracker.mark_checked(TrackedId::new(1), t0());
        assert!(tracker.should_refresh(TrackedId::new(2), t0()));
    }

    #[test]
    fn try_claim_marks_once() {
        let tracker = tracker();
        let id = TrackedId::new(9);
        assert!(tracker.try_claim(id, t0()));
        assert!(!tracker.try_claim(id, t0()));
        assert_eq!(tracker.last_checked(id), Some(t0()));
    }

    #[test]
    fn zero_interval_refreshes_on_any_later_instant() {
        let tracker = StalenessTracker::new(TimeDelta::zero());
        let id = TrackedId::new(3);
        assert!(tracker.try_claim(id, t0()));
        assert!(!tracker.try_claim(id, t0()));
        assert!(tracker.try_claim(id, t0() + TimeDelta::milliseconds(1)));
    }
}
