//! Interval arithmetic with half-open endpoint semantics.
//!
//! Every period in the input data (encounter stays, location stays,
//! procedure runs) is treated as the half-open range `[start, end)`. An
//! interval ending exactly at midnight therefore belongs to the preceding
//! calendar day. All components share this implementation so that boundary
//! handling cannot drift between the classifier, the length-of-stay
//! calculator and the timeline bucketing.

use chrono::NaiveDateTime;

/// A half-open time interval `[start, end)` with an optionally open end.
///
/// A missing end means the interval is still running. Whether an open end
/// extends to the evaluation time or is clipped to some outer bound depends
/// on the caller; both readings go through [`Interval::clipped_end`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    /// Inclusive start of the interval
    pub start: NaiveDateTime,
    /// Exclusive end, absent while the interval is still open
    pub end: Option<NaiveDateTime>,
}

impl Interval {
    /// Create a closed interval. Returns `None` if `end < start`.
    #[must_use]
    pub fn closed(start: NaiveDateTime, end: NaiveDateTime) -> Option<Self> {
        if end < start {
            return None;
        }
        Some(Self {
            start,
            end: Some(end),
        })
    }

    /// Create an interval that is still open.
    #[must_use]
    pub const fn open_ended(start: NaiveDateTime) -> Self {
        Self { start, end: None }
    }

    /// Whether the interval has no recorded end.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.end.is_none()
    }

    /// The effective end used in computations: the recorded end or, for an
    /// open interval, the given bound, whichever comes first.
    #[must_use]
    pub fn clipped_end(&self, bound: NaiveDateTime) -> NaiveDateTime {
        match self.end {
            Some(end) => end.min(bound),
            None => bound,
        }
    }

    /// Whether `instant` falls inside `[start, end)`. Open intervals cover
    /// every instant at or after their start.
    #[must_use]
    pub fn covers(&self, instant: NaiveDateTime) -> bool {
        if instant < self.start {
            return false;
        }
        match self.end {
            Some(end) => instant < end,
            None => true,
        }
    }

    /// Intersection of two intervals, preserving open ends.
    ///
    /// Returns `None` when the ranges do not overlap or the overlap is
    /// empty (half-open semantics: touching endpoints do not count). The
    /// result is open only if it is bounded by no recorded end at all.
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let start = self.start.max(other.start);
        let end = match (self.end, other.end) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (Some(a), None) => Some(a),
            (None, Some(b)) => Some(b),
            (None, None) => None,
        };
        match end {
            Some(e) if e <= start => None,
            _ => Some(Self { start, end }),
        }
    }

    /// Duration of the interval in whole seconds, clipped to `bound`.
    /// Empty or inverted ranges yield zero.
    #[must_use]
    pub fn seconds(&self, bound: NaiveDateTime) -> i64 {
        let end = self.clipped_end(bound);
        (end - self.start).num_seconds().max(0)
    }
}

/// Merge overlapping or touching closed intervals into disjoint spans.
///
/// Used to de-duplicate ICU stays before summing durations: a patient with
/// overlapping ICU and ICU-with-support location records must not
/// contribute the overlap twice.
#[must_use]
pub fn merge_union(mut intervals: Vec<Interval>) -> Vec<Interval> {
    intervals.retain(|iv| iv.end.is_some());
    intervals.sort_by_key(|iv| (iv.start, iv.end));

    let mut merged: Vec<Interval> = Vec::with_capacity(intervals.len());
    for iv in intervals {
        let extends_last = merged
            .last()
            .is_some_and(|last| iv.start <= last.end.expect("merged intervals are closed"));
        if extends_last {
            let last = merged.last_mut().expect("checked non-empty");
            last.end = last.end.max(iv.end);
        } else {
            merged.push(iv);
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, 3, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn touching_endpoints_do_not_intersect() {
        let a = Interval::closed(at(1, 0), at(2, 0)).unwrap();
        let b = Interval::closed(at(2, 0), at(3, 0)).unwrap();
        assert!(a.intersect(&b).is_none());
    }

    #[test]
    fn intersection_with_open_interval_keeps_recorded_end() {
        let stay = Interval::open_ended(at(1, 0));
        let run = Interval::closed(at(2, 0), at(3, 0)).unwrap();
        let overlap = stay.intersect(&run).unwrap();
        assert_eq!(overlap.start, at(2, 0));
        assert_eq!(overlap.end, Some(at(3, 0)));

        let both_open = stay.intersect(&Interval::open_ended(at(2, 0))).unwrap();
        assert!(both_open.is_open());
    }

    #[test]
    fn open_interval_is_clipped_to_bound() {
        let iv = Interval::open_ended(at(1, 12));
        assert_eq!(iv.clipped_end(at(2, 12)), at(2, 12));
        assert_eq!(iv.seconds(at(2, 12)), 24 * 3600);
    }

    #[test]
    fn midnight_end_is_exclusive() {
        let iv = Interval::closed(at(1, 0), at(2, 0)).unwrap();
        assert!(iv.covers(at(1, 23)));
        assert!(!iv.covers(at(2, 0)));
    }

    #[test]
    fn union_merges_overlaps() {
        let merged = merge_union(vec![
            Interval::closed(at(1, 0), at(3, 0)).unwrap(),
            Interval::closed(at(2, 0), at(4, 0)).unwrap(),
            Interval::closed(at(6, 0), at(7, 0)).unwrap(),
        ]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].start, at(1, 0));
        assert_eq!(merged[0].end, Some(at(4, 0)));
    }
}
