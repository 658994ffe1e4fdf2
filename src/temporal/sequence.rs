//! The Discrete-sequence and Continuous-sequence subtypes (C4).
//!
//! Spec §3 lists these as two subtypes of the tagged union, but they share
//! an identical data shape — an ordered array of instants plus inclusive
//! bound flags — differing only in their [`Interpolation`] tag (`Discrete`
//! forces both bounds closed and forbids a segment interpretation between
//! instants; `Step`/`Linear` are the two continuous interpolation modes).
//! This crate therefore models both with one `Sequence<B>` struct rather
//! than two duplicated structs; see DESIGN.md for the corresponding Open
//! Question resolution.

use crate::base_type::BaseType;
use crate::collections::span::{Span, SpanElement};
use crate::error::{MeosError, MeosResult};
use crate::time::Timestamp;

use super::flags::Interpolation;
use super::instant::Instant;

#[derive(Debug, Clone, PartialEq)]
pub struct Sequence<B: BaseType> {
    instants: Vec<Instant<B>>,
    lower_inc: bool,
    upper_inc: bool,
    interpolation: Interpolation,
}

impl<B: BaseType> Sequence<B> {
    /// Builds a sequence from already-final (possibly normalized) instants,
    /// validating the invariants of spec §3/§4.5 step 1. Callers that want
    /// normalization or join-on-adjacency go through
    /// [`crate::temporal::builder`] instead, which calls this as its last step.
    pub fn try_new(
        instants: Vec<Instant<B>>,
        lower_inc: bool,
        upper_inc: bool,
        interpolation: Interpolation,
    ) -> MeosResult<Self> {
        if instants.is_empty() {
            return Err(MeosError::invalid_arg_value("sequence_make", "a sequence needs at least one instant"));
        }
        for w in instants.windows(2) {
            if w[0].t >= w[1].t {
                return Err(MeosError::invalid_arg_value("sequence_make", "timestamps must be strictly increasing"));
            }
        }
        if interpolation == Interpolation::Linear && !B::CONTINUOUS {
            return Err(MeosError::invalid_arg_type(
                "sequence_make",
                "linear interpolation requires a continuous base type",
            ));
        }
        let (lower_inc, upper_inc) = if interpolation == Interpolation::Discrete {
            // Discrete sequences are a set of samples; bounds are implicitly closed.
            (true, true)
        } else {
            (lower_inc, upper_inc)
        };
        if instants.len() == 1 && !(lower_inc && upper_inc) {
            return Err(MeosError::invalid_arg_value("sequence_make", "a singleton sequence must have both bounds inclusive"));
        }
        if interpolation == Interpolation::Step && !upper_inc && instants.len() >= 2 {
            let last = &instants[instants.len() - 1];
            let penultimate = &instants[instants.len() - 2];
            if !last.value.eq_value(&penultimate.value) {
                return Err(MeosError::invalid_arg_value(
                    "sequence_make",
                    "a step sequence with exclusive upper bound must repeat its last value",
                ));
            }
        }
        Ok(Self { instants, lower_inc, upper_inc, interpolation })
    }

    pub fn n(&self) -> usize {
        self.instants.len()
    }

    pub fn instant_at(&self, i: usize) -> Option<&Instant<B>> {
        self.instants.get(i)
    }

    pub fn instants(&self) -> &[Instant<B>] {
        &self.instants
    }

    pub fn start_instant(&self) -> &Instant<B> {
        &self.instants[0]
    }

    pub fn end_instant(&self) -> &Instant<B> {
        self.instants.last().expect("a sequence always has at least one instant")
    }

    pub fn start_timestamp(&self) -> Timestamp {
        self.start_instant().t
    }

    pub fn end_timestamp(&self) -> Timestamp {
        self.end_instant().t
    }

    pub fn duration(&self) -> crate::time::Interval {
        self.end_timestamp() - self.start_timestamp()
    }

    pub fn lower_inc(&self) -> bool {
        self.lower_inc
    }

    pub fn upper_inc(&self) -> bool {
        self.upper_inc
    }

    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    pub fn is_discrete(&self) -> bool {
        self.interpolation == Interpolation::Discrete
    }

    /// The period covered by this sequence, as a time span (spec §4.4 `time`).
    pub fn time_span(&self) -> Span<Timestamp> {
        Span::new(self.start_timestamp(), self.end_timestamp(), self.lower_inc, self.upper_inc)
            .expect("a sequence's own bounds are already validated")
    }

    /// Distinct base values present in the sequence, sorted ascending and
    /// deduplicated (spec §4.4 `values`). Requires a total order; callers on
    /// a base type without one (e.g. points) should use [`Sequence::instants`] directly.
    pub fn values(&self) -> Vec<B> {
        let mut out: Vec<B> = Vec::with_capacity(self.instants.len());
        for inst in &self.instants {
            if !out.iter().any(|v| inst.value.eq_value(v)) {
                out.push(inst.value.clone());
            }
        }
        out.sort_by(|a, b| a.cmp_value(b).unwrap_or(std::cmp::Ordering::Equal));
        out
    }

    pub fn min_value(&self) -> Option<&B> {
        self.instants
            .iter()
            .map(|i| &i.value)
            .min_by(|a, b| a.cmp_value(b).unwrap_or(std::cmp::Ordering::Equal))
    }

    pub fn max_value(&self) -> Option<&B> {
        self.instants
            .iter()
            .map(|i| &i.value)
            .max_by(|a, b| a.cmp_value(b).unwrap_or(std::cmp::Ordering::Equal))
    }

    /// Binary search for the exact timestamp `t` (discrete sequences' "locate" accessor).
    pub fn locate(&self, t: Timestamp) -> Result<usize, usize> {
        self.instants.binary_search_by(|inst| inst.t.cmp(&t))
    }

    /// Finds the segment `[i, i+1]` whose timestamps bracket `t`, or the
    /// lone index if `t` coincides with an endpoint.
    fn segment_containing(&self, t: Timestamp) -> Option<usize> {
        if t < self.start_timestamp() || t > self.end_timestamp() {
            return None;
        }
        match self.locate(t) {
            Ok(i) => Some(i.min(self.instants.len().saturating_sub(2).max(i))),
            Err(insert_at) => {
                if insert_at == 0 || insert_at >= self.instants.len() {
                    None
                } else {
                    Some(insert_at - 1)
                }
            }
        }
    }

    /// `value_at(t, strict)` for this sequence (spec §4.7).
    pub fn value_at(&self, t: Timestamp, strict: bool) -> Option<B> {
        if self.is_discrete() {
            return self.locate(t).ok().map(|i| self.instants[i].value.clone());
        }
        if t == self.start_timestamp() {
            return if self.lower_inc || !strict { Some(self.start_instant().value.clone()) } else { None };
        }
        if t == self.end_timestamp() {
            return if self.upper_inc || !strict { Some(self.end_instant().value.clone()) } else { None };
        }
        let i = self.segment_containing(t)?;
        if let Ok(exact) = self.locate(t) {
            return Some(self.instants[exact].value.clone());
        }
        let (a, b) = (&self.instants[i], &self.instants[i + 1]);
        Some(crate::temporal::sync::segment_value_at_time(a, b, self.interpolation, t))
    }
}

impl<B: BaseType + SpanElement> Sequence<B> {
    /// The value span covered by this sequence (spec §4.4 `value_spans`,
    /// single-span case), for base types that are also [`SpanElement`]s
    /// (the numeric base types).
    pub fn value_span(&self) -> MeosResult<Span<B>> {
        let min = self.min_value().cloned().expect("a sequence always has at least one instant");
        let max = self.max_value().cloned().expect("a sequence always has at least one instant");
        Span::new(min, max, true, true)
    }
}

impl<B: crate::bbox::HasBbox> Sequence<B> {
    /// The typed bounding box folded over every instant (spec §3/§9: "Every
    /// temporal also carries a typed bounding box... builders and mutators
    /// recompute it").
    pub fn bbox(&self) -> B::Bbox {
        crate::bbox::fold_bbox(self.instants.iter().map(|i| (i.value.clone(), i.t)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::Timestamp;
    use chrono::TimeZone;

    fn ts(s: &str) -> Timestamp {
        chrono::Utc.datetime_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn singleton_requires_both_bounds_inclusive() {
        let inst = Instant::new(1.0_f64, ts("2000-01-01 00:00:00"));
        assert!(Sequence::try_new(vec![inst.clone()], true, false, Interpolation::Linear).is_err());
        assert!(Sequence::try_new(vec![inst], true, true, Interpolation::Linear).is_ok());
    }

    #[test]
    fn linear_value_at_interpolates() {
        let seq = Sequence::try_new(
            vec![
                Instant::new(1.0_f64, ts("2000-01-01 00:00:00")),
                Instant::new(3.0_f64, ts("2000-01-02 00:00:00")),
                Instant::new(2.0_f64, ts("2000-01-03 00:00:00")),
            ],
            true,
            false,
            Interpolation::Linear,
        )
        .unwrap();
        let mid = ts("2000-01-01 12:00:00");
        assert_eq!(seq.value_at(mid, true), Some(2.0));
    }

    #[test]
    fn exclusive_upper_bound_fails_in_strict_mode() {
        let seq = Sequence::try_new(
            vec![
                Instant::new(1.0_f64, ts("2000-01-01 00:00:00")),
                Instant::new(2.0_f64, ts("2000-01-02 00:00:00")),
            ],
            true,
            false,
            Interpolation::Linear,
        )
        .unwrap();
        let end = ts("2000-01-02 00:00:00");
        assert_eq!(seq.value_at(end, true), None);
        assert_eq!(seq.value_at(end, false), Some(2.0));
    }
}
