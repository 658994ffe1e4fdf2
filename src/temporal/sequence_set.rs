//! The Sequence-set subtype (C4): an ordered, non-overlapping list of
//! continuous sequences sharing one interpolation.

use crate::base_type::BaseType;
use crate::collections::span::Span;
use crate::error::{MeosError, MeosResult};
use crate::time::Timestamp;

use super::flags::Interpolation;
use super::sequence::Sequence;

#[derive(Debug, Clone, PartialEq)]
pub struct SequenceSet<B: BaseType> {
    sequences: Vec<Sequence<B>>,
    interpolation: Interpolation,
}

impl<B: BaseType> SequenceSet<B> {
    /// Builds a sequence set from already-final (non-overlapping, possibly
    /// normalized) sequences. See [`crate::temporal::builder`] for the
    /// validating/normalizing/joining constructor.
    pub fn try_new(sequences: Vec<Sequence<B>>) -> MeosResult<Self> {
        if sequences.is_empty() {
            return Err(MeosError::invalid_arg_value("sequenceset_make", "a sequence set needs at least one sequence"));
        }
        let interpolation = sequences[0].interpolation();
        for seq in &sequences {
            if seq.interpolation() != interpolation {
                return Err(MeosError::invalid_arg_type(
                    "sequenceset_make",
                    "all sequences in a sequence set must share the same interpolation",
                ));
            }
        }
        for w in sequences.windows(2) {
            let (a, b) = (&w[0], &w[1]);
            let ok = a.end_timestamp() < b.start_timestamp()
                || (a.end_timestamp() == b.start_timestamp() && !(a.upper_inc() && b.lower_inc()));
            if !ok {
                return Err(MeosError::invalid_arg_value(
                    "sequenceset_make",
                    "consecutive sequences must not overlap and may share at most one non-doubly-inclusive bound",
                ));
            }
        }
        Ok(Self { sequences, interpolation })
    }

    pub fn n(&self) -> usize {
        self.sequences.len()
    }

    pub fn sequence_at(&self, i: usize) -> Option<&Sequence<B>> {
        self.sequences.get(i)
    }

    pub fn sequences(&self) -> &[Sequence<B>] {
        &self.sequences
    }

    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    pub fn start_sequence(&self) -> &Sequence<B> {
        &self.sequences[0]
    }

    pub fn end_sequence(&self) -> &Sequence<B> {
        self.sequences.last().expect("a sequence set always has at least one sequence")
    }

    pub fn start_timestamp(&self) -> Timestamp {
        self.start_sequence().start_timestamp()
    }

    pub fn end_timestamp(&self) -> Timestamp {
        self.end_sequence().end_timestamp()
    }

    /// The total sampled time, as the disjoint union of each member
    /// sequence's period (spec §4.4 `time`).
    pub fn time_spans(&self) -> Vec<Span<Timestamp>> {
        self.sequences.iter().map(|s| s.time_span()).collect()
    }

    pub fn values(&self) -> Vec<B> {
        let mut out: Vec<B> = Vec::new();
        for seq in &self.sequences {
            for v in seq.values() {
                if !out.iter().any(|existing| existing.eq_value(&v)) {
                    out.push(v);
                }
            }
        }
        out.sort_by(|a, b| a.cmp_value(b).unwrap_or(std::cmp::Ordering::Equal));
        out
    }

    pub fn min_value(&self) -> Option<B> {
        self.sequences
            .iter()
            .filter_map(|s| s.min_value())
            .min_by(|a, b| a.cmp_value(b).unwrap_or(std::cmp::Ordering::Equal))
            .cloned()
    }

    pub fn max_value(&self) -> Option<B> {
        self.sequences
            .iter()
            .filter_map(|s| s.max_value())
            .max_by(|a, b| a.cmp_value(b).unwrap_or(std::cmp::Ordering::Equal))
            .cloned()
    }

    /// Locates the sequence enclosing `t` via binary search, then recurses
    /// into it (spec §4.7: "Sequence set: locate enclosing sequence via
    /// binary search then recurse").
    pub fn value_at(&self, t: Timestamp, strict: bool) -> Option<B> {
        let idx = self
            .sequences
            .partition_point(|s| s.end_timestamp() < t || (s.end_timestamp() == t && !s.upper_inc()));
        let seq = self.sequences.get(idx)?;
        if t < seq.start_timestamp() || t > seq.end_timestamp() {
            return None;
        }
        seq.value_at(t, strict)
    }
}

impl<B: crate::bbox::HasBbox> SequenceSet<B> {
    /// The typed bounding box folded over every instant of every member
    /// sequence (spec §3/§9).
    pub fn bbox(&self) -> B::Bbox {
        crate::bbox::fold_bbox(self.sequences.iter().flat_map(|s| s.instants().iter().map(|i| (i.value.clone(), i.t))))
    }
}
