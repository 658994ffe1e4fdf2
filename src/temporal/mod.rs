//! The temporal value tree (C4) and everything built on top of it:
//! constructors/normalizer (C5), accessors/transformers (C7), and
//! synchronization (C8).

pub mod builder;
pub mod flags;
pub mod instant;
pub mod sequence;
pub mod sequence_set;
pub mod sync;
pub mod transform;

pub use flags::Interpolation;
pub use instant::Instant;
pub use sequence::Sequence;
pub use sequence_set::SequenceSet;

use crate::base_type::BaseType;
use crate::time::Timestamp;

/// The tagged value with (in spec terms) four subtypes. Discrete and
/// continuous sequences share the `Sequence` shape here — see
/// `sequence.rs`'s module doc for why — so the Rust sum type has three
/// variants rather than four.
#[derive(Debug, Clone, PartialEq)]
pub enum Temporal<B: BaseType> {
    Instant(Instant<B>),
    Sequence(Sequence<B>),
    SequenceSet(SequenceSet<B>),
}

impl<B: BaseType> Temporal<B> {
    pub fn start_timestamp(&self) -> Timestamp {
        match self {
            Temporal::Instant(i) => i.t,
            Temporal::Sequence(s) => s.start_timestamp(),
            Temporal::SequenceSet(ss) => ss.start_timestamp(),
        }
    }

    pub fn end_timestamp(&self) -> Timestamp {
        match self {
            Temporal::Instant(i) => i.t,
            Temporal::Sequence(s) => s.end_timestamp(),
            Temporal::SequenceSet(ss) => ss.end_timestamp(),
        }
    }

    pub fn duration(&self) -> crate::time::Interval {
        self.end_timestamp() - self.start_timestamp()
    }

    /// `value_at(t, strict)` (spec §4.7), dispatched by subtype.
    pub fn value_at(&self, t: Timestamp, strict: bool) -> Option<B> {
        match self {
            Temporal::Instant(i) => if i.t == t { Some(i.value.clone()) } else { None },
            Temporal::Sequence(s) => s.value_at(t, strict),
            Temporal::SequenceSet(ss) => ss.value_at(t, strict),
        }
    }

    pub fn values(&self) -> Vec<B> {
        match self {
            Temporal::Instant(i) => vec![i.value.clone()],
            Temporal::Sequence(s) => s.values(),
            Temporal::SequenceSet(ss) => ss.values(),
        }
    }

    pub fn min_value(&self) -> Option<B> {
        match self {
            Temporal::Instant(i) => Some(i.value.clone()),
            Temporal::Sequence(s) => s.min_value().cloned(),
            Temporal::SequenceSet(ss) => ss.min_value(),
        }
    }

    pub fn max_value(&self) -> Option<B> {
        match self {
            Temporal::Instant(i) => Some(i.value.clone()),
            Temporal::Sequence(s) => s.max_value().cloned(),
            Temporal::SequenceSet(ss) => ss.max_value(),
        }
    }

    pub fn interpolation(&self) -> Option<Interpolation> {
        match self {
            Temporal::Instant(_) => None,
            Temporal::Sequence(s) => Some(s.interpolation()),
            Temporal::SequenceSet(ss) => Some(ss.interpolation()),
        }
    }
}

impl<B: crate::bbox::HasBbox> Temporal<B> {
    /// The typed bounding box read-through (spec §4.4: "bounding box
    /// read-through"), dispatched by subtype and computed fresh each call —
    /// this crate keeps the box alongside the value only conceptually (spec
    /// §9's design note); recomputing from owned `Vec`s is cheap enough in
    /// safe Rust that caching it inline bought nothing but complexity (see
    /// DESIGN.md).
    pub fn bbox(&self) -> B::Bbox {
        match self {
            Temporal::Instant(i) => B::bbox_of_one(&i.value, i.t),
            Temporal::Sequence(s) => s.bbox(),
            Temporal::SequenceSet(ss) => ss.bbox(),
        }
    }
}
