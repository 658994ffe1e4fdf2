//! Time/value span collections (C2): a generic `Span<T>`/`SpanSet<T>` pair
//! reused across every scalar domain a span can range over (`i32`, `f64`,
//! [`crate::time::Timestamp`]) instead of one hand-duplicated type per
//! domain.

pub mod span;
pub mod span_set;

pub use span::{Span, SpanElement};
pub use span_set::SpanSet;

/// `Span<Timestamp>`, the half-open time interval spec §3 calls a "time span".
pub type TsTzSpan = Span<crate::time::Timestamp>;
/// A disjoint, non-adjacent ordered set of [`TsTzSpan`]s.
pub type TsTzSpanSet = SpanSet<crate::time::Timestamp>;
/// `Span<i32>`, canonicalized upper-exclusive per spec §3.
pub type IntSpan = Span<i32>;
pub type IntSpanSet = SpanSet<i32>;
/// `Span<f64>`.
pub type FloatSpan = Span<f64>;
pub type FloatSpanSet = SpanSet<f64>;
