//! Generic half-open span `(lower, upper, lower_inc, upper_inc)` (spec §3/§4.2).

use std::cmp::Ordering;
use std::fmt;

use crate::error::{MeosError, MeosResult};
use crate::time::{Interval, Timestamp};

/// A scalar domain a [`Span`] can range over.
///
/// `Delta` is the type of a difference between two values (used by
/// `duration`/`shift`/`scale`); `IS_DISCRETE` types get their span
/// canonicalized to upper-exclusive form (spec §3: "Canonical form for
/// integer spans: upper-exclusive").
pub trait SpanElement: Clone + fmt::Debug + PartialOrd {
    type Delta: Copy + PartialOrd + fmt::Debug;

    const IS_DISCRETE: bool = false;

    fn sub(&self, other: &Self) -> Self::Delta;
    fn add_delta(&self, delta: Self::Delta) -> Self;
    fn scale_delta(delta: Self::Delta, factor: f64) -> Self::Delta;
    fn delta_is_positive(delta: Self::Delta) -> bool;
    /// `a / b` as a plain ratio, used to turn a target width into a scale factor.
    fn delta_ratio(a: Self::Delta, b: Self::Delta) -> f64;
    /// `self + 1` in the discrete domain; only called when `IS_DISCRETE`.
    fn successor(&self) -> Self {
        unimplemented!("successor is only defined for discrete span elements")
    }
}

impl SpanElement for i32 {
    type Delta = i32;
    const IS_DISCRETE: bool = true;

    fn sub(&self, other: &Self) -> i32 {
        self - other
    }
    fn add_delta(&self, delta: i32) -> Self {
        self + delta
    }
    fn scale_delta(delta: i32, factor: f64) -> i32 {
        (delta as f64 * factor).round() as i32
    }
    fn delta_is_positive(delta: i32) -> bool {
        delta > 0
    }
    fn delta_ratio(a: i32, b: i32) -> f64 {
        a as f64 / b as f64
    }
    fn successor(&self) -> Self {
        self + 1
    }
}

impl SpanElement for f64 {
    type Delta = f64;

    fn sub(&self, other: &Self) -> f64 {
        self - other
    }
    fn add_delta(&self, delta: f64) -> Self {
        self + delta
    }
    fn scale_delta(delta: f64, factor: f64) -> f64 {
        delta * factor
    }
    fn delta_is_positive(delta: f64) -> bool {
        delta > 0.0
    }
    fn delta_ratio(a: f64, b: f64) -> f64 {
        a / b
    }
}

impl SpanElement for Timestamp {
    type Delta = Interval;

    fn sub(&self, other: &Self) -> Interval {
        *self - *other
    }
    fn add_delta(&self, delta: Interval) -> Self {
        crate::time::timestamp_plus_interval(*self, delta)
    }
    fn scale_delta(delta: Interval, factor: f64) -> Interval {
        crate::time::interval_mul_double(delta, factor)
    }
    fn delta_is_positive(delta: Interval) -> bool {
        delta > Interval::zero()
    }
    fn delta_ratio(a: Interval, b: Interval) -> f64 {
        a.num_microseconds().unwrap_or(0) as f64 / b.num_microseconds().unwrap_or(1) as f64
    }
}

/// A half-open (or closed, or open) interval over `T`.
#[derive(Debug, Clone, PartialEq)]
pub struct Span<T: SpanElement> {
    lower: T,
    upper: T,
    lower_inc: bool,
    upper_inc: bool,
}

impl<T: SpanElement> Span<T> {
    /// Builds a span, validating and canonicalizing it per spec §3: empty
    /// spans (`lower == upper` with a non-inclusive bound) are rejected;
    /// discrete domains are canonicalized to upper-exclusive.
    pub fn new(lower: T, upper: T, lower_inc: bool, upper_inc: bool) -> MeosResult<Self> {
        let cmp = lower
            .partial_cmp(&upper)
            .ok_or_else(|| MeosError::invalid_arg_value("span_make", "unordered bounds"))?;
        if cmp == Ordering::Greater {
            return Err(MeosError::invalid_arg_value("span_make", "lower bound is greater than upper bound"));
        }
        if cmp == Ordering::Equal && !(lower_inc && upper_inc) {
            return Err(MeosError::invalid_arg_value("span_make", "empty span: equal bounds must both be inclusive"));
        }
        if T::IS_DISCRETE {
            let canon_lower = if lower_inc { lower } else { lower.successor() };
            let canon_upper = if upper_inc { upper.successor() } else { upper };
            return Ok(Self { lower: canon_lower, upper: canon_upper, lower_inc: true, upper_inc: false });
        }
        Ok(Self { lower, upper, lower_inc, upper_inc })
    }

    /// A single-point span (`[v, v]`).
    pub fn singleton(v: T) -> Self {
        Self::new(v.clone(), v, true, true).expect("a point span is never empty")
    }

    pub fn lower(&self) -> &T {
        &self.lower
    }

    pub fn upper(&self) -> &T {
        &self.upper
    }

    pub fn lower_inc(&self) -> bool {
        self.lower_inc
    }

    pub fn upper_inc(&self) -> bool {
        self.upper_inc
    }

    /// `upper - lower` (spec §4.2: "duration" for time spans, generalized
    /// to any domain).
    pub fn duration(&self) -> T::Delta {
        self.upper.sub(&self.lower)
    }

    pub fn contains(&self, point: &T) -> bool {
        let lower_ok = match point.partial_cmp(&self.lower) {
            Some(Ordering::Greater) => true,
            Some(Ordering::Equal) => self.lower_inc,
            _ => false,
        };
        let upper_ok = match point.partial_cmp(&self.upper) {
            Some(Ordering::Less) => true,
            Some(Ordering::Equal) => self.upper_inc,
            _ => false,
        };
        lower_ok && upper_ok
    }

    pub fn overlaps(&self, other: &Self) -> bool {
        let lower_le_upper = |a: &T, a_inc: bool, b: &T, b_inc: bool| match a.partial_cmp(b) {
            Some(Ordering::Less) => true,
            Some(Ordering::Equal) => a_inc && b_inc,
            _ => false,
        };
        lower_le_upper(&self.lower, self.lower_inc, &other.upper, other.upper_inc)
            && lower_le_upper(&other.lower, other.lower_inc, &self.upper, self.upper_inc)
    }

    /// `self` and `other` touch at exactly one shared bound point and do not overlap.
    pub fn adjacent(&self, other: &Self) -> bool {
        let touch = |a: &T, a_inc: bool, b: &T, b_inc: bool| {
            a.partial_cmp(b) == Some(Ordering::Equal) && (a_inc != b_inc)
        };
        touch(&self.upper, self.upper_inc, &other.lower, other.lower_inc)
            || touch(&other.upper, other.upper_inc, &self.lower, self.lower_inc)
    }

    /// Orders spans by lower bound then upper bound (used to keep a
    /// [`super::SpanSet`] sorted).
    pub fn cmp_bounds(&self, other: &Self) -> Ordering {
        match self.lower.partial_cmp(&other.lower) {
            Some(Ordering::Equal) | None => {}
            Some(o) => return o,
        }
        if self.lower_inc != other.lower_inc {
            // The inclusive bound sorts first (it admits an earlier point).
            return if self.lower_inc { Ordering::Less } else { Ordering::Greater };
        }
        match self.upper.partial_cmp(&other.upper) {
            Some(o) if o != Ordering::Equal => return o,
            _ => {}
        }
        if self.upper_inc != other.upper_inc {
            return if self.upper_inc { Ordering::Greater } else { Ordering::Less };
        }
        Ordering::Equal
    }

    /// Intersection, or `None` if the spans do not overlap.
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        if !self.overlaps(other) {
            return None;
        }
        let (lower, lower_inc) = match self.lower.partial_cmp(&other.lower).unwrap() {
            Ordering::Greater => (self.lower.clone(), self.lower_inc),
            Ordering::Less => (other.lower.clone(), other.lower_inc),
            Ordering::Equal => (self.lower.clone(), self.lower_inc && other.lower_inc),
        };
        let (upper, upper_inc) = match self.upper.partial_cmp(&other.upper).unwrap() {
            Ordering::Less => (self.upper.clone(), self.upper_inc),
            Ordering::Greater => (other.upper.clone(), other.upper_inc),
            Ordering::Equal => (self.upper.clone(), self.upper_inc && other.upper_inc),
        };
        Span::new(lower, upper, lower_inc, upper_inc).ok()
    }

    /// Union, failing (spec §7 `ResultNotContiguous`) if the spans neither
    /// overlap nor are adjacent.
    pub fn union(&self, other: &Self) -> MeosResult<Self> {
        if !self.overlaps(other) && !self.adjacent(other) {
            return Err(MeosError::result_not_contiguous(
                "span_union",
                "spans neither overlap nor are adjacent",
            ));
        }
        let (lower, lower_inc) = match self.lower.partial_cmp(&other.lower).unwrap() {
            Ordering::Less => (self.lower.clone(), self.lower_inc),
            Ordering::Greater => (other.lower.clone(), other.lower_inc),
            Ordering::Equal => (self.lower.clone(), self.lower_inc || other.lower_inc),
        };
        let (upper, upper_inc) = match self.upper.partial_cmp(&other.upper).unwrap() {
            Ordering::Greater => (self.upper.clone(), self.upper_inc),
            Ordering::Less => (other.upper.clone(), other.upper_inc),
            Ordering::Equal => (self.upper.clone(), self.upper_inc || other.upper_inc),
        };
        Span::new(lower, upper, lower_inc, upper_inc)
    }

    pub fn shift(&self, delta: T::Delta) -> Self {
        Span {
            lower: self.lower.add_delta(delta),
            upper: self.upper.add_delta(delta),
            lower_inc: self.lower_inc,
            upper_inc: self.upper_inc,
        }
    }

    /// Scales the span so its width becomes `width`, keeping the lower bound fixed.
    pub fn scale(&self, width: T::Delta) -> MeosResult<Self> {
        self.shift_scale(None, Some(width))
    }

    /// Shifts the span by `delta` and/or scales it so its width becomes `width`.
    pub fn shift_scale(&self, delta: Option<T::Delta>, width: Option<T::Delta>) -> MeosResult<Self> {
        let mut lower = self.lower.clone();
        let mut upper = self.upper.clone();
        if let Some(d) = delta {
            lower = lower.add_delta(d);
            upper = upper.add_delta(d);
        }
        if let Some(w) = width {
            if !T::delta_is_positive(w) {
                return Err(MeosError::invalid_arg_value("span_scale", "scale width must be positive"));
            }
            let current = upper.sub(&lower);
            let factor = T::delta_ratio(w, current);
            upper = lower.add_delta(T::scale_delta(current, factor));
        }
        Span::new(lower, upper, self.lower_inc, self.upper_inc)
    }
}

impl<T: SpanElement> fmt::Display for Span<T>
where
    T: SpanPrint,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}, {}{}",
            if self.lower_inc { "[" } else { "(" },
            self.lower.print_bound(),
            self.upper.print_bound(),
            if self.upper_inc { "]" } else { ")" },
        )
    }
}

/// Printing hook for [`Span`]'s `Display` impl, kept separate from
/// [`SpanElement`] so non-printable domains (were there any) could still
/// implement spans without satisfying it.
pub trait SpanPrint {
    fn print_bound(&self) -> String;
}

impl SpanPrint for i32 {
    fn print_bound(&self) -> String {
        self.to_string()
    }
}

impl SpanPrint for f64 {
    fn print_bound(&self) -> String {
        crate::base_type::BaseType::print_value(self)
    }
}

impl SpanPrint for Timestamp {
    fn print_bound(&self) -> String {
        crate::time::timestamp_print(*self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_span_canonicalizes_to_upper_exclusive() {
        let span = Span::<i32>::new(1, 5, true, true).unwrap();
        assert_eq!((*span.lower(), *span.upper(), span.upper_inc()), (1, 6, false));
    }

    #[test]
    fn equal_bounds_must_both_be_inclusive() {
        assert!(Span::<f64>::new(1.0, 1.0, true, false).is_err());
        assert!(Span::<f64>::new(1.0, 1.0, true, true).is_ok());
    }

    #[test]
    fn overlap_and_adjacency() {
        let a = Span::<f64>::new(0.0, 1.0, true, false).unwrap();
        let b = Span::<f64>::new(1.0, 2.0, true, true).unwrap();
        assert!(!a.overlaps(&b));
        assert!(a.adjacent(&b));
        assert!(a.union(&b).is_ok());
    }

    #[test]
    fn intersection_of_disjoint_spans_is_none() {
        let a = Span::<f64>::new(0.0, 1.0, true, false).unwrap();
        let b = Span::<f64>::new(2.0, 3.0, true, true).unwrap();
        assert!(a.intersection(&b).is_none());
        assert!(a.union(&b).is_err());
    }
}
