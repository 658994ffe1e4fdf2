//! A disjoint, non-adjacent, ordered list of [`Span`]s (spec §3/§4.2).

use crate::error::{MeosError, MeosResult};

use super::span::{Span, SpanElement};

/// An ordered, disjoint, non-adjacent collection of spans over the same
/// domain `T`. Every operation preserves this invariant — adjacent or
/// overlapping spans are always merged rather than stored separately.
#[derive(Debug, Clone, PartialEq)]
pub struct SpanSet<T: SpanElement> {
    spans: Vec<Span<T>>,
}

impl<T: SpanElement> SpanSet<T> {
    /// Builds a span set from arbitrary (possibly overlapping, unsorted)
    /// spans, normalizing them into the disjoint/non-adjacent canonical form.
    pub fn new(mut spans: Vec<Span<T>>) -> MeosResult<Self> {
        if spans.is_empty() {
            return Err(MeosError::invalid_arg_value("spanset_make", "a span set needs at least one span"));
        }
        spans.sort_by(|a, b| a.cmp_bounds(b));
        let mut merged: Vec<Span<T>> = Vec::with_capacity(spans.len());
        for span in spans {
            match merged.last_mut() {
                Some(last) if last.overlaps(&span) || last.adjacent(&span) => {
                    *last = last.union(&span)?;
                }
                _ => merged.push(span),
            }
        }
        Ok(Self { spans: merged })
    }

    pub fn num_spans(&self) -> usize {
        self.spans.len()
    }

    pub fn spans(&self) -> &[Span<T>] {
        &self.spans
    }

    pub fn span_n(&self, n: usize) -> Option<&Span<T>> {
        self.spans.get(n)
    }

    pub fn start_span(&self) -> &Span<T> {
        &self.spans[0]
    }

    pub fn end_span(&self) -> &Span<T> {
        self.spans.last().expect("span sets are never empty")
    }

    pub fn contains(&self, point: &T) -> bool {
        self.spans.iter().any(|s| s.contains(point))
    }

    pub fn overlaps(&self, other: &Self) -> bool {
        self.spans.iter().any(|a| other.spans.iter().any(|b| a.overlaps(b)))
    }

    /// Total width: the sum of each member span's duration.
    pub fn width(&self, _ignore_gaps: bool) -> T::Delta
    where
        T::Delta: std::iter::Sum,
    {
        self.spans.iter().map(|s| s.duration()).sum()
    }

    pub fn shift(&self, delta: T::Delta) -> Self {
        Self { spans: self.spans.iter().map(|s| s.shift(delta)).collect() }
    }

    pub fn scale(&self, width: T::Delta) -> MeosResult<Self> {
        self.shift_scale(None, Some(width))
    }

    pub fn shift_scale(&self, delta: Option<T::Delta>, width: Option<T::Delta>) -> MeosResult<Self> {
        // Scale around the span set's own lower bound so the whole set
        // shrinks/grows consistently, matching Span::shift_scale's contract.
        let base = self.spans[0].lower().clone();
        let total = self.end_span().upper().sub(&base);
        let factor = width.map(|w| T::delta_ratio(w, total));
        let spans = self
            .spans
            .iter()
            .map(|s| {
                let lower_off = s.lower().sub(&base);
                let upper_off = s.upper().sub(&base);
                let (new_lower_off, new_upper_off) = match factor {
                    Some(f) => (T::scale_delta(lower_off, f), T::scale_delta(upper_off, f)),
                    None => (lower_off, upper_off),
                };
                let mut new_lower = base.add_delta(new_lower_off);
                let mut new_upper = base.add_delta(new_upper_off);
                if let Some(d) = delta {
                    new_lower = new_lower.add_delta(d);
                    new_upper = new_upper.add_delta(d);
                }
                Span::new(new_lower, new_upper, s.lower_inc(), s.upper_inc())
            })
            .collect::<MeosResult<Vec<_>>>()?;
        Ok(Self { spans })
    }

    /// Intersection against another span set, or `None` if they share no points.
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let mut parts = Vec::new();
        for a in &self.spans {
            for b in &other.spans {
                if let Some(inter) = a.intersection(b) {
                    parts.push(inter);
                }
            }
        }
        if parts.is_empty() {
            None
        } else {
            SpanSet::new(parts).ok()
        }
    }

    /// Union with another span set (always succeeds: unlike [`Span::union`],
    /// a span set can always absorb a disjoint span as a new member).
    pub fn union(&self, other: &Self) -> Self {
        let mut all = self.spans.clone();
        all.extend(other.spans.iter().cloned());
        SpanSet::new(all).expect("non-empty input always yields a non-empty span set")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjacent_spans_merge() {
        let a = Span::<f64>::new(0.0, 1.0, true, false).unwrap();
        let b = Span::<f64>::new(1.0, 2.0, true, true).unwrap();
        let set = SpanSet::new(vec![a, b]).unwrap();
        assert_eq!(set.num_spans(), 1);
    }

    #[test]
    fn disjoint_spans_stay_separate_and_sorted() {
        let a = Span::<f64>::new(5.0, 6.0, true, true).unwrap();
        let b = Span::<f64>::new(0.0, 1.0, true, true).unwrap();
        let set = SpanSet::new(vec![a, b]).unwrap();
        assert_eq!(set.num_spans(), 2);
        assert_eq!(*set.start_span().lower(), 0.0);
    }
}
