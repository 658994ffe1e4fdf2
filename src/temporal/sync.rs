//! Synchronization, intersection, and crossing insertion (C8).
//!
//! A literal port of `synchronize_tsequence_tsequence`/
//! `intersection_tdiscseq_tdiscseq`: see SPEC_FULL.md §4.8 for the exact
//! six-step algorithm this follows.

use crate::base_type::BaseType;
use crate::error::{MeosError, MeosResult};
use crate::time::Timestamp;

use super::flags::Interpolation;
use super::instant::Instant;
use super::sequence::Sequence;

/// The canonical per-segment evaluation: constant segments and endpoint
/// timestamps short-circuit, otherwise dispatch to the base type's
/// interpolation function (spec §4.8).
pub fn segment_value_at_time<B: BaseType>(a: &Instant<B>, b: &Instant<B>, interp: Interpolation, t: Timestamp) -> B {
    if t == a.t {
        return a.value.clone();
    }
    if t == b.t {
        return b.value.clone();
    }
    match interp {
        Interpolation::Linear => {
            let ratio = crate::time::fraction(a.t, b.t, t);
            B::interpolate(&a.value, &b.value, ratio)
        }
        _ => a.value.clone(),
    }
}

fn cross_timestamp(a: Timestamp, b: Timestamp, ratio: f64) -> Timestamp {
    let scaled = crate::time::interval_mul_double(b - a, ratio);
    crate::time::timestamp_plus_interval(a, scaled)
}

/// Zips two sequences onto a shared time domain equal to the intersection
/// of their periods, optionally inserting linear-crossing points.
pub fn synchronize<B: BaseType>(
    seq_a: &Sequence<B>,
    seq_b: &Sequence<B>,
    with_crossings: bool,
) -> MeosResult<Option<(Sequence<B>, Sequence<B>)>> {
    let span_a = seq_a.time_span();
    let span_b = seq_b.time_span();
    let inter = match span_a.intersection(&span_b) {
        Some(s) => s,
        None => return Ok(None),
    };

    if inter.lower() == inter.upper() {
        let t = *inter.lower();
        let va = seq_a
            .value_at(t, false)
            .ok_or_else(|| MeosError::invalid_arg_value("synchronize", "no value at intersection instant"))?;
        let vb = seq_b
            .value_at(t, false)
            .ok_or_else(|| MeosError::invalid_arg_value("synchronize", "no value at intersection instant"))?;
        let out_a = Sequence::try_new(vec![Instant::new(va, t)], true, true, seq_a.interpolation())?;
        let out_b = Sequence::try_new(vec![Instant::new(vb, t)], true, true, seq_b.interpolation())?;
        return Ok(Some((out_a, out_b)));
    }

    let lower = *inter.lower();
    let upper = *inter.upper();

    let mut i = seq_a.instants().iter().position(|ins| ins.t >= lower).unwrap_or(0);
    let mut j = seq_b.instants().iter().position(|ins| ins.t >= lower).unwrap_or(0);

    let mut out_a: Vec<Instant<B>> = Vec::new();
    let mut out_b: Vec<Instant<B>> = Vec::new();

    loop {
        let ta = seq_a.instants().get(i).map(|x| x.t).filter(|t| *t <= upper);
        let tb = seq_b.instants().get(j).map(|x| x.t).filter(|t| *t <= upper);
        let t = match (ta, tb) {
            (Some(ta), Some(tb)) => ta.min(tb),
            (Some(ta), None) => ta,
            (None, Some(tb)) => tb,
            (None, None) => break,
        };

        let advance_a = ta == Some(t);
        let va = if advance_a {
            seq_a.instants()[i].value.clone()
        } else {
            seq_a
                .value_at(t, false)
                .ok_or_else(|| MeosError::invalid_arg_value("synchronize", "no value at synthesized timestamp"))?
        };
        let advance_b = tb == Some(t);
        let vb = if advance_b {
            seq_b.instants()[j].value.clone()
        } else {
            seq_b
                .value_at(t, false)
                .ok_or_else(|| MeosError::invalid_arg_value("synchronize", "no value at synthesized timestamp"))?
        };

        if with_crossings
            && !out_a.is_empty()
            && (seq_a.interpolation() == Interpolation::Linear || seq_b.interpolation() == Interpolation::Linear)
        {
            let prev_a = out_a.last().unwrap().clone();
            let prev_b = out_b.last().unwrap().clone();
            if let Some(ratio) = B::segment_segment_intersection(&prev_a.value, &va, &prev_b.value, &vb) {
                let cross_t = cross_timestamp(prev_a.t, t, ratio);
                if cross_t > prev_a.t && cross_t < t {
                    let cva = B::interpolate(&prev_a.value, &va, ratio);
                    let cvb = B::interpolate(&prev_b.value, &vb, ratio);
                    out_a.push(Instant::new(cva, cross_t));
                    out_b.push(Instant::new(cvb, cross_t));
                }
            }
        }

        out_a.push(Instant::new(va, t));
        out_b.push(Instant::new(vb, t));
        if advance_a {
            i += 1;
        }
        if advance_b {
            j += 1;
        }
    }

    if !inter.upper_inc() {
        for (out, interp) in [(&mut out_a, seq_a.interpolation()), (&mut out_b, seq_b.interpolation())] {
            if interp != Interpolation::Linear && out.len() >= 2 {
                let n = out.len();
                if !out[n - 1].value.eq_value(&out[n - 2].value) {
                    out[n - 1].value = out[n - 2].value.clone();
                }
            }
        }
    }

    let result_a = Sequence::try_new(out_a, inter.lower_inc(), inter.upper_inc(), seq_a.interpolation())?;
    let result_b = Sequence::try_new(out_b, inter.lower_inc(), inter.upper_inc(), seq_b.interpolation())?;
    Ok(Some((result_a, result_b)))
}

/// Merge-join of two sequences' instant arrays: only timestamps present on
/// both sides survive (no synthesis), matching `intersection_tdiscseq_tdiscseq`.
pub fn intersect_on_time<B: BaseType>(seq_a: &Sequence<B>, seq_b: &Sequence<B>) -> MeosResult<Option<(Sequence<B>, Sequence<B>)>> {
    let (mut i, mut j) = (0usize, 0usize);
    let mut out_a = Vec::new();
    let mut out_b = Vec::new();
    while i < seq_a.n() && j < seq_b.n() {
        let ta = seq_a.instants()[i].t;
        let tb = seq_b.instants()[j].t;
        match ta.cmp(&tb) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                out_a.push(seq_a.instants()[i].clone());
                out_b.push(seq_b.instants()[j].clone());
                i += 1;
                j += 1;
            }
        }
    }
    if out_a.is_empty() {
        return Ok(None);
    }
    let a = Sequence::try_new(out_a, true, true, seq_a.interpolation())?;
    let b = Sequence::try_new(out_b, true, true, seq_b.interpolation())?;
    Ok(Some((a, b)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(s: &str) -> Timestamp {
        chrono::Utc.datetime_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn synchronize_with_crossings_inserts_turning_point() {
        let a = Sequence::try_new(
            vec![Instant::new(0.0_f64, ts("2000-01-01 00:00:00")), Instant::new(2.0, ts("2000-01-01 00:02:00"))],
            true,
            false,
            Interpolation::Linear,
        )
        .unwrap();
        let b = Sequence::try_new(
            vec![Instant::new(2.0_f64, ts("2000-01-01 00:00:00")), Instant::new(0.0, ts("2000-01-01 00:02:00"))],
            true,
            false,
            Interpolation::Linear,
        )
        .unwrap();
        let (sync_a, sync_b) = synchronize(&a, &b, true).unwrap().unwrap();
        assert_eq!(sync_a.n(), 3);
        assert_eq!(sync_b.n(), 3);
        let mid_t = ts("2000-01-01 00:01:00");
        assert_eq!(sync_a.value_at(mid_t, true), Some(1.0));
        assert_eq!(sync_b.value_at(mid_t, true), Some(1.0));
    }
}
