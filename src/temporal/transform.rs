//! Accessors & transformers (C7): time-bounded projections live on
//! [`super::Sequence`]/[`super::SequenceSet`] directly; this module holds
//! the whole-value transforms (`shift`/`scale`, interpolation change) that
//! operate across [`Temporal`] variants.

use crate::base_type::BaseType;
use crate::error::{MeosError, MeosResult};
use crate::time::Interval;

use super::{Instant, Interpolation, Sequence, SequenceSet, Temporal};

fn map_sequence_values<B: BaseType>(s: &Sequence<B>, f: &impl Fn(&B) -> MeosResult<B>) -> MeosResult<Sequence<B>> {
    let instants = s
        .instants()
        .iter()
        .map(|i| Ok(Instant::new(f(&i.value)?, i.t)))
        .collect::<MeosResult<Vec<_>>>()?;
    Sequence::try_new(instants, s.lower_inc(), s.upper_inc(), s.interpolation())
}

fn map_values<B: BaseType>(t: &Temporal<B>, f: impl Fn(&B) -> MeosResult<B>) -> MeosResult<Temporal<B>> {
    match t {
        Temporal::Instant(i) => Ok(Temporal::Instant(Instant::new(f(&i.value)?, i.t))),
        Temporal::Sequence(s) => Ok(Temporal::Sequence(map_sequence_values(s, &f)?)),
        Temporal::SequenceSet(ss) => {
            let sequences = ss
                .sequences()
                .iter()
                .map(|s| map_sequence_values(s, &f))
                .collect::<MeosResult<Vec<_>>>()?;
            Ok(Temporal::SequenceSet(SequenceSet::try_new(sequences)?))
        }
    }
}

fn shift_sequence_time<B: BaseType>(s: &Sequence<B>, delta: Interval) -> Sequence<B> {
    let instants = s.instants().iter().map(|i| Instant::new(i.value.clone(), i.t + delta)).collect();
    Sequence::try_new(instants, s.lower_inc(), s.upper_inc(), s.interpolation())
        .expect("shifting timestamps uniformly preserves every sequence invariant")
}

/// `shift_time(interval)` (spec §4.7): shifts the period and every instant uniformly.
pub fn shift_time<B: BaseType>(t: &Temporal<B>, delta: Interval) -> Temporal<B> {
    match t {
        Temporal::Instant(i) => Temporal::Instant(Instant::new(i.value.clone(), i.t + delta)),
        Temporal::Sequence(s) => Temporal::Sequence(shift_sequence_time(s, delta)),
        Temporal::SequenceSet(ss) => Temporal::SequenceSet(
            SequenceSet::try_new(ss.sequences().iter().map(|s| shift_sequence_time(s, delta)).collect())
                .expect("shifting timestamps uniformly preserves every sequence-set invariant"),
        ),
    }
}

/// `scale_time(duration)` (spec §4.7): rescales the period to the given
/// duration, keeping the start timestamp fixed, and rescales every instant
/// proportionally.
pub fn scale_time<B: BaseType>(t: &Temporal<B>, duration: Interval) -> MeosResult<Temporal<B>> {
    if duration <= Interval::zero() {
        return Err(MeosError::invalid_arg_value("scale_time", "scale duration must be positive"));
    }
    let start = t.start_timestamp();
    let total = t.duration();
    if total == Interval::zero() {
        return Err(MeosError::invalid_arg_value("scale_time", "cannot scale a zero-duration value"));
    }
    let factor = duration.num_microseconds().unwrap_or(0) as f64 / total.num_microseconds().unwrap_or(1) as f64;
    let rescale = |orig: crate::time::Timestamp| -> crate::time::Timestamp {
        let offset = orig - start;
        crate::time::timestamp_plus_interval(start, crate::time::interval_mul_double(offset, factor))
    };
    Ok(match t {
        Temporal::Instant(i) => Temporal::Instant(Instant::new(i.value.clone(), rescale(i.t))),
        Temporal::Sequence(s) => {
            let instants = s.instants().iter().map(|i| Instant::new(i.value.clone(), rescale(i.t))).collect();
            Temporal::Sequence(
                Sequence::try_new(instants, s.lower_inc(), s.upper_inc(), s.interpolation())
                    .expect("rescaling timestamps preserves every sequence invariant"),
            )
        }
        Temporal::SequenceSet(ss) => {
            let sequences = ss
                .sequences()
                .iter()
                .map(|s| {
                    let instants = s.instants().iter().map(|i| Instant::new(i.value.clone(), rescale(i.t))).collect();
                    Sequence::try_new(instants, s.lower_inc(), s.upper_inc(), s.interpolation())
                        .expect("rescaling timestamps preserves every sequence invariant")
                })
                .collect();
            Temporal::SequenceSet(SequenceSet::try_new(sequences).expect("rescaling preserves non-overlap"))
        }
    })
}

/// `shift_value(delta)` (spec §4.7, numeric base types only): adds `delta` to every value.
pub fn shift_value<B: BaseType>(t: &Temporal<B>, delta: &B) -> MeosResult<Temporal<B>> {
    map_values(t, |v| {
        v.add_value(delta)
            .ok_or_else(|| MeosError::invalid_arg_type("shift_value", "base type has no addition defined"))
    })
}

/// `scale_value(width)` (spec §4.7): affinely rescales the value range to span `width`.
pub fn scale_value<B: BaseType>(t: &Temporal<B>, width: &B) -> MeosResult<Temporal<B>> {
    let min = t
        .min_value()
        .ok_or_else(|| MeosError::invalid_arg_value("scale_value", "value has no minimum"))?;
    let max = t
        .max_value()
        .ok_or_else(|| MeosError::invalid_arg_value("scale_value", "value has no maximum"))?;
    let current = max
        .sub_value(&min)
        .and_then(|d| d.as_f64())
        .ok_or_else(|| MeosError::invalid_arg_type("scale_value", "base type has no subtraction defined"))?;
    let width_f = width
        .as_f64()
        .ok_or_else(|| MeosError::invalid_arg_type("scale_value", "base type has no scalar projection"))?;
    if current == 0.0 {
        return Err(MeosError::invalid_arg_value("scale_value", "cannot scale a constant value"));
    }
    let factor = width_f / current;
    map_values(t, |v| {
        let offset_f = v
            .sub_value(&min)
            .and_then(|d| d.as_f64())
            .ok_or_else(|| MeosError::invalid_arg_type("scale_value", "base type has no subtraction defined"))?;
        let scaled = B::from_f64(offset_f * factor)
            .ok_or_else(|| MeosError::invalid_arg_type("scale_value", "base type has no scalar projection"))?;
        min.add_value(&scaled)
            .ok_or_else(|| MeosError::invalid_arg_type("scale_value", "base type has no addition defined"))
    })
}

/// `shift_scale_value(delta?, width?)` (spec §4.7): applies scale then shift.
pub fn shift_scale_value<B: BaseType>(t: &Temporal<B>, delta: Option<&B>, width: Option<&B>) -> MeosResult<Temporal<B>> {
    let scaled = match width {
        Some(w) => scale_value(t, w)?,
        None => t.clone(),
    };
    match delta {
        Some(d) => shift_value(&scaled, d),
        None => Ok(scaled),
    }
}

/// `set_interpolation(new_interp)` (spec §4.7).
pub fn set_interpolation<B: BaseType>(t: &Temporal<B>, new_interp: Interpolation) -> MeosResult<Temporal<B>> {
    match new_interp {
        Interpolation::Discrete => to_discrete(t),
        Interpolation::Step => to_step(t),
        Interpolation::Linear => to_linear(t),
    }
}

fn to_discrete<B: BaseType>(t: &Temporal<B>) -> MeosResult<Temporal<B>> {
    match t {
        Temporal::Instant(i) => Ok(Temporal::Instant(i.clone())),
        Temporal::Sequence(s) if s.n() == 1 => {
            Ok(Temporal::Sequence(Sequence::try_new(s.instants().to_vec(), true, true, Interpolation::Discrete)?))
        }
        Temporal::SequenceSet(ss) if ss.sequences().iter().all(|s| s.n() == 1) => {
            let instants = ss.sequences().iter().map(|s| s.start_instant().clone()).collect();
            Ok(Temporal::Sequence(Sequence::try_new(instants, true, true, Interpolation::Discrete)?))
        }
        _ => Err(MeosError::invalid_arg_type(
            "set_interpolation",
            "to discrete requires an instant, a singleton sequence, or a sequence-set of singletons",
        )),
    }
}

fn sequence_to_step<B: BaseType>(s: &Sequence<B>) -> MeosResult<Sequence<B>> {
    if s.n() > 2 {
        return Err(MeosError::invalid_arg_value(
            "set_interpolation",
            "step from linear requires each sequence to have at most 2 instants",
        ));
    }
    if s.n() == 2 && !s.start_instant().value.eq_value(&s.end_instant().value) {
        return Err(MeosError::invalid_arg_value(
            "set_interpolation",
            "step from linear requires equal endpoints when the sequence has two instants",
        ));
    }
    Sequence::try_new(s.instants().to_vec(), s.lower_inc(), s.upper_inc(), Interpolation::Step)
}

fn to_step<B: BaseType>(t: &Temporal<B>) -> MeosResult<Temporal<B>> {
    match t {
        Temporal::Instant(i) => Ok(Temporal::Instant(i.clone())),
        Temporal::Sequence(s) => Ok(Temporal::Sequence(sequence_to_step(s)?)),
        Temporal::SequenceSet(ss) => {
            let sequences = ss.sequences().iter().map(sequence_to_step).collect::<MeosResult<Vec<_>>>()?;
            Ok(Temporal::SequenceSet(SequenceSet::try_new(sequences)?))
        }
    }
}

/// Explodes one step sequence into a run of flat linear segments (one per
/// step, equal endpoints) plus a trailing singleton if the original upper
/// bound was inclusive (the instant where the final jump lands).
fn explode_step_sequence<B: BaseType>(s: &Sequence<B>) -> MeosResult<Vec<Sequence<B>>> {
    if s.n() < 2 {
        return Ok(vec![Sequence::try_new(s.instants().to_vec(), s.lower_inc(), s.upper_inc(), Interpolation::Linear)?]);
    }
    let mut out = Vec::with_capacity(s.n());
    for i in 0..s.n() - 1 {
        let a = s.instant_at(i).unwrap().clone();
        let b = Instant::new(a.value.clone(), s.instant_at(i + 1).unwrap().t);
        let lower_inc = if i == 0 { s.lower_inc() } else { true };
        out.push(Sequence::try_new(vec![a, b], lower_inc, false, Interpolation::Linear)?);
    }
    if s.upper_inc() {
        out.push(Sequence::try_new(vec![s.end_instant().clone()], true, true, Interpolation::Linear)?);
    }
    Ok(out)
}

fn to_linear<B: BaseType>(t: &Temporal<B>) -> MeosResult<Temporal<B>> {
    if !B::CONTINUOUS {
        return Err(MeosError::invalid_arg_type("set_interpolation", "linear interpolation requires a continuous base type"));
    }
    match t {
        Temporal::Instant(i) => Ok(Temporal::Instant(i.clone())),
        Temporal::Sequence(s) => {
            let mut exploded = explode_step_sequence(s)?;
            if exploded.len() == 1 {
                Ok(Temporal::Sequence(exploded.remove(0)))
            } else {
                Ok(Temporal::SequenceSet(SequenceSet::try_new(exploded)?))
            }
        }
        Temporal::SequenceSet(ss) => {
            let mut all = Vec::new();
            for s in ss.sequences() {
                all.extend(explode_step_sequence(s)?);
            }
            Ok(Temporal::SequenceSet(SequenceSet::try_new(all)?))
        }
    }
}
