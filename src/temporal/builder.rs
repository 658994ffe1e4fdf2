//! Constructors & normalizer (C5): validity checks, redundancy elimination,
//! and join-on-adjacency. See SPEC_FULL.md §4.5 for the exact join-test
//! rules this follows, transcribed from `tsequence_join_test`.

use crate::base_type::BaseType;
use crate::error::MeosResult;
use crate::time::Interval;

use super::flags::Interpolation;
use super::instant::Instant;
use super::sequence::Sequence;
use super::sequence_set::SequenceSet;

/// `make_sequence(instants, lower_inc, upper_inc, interp, normalize?)` (spec §4.5).
pub fn make_sequence<B: BaseType>(
    instants: Vec<Instant<B>>,
    lower_inc: bool,
    upper_inc: bool,
    interp: Interpolation,
    normalize: bool,
) -> MeosResult<Sequence<B>> {
    let instants = if normalize { normalize_instants(instants, interp) } else { instants };
    Sequence::try_new(instants, lower_inc, upper_inc, interp)
}

/// Drops the middle instant of any triple that is (step, equal to previous)
/// OR (linear, three equal) OR (linear, collinear in time) — spec §4.5 step 2.
fn normalize_instants<B: BaseType>(instants: Vec<Instant<B>>, interp: Interpolation) -> Vec<Instant<B>> {
    if instants.len() < 3 || interp == Interpolation::Discrete {
        return instants;
    }
    let mut out = Vec::with_capacity(instants.len());
    out.push(instants[0].clone());
    for i in 1..instants.len() - 1 {
        let prev = out.last().unwrap();
        let cur = &instants[i];
        let next = &instants[i + 1];
        let redundant = match interp {
            Interpolation::Step => cur.value.eq_value(&prev.value),
            Interpolation::Linear => {
                (prev.value.eq_value(&cur.value) && cur.value.eq_value(&next.value))
                    || B::collinear(&prev.value, &cur.value, &next.value, prev.t, cur.t, next.t)
            }
            Interpolation::Discrete => false,
        };
        if !redundant {
            out.push(cur.clone());
        }
    }
    out.push(instants.last().unwrap().clone());
    out
}

enum JoinDecision {
    DropBoth,
    DropSeq1Last,
    DropSeq2First,
    None,
}

/// Tests whether the tail of `cur` and the head of `seq2` join, and how
/// (SPEC_FULL.md §4.5's six-rule transcription of `tsequence_join_test`).
fn join_test<B: BaseType>(cur: &[Instant<B>], cur_upper_inc: bool, seq2: &Sequence<B>, interp: Interpolation) -> JoinDecision {
    let n1 = cur.len();
    let last1 = &cur[n1 - 1];
    let first2 = &seq2.instants()[0];
    let boundary_equal = last1.value.eq_value(&first2.value);

    if n1 >= 2 && seq2.n() >= 2 {
        let prev2 = &cur[n1 - 2];
        let second2 = &seq2.instants()[1];
        let trailing_equal = prev2.value.eq_value(&last1.value) && boundary_equal;

        if interp == Interpolation::Step && trailing_equal {
            return JoinDecision::DropBoth; // rule 1
        }
        if trailing_equal && first2.value.eq_value(&second2.value) {
            return JoinDecision::DropBoth; // rule 2
        }
        if B::CONTINUOUS
            && boundary_equal
            && B::collinear(&prev2.value, &first2.value, &second2.value, prev2.t, first2.t, second2.t)
        {
            return JoinDecision::DropBoth; // rule 3
        }
        if interp == Interpolation::Step && !cur_upper_inc {
            return JoinDecision::DropSeq1Last; // rule 4
        }
        if boundary_equal {
            return JoinDecision::DropSeq2First; // rule 5
        }
        JoinDecision::None // rule 6
    } else if boundary_equal {
        JoinDecision::DropSeq2First
    } else {
        JoinDecision::None
    }
}

/// Joins adjacent sequences per the rules above, leaving non-adjacent or
/// non-joinable pairs as separate entries.
fn join_sequences<B: BaseType>(sequences: Vec<Sequence<B>>) -> MeosResult<Vec<Sequence<B>>> {
    let interp = sequences[0].interpolation();
    let mut output = Vec::new();
    let mut cur_instants = sequences[0].instants().to_vec();
    let mut cur_lower_inc = sequences[0].lower_inc();
    let mut cur_upper_inc = sequences[0].upper_inc();

    for seq in &sequences[1..] {
        let adjacent = cur_instants.last().unwrap().t == seq.start_timestamp() && (cur_upper_inc || seq.lower_inc());
        let decision = if adjacent { join_test(&cur_instants, cur_upper_inc, seq, interp) } else { JoinDecision::None };
        match decision {
            JoinDecision::None => {
                output.push(Sequence::try_new(std::mem::take(&mut cur_instants), cur_lower_inc, cur_upper_inc, interp)?);
                cur_instants = seq.instants().to_vec();
                cur_lower_inc = seq.lower_inc();
                cur_upper_inc = seq.upper_inc();
            }
            JoinDecision::DropBoth => {
                cur_instants.pop();
                cur_instants.extend(seq.instants()[1..].iter().cloned());
                cur_upper_inc = seq.upper_inc();
            }
            JoinDecision::DropSeq1Last => {
                cur_instants.pop();
                cur_instants.extend(seq.instants().iter().cloned());
                cur_upper_inc = seq.upper_inc();
            }
            JoinDecision::DropSeq2First => {
                cur_instants.extend(seq.instants()[1..].iter().cloned());
                cur_upper_inc = seq.upper_inc();
            }
        }
    }
    output.push(Sequence::try_new(cur_instants, cur_lower_inc, cur_upper_inc, interp)?);
    Ok(output)
}

/// `make_sequence_set(sequences, normalize?)` (spec §4.5).
pub fn make_sequence_set<B: BaseType>(sequences: Vec<Sequence<B>>, normalize: bool) -> MeosResult<SequenceSet<B>> {
    // Validates ordering, non-overlap and shared interpolation (spec §4.5 step 1).
    SequenceSet::try_new(sequences.clone())?;
    if !normalize {
        return SequenceSet::try_new(sequences);
    }
    let joined = join_sequences(sequences)?;
    SequenceSet::try_new(joined)
}

/// `make_sequence_set_with_gaps(instants, interp, max_interval?, max_distance?)`
/// (spec §4.5): cuts a new sequence whenever the gap to the next raw instant
/// exceeds `max_interval` in time or `max_distance` in value.
pub fn make_sequence_set_with_gaps<B: BaseType>(
    instants: Vec<Instant<B>>,
    interp: Interpolation,
    max_interval: Option<Interval>,
    max_distance: Option<f64>,
) -> MeosResult<SequenceSet<B>> {
    use crate::error::MeosError;
    if instants.is_empty() {
        return Err(MeosError::invalid_arg_value("make_sequence_set_with_gaps", "no instants provided"));
    }
    let mut groups: Vec<Vec<Instant<B>>> = vec![vec![instants[0].clone()]];
    for w in instants.windows(2) {
        let (a, b) = (&w[0], &w[1]);
        let time_gap = max_interval.is_some_and(|m| (b.t - a.t) > m);
        let value_gap = max_distance.is_some_and(|m| a.value.distance(&b.value) > m);
        if time_gap || value_gap {
            groups.push(vec![b.clone()]);
        } else {
            groups.last_mut().unwrap().push(b.clone());
        }
    }
    let sequences = groups
        .into_iter()
        .map(|g| make_sequence(g, true, true, interp, true))
        .collect::<MeosResult<Vec<_>>>()?;
    SequenceSet::try_new(sequences)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(s: &str) -> crate::time::Timestamp {
        chrono::Utc.datetime_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn normalization_collapses_collinear_middle_instant() {
        let instants = vec![
            Instant::new(1.0_f64, ts("2000-01-01 00:00:00")),
            Instant::new(2.0, ts("2000-01-02 00:00:00")),
            Instant::new(3.0, ts("2000-01-03 00:00:00")),
        ];
        let seq = make_sequence(instants, true, true, Interpolation::Linear, true).unwrap();
        assert_eq!(seq.n(), 2);
    }

    #[test]
    fn adjacent_inclusive_bounds_rejected() {
        let s1 = Sequence::try_new(
            vec![Instant::new(1_i32, ts("2000-01-01 00:00:00")), Instant::new(2, ts("2000-01-02 00:00:00"))],
            true,
            true,
            Interpolation::Step,
        )
        .unwrap();
        let s2 = Sequence::try_new(
            vec![Instant::new(2_i32, ts("2000-01-02 00:00:00")), Instant::new(3, ts("2000-01-03 00:00:00"))],
            true,
            true,
            Interpolation::Step,
        )
        .unwrap();
        let err = make_sequence_set(vec![s1.clone(), s2], false).unwrap_err();
        assert!(matches!(err, crate::error::MeosError::InvalidArgValue { .. }));

        let s2_exclusive = Sequence::try_new(
            vec![Instant::new(2_i32, ts("2000-01-02 00:00:00")), Instant::new(3, ts("2000-01-03 00:00:00"))],
            false,
            true,
            Interpolation::Step,
        )
        .unwrap();
        let joined = make_sequence_set(vec![s1, s2_exclusive], true).unwrap();
        assert_eq!(joined.n(), 1);
        assert_eq!(joined.start_sequence().n(), 3);
    }
}
