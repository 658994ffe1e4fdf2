//! WKT parser/printer (C6).
//!
//! A streaming recursive-descent parser with one token of lookahead, following
//! `original_source/meos/src/point/tpoint_parser.c`'s `tpoint_parse` dispatch:
//! after consuming optional `SRID=`/`Interp=Step;` prefixes, peek at the next
//! non-space character to choose the subtype. Every bracketed production uses
//! the two-pass strategy spec §4.6/§9 call for: the first pass counts and
//! validates elements, the second re-parses and allocates with the exact
//! count (mirrored here as "split on top-level commas, then parse each piece
//! twice" rather than literal two passes over the byte stream, since a
//! `Vec::with_capacity` already gets the non-resizing benefit the C code
//! wants from its offsets table).

use crate::base_type::BaseType;
use crate::error::{MeosError, MeosResult};
use crate::temporal::{builder, Instant, Interpolation, Sequence, SequenceSet, Temporal};

/// Parses a temporal value's WKT representation (spec §4.6 grammar).
///
/// Base types without an SRID (everything but the geo flavours) ignore the
/// `srid_of`/`with_srid` steps below; [`GeoWkt`] is the extension point geo
/// base types implement to opt into SRID-aware parsing.
pub fn parse<B: BaseType>(s: &str) -> MeosResult<Temporal<B>> {
    parse_with_srid::<B>(s).map(|(t, _)| t)
}

/// As [`parse`], but also returns the resolved outer SRID (0/`None` for
/// non-geo base types, since they have no concept of SRID).
pub fn parse_with_srid<B: BaseType>(s: &str) -> MeosResult<(Temporal<B>, Option<i32>)> {
    let op = "temporal_in";
    let mut rest = s.trim_start();
    let mut outer_srid = None;
    if let Some(tail) = strip_ci_prefix(rest, "SRID=") {
        let (num, after) = tail.split_once(';').ok_or_else(|| MeosError::text_input(op, "missing `;` after SRID"))?;
        outer_srid = Some(num.trim().parse::<i32>().map_err(|e| MeosError::text_input(op, e.to_string()))?);
        rest = after.trim_start();
    }
    let mut interp = if B::CONTINUOUS { Interpolation::Linear } else { Interpolation::Step };
    if let Some(tail) = strip_ci_prefix(rest, "Interp=Step;") {
        interp = Interpolation::Step;
        rest = tail.trim_start();
    }
    rest = rest.trim_end();
    if rest.is_empty() {
        return Err(MeosError::text_input(op, "empty input"));
    }

    let temporal = match rest.as_bytes()[0] {
        b'[' | b'(' => Temporal::Sequence(parse_cont_sequence::<B>(rest, interp)?),
        b'{' => {
            let inner = brace_inner(op, rest)?;
            let first_non_space = inner.trim_start().as_bytes().first().copied();
            if matches!(first_non_space, Some(b'[') | Some(b'(')) {
                Temporal::SequenceSet(parse_sequence_set::<B>(rest, interp)?)
            } else {
                Temporal::Sequence(parse_disc_sequence::<B>(rest)?)
            }
        }
        _ => Temporal::Instant(parse_instant::<B>(rest)?),
    };

    let (temporal, srid) = reconcile_srid(op, temporal, outer_srid)?;
    Ok((temporal, srid))
}

/// SRID resolution (spec §4.6): if the outer SRID is unknown and a
/// sub-value's is known (non-default), adopt it; if both are known (non-
/// default) and differ, fail with `SridMismatch`; if the outer is known and
/// the sub-value is unknown/default, stamp the outer SRID onto every
/// instant. A no-op for base types without a notion of SRID
/// ([`BaseType::srid_of`] returns `None` for all of them).
fn reconcile_srid<B: BaseType>(op: &'static str, t: Temporal<B>, outer: Option<i32>) -> MeosResult<(Temporal<B>, Option<i32>)> {
    let value = first_value(&t);
    let Some(sub) = value.srid_of() else { return Ok((t, outer)) };
    let sub_is_default = value.srid_is_default();
    match outer {
        None => Ok((t, Some(sub))),
        Some(o) if sub_is_default => Ok((map_values(t, |v| v.with_resolved_srid(o)), Some(o))),
        Some(o) if o == sub => Ok((t, Some(o))),
        Some(o) => Err(MeosError::srid_mismatch(op, o, sub)),
    }
}

fn first_value<B: BaseType>(t: &Temporal<B>) -> &B {
    match t {
        Temporal::Instant(i) => &i.value,
        Temporal::Sequence(s) => &s.start_instant().value,
        Temporal::SequenceSet(ss) => &ss.start_sequence().start_instant().value,
    }
}

fn map_values<B: BaseType>(t: Temporal<B>, f: impl Fn(&B) -> B) -> Temporal<B> {
    let map_seq = |s: Sequence<B>| {
        let instants = s.instants().iter().map(|i| Instant::new(f(&i.value), i.t)).collect();
        Sequence::try_new(instants, s.lower_inc(), s.upper_inc(), s.interpolation())
            .expect("stamping an SRID does not change any sequence invariant")
    };
    match t {
        Temporal::Instant(i) => Temporal::Instant(Instant::new(f(&i.value), i.t)),
        Temporal::Sequence(s) => Temporal::Sequence(map_seq(s)),
        Temporal::SequenceSet(ss) => {
            let sequences = ss.sequences().iter().cloned().map(map_seq).collect();
            Temporal::SequenceSet(SequenceSet::try_new(sequences).expect("stamping an SRID preserves non-overlap"))
        }
    }
}

/// `Instant := BaseValue "@" Timestamp` (spec §4.6).
fn parse_instant<B: BaseType>(s: &str) -> MeosResult<Instant<B>> {
    let op = "tinstant_in";
    let (value_part, t_part) = rsplit_top_level(s, '@').ok_or_else(|| MeosError::text_input(op, "missing `@timestamp`"))?;
    let value = B::parse_value(value_part.trim())?;
    let t = crate::time::timestamp_parse(op, t_part.trim())?;
    Ok(Instant::new(value, t))
}

/// `Disc := "{" Instant { "," Instant } "}"` (spec §4.6).
fn parse_disc_sequence<B: BaseType>(s: &str) -> MeosResult<Sequence<B>> {
    let op = "tdiscseq_in";
    let inner = brace_inner(op, s)?;
    let pieces = split_top_level_commas(inner);
    if pieces.is_empty() {
        return Err(MeosError::text_input(op, "a discrete sequence needs at least one instant"));
    }
    let mut instants = Vec::with_capacity(pieces.len());
    for piece in pieces {
        instants.push(parse_instant::<B>(piece.trim())?);
    }
    builder::make_sequence(instants, true, true, Interpolation::Discrete, false)
}

/// `Cont := ("[" | "(") Instant { "," Instant } ("]" | ")")` (spec §4.6).
fn parse_cont_sequence<B: BaseType>(s: &str, interp: Interpolation) -> MeosResult<Sequence<B>> {
    let op = "tsequence_in";
    let bytes = s.as_bytes();
    let lower_inc = bytes[0] == b'[';
    if !lower_inc && bytes[0] != b'(' {
        return Err(MeosError::text_input(op, "expected `[` or `(`"));
    }
    let last = *bytes.last().ok_or_else(|| MeosError::text_input(op, "empty sequence"))?;
    let upper_inc = last == b']';
    if !upper_inc && last != b')' {
        return Err(MeosError::text_input(op, "expected `]` or `)`"));
    }
    let inner = &s[1..s.len() - 1];
    let pieces = split_top_level_commas(inner);
    if pieces.is_empty() {
        return Err(MeosError::text_input(op, "a sequence needs at least one instant"));
    }
    let mut instants = Vec::with_capacity(pieces.len());
    for piece in pieces {
        instants.push(parse_instant::<B>(piece.trim())?);
    }
    builder::make_sequence(instants, lower_inc, upper_inc, interp, false)
}

/// `SeqSet := "{" Cont { "," Cont } "}"` (spec §4.6).
fn parse_sequence_set<B: BaseType>(s: &str, interp: Interpolation) -> MeosResult<SequenceSet<B>> {
    let op = "tseqset_in";
    let inner = brace_inner(op, s)?;
    let pieces = split_top_level_commas(inner);
    if pieces.is_empty() {
        return Err(MeosError::text_input(op, "a sequence set needs at least one sequence"));
    }
    let mut sequences = Vec::with_capacity(pieces.len());
    for piece in pieces {
        sequences.push(parse_cont_sequence::<B>(piece.trim(), interp)?);
    }
    builder::make_sequence_set(sequences, false)
}

fn brace_inner<'a>(op: &'static str, s: &'a str) -> MeosResult<&'a str> {
    if !s.starts_with('{') || !s.ends_with('}') {
        return Err(MeosError::text_input(op, "expected `{` ... `}`"));
    }
    Ok(&s[1..s.len() - 1])
}

fn strip_ci_prefix<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    if s.len() >= prefix.len() && s[..prefix.len()].eq_ignore_ascii_case(prefix) {
        Some(&s[prefix.len()..])
    } else {
        None
    }
}

/// Splits on commas that are not nested inside any bracket pair, so a point
/// literal's internal comma (none, here — points use whitespace — but a
/// bracketed base value in general might) never gets misread as an instant
/// separator.
fn split_top_level_commas(s: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut depth = 0i32;
    let mut start = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            ',' if depth == 0 => {
                out.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    let tail = s[start..].trim();
    if !tail.is_empty() || !out.is_empty() {
        out.push(&s[start..]);
    }
    out
}

/// Splits `s` at the last top-level occurrence of `sep`, so `POINT(1 2)@t`
/// splits on the `@` rather than anything inside the base value.
fn rsplit_top_level(s: &str, sep: char) -> Option<(&str, &str)> {
    let mut depth = 0i32;
    let mut found = None;
    for (i, c) in s.char_indices() {
        match c {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            c if c == sep && depth == 0 => found = Some(i),
            _ => {}
        }
    }
    found.map(|i| (&s[..i], &s[i + sep.len_utf8()..]))
}

/// Prints a temporal value's WKT representation, the inverse of [`parse`]
/// (spec §4.6): `SRID=` only when `srid` is `Some` and non-default for the
/// base type's geo flavour (plain base types pass `None`), `Interp=Step;`
/// only for continuous sequences/sequence-sets whose interpolation is step.
pub fn print<B: BaseType>(t: &Temporal<B>, srid: Option<i32>) -> String {
    let mut out = String::new();
    if let Some(srid) = srid {
        if srid != 0 {
            out.push_str(&format!("SRID={srid};"));
        }
    }
    match t {
        Temporal::Instant(i) => out.push_str(&print_instant(i)),
        Temporal::Sequence(s) => {
            if s.interpolation() == Interpolation::Step {
                out.push_str("Interp=Step;");
            }
            out.push_str(&print_sequence(s));
        }
        Temporal::SequenceSet(ss) => {
            if ss.interpolation() == Interpolation::Step {
                out.push_str("Interp=Step;");
            }
            out.push('{');
            for (i, seq) in ss.sequences().iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&print_sequence(seq));
            }
            out.push('}');
        }
    }
    out
}

fn print_instant<B: BaseType>(i: &Instant<B>) -> String {
    format!("{}@{}", i.value.print_value(), crate::time::timestamp_print(i.t))
}

fn print_sequence<B: BaseType>(s: &Sequence<B>) -> String {
    if s.is_discrete() {
        let body: Vec<String> = s.instants().iter().map(print_instant).collect();
        return format!("{{{}}}", body.join(","));
    }
    let (open, close) = (if s.lower_inc() { '[' } else { '(' }, if s.upper_inc() { ']' } else { ')' });
    let body: Vec<String> = s.instants().iter().map(print_instant).collect();
    format!("{open}{}{close}", body.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_linear_tfloat_sequence() {
        let wkt = "[1@2000-01-01 00:00:00+00, 3@2000-01-02 00:00:00+00, 2@2000-01-03 00:00:00+00)";
        let t: Temporal<f64> = parse(wkt).unwrap();
        assert_eq!(print(&t, None), wkt);
        let Temporal::Sequence(seq) = &t else { panic!("expected a sequence") };
        let noon = crate::time::timestamp_parse("test", "2000-01-01 12:00:00+00").unwrap();
        assert_eq!(seq.value_at(noon, true), Some(2.0));
    }

    #[test]
    fn dispatch_rule_distinguishes_disc_seq_from_seqset() {
        let disc: Temporal<i32> = parse("{1@2000-01-01 00:00:00+00, 2@2000-01-02 00:00:00+00}").unwrap();
        assert!(matches!(disc, Temporal::Sequence(ref s) if s.is_discrete()));

        let seqset: Temporal<i32> =
            parse("Interp=Step;{[1@2000-01-01 00:00:00+00, 2@2000-01-02 00:00:00+00)}").unwrap();
        assert!(matches!(seqset, Temporal::SequenceSet(_)));
    }

    #[test]
    fn instant_dispatch_and_print() {
        let t: Temporal<bool> = parse("t@2000-01-01 00:00:00+00").unwrap();
        assert_eq!(print(&t, None), "t@2000-01-01 00:00:00+00");
    }
}
