//! The one place the textual surface genuinely needs a runtime name-to-type
//! lookup: resolving a WKT type tag (`"tint"`, `"tfloat"`, ...) to the right
//! monomorphization of the parser.
//!
//! Every other corner of the engine is written against the compile-time
//! trait bound `B: BaseType` (see [`crate::base_type`]'s module doc) — this
//! registry exists only because an embedder receiving raw WKT text off the
//! wire (no compile-time type information) needs *something* to dispatch on.
//! It is read-only and has nothing to initialize, so unlike a C vtable
//! registry it needs no `OnceLock`/startup step; it is recorded as the
//! idiomatic-Rust realization of spec §4.1's "base-type registry" in
//! DESIGN.md.

use crate::error::{MeosError, MeosResult};
use crate::geo::{GeogPoint, GeomPoint};
use crate::temporal::Temporal;
use crate::wkt;

/// A temporal value whose base type was resolved at runtime from a WKT type
/// tag rather than known at compile time.
#[derive(Debug, Clone, PartialEq)]
pub enum AnyTemporal {
    Bool(Temporal<bool>),
    Int(Temporal<i32>),
    Float(Temporal<f64>),
    Text(Temporal<String>),
    GeomPoint(Temporal<GeomPoint>),
    GeogPoint(Temporal<GeogPoint>),
}

impl AnyTemporal {
    /// The type tag this value would round-trip through ([`BaseType::TYPE_NAME`](crate::base_type::BaseType::TYPE_NAME)).
    pub fn type_name(&self) -> &'static str {
        match self {
            AnyTemporal::Bool(_) => <bool as crate::base_type::BaseType>::TYPE_NAME,
            AnyTemporal::Int(_) => <i32 as crate::base_type::BaseType>::TYPE_NAME,
            AnyTemporal::Float(_) => <f64 as crate::base_type::BaseType>::TYPE_NAME,
            AnyTemporal::Text(_) => <String as crate::base_type::BaseType>::TYPE_NAME,
            AnyTemporal::GeomPoint(_) => "tgeompoint",
            AnyTemporal::GeogPoint(_) => "tgeogpoint",
        }
    }

    pub fn print(&self) -> String {
        match self {
            AnyTemporal::Bool(t) => wkt::print(t, None),
            AnyTemporal::Int(t) => wkt::print(t, None),
            AnyTemporal::Float(t) => wkt::print(t, None),
            AnyTemporal::Text(t) => wkt::print(t, None),
            AnyTemporal::GeomPoint(t) => wkt::print(t, Some(srid_of(t))),
            AnyTemporal::GeogPoint(t) => wkt::print(t, Some(srid_of(t))),
        }
    }
}

fn srid_of<K: crate::geo::GeoKernel>(t: &Temporal<crate::geo::GeoPoint<K>>) -> i32 {
    use crate::geo::GeoBaseValue;
    match t {
        Temporal::Instant(i) => i.value.srid(),
        Temporal::Sequence(s) => s.start_instant().value.srid(),
        Temporal::SequenceSet(ss) => ss.start_sequence().start_instant().value.srid(),
    }
}

/// Parses `wkt` as the base type named by `type_tag` (case-insensitive),
/// dispatching to the matching monomorphization of [`crate::wkt::parse`].
pub fn parse_typed(type_tag: &str, wkt: &str) -> MeosResult<AnyTemporal> {
    match type_tag.to_ascii_lowercase().as_str() {
        "tbool" => Ok(AnyTemporal::Bool(crate::wkt::parse(wkt)?)),
        "tint" => Ok(AnyTemporal::Int(crate::wkt::parse(wkt)?)),
        "tfloat" => Ok(AnyTemporal::Float(crate::wkt::parse(wkt)?)),
        "ttext" => Ok(AnyTemporal::Text(crate::wkt::parse(wkt)?)),
        "tgeompoint" => Ok(AnyTemporal::GeomPoint(crate::wkt::parse(wkt)?)),
        "tgeogpoint" => Ok(AnyTemporal::GeogPoint(crate::wkt::parse(wkt)?)),
        other => Err(MeosError::internal_type_error("registry_parse", format!("unknown base type tag `{other}`"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatches_by_type_tag() {
        let t = parse_typed("tint", "{1@2000-01-01 00:00:00+00, 2@2000-01-02 00:00:00+00}").unwrap();
        assert_eq!(t.type_name(), "tint");
        assert!(matches!(t, AnyTemporal::Int(_)));
    }

    #[test]
    fn unknown_type_tag_fails() {
        assert!(parse_typed("tfrobnicate", "1@2000-01-01 00:00:00+00").is_err());
    }
}
