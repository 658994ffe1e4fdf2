//! The base-type registry (C1): the vtable every temporal value's element
//! type must provide.
//!
//! Unlike the C implementation, which looks up a `meosType` at runtime to
//! find the right set of function pointers, idiomatic Rust resolves this at
//! compile time: each concrete base type (`bool`, `i32`, `f64`, `String`,
//! the point types in [`crate::geo`]) implements [`BaseType`] directly, and
//! generic code throughout the crate is written against the trait bound
//! `B: BaseType` rather than against a dynamic vtable. A small runtime
//! registry ([`crate::registry`]) still exists, but only to resolve a WKT
//! type tag (`"tint"`, `"tfloat"`, ...) to a constructor during parsing —
//! the one place the textual surface genuinely needs a name-to-type lookup.

use std::cmp::Ordering;
use std::fmt::Debug;

use crate::error::MeosResult;
use crate::time::Timestamp;

/// Per-base-type semantics required by the temporal value engine.
///
/// `Self` is the in-memory representation of one sampled value (e.g. `f64`
/// for `tfloat`, `bool` for `tbool`). Implementors are always `Clone` since
/// every accessor in the engine returns owned values rather than borrowing
/// into the middle of a packed instant array.
pub trait BaseType: Clone + Debug {
    /// Whether values of this type are small enough to be stored inline
    /// (by value) rather than boxed/indirected. Pure bookkeeping here —
    /// Rust's `Vec<Instant<B>>` stores `B` inline either way — but it is
    /// still surfaced because [`crate::temporal`] flags it on every
    /// temporal value, matching the layout note of spec §3.
    const BY_VALUE: bool;

    /// Whether linear interpolation between two values of this type is
    /// defined. `false` for `bool`/text, `true` for numeric and point types.
    const CONTINUOUS: bool;

    /// Name used in WKT type tags and error messages (`"tint"`, `"tfloat"`, ...).
    const TYPE_NAME: &'static str;

    /// Exact equality, used by the normalizer's step/discrete dedup rules
    /// (spec §4.5) and by the bound-discipline invariant (spec §8).
    fn eq_value(&self, other: &Self) -> bool;

    /// Equality used by collinearity/step-join tests. Defaults to
    /// [`BaseType::eq_value`]; floating-point types override it to use
    /// [`crate::epsilon::EPSILON`].
    fn approx_eq(&self, other: &Self) -> bool {
        self.eq_value(other)
    }

    /// Total order, when one exists for the type (used by `min_value`/
    /// `max_value` and by value-span construction). `None` for types with
    /// no natural order over the represented domain (e.g. points).
    fn cmp_value(&self, other: &Self) -> Option<Ordering>;

    /// A stable hash of the value, used by `values()` dedup.
    fn hash_value(&self) -> u64;

    /// Numeric add, when defined (used by affine value transforms).
    fn add_value(&self, other: &Self) -> Option<Self>;

    /// Numeric subtract, when defined.
    fn sub_value(&self, other: &Self) -> Option<Self>;

    /// A non-negative distance between two values, used by
    /// `make_sequence_set_with_gaps`'s `max_distance` cut and by collinearity
    /// fallbacks.
    fn distance(&self, other: &Self) -> f64;

    /// Projects the value onto `f64` when the type has a natural scalar
    /// embedding (numeric types; point types override this per-coordinate
    /// through [`crate::geo`] rather than through this hook). `None` by
    /// default, which disables the generic linear-algebra-based defaults
    /// below for non-numeric types.
    fn as_f64(&self) -> Option<f64> {
        None
    }

    /// Inverse of [`BaseType::as_f64`].
    fn from_f64(_value: f64) -> Option<Self> {
        None
    }

    /// Linear interpolation between `a` and `b` at `ratio ∈ [0, 1]`.
    /// Only ever invoked when `Self::CONTINUOUS`; the default uses
    /// [`BaseType::as_f64`]/[`BaseType::from_f64`] and panics if the type
    /// hasn't provided them despite claiming continuity — that combination
    /// is a bug in the `BaseType` impl, not a runtime condition.
    fn interpolate(a: &Self, b: &Self, ratio: f64) -> Self {
        let (fa, fb) = (
            a.as_f64().expect("continuous base type must implement as_f64"),
            b.as_f64().expect("continuous base type must implement as_f64"),
        );
        Self::from_f64(fa + (fb - fa) * ratio).expect("continuous base type must implement from_f64")
    }

    /// Tests whether `v1, v2, v3` sampled at `t1 < t2 < t3` are collinear:
    /// `v2 ≈ interpolate(v1, v3, ratio)` where `ratio = (t2-t1)/(t3-t1)`.
    /// Non-continuous base types always answer `false` (spec §4.1).
    fn collinear(v1: &Self, v2: &Self, v3: &Self, t1: Timestamp, t2: Timestamp, t3: Timestamp) -> bool {
        if !Self::CONTINUOUS {
            return false;
        }
        let ratio = crate::time::fraction(t1, t3, t2);
        v2.approx_eq(&Self::interpolate(v1, v3, ratio))
    }

    /// The value's own SRID, for base types that carry one (the geo
    /// flavours). `None` for every other base type — the WKT parser's SRID
    /// reconciliation (spec §4.6) is then a no-op.
    fn srid_of(&self) -> Option<i32> {
        None
    }

    /// Whether [`BaseType::srid_of`] is still at the flavour's unspecified
    /// default (spec §9's open question: the base-value parser here never
    /// sees its own `SRID=` prefix, so "unknown" and "default" collapse into
    /// one case — see DESIGN.md for the resolution). Base types without a
    /// notion of SRID report `true` unconditionally, so the reconciliation
    /// in [`crate::wkt`] always treats them as adoptable.
    fn srid_is_default(&self) -> bool {
        true
    }

    /// Returns a copy of `self` with its SRID stamped to `srid`. The default
    /// is a no-op clone, correct for every base type without a notion of SRID.
    fn with_resolved_srid(&self, _srid: i32) -> Self {
        self.clone()
    }

    /// Parses one base value from its WKT token (the `BaseValue` production
    /// of spec §4.6's grammar).
    fn parse_value(s: &str) -> MeosResult<Self>
    where
        Self: Sized;

    /// Prints one base value the way the WKT printer reproduces it.
    fn print_value(&self) -> String;

    /// If the segment from `a` to `b` passes through value `v`, returns the
    /// fraction `ratio ∈ [0, 1]` at which it does.
    fn segment_intersects_value(a: &Self, b: &Self, v: &Self) -> Option<f64> {
        if a.approx_eq(v) {
            return Some(0.0);
        }
        if b.approx_eq(v) {
            return Some(1.0);
        }
        if !Self::CONTINUOUS {
            return None;
        }
        let (fa, fb, fv) = (a.as_f64()?, b.as_f64()?, v.as_f64()?);
        if (fb - fa).abs() < f64::EPSILON {
            return None;
        }
        let ratio = (fv - fa) / (fb - fa);
        if (0.0..=1.0).contains(&ratio) {
            Some(crate::epsilon::clamp_ratio(ratio))
        } else {
            None
        }
    }

    /// If two segments spanning the same time domain (`a1..b1` and
    /// `a2..b2`, both parameterized by the same `ratio ∈ [0, 1]`) cross,
    /// returns the crossing `ratio` strictly inside `(0, 1)`.
    fn segment_segment_intersection(a1: &Self, b1: &Self, a2: &Self, b2: &Self) -> Option<f64> {
        if !Self::CONTINUOUS {
            return None;
        }
        let (fa1, fb1, fa2, fb2) = (a1.as_f64()?, b1.as_f64()?, a2.as_f64()?, b2.as_f64()?);
        let denom = (fb1 - fa1) - (fb2 - fa2);
        if denom.abs() < f64::EPSILON {
            return None;
        }
        let ratio = (fa2 - fa1) / denom;
        if ratio > crate::epsilon::EPSILON && ratio < 1.0 - crate::epsilon::EPSILON {
            Some(ratio)
        } else {
            None
        }
    }
}

impl BaseType for bool {
    const BY_VALUE: bool = true;
    const CONTINUOUS: bool = false;
    const TYPE_NAME: &'static str = "tbool";

    fn eq_value(&self, other: &Self) -> bool {
        self == other
    }

    fn cmp_value(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }

    fn hash_value(&self) -> u64 {
        *self as u64
    }

    fn add_value(&self, _other: &Self) -> Option<Self> {
        None
    }

    fn sub_value(&self, _other: &Self) -> Option<Self> {
        None
    }

    fn distance(&self, other: &Self) -> f64 {
        if self == other {
            0.0
        } else {
            1.0
        }
    }

    fn parse_value(s: &str) -> MeosResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "t" | "true" => Ok(true),
            "f" | "false" => Ok(false),
            other => Err(crate::error::MeosError::text_input(
                "tbool_in",
                format!("expected `t`/`f`, found `{other}`"),
            )),
        }
    }

    fn print_value(&self) -> String {
        if *self { "t".to_string() } else { "f".to_string() }
    }
}

impl BaseType for i32 {
    const BY_VALUE: bool = true;
    const CONTINUOUS: bool = false;
    const TYPE_NAME: &'static str = "tint";

    fn eq_value(&self, other: &Self) -> bool {
        self == other
    }

    fn cmp_value(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }

    fn hash_value(&self) -> u64 {
        *self as u64
    }

    fn add_value(&self, other: &Self) -> Option<Self> {
        self.checked_add(*other)
    }

    fn sub_value(&self, other: &Self) -> Option<Self> {
        self.checked_sub(*other)
    }

    fn distance(&self, other: &Self) -> f64 {
        (*self as f64 - *other as f64).abs()
    }

    fn as_f64(&self) -> Option<f64> {
        Some(*self as f64)
    }

    fn from_f64(_value: f64) -> Option<Self> {
        // tint has no linear interpolation (non-continuous); step-only.
        None
    }

    fn parse_value(s: &str) -> MeosResult<Self> {
        s.trim()
            .parse::<i32>()
            .map_err(|e| crate::error::MeosError::text_input("tint_in", e.to_string()))
    }

    fn print_value(&self) -> String {
        self.to_string()
    }
}

impl BaseType for f64 {
    const BY_VALUE: bool = true;
    const CONTINUOUS: bool = true;
    const TYPE_NAME: &'static str = "tfloat";

    fn eq_value(&self, other: &Self) -> bool {
        self == other
    }

    fn approx_eq(&self, other: &Self) -> bool {
        crate::epsilon::float_eq(*self, *other)
    }

    fn cmp_value(&self, other: &Self) -> Option<Ordering> {
        self.partial_cmp(other)
    }

    fn hash_value(&self) -> u64 {
        self.to_bits()
    }

    fn add_value(&self, other: &Self) -> Option<Self> {
        Some(self + other)
    }

    fn sub_value(&self, other: &Self) -> Option<Self> {
        Some(self - other)
    }

    fn distance(&self, other: &Self) -> f64 {
        (self - other).abs()
    }

    fn as_f64(&self) -> Option<f64> {
        Some(*self)
    }

    fn from_f64(value: f64) -> Option<Self> {
        Some(value)
    }

    fn parse_value(s: &str) -> MeosResult<Self> {
        s.trim()
            .parse::<f64>()
            .map_err(|e| crate::error::MeosError::text_input("tfloat_in", e.to_string()))
    }

    fn print_value(&self) -> String {
        if self.fract() == 0.0 && self.abs() < 1e15 {
            format!("{self:.0}")
        } else {
            format!("{self}")
        }
    }
}

impl BaseType for String {
    const BY_VALUE: bool = false;
    const CONTINUOUS: bool = false;
    const TYPE_NAME: &'static str = "ttext";

    fn eq_value(&self, other: &Self) -> bool {
        self == other
    }

    fn cmp_value(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }

    fn hash_value(&self) -> u64 {
        use std::hash::{Hash, Hasher};
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }

    fn add_value(&self, _other: &Self) -> Option<Self> {
        None
    }

    fn sub_value(&self, _other: &Self) -> Option<Self> {
        None
    }

    fn distance(&self, other: &Self) -> f64 {
        if self == other {
            0.0
        } else {
            1.0
        }
    }

    fn parse_value(s: &str) -> MeosResult<Self> {
        let trimmed = s.trim();
        if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
            Ok(trimmed[1..trimmed.len() - 1].to_string())
        } else {
            Ok(trimmed.to_string())
        }
    }

    fn print_value(&self) -> String {
        format!("\"{}\"", self.replace('"', "\"\""))
    }
}
