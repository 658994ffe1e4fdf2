//! The interpolation tag (spec §3: "Flags carried on every temporal").
//!
//! Spec §4.4 describes these as packed bitfield flags in the C struct
//! layout (`has_x`, `has_z`, `has_t`, `by_value`, `geodetic`, `continuous`).
//! This crate carries the same information as ordinary typed fields instead
//! of a bitmask: `by_value`/`continuous` are `BaseType` associated consts,
//! `geodetic` is `GeoKernel::GEODETIC`, `has_z` is `Coord::z`'s
//! `Option`-ness, and `has_x`/`has_t` follow from which `Option` fields an
//! `STBox` actually has set — each already has exactly one owner, so a
//! redundant derived bitmask alongside them would need to be kept in sync
//! by hand for no benefit a C memory-layout optimization provides in Rust.
//! Only [`Interpolation`], which has no other home, lives here.

/// How consecutive instants of a sequence relate to the values in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    /// No interpolation: the sequence is a set of discrete samples.
    Discrete,
    /// The value holds constant until the next instant.
    Step,
    /// The value interpolates linearly between consecutive instants.
    Linear,
}

impl Interpolation {
    pub fn is_continuous(self) -> bool {
        matches!(self, Interpolation::Step | Interpolation::Linear)
    }
}
