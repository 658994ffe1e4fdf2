//! The geo-kernel interface (spec §6) and the two point base types that
//! plug into it.
//!
//! The full MEOS stack defers point construction, reprojection and
//! collinearity-on-a-sphere to a separate geometry library (GEOS/PROJ in the
//! teacher crate, gated behind its optional `geos` feature). That machinery
//! is out of scope here (spec §1); instead, [`GeoKernel`] is a small trait
//! with exactly the operations the temporal engine needs, and two
//! zero-sized marker types — [`Euclidean`] and [`Geodetic`] — implement it
//! directly so `GeomPoint`/`GeogPoint` need no external dependency.

use crate::base_type::BaseType;
use crate::error::{MeosError, MeosResult};
use crate::time::Timestamp;

/// A raw coordinate, with an optional Z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
    pub z: Option<f64>,
}

impl Coord {
    pub fn new_2d(x: f64, y: f64) -> Self {
        Self { x, y, z: None }
    }

    pub fn new_3d(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z: Some(z) }
    }

    fn has_z(&self) -> bool {
        self.z.is_some()
    }
}

/// The narrow geo-kernel interface: everything the temporal engine needs
/// from a geometry library, specialized per coordinate-reference flavour.
pub trait GeoKernel: Clone + std::fmt::Debug + PartialEq {
    /// Whether this kernel operates on the sphere (geographic) rather than
    /// the plane (geometric).
    const GEODETIC: bool;

    /// Default SRID used when the WKT/STBox input leaves it unspecified
    /// (spec §6: 0 for non-geodetic, 4326 for geodetic).
    const DEFAULT_SRID: i32;

    fn distance(a: Coord, b: Coord) -> f64;
    fn interpolate(a: Coord, b: Coord, ratio: f64) -> Coord;
    fn collinear(a: Coord, b: Coord, c: Coord, ratio: f64) -> bool;
}

/// Euclidean (planar) kernel, used by geometric points (`SRID` arbitrary
/// projected CRS, default `0`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Euclidean;

impl GeoKernel for Euclidean {
    const GEODETIC: bool = false;
    const DEFAULT_SRID: i32 = 0;

    fn distance(a: Coord, b: Coord) -> f64 {
        let dz = match (a.z, b.z) {
            (Some(az), Some(bz)) => az - bz,
            _ => 0.0,
        };
        ((a.x - b.x).powi(2) + (a.y - b.y).powi(2) + dz.powi(2)).sqrt()
    }

    fn interpolate(a: Coord, b: Coord, ratio: f64) -> Coord {
        Coord {
            x: a.x + (b.x - a.x) * ratio,
            y: a.y + (b.y - a.y) * ratio,
            z: match (a.z, b.z) {
                (Some(az), Some(bz)) => Some(az + (bz - az) * ratio),
                _ => None,
            },
        }
    }

    fn collinear(a: Coord, b: Coord, c: Coord, ratio: f64) -> bool {
        let expected = Self::interpolate(a, c, ratio);
        crate::epsilon::float_eq(expected.x, b.x) && crate::epsilon::float_eq(expected.y, b.y)
    }
}

/// Geodetic (spherical) kernel, used by geographic points (`SRID 4326` by
/// default). Interpolation uses spherical linear interpolation (slerp) of
/// the unit vector corresponding to each lon/lat pair; distance uses the
/// haversine great-circle formula (mean Earth radius in metres).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geodetic;

const EARTH_RADIUS_M: f64 = 6_371_008.8;

impl Geodetic {
    fn to_unit_vector(c: Coord) -> [f64; 3] {
        let (lon, lat) = (c.x.to_radians(), c.y.to_radians());
        [lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin()]
    }

    fn from_unit_vector(v: [f64; 3]) -> Coord {
        let lat = v[2].asin();
        let lon = v[1].atan2(v[0]);
        Coord::new_2d(lon.to_degrees(), lat.to_degrees())
    }
}

impl GeoKernel for Geodetic {
    const GEODETIC: bool = true;
    const DEFAULT_SRID: i32 = 4326;

    fn distance(a: Coord, b: Coord) -> f64 {
        let (lat1, lat2) = (a.y.to_radians(), b.y.to_radians());
        let dlat = (b.y - a.y).to_radians();
        let dlon = (b.x - a.x).to_radians();
        let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_M * h.sqrt().asin()
    }

    fn interpolate(a: Coord, b: Coord, ratio: f64) -> Coord {
        let (va, vb) = (Self::to_unit_vector(a), Self::to_unit_vector(b));
        let dot = (va[0] * vb[0] + va[1] * vb[1] + va[2] * vb[2]).clamp(-1.0, 1.0);
        let theta = dot.acos();
        let mut result = if theta.abs() < 1e-12 {
            va
        } else {
            let sin_theta = theta.sin();
            let wa = ((1.0 - ratio) * theta).sin() / sin_theta;
            let wb = (ratio * theta).sin() / sin_theta;
            [
                wa * va[0] + wb * vb[0],
                wa * va[1] + wb * vb[1],
                wa * va[2] + wb * vb[2],
            ]
        };
        let norm = (result[0].powi(2) + result[1].powi(2) + result[2].powi(2)).sqrt();
        if norm > 0.0 {
            result = [result[0] / norm, result[1] / norm, result[2] / norm];
        }
        let mut coord = Self::from_unit_vector(result);
        coord.z = match (a.z, b.z) {
            (Some(az), Some(bz)) => Some(az + (bz - az) * ratio),
            _ => None,
        };
        coord
    }

    fn collinear(a: Coord, b: Coord, c: Coord, ratio: f64) -> bool {
        let expected = Self::interpolate(a, c, ratio);
        Self::distance(expected, b) < 1.0 // within 1 metre
    }
}

/// A temporal point value over kernel `K` (either [`Euclidean`] or
/// [`Geodetic`]), carrying its own SRID.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint<K> {
    pub coord: Coord,
    pub srid: i32,
    _kernel: std::marker::PhantomData<K>,
}

impl<K: GeoKernel> GeoPoint<K> {
    pub fn new(coord: Coord, srid: Option<i32>) -> Self {
        Self {
            coord,
            srid: srid.unwrap_or(K::DEFAULT_SRID),
            _kernel: std::marker::PhantomData,
        }
    }
}

/// A 2D/3D point in a projected (geometric) coordinate system.
pub type GeomPoint = GeoPoint<Euclidean>;
/// A 2D/3D point on the sphere (geographic coordinates).
pub type GeogPoint = GeoPoint<Geodetic>;

/// Geo-flavour-specific accessors, on top of [`BaseType`] (spec §4.1's
/// "for geo flavours" extension to the base-type vtable).
pub trait GeoBaseValue: BaseType {
    fn srid(&self) -> i32;
    fn is_point(&self) -> bool {
        true
    }
    fn is_empty(&self) -> bool {
        false
    }
    fn has_z(&self) -> bool;
    fn geodetic(&self) -> bool;
    fn with_srid(self, srid: i32) -> Self;
}

impl<K: GeoKernel> GeoBaseValue for GeoPoint<K> {
    fn srid(&self) -> i32 {
        self.srid
    }

    fn has_z(&self) -> bool {
        self.coord.has_z()
    }

    fn geodetic(&self) -> bool {
        K::GEODETIC
    }

    fn with_srid(mut self, srid: i32) -> Self {
        self.srid = srid;
        self
    }
}

impl<K: GeoKernel> BaseType for GeoPoint<K> {
    const BY_VALUE: bool = false;
    const CONTINUOUS: bool = true;
    const TYPE_NAME: &'static str = "tpoint";

    fn eq_value(&self, other: &Self) -> bool {
        self.coord == other.coord && self.srid == other.srid
    }

    fn approx_eq(&self, other: &Self) -> bool {
        self.srid == other.srid
            && crate::epsilon::float_eq(self.coord.x, other.coord.x)
            && crate::epsilon::float_eq(self.coord.y, other.coord.y)
            && match (self.coord.z, other.coord.z) {
                (Some(a), Some(b)) => crate::epsilon::float_eq(a, b),
                (None, None) => true,
                _ => false,
            }
    }

    fn cmp_value(&self, _other: &Self) -> Option<std::cmp::Ordering> {
        None
    }

    fn hash_value(&self) -> u64 {
        self.coord.x.to_bits() ^ self.coord.y.to_bits().rotate_left(21)
    }

    fn add_value(&self, _other: &Self) -> Option<Self> {
        None
    }

    fn sub_value(&self, _other: &Self) -> Option<Self> {
        None
    }

    fn distance(&self, other: &Self) -> f64 {
        K::distance(self.coord, other.coord)
    }

    fn srid_of(&self) -> Option<i32> {
        Some(self.srid)
    }

    fn srid_is_default(&self) -> bool {
        self.srid == K::DEFAULT_SRID
    }

    fn with_resolved_srid(&self, srid: i32) -> Self {
        GeoPoint { srid, ..*self }
    }

    fn interpolate(a: &Self, b: &Self, ratio: f64) -> Self {
        GeoPoint::new(K::interpolate(a.coord, b.coord, ratio), Some(a.srid))
    }

    fn collinear(v1: &Self, v2: &Self, v3: &Self, _t1: Timestamp, _t2: Timestamp, _t3: Timestamp) -> bool {
        K::collinear(v1.coord, v2.coord, v3.coord, crate::time::fraction(_t1, _t3, _t2))
    }

    fn parse_value(s: &str) -> MeosResult<Self> {
        parse_point::<K>(s)
    }

    fn print_value(&self) -> String {
        match self.coord.z {
            Some(z) => format!("POINT Z({} {} {})", fmt_coord(self.coord.x), fmt_coord(self.coord.y), fmt_coord(z)),
            None => format!("POINT({} {})", fmt_coord(self.coord.x), fmt_coord(self.coord.y)),
        }
    }

    fn segment_segment_intersection(a1: &Self, b1: &Self, a2: &Self, b2: &Self) -> Option<f64> {
        // Solve per-axis for a ratio consistent across x and y; z, if present,
        // must agree with the same ratio within tolerance.
        let solve_axis = |a1: f64, b1: f64, a2: f64, b2: f64| -> Option<f64> {
            let denom = (b1 - a1) - (b2 - a2);
            if denom.abs() < f64::EPSILON {
                None
            } else {
                Some((a2 - a1) / denom)
            }
        };
        let rx = solve_axis(a1.coord.x, b1.coord.x, a2.coord.x, b2.coord.x);
        let ry = solve_axis(a1.coord.y, b1.coord.y, a2.coord.y, b2.coord.y);
        let ratio = match (rx, ry) {
            (Some(rx), Some(ry)) if crate::epsilon::float_eq(rx, ry) => rx,
            (Some(r), None) | (None, Some(r)) => r,
            _ => return None,
        };
        if ratio > crate::epsilon::EPSILON && ratio < 1.0 - crate::epsilon::EPSILON {
            Some(ratio)
        } else {
            None
        }
    }
}

fn fmt_coord(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{v:.0}")
    } else {
        format!("{v}")
    }
}

/// Parses a WKT `POINT(x y)` / `POINT Z(x y z)` literal (the `BaseValue`
/// production for point base types).
fn parse_point<K: GeoKernel>(s: &str) -> MeosResult<GeoPoint<K>> {
    let s = s.trim();
    let upper = s.to_ascii_uppercase();
    if !upper.starts_with("POINT") {
        return Err(MeosError::text_input("point_in", format!("expected POINT, found `{s}`")));
    }
    let rest = s["POINT".len()..].trim_start();
    let (has_z, rest) = if let Some(r) = rest.strip_prefix('Z').or_else(|| rest.strip_prefix('z')) {
        (true, r.trim_start())
    } else {
        (false, rest)
    };
    let inner = rest
        .strip_prefix('(')
        .and_then(|r| r.strip_suffix(')'))
        .ok_or_else(|| MeosError::text_input("point_in", "missing parentheses"))?;
    let coords: Vec<f64> = inner
        .split_whitespace()
        .map(|tok| {
            tok.parse::<f64>()
                .map_err(|e| MeosError::text_input("point_in", e.to_string()))
        })
        .collect::<MeosResult<_>>()?;
    match (has_z, coords.as_slice()) {
        (false, [x, y]) => Ok(GeoPoint::new(Coord::new_2d(*x, *y), None)),
        (true, [x, y, z]) => Ok(GeoPoint::new(Coord::new_3d(*x, *y, *z), None)),
        _ => Err(MeosError::text_input(
            "point_in",
            format!("expected {} coordinates, found {}", if has_z { 3 } else { 2 }, coords.len()),
        )),
    }
}
