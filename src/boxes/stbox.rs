//! STBox (C3): `(flags, srid, xmin, xmax, ymin, ymax, zmin, zmax, tmin, tmax)`.
//!
//! `has_x` toggles the spatial x/y coordinates; `has_z`, `geodetic`,
//! `has_t` are independent flags. All dimension fields are optional so a
//! box can describe a purely temporal period, a purely spatial extent, or
//! both together.

use crate::error::{MeosError, MeosResult};
use crate::time::Timestamp;

/// A closed `[min, max]` range on one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range<T> {
    pub min: T,
    pub max: T,
}

impl Range<f64> {
    fn new(a: f64, b: f64) -> Self {
        Range { min: a.min(b), max: a.max(b) }
    }

    fn intersect(&self, other: &Self) -> Option<Self> {
        let min = self.min.max(other.min);
        let max = self.max.min(other.max);
        if min <= max {
            Some(Range { min, max })
        } else {
            None
        }
    }

    fn expand(&self, other: &Self) -> Self {
        Range { min: self.min.min(other.min), max: self.max.max(other.max) }
    }

    fn width(&self) -> f64 {
        self.max - self.min
    }
}

impl Range<Timestamp> {
    fn new(a: Timestamp, b: Timestamp) -> Self {
        if a <= b {
            Range { min: a, max: b }
        } else {
            Range { min: b, max: a }
        }
    }

    fn intersect(&self, other: &Self) -> Option<Self> {
        let min = self.min.max(other.min);
        let max = self.max.min(other.max);
        if min <= max {
            Some(Range { min, max })
        } else {
            None
        }
    }

    fn expand(&self, other: &Self) -> Self {
        Range { min: self.min.min(other.min), max: self.max.max(other.max) }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct STBox {
    pub srid: i32,
    pub geodetic: bool,
    x: Option<Range<f64>>,
    y: Option<Range<f64>>,
    z: Option<Range<f64>>,
    t: Option<Range<Timestamp>>,
}

impl STBox {
    /// Builds a box, normalizing `min`/`max` per dimension (spec §4.3).
    pub fn new(
        srid: i32,
        geodetic: bool,
        xy: Option<((f64, f64), (f64, f64))>,
        z: Option<(f64, f64)>,
        t: Option<(Timestamp, Timestamp)>,
    ) -> MeosResult<Self> {
        if z.is_some() && xy.is_none() {
            return Err(MeosError::invalid_arg_value("stbox_make", "a Z range requires an X/Y range"));
        }
        Ok(Self {
            srid,
            geodetic,
            x: xy.map(|(x, _)| Range::<f64>::new(x.0, x.1)),
            y: xy.map(|(_, y)| Range::<f64>::new(y.0, y.1)),
            z: z.map(|(a, b)| Range::<f64>::new(a, b)),
            t: t.map(|(a, b)| Range::<Timestamp>::new(a, b)),
        })
    }

    pub fn has_x(&self) -> bool {
        self.x.is_some()
    }

    pub fn has_z(&self) -> bool {
        self.z.is_some()
    }

    pub fn has_t(&self) -> bool {
        self.t.is_some()
    }

    pub fn xmin(&self) -> Option<f64> {
        self.x.map(|r| r.min)
    }

    pub fn xmax(&self) -> Option<f64> {
        self.x.map(|r| r.max)
    }

    pub fn ymin(&self) -> Option<f64> {
        self.y.map(|r| r.min)
    }

    pub fn ymax(&self) -> Option<f64> {
        self.y.map(|r| r.max)
    }

    pub fn zmin(&self) -> Option<f64> {
        self.z.map(|r| r.min)
    }

    pub fn zmax(&self) -> Option<f64> {
        self.z.map(|r| r.max)
    }

    pub fn tmin(&self) -> Option<Timestamp> {
        self.t.map(|r| r.min)
    }

    pub fn tmax(&self) -> Option<Timestamp> {
        self.t.map(|r| r.max)
    }

    fn require_compatible(&self, op: &'static str, other: &Self) -> MeosResult<()> {
        if self.geodetic != other.geodetic {
            return Err(MeosError::dimension_mismatch(op, "mixing geodetic with non-geodetic boxes"));
        }
        if self.srid != other.srid {
            return Err(MeosError::srid_mismatch(op, self.srid, other.srid));
        }
        Ok(())
    }

    /// `expand(other)`: component-wise min/max on shared dimensions; a
    /// dimension present in only one operand passes through unchanged
    /// (spec §4.3).
    pub fn expand(&self, other: &Self) -> MeosResult<Self> {
        self.require_compatible("stbox_expand", other)?;
        Ok(Self {
            srid: self.srid,
            geodetic: self.geodetic,
            x: merge_optional(self.x, other.x, Range::<f64>::expand),
            y: merge_optional(self.y, other.y, Range::<f64>::expand),
            z: merge_optional(self.z, other.z, Range::<f64>::expand),
            t: merge_optional(self.t, other.t, Range::<Timestamp>::expand),
        })
    }

    /// `intersect(other)`: fails closed (returns `None`, an empty box)
    /// unless SRIDs and geodetic flags agree; the result's dimension set
    /// is the intersection of the operands' dimension sets (spec §4.3).
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        if self.geodetic != other.geodetic || self.srid != other.srid {
            return None;
        }
        let x = intersect_shared(self.x, other.x)?;
        let y = intersect_shared(self.y, other.y)?;
        let z = intersect_shared(self.z, other.z)?;
        let t = intersect_shared(self.t, other.t)?;
        if x.is_none() && y.is_none() && z.is_none() && t.is_none() {
            return None;
        }
        Some(Self { srid: self.srid, geodetic: self.geodetic, x, y, z, t })
    }

    fn shares_a_dimension(&self, other: &Self) -> bool {
        (self.has_x() && other.has_x()) || (self.has_z() && other.has_z()) || (self.has_t() && other.has_t())
    }

    pub fn contains(&self, other: &Self) -> MeosResult<bool> {
        self.require_compatible("stbox_contains", other)?;
        if !self.shares_a_dimension(other) {
            return Err(MeosError::dimension_mismatch("stbox_contains", "boxes share no common dimension"));
        }
        let axis_ok = |a: Option<Range<f64>>, b: Option<Range<f64>>| match (a, b) {
            (Some(a), Some(b)) => a.min <= b.min && b.max <= a.max,
            (None, Some(_)) => false,
            _ => true,
        };
        let t_ok = match (self.t, other.t) {
            (Some(a), Some(b)) => a.min <= b.min && b.max <= a.max,
            (None, Some(_)) => false,
            _ => true,
        };
        Ok(axis_ok(self.x, other.x) && axis_ok(self.y, other.y) && axis_ok(self.z, other.z) && t_ok)
    }

    pub fn contained(&self, other: &Self) -> MeosResult<bool> {
        other.contains(self)
    }

    pub fn overlaps(&self, other: &Self) -> MeosResult<bool> {
        self.require_compatible("stbox_overlaps", other)?;
        if !self.shares_a_dimension(other) {
            return Err(MeosError::dimension_mismatch("stbox_overlaps", "boxes share no common dimension"));
        }
        Ok(self.intersect(other).is_some())
    }

    pub fn same(&self, other: &Self) -> MeosResult<bool> {
        Ok(self.contains(other)? && other.contains(self)?)
    }

    /// `adjacent`: boxes intersect and the intersection is of lower
    /// dimension than the operands (spec §4.3) — i.e. they touch along a
    /// shared face/edge/point rather than overlapping with positive volume
    /// on every shared axis.
    pub fn adjacent(&self, other: &Self) -> MeosResult<bool> {
        self.require_compatible("stbox_adjacent", other)?;
        if !self.shares_a_dimension(other) {
            return Err(MeosError::dimension_mismatch("stbox_adjacent", "boxes share no common dimension"));
        }
        let Some(inter) = self.intersect(other) else { return Ok(false) };
        let touches_on_x = inter.x.is_some_and(|r| r.width() == 0.0);
        let touches_on_y = inter.y.is_some_and(|r| r.width() == 0.0);
        let touches_on_z = inter.z.is_some_and(|r| r.width() == 0.0);
        let touches_on_t = inter.t.is_some_and(|r| r.max - r.min == crate::time::Interval::zero());
        Ok(touches_on_x || touches_on_y || touches_on_z || touches_on_t)
    }

    fn require_axis(&self, other: &Self, op: &'static str, has: impl Fn(&Self) -> bool) -> MeosResult<()> {
        self.require_compatible(op, other)?;
        if !has(self) || !has(other) {
            return Err(MeosError::dimension_mismatch(op, "the tested dimension is missing on at least one operand"));
        }
        Ok(())
    }

    pub fn left(&self, other: &Self) -> MeosResult<bool> {
        self.require_axis(other, "stbox_left", Self::has_x)?;
        Ok(self.xmax().unwrap() < other.xmin().unwrap())
    }

    pub fn over_left(&self, other: &Self) -> MeosResult<bool> {
        self.require_axis(other, "stbox_overleft", Self::has_x)?;
        Ok(self.xmax().unwrap() <= other.xmax().unwrap())
    }

    pub fn right(&self, other: &Self) -> MeosResult<bool> {
        self.require_axis(other, "stbox_right", Self::has_x)?;
        Ok(self.xmin().unwrap() > other.xmax().unwrap())
    }

    pub fn over_right(&self, other: &Self) -> MeosResult<bool> {
        self.require_axis(other, "stbox_overright", Self::has_x)?;
        Ok(self.xmin().unwrap() >= other.xmin().unwrap())
    }

    pub fn below(&self, other: &Self) -> MeosResult<bool> {
        self.require_axis(other, "stbox_below", Self::has_x)?;
        Ok(self.ymax().unwrap() < other.ymin().unwrap())
    }

    pub fn over_below(&self, other: &Self) -> MeosResult<bool> {
        self.require_axis(other, "stbox_overbelow", Self::has_x)?;
        Ok(self.ymax().unwrap() <= other.ymax().unwrap())
    }

    pub fn above(&self, other: &Self) -> MeosResult<bool> {
        self.require_axis(other, "stbox_above", Self::has_x)?;
        Ok(self.ymin().unwrap() > other.ymax().unwrap())
    }

    pub fn over_above(&self, other: &Self) -> MeosResult<bool> {
        self.require_axis(other, "stbox_overabove", Self::has_x)?;
        Ok(self.ymin().unwrap() >= other.ymin().unwrap())
    }

    pub fn front(&self, other: &Self) -> MeosResult<bool> {
        self.require_axis(other, "stbox_front", Self::has_z)?;
        Ok(self.zmax().unwrap() < other.zmin().unwrap())
    }

    pub fn over_front(&self, other: &Self) -> MeosResult<bool> {
        self.require_axis(other, "stbox_overfront", Self::has_z)?;
        Ok(self.zmax().unwrap() <= other.zmax().unwrap())
    }

    pub fn back(&self, other: &Self) -> MeosResult<bool> {
        self.require_axis(other, "stbox_back", Self::has_z)?;
        Ok(self.zmin().unwrap() > other.zmax().unwrap())
    }

    pub fn over_back(&self, other: &Self) -> MeosResult<bool> {
        self.require_axis(other, "stbox_overback", Self::has_z)?;
        Ok(self.zmin().unwrap() >= other.zmin().unwrap())
    }

    pub fn before(&self, other: &Self) -> MeosResult<bool> {
        self.require_axis(other, "stbox_before", Self::has_t)?;
        Ok(self.tmax().unwrap() < other.tmin().unwrap())
    }

    pub fn over_before(&self, other: &Self) -> MeosResult<bool> {
        self.require_axis(other, "stbox_overbefore", Self::has_t)?;
        Ok(self.tmax().unwrap() <= other.tmax().unwrap())
    }

    pub fn after(&self, other: &Self) -> MeosResult<bool> {
        self.require_axis(other, "stbox_after", Self::has_t)?;
        Ok(self.tmin().unwrap() > other.tmax().unwrap())
    }

    pub fn over_after(&self, other: &Self) -> MeosResult<bool> {
        self.require_axis(other, "stbox_overafter", Self::has_t)?;
        Ok(self.tmin().unwrap() >= other.tmin().unwrap())
    }

    /// Parses the STBox textual form (spec §6):
    /// `[SRID=n;] [GEOD]STBOX [X][Z][T]( (xmin[,ymin[,zmin]][,tmin]), (xmax[,ymax[,zmax]][,tmax]) )`.
    /// The dimension marker is one of `ZT`/`XT`/`Z`/`X`/`T` (or omitted for
    /// a bare spatial-only box); `X` has no effect of its own since `has_x`
    /// is inferred from the coordinate group, but is still consumed so
    /// `STBOX X(...)`/`STBOX XT(...)` parse.
    ///
    /// SRID resolution follows `original_source/meos/src/point/tpoint_parser.c`'s `stbox_parse`:
    /// the coordinate list is parsed first, and only afterward does a
    /// missing `SRID=` prefix default to `0` (non-geodetic) or `4326`
    /// (geodetic) — so a malformed coordinate list is reported before any
    /// default is committed.
    pub fn parse(s: &str) -> MeosResult<Self> {
        let op = "stbox_in";
        let mut rest = s.trim();
        let mut explicit_srid = None;
        if let Some(tail) = rest.strip_prefix("SRID=").or_else(|| rest.strip_prefix("srid=")) {
            let (num, after) = tail
                .split_once(';')
                .ok_or_else(|| MeosError::text_input(op, "missing `;` after SRID"))?;
            explicit_srid = Some(num.trim().parse::<i32>().map_err(|e| MeosError::text_input(op, e.to_string()))?);
            rest = after.trim_start();
        }
        let upper = rest.to_ascii_uppercase();
        let geodetic = upper.starts_with("GEODSTBOX");
        let keyword_len = if geodetic { "GEODSTBOX".len() } else if upper.starts_with("STBOX") { "STBOX".len() } else {
            return Err(MeosError::text_input(op, "expected STBOX or GEODSTBOX"));
        };
        let mut body = rest[keyword_len..].trim_start();
        let mut has_z = false;
        let mut has_t = false;
        // Dimension marker: one of ZT, XT, Z, X, T (`tpoint_parser.c`'s
        // `stbox_parse`). `X` carries no flag of its own here since `has_x`
        // is inferred from the coordinate group below; it's still consumed
        // so `STBOX X(...)`/`STBOX XT(...)` parse instead of failing on the
        // leading `X`.
        loop {
            if let Some(b) = body.strip_prefix('Z').or_else(|| body.strip_prefix('z')) {
                has_z = true;
                body = b.trim_start();
            } else if let Some(b) = body.strip_prefix('T').or_else(|| body.strip_prefix('t')) {
                has_t = true;
                body = b.trim_start();
            } else if let Some(b) = body.strip_prefix('X').or_else(|| body.strip_prefix('x')) {
                body = b.trim_start();
            } else {
                break;
            }
        }
        let inner = body
            .strip_prefix('(')
            .and_then(|b| b.trim_end().strip_suffix(')'))
            .ok_or_else(|| MeosError::text_input(op, "missing outer parentheses"))?;
        let (min_part, max_part) = split_top_level_pair(inner).ok_or_else(|| MeosError::text_input(op, "expected two coordinate groups"))?;
        let (min_xyz, min_t) = parse_coord_group(op, min_part.trim(), has_z, has_t)?;
        let (max_xyz, max_t) = parse_coord_group(op, max_part.trim(), has_z, has_t)?;

        let has_x = !min_xyz.is_empty();
        let xy = if has_x {
            Some(((min_xyz[0], max_xyz[0]), (min_xyz[1], max_xyz[1])))
        } else {
            None
        };
        let z = if has_z { Some((min_xyz[2], max_xyz[2])) } else { None };
        let t = match (min_t, max_t) {
            (Some(a), Some(b)) => Some((a, b)),
            _ => None,
        };

        let srid = explicit_srid.unwrap_or(if geodetic { 4326 } else { 0 });
        STBox::new(srid, geodetic, xy, z, t)
    }

    /// Prints the textual form, the inverse of [`STBox::parse`].
    pub fn print(&self) -> String {
        let mut out = String::new();
        let default_srid = if self.geodetic { 4326 } else { 0 };
        if self.srid != default_srid {
            out.push_str(&format!("SRID={};", self.srid));
        }
        out.push_str(if self.geodetic { "GEODSTBOX " } else { "STBOX " });
        if self.has_z() {
            out.push('Z');
        }
        if self.has_t() {
            out.push('T');
        }
        let fmt_group = |x: Option<f64>, y: Option<f64>, z: Option<f64>, t: Option<Timestamp>| {
            let mut parts = Vec::new();
            if let Some(x) = x {
                parts.push(fmt_f64(x));
            }
            if let Some(y) = y {
                parts.push(fmt_f64(y));
            }
            if let Some(z) = z {
                parts.push(fmt_f64(z));
            }
            let coords = if parts.is_empty() { String::new() } else { format!("({})", parts.join(",")) };
            match t {
                Some(t) => {
                    if coords.is_empty() {
                        format!("({})", crate::time::timestamp_print(t))
                    } else {
                        format!("({}, {})", coords, crate::time::timestamp_print(t))
                    }
                }
                None => coords,
            }
        };
        let min = fmt_group(self.xmin(), self.ymin(), self.zmin(), self.tmin());
        let max = fmt_group(self.xmax(), self.ymax(), self.zmax(), self.tmax());
        out.push_str(&format!("({}, {})", min, max));
        out
    }
}

fn fmt_f64(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{v:.0}")
    } else {
        format!("{v}")
    }
}

fn merge_optional<T: Copy>(a: Option<T>, b: Option<T>, f: impl Fn(&T, &T) -> T) -> Option<T> {
    match (a, b) {
        (Some(a), Some(b)) => Some(f(&a, &b)),
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (None, None) => None,
    }
}

fn intersect_shared<T: Copy>(a: Option<Range<T>>, b: Option<Range<T>>) -> Option<Option<Range<T>>>
where
    Range<T>: IntersectRange,
{
    match (a, b) {
        (Some(a), Some(b)) => a.intersect_range(&b).map(Some),
        (None, None) => Some(None),
        // One side lacks the dimension: that dimension drops out of the result entirely.
        _ => Some(None),
    }
}

trait IntersectRange: Sized {
    fn intersect_range(&self, other: &Self) -> Option<Self>;
}

impl IntersectRange for Range<f64> {
    fn intersect_range(&self, other: &Self) -> Option<Self> {
        self.intersect(other)
    }
}

impl IntersectRange for Range<Timestamp> {
    fn intersect_range(&self, other: &Self) -> Option<Self> {
        self.intersect(other)
    }
}

/// Splits `"a, b"` into `("a", "b")` at the top-level comma (ignoring commas
/// nested inside the per-point parentheses).
fn split_top_level_pair(s: &str) -> Option<(&str, &str)> {
    let mut depth = 0i32;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            ',' if depth == 0 => return Some((&s[..i], &s[i + 1..])),
            _ => {}
        }
    }
    None
}

/// Parses one `(xmin[,ymin[,zmin]][, tmin])` group into coordinates and an
/// optional timestamp.
fn parse_coord_group(op: &'static str, s: &str, has_z: bool, has_t: bool) -> MeosResult<(Vec<f64>, Option<Timestamp>)> {
    let s = s.trim();
    if !has_t {
        let inner = s
            .strip_prefix('(')
            .and_then(|b| b.strip_suffix(')'))
            .ok_or_else(|| MeosError::text_input(op, "missing coordinate parentheses"))?;
        let coords = parse_floats(op, inner)?;
        return Ok((coords, None));
    }
    let (coord_part, ts_part) = split_top_level_pair(
        s.strip_prefix('(')
            .and_then(|b| b.strip_suffix(')'))
            .ok_or_else(|| MeosError::text_input(op, "missing outer group parentheses"))?,
    )
    .ok_or_else(|| MeosError::text_input(op, "expected coordinates and a timestamp"))?;
    let coord_inner = coord_part
        .trim()
        .strip_prefix('(')
        .and_then(|b| b.strip_suffix(')'))
        .unwrap_or(coord_part.trim());
    let coords = if coord_inner.trim().is_empty() { Vec::new() } else { parse_floats(op, coord_inner)? };
    if !coords.is_empty() && has_z && coords.len() != 3 {
        return Err(MeosError::text_input(op, "expected 3 coordinates for a Z box"));
    }
    if !coords.is_empty() && !has_z && coords.len() != 2 {
        return Err(MeosError::text_input(op, "expected 2 coordinates"));
    }
    let t = crate::time::timestamp_parse(op, ts_part.trim())?;
    Ok((coords, Some(t)))
}

fn parse_floats(op: &'static str, s: &str) -> MeosResult<Vec<f64>> {
    s.split(',')
        .map(|tok| tok.trim().parse::<f64>().map_err(|e| MeosError::text_input(op, e.to_string())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_geodetic_zt_form() {
        let box_ = STBox::parse("SRID=4326;GEODSTBOX ZT( ((1,2,3), 2001-01-01), ((4,5,6), 2001-01-02) )").unwrap();
        assert_eq!(box_.srid, 4326);
        assert!(box_.geodetic);
        assert!(box_.has_x() && box_.has_z() && box_.has_t());
        assert_eq!(box_.xmin(), Some(1.0));
        assert_eq!(box_.xmax(), Some(4.0));
    }

    #[test]
    fn parses_explicit_x_marker_form() {
        let box_ = STBox::parse("STBOX X((1,2),(3,4))").unwrap();
        assert_eq!(box_.srid, 0);
        assert!(!box_.geodetic);
        assert!(box_.has_x() && !box_.has_z() && !box_.has_t());
        assert_eq!(box_.xmin(), Some(1.0));
        assert_eq!(box_.ymax(), Some(4.0));
    }

    #[test]
    fn intersect_fails_closed_on_mismatched_geodetic() {
        let a = STBox::new(0, false, Some(((0.0, 1.0), (0.0, 1.0))), None, None).unwrap();
        let b = STBox::new(4326, true, Some(((0.0, 1.0), (0.0, 1.0))), None, None).unwrap();
        assert!(a.intersect(&b).is_none());
    }
}
