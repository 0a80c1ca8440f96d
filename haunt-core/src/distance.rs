//! Great-circle distance between WGS84 coordinates.
//!
//! Coordinates follow the `geo` convention used across the crate:
//! `x = longitude`, `y = latitude`, both in decimal degrees.

use geo::Coord;

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance in kilometres between `from` and `to`.
///
/// The result is symmetric and zero for identical points.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use haunt_core::distance_km;
///
/// let marina = Coord { x: 55.1400, y: 25.0800 };
/// let downtown = Coord { x: 55.2744, y: 25.1972 };
/// let km = distance_km(marina, downtown);
/// assert!((18.0..19.0).contains(&km));
/// assert_eq!(distance_km(marina, marina), 0.0);
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "the haversine formula is floating-point trigonometry"
)]
pub fn distance_km(from: Coord<f64>, to: Coord<f64>) -> f64 {
    let lat_from = from.y.to_radians();
    let lat_to = to.y.to_radians();
    let half_dlat = (to.y - from.y).to_radians() / 2.0;
    let half_dlon = (to.x - from.x).to_radians() / 2.0;
    let a = half_dlat.sin().powi(2) + lat_from.cos() * lat_to.cos() * half_dlon.sin().powi(2);
    // Rounding can push `a` fractionally outside [0, 1] for antipodal points.
    let c = 2.0 * a.clamp(0.0, 1.0).sqrt().asin();
    EARTH_RADIUS_KM * c
}
