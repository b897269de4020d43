use geo_types::LineString;
use serde::{Deserialize, Serialize};

use crate::entities::Coordinates;
use crate::error::{upstream_error, Error};

/// A candidate path between two places, as returned by the routing service.
///
/// Geometry is stored in the `geo-types` convention (`x` = longitude,
/// `y` = latitude); use [`Route::points`] for `(lat, lng)` pairs.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Route {
    geometry: LineString<f64>,
    distance_km: f64,
    duration_minutes: f64,
}

impl Route {
    pub fn new(
        geometry: LineString<f64>,
        distance_km: f64,
        duration_minutes: f64,
    ) -> Result<Self, Error> {
        if !distance_km.is_finite() || distance_km < 0.0 {
            return Err(upstream_error(format!("invalid route distance {}", distance_km)));
        }

        Ok(Route {
            geometry,
            distance_km,
            duration_minutes: duration_minutes.max(0.0),
        })
    }

    /// Decodes a precision-5 encoded polyline.
    pub fn from_polyline(
        encoded: &str,
        distance_km: f64,
        duration_minutes: f64,
    ) -> Result<Self, Error> {
        let geometry = polyline::decode_polyline(encoded, 5)
            .map_err(|err| upstream_error(format!("undecodable polyline: {}", err)))?;

        Self::new(geometry, distance_km, duration_minutes)
    }

    pub fn distance_km(&self) -> f64 {
        self.distance_km
    }

    pub fn duration_minutes(&self) -> f64 {
        self.duration_minutes
    }

    pub fn points(&self) -> Vec<Coordinates> {
        self.geometry
            .coords()
            .map(|c| Coordinates::new(c.y, c.x))
            .collect()
    }

    pub fn start(&self) -> Option<Coordinates> {
        self.geometry.coords().next().map(|c| Coordinates::new(c.y, c.x))
    }
}

#[test]
fn decode_route_polyline() {
    // reference polyline from the encoding format documentation
    let route = Route::from_polyline("_p~iF~ps|U_ulLnnqC_mqNvxq`@", 12.5, 20.0).unwrap();

    let points = route.points();
    assert_eq!(points.len(), 3);
    assert!((points[0].lat - 38.5).abs() < 1e-6);
    assert!((points[0].lng + 120.2).abs() < 1e-6);
    assert!((points[2].lat - 43.252).abs() < 1e-6);
    assert!((points[2].lng + 126.453).abs() < 1e-6);
    assert_eq!(route.start(), Some(points[0]));
    assert_eq!(route.distance_km(), 12.5);
}

#[test]
fn reject_negative_distance() {
    let err = Route::new(LineString::new(vec![]), -1.0, 0.0).unwrap_err();
    assert_eq!(err.code, 4);

    assert!(Route::new(LineString::new(vec![]), 0.0, 0.0).is_ok());
}
