use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::emissions::{estimate_emissions, FuelEfficiency};
use crate::entities::{AirQuality, Route, TrafficEstimate};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RouteEstimate {
    pub route: Route,
    pub emissions_kg: f64,
}

impl RouteEstimate {
    pub fn new(route: Route, fuel_efficiency: FuelEfficiency) -> Self {
        let emissions_kg = estimate_emissions(route.distance_km(), fuel_efficiency);

        Self {
            route,
            emissions_kg,
        }
    }
}

/// Everything one planning run produced.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TripReport {
    pub air_quality: AirQuality,
    pub routes: Vec<RouteEstimate>,
    pub traffic: TrafficEstimate,
    pub map_path: PathBuf,
}

impl TripReport {
    /// Index and estimate of the cleanest route.
    pub fn lowest_emissions(&self) -> Option<(usize, &RouteEstimate)> {
        self.routes
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.emissions_kg.total_cmp(&b.emissions_kg))
    }

    /// Console summary: AQI, the first `max_routes` routes, the cleanest
    /// route, traffic and where the map went.
    pub fn summary(&self, max_routes: usize) -> Vec<String> {
        let mut lines = vec![];

        let mut aqi_line = format!("AQI at origin: {}", self.air_quality.aqi);
        if let Some(station) = &self.air_quality.station {
            aqi_line.push_str(&format!(" ({})", station));
        }
        if let Some(observed_at) = self.air_quality.observed_at {
            aqi_line.push_str(&format!(", observed {}", observed_at.format("%Y-%m-%d %H:%M %:z")));
        }
        lines.push(aqi_line);

        for (idx, estimate) in self.routes.iter().take(max_routes).enumerate() {
            lines.push(format!(
                "Route {}: Distance = {:.2} km, Duration = {:.0} min, Emissions = {:.2} kg CO2",
                idx + 1,
                estimate.route.distance_km(),
                estimate.route.duration_minutes(),
                estimate.emissions_kg
            ));
        }

        if let Some((idx, best)) = self.lowest_emissions() {
            lines.push(format!(
                "Lowest emissions: Route {} ({:.2} kg CO2)",
                idx + 1,
                best.emissions_kg
            ));
        }

        lines.push(format!(
            "Travel time with traffic: {:.0} min ({:.0} min delay)",
            self.traffic.travel_time_minutes, self.traffic.delay_minutes
        ));
        lines.push(format!("Map saved as {}", self.map_path.display()));

        lines
    }
}

#[test]
fn lowest_emissions_route() {
    use geo_types::LineString;

    let efficiency = FuelEfficiency::new(10.0).unwrap();
    let report = TripReport {
        air_quality: AirQuality {
            aqi: 42,
            station: None,
            observed_at: None,
        },
        routes: vec![
            RouteEstimate::new(Route::new(LineString::new(vec![]), 120.0, 0.0).unwrap(), efficiency),
            RouteEstimate::new(Route::new(LineString::new(vec![]), 100.0, 0.0).unwrap(), efficiency),
        ],
        traffic: TrafficEstimate {
            travel_time_minutes: 90.0,
            delay_minutes: 0.0,
        },
        map_path: "routes_map.html".into(),
    };

    let (idx, best) = report.lowest_emissions().unwrap();
    assert_eq!(idx, 1);
    assert_eq!(best.route.distance_km(), 100.0);
    assert!((best.emissions_kg - 23.1).abs() < 1e-9);
}

#[test]
fn summary_lists_the_first_two_routes() {
    use chrono::DateTime;
    use geo_types::LineString;

    let efficiency = FuelEfficiency::new(10.0).unwrap();
    let route = |km: f64, minutes: f64| {
        RouteEstimate::new(Route::new(LineString::new(vec![]), km, minutes).unwrap(), efficiency)
    };

    let report = TripReport {
        air_quality: AirQuality {
            aqi: 87,
            station: Some("Peenya".into()),
            observed_at: DateTime::parse_from_rfc3339("2024-03-01T09:00:00+05:30").ok(),
        },
        routes: vec![route(120.0, 95.0), route(100.0, 110.0), route(90.0, 130.0)],
        traffic: TrafficEstimate {
            travel_time_minutes: 375.0,
            delay_minutes: 15.0,
        },
        map_path: "routes_map.html".into(),
    };

    assert_eq!(
        report.summary(2),
        vec![
            "AQI at origin: 87 (Peenya), observed 2024-03-01 09:00 +05:30",
            "Route 1: Distance = 120.00 km, Duration = 95 min, Emissions = 27.72 kg CO2",
            "Route 2: Distance = 100.00 km, Duration = 110 min, Emissions = 23.10 kg CO2",
            "Lowest emissions: Route 3 (20.79 kg CO2)",
            "Travel time with traffic: 375 min (15 min delay)",
            "Map saved as routes_map.html",
        ]
    );
}
