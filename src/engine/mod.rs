mod air_quality_api;
mod route_api;
mod traffic_api;

use crate::{
    api::{AirQualityAPI, RouteAPI, TrafficAPI, API},
    config::Config,
    emissions::FuelEfficiency,
    entities::{RouteEstimate, TripReport},
    error::Error,
    external::{HttpTransport, Transport},
    map,
};

pub struct Engine<T: Transport = HttpTransport> {
    config: Config,
    transport: T,
}

impl Engine<HttpTransport> {
    #[tracing::instrument(name = "Engine::new", skip_all)]
    pub fn new(config: Config) -> Result<Self, Error> {
        let transport = HttpTransport::new(config.http_timeout)?;

        Ok(Self::with_transport(config, transport))
    }
}

impl<T: Transport> Engine<T> {
    pub fn with_transport(config: Config, transport: T) -> Self {
        Self { config, transport }
    }

    /// One full run between the configured origin and destination: air
    /// quality, candidate routes with their emissions, traffic, and the map.
    /// Steps run in that order and the first failure ends the run.
    #[tracing::instrument(skip(self))]
    pub async fn plan(&self, fuel_efficiency: FuelEfficiency) -> Result<TripReport, Error> {
        let origin = self.config.origin;
        let destination = self.config.destination;

        let air_quality = self.air_quality(origin).await?;
        tracing::info!("AQI at origin: {}", air_quality.aqi);

        let routes = self.find_routes(origin, destination).await?;
        let estimates: Vec<RouteEstimate> = routes
            .iter()
            .cloned()
            .map(|route| RouteEstimate::new(route, fuel_efficiency))
            .collect();

        let traffic = self.traffic(origin, destination).await?;

        let html = map::render(&routes, origin, destination)?;
        map::save(&self.config.map_output, &html).await?;

        Ok(TripReport {
            air_quality,
            routes: estimates,
            traffic,
            map_path: self.config.map_output.clone(),
        })
    }
}

impl<T: Transport> API for Engine<T> {}

#[cfg(test)]
pub(crate) fn test_engine(
    responses: Vec<Result<serde_json::Value, Error>>,
    extra: &[(&'static str, &'static str)],
) -> Engine<crate::external::testing::ScriptedTransport> {
    use crate::external::testing::ScriptedTransport;

    let mut pairs = vec![
        ("AQICN_API_KEY", "aqicn-key"),
        ("TOMTOM_API_KEY", "tomtom-key"),
        ("OSRM_BASE_URL", "http://osrm.test/route/v1/driving"),
        ("AQICN_BASE_URL", "https://waqi.test"),
        ("TOMTOM_BASE_URL", "https://tomtom.test"),
        ("ROUTE_RETRY_DELAY_MS", "0"),
    ];
    pairs.extend_from_slice(extra);

    let config = Config::from_lookup(|key| {
        pairs
            .iter()
            .rev()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.to_string())
    })
    .unwrap();

    Engine::with_transport(config, ScriptedTransport::new(responses))
}

#[test]
fn plan_runs_every_step_in_order() {
    use serde_json::json;
    use tokio_test::block_on;

    let map_output = std::env::temp_dir().join(format!("plan_{}.html", std::process::id()));
    let map_output: &'static str = Box::leak(map_output.to_string_lossy().into_owned().into_boxed_str());

    let engine = test_engine(
        vec![
            Ok(json!({ "status": "ok", "data": { "aqi": 63 } })),
            Ok(json!({
                "code": "Ok",
                "routes": [
                    { "geometry": "_p~iF~ps|U_ulLnnqC", "distance": 100000.0, "duration": 4200.0 },
                    { "geometry": "_p~iF~ps|U", "distance": 120000.0, "duration": 4800.0 }
                ]
            })),
            Ok(json!({ "routes": [{ "summary": { "trafficTimeInSeconds": 5400 } }] })),
        ],
        &[("MAP_OUTPUT", map_output)],
    );

    let report = block_on(engine.plan(FuelEfficiency::new(10.0).unwrap())).unwrap();

    assert_eq!(report.air_quality.aqi, 63);
    assert_eq!(report.routes.len(), 2);
    assert!((report.routes[0].emissions_kg - 23.1).abs() < 1e-9);
    assert!((report.routes[1].emissions_kg - 27.72).abs() < 1e-9);
    assert_eq!(report.traffic.travel_time_minutes, 90.0);
    assert_eq!(report.map_path, std::path::PathBuf::from(map_output));

    let urls: Vec<_> = engine.transport.requests().into_iter().map(|r| r.url).collect();
    assert!(urls[0].starts_with("https://waqi.test/feed/"));
    assert!(urls[1].starts_with("http://osrm.test/route/v1/driving/"));
    assert!(urls[2].starts_with("https://tomtom.test/routing/1/calculateRoute/"));

    let html = std::fs::read_to_string(map_output).unwrap();
    assert!(html.contains(r#""color":"blue""#));
    assert!(html.contains(r#""color":"green""#));
    std::fs::remove_file(map_output).unwrap();
}

#[test]
fn plan_stops_when_routing_is_unavailable() {
    use crate::error::upstream_error;
    use serde_json::json;
    use tokio_test::block_on;

    let engine = test_engine(
        vec![
            Ok(json!({ "status": "ok", "data": { "aqi": 63 } })),
            Err(upstream_error("down")),
            Err(upstream_error("down")),
            Err(upstream_error("down")),
            Ok(json!({ "routes": [{ "summary": { "trafficTimeInSeconds": 5400 } }] })),
        ],
        &[],
    );

    let err = block_on(engine.plan(FuelEfficiency::new(10.0).unwrap())).unwrap_err();

    assert_eq!(err.code, 6);
    // one AQI call, three route attempts, no traffic call
    assert_eq!(engine.transport.calls(), 4);
}
