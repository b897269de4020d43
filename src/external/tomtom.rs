//! TomTom Routing API client, used only for its traffic-aware travel time.

use serde::Deserialize;

use crate::{
    entities::{Coordinates, TrafficEstimate},
    error::{upstream_error, Error},
    external::Transport,
};

#[derive(Debug, Deserialize)]
struct Response {
    routes: Vec<RouteData>,
}

#[derive(Debug, Deserialize)]
struct RouteData {
    summary: Summary,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Summary {
    traffic_time_in_seconds: f64,
    #[serde(default)]
    traffic_delay_in_seconds: f64,
}

#[tracing::instrument(skip(transport, key))]
pub async fn fetch_traffic<T: Transport + ?Sized>(
    transport: &T,
    base_url: &str,
    key: &str,
    origin: Coordinates,
    destination: Coordinates,
) -> Result<TrafficEstimate, Error> {
    let url = format!(
        "{}/routing/1/calculateRoute/{}:{}/json",
        base_url.trim_end_matches('/'),
        origin.to_lat_lng(),
        destination.to_lat_lng()
    );

    let value = transport
        .get_json(
            &url,
            &[("key", key.to_string()), ("traffic", "true".to_string())],
        )
        .await?;

    let data: Response = serde_json::from_value(value)?;
    let summary = &data
        .routes
        .first()
        .ok_or_else(|| upstream_error("no routes in traffic response"))?
        .summary;

    Ok(TrafficEstimate {
        travel_time_minutes: summary.traffic_time_in_seconds / 60.0,
        delay_minutes: summary.traffic_delay_in_seconds / 60.0,
    })
}

#[test]
fn fetch_traffic_converts_seconds_to_minutes() {
    use crate::external::testing::ScriptedTransport;
    use serde_json::json;
    use tokio_test::block_on;

    let transport = ScriptedTransport::new(vec![Ok(json!({
        "routes": [
            { "summary": { "lengthInMeters": 346000, "trafficTimeInSeconds": 22500, "trafficDelayInSeconds": 900 } },
            { "summary": { "trafficTimeInSeconds": 1 } }
        ]
    }))]);

    let traffic = block_on(fetch_traffic(
        &transport,
        "https://tomtom.test",
        "secret",
        Coordinates::new(12.9715987, 77.5945627),
        Coordinates::new(13.0826802, 80.2707184),
    ))
    .unwrap();

    assert_eq!(traffic.travel_time_minutes, 375.0);
    assert_eq!(traffic.delay_minutes, 15.0);

    let request = &transport.requests()[0];
    assert_eq!(
        request.url,
        "https://tomtom.test/routing/1/calculateRoute/12.9715987,77.5945627:13.0826802,80.2707184/json"
    );
    assert_eq!(request.param("key"), Some("secret"));
    assert_eq!(request.param("traffic"), Some("true"));
}
