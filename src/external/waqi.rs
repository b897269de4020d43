//! World Air Quality Index (aqicn.org) feed client.
//!
//! A geo feed answers with `{"status": "ok", "data": {...}}` or
//! `{"status": "error", "data": "<reason>"}`. When the nearest station has no
//! current reading, `data.aqi` is the string `"-"`.

use chrono::DateTime;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    entities::{AirQuality, Coordinates},
    error::{upstream_error, Error},
    external::Transport,
};

#[derive(Debug, Deserialize)]
struct Response {
    status: String,
    data: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct Feed {
    aqi: Value,
    city: Option<City>,
    time: Option<Time>,
}

#[derive(Debug, Deserialize)]
struct City {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Time {
    iso: Option<String>,
}

#[tracing::instrument(skip(transport, token))]
pub async fn fetch_air_quality<T: Transport + ?Sized>(
    transport: &T,
    base_url: &str,
    token: &str,
    location: Coordinates,
) -> Result<AirQuality, Error> {
    let url = format!(
        "{}/feed/geo:{};{}/",
        base_url.trim_end_matches('/'),
        location.lat,
        location.lng
    );

    let value = transport.get_json(&url, &[("token", token.to_string())]).await?;
    let data: Response = serde_json::from_value(value)?;

    if data.status != "ok" {
        let reason = data
            .data
            .as_ref()
            .and_then(Value::as_str)
            .unwrap_or("no reason given");
        return Err(upstream_error(format!("status {:?}: {}", data.status, reason)));
    }

    let feed: Feed = serde_json::from_value(data.data.ok_or_else(|| upstream_error("missing data"))?)?;

    let aqi = feed
        .aqi
        .as_u64()
        .and_then(|aqi| u32::try_from(aqi).ok())
        .ok_or_else(|| upstream_error(format!("no AQI reading (got {})", feed.aqi)))?;

    Ok(AirQuality {
        aqi,
        station: feed.city.and_then(|c| c.name),
        observed_at: feed
            .time
            .and_then(|t| t.iso)
            .and_then(|iso| DateTime::parse_from_rfc3339(&iso).ok()),
    })
}

#[test]
fn fetch_air_quality_reads_aqi_station_and_time() {
    use crate::external::testing::ScriptedTransport;
    use serde_json::json;
    use tokio_test::block_on;

    let transport = ScriptedTransport::new(vec![Ok(json!({
        "status": "ok",
        "data": {
            "aqi": 87,
            "city": { "name": "Peenya, Bangalore, India" },
            "time": { "iso": "2024-03-01T09:00:00+05:30" }
        }
    }))]);

    let air_quality = block_on(fetch_air_quality(
        &transport,
        "https://waqi.test",
        "secret",
        Coordinates::new(12.9715987, 77.5945627),
    ))
    .unwrap();

    assert_eq!(air_quality.aqi, 87);
    assert_eq!(air_quality.station.as_deref(), Some("Peenya, Bangalore, India"));
    assert_eq!(
        air_quality.observed_at.unwrap().to_rfc3339(),
        "2024-03-01T09:00:00+05:30"
    );

    let request = &transport.requests()[0];
    assert_eq!(request.url, "https://waqi.test/feed/geo:12.9715987;77.5945627/");
    assert_eq!(request.param("token"), Some("secret"));
}

#[test]
fn fetch_air_quality_fails_without_a_reading() {
    use crate::external::testing::ScriptedTransport;
    use serde_json::json;
    use tokio_test::block_on;

    let here = Coordinates::new(0.0, 0.0);

    for response in [
        json!({ "status": "error", "data": "Invalid key" }),
        json!({ "status": "ok", "data": { "aqi": "-" } }),
        json!({ "status": "ok", "data": { "city": {} } }),
        json!({ "status": "ok" }),
    ] {
        let transport = ScriptedTransport::new(vec![Ok(response)]);
        let err = block_on(fetch_air_quality(&transport, "https://waqi.test", "k", here)).unwrap_err();
        assert_eq!(err.code, 4);
    }
}
