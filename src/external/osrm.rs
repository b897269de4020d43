//! OSRM route service client.

use serde::Deserialize;

use crate::{
    entities::{Coordinates, Route},
    error::{upstream_error, Error},
    external::Transport,
};

#[derive(Debug, Deserialize)]
struct Response {
    code: String,
    message: Option<String>,
    routes: Option<Vec<RouteData>>,
}

#[derive(Debug, Deserialize)]
struct RouteData {
    geometry: String,
    /// meters
    distance: f64,
    /// seconds
    #[serde(default)]
    duration: f64,
}

/// One request for the full geometry of the route and its alternatives.
#[tracing::instrument(skip(transport))]
pub async fn fetch_routes<T: Transport + ?Sized>(
    transport: &T,
    base_url: &str,
    origin: Coordinates,
    destination: Coordinates,
) -> Result<Vec<Route>, Error> {
    let url = format!(
        "{}/{};{}",
        base_url.trim_end_matches('/'),
        origin.to_lng_lat(),
        destination.to_lng_lat()
    );

    let value = transport
        .get_json(
            &url,
            &[
                ("overview", "full".to_string()),
                ("alternatives", "true".to_string()),
            ],
        )
        .await?;

    let data: Response = serde_json::from_value(value)?;

    if data.code != "Ok" {
        return Err(upstream_error(format!(
            "routing service returned {}: {}",
            data.code,
            data.message.unwrap_or_default()
        )));
    }

    let routes = data
        .routes
        .filter(|routes| !routes.is_empty())
        .ok_or_else(|| upstream_error("routing service returned no routes"))?;

    routes
        .into_iter()
        .map(|r| Route::from_polyline(&r.geometry, r.distance / 1000.0, r.duration / 60.0))
        .collect()
}

#[test]
fn fetch_routes_decodes_every_alternative_in_order() {
    use crate::external::testing::ScriptedTransport;
    use serde_json::json;
    use tokio_test::block_on;

    let transport = ScriptedTransport::new(vec![Ok(json!({
        "code": "Ok",
        "routes": [
            { "geometry": "_p~iF~ps|U_ulLnnqC_mqNvxq`@", "distance": 345120.0, "duration": 21600.0 },
            { "geometry": "_p~iF~ps|U", "distance": 351900.5, "duration": 22800.0 }
        ]
    }))]);

    let routes = block_on(fetch_routes(
        &transport,
        "http://osrm.test/route/v1/driving/",
        Coordinates::new(12.9715987, 77.5945627),
        Coordinates::new(13.0826802, 80.2707184),
    ))
    .unwrap();

    assert_eq!(routes.len(), 2);
    assert!((routes[0].distance_km() - 345.12).abs() < 1e-9);
    assert!((routes[0].duration_minutes() - 360.0).abs() < 1e-9);
    assert_eq!(routes[0].points().len(), 3);
    assert!((routes[1].distance_km() - 351.9005).abs() < 1e-9);
    assert_eq!(routes[1].points().len(), 1);

    let request = &transport.requests()[0];
    assert_eq!(
        request.url,
        "http://osrm.test/route/v1/driving/77.5945627,12.9715987;80.2707184,13.0826802"
    );
    assert_eq!(request.param("overview"), Some("full"));
    assert_eq!(request.param("alternatives"), Some("true"));
}

#[test]
fn fetch_routes_rejects_error_codes_and_missing_routes() {
    use crate::external::testing::ScriptedTransport;
    use serde_json::json;
    use tokio_test::block_on;

    let transport = ScriptedTransport::new(vec![
        Ok(json!({ "code": "NoRoute", "message": "Impossible route between points" })),
        Ok(json!({ "code": "Ok" })),
        Ok(json!({ "code": "Ok", "routes": [{ "distance": 10.0 }] })),
    ]);
    let here = Coordinates::new(0.0, 0.0);

    for _ in 0..3 {
        let err = block_on(fetch_routes(&transport, "http://osrm.test", here, here)).unwrap_err();
        assert_eq!(err.code, 4);
    }
}
