use super::Engine;

use async_trait::async_trait;

use crate::{
    api::RouteAPI,
    entities::{Coordinates, Route},
    error::{routing_unavailable_error, Error},
    external::{osrm, Transport},
    retry,
};

#[async_trait]
impl<T: Transport> RouteAPI for Engine<T> {
    #[tracing::instrument(skip(self))]
    async fn find_routes(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<Vec<Route>, Error> {
        let transport = &self.transport;
        let base_url = self.config.osrm_base_url.as_str();

        let routes = retry::run(&self.config.route_retry, "route fetch", move |_| {
            osrm::fetch_routes(transport, base_url, origin, destination)
        })
        .await
        .map_err(|exhausted| {
            tracing::error!(
                "giving up on routes after {} attempts: {:?}",
                exhausted.attempts,
                exhausted.last_error
            );
            routing_unavailable_error(exhausted.attempts)
        })?;

        tracing::info!("found {} routes", routes.len());

        Ok(routes)
    }
}

#[cfg(test)]
fn ok_routes() -> serde_json::Value {
    serde_json::json!({
        "code": "Ok",
        "routes": [{ "geometry": "_p~iF~ps|U", "distance": 2500.0, "duration": 300.0 }]
    })
}

#[test]
fn find_routes_recovers_from_transient_failures() {
    use crate::engine::test_engine;
    use crate::error::upstream_error;
    use serde_json::json;
    use tokio_test::block_on;

    let engine = test_engine(
        vec![
            Err(upstream_error("service responded with status 503 Service Unavailable")),
            Ok(json!({ "code": "Ok" })),
            Ok(ok_routes()),
        ],
        &[],
    );

    let routes = block_on(engine.find_routes(
        Coordinates::new(12.9715987, 77.5945627),
        Coordinates::new(13.0826802, 80.2707184),
    ))
    .unwrap();

    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].distance_km(), 2.5);
    assert_eq!(engine.transport.calls(), 3);
}

#[test]
fn find_routes_gives_up_after_max_attempts() {
    use crate::engine::test_engine;
    use crate::error::upstream_error;
    use tokio_test::block_on;

    let engine = test_engine(
        (0..6).map(|_| Err(upstream_error("down"))).collect(),
        &[("ROUTE_MAX_RETRIES", "4")],
    );
    let here = Coordinates::new(0.0, 0.0);

    let err = block_on(engine.find_routes(here, here)).unwrap_err();

    assert_eq!(err.code, 6);
    assert!(err.message.starts_with("routing unavailable"));
    assert_eq!(engine.transport.calls(), 4);
}

#[test]
fn find_routes_defaults_to_three_attempts() {
    use crate::engine::test_engine;
    use tokio_test::block_on;

    // an empty script fails every call
    let engine = test_engine(vec![], &[]);
    let here = Coordinates::new(0.0, 0.0);

    assert!(block_on(engine.find_routes(here, here)).is_err());
    assert_eq!(engine.transport.calls(), 3);
}

#[test]
fn find_routes_waits_two_seconds_between_attempts() {
    use crate::engine::test_engine;
    use crate::retry::paused_runtime;
    use std::time::Duration;
    use tokio::time::Instant;

    let engine = test_engine(vec![], &[("ROUTE_RETRY_DELAY_MS", "2000")]);
    let here = Coordinates::new(0.0, 0.0);

    let elapsed = paused_runtime().block_on(async {
        let start = Instant::now();
        let err = engine.find_routes(here, here).await.unwrap_err();
        assert_eq!(err.code, 6);
        start.elapsed()
    });

    // two waits between three attempts, nothing after the last
    assert_eq!(elapsed, Duration::from_secs(4));
    assert_eq!(engine.transport.calls(), 3);
}
