use super::Engine;

use async_trait::async_trait;

use crate::{
    api::TrafficAPI,
    entities::{Coordinates, TrafficEstimate},
    error::{lookup_error, Error},
    external::{tomtom, Transport},
};

#[async_trait]
impl<T: Transport> TrafficAPI for Engine<T> {
    #[tracing::instrument(skip(self))]
    async fn traffic(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<TrafficEstimate, Error> {
        let estimate = tomtom::fetch_traffic(
            &self.transport,
            &self.config.tomtom_base_url,
            &self.config.tomtom_api_key,
            origin,
            destination,
        )
        .await
        .map_err(|err| lookup_error("traffic", err))?;

        tracing::debug!(
            "traffic time {:.1} min, delay {:.1} min",
            estimate.travel_time_minutes,
            estimate.delay_minutes
        );

        Ok(estimate)
    }
}

#[test]
fn traffic_is_not_retried() {
    use crate::engine::test_engine;
    use crate::error::upstream_error;
    use serde_json::json;
    use tokio_test::block_on;

    let here = Coordinates::new(12.97, 77.59);
    let there = Coordinates::new(13.08, 80.27);

    for first in [
        Ok(json!({ "routes": [{ "summary": { "lengthInMeters": 1000 } }] })),
        Ok(json!({ "routes": [] })),
        Err(upstream_error("service responded with status 403 Forbidden")),
    ] {
        let engine = test_engine(
            vec![
                first,
                Ok(json!({ "routes": [{ "summary": { "trafficTimeInSeconds": 60 } }] })),
            ],
            &[],
        );

        let err = block_on(engine.traffic(here, there)).unwrap_err();

        assert_eq!(err.code, 7);
        assert!(err.message.starts_with("traffic lookup failed"));
        assert_eq!(engine.transport.calls(), 1);
    }
}
