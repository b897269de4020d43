use super::Engine;

use async_trait::async_trait;

use crate::{
    api::AirQualityAPI,
    entities::{AirQuality, Coordinates},
    error::{lookup_error, Error},
    external::{waqi, Transport},
};

#[async_trait]
impl<T: Transport> AirQualityAPI for Engine<T> {
    #[tracing::instrument(skip(self))]
    async fn air_quality(&self, location: Coordinates) -> Result<AirQuality, Error> {
        waqi::fetch_air_quality(
            &self.transport,
            &self.config.aqicn_base_url,
            &self.config.aqicn_api_key,
            location,
        )
        .await
        .map_err(|err| lookup_error("air quality", err))
    }
}

#[test]
fn air_quality_is_not_retried() {
    use crate::engine::test_engine;
    use serde_json::json;
    use tokio_test::block_on;

    let engine = test_engine(
        vec![
            Ok(json!({ "status": "ok", "data": { "city": { "name": "Hebbal" } } })),
            Ok(json!({ "status": "ok", "data": { "aqi": 40 } })),
        ],
        &[],
    );

    let err = block_on(engine.air_quality(Coordinates::new(12.97, 77.59))).unwrap_err();

    assert_eq!(err.code, 7);
    assert!(err.message.starts_with("air quality lookup failed"));
    assert_eq!(engine.transport.calls(), 1);
    assert_eq!(
        engine.transport.requests()[0].param("token"),
        Some("aqicn-key")
    );
}
