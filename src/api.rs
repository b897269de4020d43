use async_trait::async_trait;

use crate::entities::{AirQuality, Coordinates, Route, TrafficEstimate};
use crate::error::Error;

#[async_trait]
pub trait RouteAPI {
    /// Candidate routes in the order the routing service ranks them.
    async fn find_routes(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<Vec<Route>, Error>;
}

#[async_trait]
pub trait AirQualityAPI {
    async fn air_quality(&self, location: Coordinates) -> Result<AirQuality, Error>;
}

#[async_trait]
pub trait TrafficAPI {
    async fn traffic(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<TrafficEstimate, Error>;
}

pub trait API: RouteAPI + AirQualityAPI + TrafficAPI {}
