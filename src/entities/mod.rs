mod air_quality;
mod location;
mod report;
mod route;
mod traffic;

pub use air_quality::AirQuality;
pub use location::Coordinates;
pub use report::{RouteEstimate, TripReport};
pub use route::Route;
pub use traffic::TrafficEstimate;
