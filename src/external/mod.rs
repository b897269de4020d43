pub mod osrm;
pub mod tomtom;
mod transport;
pub mod waqi;

pub use transport::{HttpTransport, Transport};

#[cfg(test)]
pub use transport::testing;
