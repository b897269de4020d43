use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{invalid_input_error, Error};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// `"lng,lat"`, the order OSRM expects in its path segments.
    pub fn to_lng_lat(&self) -> String {
        format!("{},{}", self.lng, self.lat)
    }

    /// `"lat,lng"`, the order TomTom expects.
    pub fn to_lat_lng(&self) -> String {
        format!("{},{}", self.lat, self.lng)
    }
}

impl From<Coordinates> for String {
    fn from(coordinates: Coordinates) -> Self {
        coordinates.to_lat_lng()
    }
}

impl FromStr for Coordinates {
    type Err = Error;

    /// Parses `"lat,lng"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lng) = s
            .split_once(',')
            .ok_or_else(|| invalid_input_error(format!("expected \"lat,lng\", got {:?}", s)))?;

        let parse = |part: &str| -> Result<f64, Error> {
            part.trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| invalid_input_error(format!("not a coordinate: {:?}", part)))
        };

        Ok(Self::new(parse(lat)?, parse(lng)?))
    }
}

#[test]
fn coordinates_format_for_each_service() {
    let bengaluru = Coordinates::new(12.9715987, 77.5945627);

    assert_eq!(bengaluru.to_lng_lat(), "77.5945627,12.9715987");
    assert_eq!(bengaluru.to_lat_lng(), "12.9715987,77.5945627");

    let s: String = bengaluru.into();
    assert_eq!(s, "12.9715987,77.5945627");
}

#[test]
fn parse_coordinates() {
    let chennai: Coordinates = " 13.0826802 , 80.2707184 ".parse().unwrap();
    assert_eq!(chennai, Coordinates::new(13.0826802, 80.2707184));

    assert!("13.08".parse::<Coordinates>().is_err());
    assert!("north,80.27".parse::<Coordinates>().is_err());
    assert!("NaN,80.27".parse::<Coordinates>().is_err());
}
