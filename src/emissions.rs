use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{invalid_input_error, Error};

/// kg of CO2 released per liter of gasoline burned.
pub const CO2_KG_PER_LITER: f64 = 2.31;

/// Vehicle fuel efficiency in km per liter. Always finite and positive.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FuelEfficiency(f64);

impl FuelEfficiency {
    pub fn new(km_per_liter: f64) -> Result<Self, Error> {
        if !km_per_liter.is_finite() || km_per_liter <= 0.0 {
            return Err(invalid_input_error(format!(
                "fuel efficiency must be a positive number of km per liter, got {}",
                km_per_liter
            )));
        }

        Ok(Self(km_per_liter))
    }

    pub fn km_per_liter(&self) -> f64 {
        self.0
    }
}

impl FromStr for FuelEfficiency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .trim()
            .parse::<f64>()
            .map_err(|_| invalid_input_error(format!("not a number: {:?}", s.trim())))?;

        Self::new(value)
    }
}

pub fn estimate_emissions(distance_km: f64, fuel_efficiency: FuelEfficiency) -> f64 {
    let fuel_used = distance_km / fuel_efficiency.km_per_liter();
    fuel_used * CO2_KG_PER_LITER
}

#[test]
fn hundred_km_at_ten_km_per_liter() {
    let emissions = estimate_emissions(100.0, FuelEfficiency::new(10.0).unwrap());
    assert!((emissions - 23.10).abs() < 1e-9);
    assert_eq!(format!("{:.2}", emissions), "23.10");
}

#[test]
fn emissions_scale_with_distance_and_efficiency() {
    let f = FuelEfficiency::new(12.5).unwrap();
    let half = FuelEfficiency::new(6.25).unwrap();

    assert_eq!(estimate_emissions(0.0, f), 0.0);
    assert!((estimate_emissions(80.0, f) - 2.0 * estimate_emissions(40.0, f)).abs() < 1e-9);
    assert!((estimate_emissions(80.0, half) - 2.0 * estimate_emissions(80.0, f)).abs() < 1e-9);
}

#[test]
fn reject_non_positive_fuel_efficiency() {
    for value in [0.0, -4.0, f64::NAN, f64::INFINITY] {
        let err = FuelEfficiency::new(value).unwrap_err();
        assert_eq!(err.code, 101);
    }

    assert!("abc".parse::<FuelEfficiency>().is_err());
    assert!("0".parse::<FuelEfficiency>().is_err());
    assert_eq!(
        " 15.5\n".parse::<FuelEfficiency>().unwrap().km_per_liter(),
        15.5
    );
}
