//! Startup configuration.
//!
//! Everything is read from the process environment once, after `.env` has been
//! loaded. API keys have no fallback: a missing key stops the program before
//! any request is made.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::entities::Coordinates;
use crate::error::{config_error, Error};
use crate::retry::{Backoff, RetryPolicy};

pub const DEFAULT_OSRM_BASE_URL: &str = "http://router.project-osrm.org/route/v1/driving";
pub const DEFAULT_AQICN_BASE_URL: &str = "https://api.waqi.info";
pub const DEFAULT_TOMTOM_BASE_URL: &str = "https://api.tomtom.com";
pub const DEFAULT_MAP_OUTPUT: &str = "routes_map.html";

// Bengaluru to Chennai.
const DEFAULT_ORIGIN: Coordinates = Coordinates {
    lat: 12.9715987,
    lng: 77.5945627,
};
const DEFAULT_DESTINATION: Coordinates = Coordinates {
    lat: 13.0826802,
    lng: 80.2707184,
};

#[derive(Clone, Debug)]
pub struct Config {
    pub aqicn_api_key: String,
    pub tomtom_api_key: String,
    pub osrm_base_url: String,
    pub aqicn_base_url: String,
    pub tomtom_base_url: String,
    pub origin: Coordinates,
    pub destination: Coordinates,
    pub route_retry: RetryPolicy,
    pub http_timeout: Duration,
    pub map_output: PathBuf,
}

impl Config {
    #[tracing::instrument(name = "Config::from_env")]
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let required = |key: &str| get(key).ok_or_else(|| config_error(format!("{} must be set", key)));

        let parsed = |key: &str| -> Result<Option<u64>, Error> {
            get(key)
                .map(|v| {
                    v.parse::<u64>()
                        .map_err(|_| config_error(format!("{} must be a non-negative integer, got {:?}", key, v)))
                })
                .transpose()
        };

        let coordinates = |key: &str, default: Coordinates| -> Result<Coordinates, Error> {
            match get(key) {
                Some(v) => Coordinates::from_str(&v).map_err(|err| config_error(format!("{}: {}", key, err))),
                None => Ok(default),
            }
        };

        let max_attempts = parsed("ROUTE_MAX_RETRIES")?.unwrap_or(3);
        if max_attempts == 0 {
            return Err(config_error("ROUTE_MAX_RETRIES must be at least 1"));
        }

        let backoff = match get("ROUTE_BACKOFF").as_deref() {
            None | Some("fixed") => Backoff::Fixed,
            Some("exponential") => Backoff::Exponential,
            Some(other) => {
                return Err(config_error(format!(
                    "ROUTE_BACKOFF must be \"fixed\" or \"exponential\", got {:?}",
                    other
                )))
            }
        };

        let http_timeout = parsed("HTTP_TIMEOUT_SECS")?.unwrap_or(30);
        if http_timeout == 0 {
            return Err(config_error("HTTP_TIMEOUT_SECS must be at least 1"));
        }

        let route_retry = RetryPolicy {
            max_attempts: u32::try_from(max_attempts)
                .map_err(|_| config_error("ROUTE_MAX_RETRIES is too large"))?,
            delay: Duration::from_millis(parsed("ROUTE_RETRY_DELAY_MS")?.unwrap_or(2000)),
            backoff,
        };

        Ok(Self {
            aqicn_api_key: required("AQICN_API_KEY")?,
            tomtom_api_key: required("TOMTOM_API_KEY")?,
            osrm_base_url: get("OSRM_BASE_URL").unwrap_or_else(|| DEFAULT_OSRM_BASE_URL.into()),
            aqicn_base_url: get("AQICN_BASE_URL").unwrap_or_else(|| DEFAULT_AQICN_BASE_URL.into()),
            tomtom_base_url: get("TOMTOM_BASE_URL").unwrap_or_else(|| DEFAULT_TOMTOM_BASE_URL.into()),
            origin: coordinates("ORIGIN", DEFAULT_ORIGIN)?,
            destination: coordinates("DESTINATION", DEFAULT_DESTINATION)?,
            route_retry,
            http_timeout: Duration::from_secs(http_timeout),
            map_output: get("MAP_OUTPUT")
                .unwrap_or_else(|| DEFAULT_MAP_OUTPUT.into())
                .into(),
        })
    }
}

#[cfg(test)]
fn lookup_from(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
    move |key| {
        pairs
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.to_string())
    }
}

#[test]
fn defaults_with_only_keys_set() {
    let config =
        Config::from_lookup(lookup_from(&[("AQICN_API_KEY", "aq"), ("TOMTOM_API_KEY", "tt")])).unwrap();

    assert_eq!(config.aqicn_api_key, "aq");
    assert_eq!(config.tomtom_api_key, "tt");
    assert_eq!(config.osrm_base_url, DEFAULT_OSRM_BASE_URL);
    assert_eq!(config.origin, DEFAULT_ORIGIN);
    assert_eq!(config.destination, DEFAULT_DESTINATION);
    assert_eq!(config.route_retry, RetryPolicy::default());
    assert_eq!(config.http_timeout, Duration::from_secs(30));
    assert_eq!(config.map_output, PathBuf::from(DEFAULT_MAP_OUTPUT));
}

#[test]
fn missing_api_key_fails_fast() {
    let err = Config::from_lookup(lookup_from(&[("AQICN_API_KEY", "aq")])).unwrap_err();
    assert_eq!(err.code, 1);
    assert!(err.message.contains("TOMTOM_API_KEY"));

    let err = Config::from_lookup(lookup_from(&[("AQICN_API_KEY", "  "), ("TOMTOM_API_KEY", "tt")]))
        .unwrap_err();
    assert!(err.message.contains("AQICN_API_KEY"));
}

#[test]
fn overrides_are_parsed() {
    let config = Config::from_lookup(lookup_from(&[
        ("AQICN_API_KEY", "aq"),
        ("TOMTOM_API_KEY", "tt"),
        ("ORIGIN", "28.6139,77.2090"),
        ("ROUTE_MAX_RETRIES", "5"),
        ("ROUTE_RETRY_DELAY_MS", "250"),
        ("ROUTE_BACKOFF", "exponential"),
        ("MAP_OUTPUT", "out/map.html"),
    ]))
    .unwrap();

    assert_eq!(config.origin, Coordinates::new(28.6139, 77.2090));
    assert_eq!(
        config.route_retry,
        RetryPolicy::exponential(5, Duration::from_millis(250))
    );
    assert_eq!(config.map_output, PathBuf::from("out/map.html"));
}

#[test]
fn invalid_values_are_rejected() {
    let base = [("AQICN_API_KEY", "aq"), ("TOMTOM_API_KEY", "tt")];

    for bad in [
        ("ROUTE_MAX_RETRIES", "0"),
        ("ROUTE_MAX_RETRIES", "three"),
        ("HTTP_TIMEOUT_SECS", "0"),
        ("ROUTE_BACKOFF", "linear"),
        ("DESTINATION", "somewhere"),
    ] {
        let pairs: &'static [(&str, &str)] = Box::leak(vec![base[0], base[1], bad].into_boxed_slice());
        let err = Config::from_lookup(lookup_from(pairs)).unwrap_err();
        assert_eq!(err.code, 1, "{:?}", bad);
    }
}
