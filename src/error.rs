use std::fmt::{self, Debug, Display};
use std::io;

#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    pub code: i32,
    pub message: String,
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        reqwest_error(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        upstream_error(format!("malformed response: {}", err))
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        io_error(err)
    }
}

pub fn invalid_input_error(message: impl Into<String>) -> Error {
    Error {
        code: 101,
        message: format!("invalid input: {}", message.into()),
    }
}

pub fn config_error(message: impl Into<String>) -> Error {
    Error {
        code: 1,
        message: format!("configuration error: {}", message.into()),
    }
}

pub fn reqwest_error(err: reqwest::Error) -> Error {
    Error {
        code: 3,
        message: format!("request error: {}", err.without_url()),
    }
}

pub fn upstream_error(message: impl Into<String>) -> Error {
    Error {
        code: 4,
        message: format!("upstream error: {}", message.into()),
    }
}

pub fn io_error<T: Debug + Display>(err: T) -> Error {
    Error {
        code: 5,
        message: format!("io error: {}", err),
    }
}

pub fn routing_unavailable_error(attempts: u32) -> Error {
    Error {
        code: 6,
        message: format!("routing unavailable: failed to fetch routes after {} attempts", attempts),
    }
}

pub fn lookup_error(lookup: &str, cause: Error) -> Error {
    Error {
        code: 7,
        message: format!("{} lookup failed: {}", lookup, cause),
    }
}

#[test]
fn lookup_error_names_the_lookup() {
    let err = lookup_error("traffic", upstream_error("missing field `routes`"));

    assert_eq!(err.code, 7);
    assert_eq!(
        err.to_string(),
        "traffic lookup failed: upstream error: missing field `routes`"
    );
}
