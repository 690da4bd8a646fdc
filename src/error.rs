use std::fmt;

use crate::types::{TEMPERATURE_MAX, TEMPERATURE_MIN};

#[derive(Debug)]
pub enum Error {
    Http(reqwest::Error),
    TemperatureOutOfRange(i32),
    InvalidDuration(u32),
    InvalidMode(String),
    Protocol(String),
    Timeout,
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Http(e) => write!(f, "HTTP error: {e}"),
            Error::TemperatureOutOfRange(t) => write!(
                f,
                "temperature out of range: {t} not in {TEMPERATURE_MIN}..={TEMPERATURE_MAX}"
            ),
            Error::InvalidDuration(m) => write!(f, "invalid timer duration: {m} minutes"),
            Error::InvalidMode(mode) => write!(f, "invalid mode: {mode}"),
            Error::Protocol(msg) => write!(f, "protocol error: {msg}"),
            Error::Timeout => write!(f, "gateway timeout"),
            Error::Io(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Http(e) => Some(e),
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Error::Timeout
        } else {
            Error::Http(e)
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
