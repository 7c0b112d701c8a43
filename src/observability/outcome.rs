//! Status code to outcome classification.

use axum::http::StatusCode;
use std::fmt;

/// Status code series, keyed by the leading digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Series {
    Informational,
    Successful,
    Redirection,
    ClientError,
    ServerError,
}

impl Series {
    /// Look up the series of a numeric code. Codes outside 100..=599 have none.
    pub fn resolve(code: u16) -> Option<Self> {
        match code / 100 {
            1 => Some(Self::Informational),
            2 => Some(Self::Successful),
            3 => Some(Self::Redirection),
            4 => Some(Self::ClientError),
            5 => Some(Self::ServerError),
            _ => None,
        }
    }
}

/// Coarse classification of a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Informational,
    Success,
    Redirection,
    ClientError,
    ServerError,
    Unknown,
}

impl Outcome {
    pub fn for_status(status: StatusCode) -> Self {
        if status.is_success() {
            return Self::Success;
        }
        Self::for_code(status.as_u16())
    }

    pub fn for_code(code: u16) -> Self {
        match Series::resolve(code) {
            Some(series) => series.into(),
            None => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Informational => "INFORMATIONAL",
            Self::Success => "SUCCESS",
            Self::Redirection => "REDIRECTION",
            Self::ClientError => "CLIENT_ERROR",
            Self::ServerError => "SERVER_ERROR",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl From<Series> for Outcome {
    fn from(series: Series) -> Self {
        match series {
            Series::Informational => Self::Informational,
            Series::Successful => Self::Success,
            Series::Redirection => Self::Redirection,
            Series::ClientError => Self::ClientError,
            Series::ServerError => Self::ServerError,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
