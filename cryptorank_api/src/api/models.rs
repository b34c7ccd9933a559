use std::fmt::{Display, Formatter};
use std::fmt;

use chrono::{DateTime, Utc};
use chrono::serde::ts_milliseconds;
use serde::Serialize;
use serde_with::{serde_as, DisplayFromStr};

pub const RATE_LIMITED_MESSAGE: &str = "Rate limit exceeded. Please try again later.";
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch cryptocurrency data";

pub enum ResponseStatus {
    Success,
}

impl Display for ResponseStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self {
            ResponseStatus::Success => f.write_str("success"),
        }
    }
}

/// Body of every non-200 response from the snapshot endpoint.
#[derive(Serialize)]
pub struct ErrorResponse {
    error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> ErrorResponse {
        ErrorResponse {
            error: error.into(),
        }
    }
}

//

#[serde_as]
#[derive(Serialize)]
pub struct PingResponse {
    #[serde_as(as = "DisplayFromStr")]
    pub status: ResponseStatus,

    #[serde(with = "ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}
