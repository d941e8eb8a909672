use std::path::PathBuf;

use jiff::civil::Date;
use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OutlookError {
    #[error("Not a valid filename input: {0:?}. Missing .csv extension.")]
    InvalidFilename(String),

    #[error("Not a valid date input: {0:?}")]
    InvalidDate(String),

    #[error("Provided start date {start} exceeds the end date {end}.")]
    RangeInverted { start: Date, end: Date },

    #[error("Start date {start} exceeds available data. Earliest available data is {}.", .earliest.strftime("%b %d, %Y"))]
    RangeTooEarly { start: Date, earliest: Date },

    #[error("No data available for dates into the future. You entered: {}", .end.strftime("%b %d, %Y"))]
    RangeInFuture { end: Date },

    #[error("Feed url template {0:?} has no date placeholder")]
    InvalidTemplate(String),

    #[error("Failed to fetch {url}")]
    FetchFailure {
        url: String,
        #[source]
        source: FetchCause,
    },

    #[error("Failed to write {}", .path.display())]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl OutlookError {
    /// Errors raised before any network activity, caused by bad user input.
    pub fn is_validation(&self) -> bool {
        use OutlookError::*;
        matches!(
            self,
            InvalidFilename(_)
                | InvalidDate(_)
                | RangeInverted { .. }
                | RangeTooEarly { .. }
                | RangeInFuture { .. }
        )
    }
}

/// Why a single day's file could not be turned into rows.
#[derive(Error, Debug)]
pub enum FetchCause {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("Download failed with status {0}")]
    Status(StatusCode),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("File has no header row")]
    MissingHeader,

    #[error("Can't parse time of day {value:?}")]
    TimeOfDay {
        value: String,
        #[source]
        source: jiff::Error,
    },
}
