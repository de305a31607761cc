use thiserror::Error;

use crate::Id;

/// Enumerates high-level errors returned by this library.
#[derive(Debug, Error)]
pub enum BookingError {
    /// Represents an SQL error.
    #[error("SQLx error")]
    Sqlx { source: sqlx::Error },

    /// Represents a required environment variable that is not set.
    #[error("Must define {0} environment variable")]
    MissingVariable(String),

    /// Represents an environment variable whose value cannot be used.
    #[error("Invalid value {value:?} for environment variable {name}")]
    InvalidVariable { name: String, value: String },

    /// Represents a form body that could not be decoded.
    #[error("Malformed form submission")]
    MalformedFormSubmission,

    /// Represents a required form field that was not submitted.
    #[error("Missing field {0}")]
    MissingField(&'static str),

    /// Represents a form field whose value is not acceptable.
    #[error("Invalid value {value:?} for field {field}")]
    InvalidField { field: &'static str, value: String },

    /// Represents a show start time that matches no accepted format.
    #[error("Invalid start time {0:?}")]
    InvalidStartTime(String),

    /// Represents a venue ID that does not exist.
    #[error("Venue {0} does not exist")]
    NonExistentVenue(Id),

    /// Represents an artist ID that does not exist.
    #[error("Artist {0} does not exist")]
    NonExistentArtist(Id),

    /// Represents a show that refers to an artist that does not exist.
    #[error("Unknown artist {0}")]
    UnknownArtist(Id),

    /// Represents a show that refers to a venue that does not exist.
    #[error("Unknown venue {0}")]
    UnknownVenue(Id),

    /// Represents a failure to build a URL from the configured base.
    #[error("Unable to build URL for {path}")]
    UnableToBuildUrl {
        path: String,
        source: url::ParseError,
    },

    /// Represents a URL that cannot be used as a redirect target.
    #[error("Unable to use {url} as a location")]
    InvalidLocation {
        url: String,
        source: warp::http::uri::InvalidUri,
    },
}

impl BookingError {
    /// Whether the error was caused by what the client submitted rather
    /// than by the service.
    pub fn is_client_error(&self) -> bool {
        use BookingError::*;

        matches!(
            self,
            MalformedFormSubmission
                | MissingField(..)
                | InvalidField { .. }
                | InvalidStartTime(..)
                | NonExistentVenue(..)
                | NonExistentArtist(..)
                | UnknownArtist(..)
                | UnknownVenue(..)
        )
    }
}
