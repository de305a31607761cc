use url::Url;

use crate::errors::BookingError;
use crate::Id;

/// Convenience wrapper for URL generation functions.
#[derive(Clone, Debug)]
pub struct Urls {
    /// Top-level URL, including trailing slash.
    base: Url,
}

impl Urls {
    /// Create a new instance. A missing trailing slash on `base` is added.
    pub fn new(base: impl AsRef<str>) -> Result<Self, BookingError> {
        let mut base = base.as_ref().to_owned();

        if !base.ends_with('/') {
            base.push('/');
        }

        let base = Url::parse(&base).map_err(|source| BookingError::UnableToBuildUrl {
            path: base.clone(),
            source,
        })?;

        Ok(Urls { base })
    }

    pub fn venue(&self, id: Id) -> Result<Url, BookingError> {
        self.join(&format!("venues/{}", id))
    }

    pub fn artist(&self, id: Id) -> Result<Url, BookingError> {
        self.join(&format!("artists/{}", id))
    }

    pub fn shows(&self) -> Result<Url, BookingError> {
        self.join("shows")
    }

    fn join(&self, path: &str) -> Result<Url, BookingError> {
        self.base
            .join(path)
            .map_err(|source| BookingError::UnableToBuildUrl {
                path: path.to_owned(),
                source,
            })
    }
}
