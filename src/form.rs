//! Decoding and validation of URL-encoded form submissions.

use serde::Serialize;
use time::OffsetDateTime;
use url::{form_urlencoded, Url};

use crate::artist::ArtistFields;
use crate::choices::{self, GENRES, STATES};
use crate::errors::BookingError;
use crate::normalization::{normalize_optional, normalize_text};
use crate::show::NewShow;
use crate::times::{self, parse_start_time};
use crate::venue::VenueFields;
use crate::Id;

const CHECKED_VALUES: &[&str] = &["y", "on", "true", "1"];

/// Column widths, in characters.
const SHORT_FIELD: usize = 120;
const LONG_FIELD: usize = 500;

/// The decoded key/value pairs of a submission, in order. Repeated keys
/// are kept.
#[derive(Clone, Debug, Default)]
pub struct FormFields(Vec<(String, String)>);

impl FormFields {
    pub fn parse(body: &[u8]) -> Self {
        FormFields(form_urlencoded::parse(body).into_owned().collect())
    }

    /// Returns the first value submitted for `name`, normalized, or
    /// `None` if it is missing or blank.
    pub fn get(&self, name: &str) -> Option<String> {
        let value = self
            .0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str());

        normalize_optional(value)
    }

    /// Like [`FormFields::get`], but a missing value is an error.
    pub fn require(&self, name: &'static str) -> Result<String, BookingError> {
        self.get(name).ok_or(BookingError::MissingField(name))
    }

    /// Returns every non-blank value submitted for `name`. `name[]` is
    /// accepted as well.
    pub fn get_all(&self, name: &str) -> Vec<String> {
        let bracketed = format!("{}[]", name);

        self.0
            .iter()
            .filter(|(key, _)| key == name || *key == bracketed)
            .map(|(_, value)| normalize_text(value))
            .filter(|value| !value.is_empty())
            .collect()
    }

    /// Interprets a checkbox. Unchecked boxes are not submitted at all.
    pub fn flag(&self, name: &str) -> bool {
        self.get(name)
            .map(|value| CHECKED_VALUES.iter().any(|c| value.eq_ignore_ascii_case(c)))
            .unwrap_or(false)
    }

    /// Returns the search term, which may be empty.
    pub fn search_term(&self) -> String {
        self.get("search_term").unwrap_or_default()
    }

    /// Validates a venue submission.
    pub fn venue(&self) -> Result<VenueFields, BookingError> {
        Ok(VenueFields {
            name: self.require("name")?,
            city: self.require_within("city", SHORT_FIELD)?,
            state: self.state()?,
            address: self.require_within("address", SHORT_FIELD)?,
            phone: self.get_within("phone", SHORT_FIELD)?,
            genres: self.genres()?,
            website: self.link("website", LONG_FIELD)?,
            facebook_link: self.link("facebook_link", SHORT_FIELD)?,
            image_link: self.link("image_link", LONG_FIELD)?,
            seeking_talent: self.flag("seeking_talent"),
            seeking_description: self.get_within("seeking_description", LONG_FIELD)?,
        })
    }

    /// Validates an artist submission.
    pub fn artist(&self) -> Result<ArtistFields, BookingError> {
        Ok(ArtistFields {
            name: self.require("name")?,
            city: self.require_within("city", SHORT_FIELD)?,
            state: self.state()?,
            phone: self.get_within("phone", SHORT_FIELD)?,
            genres: self.genres()?,
            website: self.link("website", LONG_FIELD)?,
            facebook_link: self.link("facebook_link", SHORT_FIELD)?,
            image_link: self.link("image_link", LONG_FIELD)?,
            seeking_venue: self.flag("seeking_venue"),
            seeking_description: self.get_within("seeking_description", LONG_FIELD)?,
        })
    }

    /// Validates a show submission.
    pub fn show(&self) -> Result<NewShow, BookingError> {
        let start_time = self.require("start_time")?;

        Ok(NewShow {
            artist_id: self.id("artist_id")?,
            venue_id: self.id("venue_id")?,
            start_time: parse_start_time(&start_time)?,
        })
    }

    fn id(&self, name: &'static str) -> Result<Id, BookingError> {
        let value = self.require(name)?;

        value
            .parse()
            .map_err(|_| BookingError::InvalidField { field: name, value })
    }

    fn state(&self) -> Result<String, BookingError> {
        let value = self.require("state")?;

        choices::find_state(&value)
            .map(str::to_owned)
            .ok_or(BookingError::InvalidField {
                field: "state",
                value,
            })
    }

    fn genres(&self) -> Result<Vec<String>, BookingError> {
        let submitted = self.get_all("genres");

        if submitted.is_empty() {
            return Err(BookingError::MissingField("genres"));
        }

        let mut genres: Vec<String> = vec![];

        for value in submitted {
            let genre = choices::find_genre(&value).ok_or(BookingError::InvalidField {
                field: "genres",
                value: value.clone(),
            })?;

            if !genres.iter().any(|g| g == genre) {
                genres.push(genre.to_owned());
            }
        }

        Ok(genres)
    }

    fn get_within(
        &self,
        name: &'static str,
        max: usize,
    ) -> Result<Option<String>, BookingError> {
        self.get(name).map(|value| within(name, value, max)).transpose()
    }

    fn require_within(&self, name: &'static str, max: usize) -> Result<String, BookingError> {
        within(name, self.require(name)?, max)
    }

    fn link(&self, name: &'static str, max: usize) -> Result<Option<String>, BookingError> {
        match self.get_within(name, max)? {
            Some(value) => match Url::parse(&value) {
                Ok(url) if url.has_host() => Ok(Some(value)),
                _ => Err(BookingError::InvalidField { field: name, value }),
            },
            None => Ok(None),
        }
    }
}

fn within(field: &'static str, value: String, max: usize) -> Result<String, BookingError> {
    if value.chars().count() > max {
        return Err(BookingError::InvalidField { field, value });
    }

    Ok(value)
}

/// The options offered by the venue and artist forms.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Choices {
    pub states: &'static [&'static str],
    pub genres: &'static [&'static str],
}

impl Default for Choices {
    fn default() -> Self {
        Choices {
            states: STATES,
            genres: GENRES,
        }
    }
}

/// A form ready to be filled in: blank for creation, prefilled for
/// editing.
#[derive(Debug, Serialize)]
pub struct FormPage<T> {
    pub id: Option<Id>,
    pub form: T,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub choices: Option<Choices>,
}

impl<T> FormPage<T> {
    pub fn blank(form: T) -> Self {
        FormPage {
            id: None,
            form,
            choices: Some(Choices::default()),
        }
    }

    pub fn prefilled(id: Id, form: T) -> Self {
        FormPage {
            id: Some(id),
            form,
            choices: Some(Choices::default()),
        }
    }
}

/// The show form, which starts out at the current time.
#[derive(Debug, Serialize)]
pub struct ShowForm {
    pub artist_id: Option<Id>,
    pub venue_id: Option<Id>,
    pub start_time: String,
}

impl ShowForm {
    pub fn starting_at(now: OffsetDateTime) -> FormPage<ShowForm> {
        FormPage {
            id: None,
            form: ShowForm {
                artist_id: None,
                venue_id: None,
                start_time: times::format_detailed(&now),
            },
            choices: None,
        }
    }
}
