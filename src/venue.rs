use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::listing::ListingEntry;
use crate::schedule::{Schedule, Scheduled};
use crate::times;
use crate::Id;

/// The editable fields of a venue, as submitted through a form.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct VenueFields {
    pub name: String,
    pub city: String,
    pub state: String,
    pub address: String,
    pub phone: Option<String>,
    pub genres: Vec<String>,
    pub website: Option<String>,
    pub facebook_link: Option<String>,
    pub image_link: Option<String>,
    pub seeking_talent: bool,
    pub seeking_description: Option<String>,
}

/// A single venue in the database.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Venue {
    pub id: Id,

    #[serde(flatten)]
    pub fields: VenueFields,
}

impl Venue {
    pub fn new(id: Id, fields: VenueFields) -> Self {
        Venue { id, fields }
    }
}

/// A venue row as shown in listings and search results.
#[derive(Clone, Debug, PartialEq)]
pub struct VenueListing {
    pub id: Id,
    pub name: String,
    pub city: String,
    pub state: String,
    pub num_upcoming_shows: i64,
}

impl From<VenueListing> for ListingEntry {
    fn from(listing: VenueListing) -> Self {
        ListingEntry {
            id: listing.id,
            name: listing.name,
            num_upcoming_shows: listing.num_upcoming_shows,
        }
    }
}

/// The venues in one city.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Area {
    pub city: String,
    pub state: String,
    pub venues: Vec<ListingEntry>,
}

/// Groups venues by city and state. Areas are ordered by state, then
/// city; venues keep their relative order.
pub fn group_by_area(listings: Vec<VenueListing>) -> Vec<Area> {
    let mut areas: BTreeMap<(String, String), Vec<ListingEntry>> = BTreeMap::new();

    for listing in listings {
        let key = (listing.state.clone(), listing.city.clone());
        areas.entry(key).or_default().push(listing.into());
    }

    areas
        .into_iter()
        .map(|((state, city), venues)| Area {
            city,
            state,
            venues,
        })
        .collect()
}

/// A show at a venue, described from the venue's side.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ArtistAppearance {
    pub artist_id: Id,
    pub artist_name: String,
    pub artist_image_link: Option<String>,

    #[serde(serialize_with = "times::serialize_detailed")]
    pub start_time: OffsetDateTime,
}

impl Scheduled for ArtistAppearance {
    fn start_time(&self) -> OffsetDateTime {
        self.start_time
    }
}

/// Everything shown on a venue's page.
#[derive(Debug, Serialize)]
pub struct VenueDetail {
    #[serde(flatten)]
    pub venue: Venue,

    #[serde(flatten)]
    pub shows: Schedule<ArtistAppearance>,
}

impl VenueDetail {
    pub fn new(venue: Venue, shows: Vec<ArtistAppearance>, now: OffsetDateTime) -> Self {
        VenueDetail {
            venue,
            shows: Schedule::split(shows, now),
        }
    }
}
