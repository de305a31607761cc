use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::schedule::{Schedule, Scheduled};
use crate::times;
use crate::Id;

/// The editable fields of an artist, as submitted through a form.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct ArtistFields {
    pub name: String,
    pub city: String,
    pub state: String,
    pub phone: Option<String>,
    pub genres: Vec<String>,
    pub website: Option<String>,
    pub facebook_link: Option<String>,
    pub image_link: Option<String>,
    pub seeking_venue: bool,
    pub seeking_description: Option<String>,
}

/// A single artist in the database.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Artist {
    pub id: Id,

    #[serde(flatten)]
    pub fields: ArtistFields,
}

impl Artist {
    pub fn new(id: Id, fields: ArtistFields) -> Self {
        Artist { id, fields }
    }
}

/// An artist as listed on the artists page.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ArtistListing {
    pub id: Id,
    pub name: String,
}

/// A show by an artist, described from the artist's side.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VenueAppearance {
    pub venue_id: Id,
    pub venue_name: String,
    pub venue_image_link: Option<String>,

    #[serde(serialize_with = "times::serialize_detailed")]
    pub start_time: OffsetDateTime,
}

impl Scheduled for VenueAppearance {
    fn start_time(&self) -> OffsetDateTime {
        self.start_time
    }
}

/// Everything shown on an artist's page.
#[derive(Debug, Serialize)]
pub struct ArtistDetail {
    #[serde(flatten)]
    pub artist: Artist,

    #[serde(flatten)]
    pub shows: Schedule<VenueAppearance>,
}

impl ArtistDetail {
    pub fn new(artist: Artist, shows: Vec<VenueAppearance>, now: OffsetDateTime) -> Self {
        ArtistDetail {
            artist,
            shows: Schedule::split(shows, now),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use time::Duration;

    use super::*;
    use crate::times::parse_start_time;

    #[test]
    fn detail_page_flattens_artist_and_schedule() {
        let now = parse_start_time("2030-01-01 00:00:00").unwrap();
        let artist = Artist::new(
            4,
            ArtistFields {
                name: "Guns N Petals".to_owned(),
                city: "San Francisco".to_owned(),
                state: "CA".to_owned(),
                genres: vec!["Rock n Roll".to_owned()],
                seeking_venue: true,
                ..Default::default()
            },
        );
        let shows = vec![
            VenueAppearance {
                venue_id: 1,
                venue_name: "The Musical Hop".to_owned(),
                venue_image_link: None,
                start_time: now - Duration::days(1),
            },
            VenueAppearance {
                venue_id: 3,
                venue_name: "Park Square Live Music & Coffee".to_owned(),
                venue_image_link: None,
                start_time: now + Duration::hours(3),
            },
        ];

        let value = serde_json::to_value(ArtistDetail::new(artist, shows, now)).unwrap();

        assert_eq!(value["id"], json!(4));
        assert_eq!(value["name"], json!("Guns N Petals"));
        assert_eq!(value["genres"], json!(["Rock n Roll"]));
        assert_eq!(value["past_shows_count"], json!(1));
        assert_eq!(value["upcoming_shows_count"], json!(1));
        assert_eq!(
            value["upcoming_shows"][0]["start_time"],
            json!("2030-01-01 03:00:00")
        );
        assert_eq!(value["past_shows"][0]["venue_id"], json!(1));
    }
}
