use serde::Serialize;
use time::OffsetDateTime;

use crate::times;
use crate::Id;

/// A show about to be inserted.
#[derive(Clone, Debug, PartialEq)]
pub struct NewShow {
    pub artist_id: Id,
    pub venue_id: Id,
    pub start_time: OffsetDateTime,
}

/// A show as listed on the shows page.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ShowListing {
    pub venue_id: Id,
    pub venue_name: String,
    pub artist_id: Id,
    pub artist_name: String,
    pub artist_image_link: Option<String>,

    #[serde(serialize_with = "times::serialize_listing")]
    pub start_time: OffsetDateTime,
}
