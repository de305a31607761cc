use serde::Serialize;

use crate::artist::ArtistListing;
use crate::show::ShowListing;
use crate::venue::Area;
use crate::Id;

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SuccessResponse<'a> {
    Areas {
        areas: Vec<Area>,
    },
    Artists {
        artists: Vec<ArtistListing>,
    },
    Created {
        id: Id,
        message: String,
    },
    Deleted {
        id: Id,
        message: String,
    },
    Healthz {
        revision: Option<&'a str>,
        timestamp: Option<&'a str>,
        version: &'a str,
        database: &'a str,
    },
    Home {
        message: Option<String>,
    },
    Shows {
        shows: Vec<ShowListing>,
    },
}
