use serde::Serialize;
use warp::reject;

use crate::errors::BookingError;
use crate::Id;

#[derive(Debug)]
pub struct Rejection {
    pub(crate) context: Context,
    pub(crate) error: BookingError,
}

impl Rejection {
    pub fn new(context: Context, error: BookingError) -> Self {
        Rejection { context, error }
    }

    pub fn flatten(&self) -> FlattenedRejection {
        FlattenedRejection {
            context: self.context.clone(),
            message: self.context.message(),
            error: format!("{}", self.error),
        }
    }
}

impl reject::Reject for Rejection {}

#[derive(Debug, Serialize)]
pub struct FlattenedRejection {
    #[serde(flatten)]
    pub(crate) context: Context,
    pub(crate) message: String,
    pub(crate) error: String,
}

/// The operation that failed.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum Context {
    Venues,
    SearchVenues { search_term: String },
    Venue { venue_id: Id },
    EditVenueForm { venue_id: Id },
    CreateVenue { name: Option<String> },
    DeleteVenue { venue_id: Id },
    EditVenue { venue_id: Id },
    Artists,
    SearchArtists { search_term: String },
    Artist { artist_id: Id },
    EditArtistForm { artist_id: Id },
    CreateArtist { name: Option<String> },
    EditArtist { artist_id: Id },
    Shows,
    CreateShow,
}

impl Context {
    pub fn venues() -> Context {
        Context::Venues
    }

    pub fn search_venues(search_term: String) -> Context {
        Context::SearchVenues { search_term }
    }

    pub fn venue(venue_id: Id) -> Context {
        Context::Venue { venue_id }
    }

    pub fn edit_venue_form(venue_id: Id) -> Context {
        Context::EditVenueForm { venue_id }
    }

    pub fn create_venue(name: Option<String>) -> Context {
        Context::CreateVenue { name }
    }

    pub fn delete_venue(venue_id: Id) -> Context {
        Context::DeleteVenue { venue_id }
    }

    pub fn edit_venue(venue_id: Id) -> Context {
        Context::EditVenue { venue_id }
    }

    pub fn artists() -> Context {
        Context::Artists
    }

    pub fn search_artists(search_term: String) -> Context {
        Context::SearchArtists { search_term }
    }

    pub fn artist(artist_id: Id) -> Context {
        Context::Artist { artist_id }
    }

    pub fn edit_artist_form(artist_id: Id) -> Context {
        Context::EditArtistForm { artist_id }
    }

    pub fn create_artist(name: Option<String>) -> Context {
        Context::CreateArtist { name }
    }

    pub fn edit_artist(artist_id: Id) -> Context {
        Context::EditArtist { artist_id }
    }

    pub fn shows() -> Context {
        Context::Shows
    }

    pub fn create_show() -> Context {
        Context::CreateShow
    }

    /// The failure as it would be shown to the user.
    pub fn message(&self) -> String {
        use Context::*;

        match self {
            Venues => "An error occurred. Venues could not be loaded.".to_owned(),
            SearchVenues { search_term } => format!(
                "An error occurred. Venues matching {:?} could not be found.",
                search_term
            ),
            Venue { venue_id } => format!("Venue ID: {} could not be loaded.", venue_id),
            EditVenueForm { venue_id } => {
                format!("Venue ID: {} could not be loaded for editing.", venue_id)
            }
            CreateVenue { name } => format!(
                "An error occurred. Venue {} could not be listed.",
                name.as_deref().unwrap_or_default()
            ),
            DeleteVenue { venue_id } => format!(
                "An error occurred. Venue ID: {} could not be deleted.",
                venue_id
            ),
            EditVenue { venue_id } => format!(
                "An error occurred. Venue ID: {} could not be updated.",
                venue_id
            ),
            Artists => "An error occurred. Artists could not be loaded.".to_owned(),
            SearchArtists { search_term } => format!(
                "An error occurred. Artists matching {:?} could not be found.",
                search_term
            ),
            Artist { artist_id } => format!("Artist ID: {} could not be loaded.", artist_id),
            EditArtistForm { artist_id } => {
                format!("Artist ID: {} could not be loaded for editing.", artist_id)
            }
            CreateArtist { name } => format!(
                "Artist: {} was not created - ERROR",
                name.as_deref().unwrap_or_default()
            ),
            EditArtist { artist_id } => format!(
                "An error occurred. Artist ID: {} could not be updated.",
                artist_id
            ),
            Shows => "An error occurred. Shows could not be loaded.".to_owned(),
            CreateShow => "Show was not created - ERROR".to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn failures_keep_their_context() {
        let rejection = Rejection::new(
            Context::delete_venue(7),
            BookingError::NonExistentVenue(7),
        );

        assert_eq!(
            serde_json::to_value(rejection.flatten()).unwrap(),
            json!({
                "operation": "delete_venue",
                "venue_id": 7,
                "message": "An error occurred. Venue ID: 7 could not be deleted.",
                "error": "Venue 7 does not exist",
            })
        );
    }

    #[test]
    fn nameless_submissions_still_have_messages() {
        assert_eq!(
            Context::create_artist(None).message(),
            "Artist:  was not created - ERROR"
        );
        assert_eq!(
            Context::create_venue(Some("The Musical Hop".to_owned())).message(),
            "An error occurred. Venue The Musical Hop could not be listed."
        );
    }

    #[test]
    fn edit_forms_name_the_record() {
        assert_eq!(
            Context::edit_venue_form(3).message(),
            "Venue ID: 3 could not be loaded for editing."
        );
        assert_eq!(
            Context::edit_artist_form(4).message(),
            "Artist ID: 4 could not be loaded for editing."
        );
    }

    #[test]
    fn rejections_can_be_recovered_from_warp() {
        let rejection: reject::Rejection =
            Rejection::new(Context::artist(9), BookingError::NonExistentArtist(9)).into();

        let found = rejection.find::<Rejection>().unwrap();
        assert!(matches!(found.context, Context::Artist { artist_id: 9 }));
        assert!(matches!(found.error, BookingError::NonExistentArtist(9)));
    }
}
