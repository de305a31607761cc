use std::time::{Duration, Instant};

use bytes::Bytes;
use log::debug;
use url::Url;
use warp::{
    http::{StatusCode, Uri},
    reject,
    reply::{json, with_header, with_status, Reply},
};

use crate::artist::{ArtistDetail, ArtistFields};
use crate::environment::Environment;
use crate::errors::BookingError;
use crate::form::{FormFields, FormPage, ShowForm};
use crate::listing::SearchResults;
use crate::routes::{
    rejection::{Context, Rejection},
    response::SuccessResponse,
};
use crate::venue::{group_by_area, VenueDetail, VenueFields};
use crate::Id;

const SERVER_TIMING_HEADER: &str = "server-timing";
type RouteResult = Result<Box<dyn Reply>, reject::Rejection>;

macro_rules! timed {
    ($($body:tt)+) => {{
        let start = Instant::now();

        // TODO when `try` blocks are stabilized, we can wrap the body
        // and return the headers even on errors
        let result = { $($body)+ };

        Ok(Box::new(with_header(
            result,
            SERVER_TIMING_HEADER,
            format_server_timing(start.elapsed()),
        )) as Box<dyn Reply>)
    }};
}

pub async fn index(environment: Environment) -> RouteResult {
    timed! {
        debug!(environment.logger, "Rendering home page...");

        json(&SuccessResponse::Home { message: None })
    }
}

pub async fn venues(environment: Environment) -> RouteResult {
    timed! {
        let listings = environment
            .db
            .venue_listings(environment.now())
            .await
            .map_err(|e: BookingError| Rejection::new(Context::venues(), e))?;

        json(&SuccessResponse::Areas {
            areas: group_by_area(listings),
        })
    }
}

pub async fn search_venues(environment: Environment, body: Bytes) -> RouteResult {
    timed! {
        let fields = parse_form(&body)
            .map_err(|e| Rejection::new(Context::search_venues(String::new()), e))?;
        let search_term = fields.search_term();

        debug!(environment.logger, "Searching venues..."; "search_term" => &search_term);

        let data = environment
            .db
            .search_venues(search_term.clone(), environment.now())
            .await
            .map_err(|e| Rejection::new(Context::search_venues(search_term.clone()), e))?;

        json(&SearchResults::new(search_term, data))
    }
}

pub async fn venue(environment: Environment, venue_id: Id) -> RouteResult {
    timed! {
        let error_handler = |e: BookingError| Rejection::new(Context::venue(venue_id), e);

        debug!(environment.logger, "Retrieving venue..."; "venue_id" => venue_id);
        let venue = environment
            .db
            .retrieve_venue(venue_id)
            .await
            .map_err(error_handler)?
            .ok_or(BookingError::NonExistentVenue(venue_id))
            .map_err(error_handler)?;

        debug!(environment.logger, "Retrieving shows at venue..."; "venue_id" => venue_id);
        let shows = environment
            .db
            .venue_shows(venue_id)
            .await
            .map_err(error_handler)?;

        json(&VenueDetail::new(venue, shows, environment.now()))
    }
}

pub async fn venue_form(_environment: Environment) -> RouteResult {
    timed! {
        json(&FormPage::blank(VenueFields::default()))
    }
}

pub async fn create_venue(environment: Environment, body: Bytes) -> RouteResult {
    timed! {
        let fields = parse_form(&body)
            .map_err(|e| Rejection::new(Context::create_venue(None), e))?;
        let error_handler = |e: BookingError| Rejection::new(Context::create_venue(fields.get("name")), e);

        let venue = fields.venue().map_err(error_handler)?;
        let name = venue.name.clone();

        debug!(environment.logger, "Inserting venue..."; "name" => &name);
        let id = environment
            .db
            .insert_venue(venue)
            .await
            .map_err(error_handler)?;
        let url = environment.urls.venue(id).map_err(error_handler)?;

        created(
            id,
            format!("Venue {} was successfully listed!", name),
            &url,
        )
    }
}

pub async fn delete_venue(environment: Environment, venue_id: Id) -> RouteResult {
    timed! {
        debug!(environment.logger, "Deleting venue..."; "venue_id" => venue_id);

        environment
            .db
            .delete_venue(venue_id)
            .await
            .map_err(|e| Rejection::new(Context::delete_venue(venue_id), e))?;

        json(&SuccessResponse::Deleted {
            id: venue_id,
            message: format!("Venue ID: {} was successfully deleted!", venue_id),
        })
    }
}

pub async fn edit_venue_form(environment: Environment, venue_id: Id) -> RouteResult {
    timed! {
        let error_handler = |e: BookingError| Rejection::new(Context::edit_venue_form(venue_id), e);

        let venue = environment
            .db
            .retrieve_venue(venue_id)
            .await
            .map_err(error_handler)?
            .ok_or(BookingError::NonExistentVenue(venue_id))
            .map_err(error_handler)?;

        json(&FormPage::prefilled(venue.id, venue.fields))
    }
}

pub async fn edit_venue(environment: Environment, venue_id: Id, body: Bytes) -> RouteResult {
    timed! {
        let error_handler = |e: BookingError| Rejection::new(Context::edit_venue(venue_id), e);

        let venue = parse_form(&body)
            .and_then(|fields| fields.venue())
            .map_err(error_handler)?;

        debug!(environment.logger, "Updating venue..."; "venue_id" => venue_id);
        environment
            .db
            .update_venue(venue_id, venue)
            .await
            .map_err(error_handler)?;

        let url = environment.urls.venue(venue_id).map_err(error_handler)?;
        warp::redirect::see_other(location(&url).map_err(error_handler)?)
    }
}

pub async fn artists(environment: Environment) -> RouteResult {
    timed! {
        let artists = environment
            .db
            .artist_listings()
            .await
            .map_err(|e: BookingError| Rejection::new(Context::artists(), e))?;

        json(&SuccessResponse::Artists { artists })
    }
}

pub async fn search_artists(environment: Environment, body: Bytes) -> RouteResult {
    timed! {
        let fields = parse_form(&body)
            .map_err(|e| Rejection::new(Context::search_artists(String::new()), e))?;
        let search_term = fields.search_term();

        debug!(environment.logger, "Searching artists..."; "search_term" => &search_term);

        let data = environment
            .db
            .search_artists(search_term.clone(), environment.now())
            .await
            .map_err(|e| Rejection::new(Context::search_artists(search_term.clone()), e))?;

        json(&SearchResults::new(search_term, data))
    }
}

pub async fn artist(environment: Environment, artist_id: Id) -> RouteResult {
    timed! {
        let error_handler = |e: BookingError| Rejection::new(Context::artist(artist_id), e);

        debug!(environment.logger, "Retrieving artist..."; "artist_id" => artist_id);
        let artist = environment
            .db
            .retrieve_artist(artist_id)
            .await
            .map_err(error_handler)?
            .ok_or(BookingError::NonExistentArtist(artist_id))
            .map_err(error_handler)?;

        debug!(environment.logger, "Retrieving shows by artist..."; "artist_id" => artist_id);
        let shows = environment
            .db
            .artist_shows(artist_id)
            .await
            .map_err(error_handler)?;

        json(&ArtistDetail::new(artist, shows, environment.now()))
    }
}

pub async fn artist_form(_environment: Environment) -> RouteResult {
    timed! {
        json(&FormPage::blank(ArtistFields::default()))
    }
}

pub async fn create_artist(environment: Environment, body: Bytes) -> RouteResult {
    timed! {
        let fields = parse_form(&body)
            .map_err(|e| Rejection::new(Context::create_artist(None), e))?;
        let error_handler = |e: BookingError| Rejection::new(Context::create_artist(fields.get("name")), e);

        let artist = fields.artist().map_err(error_handler)?;
        let name = artist.name.clone();

        debug!(environment.logger, "Inserting artist..."; "name" => &name);
        let id = environment
            .db
            .insert_artist(artist)
            .await
            .map_err(error_handler)?;
        let url = environment.urls.artist(id).map_err(error_handler)?;

        created(
            id,
            format!("Artist: {} was successfully created.", name),
            &url,
        )
    }
}

pub async fn edit_artist_form(environment: Environment, artist_id: Id) -> RouteResult {
    timed! {
        let error_handler = |e: BookingError| Rejection::new(Context::edit_artist_form(artist_id), e);

        let artist = environment
            .db
            .retrieve_artist(artist_id)
            .await
            .map_err(error_handler)?
            .ok_or(BookingError::NonExistentArtist(artist_id))
            .map_err(error_handler)?;

        json(&FormPage::prefilled(artist.id, artist.fields))
    }
}

pub async fn edit_artist(environment: Environment, artist_id: Id, body: Bytes) -> RouteResult {
    timed! {
        let error_handler = |e: BookingError| Rejection::new(Context::edit_artist(artist_id), e);

        let artist = parse_form(&body)
            .and_then(|fields| fields.artist())
            .map_err(error_handler)?;

        debug!(environment.logger, "Updating artist..."; "artist_id" => artist_id);
        environment
            .db
            .update_artist(artist_id, artist)
            .await
            .map_err(error_handler)?;

        let url = environment.urls.artist(artist_id).map_err(error_handler)?;
        warp::redirect::see_other(location(&url).map_err(error_handler)?)
    }
}

pub async fn shows(environment: Environment) -> RouteResult {
    timed! {
        let shows = environment
            .db
            .show_listings()
            .await
            .map_err(|e: BookingError| Rejection::new(Context::shows(), e))?;

        json(&SuccessResponse::Shows { shows })
    }
}

pub async fn show_form(environment: Environment) -> RouteResult {
    timed! {
        json(&ShowForm::starting_at(environment.now()))
    }
}

pub async fn create_show(environment: Environment, body: Bytes) -> RouteResult {
    timed! {
        let error_handler = |e: BookingError| Rejection::new(Context::create_show(), e);

        let show = parse_form(&body)
            .and_then(|fields| fields.show())
            .map_err(error_handler)?;

        debug!(
            environment.logger,
            "Inserting show...";
            "artist_id" => show.artist_id,
            "venue_id" => show.venue_id
        );
        let id = environment
            .db
            .insert_show(show)
            .await
            .map_err(error_handler)?;
        let url = environment.urls.shows().map_err(error_handler)?;

        created(id, "Show was successfully listed!".to_owned(), &url)
    }
}

fn parse_form(body: &Bytes) -> Result<FormFields, BookingError> {
    std::str::from_utf8(body).map_err(|_| BookingError::MalformedFormSubmission)?;

    Ok(FormFields::parse(body))
}

fn created(id: Id, message: String, url: &Url) -> impl Reply {
    with_header(
        with_status(
            json(&SuccessResponse::Created { id, message }),
            StatusCode::CREATED,
        ),
        "location",
        url.as_str(),
    )
}

fn location(url: &Url) -> Result<Uri, BookingError> {
    url.as_str()
        .parse::<Uri>()
        .map_err(|source| BookingError::InvalidLocation {
            url: url.to_string(),
            source,
        })
}

fn format_server_timing(seconds: Duration) -> String {
    format!("handler;dur={}", seconds.as_secs_f64() * 1000.0)
}
