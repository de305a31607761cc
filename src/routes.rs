use std::convert::Infallible;
use std::sync::Arc;

use log::{error, Logger};
use serde::Serialize;
use warp::http::StatusCode;
use warp::reject;
use warp::reply::{json, with_status, Reply};
use warp::Filter;

use crate::environment::Environment;
use crate::errors::BookingError;

pub mod admin;
mod handlers;
mod rejection;
mod response;

pub use internal::*;

/// The largest form submission accepted.
const MAX_CONTENT_LENGTH: u64 = 64 * 1024;

#[derive(Debug, Serialize)]
struct Failure {
    message: &'static str,
}

/// Builds every public route, with failures turned into JSON bodies.
pub fn make_routes(
    environment: Environment,
) -> impl Filter<Extract = (Box<dyn Reply>,), Error = Infallible> + Clone {
    let logger = environment.logger.clone();

    make_index_route(environment.clone())
        .or(make_venues_route(environment.clone()))
        .unify()
        .or(make_venue_search_route(environment.clone()))
        .unify()
        .or(make_venue_form_route(environment.clone()))
        .unify()
        .or(make_venue_creation_route(environment.clone()))
        .unify()
        .or(make_venue_collection_creation_route(environment.clone()))
        .unify()
        .or(make_venue_route(environment.clone()))
        .unify()
        .or(make_venue_deletion_route(environment.clone()))
        .unify()
        .or(make_venue_edit_form_route(environment.clone()))
        .unify()
        .or(make_venue_edit_route(environment.clone()))
        .unify()
        .or(make_artists_route(environment.clone()))
        .unify()
        .or(make_artist_search_route(environment.clone()))
        .unify()
        .or(make_artist_form_route(environment.clone()))
        .unify()
        .or(make_artist_creation_route(environment.clone()))
        .unify()
        .or(make_artist_collection_creation_route(environment.clone()))
        .unify()
        .or(make_artist_route(environment.clone()))
        .unify()
        .or(make_artist_edit_form_route(environment.clone()))
        .unify()
        .or(make_artist_edit_route(environment.clone()))
        .unify()
        .or(make_shows_route(environment.clone()))
        .unify()
        .or(make_show_form_route(environment.clone()))
        .unify()
        .or(make_show_creation_route(environment.clone()))
        .unify()
        .or(make_show_collection_creation_route(environment))
        .unify()
        .recover(move |r| format_rejection(logger.clone(), r))
        .unify()
}

pub async fn format_rejection(
    logger: Arc<Logger>,
    rej: reject::Rejection,
) -> Result<Box<dyn Reply>, Infallible> {
    if let Some(r) = rej.find::<rejection::Rejection>() {
        let e = &r.error;
        let status = status_code_for(e);

        if e.is_client_error() {
            log::info!(logger, "Request refused"; "context" => ?r.context, "error" => ?r.error, "status" => %status, "message" => %r.error);
        } else {
            error!(logger, "Booking error"; "context" => ?r.context, "error" => ?r.error, "status" => %status, "message" => %r.error);
        }

        return Ok(Box::new(with_status(json(&r.flatten()), status)));
    }

    let (status, message) = if rej.is_not_found() {
        (StatusCode::NOT_FOUND, "Not found")
    } else if rej.find::<reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
    } else if rej.find::<reject::PayloadTooLarge>().is_some() {
        (StatusCode::PAYLOAD_TOO_LARGE, "Submission too large")
    } else if rej.find::<reject::LengthRequired>().is_some() {
        (StatusCode::LENGTH_REQUIRED, "Length required")
    } else {
        error!(logger, "Unhandled rejection"; "rejection" => ?rej);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    };

    Ok(Box::new(with_status(json(&Failure { message }), status)))
}

fn status_code_for(e: &BookingError) -> StatusCode {
    use BookingError::*;

    match e {
        MalformedFormSubmission | MissingField(..) | InvalidField { .. } | InvalidStartTime(..) => {
            StatusCode::BAD_REQUEST
        }
        NonExistentVenue(..) | NonExistentArtist(..) => StatusCode::NOT_FOUND,
        UnknownArtist(..) | UnknownVenue(..) => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

mod internal {
    use bytes::Bytes;
    use warp::filters::BoxedFilter;
    use warp::path::end;
    use warp::Filter;
    use warp::Reply;
    use warp::{delete, get as g, path as p, path::param as par, post};

    use super::{handlers, MAX_CONTENT_LENGTH};
    use crate::environment::Environment;
    use crate::Id;

    type Route = BoxedFilter<(Box<dyn Reply>,)>;

    fn form_body() -> impl Filter<Extract = (Bytes,), Error = warp::Rejection> + Clone {
        warp::body::content_length_limit(MAX_CONTENT_LENGTH).and(warp::body::bytes())
    }

    macro_rules! route_filter {
    ($route_variable:ident; $first:expr) => (let $route_variable = $route_variable.and($first););
    ($route_variable:ident; $first:expr, $($rest:expr),+) => (
        let $route_variable = $route_variable.and($first);
        route_filter!($route_variable; $($rest),+);
    )
}

    macro_rules! route {
    ($name:ident => $handler:ident, $route_variable:ident; $($filters:expr),+) => (
        pub fn $name(environment: Environment) -> Route {
            let $route_variable = warp::any()
                .map(move || environment.clone());

            route_filter!($route_variable; $($filters),+);

            $route_variable.and_then(handlers::$handler)
                .boxed()
        }
    );
}

    route!(make_index_route => index, rt; end(), g());

    route!(make_venues_route => venues, rt; p("venues"), end(), g());
    route!(make_venue_search_route => search_venues, rt; p("venues"), p("search"), end(), post(), form_body());
    route!(make_venue_form_route => venue_form, rt; p("venues"), p("create"), end(), g());
    route!(make_venue_creation_route => create_venue, rt; p("venues"), p("create"), end(), post(), form_body());
    route!(make_venue_collection_creation_route => create_venue, rt; p("venues"), end(), post(), form_body());
    route!(make_venue_route => venue, rt; p("venues"), par::<Id>(), end(), g());
    route!(make_venue_deletion_route => delete_venue, rt; p("venues"), par::<Id>(), end(), delete());
    route!(make_venue_edit_form_route => edit_venue_form, rt; p("venues"), par::<Id>(), p("edit"), end(), g());
    route!(make_venue_edit_route => edit_venue, rt; p("venues"), par::<Id>(), p("edit"), end(), post(), form_body());

    route!(make_artists_route => artists, rt; p("artists"), end(), g());
    route!(make_artist_search_route => search_artists, rt; p("artists"), p("search"), end(), post(), form_body());
    route!(make_artist_form_route => artist_form, rt; p("artists"), p("create"), end(), g());
    route!(make_artist_creation_route => create_artist, rt; p("artists"), p("create"), end(), post(), form_body());
    route!(make_artist_collection_creation_route => create_artist, rt; p("artists"), end(), post(), form_body());
    route!(make_artist_route => artist, rt; p("artists"), par::<Id>(), end(), g());
    route!(make_artist_edit_form_route => edit_artist_form, rt; p("artists"), par::<Id>(), p("edit"), end(), g());
    route!(make_artist_edit_route => edit_artist, rt; p("artists"), par::<Id>(), p("edit"), end(), post(), form_body());

    route!(make_shows_route => shows, rt; p("shows"), end(), g());
    route!(make_show_form_route => show_form, rt; p("shows"), p("create"), end(), g());
    route!(make_show_creation_route => create_show, rt; p("shows"), p("create"), end(), post(), form_body());
    route!(make_show_collection_creation_route => create_show, rt; p("shows"), end(), post(), form_body());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_mistakes_are_not_server_errors() {
        assert_eq!(
            status_code_for(&BookingError::MissingField("name")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_code_for(&BookingError::NonExistentArtist(3)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_code_for(&BookingError::UnknownVenue(3)),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_code_for(&BookingError::Sqlx {
                source: sqlx::Error::RowNotFound
            }),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
