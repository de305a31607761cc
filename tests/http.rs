use std::sync::Arc;

use once_cell::sync::OnceCell;
use serde_json::Value;
use time::{Duration, OffsetDateTime};
use warp::http::StatusCode;
use warp::reply::Reply;
use warp::Filter;

use booking::db::mock::MockDb;
use booking::db::Db;
use booking::environment::Environment;
use booking::routes;
use booking::times::parse_start_time;
use booking::urls::Urls;
use log::o;

static SLOG_SCOPE_GUARD: OnceCell<slog_scope::GlobalLoggerGuard> = OnceCell::new();

const BASE_URL: &str = "https://www.example.com/";

const MUSICAL_HOP: &str = "name=The+Musical+Hop&city=San+Francisco&state=CA\
    &address=1015+Folsom+Street&phone=123-123-1234\
    &genres=Jazz&genres=Reggae&genres=Blues&genres=Classical&genres=Folk\
    &website=https%3A%2F%2Fwww.themusicalhop.com\
    &facebook_link=https%3A%2F%2Fwww.facebook.com%2FTheMusicalHop\
    &image_link=https%3A%2F%2Fimages.example.com%2Fhop.jpg\
    &seeking_talent=y\
    &seeking_description=We+are+on+the+lookout+for+a+local+artist";

const DUELING_PIANOS: &str = "name=The+Dueling+Pianos+Bar&city=New+York&state=NY\
    &address=335+Delancey+Street&genres=Classical&genres=R%26B&genres=Hip-Hop";

const PARK_SQUARE: &str = "name=Park+Square+Live+Music+%26+Coffee&city=San+Francisco\
    &state=CA&address=34+Whiskey+Moore+Ave&genres=Rock+n+Roll&genres=Jazz";

const GUNS_N_PETALS: &str = "name=Guns+N+Petals&city=San+Francisco&state=CA\
    &phone=326-123-5000&genres=Rock+n+Roll\
    &image_link=https%3A%2F%2Fimages.example.com%2Fpetals.jpg&seeking_venue=y";

fn now() -> OffsetDateTime {
    parse_start_time("2030-01-01 00:00:00").expect("parse fixed time")
}

fn initialize_global_logger() {
    SLOG_SCOPE_GUARD.get_or_init(|| slog_envlogger::init().expect("initialize slog-envlogger"));
}

fn make_environment(test_name: &str, db: Arc<dyn Db + Send + Sync>) -> Environment {
    initialize_global_logger();

    let logger = Arc::new(slog_scope::logger().new(o!("test" => test_name.to_owned())));
    let urls = Arc::new(Urls::new(BASE_URL).expect("parse base URL"));

    Environment::new(logger, db, urls, Arc::new(now))
}

fn make_filter(
    test_name: &str,
) -> impl Filter<Extract = (Box<dyn Reply>,), Error = std::convert::Infallible> + Clone + 'static {
    routes::make_routes(make_environment(test_name, Arc::new(MockDb::new())))
}

fn parse_body(body: &[u8]) -> Value {
    serde_json::from_slice(body).expect("parse response body as JSON")
}

fn post_form(path: &str, body: &str) -> warp::test::RequestBuilder {
    warp::test::request()
        .method("POST")
        .path(path)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(body.to_owned())
}

async fn get<F>(filter: &F, path: &str) -> (StatusCode, Value)
where
    F: Filter<Extract = (Box<dyn Reply>,), Error = std::convert::Infallible> + 'static,
{
    let response = warp::test::request()
        .method("GET")
        .path(path)
        .reply(filter)
        .await;

    (response.status(), parse_body(response.body()))
}

async fn create<F>(filter: &F, path: &str, body: &str) -> i64
where
    F: Filter<Extract = (Box<dyn Reply>,), Error = std::convert::Infallible> + 'static,
{
    let response = post_form(path, body).reply(filter).await;
    assert_eq!(response.status(), StatusCode::CREATED, "creating via {}", path);

    parse_body(response.body())["id"]
        .as_i64()
        .expect("get created ID")
}

fn show_form(artist_id: i64, venue_id: i64, start_time: OffsetDateTime) -> String {
    format!(
        "artist_id={}&venue_id={}&start_time={}",
        artist_id,
        venue_id,
        start_time.format("%Y-%m-%dT%H:%M:%S")
    )
}

#[tokio::test]
async fn home_page_has_no_message() {
    let filter = make_filter("home_page_has_no_message");

    let (status, body) = get(&filter, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({ "message": null }));
}

#[tokio::test]
async fn created_venues_can_be_retrieved() {
    let filter = make_filter("created_venues_can_be_retrieved");

    let response = post_form("/venues/create", MUSICAL_HOP).reply(&filter).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert!(response.headers().contains_key("server-timing"));

    let location = response
        .headers()
        .get("location")
        .expect("get location header")
        .to_str()
        .expect("convert location header to string")
        .to_owned();

    let body = parse_body(response.body());
    let id = body["id"].as_i64().expect("get venue ID");
    assert_eq!(location, format!("{}venues/{}", BASE_URL, id));
    assert_eq!(body["message"], "Venue The Musical Hop was successfully listed!");

    let (status, venue) = get(&filter, &format!("/venues/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(venue["id"], id);
    assert_eq!(venue["name"], "The Musical Hop");
    assert_eq!(venue["city"], "San Francisco");
    assert_eq!(venue["state"], "CA");
    assert_eq!(venue["address"], "1015 Folsom Street");
    assert_eq!(venue["phone"], "123-123-1234");
    assert_eq!(
        venue["genres"],
        serde_json::json!(["Jazz", "Reggae", "Blues", "Classical", "Folk"])
    );
    assert_eq!(venue["website"], "https://www.themusicalhop.com");
    assert_eq!(venue["facebook_link"], "https://www.facebook.com/TheMusicalHop");
    assert_eq!(venue["seeking_talent"], true);
    assert_eq!(
        venue["seeking_description"],
        "We are on the lookout for a local artist"
    );
    assert_eq!(venue["past_shows"], serde_json::json!([]));
    assert_eq!(venue["upcoming_shows_count"], 0);
}

#[tokio::test]
async fn venues_are_grouped_by_area() {
    let filter = make_filter("venues_are_grouped_by_area");

    let hop = create(&filter, "/venues/create", MUSICAL_HOP).await;
    let pianos = create(&filter, "/venues", DUELING_PIANOS).await;
    let park = create(&filter, "/venues/create", PARK_SQUARE).await;
    let petals = create(&filter, "/artists/create", GUNS_N_PETALS).await;

    create(&filter, "/shows/create", &show_form(petals, hop, now() + Duration::days(3))).await;
    create(&filter, "/shows/create", &show_form(petals, hop, now() + Duration::days(4))).await;
    create(&filter, "/shows", &show_form(petals, park, now() - Duration::days(3))).await;

    let (status, body) = get(&filter, "/venues").await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(
        body,
        serde_json::json!({
            "areas": [
                {
                    "city": "San Francisco",
                    "state": "CA",
                    "venues": [
                        { "id": park, "name": "Park Square Live Music & Coffee", "num_upcoming_shows": 0 },
                        { "id": hop, "name": "The Musical Hop", "num_upcoming_shows": 2 },
                    ],
                },
                {
                    "city": "New York",
                    "state": "NY",
                    "venues": [
                        { "id": pianos, "name": "The Dueling Pianos Bar", "num_upcoming_shows": 0 },
                    ],
                },
            ]
        })
    );
}

#[tokio::test]
async fn shows_starting_now_are_past() {
    let filter = make_filter("shows_starting_now_are_past");

    let hop = create(&filter, "/venues/create", MUSICAL_HOP).await;
    let petals = create(&filter, "/artists/create", GUNS_N_PETALS).await;

    create(&filter, "/shows/create", &show_form(petals, hop, now())).await;
    create(&filter, "/shows/create", &show_form(petals, hop, now() + Duration::seconds(1))).await;

    let (_, venue) = get(&filter, &format!("/venues/{}", hop)).await;
    assert_eq!(venue["past_shows_count"], 1);
    assert_eq!(venue["upcoming_shows_count"], 1);
    assert_eq!(venue["past_shows"][0]["start_time"], "2030-01-01 00:00:00");
    assert_eq!(venue["past_shows"][0]["artist_name"], "Guns N Petals");
    assert_eq!(venue["upcoming_shows"][0]["start_time"], "2030-01-01 00:00:01");

    let (_, artist) = get(&filter, &format!("/artists/{}", petals)).await;
    assert_eq!(artist["past_shows_count"], 1);
    assert_eq!(artist["upcoming_shows_count"], 1);
    assert_eq!(artist["upcoming_shows"][0]["venue_name"], "The Musical Hop");
    assert_eq!(artist["seeking_venue"], true);
}

#[tokio::test]
async fn deleted_venues_disappear_with_their_shows() {
    let filter = make_filter("deleted_venues_disappear_with_their_shows");

    let hop = create(&filter, "/venues/create", MUSICAL_HOP).await;
    let petals = create(&filter, "/artists/create", GUNS_N_PETALS).await;
    create(&filter, "/shows/create", &show_form(petals, hop, now() + Duration::days(1))).await;

    let response = warp::test::request()
        .method("DELETE")
        .path(&format!("/venues/{}", hop))
        .reply(&filter)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        parse_body(response.body())["message"],
        format!("Venue ID: {} was successfully deleted!", hop)
    );

    let (status, _) = get(&filter, &format!("/venues/{}", hop)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, venues) = get(&filter, "/venues").await;
    assert_eq!(venues["areas"], serde_json::json!([]));

    let (_, shows) = get(&filter, "/shows").await;
    assert_eq!(shows["shows"], serde_json::json!([]));

    let response = post_form("/venues/search", "search_term=hop").reply(&filter).await;
    assert_eq!(parse_body(response.body())["count"], 0);

    let response = warp::test::request()
        .method("DELETE")
        .path(&format!("/venues/{}", hop))
        .reply(&filter)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        parse_body(response.body())["message"],
        format!("An error occurred. Venue ID: {} could not be deleted.", hop)
    );
}

#[tokio::test]
async fn searches_ignore_case_and_wildcards() {
    let filter = make_filter("searches_ignore_case_and_wildcards");

    let hop = create(&filter, "/venues/create", MUSICAL_HOP).await;
    let park = create(&filter, "/venues/create", PARK_SQUARE).await;
    let petals = create(&filter, "/artists/create", GUNS_N_PETALS).await;
    create(&filter, "/shows/create", &show_form(petals, park, now() + Duration::days(1))).await;

    let response = post_form("/venues/search", "search_term=Music").reply(&filter).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        parse_body(response.body()),
        serde_json::json!({
            "count": 2,
            "data": [
                { "id": park, "name": "Park Square Live Music & Coffee", "num_upcoming_shows": 1 },
                { "id": hop, "name": "The Musical Hop", "num_upcoming_shows": 0 },
            ],
            "search_term": "Music",
        })
    );

    let response = post_form("/venues/search", "search_term=%25").reply(&filter).await;
    assert_eq!(parse_body(response.body())["count"], 0);

    let response = post_form("/artists/search", "search_term=PETALS").reply(&filter).await;
    let body = parse_body(response.body());
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["id"], petals);
    assert_eq!(body["data"][0]["num_upcoming_shows"], 1);
}

#[tokio::test]
async fn invalid_submissions_are_rejected() {
    let filter = make_filter("invalid_submissions_are_rejected");

    let response = post_form("/venues/create", "city=San+Francisco&state=CA&address=X&genres=Jazz")
        .reply(&filter)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = parse_body(response.body());
    assert_eq!(body["operation"], "create_venue");
    assert_eq!(body["error"], "Missing field name");

    let response = post_form("/artists/create", "name=Matt+Quevedo&city=New+York&state=NY")
        .reply(&filter)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        parse_body(response.body())["message"],
        "Artist: Matt Quevedo was not created - ERROR"
    );

    let response = post_form("/shows/create", "artist_id=1&venue_id=1&start_time=tomorrow")
        .reply(&filter)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(parse_body(response.body())["message"], "Show was not created - ERROR");

    let (_, venues) = get(&filter, "/venues").await;
    assert_eq!(venues["areas"], serde_json::json!([]));
}

#[tokio::test]
async fn values_wider_than_their_columns_are_rejected() {
    let filter = make_filter("values_wider_than_their_columns_are_rejected");

    let body = format!(
        "name=The+Musical+Hop&city={}&state=CA&address=1015+Folsom+Street&genres=Jazz",
        "x".repeat(200)
    );
    let response = post_form("/venues/create", &body).reply(&filter).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = parse_body(response.body());
    assert_eq!(body["operation"], "create_venue");
    assert_eq!(
        body["message"],
        "An error occurred. Venue The Musical Hop could not be listed."
    );

    let body = format!(
        "name=The+Musical+Hop&city=San+Francisco&state=CA&address=1015+Folsom+Street\
         &genres=Jazz&facebook_link=https%3A%2F%2Fwww.facebook.com%2F{}",
        "x".repeat(153)
    );
    let response = post_form("/venues/create", &body).reply(&filter).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let (_, venues) = get(&filter, "/venues").await;
    assert_eq!(venues["areas"], serde_json::json!([]));
}

#[tokio::test]
async fn shows_need_known_artists_and_venues() {
    let filter = make_filter("shows_need_known_artists_and_venues");

    let hop = create(&filter, "/venues/create", MUSICAL_HOP).await;

    let response = post_form("/shows/create", &show_form(999, hop, now()))
        .reply(&filter)
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = parse_body(response.body());
    assert_eq!(body["message"], "Show was not created - ERROR");
    assert_eq!(body["error"], "Unknown artist 999");
}

#[tokio::test]
async fn shows_are_listed_newest_first() {
    let filter = make_filter("shows_are_listed_newest_first");

    let hop = create(&filter, "/venues/create", MUSICAL_HOP).await;
    let pianos = create(&filter, "/venues/create", DUELING_PIANOS).await;
    let petals = create(&filter, "/artists/create", GUNS_N_PETALS).await;

    create(&filter, "/shows/create", &show_form(petals, hop, now() - Duration::days(30))).await;
    let response = post_form(
        "/shows/create",
        &format!("artist_id={}&venue_id={}&start_time=2035-04-01T20:00", petals, pianos),
    )
    .reply(&filter)
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        parse_body(response.body())["message"],
        "Show was successfully listed!"
    );

    let (status, body) = get(&filter, "/shows").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["shows"],
        serde_json::json!([
            {
                "venue_id": pianos,
                "venue_name": "The Dueling Pianos Bar",
                "artist_id": petals,
                "artist_name": "Guns N Petals",
                "artist_image_link": "https://images.example.com/petals.jpg",
                "start_time": "04/01/2035",
            },
            {
                "venue_id": hop,
                "venue_name": "The Musical Hop",
                "artist_id": petals,
                "artist_name": "Guns N Petals",
                "artist_image_link": "https://images.example.com/petals.jpg",
                "start_time": "12/02/2029",
            },
        ])
    );
}

#[tokio::test]
async fn edits_redirect_to_the_updated_page() {
    let filter = make_filter("edits_redirect_to_the_updated_page");

    let hop = create(&filter, "/venues/create", MUSICAL_HOP).await;
    let petals = create(&filter, "/artists/create", GUNS_N_PETALS).await;

    let (status, form) = get(&filter, &format!("/venues/{}/edit", hop)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(form["id"], hop);
    assert_eq!(form["form"]["name"], "The Musical Hop");
    assert!(form["choices"]["states"].as_array().expect("get states").len() > 50);

    let response = post_form(
        &format!("/venues/{}/edit", hop),
        "name=The+Musical+Hop+Annex&city=Oakland&state=CA&address=1+Broadway&genres=Blues",
    )
    .reply(&filter)
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get("location").map(|l| l.to_str().ok()),
        Some(Some(format!("{}venues/{}", BASE_URL, hop).as_str()))
    );

    let (_, venue) = get(&filter, &format!("/venues/{}", hop)).await;
    assert_eq!(venue["name"], "The Musical Hop Annex");
    assert_eq!(venue["city"], "Oakland");
    assert_eq!(venue["genres"], serde_json::json!(["Blues"]));
    assert_eq!(venue["seeking_talent"], false);
    assert_eq!(venue["website"], Value::Null);

    let response = post_form(
        &format!("/artists/{}/edit", petals),
        "name=Guns+N+Petals&city=Portland&state=OR&genres=Folk",
    )
    .reply(&filter)
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let (_, artist) = get(&filter, &format!("/artists/{}", petals)).await;
    assert_eq!(artist["state"], "OR");
    assert_eq!(artist["seeking_venue"], false);

    let response = post_form("/artists/999/edit", "name=A&city=B&state=OR&genres=Folk")
        .reply(&filter)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn forms_are_offered() {
    let filter = make_filter("forms_are_offered");

    let (status, form) = get(&filter, "/artists/create").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(form["id"], Value::Null);
    assert_eq!(form["form"]["name"], "");
    assert!(form["choices"]["genres"]
        .as_array()
        .expect("get genres")
        .contains(&Value::from("Jazz")));

    let (status, form) = get(&filter, "/shows/create").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(form["form"]["start_time"], "2030-01-01 00:00:00");

    let (_, artists) = get(&filter, "/artists").await;
    assert_eq!(artists, serde_json::json!({ "artists": [] }));
}

#[tokio::test]
async fn unknown_requests_are_refused() {
    let filter = make_filter("unknown_requests_are_refused");

    let (status, body) = get(&filter, "/venues/17").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Venue 17 does not exist");

    let (status, _) = get(&filter, "/artists/17/edit").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = get(&filter, "/nowhere").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Not found");

    let response = warp::test::request()
        .method("DELETE")
        .path("/artists/17")
        .reply(&filter)
        .await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

    let huge = format!("search_term={}", "a".repeat(70 * 1024));
    let response = post_form("/artists/search", &huge).reply(&filter).await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn healthz_reports_the_database() {
    let environment = make_environment("healthz_reports_the_database", Arc::new(MockDb::new()));
    let route = routes::admin::make_healthz_route(environment);

    let response = warp::test::request()
        .method("GET")
        .path("/healthz")
        .reply(&route)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_body(response.body());
    assert_eq!(body["version"], info::VERSION);
    assert_eq!(body["database"], "ok");

    let environment = make_environment(
        "healthz_reports_the_database",
        Arc::new(MockDb::unavailable()),
    );
    let route = routes::admin::make_healthz_route(environment);

    let response = warp::test::request()
        .method("GET")
        .path("/healthz")
        .reply(&route)
        .await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(parse_body(response.body())["database"], "unavailable");
}

#[tokio::test]
async fn database_failures_are_server_errors() {
    let filter = routes::make_routes(make_environment(
        "database_failures_are_server_errors",
        Arc::new(MockDb::unavailable()),
    ));

    let (status, body) = get(&filter, "/venues").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "An error occurred. Venues could not be loaded.");
}
