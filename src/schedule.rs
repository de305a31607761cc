use serde::Serialize;
use time::OffsetDateTime;

/// Anything that happens at a point in time.
pub trait Scheduled {
    fn start_time(&self) -> OffsetDateTime;
}

/// A set of shows split around the time of the query.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Schedule<T> {
    pub past_shows: Vec<T>,
    pub upcoming_shows: Vec<T>,
    pub past_shows_count: usize,
    pub upcoming_shows_count: usize,
}

impl<T: Scheduled> Schedule<T> {
    /// Shows starting after `now` are upcoming; the rest, including
    /// those starting exactly at `now`, are past. Both halves are sorted
    /// by start time.
    pub fn split(shows: Vec<T>, now: OffsetDateTime) -> Self {
        let (mut upcoming_shows, mut past_shows): (Vec<T>, Vec<T>) =
            shows.into_iter().partition(|show| show.start_time() > now);

        past_shows.sort_by_key(|show| show.start_time());
        upcoming_shows.sort_by_key(|show| show.start_time());

        Schedule {
            past_shows_count: past_shows.len(),
            upcoming_shows_count: upcoming_shows.len(),
            past_shows,
            upcoming_shows,
        }
    }
}
