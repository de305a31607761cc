//! An in-memory [`Db`] for tests.

use std::collections::BTreeMap;
use std::sync::RwLock;

use futures::future::{self, BoxFuture, FutureExt};
use time::OffsetDateTime;

use super::Db;
use crate::artist::{Artist, ArtistFields, ArtistListing, VenueAppearance};
use crate::errors::BookingError;
use crate::listing::ListingEntry;
use crate::show::{NewShow, ShowListing};
use crate::venue::{ArtistAppearance, Venue, VenueFields, VenueListing};
use crate::Id;

#[derive(Default)]
struct Tables {
    venues: BTreeMap<Id, VenueFields>,
    artists: BTreeMap<Id, ArtistFields>,
    shows: BTreeMap<Id, NewShow>,
    last_id: Id,
}

impl Tables {
    fn next_id(&mut self) -> Id {
        self.last_id += 1;
        self.last_id
    }

    fn upcoming_at_venue(&self, id: Id, now: OffsetDateTime) -> i64 {
        self.shows
            .values()
            .filter(|s| s.venue_id == id && s.start_time > now)
            .count() as i64
    }

    fn upcoming_by_artist(&self, id: Id, now: OffsetDateTime) -> i64 {
        self.shows
            .values()
            .filter(|s| s.artist_id == id && s.start_time > now)
            .count() as i64
    }
}

#[derive(Default)]
pub struct MockDb {
    tables: RwLock<Tables>,
    unavailable: bool,
}

impl MockDb {
    pub fn new() -> Self {
        Default::default()
    }

    /// A database whose every operation fails.
    pub fn unavailable() -> Self {
        MockDb {
            unavailable: true,
            ..Default::default()
        }
    }

    fn read<T: Send + 'static>(
        &self,
        f: impl FnOnce(&Tables) -> Result<T, BookingError>,
    ) -> BoxFuture<Result<T, BookingError>> {
        let result = if self.unavailable {
            Err(unavailable())
        } else {
            f(&*self.tables.read().unwrap())
        };

        future::ready(result).boxed()
    }

    fn write<T: Send + 'static>(
        &self,
        f: impl FnOnce(&mut Tables) -> Result<T, BookingError>,
    ) -> BoxFuture<Result<T, BookingError>> {
        let result = if self.unavailable {
            Err(unavailable())
        } else {
            f(&mut *self.tables.write().unwrap())
        };

        future::ready(result).boxed()
    }
}

fn unavailable() -> BookingError {
    BookingError::Sqlx {
        source: sqlx::Error::PoolTimedOut,
    }
}

fn matches_term(name: &str, term: &str) -> bool {
    name.to_lowercase().contains(&term.to_lowercase())
}

impl Db for MockDb {
    fn check(&self) -> BoxFuture<Result<(), BookingError>> {
        self.read(|_| Ok(()))
    }

    fn venue_listings(
        &self,
        now: OffsetDateTime,
    ) -> BoxFuture<Result<Vec<VenueListing>, BookingError>> {
        self.read(move |t| {
            let mut listings: Vec<VenueListing> = t
                .venues
                .iter()
                .map(|(id, v)| VenueListing {
                    id: *id,
                    name: v.name.clone(),
                    city: v.city.clone(),
                    state: v.state.clone(),
                    num_upcoming_shows: t.upcoming_at_venue(*id, now),
                })
                .collect();

            listings.sort_by(|a, b| {
                (&a.state, &a.city, &a.name, a.id).cmp(&(&b.state, &b.city, &b.name, b.id))
            });

            Ok(listings)
        })
    }

    fn search_venues(
        &self,
        term: String,
        now: OffsetDateTime,
    ) -> BoxFuture<Result<Vec<ListingEntry>, BookingError>> {
        self.read(move |t| {
            let mut results: Vec<ListingEntry> = t
                .venues
                .iter()
                .filter(|(_, v)| matches_term(&v.name, &term))
                .map(|(id, v)| ListingEntry {
                    id: *id,
                    name: v.name.clone(),
                    num_upcoming_shows: t.upcoming_at_venue(*id, now),
                })
                .collect();

            results.sort_by(|a, b| (&a.name, a.id).cmp(&(&b.name, b.id)));

            Ok(results)
        })
    }

    fn retrieve_venue(&self, id: Id) -> BoxFuture<Result<Option<Venue>, BookingError>> {
        self.read(move |t| Ok(t.venues.get(&id).map(|v| Venue::new(id, v.clone()))))
    }

    fn venue_shows(&self, id: Id) -> BoxFuture<Result<Vec<ArtistAppearance>, BookingError>> {
        self.read(move |t| {
            let mut shows = vec![];

            for show in t.shows.values().filter(|s| s.venue_id == id) {
                if let Some(artist) = t.artists.get(&show.artist_id) {
                    shows.push(ArtistAppearance {
                        artist_id: show.artist_id,
                        artist_name: artist.name.clone(),
                        artist_image_link: artist.image_link.clone(),
                        start_time: show.start_time,
                    });
                }
            }

            shows.sort_by_key(|s| s.start_time);

            Ok(shows)
        })
    }

    fn insert_venue(&self, fields: VenueFields) -> BoxFuture<Result<Id, BookingError>> {
        self.write(move |t| {
            let id = t.next_id();
            t.venues.insert(id, fields);

            Ok(id)
        })
    }

    fn update_venue(&self, id: Id, fields: VenueFields) -> BoxFuture<Result<(), BookingError>> {
        self.write(move |t| match t.venues.get_mut(&id) {
            Some(venue) => {
                *venue = fields;
                Ok(())
            }
            None => Err(BookingError::NonExistentVenue(id)),
        })
    }

    fn delete_venue(&self, id: Id) -> BoxFuture<Result<(), BookingError>> {
        self.write(move |t| {
            t.venues
                .remove(&id)
                .ok_or(BookingError::NonExistentVenue(id))?;
            t.shows.retain(|_, s| s.venue_id != id);

            Ok(())
        })
    }

    fn artist_listings(&self) -> BoxFuture<Result<Vec<ArtistListing>, BookingError>> {
        self.read(|t| {
            let mut artists: Vec<ArtistListing> = t
                .artists
                .iter()
                .map(|(id, a)| ArtistListing {
                    id: *id,
                    name: a.name.clone(),
                })
                .collect();

            artists.sort_by(|a, b| (&a.name, a.id).cmp(&(&b.name, b.id)));

            Ok(artists)
        })
    }

    fn search_artists(
        &self,
        term: String,
        now: OffsetDateTime,
    ) -> BoxFuture<Result<Vec<ListingEntry>, BookingError>> {
        self.read(move |t| {
            let mut results: Vec<ListingEntry> = t
                .artists
                .iter()
                .filter(|(_, a)| matches_term(&a.name, &term))
                .map(|(id, a)| ListingEntry {
                    id: *id,
                    name: a.name.clone(),
                    num_upcoming_shows: t.upcoming_by_artist(*id, now),
                })
                .collect();

            results.sort_by(|a, b| (&a.name, a.id).cmp(&(&b.name, b.id)));

            Ok(results)
        })
    }

    fn retrieve_artist(&self, id: Id) -> BoxFuture<Result<Option<Artist>, BookingError>> {
        self.read(move |t| Ok(t.artists.get(&id).map(|a| Artist::new(id, a.clone()))))
    }

    fn artist_shows(&self, id: Id) -> BoxFuture<Result<Vec<VenueAppearance>, BookingError>> {
        self.read(move |t| {
            let mut shows = vec![];

            for show in t.shows.values().filter(|s| s.artist_id == id) {
                if let Some(venue) = t.venues.get(&show.venue_id) {
                    shows.push(VenueAppearance {
                        venue_id: show.venue_id,
                        venue_name: venue.name.clone(),
                        venue_image_link: venue.image_link.clone(),
                        start_time: show.start_time,
                    });
                }
            }

            shows.sort_by_key(|s| s.start_time);

            Ok(shows)
        })
    }

    fn insert_artist(&self, fields: ArtistFields) -> BoxFuture<Result<Id, BookingError>> {
        self.write(move |t| {
            let id = t.next_id();
            t.artists.insert(id, fields);

            Ok(id)
        })
    }

    fn update_artist(
        &self,
        id: Id,
        fields: ArtistFields,
    ) -> BoxFuture<Result<(), BookingError>> {
        self.write(move |t| match t.artists.get_mut(&id) {
            Some(artist) => {
                *artist = fields;
                Ok(())
            }
            None => Err(BookingError::NonExistentArtist(id)),
        })
    }

    fn show_listings(&self) -> BoxFuture<Result<Vec<ShowListing>, BookingError>> {
        self.read(|t| {
            let mut shows: Vec<(Id, ShowListing)> = vec![];

            for (id, show) in &t.shows {
                if let (Some(venue), Some(artist)) =
                    (t.venues.get(&show.venue_id), t.artists.get(&show.artist_id))
                {
                    shows.push((
                        *id,
                        ShowListing {
                            venue_id: show.venue_id,
                            venue_name: venue.name.clone(),
                            artist_id: show.artist_id,
                            artist_name: artist.name.clone(),
                            artist_image_link: artist.image_link.clone(),
                            start_time: show.start_time,
                        },
                    ));
                }
            }

            shows.sort_by(|(a_id, a), (b_id, b)| (b.start_time, b_id).cmp(&(a.start_time, a_id)));

            Ok(shows.into_iter().map(|(_, show)| show).collect())
        })
    }

    fn insert_show(&self, show: NewShow) -> BoxFuture<Result<Id, BookingError>> {
        self.write(move |t| {
            if !t.artists.contains_key(&show.artist_id) {
                return Err(BookingError::UnknownArtist(show.artist_id));
            }

            if !t.venues.contains_key(&show.venue_id) {
                return Err(BookingError::UnknownVenue(show.venue_id));
            }

            let id = t.next_id();
            t.shows.insert(id, show);

            Ok(id)
        })
    }
}
