use futures::future::BoxFuture;
use time::OffsetDateTime;

use crate::artist::{Artist, ArtistFields, ArtistListing, VenueAppearance};
use crate::errors::BookingError;
use crate::listing::ListingEntry;
use crate::show::{NewShow, ShowListing};
use crate::venue::{ArtistAppearance, Venue, VenueFields, VenueListing};
use crate::Id;

pub mod mock;

pub trait Db {
    fn check(&self) -> BoxFuture<Result<(), BookingError>>;

    fn venue_listings(
        &self,
        now: OffsetDateTime,
    ) -> BoxFuture<Result<Vec<VenueListing>, BookingError>>;

    fn search_venues(
        &self,
        term: String,
        now: OffsetDateTime,
    ) -> BoxFuture<Result<Vec<ListingEntry>, BookingError>>;

    fn retrieve_venue(&self, id: Id) -> BoxFuture<Result<Option<Venue>, BookingError>>;

    fn venue_shows(&self, id: Id) -> BoxFuture<Result<Vec<ArtistAppearance>, BookingError>>;

    fn insert_venue(&self, fields: VenueFields) -> BoxFuture<Result<Id, BookingError>>;

    fn update_venue(&self, id: Id, fields: VenueFields) -> BoxFuture<Result<(), BookingError>>;

    fn delete_venue(&self, id: Id) -> BoxFuture<Result<(), BookingError>>;

    fn artist_listings(&self) -> BoxFuture<Result<Vec<ArtistListing>, BookingError>>;

    fn search_artists(
        &self,
        term: String,
        now: OffsetDateTime,
    ) -> BoxFuture<Result<Vec<ListingEntry>, BookingError>>;

    fn retrieve_artist(&self, id: Id) -> BoxFuture<Result<Option<Artist>, BookingError>>;

    fn artist_shows(&self, id: Id) -> BoxFuture<Result<Vec<VenueAppearance>, BookingError>>;

    fn insert_artist(&self, fields: ArtistFields) -> BoxFuture<Result<Id, BookingError>>;

    fn update_artist(&self, id: Id, fields: ArtistFields)
        -> BoxFuture<Result<(), BookingError>>;

    fn show_listings(&self) -> BoxFuture<Result<Vec<ShowListing>, BookingError>>;

    fn insert_show(&self, show: NewShow) -> BoxFuture<Result<Id, BookingError>>;
}

pub use self::postgres::*;

mod postgres {
    use futures::future::BoxFuture;
    use futures::FutureExt;
    use sqlx::{
        self,
        postgres::{PgDatabaseError, PgPool, PgRow},
    };
    use time::OffsetDateTime;

    use crate::artist::{Artist, ArtistFields, ArtistListing, VenueAppearance};
    use crate::errors::BookingError;
    use crate::listing::{escape_like, ListingEntry};
    use crate::show::{NewShow, ShowListing};
    use crate::venue::{ArtistAppearance, Venue, VenueFields, VenueListing};
    use crate::Id;

    const SHOWS_ARTIST_CONSTRAINT: &str = "shows_artist";
    const SHOWS_VENUE_CONSTRAINT: &str = "shows_venue";

    pub struct PgDb {
        pool: PgPool,
    }

    impl PgDb {
        pub fn new(pool: PgPool) -> Self {
            PgDb { pool }
        }
    }

    // these can be simplified once async functions in traits are stabilized
    impl super::Db for PgDb {
        fn check(&self) -> BoxFuture<Result<(), BookingError>> {
            async move {
                sqlx::query(include_str!("queries/check.sql"))
                    .execute(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(())
            }
            .boxed()
        }

        fn venue_listings(
            &self,
            now: OffsetDateTime,
        ) -> BoxFuture<Result<Vec<VenueListing>, BookingError>> {
            async move {
                let query = sqlx::query(include_str!("queries/venue_listings.sql"));

                let listings = query
                    .bind(now)
                    .try_map(|row: PgRow| {
                        Ok(VenueListing {
                            id: try_get(&row, "id")?,
                            name: try_get(&row, "name")?,
                            city: try_get(&row, "city")?,
                            state: try_get(&row, "state")?,
                            num_upcoming_shows: try_get(&row, "num_upcoming_shows")?,
                        })
                    })
                    .fetch_all(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(listings)
            }
            .boxed()
        }

        fn search_venues(
            &self,
            term: String,
            now: OffsetDateTime,
        ) -> BoxFuture<Result<Vec<ListingEntry>, BookingError>> {
            async move {
                let query = sqlx::query(include_str!("queries/search_venues.sql"));

                let results = query
                    .bind(escape_like(&term))
                    .bind(now)
                    .try_map(|row: PgRow| listing_entry_from_row(&row))
                    .fetch_all(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(results)
            }
            .boxed()
        }

        fn retrieve_venue(&self, id: Id) -> BoxFuture<Result<Option<Venue>, BookingError>> {
            async move {
                let query = sqlx::query(include_str!("queries/retrieve_venue.sql"));

                let venue = query
                    .bind(id)
                    .try_map(|row: PgRow| {
                        let fields = VenueFields {
                            name: try_get(&row, "name")?,
                            city: try_get(&row, "city")?,
                            state: try_get(&row, "state")?,
                            address: try_get(&row, "address")?,
                            phone: try_get(&row, "phone")?,
                            genres: try_get(&row, "genres")?,
                            website: try_get(&row, "website")?,
                            facebook_link: try_get(&row, "facebook_link")?,
                            image_link: try_get(&row, "image_link")?,
                            seeking_talent: try_get(&row, "seeking_talent")?,
                            seeking_description: try_get(&row, "seeking_description")?,
                        };

                        Ok(Venue::new(try_get(&row, "id")?, fields))
                    })
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(venue)
            }
            .boxed()
        }

        fn venue_shows(&self, id: Id) -> BoxFuture<Result<Vec<ArtistAppearance>, BookingError>> {
            async move {
                let query = sqlx::query(include_str!("queries/venue_shows.sql"));

                let shows = query
                    .bind(id)
                    .try_map(|row: PgRow| {
                        Ok(ArtistAppearance {
                            artist_id: try_get(&row, "artist_id")?,
                            artist_name: try_get(&row, "artist_name")?,
                            artist_image_link: try_get(&row, "artist_image_link")?,
                            start_time: try_get(&row, "start_time")?,
                        })
                    })
                    .fetch_all(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(shows)
            }
            .boxed()
        }

        fn insert_venue(&self, fields: VenueFields) -> BoxFuture<Result<Id, BookingError>> {
            async move {
                let query = sqlx::query_as(include_str!("queries/insert_venue.sql"));

                let (id,): (Id,) = query
                    .bind(fields.name)
                    .bind(fields.city)
                    .bind(fields.state)
                    .bind(fields.address)
                    .bind(fields.phone)
                    .bind(fields.genres)
                    .bind(fields.website)
                    .bind(fields.facebook_link)
                    .bind(fields.image_link)
                    .bind(fields.seeking_talent)
                    .bind(fields.seeking_description)
                    .fetch_one(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(id)
            }
            .boxed()
        }

        fn update_venue(&self, id: Id, fields: VenueFields) -> BoxFuture<Result<(), BookingError>> {
            async move {
                let query = sqlx::query(include_str!("queries/update_venue.sql"));

                let count = query
                    .bind(id)
                    .bind(fields.name)
                    .bind(fields.city)
                    .bind(fields.state)
                    .bind(fields.address)
                    .bind(fields.phone)
                    .bind(fields.genres)
                    .bind(fields.website)
                    .bind(fields.facebook_link)
                    .bind(fields.image_link)
                    .bind(fields.seeking_talent)
                    .bind(fields.seeking_description)
                    .execute(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?
                    .rows_affected();

                if count == 0 {
                    Err(BookingError::NonExistentVenue(id))
                } else {
                    Ok(())
                }
            }
            .boxed()
        }

        fn delete_venue(&self, id: Id) -> BoxFuture<Result<(), BookingError>> {
            async move {
                let query = sqlx::query(include_str!("queries/delete_venue.sql"));

                let count = query
                    .bind(id)
                    .execute(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?
                    .rows_affected();

                if count == 0 {
                    Err(BookingError::NonExistentVenue(id))
                } else {
                    Ok(())
                }
            }
            .boxed()
        }

        fn artist_listings(&self) -> BoxFuture<Result<Vec<ArtistListing>, BookingError>> {
            async move {
                let query = sqlx::query(include_str!("queries/artist_listings.sql"));

                let artists = query
                    .try_map(|row: PgRow| {
                        Ok(ArtistListing {
                            id: try_get(&row, "id")?,
                            name: try_get(&row, "name")?,
                        })
                    })
                    .fetch_all(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(artists)
            }
            .boxed()
        }

        fn search_artists(
            &self,
            term: String,
            now: OffsetDateTime,
        ) -> BoxFuture<Result<Vec<ListingEntry>, BookingError>> {
            async move {
                let query = sqlx::query(include_str!("queries/search_artists.sql"));

                let results = query
                    .bind(escape_like(&term))
                    .bind(now)
                    .try_map(|row: PgRow| listing_entry_from_row(&row))
                    .fetch_all(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(results)
            }
            .boxed()
        }

        fn retrieve_artist(&self, id: Id) -> BoxFuture<Result<Option<Artist>, BookingError>> {
            async move {
                let query = sqlx::query(include_str!("queries/retrieve_artist.sql"));

                let artist = query
                    .bind(id)
                    .try_map(|row: PgRow| {
                        let fields = ArtistFields {
                            name: try_get(&row, "name")?,
                            city: try_get(&row, "city")?,
                            state: try_get(&row, "state")?,
                            phone: try_get(&row, "phone")?,
                            genres: try_get(&row, "genres")?,
                            website: try_get(&row, "website")?,
                            facebook_link: try_get(&row, "facebook_link")?,
                            image_link: try_get(&row, "image_link")?,
                            seeking_venue: try_get(&row, "seeking_venue")?,
                            seeking_description: try_get(&row, "seeking_description")?,
                        };

                        Ok(Artist::new(try_get(&row, "id")?, fields))
                    })
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(artist)
            }
            .boxed()
        }

        fn artist_shows(&self, id: Id) -> BoxFuture<Result<Vec<VenueAppearance>, BookingError>> {
            async move {
                let query = sqlx::query(include_str!("queries/artist_shows.sql"));

                let shows = query
                    .bind(id)
                    .try_map(|row: PgRow| {
                        Ok(VenueAppearance {
                            venue_id: try_get(&row, "venue_id")?,
                            venue_name: try_get(&row, "venue_name")?,
                            venue_image_link: try_get(&row, "venue_image_link")?,
                            start_time: try_get(&row, "start_time")?,
                        })
                    })
                    .fetch_all(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(shows)
            }
            .boxed()
        }

        fn insert_artist(&self, fields: ArtistFields) -> BoxFuture<Result<Id, BookingError>> {
            async move {
                let query = sqlx::query_as(include_str!("queries/insert_artist.sql"));

                let (id,): (Id,) = query
                    .bind(fields.name)
                    .bind(fields.city)
                    .bind(fields.state)
                    .bind(fields.phone)
                    .bind(fields.genres)
                    .bind(fields.website)
                    .bind(fields.facebook_link)
                    .bind(fields.image_link)
                    .bind(fields.seeking_venue)
                    .bind(fields.seeking_description)
                    .fetch_one(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(id)
            }
            .boxed()
        }

        fn update_artist(
            &self,
            id: Id,
            fields: ArtistFields,
        ) -> BoxFuture<Result<(), BookingError>> {
            async move {
                let query = sqlx::query(include_str!("queries/update_artist.sql"));

                let count = query
                    .bind(id)
                    .bind(fields.name)
                    .bind(fields.city)
                    .bind(fields.state)
                    .bind(fields.phone)
                    .bind(fields.genres)
                    .bind(fields.website)
                    .bind(fields.facebook_link)
                    .bind(fields.image_link)
                    .bind(fields.seeking_venue)
                    .bind(fields.seeking_description)
                    .execute(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?
                    .rows_affected();

                if count == 0 {
                    Err(BookingError::NonExistentArtist(id))
                } else {
                    Ok(())
                }
            }
            .boxed()
        }

        fn show_listings(&self) -> BoxFuture<Result<Vec<ShowListing>, BookingError>> {
            async move {
                let query = sqlx::query(include_str!("queries/show_listings.sql"));

                let shows = query
                    .try_map(|row: PgRow| {
                        Ok(ShowListing {
                            venue_id: try_get(&row, "venue_id")?,
                            venue_name: try_get(&row, "venue_name")?,
                            artist_id: try_get(&row, "artist_id")?,
                            artist_name: try_get(&row, "artist_name")?,
                            artist_image_link: try_get(&row, "artist_image_link")?,
                            start_time: try_get(&row, "start_time")?,
                        })
                    })
                    .fetch_all(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(shows)
            }
            .boxed()
        }

        fn insert_show(&self, show: NewShow) -> BoxFuture<Result<Id, BookingError>> {
            async move {
                let query = sqlx::query_as(include_str!("queries/insert_show.sql"));

                let (id,): (Id,) = query
                    .bind(show.artist_id)
                    .bind(show.venue_id)
                    .bind(show.start_time)
                    .fetch_one(&self.pool)
                    .await
                    .map_err(|e| map_show_error(e, &show))?;

                Ok(id)
            }
            .boxed()
        }
    }

    fn listing_entry_from_row(row: &PgRow) -> Result<ListingEntry, sqlx::Error> {
        Ok(ListingEntry {
            id: try_get(row, "id")?,
            name: try_get(row, "name")?,
            num_upcoming_shows: try_get(row, "num_upcoming_shows")?,
        })
    }

    fn try_get<'a, T: sqlx::Type<sqlx::Postgres> + sqlx::decode::Decode<'a, sqlx::Postgres>>(
        row: &'a PgRow,
        column: &str,
    ) -> Result<T, sqlx::Error> {
        use sqlx::prelude::*;

        row.try_get(column)
    }

    /// Returns the name of the constraint the error violated, if any.
    fn constraint(error: &sqlx::Error) -> Option<&str> {
        match error {
            sqlx::Error::Database(e) => e
                .try_downcast_ref::<PgDatabaseError>()
                .and_then(PgDatabaseError::constraint),
            _ => None,
        }
    }

    /// Reports foreign key violations as the missing artist or venue.
    fn map_show_error(error: sqlx::Error, show: &NewShow) -> BookingError {
        let violated = constraint(&error).map(str::to_owned);

        match violated.as_deref() {
            Some(SHOWS_ARTIST_CONSTRAINT) => BookingError::UnknownArtist(show.artist_id),
            Some(SHOWS_VENUE_CONSTRAINT) => BookingError::UnknownVenue(show.venue_id),
            _ => map_sqlx_error(error),
        }
    }

    fn map_sqlx_error(error: sqlx::Error) -> BookingError {
        BookingError::Sqlx { source: error }
    }
}
