use std::sync::Arc;

use log::Logger;
use time::OffsetDateTime;

use crate::db::Db;
use crate::urls::Urls;

/// Supplies the time that decides whether a show is past or upcoming.
pub type Clock = dyn Fn() -> OffsetDateTime + Send + Sync;

#[derive(Clone)]
pub struct Environment {
    pub logger: Arc<Logger>,
    pub db: Arc<dyn Db + Send + Sync>,
    pub urls: Arc<Urls>,
    pub clock: Arc<Clock>,
}

impl Environment {
    pub fn new(
        logger: Arc<Logger>,
        db: Arc<dyn Db + Send + Sync>,
        urls: Arc<Urls>,
        clock: Arc<Clock>,
    ) -> Self {
        Self {
            logger,
            db,
            urls,
            clock,
        }
    }

    /// The current time according to the environment's clock.
    pub fn now(&self) -> OffsetDateTime {
        (self.clock)()
    }
}

/// The wall clock, in UTC.
pub fn system_clock() -> Arc<Clock> {
    Arc::new(OffsetDateTime::now_utc)
}
