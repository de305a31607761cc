use std::env;
use std::str::FromStr;

use crate::errors::BookingError;

const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Returns the value of the named environment variable if it exists.
pub fn get_variable(name: &str) -> Result<String, BookingError> {
    env::var(name).map_err(|_| BookingError::MissingVariable(name.to_owned()))
}

/// Returns the value of the named environment variable parsed as `T`.
pub fn parse_variable<T: FromStr>(name: &str) -> Result<T, BookingError> {
    let value = get_variable(name)?;

    value.parse().map_err(|_| BookingError::InvalidVariable {
        name: name.to_owned(),
        value,
    })
}

/// Everything the server reads from its environment at startup.
#[derive(Clone, Debug)]
pub struct Settings {
    pub port: u16,
    pub admin_port: u16,
    pub connection_string: String,
    pub max_connections: u32,
    pub base_url: String,
}

impl Settings {
    pub fn from_env() -> Result<Self, BookingError> {
        let max_connections = match env::var("BOOKING_DB_MAX_CONNECTIONS") {
            Ok(_) => parse_variable("BOOKING_DB_MAX_CONNECTIONS")?,
            Err(_) => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Settings {
            port: parse_variable("BOOKING_PORT")?,
            admin_port: parse_variable("BOOKING_ADMIN_PORT")?,
            connection_string: get_variable("BOOKING_DB_CONNECTION_STRING")?,
            max_connections,
            base_url: get_variable("BOOKING_BASE_URL")?,
        })
    }
}
