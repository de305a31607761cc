//! Creates or upgrades the booking schema by running the migrations in
//! `./migrations`.

use std::env;
use std::error::Error;

use movine::Movine;
use postgres::{Client, NoTls};

use log::{debug, info, initialize_logger};

const MIGRATIONS_DIR: &str = "./migrations";

fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();

    let logger = initialize_logger();
    let connection_string = env::var("BOOKING_DB_CONNECTION_STRING")
        .map_err(|_| "must define BOOKING_DB_CONNECTION_STRING environment variable")?;

    debug!(logger, "Connecting to database...");
    let client = Client::connect(&connection_string, NoTls)?;

    let mut movine = Movine::new(client);
    movine.set_migration_dir(MIGRATIONS_DIR);

    if movine.status().is_err() {
        debug!(logger, "Initializing movine...");
        movine
            .initialize()
            .map_err(|e| format!("failed to initialize movine: {:?}", e))?;
    }

    debug!(logger, "Running migrations..."; "dir" => MIGRATIONS_DIR);
    movine
        .up()
        .map_err(|e| format!("failed to run migrations: {:?}", e))?;

    info!(logger, "Completed initialization.");

    Ok(())
}
