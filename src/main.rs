use std::error::Error;
use std::sync::Arc;

use futures::future::FutureExt;
use sqlx::postgres::PgPoolOptions;
use tokio::sync::mpsc;
use warp::Filter;

use booking::config::Settings;
use booking::db::PgDb;
use booking::environment::{system_clock, Environment};
use booking::routes;
use booking::routes::admin::TerminationFunctionWrapper;
use booking::urls::Urls;
use log::{info, initialize_logger, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();

    let logger = initialize_logger();

    let settings = Settings::from_env()?;

    info!(logger, "Starting..."; "main_port" => settings.port, "admin_port" => settings.admin_port);
    let logger = Arc::new(logger);

    info!(logger, "Creating database pool..."; "max_connections" => settings.max_connections);
    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .connect(&settings.connection_string)
        .await?;
    let db = Arc::new(PgDb::new(pool));

    let urls = Arc::new(Urls::new(&settings.base_url)?);

    let environment = Environment::new(logger.clone(), db, urls, system_clock());

    let (termination_sender, mut termination_receiver) = mpsc::channel::<()>(1);

    let terminate: TerminationFunctionWrapper<'static> = {
        let logger = logger.clone();

        Arc::new(move || {
            let termination_sender = termination_sender.clone();
            let logger = logger.clone();

            async move {
                if termination_sender.send(()).await.is_err() {
                    warn!(logger, "Termination already in progress");
                }
            }
            .boxed()
        })
    };

    let should_terminate = async move {
        termination_receiver.recv().await;
    }
    .shared();

    let ctrlc = {
        let should_terminate = should_terminate.clone();
        let terminate = terminate.clone();

        let signal = tokio::signal::ctrl_c();

        async move {
            tokio::select! {
                _ = should_terminate => {},
                _ = signal => {
                    terminate().await;
                }
            }
        }
    };

    let main_server = {
        let should_terminate = should_terminate.clone();

        let (_, main_server) = warp::serve(routes::make_routes(environment.clone()))
            .bind_with_graceful_shutdown(([0, 0, 0, 0], settings.port), async {
                should_terminate.await;
            });

        main_server
    };

    let admin_server = {
        let should_terminate = should_terminate.clone();

        let routes = routes::admin::make_healthz_route(environment.clone())
            .or(routes::admin::make_termination_route(terminate));

        let (_, admin_server) = warp::serve(routes)
            .bind_with_graceful_shutdown(([0, 0, 0, 0], settings.admin_port), async {
                should_terminate.await;
            });

        admin_server
    };

    tokio::join!(ctrlc, main_server, admin_server);

    info!(logger, "Exiting gracefully...");

    Ok(())
}
