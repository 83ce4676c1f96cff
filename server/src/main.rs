use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use warp::Filter;

use backend::config::{get_optional_variable, get_variable};
use backend::db::PgDb;
use backend::environment::{Config, Environment};
use backend::generation::{Generator, ProviderSettings};
use backend::routes;
use backend::store::FsStore;
use backend::urls::Urls;
use futures::future::FutureExt;
use log::{info, initialize_logger};
use tokio::sync::mpsc;

const DEFAULT_API_PATH: &str = "api";
const DEFAULT_AUDIO_PATH: &str = "audio";
const DEFAULT_AUDIO_DIR: &str = "public/audio";
const DEFAULT_AUDIO_EXTENSION: &str = "wav";
const DEFAULT_PAGE_SIZE: i64 = 10;
const DEFAULT_PROVIDER_TIMEOUT_SECONDS: u64 = 10;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();

    let logger = initialize_logger();

    let main_port: u16 = get_variable("BACKEND_PORT")
        .parse()
        .expect("parse BACKEND_PORT as u16");
    let admin_port: u16 = get_variable("BACKEND_ADMIN_PORT")
        .parse()
        .expect("parse BACKEND_ADMIN_PORT as u16");

    info!(logger, "Starting..."; "main_port" => main_port, "admin_port" => admin_port);
    let logger = Arc::new(logger);

    info!(logger, "Creating database pool...");
    let connection_string = get_variable("BACKEND_DB_CONNECTION_STRING");
    let pool = sqlx::Pool::connect(&connection_string)
        .await
        .expect("create database pool from BACKEND_DB_CONNECTION_STRING");
    let db = Arc::new(PgDb::new(pool));

    let audio_path =
        get_optional_variable("BACKEND_AUDIO_PATH").unwrap_or_else(|| DEFAULT_AUDIO_PATH.to_owned());
    let audio_dir =
        get_optional_variable("BACKEND_AUDIO_DIR").unwrap_or_else(|| DEFAULT_AUDIO_DIR.to_owned());
    let store = Arc::new(FsStore::new(audio_dir.clone()));

    let urls = Arc::new(Urls::new(
        get_variable("BACKEND_BASE_URL"),
        get_optional_variable("BACKEND_API_PATH").unwrap_or_else(|| DEFAULT_API_PATH.to_owned()),
        audio_path.clone(),
        DEFAULT_AUDIO_EXTENSION,
    ));

    let timeout_seconds: u64 = get_optional_variable("BACKEND_PROVIDER_TIMEOUT_SECONDS")
        .map(|raw| {
            raw.parse()
                .expect("parse BACKEND_PROVIDER_TIMEOUT_SECONDS as u64")
        })
        .unwrap_or(DEFAULT_PROVIDER_TIMEOUT_SECONDS);
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .build()
        .expect("create provider HTTP client");

    info!(logger, "Assembling provider chains...");
    let generator = Arc::new(
        Generator::new(
            logger.clone(),
            ProviderSettings::from_env(),
            client,
            store,
            urls.clone(),
        )
        .expect("assemble provider chains"),
    );

    let config = Config::new(
        get_optional_variable("BACKEND_PAGE_SIZE")
            .map(|raw| raw.parse().expect("parse BACKEND_PAGE_SIZE as i64"))
            .unwrap_or(DEFAULT_PAGE_SIZE),
    );
    let environment = Environment::new(logger.clone(), db, urls, generator, config);

    let (termination_sender, mut termination_receiver) = mpsc::channel::<()>(1);

    let terminate =
        Arc::new(move || {
            let termination_sender = termination_sender.clone();

            async move {
                let termination_sender = termination_sender.clone();
                termination_sender.send(()).await.unwrap();
            }
            .boxed()
        });

    let should_terminate = async move {
        termination_receiver.recv().await;
    }
    .shared();

    let ctrlc = {
        let should_terminate = should_terminate.clone();
        let terminate = terminate.clone();

        let signal = tokio::signal::ctrl_c();

        async move {
            let terminate = terminate.clone();

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

        let logger2 = logger.clone();

        let register_route = routes::make_register_route(environment.clone());
        let verify_otp_route = routes::make_verify_otp_route(environment.clone());
        let update_details_route = routes::make_update_details_route(environment.clone());
        let generate_lyrics_route = routes::make_generate_lyrics_route(environment.clone());
        let generate_audio_route = routes::make_generate_audio_route(environment.clone());
        let users_route = routes::make_users_route(environment.clone());
        let audio_files_route = warp::path(audio_path).and(warp::fs::dir(audio_dir));

        let cors = warp::cors()
            .allow_any_origin()
            .allow_header("content-type")
            .allow_methods(vec!["GET", "POST"]);

        let routes = register_route
            .or(verify_otp_route)
            .or(update_details_route)
            .or(generate_lyrics_route)
            .or(generate_audio_route)
            .or(users_route)
            .or(audio_files_route)
            .recover(move |r| routes::format_rejection(logger2.clone(), r))
            .with(cors);

        let (_, main_server) =
            warp::serve(routes).bind_with_graceful_shutdown(([0, 0, 0, 0], main_port), async {
                should_terminate.await;
            });

        main_server
    };

    let admin_server = {
        let should_terminate = should_terminate.clone();
        let terminate = terminate.clone();

        let routes = routes::admin::make_healthz_route(environment.clone()).or(
            routes::admin::make_termination_route(environment.clone(), terminate),
        );

        let (_, admin_server) =
            warp::serve(routes).bind_with_graceful_shutdown(([0, 0, 0, 0], admin_port), async {
                should_terminate.await;
            });

        admin_server
    };

    tokio::join!(ctrlc, main_server, admin_server);

    info!(logger, "Exiting gracefully...");

    Ok(())
}
