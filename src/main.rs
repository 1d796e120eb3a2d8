use std::sync::Arc;

use actix_files as fs;
use actix_web::{web::Data, App, HttpServer};
use anyhow::Context as _;
use dotenv::dotenv;
use log::{error, info};
use tera::Tera;

use folio_web::config::Settings;
use folio_web::events::LogSink;
use folio_web::web::routes;
use folio_web::{build_actions, AppState};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Initialize environment
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    info!("Starting folio web application");

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            error!("Configuration error: {:#}", e);
            std::process::exit(1);
        }
    };
    info!("AI backend: {:?}", settings.backend);

    // Initialize template engine
    let mut tera = match Tera::new(&format!("{}/**/*", settings.templates_dir)) {
        Ok(t) => t,
        Err(e) => {
            error!("Template parsing error: {}", e);
            std::process::exit(1);
        }
    };
    tera.autoescape_on(vec![".html"]);

    let actions = build_actions(&settings, Arc::new(LogSink));
    let app_state = Data::new(AppState { tera, actions });

    let static_dir = settings.static_dir.clone();
    let address = (settings.host.clone(), settings.port);
    info!("Listening on {}:{}", address.0, address.1);

    // Start web server
    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .configure(routes::configure)
            .service(fs::Files::new("/static", &static_dir))
    })
    .bind(address.clone())
    .with_context(|| format!("failed to bind {}:{}", address.0, address.1))?
    .run()
    .await
    .context("server error")
}
