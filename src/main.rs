use actix_web::{web::Data, App, HttpServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use credential_store::{account_requests, Config, CredentialStore};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let config = Config::from_env();
    tracing::debug!(?config, "configuration loaded");

    let store = CredentialStore::open(&config).map_err(|e| {
        tracing::error!(error = %e, database = %config.database_url, "cannot open credential store");
        std::io::Error::other(e)
    })?;
    let store = Data::new(store);

    tracing::info!(address = %config.bind_address, "listening");
    HttpServer::new(move || {
        App::new()
            .app_data(store.clone())
            .configure(account_requests::configure)
    })
    .bind(&config.bind_address)?
    .run()
    .await
}

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();
}
