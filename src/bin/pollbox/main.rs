use actix_session::{config::PersistentSession, storage::CookieSessionStore, SessionMiddleware};
use actix_web::cookie::{Key, SameSite};
use actix_web::http::header;
use actix_web::middleware::{DefaultHeaders, Logger};
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use anyhow::Context;
use env_logger::Env;
use pollbox::app_config::{AppConfig, ServerConfig};
use pollbox::identity::{HostedIdentity, IdentityProvider};
use pollbox::middleware::ClientCtx;
use pollbox::policy::Policy;
use pollbox::storage::{DatabaseStore, PollStore};
use rand::{distributions::Alphanumeric, Rng};
use std::sync::Arc;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_lib_mods();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let store: Arc<dyn PollStore> = Arc::new(
        DatabaseStore::connect(&config.database)
            .await
            .context("Failed to connect to the database")?,
    );
    let identity: Arc<dyn IdentityProvider> = Arc::new(
        HostedIdentity::new(&config.auth).context("Failed to build the identity client")?,
    );
    let policy = Policy::from_config(&config.admin);
    let secret_key = session_key(&config.server);
    let secure_cookies = config.server.secure_cookies;

    let bind = (config.server.bind_address.clone(), config.server.port);
    log::info!("Listening on {}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        let store_data: Data<Arc<dyn PollStore>> = Data::new(store.clone());
        let identity_data: Data<Arc<dyn IdentityProvider>> = Data::new(identity.clone());

        // Order of middleware IS IMPORTANT and is in REVERSE EXECUTION ORDER.
        App::new()
            .app_data(store_data)
            .app_data(identity_data)
            .app_data(Data::new(policy.clone()))
            .wrap(
                DefaultHeaders::new()
                    .add((header::X_FRAME_OPTIONS, "DENY"))
                    .add((header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
                    .add(("Referrer-Policy", "strict-origin-when-cross-origin")),
            )
            .wrap(ClientCtx::default())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                    .cookie_same_site(SameSite::Lax)
                    .cookie_secure(secure_cookies)
                    .session_lifecycle(PersistentSession::default())
                    .build(),
            )
            .wrap(Logger::new("%a %r %s %T"))
            .configure(pollbox::web::configure)
    })
    .bind(bind)?
    .run()
    .await?;

    Ok(())
}

/// Initialize third party crates we rely on but don't have control over.
pub fn init_lib_mods() {
    // A missing .env is fine; real deployments set the environment directly.
    if let Err(e) = dotenv::dotenv() {
        eprintln!("No .env loaded: {}", e);
    }
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
}

/// Key for signing session cookies. Falls back to a random key, which logs
/// everyone out on every restart.
fn session_key(config: &ServerConfig) -> Key {
    match Key::try_from(config.session_key.as_bytes()) {
        Ok(key) => key,
        Err(err) => {
            let random_string: String = rand::thread_rng()
                .sample_iter(&Alphanumeric)
                .take(128)
                .map(char::from)
                .collect();
            log::warn!("server.session_key was invalid. Reason: {:?}\r\nThis means the key used for signing session cookies will invalidate every time the application is restarted. A secret key must be at least 64 bytes to be accepted.", err);
            Key::from(random_string.as_bytes())
        }
    }
}
