use std::net::TcpListener;

use actix_web::dev::Server;
use actix_web::web;
use actix_web::App;
use actix_web::HttpServer;
use tracing_actix_web::TracingLogger;

use crate::configuration::Settings;
use crate::routes::health_check;
use crate::routes::home;
use crate::routes::subscribe;
use crate::routes::LandingPage;
use crate::store_client::RestStoreClient;

/// Wrapper for actix's `Server` with access to the bound port. Not to be
/// confused with actix's `App`!
pub struct Application {
    /// Left private; use `get_port` to access
    port: u16,
    server: Server,
}

impl Application {
    /// Bind the listener and construct the long-lived collaborators: the
    /// store client and the landing page (templates + rotators).
    pub async fn build(cfg: Settings) -> Result<Self, anyhow::Error> {
        let addr = format!("{}:{}", cfg.application.host, cfg.application.port);
        let listener = TcpListener::bind(addr)?;

        // port 0 in config -> randomised port assigned by the OS
        let port = listener.local_addr()?.port();

        let store_client = cfg.subscriber_store.client()?;
        let landing_page = LandingPage::new(&cfg.landing)?;

        let server = run(listener, store_client, landing_page)?;

        Ok(Self { port, server })
    }

    pub fn get_port(&self) -> u16 { self.port }

    /// Because this consumes `self`, this should be the final function call (or
    /// passed to `tokio::spawn`)
    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> { self.server.await }
}

/// The server is not responsible for binding to an address, it only listens to
/// an already bound address.
///
/// Declares all endpoints.
pub fn run(
    listener: TcpListener,
    store_client: RestStoreClient,
    landing_page: LandingPage,
) -> Result<Server, anyhow::Error> {
    // `Data` is externally an `Arc` (for sharing/cloning across workers)
    let store_client = web::Data::new(store_client);
    let landing_page = web::Data::new(landing_page);

    // the closure runs once per worker, hence the clones
    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .route("/", web::get().to(home))
            .route("/health_check", web::get().to(health_check))
            .route("/subscriptions", web::post().to(subscribe))
            .app_data(store_client.clone())
            .app_data(landing_page.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
