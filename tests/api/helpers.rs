use engineers_hub::configuration::get_configuration;
use engineers_hub::startup::Application;
use engineers_hub::telemetry::get_subscriber;
use engineers_hub::telemetry::init_subscriber;
use once_cell::sync::Lazy;
use wiremock::MockServer;

/// Init the tracing subscriber once only. To opt in to verbose logging, use the
/// env var `TEST_LOG`:
///
/// ```sh
///      TEST_LOG=true cargo test [test_name] | bunyan
/// ```
static TRACING: Lazy<()> = Lazy::new(|| {
    // the two sinks are different closure types, hence the match arms
    match std::env::var("TEST_LOG") {
        Ok(_) => {
            let subscriber = get_subscriber("test", "debug", std::io::stdout);
            init_subscriber(subscriber).expect("init tracing");
        }
        Err(_) => {
            let subscriber = get_subscriber("test", "debug", std::io::sink);
            init_subscriber(subscriber).expect("init tracing");
        }
    };
});

/// Store requests slower than this are treated as transport failures
pub const STORE_TIMEOUT_MS: u64 = 500;

pub struct TestApp {
    pub addr: String,
    /// Stands in for the hosted `subscribers` table
    pub store_server: MockServer,
    pub api_client: reqwest::Client,
}

impl TestApp {
    /// `POST /subscriptions` with a form-encoded body
    pub async fn post_subscriptions(
        &self,
        body: String,
    ) -> reqwest::Response {
        self.api_client
            .post(format!("{}/subscriptions", self.addr))
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
            .expect("execute request")
    }

    pub async fn subscribe(
        &self,
        email: &str,
    ) -> reqwest::Response {
        let body = serde_urlencoded::to_string(&[("email", email)]).unwrap();
        self.post_subscriptions(body).await
    }

    pub async fn get_home(
        &self,
        query: &str,
    ) -> reqwest::Response {
        self.api_client
            .get(format!("{}/{query}", self.addr))
            .send()
            .await
            .expect("execute request")
    }
}

/// Spawn the app on a random port, pointed at a fresh mock store
pub async fn spawn_app() -> TestApp {
    Lazy::force(&TRACING);

    let store_server = MockServer::start().await;

    let cfg = {
        let mut cfg = get_configuration().expect("read configuration");
        // port 0 is reserved by the OS; the server will be spawned on a random free port
        cfg.application.port = 0;
        cfg.subscriber_store.base_url = store_server.uri();
        cfg.subscriber_store.timeout_milliseconds = STORE_TIMEOUT_MS;
        cfg
    };

    let app = Application::build(cfg).await.expect("build app");
    let addr = format!("http://localhost:{}", app.get_port());
    tokio::spawn(app.run_until_stopped());

    TestApp {
        addr,
        store_server,
        api_client: reqwest::Client::new(),
    }
}
