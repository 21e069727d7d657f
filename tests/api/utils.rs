use async_trait::async_trait;
use contact_relay::{
    configuration::{get_configuration, Settings},
    email_client::{MailTransport, SendEmailError},
    telemetry::{get_subscriber, init_subscriber},
    App,
};
use derive_getters::Getters;
use lettre::Message;
use once_cell::sync::Lazy;
use secrecy::Secret;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

pub const RECIPIENT: &str = "owner@example.com";

static TRACING: Lazy<()> = Lazy::new(|| {
    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber("test".into(), std::io::stdout);
        init_subscriber(subscriber).expect("Failed to init subscriber");
    } else {
        let subscriber = get_subscriber("test".into(), std::io::sink);
        init_subscriber(subscriber).expect("Failed to init subscriber");
    };
});

/// Stands in for the SMTP relay. Remembers the recipient of every message it
/// was asked to deliver and refuses the ones it has been told to fail for.
#[derive(Debug, Default)]
pub struct FakeTransport {
    failing_recipients: Mutex<Vec<String>>,
    attempts: Mutex<Vec<String>>,
    panics: AtomicBool,
}

impl FakeTransport {
    pub fn fail_for(&self, recipient: &str) {
        self.failing_recipients
            .lock()
            .unwrap()
            .push(recipient.to_string());
    }

    /// Make every following send panic instead of returning.
    pub fn panic_on_send(&self) {
        self.panics.store(true, Ordering::SeqCst);
    }

    /// Recipients of every message that was handed to the transport.
    pub fn attempts(&self) -> Vec<String> {
        self.attempts.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailTransport for FakeTransport {
    async fn send(&self, message: Message) -> Result<(), SendEmailError> {
        let recipient = message.envelope().to()[0].to_string();
        self.attempts.lock().unwrap().push(recipient.clone());

        if self.panics.load(Ordering::SeqCst) {
            panic!("Relay blew up while sending to {recipient}");
        }
        if self.failing_recipients.lock().unwrap().contains(&recipient) {
            return Err(SendEmailError::Transport(anyhow::anyhow!(
                "Relay refused message for {recipient}"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Getters)]
pub struct TestApp {
    address: String,
    transport: Arc<FakeTransport>,
    client: reqwest::Client,
}

impl TestApp {
    pub async fn health_check(&self) -> reqwest::Response {
        self.client
            .get(format!("{}/health", self.address))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_contact(&self, body: &serde_json::Value) -> reqwest::Response {
        self.client
            .post(format!("{}/api/contact", self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_contact_raw(&self, body: &'static str) -> reqwest::Response {
        self.client
            .post(format!("{}/api/contact", self.address))
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }
}

/// Spawn a instance of the app on a random port with a complete mail
/// configuration.
pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_| {}).await
}

/// Spawn a instance of the app, letting the caller adjust the settings
/// before it starts.
pub async fn spawn_app_with(configure: impl FnOnce(&mut Settings)) -> TestApp {
    Lazy::force(&TRACING);

    let config = {
        let mut c = get_configuration().expect("Failed to read configuration");

        // Make OS choose random port
        c.application.host = "127.0.0.1".into();
        c.application.port = 0;
        c.email.username = Some("relay@example.com".into());
        c.email.password = Some(Secret::new("password".into()));
        c.email.sender = None;
        c.email.recipient = Some(RECIPIENT.into());
        configure(&mut c);

        c
    };

    let transport = Arc::new(FakeTransport::default());
    let app = App::build_with_transport(config, transport.clone()).expect("Failed to build app");
    let address = format!("http://127.0.0.1:{}", app.port());

    let _ = tokio::spawn(app.run_until_stopped());

    TestApp {
        address,
        transport,
        client: reqwest::Client::new(),
    }
}
