#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{json, Value};
use sqlx::PgPool;

use devcamper_api::config::AppConfig;
use devcamper_api::database::DatabaseManager;
use devcamper_api::geo::{GeoPoint, GeocodeError, Geocoder};
use devcamper_api::mailer::{MailError, Mailer, Message};
use devcamper_api::storage::LocalFileStorage;
use devcamper_api::{app, AppState};

/// Largest photo the test server accepts.
pub const MAX_UPLOAD: usize = 4096;

/// Coordinates the fake geocoder hands out for Boston addresses and 02118.
pub const BOSTON: (f64, f64) = (42.3417, -71.0770);

/// Coordinates for everything else it knows about.
pub const SEATTLE: (f64, f64) = (47.6062, -122.3321);

/// Resolves "Boston"/02118 and "Seattle"/98101; anything containing "Nowhere" has no candidates.
pub struct FakeGeocoder;

#[async_trait]
impl Geocoder for FakeGeocoder {
    async fn geocode(&self, query: &str) -> Result<Vec<GeoPoint>, GeocodeError> {
        let point = |(latitude, longitude): (f64, f64), city: &str, zip: &str| GeoPoint {
            latitude,
            longitude,
            formatted_address: Some(format!("{}, {}", query, city)),
            city: Some(city.to_string()),
            zipcode: Some(zip.to_string()),
            country: Some("US".to_string()),
            ..GeoPoint::default()
        };

        if query.contains("Nowhere") {
            return Ok(vec![]);
        }
        if query.contains("Boston") || query == "02118" {
            return Ok(vec![point(BOSTON, "Boston", "02118")]);
        }
        Ok(vec![point(SEATTLE, "Seattle", "98101")])
    }
}

/// Keeps every message so tests can read reset links.
#[derive(Default)]
pub struct CapturingMailer {
    pub sent: Mutex<Vec<Message>>,
}

#[async_trait]
impl Mailer for CapturingMailer {
    async fn send(&self, message: Message) -> Result<(), MailError> {
        self.sent
            .lock()
            .map_err(|_| MailError("mailbox poisoned".to_string()))?
            .push(message);
        Ok(())
    }
}

pub struct TestApp {
    pub base_url: String,
    pub client: reqwest::Client,
    pub pool: PgPool,
    pub mailer: Arc<CapturingMailer>,
    pub upload_dir: PathBuf,
}

/// Start the API in-process on a free port. `None` when DATABASE_URL is not set.
pub async fn spawn() -> Result<Option<TestApp>> {
    let _ = dotenvy::dotenv();
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping");
        return Ok(None);
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("warn"))
        .with_test_writer()
        .try_init();

    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let base_url = format!("http://127.0.0.1:{}", port);
    let upload_dir = std::env::temp_dir().join(format!("devcamper-uploads-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&upload_dir)?;

    let mut config = AppConfig::development();
    config.database.url = database_url;
    config.database.max_connections = 5;
    config.server.public_url = base_url.clone();
    config.security.jwt_secret = "integration-test-secret".to_string();
    config.uploads.max_file_upload = MAX_UPLOAD;
    config.uploads.upload_path = upload_dir.clone();

    let pool = DatabaseManager::connect(&config.database).await?;
    DatabaseManager::migrate(&pool).await?;

    let mailer = Arc::new(CapturingMailer::default());
    let state = AppState {
        pool: pool.clone(),
        config: Arc::new(config),
        geocoder: Arc::new(FakeGeocoder),
        storage: Arc::new(LocalFileStorage::new(upload_dir.clone())),
        mailer: mailer.clone(),
    };

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app(state)).await;
    });

    Ok(Some(TestApp {
        base_url,
        client: reqwest::Client::new(),
        pool,
        mailer,
        upload_dir,
    }))
}

/// A registered user and their bearer token.
pub struct Session {
    pub id: String,
    pub email: String,
    pub password: String,
    pub token: String,
}

pub fn unique(prefix: &str) -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("{} {}", prefix, &id[..8])
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url, path)
    }

    pub async fn register(&self, role: &str) -> Result<Session> {
        let email = format!("{}@example.com", unique(role).replace(' ', "-"));
        let password = "123456".to_string();
        let res = self
            .client
            .post(self.url("/auth/register"))
            .json(&json!({ "name": unique("Test"), "email": email, "password": password, "role": role }))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::OK, "register failed");
        let token = res.json::<Value>().await?["token"]
            .as_str()
            .context("register returned no token")?
            .to_string();

        let me = self.get_json("/auth/me", Some(&token)).await?;
        let id = me["data"]["id"].as_str().context("me returned no id")?.to_string();
        Ok(Session { id, email, password, token })
    }

    /// Registration never grants admin; promote directly in the database.
    pub async fn admin(&self) -> Result<Session> {
        let session = self.register("user").await?;
        sqlx::query("UPDATE users SET role = 'admin' WHERE id = $1::uuid")
            .bind(&session.id)
            .execute(&self.pool)
            .await?;
        Ok(session)
    }

    pub async fn get_json(&self, path: &str, token: Option<&str>) -> Result<Value> {
        let mut req = self.client.get(self.url(path));
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        Ok(req.send().await?.json::<Value>().await?)
    }

    /// Creates a bootcamp and returns its JSON.
    pub async fn create_bootcamp(&self, token: &str, name: &str, address: &str) -> Result<Value> {
        let res = self
            .client
            .post(self.url("/bootcamps"))
            .bearer_auth(token)
            .json(&json!({
                "name": name,
                "description": "Full stack training",
                "website": "https://example.com",
                "email": "camp@example.com",
                "address": address,
                "careers": ["Web Development", "UI/UX"],
                "housing": true,
            }))
            .send()
            .await?;
        let status = res.status();
        let body = res.json::<Value>().await?;
        assert_eq!(status, StatusCode::CREATED, "create bootcamp failed: {}", body);
        Ok(body["data"].clone())
    }

    pub async fn create_course(&self, token: &str, bootcamp_id: &str, tuition: f64) -> Result<Value> {
        let res = self
            .client
            .post(self.url(&format!("/bootcamps/{}/courses", bootcamp_id)))
            .bearer_auth(token)
            .json(&json!({
                "title": unique("Course"),
                "description": "Learn things",
                "weeks": "8",
                "tuition": tuition,
                "minimumSkill": "beginner",
            }))
            .send()
            .await?;
        let status = res.status();
        let body = res.json::<Value>().await?;
        assert_eq!(status, StatusCode::CREATED, "create course failed: {}", body);
        Ok(body["data"].clone())
    }
}
