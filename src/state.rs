use crate::config::AppConfig;
use crate::mailer::{Mailer, SmtpMailer};
use anyhow::Context;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let db = SqlitePoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        let mailer = Arc::new(SmtpMailer::new(&config.smtp)?) as Arc<dyn Mailer>;

        Ok(Self { db, config, mailer })
    }
}

#[cfg(test)]
impl AppState {
    /// In-memory store with the real migration applied and a mailer that
    /// records instead of sending.
    pub async fn for_tests() -> (Self, Arc<crate::mailer::RecordingMailer>) {
        use crate::config::{JwtConfig, SmtpConfig};

        let db = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory pool");
        sqlx::migrate!("./migrations")
            .run(&db)
            .await
            .expect("apply migrations");

        let config = Arc::new(AppConfig {
            database_url: "sqlite::memory:".into(),
            jwt: JwtConfig {
                secret: "test-secret".into(),
                access_ttl_minutes: 60,
                reset_ttl_minutes: 15,
            },
            smtp: SmtpConfig {
                host: "localhost".into(),
                port: 587,
                username: "noreply@test.local".into(),
                password: "unused".into(),
            },
            frontend_url: "http://localhost:8501".into(),
        });

        let mailer = Arc::new(crate::mailer::RecordingMailer::default());
        (
            Self {
                db,
                config,
                mailer: mailer.clone() as Arc<dyn Mailer>,
            },
            mailer,
        )
    }
}
