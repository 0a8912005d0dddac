use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

use crate::{
    config::AppConfig,
    publish::publisher::{AmqpPublisher, MessagePublisher},
    users::repo::{PgUserStore, UserStore},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserStore>,
    pub publisher: Arc<dyn MessagePublisher>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let db = PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .connect_with(config.database.connect_options()?)
            .await
            .context("connect to database")?;

        if let Err(e) = sqlx::migrate!("./migrations").run(&db).await {
            warn!(error = %e, "migration failed; continuing");
        }

        let publisher = AmqpPublisher::connect(&config.broker.url)
            .await
            .context("connect to message broker")?;

        if config.basic_auth.is_some() {
            info!("basic auth credentials loaded");
        }

        Ok(Self::from_parts(
            config,
            Arc::new(PgUserStore::new(db)),
            Arc::new(publisher),
        ))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        users: Arc<dyn UserStore>,
        publisher: Arc<dyn MessagePublisher>,
    ) -> Self {
        Self {
            config,
            users,
            publisher,
        }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::publish::publisher::recording::RecordingPublisher;
        Self::fake_with_publisher(Arc::new(RecordingPublisher::default()))
    }

    #[cfg(test)]
    pub fn fake_with_publisher(publisher: Arc<dyn MessagePublisher>) -> Self {
        use crate::config::{BrokerConfig, DatabaseConfig, JwtConfig};
        use crate::users::memory::InMemoryUserStore;

        let config = Arc::new(AppConfig {
            database: DatabaseConfig {
                url: None,
                host: "localhost".into(),
                port: 5432,
                user: "postgres".into(),
                password: "postgres".into(),
                name: "accounts".into(),
                max_connections: 1,
            },
            jwt: JwtConfig {
                secret: "test-secret".into(),
                ttl_hours: 24,
            },
            broker: BrokerConfig {
                url: "amqp://fake".into(),
                queue: "test-queue".into(),
            },
            host: "127.0.0.1".into(),
            port: 0,
            basic_auth: None,
        });

        Self::from_parts(config, Arc::new(InMemoryUserStore::new()), publisher)
    }
}
