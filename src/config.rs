use anyhow::Context;
use serde::Deserialize;
use sqlx::postgres::PgConnectOptions;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl_hours: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Full connection URL; takes precedence over the discrete fields when set.
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BrokerConfig {
    pub url: String,
    pub queue: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BasicAuthConfig {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub broker: BrokerConfig,
    pub host: String,
    pub port: u16,
    pub basic_auth: Option<BasicAuthConfig>,
}

impl DatabaseConfig {
    pub fn connect_options(&self) -> anyhow::Result<PgConnectOptions> {
        if let Some(url) = &self.url {
            return url.parse().context("parse DATABASE_URL");
        }
        Ok(PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.name))
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database = DatabaseConfig {
            url: std::env::var("DATABASE_URL").ok(),
            host: std::env::var("DB_HOST").unwrap_or_else(|_| "localhost".into()),
            port: parse_env("DB_PORT", 5432),
            user: std::env::var("DB_USER").unwrap_or_else(|_| "postgres".into()),
            password: std::env::var("DB_PASSWORD").unwrap_or_default(),
            name: std::env::var("DB_NAME").unwrap_or_else(|_| "accounts".into()),
            max_connections: parse_env("DB_MAX_CONNECTIONS", 10),
        };

        let secret = std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
        anyhow::ensure!(!secret.trim().is_empty(), "JWT_SECRET must not be empty");
        let jwt = JwtConfig {
            secret,
            ttl_hours: parse_env("JWT_TTL_HOURS", 24),
        };

        let broker = BrokerConfig {
            url: std::env::var("RABBITMQ_URL").context("RABBITMQ_URL must be set")?,
            queue: std::env::var("PUBLISH_QUEUE").unwrap_or_else(|_| "app-messages".into()),
        };

        let basic_auth = match (
            std::env::var("BASIC_AUTH_USERNAME"),
            std::env::var("BASIC_AUTH_PASSWORD"),
        ) {
            (Ok(username), Ok(password)) if !username.is_empty() && !password.is_empty() => {
                Some(BasicAuthConfig { username, password })
            }
            _ => None,
        };

        let port = std::env::var("PORT")
            .or_else(|_| std::env::var("APP_PORT"))
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(8080);

        Ok(Self {
            database,
            jwt,
            broker,
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port,
            basic_auth,
        })
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db(url: Option<&str>) -> DatabaseConfig {
        DatabaseConfig {
            url: url.map(Into::into),
            host: "db.internal".into(),
            port: 6543,
            user: "svc".into(),
            password: "pw".into(),
            name: "accounts".into(),
            max_connections: 5,
        }
    }

    #[test]
    fn connect_options_from_discrete_fields() {
        let opts = db(None).connect_options().expect("options");
        assert_eq!(opts.get_host(), "db.internal");
        assert_eq!(opts.get_port(), 6543);
        assert_eq!(opts.get_username(), "svc");
        assert_eq!(opts.get_database(), Some("accounts"));
    }

    #[test]
    fn connect_options_prefers_url() {
        let opts = db(Some("postgres://u:p@other:5432/main"))
            .connect_options()
            .expect("options");
        assert_eq!(opts.get_host(), "other");
        assert_eq!(opts.get_database(), Some("main"));
    }

    #[test]
    fn parse_env_falls_back_on_garbage() {
        std::env::set_var("ACCOUNTS_TEST_PARSE_ENV", "not-a-number");
        assert_eq!(parse_env("ACCOUNTS_TEST_PARSE_ENV", 42u16), 42);
        std::env::set_var("ACCOUNTS_TEST_PARSE_ENV", "7");
        assert_eq!(parse_env("ACCOUNTS_TEST_PARSE_ENV", 42u16), 7);
    }
}
