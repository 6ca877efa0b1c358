use crate::auth::jwt::JwtConfig;

/// Deployment mode. Development echoes raw error detail to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" | "local" => Self::Development,
            _ => Self::Production,
        }
    }

    pub fn is_development(self) -> bool {
        self == Self::Development
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development. External service clients load their own settings
/// (`MailgunConfig`, `StripeConfig`, `DomainApiConfig`, `SiteBuilderConfig`).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
    pub app_env: AppEnv,
    /// Postgres URL. `None` runs against the in-process store.
    pub database_url: Option<String>,
    pub jwt: JwtConfig,
    /// Salt mixed into verification-code storage keys.
    pub verification_salt: String,
    /// Stripe webhook signing secret (`whsec_...`).
    pub stripe_webhook_secret: String,
    /// Public URL of the web client, used in checkout and email links.
    pub app_base_url: String,
    pub upload_dir: String,
    pub upload_public_base_url: String,
    /// Take the client IP from the last `X-Forwarded-For` hop. Only safe
    /// behind a reverse proxy that appends to that header.
    pub trust_proxy_headers: bool,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                          |
    /// |--------------------------|----------------------------------|
    /// | `HOST`                   | `0.0.0.0`                        |
    /// | `PORT`                   | `3000`                           |
    /// | `CORS_ORIGINS`           | `http://localhost:3001`          |
    /// | `REQUEST_TIMEOUT_SECS`   | `30`                             |
    /// | `APP_ENV`                | `production`                     |
    /// | `DATABASE_URL`           | unset (in-process store)         |
    /// | `VERIFICATION_SALT`      | `webdash-verification`           |
    /// | `STRIPE_WEBHOOK_SECRET`  | empty (all webhooks rejected)    |
    /// | `APP_BASE_URL`           | `http://localhost:3001`          |
    /// | `UPLOAD_DIR`             | `./uploads`                      |
    /// | `UPLOAD_PUBLIC_BASE_URL` | `http://localhost:3000/uploads`  |
    /// | `TRUST_PROXY_HEADERS`    | `false`                          |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3001".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let app_env = AppEnv::parse(&std::env::var("APP_ENV").unwrap_or_default());

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            app_env,
            database_url: std::env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()),
            jwt: JwtConfig::from_env(),
            verification_salt: std::env::var("VERIFICATION_SALT")
                .unwrap_or_else(|_| "webdash-verification".into()),
            stripe_webhook_secret: std::env::var("STRIPE_WEBHOOK_SECRET").unwrap_or_default(),
            app_base_url: std::env::var("APP_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3001".into()),
            upload_dir: std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "./uploads".into()),
            upload_public_base_url: std::env::var("UPLOAD_PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000/uploads".into()),
            trust_proxy_headers: std::env::var("TRUST_PROXY_HEADERS")
                .is_ok_and(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes")),
        }
    }

    /// Web client URL for a path (`"/dashboard"` -> `"{app_base_url}/dashboard"`).
    pub fn app_url(&self, path: &str) -> String {
        format!("{}{path}", self.app_base_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_env_parsing() {
        assert_eq!(AppEnv::parse("development"), AppEnv::Development);
        assert_eq!(AppEnv::parse(" DEV "), AppEnv::Development);
        assert_eq!(AppEnv::parse("production"), AppEnv::Production);
        assert_eq!(AppEnv::parse(""), AppEnv::Production);
    }
}
