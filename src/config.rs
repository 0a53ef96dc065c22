use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

/// Credentials for the bootstrap ADMIN account created at startup
/// when no user with that username exists yet.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub images_dir: String,
    pub results_dir: String,
    pub admin: Option<AdminConfig>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "wristsight".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "wristsight-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
        };
        let images_dir = std::env::var("IMAGES_DIR").unwrap_or_else(|_| "static/images".into());
        let results_dir = std::env::var("RESULTS_DIR").unwrap_or_else(|_| "static/results".into());

        // Only bootstrap an admin when a password is actually provided.
        let admin = std::env::var("ADMIN_PASSWORD")
            .ok()
            .map(|password| AdminConfig {
                email: std::env::var("ADMIN_EMAIL")
                    .unwrap_or_else(|_| "admin@wristsight.ai".into()),
                username: std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".into()),
                password,
            });

        Ok(Self {
            database_url,
            jwt,
            images_dir,
            results_dir,
            admin,
        })
    }
}
