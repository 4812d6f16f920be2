use serde::Deserialize;

use crate::geofence::GeofenceBounds;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub geofence: GeofenceBounds,
    pub sweep_interval_secs: u64,
    /// `None` means any origin (permissive CORS).
    pub allowed_origins: Option<Vec<String>>,
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "pindrop".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "pindrop-users".into()),
            // Session tokens live for a day unless overridden.
            ttl_minutes: env_i64("JWT_TTL_MINUTES", 60 * 24),
        };
        let geofence = GeofenceBounds {
            south: env_f64("GEOFENCE_SOUTH", 29.62725),
            west: env_f64("GEOFENCE_WEST", -82.37236),
            north: env_f64("GEOFENCE_NORTH", 29.66),
            east: env_f64("GEOFENCE_EAST", -82.30),
        };
        let sweep_interval_secs = std::env::var("SWEEP_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30);
        let allowed_origins = std::env::var("ALLOWED_ORIGINS").ok().and_then(|raw| {
            let list: Vec<String> = raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if list.is_empty() || list.iter().any(|o| o == "*") {
                None
            } else {
                Some(list)
            }
        });
        Ok(Self {
            database_url,
            jwt,
            geofence,
            sweep_interval_secs,
            allowed_origins,
            admin_username: std::env::var("ADMIN_USERNAME").ok(),
            admin_password: std::env::var("ADMIN_PASSWORD").ok(),
        })
    }
}

fn env_i64(key: &str, default: i64) -> i64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(default)
}

fn env_f64(key: &str, default: f64) -> f64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<f64>().ok())
        .unwrap_or(default)
}
