use chrono::Duration;

/// First operator account, seeded at startup so a fresh deployment is not
/// locked out of the `/admin` console. Registration never hands out the
/// operator role.
#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
}

/// Runtime settings, read once at startup.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: String,
    pub jwt_secret: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl ApiConfig {
    pub fn from_env() -> Self {
        let bind_addr =
            std::env::var("PLURIBUS_BIND").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            "dev-secret".to_string()
        });

        let access_ttl = Duration::minutes(env_i64("ACCESS_TOKEN_TTL_MINUTES", 15));
        let refresh_ttl = Duration::days(env_i64("REFRESH_TOKEN_TTL_DAYS", 30));

        let bootstrap_admin = match (
            std::env::var("ADMIN_EMAIL"),
            std::env::var("ADMIN_PASSWORD"),
        ) {
            (Ok(email), Ok(password)) => Some(BootstrapAdmin { email, password }),
            (Ok(_), Err(_)) | (Err(_), Ok(_)) => {
                tracing::warn!("ADMIN_EMAIL and ADMIN_PASSWORD must both be set; skipping bootstrap admin");
                None
            }
            (Err(_), Err(_)) => None,
        };

        Self {
            bind_addr,
            jwt_secret,
            access_ttl,
            refresh_ttl,
            bootstrap_admin,
        }
    }

    /// Settings for in-process test servers: ephemeral port, short-lived
    /// refresh tokens, no seeded operator.
    pub fn for_tests(jwt_secret: &str) -> Self {
        Self {
            bind_addr: "127.0.0.1:0".to_string(),
            jwt_secret: jwt_secret.to_string(),
            access_ttl: Duration::minutes(15),
            refresh_ttl: Duration::days(1),
            bootstrap_admin: None,
        }
    }
}

fn env_i64(key: &str, default: i64) -> i64 {
    match std::env::var(key) {
        Ok(raw) => match raw.parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!(key, raw, "not a number; using default {default}");
                default
            }
        },
        Err(_) => default,
    }
}
