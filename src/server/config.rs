/**
 * Server Configuration
 *
 * Configuration is loaded from environment variables with sensible local
 * defaults. Missing optional pieces (database file, SMTP relay) are logged
 * and the server starts degraded rather than refusing to boot: no database
 * means the in-memory store, no SMTP means verification links go to the
 * log.
 *
 * The one value that must never silently default in production is
 * `SESSION_SECRET`; a generated dev secret is used with a loud warning.
 */

/// SMTP relay settings for the verification mailer.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub username: String,
    pub password: String,
    /// From address, e.g. `Forum <noreply@example.com>`
    pub from: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Path/URL of the sqlite database; `None` selects the memory store
    pub database_url: Option<String>,
    /// HMAC secret for session tokens
    pub session_secret: String,
    /// Whether the session cookie carries the `Secure` attribute
    pub cookie_secure: bool,
    /// Base URL used to build the emailed confirm link
    pub public_base_url: String,
    pub smtp: Option<SmtpConfig>,
}

fn var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

fn var_or(name: &str, default: &str) -> String {
    var(name).unwrap_or_else(|| default.to_string())
}

impl Config {
    /// Load from the environment. Never fails; degraded sections warn.
    pub fn load() -> Self {
        let host = var_or("SERVER_HOST", "0.0.0.0");
        let port = var_or("SERVER_PORT", "3000").parse::<u16>().unwrap_or(3000);

        let database_url = var("DATABASE_URL");
        if database_url.is_none() {
            tracing::warn!("DATABASE_URL not set, using the in-memory store");
        }

        let session_secret = match var("SESSION_SECRET") {
            Some(secret) => secret,
            None => {
                tracing::warn!(
                    "SESSION_SECRET not set, using a generated dev secret; \
                     sessions will not survive a restart"
                );
                uuid::Uuid::new_v4().to_string()
            }
        };

        let production = var_or("APP_ENV", "development") == "production";
        let cookie_secure = match var("COOKIE_SECURE") {
            Some(value) => value == "true" || value == "1",
            None => production,
        };

        let public_base_url = var_or(
            "PUBLIC_BASE_URL",
            &format!("http://localhost:{}", port),
        );

        let smtp = Self::load_smtp();

        Self {
            host,
            port,
            database_url,
            session_secret,
            cookie_secure,
            public_base_url,
            smtp,
        }
    }

    /// SMTP is all-or-nothing: every variable present, or the log mailer.
    fn load_smtp() -> Option<SmtpConfig> {
        let host = var("SMTP_HOST");
        let username = var("SMTP_USERNAME");
        let password = var("SMTP_PASSWORD");
        let from = var("SMTP_FROM");

        match (host, username, password, from) {
            (Some(host), Some(username), Some(password), Some(from)) => Some(SmtpConfig {
                host,
                username,
                password,
                from,
            }),
            (None, None, None, None) => {
                tracing::warn!("SMTP not configured, verification links will be logged");
                None
            }
            _ => {
                tracing::warn!(
                    "SMTP configuration incomplete (need SMTP_HOST, SMTP_USERNAME, \
                     SMTP_PASSWORD, SMTP_FROM), verification links will be logged"
                );
                None
            }
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
