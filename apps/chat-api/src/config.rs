/// Chat API configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection string. When unset, all state is kept in memory.
    pub database_url: Option<String>,
    /// Port the HTTP server binds to.
    pub port: u16,
    /// Name of the cookie carrying the transport session.
    pub session_cookie_name: String,
    /// Whether the session cookie is marked `Secure`.
    pub session_cookie_secure: bool,
    /// How often the chat page polls `/api/chat/update`.
    pub poll_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            port: 8080,
            session_cookie_name: "chatroom_session".to_string(),
            session_cookie_secure: false,
            poll_interval_secs: 10,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Unparseable values fall back to their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            database_url: lookup("DATABASE_URL").filter(|s| !s.is_empty()),
            port: lookup("PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            session_cookie_name: lookup("SESSION_COOKIE_NAME")
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.session_cookie_name),
            session_cookie_secure: lookup("SESSION_COOKIE_SECURE")
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.session_cookie_secure),
            poll_interval_secs: lookup("POLL_INTERVAL_SECS")
                .and_then(|v| v.parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.poll_interval_secs),
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
