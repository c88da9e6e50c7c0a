//! Server Configuration

/// Settings read from the environment at startup
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    /// Listen address
    pub bind_addr: String,

    /// Owner of sessions made through `/create_session` without a `user_id`
    pub default_user_id: String,

    /// Owner of sessions made implicitly by `/chat`
    pub chat_user_id: String,

    /// Cap on live sessions; `None` means unbounded
    pub max_sessions: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8000".into(),
            default_user_id: "default_user".into(),
            chat_user_id: "default_user_chat".into(),
            max_sessions: None,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read `BIND_ADDR` and `AGENT_MAX_SESSIONS` through `lookup`
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(addr) = lookup("BIND_ADDR").filter(|v| !v.is_empty()) {
            config.bind_addr = addr;
        }
        config.max_sessions = lookup("AGENT_MAX_SESSIONS").and_then(|v| v.parse().ok());

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(|_| None);
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.bind_addr, "127.0.0.1:8000");
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(|key| match key {
            "BIND_ADDR" => Some("0.0.0.0:3000".into()),
            "AGENT_MAX_SESSIONS" => Some("100".into()),
            _ => None,
        });
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.max_sessions, Some(100));
    }
}
