//! CLI Configuration

/// Settings for one terminal conversation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CliConfig {
    /// Owner of the conversation's session
    pub user_id: String,

    /// First message sent on the user's behalf; `None` skips it
    pub greeting: Option<String>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            user_id: "user1".into(),
            greeting: Some("Hi".into()),
        }
    }
}

impl CliConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read `AGENT_CLI_GREETING` through `lookup`. An empty value disables the greeting.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(greeting) = lookup("AGENT_CLI_GREETING") {
            config.greeting = Some(greeting).filter(|g| !g.trim().is_empty());
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CliConfig::from_lookup(|_| None);
        assert_eq!(config.user_id, "user1");
        assert_eq!(config.greeting.as_deref(), Some("Hi"));
    }

    #[test]
    fn test_greeting_override_and_disable() {
        let config = CliConfig::from_lookup(|key| {
            (key == "AGENT_CLI_GREETING").then(|| "Hello agent".to_string())
        });
        assert_eq!(config.greeting.as_deref(), Some("Hello agent"));

        let config = CliConfig::from_lookup(|key| (key == "AGENT_CLI_GREETING").then(String::new));
        assert_eq!(config.greeting, None);
    }
}
