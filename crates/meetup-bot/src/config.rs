//! Server configuration.

use std::time::Instant;

use meetup_messenger::DEFAULT_GRAPH_URL;

/// Payload sent by the Get Started button.
pub const DEFAULT_START_PAYLOAD: &str = "get_started";

/// Webhook server configuration.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to bind to.
    pub port: u16,
    /// Token Messenger must echo back when verifying the webhook.
    pub verify_token: String,
    /// When set, entries for other pages are ignored.
    pub page_id: Option<String>,
    /// Graph API base URL.
    pub graph_url: String,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl BotConfig {
    /// Creates a configuration bound to localhost.
    pub fn new(verify_token: impl Into<String>) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            verify_token: verify_token.into(),
            page_id: None,
            graph_url: DEFAULT_GRAPH_URL.to_string(),
            start_time: Instant::now(),
        }
    }

    /// Sets host and port.
    pub fn with_bind(mut self, host: impl Into<String>, port: u16) -> Self {
        self.host = host.into();
        self.port = port;
        self
    }

    /// Restricts handling to one page.
    pub fn with_page_id(mut self, page_id: Option<String>) -> Self {
        self.page_id = page_id.filter(|id| !id.is_empty());
        self
    }

    /// Overrides the Graph API base URL.
    pub fn with_graph_url(mut self, url: impl Into<String>) -> Self {
        self.graph_url = url.into();
        self
    }

    /// Returns the bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the uptime in seconds.
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Whether an entry addressed to `page_id` should be handled.
    pub fn accepts_page(&self, page_id: Option<&str>) -> bool {
        match (&self.page_id, page_id) {
            (None, _) => true,
            (Some(expected), Some(actual)) => expected == actual,
            (Some(_), None) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = BotConfig::new("verify");
        assert_eq!(config.bind_address(), "127.0.0.1:8000");
        assert_eq!(config.graph_url, DEFAULT_GRAPH_URL);
        assert!(config.page_id.is_none());
    }

    #[test]
    fn test_config_builders() {
        let config = BotConfig::new("verify")
            .with_bind("0.0.0.0", 9000)
            .with_page_id(Some("PAGE".into()))
            .with_graph_url("http://localhost:1234");
        assert_eq!(config.bind_address(), "0.0.0.0:9000");
        assert_eq!(config.page_id.as_deref(), Some("PAGE"));
        assert_eq!(config.graph_url, "http://localhost:1234");
    }

    #[test]
    fn test_empty_page_id_is_unset() {
        let config = BotConfig::new("v").with_page_id(Some(String::new()));
        assert!(config.page_id.is_none());
    }

    #[test]
    fn test_accepts_page() {
        let open = BotConfig::new("v");
        assert!(open.accepts_page(Some("any")));
        assert!(open.accepts_page(None));

        let scoped = BotConfig::new("v").with_page_id(Some("PAGE".into()));
        assert!(scoped.accepts_page(Some("PAGE")));
        assert!(!scoped.accepts_page(Some("OTHER")));
        assert!(!scoped.accepts_page(None));
    }
}
