use serde::{Deserialize, Serialize};

/// Client configuration from `client.yaml`
///
/// Every field has a default, so a partial or missing file is valid.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Where the detection service lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiSettings {
    /// HTTP origin plus the `/api` prefix
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Applies to connection setup only; requests themselves never time out
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_dir")]
    pub dir: String,

    #[serde(default = "default_log_prefix")]
    pub prefix: String,

    #[serde(default)]
    pub debug_mode: bool,

    #[serde(default = "default_console")]
    pub console: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            dir: default_log_dir(),
            prefix: default_log_prefix(),
            debug_mode: false,
            console: default_console(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:5000/api".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_log_prefix() -> String {
    "tvd-client".to_string()
}

fn default_console() -> bool {
    true
}

impl ApiSettings {
    /// Join an endpoint path onto the base address.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.api.base_url, "http://localhost:5000/api");
        assert_eq!(config.api.connect_timeout_secs, 10);
        assert_eq!(config.logging.dir, "logs");
        assert!(!config.logging.debug_mode);
        assert!(config.logging.console);
    }

    #[test]
    fn test_endpoint_join() {
        let mut api = ApiSettings::default();
        assert_eq!(api.endpoint("/health"), "http://localhost:5000/api/health");

        api.base_url = "http://10.0.0.5:8080/api/".to_string();
        assert_eq!(api.endpoint("process/realtime"), "http://10.0.0.5:8080/api/process/realtime");
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config: ClientConfig =
            serde_yaml_ng::from_str("api:\n  base_url: http://example.test/api\n").unwrap();
        assert_eq!(config.api.base_url, "http://example.test/api");
        assert_eq!(config.api.connect_timeout_secs, 10);
        assert_eq!(config.logging, LoggingSettings::default());
    }
}
