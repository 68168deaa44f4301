//! Configuration loading
//!
//! Values resolve in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! Content-adapter credentials stay optional at load time; each adapter
//! validates presence and format when it is actually called, so a missing
//! news key degrades that one endpoint instead of failing startup.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;

const DEFAULT_SITE_URL: &str = "http://localhost:3000";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 5780;

/// Resolved service configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the hosted record store (None only for in-memory mode)
    pub store_url: Option<String>,
    /// Anonymous API key for the hosted record store
    pub store_anon_key: Option<String>,
    /// Search-provider API key, must carry the `tvly-` prefix
    pub tavily_api_key: Option<String>,
    /// Access token for the tagged-article API
    pub qiita_access_token: Option<String>,
    /// Public site URL, used to build auth callback redirect links
    pub site_url: String,
    /// Bind host for the HTTP server
    pub host: String,
    /// Bind port for the HTTP server
    pub port: u16,
}

/// Command-line overrides passed through from the binary's argument parser
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub config_path: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Optional keys as they appear in the TOML config file
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    store_url: Option<String>,
    store_anon_key: Option<String>,
    tavily_api_key: Option<String>,
    qiita_access_token: Option<String>,
    site_url: Option<String>,
    host: Option<String>,
    port: Option<u16>,
}

impl Config {
    /// Load configuration using the CLI > env > file > default priority order
    pub fn load(overrides: &Overrides) -> Result<Self> {
        let file = load_config_file(overrides.config_path.as_deref())?;

        let host = overrides
            .host
            .clone()
            .or_else(|| env_var("CSHUB_HOST"))
            .or(file.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match overrides.port {
            Some(p) => p,
            None => match env_var("CSHUB_PORT") {
                Some(raw) => raw
                    .parse()
                    .map_err(|_| Error::Config(format!("CSHUB_PORT is not a port number: {}", raw)))?,
                None => file.port.unwrap_or(DEFAULT_PORT),
            },
        };

        Ok(Self {
            store_url: env_var("CSHUB_STORE_URL").or(file.store_url),
            store_anon_key: env_var("CSHUB_STORE_ANON_KEY").or(file.store_anon_key),
            tavily_api_key: env_var("TAVILY_API_KEY").or(file.tavily_api_key),
            qiita_access_token: env_var("QIITA_ACCESS_TOKEN").or(file.qiita_access_token),
            site_url: env_var("CSHUB_SITE_URL")
                .or(file.site_url)
                .unwrap_or_else(|| DEFAULT_SITE_URL.to_string()),
            host,
            port,
        })
    }

    /// Store URL, required outside of in-memory mode
    pub fn require_store_url(&self) -> Result<&str> {
        self.store_url
            .as_deref()
            .ok_or_else(|| Error::Config("CSHUB_STORE_URL is not set".to_string()))
    }

    /// Store anonymous key, required outside of in-memory mode
    pub fn require_store_anon_key(&self) -> Result<&str> {
        self.store_anon_key
            .as_deref()
            .ok_or_else(|| Error::Config("CSHUB_STORE_ANON_KEY is not set".to_string()))
    }

    /// Search-provider key, validated for presence and the `tvly-` prefix.
    /// Adapters call this per request so a missing key is a typed error,
    /// not a startup failure or an unauthenticated outbound call.
    pub fn tavily_key(&self) -> Result<&str> {
        let key = self
            .tavily_api_key
            .as_deref()
            .ok_or_else(|| Error::Config("TAVILY_API_KEY is not set".to_string()))?;

        if !key.starts_with("tvly-") {
            return Err(Error::Config(
                "TAVILY_API_KEY is malformed: Tavily keys start with \"tvly-\"".to_string(),
            ));
        }

        Ok(key)
    }

    /// Article-feed access token, validated for presence
    pub fn qiita_token(&self) -> Result<&str> {
        self.qiita_access_token
            .as_deref()
            .ok_or_else(|| Error::Config("QIITA_ACCESS_TOKEN is not set".to_string()))
    }

    /// Normalized site URL: scheme added when missing, trailing slash ensured
    pub fn normalized_site_url(&self) -> String {
        let mut url = self.site_url.clone();
        if !url.contains("http") {
            url = format!("https://{}", url);
        }
        if !url.ends_with('/') {
            url.push('/');
        }
        url
    }

    /// Redirect target for auth email links
    pub fn auth_callback_url(&self) -> String {
        format!("{}auth/callback", self.normalized_site_url())
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Read the TOML config file if one exists.
///
/// An explicitly named file must exist and parse; the default location
/// (`~/.config/cshub/config.toml`) is optional.
fn load_config_file(explicit: Option<&std::path::Path>) -> Result<FileConfig> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => match env_var("CSHUB_CONFIG") {
            Some(p) => PathBuf::from(p),
            None => {
                let Some(default) = dirs::config_dir().map(|d| d.join("cshub").join("config.toml"))
                else {
                    return Ok(FileConfig::default());
                };
                if !default.exists() {
                    return Ok(FileConfig::default());
                }
                default
            }
        },
    };

    let raw = std::fs::read_to_string(&path)
        .map_err(|e| Error::Config(format!("cannot read config file {}: {}", path.display(), e)))?;

    toml::from_str(&raw)
        .map_err(|e| Error::Config(format!("cannot parse config file {}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const ENV_KEYS: [&str; 7] = [
        "CSHUB_STORE_URL",
        "CSHUB_STORE_ANON_KEY",
        "TAVILY_API_KEY",
        "QIITA_ACCESS_TOKEN",
        "CSHUB_SITE_URL",
        "CSHUB_HOST",
        "CSHUB_PORT",
    ];

    fn clear_env() {
        for key in ENV_KEYS {
            std::env::remove_var(key);
        }
        std::env::remove_var("CSHUB_CONFIG");
    }

    #[test]
    #[serial]
    fn test_defaults_when_nothing_set() {
        clear_env();
        let config = Config::load(&Overrides::default()).unwrap();
        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.site_url, DEFAULT_SITE_URL);
        assert!(config.store_url.is_none());
        assert!(config.tavily_api_key.is_none());
    }

    #[test]
    #[serial]
    fn test_env_overrides_defaults() {
        clear_env();
        std::env::set_var("CSHUB_STORE_URL", "https://example.supabase.co");
        std::env::set_var("CSHUB_PORT", "8080");
        let config = Config::load(&Overrides::default()).unwrap();
        assert_eq!(config.store_url.as_deref(), Some("https://example.supabase.co"));
        assert_eq!(config.port, 8080);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_cli_overrides_env() {
        clear_env();
        std::env::set_var("CSHUB_HOST", "0.0.0.0");
        let overrides = Overrides {
            host: Some("192.168.1.10".to_string()),
            ..Overrides::default()
        };
        let config = Config::load(&overrides).unwrap();
        assert_eq!(config.host, "192.168.1.10");
        clear_env();
    }

    #[test]
    #[serial]
    fn test_missing_tavily_key_is_typed_config_error() {
        clear_env();
        let config = Config::load(&Overrides::default()).unwrap();
        let err = config.tavily_key().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    #[serial]
    fn test_malformed_tavily_key_rejected() {
        clear_env();
        std::env::set_var("TAVILY_API_KEY", "sk-not-a-tavily-key");
        let config = Config::load(&Overrides::default()).unwrap();
        let err = config.tavily_key().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_valid_tavily_key_accepted() {
        clear_env();
        std::env::set_var("TAVILY_API_KEY", "tvly-abc123");
        let config = Config::load(&Overrides::default()).unwrap();
        assert_eq!(config.tavily_key().unwrap(), "tvly-abc123");
        clear_env();
    }

    #[test]
    #[serial]
    fn test_site_url_normalization() {
        clear_env();
        std::env::set_var("CSHUB_SITE_URL", "cshub.example.com");
        let config = Config::load(&Overrides::default()).unwrap();
        assert_eq!(config.normalized_site_url(), "https://cshub.example.com/");
        assert_eq!(
            config.auth_callback_url(),
            "https://cshub.example.com/auth/callback"
        );
        clear_env();
    }

    #[test]
    #[serial]
    fn test_site_url_trailing_slash_preserved() {
        clear_env();
        std::env::set_var("CSHUB_SITE_URL", "http://localhost:3000/");
        let config = Config::load(&Overrides::default()).unwrap();
        assert_eq!(config.normalized_site_url(), "http://localhost:3000/");
        clear_env();
    }
}
