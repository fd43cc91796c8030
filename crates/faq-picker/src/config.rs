use std::time::Duration;

use crate::error::AppError;

const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

/// Application configuration loaded explicitly from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the chatbot backend serving the rule, location and FAQ documents.
    pub backend_url: String,
    /// Per-request timeout for the source fetches.
    pub fetch_timeout: Duration,
    /// Redis connection URL. `None` disables caching.
    pub redis_url: Option<String>,
    /// Address for the JSON HTTP surface, e.g. "0.0.0.0:8080". `None` disables it.
    pub http_addr: Option<String>,
    /// Serve MCP over TCP on this address instead of stdio.
    pub mcp_tcp_addr: Option<String>,
}

impl Config {
    /// Required:
    /// - `FAQ_BACKEND_URL`: base URL of the chatbot backend
    ///
    /// Optional:
    /// - `FAQ_FETCH_TIMEOUT_SECS` (default: 10)
    /// - `REDIS_URL`
    /// - `PICKER_HTTP_ADDR`
    /// - `MCP_TCP_LISTEN_ADDR`
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let backend_url = lookup("FAQ_BACKEND_URL")
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                AppError::Config("FAQ_BACKEND_URL environment variable is required".to_string())
            })?;
        if !backend_url.starts_with("http://") && !backend_url.starts_with("https://") {
            return Err(AppError::Config(format!(
                "FAQ_BACKEND_URL must be an http(s) URL, got '{backend_url}'"
            )));
        }

        let fetch_timeout = match lookup("FAQ_FETCH_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|&n| n > 0)
                .map(Duration::from_secs)
                .ok_or_else(|| {
                    AppError::Config(format!(
                        "FAQ_FETCH_TIMEOUT_SECS must be a positive integer, got '{raw}'"
                    ))
                })?,
            None => Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
        };

        Ok(Self {
            backend_url,
            fetch_timeout,
            redis_url: lookup("REDIS_URL"),
            http_addr: lookup("PICKER_HTTP_ADDR"),
            mcp_tcp_addr: lookup("MCP_TCP_LISTEN_ADDR"),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<Config, AppError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn backend_url_is_required() {
        assert!(matches!(config(&[]), Err(AppError::Config(_))));
        assert!(matches!(
            config(&[("FAQ_BACKEND_URL", "  ")]),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn defaults_apply() {
        let cfg = config(&[("FAQ_BACKEND_URL", "http://backend:5000/")]).unwrap();
        assert_eq!(cfg.backend_url, "http://backend:5000");
        assert_eq!(cfg.fetch_timeout, Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS));
        assert!(cfg.redis_url.is_none());
        assert!(cfg.http_addr.is_none());
        assert!(cfg.mcp_tcp_addr.is_none());
    }

    #[test]
    fn rejects_bad_values() {
        assert!(config(&[("FAQ_BACKEND_URL", "backend:5000")]).is_err());
        assert!(config(&[
            ("FAQ_BACKEND_URL", "http://backend"),
            ("FAQ_FETCH_TIMEOUT_SECS", "soon")
        ])
        .is_err());
        assert!(config(&[
            ("FAQ_BACKEND_URL", "http://backend"),
            ("FAQ_FETCH_TIMEOUT_SECS", "0")
        ])
        .is_err());
    }

    #[test]
    fn optional_values_are_read() {
        let cfg = config(&[
            ("FAQ_BACKEND_URL", "https://school.example"),
            ("FAQ_FETCH_TIMEOUT_SECS", "3"),
            ("REDIS_URL", "redis://127.0.0.1:6379"),
            ("PICKER_HTTP_ADDR", "127.0.0.1:8080"),
        ])
        .unwrap();
        assert_eq!(cfg.fetch_timeout, Duration::from_secs(3));
        assert_eq!(cfg.redis_url.as_deref(), Some("redis://127.0.0.1:6379"));
        assert_eq!(cfg.http_addr.as_deref(), Some("127.0.0.1:8080"));
    }
}
