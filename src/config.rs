use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use crate::engine::{Settings, DEFAULT_MAX_STOPS, DEFAULT_SOLVE_TIMEOUT};
use crate::error::{config_error, Error};
use crate::external::arcgis::SAMPLE_ROUTE_SERVICE_URL;

pub const DEFAULT_SERVER_ADDR: &str = "127.0.0.1:3000";

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub route_service_url: String,
    pub api_key: Option<String>,
    pub solve_timeout: Duration,
    pub max_stops: usize,
    pub server_addr: SocketAddr,
}

impl Config {
    /// Reads the configuration from process environment variables.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let route_service_url = lookup("ROUTE_SERVICE_URL")
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| SAMPLE_ROUTE_SERVICE_URL.into());

        let api_key = lookup("ARCGIS_API_KEY").filter(|key| !key.trim().is_empty());

        let solve_timeout = match lookup("SOLVE_TIMEOUT_MS") {
            Some(value) => {
                let millis: u64 = value
                    .trim()
                    .parse()
                    .map_err(|_| config_error("SOLVE_TIMEOUT_MS"))?;
                if millis == 0 {
                    return Err(config_error("SOLVE_TIMEOUT_MS"));
                }
                Duration::from_millis(millis)
            }
            None => DEFAULT_SOLVE_TIMEOUT,
        };

        let max_stops = match lookup("MAX_STOPS") {
            Some(value) => {
                let max_stops: usize = value
                    .trim()
                    .parse()
                    .map_err(|_| config_error("MAX_STOPS"))?;
                if max_stops < DEFAULT_MAX_STOPS {
                    return Err(config_error("MAX_STOPS"));
                }
                max_stops
            }
            None => DEFAULT_MAX_STOPS,
        };

        let server_addr: SocketAddr = lookup("SERVER_ADDR")
            .unwrap_or_else(|| DEFAULT_SERVER_ADDR.into())
            .trim()
            .parse()
            .map_err(|_| config_error("SERVER_ADDR"))?;

        Ok(Self {
            route_service_url,
            api_key,
            solve_timeout,
            max_stops,
            server_addr,
        })
    }

    pub fn session_settings(&self) -> Settings {
        Settings {
            solve_timeout: self.solve_timeout,
            max_stops: self.max_stops,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, Error> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_variables() {
        let config = config(&[]).unwrap();

        assert_eq!(config.route_service_url, SAMPLE_ROUTE_SERVICE_URL);
        assert_eq!(config.api_key, None);
        assert_eq!(config.session_settings(), Settings::default());
        assert_eq!(config.server_addr, DEFAULT_SERVER_ADDR.parse().unwrap());
    }

    #[test]
    fn reads_overrides() {
        let config = config(&[
            ("ROUTE_SERVICE_URL", "https://example.com/NAServer/Route"),
            ("ARCGIS_API_KEY", "secret"),
            ("SOLVE_TIMEOUT_MS", "2500"),
            ("MAX_STOPS", "3"),
            ("SERVER_ADDR", "0.0.0.0:8080"),
        ])
        .unwrap();

        assert_eq!(config.route_service_url, "https://example.com/NAServer/Route");
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.solve_timeout, Duration::from_millis(2500));
        assert_eq!(config.max_stops, 3);
        assert_eq!(config.server_addr.port(), 8080);
    }

    #[test]
    fn rejects_invalid_values() {
        assert_eq!(
            config(&[("SOLVE_TIMEOUT_MS", "soon")]).unwrap_err(),
            config_error("SOLVE_TIMEOUT_MS")
        );
        assert!(config(&[("SOLVE_TIMEOUT_MS", "0")]).is_err());
        assert!(config(&[("MAX_STOPS", "1")]).is_err());
        assert!(config(&[("SERVER_ADDR", "nowhere")]).is_err());
    }
}
