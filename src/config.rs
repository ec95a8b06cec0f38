//! Configuration module

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

/// Default location of the fitted column transformer
pub const DEFAULT_PREPROCESSOR_PATH: &str = "artifacts/preprocessor.json";

/// Default location of the trained tree ensemble
pub const DEFAULT_MODEL_PATH: &str = "artifacts/xgboost_model.json";

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Interface the form is served on
    pub bind_address: IpAddr,

    /// Server port
    pub port: u16,

    /// Preprocessor artifact
    pub preprocessor_path: PathBuf,

    /// Classifier artifact
    pub model_path: PathBuf,

    /// Environment (development, production)
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            bind_address: env::var("BIND_ADDRESS")
                .ok()
                .and_then(|a| a.parse().ok())
                .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST)),

            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8501),

            preprocessor_path: env::var("PREPROCESSOR_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_PREPROCESSOR_PATH)),

            model_path: env::var("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_MODEL_PATH)),

            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Socket the listener binds to
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 8501,
            preprocessor_path: PathBuf::from(DEFAULT_PREPROCESSOR_PATH),
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            environment: "development".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.is_production());
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:8501");
        assert!(config.model_path.ends_with("xgboost_model.json"));
    }
}
