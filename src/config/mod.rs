// Configuration module entry point
// Loads the server configuration and holds the shared runtime state

mod state;
mod types;

use std::net::SocketAddr;
use std::time::Duration;

pub use state::AppState;
pub use types::{
    Config, HttpConfig, ImageConfig, LoggingConfig, PerformanceConfig, ServerConfig,
    StorageConfig,
};

/// Config file consulted when no path is given on the command line
pub const DEFAULT_CONFIG_PATH: &str = "config";

/// Prefix for environment overrides, e.g. `UPLOADER_SERVER__PORT=9000`
const ENV_PREFIX: &str = "UPLOADER";

impl Config {
    /// Load configuration from the default `config.toml` (optional)
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from specified file path (extension optional)
    ///
    /// Missing files are not an error; defaults apply for every absent key and
    /// `UPLOADER_*` environment variables override both.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let cfg: Self = settings.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject values the server cannot run with
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.image.max_width == 0 {
            return Err(config::ConfigError::Message(
                "image.max_width must be greater than 0".to_string(),
            ));
        }
        if !(1..=100).contains(&self.image.jpeg_quality) {
            return Err(config::ConfigError::Message(format!(
                "image.jpeg_quality must be within 1..=100, got {}",
                self.image.jpeg_quality
            )));
        }
        if self.image.max_pixels == 0 {
            return Err(config::ConfigError::Message(
                "image.max_pixels must be greater than 0".to_string(),
            ));
        }
        if self.storage.max_upload_size == 0 {
            return Err(config::ConfigError::Message(
                "storage.max_upload_size must be greater than 0".to_string(),
            ));
        }
        self.get_socket_addr().map_err(config::ConfigError::Message)?;
        Ok(())
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    /// Upper bound for serving one connection
    pub fn connection_timeout(&self) -> Duration {
        Duration::from_secs(std::cmp::max(
            self.performance.read_timeout,
            self.performance.write_timeout,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.storage.dir, "./storage");
        assert_eq!(cfg.storage.max_upload_size, 10_485_760);
        assert_eq!(cfg.image.max_width, 1000);
        assert_eq!(cfg.image.jpeg_quality, 75);
        assert!(!cfg.image.preserve_png);
        assert!(!cfg.http.strict_status);
        assert_eq!(cfg.logging.access_log_format, "combined");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_socket_addr() {
        let cfg = Config::default();
        let addr = cfg.get_socket_addr().unwrap();
        assert_eq!(addr.to_string(), "127.0.0.1:8080");

        let mut bad = Config::default();
        bad.server.host = "not a host".to_string();
        assert!(bad.get_socket_addr().is_err());
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_image_settings() {
        let mut cfg = Config::default();
        cfg.image.max_width = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.image.jpeg_quality = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.image.jpeg_quality = 101;
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.image.max_pixels = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.storage.max_upload_size = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[server]\nport = 9090\n\n[image]\nmax_width = 640\npreserve_png = true\n"
        )
        .unwrap();

        let cfg = Config::load_from(file.path().to_str().unwrap()).unwrap();
        assert_eq!(cfg.server.port, 9090);
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.image.max_width, 640);
        assert!(cfg.image.preserve_png);
        assert_eq!(cfg.image.jpeg_quality, 75);
        assert_eq!(cfg.storage.dir, "./storage");
    }

    #[test]
    fn test_load_rejects_invalid_file_values() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[image]\njpeg_quality = 0\n").unwrap();

        assert!(Config::load_from(file.path().to_str().unwrap()).is_err());
    }

    #[test]
    fn test_connection_timeout_uses_larger_value() {
        let mut cfg = Config::default();
        cfg.performance.read_timeout = 5;
        cfg.performance.write_timeout = 12;
        assert_eq!(cfg.connection_timeout(), Duration::from_secs(12));
    }
}
