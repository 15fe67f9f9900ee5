// Configuration types module
// Defines all configuration-related data structures

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub image: ImageConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub performance: PerformanceConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Runtime worker threads, CPU count when unset
    #[serde(default)]
    pub workers: Option<usize>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

const fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

/// Storage directory configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Directory holding stored files, relative paths resolve against the working directory
    #[serde(default = "default_storage_dir")]
    pub dir: String,
    /// Cap on the whole multipart body, in bytes
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: u64,
}

fn default_storage_dir() -> String {
    "./storage".to_string()
}

const fn default_max_upload_size() -> u64 {
    10 << 20
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: default_storage_dir(),
            max_upload_size: default_max_upload_size(),
        }
    }
}

/// Image downsampling configuration
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct ImageConfig {
    /// Images wider than this are scaled down to it
    #[serde(default = "default_max_width")]
    pub max_width: u32,
    /// JPEG encoder quality (1-100)
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
    /// Re-encode PNG uploads as PNG instead of JPEG
    #[serde(default)]
    pub preserve_png: bool,
    /// Largest decoded image accepted, in pixels
    #[serde(default = "default_max_pixels")]
    pub max_pixels: u64,
}

const fn default_max_width() -> u32 {
    1000
}

const fn default_jpeg_quality() -> u8 {
    75
}

const fn default_max_pixels() -> u64 {
    40_000_000
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            max_width: default_max_width(),
            jpeg_quality: default_jpeg_quality(),
            preserve_png: false,
            max_pixels: default_max_pixels(),
        }
    }
}

/// HTTP configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    /// Value of the `Server` response header
    #[serde(default = "default_server_name")]
    pub server_name: String,
    /// Report client faults as 4xx instead of 500
    #[serde(default)]
    pub strict_status: bool,
}

fn default_server_name() -> String {
    "upload-server".to_string()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            server_name: default_server_name(),
            strict_status: false,
        }
    }
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// `debug`, `info`, `warn` or `error`
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_access_log")]
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

const fn default_access_log() -> bool {
    true
}

fn default_access_log_format() -> String {
    "combined".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            access_log: default_access_log(),
            access_log_format: default_access_log_format(),
            access_log_file: None,
            error_log_file: None,
        }
    }
}

/// Performance configuration
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct PerformanceConfig {
    #[serde(default = "default_timeout")]
    pub read_timeout: u64,
    #[serde(default = "default_timeout")]
    pub write_timeout: u64,
    #[serde(default = "default_keep_alive")]
    pub keep_alive: bool,
}

const fn default_timeout() -> u64 {
    30
}

const fn default_keep_alive() -> bool {
    true
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            read_timeout: default_timeout(),
            write_timeout: default_timeout(),
            keep_alive: default_keep_alive(),
        }
    }
}
