// Configuration module entry point
// Loads typed configuration and builds the shared runtime state

mod state;
mod types;

use std::net::SocketAddr;
use std::path::PathBuf;

pub use state::AppState;
pub use types::Config;

/// Config file used when no path is given on the command line
pub const DEFAULT_CONFIG_PATH: &str = "config";

impl Config {
    /// Load configuration from specified file path (without extension)
    ///
    /// The file is optional; `QSERVER__SECTION__KEY` environment variables
    /// override file values.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("QSERVER").separator("__"))
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("storage.root_dir", ".")?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.request_timeout", 30)?
            .set_default("http.server_name", "questionnaire-server")?
            .set_default("http.enable_cors", false)?
            .set_default("http.max_body_size", 10_485_760)? // 10MB
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    /// Resolve `storage.root_dir` to an absolute directory path
    pub fn resolve_root_dir(&self) -> Result<PathBuf, String> {
        let root = PathBuf::from(&self.storage.root_dir);
        let canonical = root
            .canonicalize()
            .map_err(|e| format!("Root directory '{}' is not accessible: {e}", root.display()))?;
        if !canonical.is_dir() {
            return Err(format!(
                "Root directory '{}' is not a directory",
                canonical.display()
            ));
        }
        Ok(canonical)
    }
}

#[cfg(test)]
pub(crate) fn test_config(root: &std::path::Path) -> Config {
    use types::{HttpConfig, LoggingConfig, PerformanceConfig, ServerConfig, StorageConfig};

    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            workers: None,
        },
        storage: StorageConfig {
            root_dir: root.display().to_string(),
            index_files: vec!["index.html".to_string(), "index.htm".to_string()],
        },
        logging: LoggingConfig {
            level: "error".to_string(),
            access_log: false,
            access_log_format: "combined".to_string(),
            access_log_file: None,
            error_log_file: None,
        },
        performance: PerformanceConfig {
            keep_alive: true,
            request_timeout: 30,
            max_connections: None,
        },
        http: HttpConfig {
            server_name: "questionnaire-server".to_string(),
            enable_cors: false,
            max_body_size: 1024,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let cfg = Config::load_from("definitely-missing-config-file").unwrap();
        assert_eq!(cfg.server.port, 8000);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.storage.root_dir, ".");
        assert_eq!(cfg.storage.index_files, vec!["index.html", "index.htm"]);
        assert_eq!(cfg.logging.access_log_format, "combined");
        assert_eq!(cfg.http.max_body_size, 10_485_760);
    }

    #[test]
    fn test_socket_addr() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(dir.path());
        assert_eq!(cfg.get_socket_addr().unwrap().to_string(), "127.0.0.1:0");
    }

    #[test]
    fn test_resolve_root_dir() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(dir.path());
        assert_eq!(
            cfg.resolve_root_dir().unwrap(),
            dir.path().canonicalize().unwrap()
        );

        let file = dir.path().join("plain.txt");
        std::fs::write(&file, "x").unwrap();
        let cfg = test_config(&file);
        assert!(cfg.resolve_root_dir().is_err());

        let cfg = test_config(&dir.path().join("missing"));
        assert!(cfg.resolve_root_dir().is_err());
    }
}
