//! Configuration for the raksha-sia daemon
//!
//! Loads configuration from a TOML file. Only the parameters the daemon
//! actually needs are configurable; everything else uses the panel's
//! factory defaults.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Top-level application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub panel: PanelConfig,
    pub network: NetworkConfig,
    #[serde(default)]
    pub sinks: SinkConfig,
    pub logging: LoggingConfig,
}

/// Panel link configuration (serial port + protocol options)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PanelConfig {
    /// Serial device the panel is attached to
    pub port: String,
    /// Baud rate programmed into the panel's RS232 module
    pub baud_rate: u32,
    /// Remote access code sent in the login block
    pub remote_code: String,
    /// Set when dip-switch 8 on the panel is on (maps the on-board RIO
    /// to zones 9011-9018 / outputs 9011-9014)
    #[serde(default)]
    pub dip8: bool,
    /// Use the alternative acknowledge/reject function codes
    /// (required by some older panel firmwares)
    #[serde(default)]
    pub alt_control_blocks: bool,
}

/// TCP client interface configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NetworkConfig {
    /// Bind address for the client command/event socket
    ///
    /// Examples:
    /// - `0.0.0.0:1500` - All interfaces
    /// - `127.0.0.1:1500` - Localhost only
    pub bind_address: String,
}

/// Output sink configuration
///
/// Each enabled entry registers one sink with the output stage. With no
/// sinks configured, events are still broadcast to connected clients.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SinkConfig {
    /// Append decoded events as JSON lines to this file
    pub file: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            panel: PanelConfig {
                port: "/dev/ttyUSB0".to_string(),
                baud_rate: 9600,
                remote_code: "543210".to_string(),
                dip8: false,
                alt_control_blocks: false,
            },
            network: NetworkConfig {
                bind_address: "0.0.0.0:1500".to_string(),
            },
            sinks: SinkConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.panel.port, "/dev/ttyUSB0");
        assert_eq!(config.panel.baud_rate, 9600);
        assert_eq!(config.panel.remote_code, "543210");
        assert!(!config.panel.dip8);
        assert_eq!(config.network.bind_address, "0.0.0.0:1500");
    }

    #[test]
    fn test_toml_round_trip() {
        let config = Config::default();
        let toml_string = toml::to_string_pretty(&config).unwrap();

        // Should contain all sections
        assert!(toml_string.contains("[panel]"));
        assert!(toml_string.contains("[network]"));
        assert!(toml_string.contains("[logging]"));

        let back: Config = toml::from_str(&toml_string).unwrap();
        assert_eq!(back.panel.remote_code, config.panel.remote_code);
        assert_eq!(back.panel.baud_rate, config.panel.baud_rate);
    }

    #[test]
    fn test_toml_deserialization() {
        let toml_content = r#"
[panel]
port = "/dev/ttyS1"
baud_rate = 19200
remote_code = "112233"
dip8 = true

[network]
bind_address = "127.0.0.1:1500"

[sinks]
file = "/var/log/raksha-sia/events.log"

[logging]
level = "debug"
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.panel.port, "/dev/ttyS1");
        assert_eq!(config.panel.baud_rate, 19200);
        assert!(config.panel.dip8);
        assert!(!config.panel.alt_control_blocks);
        assert_eq!(
            config.sinks.file.as_deref(),
            Some("/var/log/raksha-sia/events.log")
        );
        assert_eq!(config.logging.level, "debug");
    }
}
