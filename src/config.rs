use std::path::PathBuf;

use log::LevelFilter;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub admin_host: String,
    pub admin_port: u16,
    pub max_payload_size: usize,
    pub authorized_keys: Option<PathBuf>,
    pub initial_model: Option<PathBuf>,
    pub initial_status: String,
    pub log_level: LevelFilter,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            admin_host: "127.0.0.1".to_string(),
            admin_port: 8081,
            max_payload_size: 256 * 1024 * 1024,
            authorized_keys: None,
            initial_model: None,
            initial_status: "No global model yet".to_string(),
            log_level: LevelFilter::Info,
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        // port 0 asks the OS for a free port, so two zeros never clash
        if self.host == self.admin_host && self.port == self.admin_port && self.port != 0 {
            anyhow::bail!(
                "Worker and admin servers cannot both bind {}:{}",
                self.host,
                self.port
            );
        }
        if self.max_payload_size == 0 {
            anyhow::bail!("max_payload_size must be greater than zero");
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the worker-facing server, e.g. `http://10.0.0.5:8080`
    pub server_url: String,
    pub request_timeout_secs: u64,
}

impl ClientConfig {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            request_timeout_secs: 600,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ServerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_same_bind_address_is_rejected() {
        let config = ServerConfig {
            admin_port: 8080,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("cannot both bind"));

        let ephemeral = ServerConfig {
            port: 0,
            admin_port: 0,
            ..Default::default()
        };
        assert!(ephemeral.validate().is_ok());
    }

    #[test]
    fn test_zero_payload_limit_is_rejected() {
        let config = ServerConfig {
            max_payload_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
