use async_trait::async_trait;
use deskmate_core::{AssistantError, ContextData, ContextProvider};
use serde::{Deserialize, Serialize};
use std::env;
use sysinfo::System;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentSnapshot {
    pub platform: String,
    pub os_version: String,
    pub hostname: String,
    pub username: String,
    pub cwd: String,
    pub memory_used_mb: u64,
    pub memory_total_mb: u64,
}

impl EnvironmentSnapshot {
    pub fn capture() -> Self {
        let mut sys = System::new();
        sys.refresh_memory();

        let cwd = env::current_dir()
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_else(|_| "/".to_string());

        let username = env::var("USER")
            .or_else(|_| env::var("USERNAME"))
            .unwrap_or_else(|_| "unknown".to_string());

        Self {
            platform: format!("{}-{}", env::consts::OS, env::consts::ARCH),
            os_version: System::long_os_version().unwrap_or_else(|| "unknown".to_string()),
            hostname: System::host_name().unwrap_or_else(|| "unknown".to_string()),
            username,
            cwd,
            memory_used_mb: sys.used_memory() / 1024 / 1024,
            memory_total_mb: sys.total_memory() / 1024 / 1024,
        }
    }

    pub fn into_context(self) -> ContextData {
        ContextData::from([
            ("platform".to_string(), self.platform),
            ("os_version".to_string(), self.os_version),
            ("hostname".to_string(), self.hostname),
            ("username".to_string(), self.username),
            ("cwd".to_string(), self.cwd),
            ("memory_used_mb".to_string(), self.memory_used_mb.to_string()),
            ("memory_total_mb".to_string(), self.memory_total_mb.to_string()),
        ])
    }
}

/// `environment` provider: machine and process facts.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentContextProvider;

#[async_trait]
impl ContextProvider for EnvironmentContextProvider {
    fn name(&self) -> &str {
        "environment"
    }

    async fn collect(&self) -> Result<ContextData, AssistantError> {
        Ok(EnvironmentSnapshot::capture().into_context())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_capture() {
        let snapshot = EnvironmentSnapshot::capture();
        assert!(!snapshot.cwd.is_empty());
        assert!(snapshot.memory_total_mb > 0);
        assert!(snapshot.platform.contains(env::consts::OS));
    }

    #[tokio::test]
    async fn test_environment_fields() {
        let values = EnvironmentContextProvider.collect().await.unwrap();
        for key in [
            "platform",
            "os_version",
            "hostname",
            "username",
            "cwd",
            "memory_used_mb",
            "memory_total_mb",
        ] {
            assert!(values.contains_key(key), "missing {key}");
        }
    }
}
