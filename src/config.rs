use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::system::aggregate::{AllowList, GroupBy};
use crate::system::platform;
use crate::system::sampler::{SamplerSettings, SystemCpuWindow};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sampler: SamplerConfig,
    pub apps: AppsConfig,
    pub output: OutputConfig,
    pub watch: WatchConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    pub settle_ms: u64,
    pub system_cpu: SystemCpuWindow,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        SamplerConfig {
            settle_ms: 500,
            system_cpu: SystemCpuWindow::Separate,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AppsConfig {
    pub names: Vec<String>,
    pub group_by: GroupBy,
}

impl Default for AppsConfig {
    fn default() -> Self {
        AppsConfig {
            names: platform::default_app_names(),
            group_by: GroupBy::Exact,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub pretty: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    pub interval_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        WatchConfig { interval_ms: 3000 }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "warn".to_string(),
            json: false,
        }
    }
}

impl Config {
    pub fn sampler_settings(&self) -> SamplerSettings {
        SamplerSettings {
            settle: Duration::from_millis(self.sampler.settle_ms),
            system_cpu: self.sampler.system_cpu,
            allow_list: AllowList::new(&self.apps.names),
            group_by: self.apps.group_by,
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("appsnap").join("config.toml"))
}

pub fn load_config() -> Config {
    match config_path() {
        Some(path) if path.exists() => load_config_from_path(&path),
        _ => Config::default(),
    }
}

pub fn load_config_from_path(path: &Path) -> Config {
    match std::fs::read_to_string(path) {
        Ok(contents) => toml::from_str(&contents).unwrap_or_else(|e| {
            warn!(path = %path.display(), "invalid config, using defaults: {e}");
            Config::default()
        }),
        Err(_) => Config::default(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[test]
    fn default_config_values() {
        let config = Config::default();
        assert_eq!(config.sampler.settle_ms, 500);
        assert_eq!(config.sampler.system_cpu, SystemCpuWindow::Separate);
        assert_eq!(config.apps.group_by, GroupBy::Exact);
        assert_eq!(config.apps.names, platform::default_app_names());
        assert!(!config.output.pretty);
        assert_eq!(config.watch.interval_ms, 3000);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn parse_partial_toml() {
        let toml_str = r#"
[sampler]
settle_ms = 250
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.sampler.settle_ms, 250);
        // Other fields should be defaults
        assert_eq!(config.sampler.system_cpu, SystemCpuWindow::Separate);
        assert_eq!(config.watch.interval_ms, 3000);
    }

    #[test]
    fn parse_full_toml() {
        let toml_str = r#"
[sampler]
settle_ms = 1000
system_cpu = "shared"

[apps]
names = ["firefox", "Zed"]
group_by = "lowercase"

[output]
pretty = true

[watch]
interval_ms = 5000

[logging]
level = "debug"
json = true
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.sampler.settle_ms, 1000);
        assert_eq!(config.sampler.system_cpu, SystemCpuWindow::Shared);
        assert_eq!(config.apps.names, vec!["firefox", "Zed"]);
        assert_eq!(config.apps.group_by, GroupBy::Lowercase);
        assert!(config.output.pretty);
        assert_eq!(config.watch.interval_ms, 5000);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
    }

    #[test]
    fn sampler_settings_follow_config() {
        let config: Config = toml::from_str(
            r#"
[sampler]
settle_ms = 50

[apps]
names = ["Firefox"]
"#,
        )
        .unwrap();
        let settings = config.sampler_settings();
        assert_eq!(settings.settle, Duration::from_millis(50));
        assert!(settings.allow_list.matches("firefox"));
        assert!(!settings.allow_list.matches("chrome"));
    }

    #[test]
    fn missing_file_returns_default() {
        let config = load_config_from_path(Path::new("/nonexistent/path/config.toml"));
        assert_eq!(config.sampler.settle_ms, 500);
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn bad_value_falls_back_with_warning() {
        let temp = std::env::temp_dir().join("appsnap_test_bad_value.toml");
        std::fs::write(&temp, "[sampler]\nsettle_ms = 250\nsystem_cpu = \"both\"\n").unwrap();

        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let config = tracing::subscriber::with_default(subscriber, || load_config_from_path(&temp));
        let _ = std::fs::remove_file(&temp);

        assert_eq!(config.sampler.settle_ms, 500);
        let logged = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(logged.contains("invalid config"), "log was: {logged}");
        assert!(logged.contains("WARN"));
    }

    #[test]
    fn invalid_toml_returns_default() {
        let temp = std::env::temp_dir().join("appsnap_test_invalid.toml");
        std::fs::write(&temp, "this is not valid toml {{{{").unwrap();
        let config = load_config_from_path(&temp);
        assert_eq!(config.sampler.settle_ms, 500);
        let _ = std::fs::remove_file(&temp);
    }
}
