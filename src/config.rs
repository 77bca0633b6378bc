use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use crate::error::{Result, MangaBatchError};

fn default_entry_args() -> Vec<String> {
    vec!["-m".to_string(), "manga_translator".to_string()]
}

fn default_threshold() -> f64 {
    0.2
}

fn default_poll_interval_ms() -> u64 {
    100
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub tool: ToolConfig,
    #[serde(default)]
    pub job: JobConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub supervisor: SupervisorConfig,
    #[serde(default)]
    pub translate: TranslateConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Interpreter or executable that runs the per-image translator
    pub program: String,
    /// Arguments placed before the per-image options (e.g. ["-m", "manga_translator"])
    pub entry_args: Vec<String>,
    /// Existing virtual environment whose python3 replaces `program`
    pub venv_dir: Option<PathBuf>,
    /// Pass `-v` to the tool
    pub verbose: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JobConfig {
    /// Translator used by the external tool (deep, youdao, baidu, papago, caiyun, none)
    pub translator: String,
    /// Target language tag handed to the tool
    pub language: String,
    /// Bounding box threshold; raise it to keep more boxes
    pub box_threshold: f64,
    /// Text threshold; lower it to keep more text regions
    pub text_threshold: f64,
    pub align_center: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Only file names ending with this suffix are queued
    pub image_suffix: String,
    /// File names ending with this marker are outputs of a previous run
    pub translated_marker: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SupervisorConfig {
    /// How often the supervising task checks whether the worker has exited
    pub poll_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslateConfig {
    /// Base URL of the translation endpoint
    pub endpoint: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Retries performed by the backend client for a single string
    pub max_retries: u32,
    /// Default source language tag
    pub source_lang: String,
    /// Default target language tag
    pub target_lang: String,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            program: "python3".to_string(),
            entry_args: default_entry_args(),
            venv_dir: None,
            verbose: true,
        }
    }
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            translator: "deep".to_string(),
            language: "FRA".to_string(),
            box_threshold: default_threshold(),
            text_threshold: default_threshold(),
            align_center: false,
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            image_suffix: ".jpg".to_string(),
            translated_marker: "translated.jpg".to_string(),
        }
    }
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://translate.googleapis.com".to_string(),
            timeout_secs: 30,
            max_retries: 2,
            source_lang: "ENG".to_string(),
            target_lang: "FRA".to_string(),
        }
    }
}

impl ToolConfig {
    /// Executable to spawn, taking `venv_dir` into account
    pub fn resolve_program(&self) -> String {
        match &self.venv_dir {
            Some(venv) => {
                let bin = if cfg!(windows) { "Scripts" } else { "bin" };
                venv.join(bin).join("python3").to_string_lossy().to_string()
            }
            None => self.program.clone(),
        }
    }
}

impl SupervisorConfig {
    /// Liveness polling period; zero is rejected
    pub fn poll_interval(&self) -> Result<Duration> {
        if self.poll_interval_ms == 0 {
            return Err(MangaBatchError::Config(
                "supervisor.poll_interval_ms must be greater than 0".to_string(),
            ));
        }
        Ok(Duration::from_millis(self.poll_interval_ms))
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| MangaBatchError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| MangaBatchError::Config(format!("Failed to parse config file: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Checks that cannot be expressed in the TOML schema
    pub fn validate(&self) -> Result<()> {
        self.supervisor.poll_interval()?;
        Ok(())
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| MangaBatchError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| MangaBatchError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manga-batch.toml");
        std::fs::write(&path, "[job]\ntranslator = \"papago\"\nlanguage = \"ENG\"\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.job.translator, "papago");
        assert_eq!(config.job.box_threshold, 0.2);
        assert_eq!(config.scan.translated_marker, "translated.jpg");
        assert_eq!(config.supervisor.poll_interval_ms, 100);
        assert_eq!(config.tool.entry_args, vec!["-m", "manga_translator"]);
    }

    #[test]
    fn test_saved_default_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.toml");
        Config::default().save_to_file(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.translate.target_lang, "FRA");
        assert_eq!(loaded.tool.program, "python3");
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[job\n").unwrap();

        assert!(matches!(Config::from_file(&path), Err(MangaBatchError::Config(_))));
    }

    #[test]
    fn test_zero_poll_interval_rejected_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zero.toml");
        std::fs::write(&path, "[supervisor]\npoll_interval_ms = 0\n").unwrap();

        assert!(matches!(Config::from_file(&path), Err(MangaBatchError::Config(_))));
        assert_eq!(
            SupervisorConfig::default().poll_interval().unwrap(),
            Duration::from_millis(100)
        );
    }

    #[test]
    fn test_venv_overrides_program() {
        let tool = ToolConfig {
            venv_dir: Some(PathBuf::from("/opt/venv")),
            ..ToolConfig::default()
        };
        let program = tool.resolve_program();
        assert!(program.starts_with("/opt/venv"));
        assert!(program.ends_with("python3"));
        assert_eq!(ToolConfig::default().resolve_program(), "python3");
    }
}
