use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::config::{JobConfig, ToolConfig};
use crate::error::{Result, MangaBatchError};
use super::WorkItem;

/// Translator selected inside the per-image tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TranslatorKind {
    Deep,
    Youdao,
    Baidu,
    Papago,
    Caiyun,
    /// Detection and rendering only
    #[value(name = "none")]
    #[serde(rename = "none")]
    Disabled,
}

impl TranslatorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deep => "deep",
            Self::Youdao => "youdao",
            Self::Baidu => "baidu",
            Self::Papago => "papago",
            Self::Caiyun => "caiyun",
            Self::Disabled => "none",
        }
    }
}

impl fmt::Display for TranslatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TranslatorKind {
    type Err = MangaBatchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "deep" => Ok(Self::Deep),
            "youdao" => Ok(Self::Youdao),
            "baidu" => Ok(Self::Baidu),
            "papago" => Ok(Self::Papago),
            "caiyun" => Ok(Self::Caiyun),
            "none" => Ok(Self::Disabled),
            _ => Err(MangaBatchError::Config(format!(
                "Invalid translator '{}'. Valid translators: deep, youdao, baidu, papago, caiyun, none",
                s
            ))),
        }
    }
}

/// A single external tool invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
    pub description: String,
}

impl ToolCommand {
    pub fn new<S1: Into<String>, S2: Into<String>>(program: S1, description: S2) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            description: description.into(),
        }
    }

    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(|s| s.into()));
        self
    }

    /// Add `arg` only when `enabled`
    pub fn flag_if<S: Into<String>>(self, arg: S, enabled: bool) -> Self {
        if enabled { self.arg(arg) } else { self }
    }

    pub fn input<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg("-i").arg(path.as_ref().to_string_lossy().to_string())
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Per-image options as entered by the user, before validation
#[derive(Debug, Clone)]
pub struct JobOptions {
    pub translator: TranslatorKind,
    pub language: String,
    pub box_threshold: String,
    pub text_threshold: String,
    pub align_center: bool,
}

impl JobOptions {
    pub fn from_config(config: &JobConfig) -> Result<Self> {
        Ok(Self {
            translator: config.translator.parse()?,
            language: config.language.clone(),
            // Debug keeps the fractional part: 1.0 stays "1.0"
            box_threshold: format!("{:?}", config.box_threshold),
            text_threshold: format!("{:?}", config.text_threshold),
            align_center: config.align_center,
        })
    }
}

fn parse_threshold(field: &'static str, value: &str) -> Result<f64> {
    match value.trim().parse::<f64>() {
        Ok(parsed) if parsed.is_finite() => Ok(parsed),
        _ => Err(MangaBatchError::InvalidThreshold {
            field,
            value: value.to_string(),
        }),
    }
}

/// Validated argument list shared by every item of a batch
#[derive(Debug, Clone, PartialEq)]
pub struct CommandTemplate {
    program: String,
    args: Vec<String>,
    box_threshold: f64,
    text_threshold: f64,
}

impl CommandTemplate {
    /// Validate `options` and fix the common arguments. Fails before any
    /// process is spawned when a threshold is not a number.
    pub fn build(tool: &ToolConfig, options: &JobOptions) -> Result<Self> {
        let box_threshold = parse_threshold("box threshold", &options.box_threshold)?;
        let text_threshold = parse_threshold("text threshold", &options.text_threshold)?;

        let language = options.language.trim();
        if language.is_empty() {
            return Err(MangaBatchError::Config("Target language must not be empty".to_string()));
        }

        let command = ToolCommand::new(tool.resolve_program(), "template")
            .args(tool.entry_args.iter().cloned())
            .flag_if("-v", tool.verbose)
            .arg(format!("--translator={}", options.translator))
            .arg("-l")
            .arg(language)
            .arg(format!("--box-threshold={}", options.box_threshold.trim()))
            .arg(format!("--text-threshold={}", options.text_threshold.trim()))
            .flag_if("--align-center", options.align_center);

        Ok(Self {
            program: command.program,
            args: command.args,
            box_threshold,
            text_threshold,
        })
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn thresholds(&self) -> (f64, f64) {
        (self.box_threshold, self.text_threshold)
    }

    /// Full command line for one queued image
    pub fn for_item(&self, item: &WorkItem) -> ToolCommand {
        ToolCommand::new(&self.program, format!("Translating {}", item.path.display()))
            .args(self.args.iter().cloned())
            .input(&item.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn options() -> JobOptions {
        JobOptions {
            translator: TranslatorKind::Deep,
            language: " FRA ".to_string(),
            box_threshold: "0.2".to_string(),
            text_threshold: "0.5".to_string(),
            align_center: false,
        }
    }

    #[test]
    fn test_item_command_line() {
        let template = CommandTemplate::build(&ToolConfig::default(), &options()).unwrap();
        let item = WorkItem { path: PathBuf::from("/manga/ch1/p1.jpg"), index: 0 };
        let command = template.for_item(&item);

        assert_eq!(command.program, "python3");
        assert_eq!(
            command.args,
            vec![
                "-m", "manga_translator", "-v", "--translator=deep", "-l", "FRA",
                "--box-threshold=0.2", "--text-threshold=0.5", "-i", "/manga/ch1/p1.jpg",
            ]
        );
    }

    #[test]
    fn test_align_center_and_quiet_tool() {
        let tool = ToolConfig { verbose: false, ..ToolConfig::default() };
        let options = JobOptions {
            translator: TranslatorKind::Disabled,
            align_center: true,
            ..options()
        };
        let template = CommandTemplate::build(&tool, &options).unwrap();

        assert!(!template.args().contains(&"-v".to_string()));
        assert!(template.args().contains(&"--translator=none".to_string()));
        assert_eq!(template.args().last().map(String::as_str), Some("--align-center"));
    }

    #[test]
    fn test_invalid_thresholds_rejected() {
        for bad in ["abc", "", "0,5", "NaN"] {
            let options = JobOptions { box_threshold: bad.to_string(), ..options() };
            let err = CommandTemplate::build(&ToolConfig::default(), &options).unwrap_err();
            assert!(matches!(err, MangaBatchError::InvalidThreshold { field: "box threshold", .. }));
            assert!(err.is_validation());
        }

        let options = JobOptions { text_threshold: "high".to_string(), ..options() };
        assert!(matches!(
            CommandTemplate::build(&ToolConfig::default(), &options),
            Err(MangaBatchError::InvalidThreshold { field: "text threshold", .. })
        ));
    }

    #[test]
    fn test_translator_names() {
        assert_eq!("Papago".parse::<TranslatorKind>().unwrap(), TranslatorKind::Papago);
        assert_eq!("none".parse::<TranslatorKind>().unwrap(), TranslatorKind::Disabled);
        assert!("google".parse::<TranslatorKind>().is_err());
        assert_eq!(TranslatorKind::Caiyun.to_string(), "caiyun");
    }

    #[test]
    fn test_options_from_config() {
        let options = JobOptions::from_config(&JobConfig::default()).unwrap();
        let template = CommandTemplate::build(&ToolConfig::default(), &options).unwrap();
        assert_eq!(template.thresholds(), (0.2, 0.2));

        let config = JobConfig { box_threshold: 1.0, ..JobConfig::default() };
        let options = JobOptions::from_config(&config).unwrap();
        let template = CommandTemplate::build(&ToolConfig::default(), &options).unwrap();
        assert!(template.args().contains(&"--box-threshold=1.0".to_string()));
    }

    #[test]
    fn test_thresholds_passed_as_entered() {
        let options = JobOptions {
            box_threshold: "1.0".to_string(),
            text_threshold: " 0.50 ".to_string(),
            ..options()
        };
        let template = CommandTemplate::build(&ToolConfig::default(), &options).unwrap();

        assert!(template.args().contains(&"--box-threshold=1.0".to_string()));
        assert!(template.args().contains(&"--text-threshold=0.50".to_string()));
        assert_eq!(template.thresholds(), (1.0, 0.5));
    }
}
