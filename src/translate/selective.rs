use tracing::info;

use crate::config::TranslateConfig;
use crate::error::{Result, MangaBatchError};
use super::{TranslationBackend, TranslationDecision, backend_code, source_code, split_runs};

/// Language pair for one translation pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectiveConfig {
    pub source_lang: String,
    pub target_lang: String,
}

impl SelectiveConfig {
    pub fn new<S1: Into<String>, S2: Into<String>>(source_lang: S1, target_lang: S2) -> Self {
        Self {
            source_lang: source_lang.into(),
            target_lang: target_lang.into(),
        }
    }
}

impl From<&TranslateConfig> for SelectiveConfig {
    fn from(config: &TranslateConfig) -> Self {
        Self::new(&config.source_lang, &config.target_lang)
    }
}

/// Translates the latin-script runs of each string and leaves the rest untouched
pub struct SelectiveTranslator {
    backend: Box<dyn TranslationBackend>,
}

impl SelectiveTranslator {
    pub fn new(backend: Box<dyn TranslationBackend>) -> Self {
        Self { backend }
    }

    /// Translate every query, returning results in input order.
    ///
    /// Queries and the runs inside them are handled one at a time. The first
    /// backend failure aborts the whole call.
    pub async fn translate_all(&self, config: &SelectiveConfig, queries: &[String]) -> Result<Vec<String>> {
        let source = source_code(&config.source_lang)?;
        let target = backend_code(&config.target_lang)?;

        let mut translations = Vec::with_capacity(queries.len());
        for (idx, query) in queries.iter().enumerate() {
            let translated = self.translate_query(source, target, query).await?;
            info!("{}: {} => {}", idx, query, translated);
            translations.push(translated);
        }

        Ok(translations)
    }

    async fn translate_query(&self, source: &str, target: &str, query: &str) -> Result<String> {
        let mut output = String::with_capacity(query.len());

        for run in split_runs(query) {
            match run.decision() {
                TranslationDecision::PassThrough => {
                    info!("Fragment kept as is: '{}'", run.text);
                    output.push_str(run.text);
                }
                TranslationDecision::Translate => {
                    info!("Translating fragment into {}", target);
                    let translated = self
                        .backend
                        .translate(source, target, run.text)
                        .await
                        .map_err(|e| match e {
                            MangaBatchError::TranslationBackendFailed { .. } => e,
                            other => MangaBatchError::TranslationBackendFailed { detail: other.to_string() },
                        })?;
                    info!("{} => {}", run.text, translated);
                    output.push_str(&translated);
                }
            }
        }

        Ok(output)
    }
}
