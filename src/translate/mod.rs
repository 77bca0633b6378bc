// Selective translation of mixed-script text
//
// - segment: ASCII / non-ASCII run splitting and per-run decisions
// - language: language tag to backend code table
// - selective: the translation pass itself
// - google: HTTP backend for single strings

pub mod google;
pub mod language;
pub mod segment;
pub mod selective;

use async_trait::async_trait;

pub use google::GoogleBackend;
pub use language::*;
pub use segment::*;
pub use selective::*;

use crate::config::TranslateConfig;
use crate::error::Result;

/// Translates one string at a time. Language arguments are backend codes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranslationBackend: Send + Sync {
    async fn translate(&self, source: &str, target: &str, text: &str) -> Result<String>;
}

/// Factory for the configured translation backend
pub struct BackendFactory;

impl BackendFactory {
    pub fn create_backend(config: TranslateConfig) -> Result<Box<dyn TranslationBackend>> {
        Ok(Box::new(GoogleBackend::new(config)?))
    }
}
