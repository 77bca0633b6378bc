// Batch job orchestration
//
// - queue: deterministic enumeration of the images to process
// - commands: per-image tool command line construction and validation
// - process: runner that spawns the external tool
// - worker: sequential dispatch with abort on first failure
// - supervisor: progress ownership and worker liveness polling

pub mod commands;
pub mod process;
pub mod queue;
pub mod supervisor;
pub mod worker;

use async_trait::async_trait;

pub use commands::*;
pub use process::ProcessRunner;
pub use queue::*;
pub use supervisor::*;
pub use worker::*;

use crate::error::Result;

/// Runs one external tool invocation to completion
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Execute the command; any non-zero exit is an error
    async fn run(&self, command: &ToolCommand) -> Result<()>;
}
