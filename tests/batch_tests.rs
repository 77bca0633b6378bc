use assert_fs::prelude::*;
use assert_fs::TempDir;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};

use manga_batch::batch::{
    CommandRunner, CommandTemplate, ImageFilter, JobOptions, Orchestrator, ToolCommand, TranslatorKind,
    enumerate_work_items,
};
use manga_batch::config::ToolConfig;
use manga_batch::error::{MangaBatchError, Result};

/// Records every command and fails for file names containing `fail_on`
#[derive(Default)]
struct RecordingRunner {
    fail_on: Option<String>,
    seen: Mutex<Vec<ToolCommand>>,
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(&self, command: &ToolCommand) -> Result<()> {
        self.seen.lock().unwrap().push(command.clone());
        let input = command.args.last().cloned().unwrap_or_default();
        match &self.fail_on {
            Some(marker) if input.contains(marker.as_str()) => {
                Err(MangaBatchError::Process("tool exited with status 1".to_string()))
            }
            _ => Ok(()),
        }
    }
}

fn manga_tree() -> TempDir {
    let root = TempDir::new().unwrap();
    root.child("ch1/p1.jpg").touch().unwrap();
    root.child("ch1/p2.jpg").touch().unwrap();
    root.child("ch1/p1-translated.jpg").touch().unwrap();
    root.child("ch2/p1.jpg").touch().unwrap();
    root.child("ch2/notes.txt").touch().unwrap();
    root
}

fn template(align_center: bool) -> CommandTemplate {
    let options = JobOptions {
        translator: TranslatorKind::Deep,
        language: "FRA".to_string(),
        box_threshold: "0.5".to_string(),
        text_threshold: "0.3".to_string(),
        align_center,
    };
    CommandTemplate::build(&ToolConfig::default(), &options).unwrap()
}

fn relative(paths: &[PathBuf], root: &Path) -> Vec<String> {
    let root = std::path::absolute(root).unwrap();
    paths
        .iter()
        .map(|p| p.strip_prefix(&root).unwrap().to_string_lossy().replace('\\', "/"))
        .collect()
}

#[tokio::test]
async fn batch_runs_every_image_once_in_order() {
    let root = manga_tree();
    let queue = assert_ok!(enumerate_work_items(root.path(), None, &ImageFilter::default()));
    assert_eq!(queue.len(), 3);

    let runner = Arc::new(RecordingRunner::default());
    let orchestrator = Orchestrator::new(template(true), runner.clone(), Duration::from_millis(5));

    let mut progress = Vec::new();
    let summary = assert_ok!(orchestrator.run_batch(queue, |done, total| progress.push((done, total))).await);
    assert_eq!(summary.processed, 3);
    assert_eq!(progress.last(), Some(&(3, 3)));

    let seen = runner.seen.lock().unwrap();
    let inputs: Vec<PathBuf> = seen.iter().map(|c| PathBuf::from(c.args.last().unwrap())).collect();
    assert_eq!(relative(&inputs, root.path()), vec!["ch1/p1.jpg", "ch1/p2.jpg", "ch2/p1.jpg"]);
    assert!(seen.iter().all(|c| c.args.contains(&"--align-center".to_string())));
    assert!(seen.iter().all(|c| c.args.contains(&"--box-threshold=0.5".to_string())));
}

#[tokio::test]
async fn batch_aborts_on_failing_image() {
    let root = manga_tree();
    let queue = enumerate_work_items(root.path(), None, &ImageFilter::default()).unwrap();

    let runner = Arc::new(RecordingRunner {
        fail_on: Some("p2.jpg".to_string()),
        ..RecordingRunner::default()
    });
    let orchestrator = Orchestrator::new(template(false), runner.clone(), Duration::from_millis(5));

    let mut progress = Vec::new();
    let err = assert_err!(orchestrator.run_batch(queue, |done, _| progress.push(done)).await);

    match err {
        MangaBatchError::ExternalCommandFailed { path, detail } => {
            assert!(path.ends_with("ch1/p2.jpg"));
            assert_eq!(detail, "tool exited with status 1");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(progress, vec![1]);
    // ch2/p1.jpg was never attempted
    assert_eq!(runner.seen.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn start_point_must_be_an_entry_of_the_root() {
    let root = manga_tree();
    let other = TempDir::new().unwrap();
    other.child("ch3").create_dir_all().unwrap();

    let err = assert_err!(enumerate_work_items(
        root.path(),
        Some(other.child("ch3").path()),
        &ImageFilter::default()
    ));
    assert!(matches!(err, MangaBatchError::StartPointNotFound { .. }));
    assert!(err.is_validation());

    let queue = assert_ok!(enumerate_work_items(
        root.path(),
        Some(root.child("ch2").path()),
        &ImageFilter::default()
    ));
    assert_eq!(queue.len(), 1);
}

#[test]
fn invalid_threshold_is_rejected_before_any_run() {
    let options = JobOptions {
        translator: TranslatorKind::Baidu,
        language: "ENG".to_string(),
        box_threshold: "0.2".to_string(),
        text_threshold: "two".to_string(),
        align_center: false,
    };
    let err = assert_err!(CommandTemplate::build(&ToolConfig::default(), &options));
    assert!(matches!(err, MangaBatchError::InvalidThreshold { .. }));
}
