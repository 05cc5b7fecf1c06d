//! Integration tests for the batch pipeline.
//!
//! These tests use a mock [`PdfBackend`] keyed by file name, so no real
//! PDF parsing happens; the directories are real tempdirs and the rename
//! side effects are exercised against a live filesystem.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chronofile_core::{
    BackendError, PdfBackend, PlanOutcome, ProgressEvent, RunConfig, SkipReason,
    pipeline,
};

/// A hand-rolled mock implementing [`PdfBackend`] for tests.
///
/// Returns canned text per file name. Optionally deletes another file when
/// a trigger document is extracted, to simulate the source vanishing
/// between extraction and rename.
struct MockBackend {
    texts: HashMap<String, Result<String, BackendError>>,
    delete_on_extract: Option<(String, PathBuf)>,
}

impl MockBackend {
    fn new() -> Self {
        Self {
            texts: HashMap::new(),
            delete_on_extract: None,
        }
    }

    fn with_text(mut self, name: &str, text: &str) -> Self {
        self.texts.insert(name.to_string(), Ok(text.to_string()));
        self
    }

    fn with_failure(mut self, name: &str) -> Self {
        self.texts.insert(
            name.to_string(),
            Err(BackendError::Open("encrypted document".into())),
        );
        self
    }

    /// When `trigger` is extracted, delete `victim` from disk first.
    fn deleting_on_extract(mut self, trigger: &str, victim: PathBuf) -> Self {
        self.delete_on_extract = Some((trigger.to_string(), victim));
        self
    }
}

impl PdfBackend for MockBackend {
    fn extract_text(&self, path: &Path) -> Result<String, BackendError> {
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        if let Some((trigger, victim)) = &self.delete_on_extract
            && *trigger == name
        {
            std::fs::remove_file(victim).ok();
        }
        self.texts
            .get(&name)
            .cloned()
            .unwrap_or_else(|| Err(BackendError::Open(format!("no canned text for {name}"))))
    }
}

fn touch(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, name.as_bytes()).unwrap();
    path
}

fn config(root: &Path) -> RunConfig {
    RunConfig::new(root)
}

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

#[test]
fn renames_by_loose_scan_period() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "payslip.pdf");
    let backend = MockBackend::new()
        .with_text("payslip.pdf", "ref 03/05/2021 from 01/01/2021 until 12/31/2021");

    let summary = pipeline::run(&config(dir.path()), &backend, |_| {}).unwrap();

    assert_eq!(summary.renamed.len(), 1);
    assert!(summary.skipped.is_empty());
    assert!(dir.path().join("2021-01-01to2021-12-31.pdf").exists());
    assert!(!dir.path().join("payslip.pdf").exists());
}

#[test]
fn renames_single_day_by_explicit_label() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "statement.pdf");
    let backend = MockBackend::new().with_text(
        "statement.pdf",
        "Statement Period: 01/05/2022 to 02/05/2022\nunrelated 12/12/2012\n",
    );

    pipeline::run(&config(dir.path()), &backend, |_| {}).unwrap();

    // Stray dates are ignored; the labeled pair wins.
    assert!(dir.path().join("2022-01-05to2022-02-05.pdf").exists());
}

#[test]
fn writes_text_artifacts_per_document() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "doc.pdf");
    let backend = MockBackend::new().with_text("doc.pdf", "issued 04/01/2020");

    pipeline::run(&config(dir.path()), &backend, |_| {}).unwrap();

    let artifact = dir.path().join("output_text").join("doc.pdf.txt");
    assert_eq!(
        std::fs::read_to_string(artifact).unwrap(),
        "issued 04/01/2020"
    );
}

#[test]
fn collision_suffixes_are_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "a.pdf");
    touch(dir.path(), "b.pdf");
    // Both resolve to the same single-day period.
    let backend = MockBackend::new()
        .with_text("a.pdf", "paid 01/01/2023")
        .with_text("b.pdf", "paid 01/01/2023");

    let summary = pipeline::run(&config(dir.path()), &backend, |_| {}).unwrap();

    // Ascending order with the file-name tie-break: a gets the unsuffixed
    // name, b gets _1.
    assert_eq!(summary.renamed.len(), 2);
    assert_eq!(
        std::fs::read_to_string(dir.path().join("2023-01-01.pdf")).unwrap(),
        "a.pdf"
    );
    assert_eq!(
        std::fs::read_to_string(dir.path().join("2023-01-01_1.pdf")).unwrap(),
        "b.pdf"
    );
}

#[test]
fn extraction_failure_skips_document_and_continues() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "bad.pdf");
    touch(dir.path(), "good.pdf");
    let backend = MockBackend::new()
        .with_failure("bad.pdf")
        .with_text("good.pdf", "paid 06/30/2022");

    let summary = pipeline::run(&config(dir.path()), &backend, |_| {}).unwrap();

    assert_eq!(summary.renamed.len(), 1);
    assert_eq!(summary.skipped.len(), 1);
    assert!(matches!(
        summary.skipped[0].1,
        SkipReason::ExtractionFailure(_)
    ));
    assert!(dir.path().join("bad.pdf").exists());
    assert!(dir.path().join("2022-06-30.pdf").exists());
}

#[test]
fn dateless_document_is_skipped_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "memo.pdf");
    let backend = MockBackend::new().with_text("memo.pdf", "no dates anywhere");

    let summary = pipeline::run(&config(dir.path()), &backend, |_| {}).unwrap();

    assert!(summary.renamed.is_empty());
    assert!(matches!(summary.skipped[0].1, SkipReason::NoDateFound));
    assert!(dir.path().join("memo.pdf").exists());
}

#[test]
fn vanished_source_is_reported_and_batch_continues() {
    let dir = tempfile::tempdir().unwrap();
    let victim = touch(dir.path(), "a.pdf");
    touch(dir.path(), "b.pdf");
    // Extracting b.pdf (after a.pdf, in sorted order) deletes a.pdf, so the
    // rename phase finds a's source gone.
    let backend = MockBackend::new()
        .with_text("a.pdf", "paid 01/01/2023")
        .with_text("b.pdf", "paid 02/01/2023")
        .deleting_on_extract("b.pdf", victim);

    let summary = pipeline::run(&config(dir.path()), &backend, |_| {}).unwrap();

    assert_eq!(summary.renamed.len(), 1);
    assert!(dir.path().join("2023-02-01.pdf").exists());
    assert_eq!(summary.skipped.len(), 1);
    assert!(matches!(summary.skipped[0].1, SkipReason::SourceMissing));
}

#[test]
fn backup_copies_plain_files_and_skips_directories() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "doc.pdf");
    touch(dir.path(), "notes.txt");
    std::fs::create_dir(dir.path().join("photos")).unwrap();
    let backend = MockBackend::new().with_text("doc.pdf", "paid 05/05/2021");

    pipeline::run(&config(dir.path()), &backend, |_| {}).unwrap();

    let backup = dir.path().join("backup");
    assert_eq!(file_names(&backup), vec!["doc.pdf", "notes.txt"]);
    assert_eq!(
        std::fs::read(backup.join("doc.pdf")).unwrap(),
        b"doc.pdf"
    );
}

#[test]
fn backup_is_idempotent_for_unchanged_inputs() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "notes.txt");
    touch(dir.path(), "ledger.csv");
    let backend = MockBackend::new(); // no PDFs, nothing to rename

    pipeline::run(&config(dir.path()), &backend, |_| {}).unwrap();
    let first: Vec<Vec<u8>> = file_names(&dir.path().join("backup"))
        .iter()
        .map(|n| std::fs::read(dir.path().join("backup").join(n)).unwrap())
        .collect();

    pipeline::run(&config(dir.path()), &backend, |_| {}).unwrap();
    let second: Vec<Vec<u8>> = file_names(&dir.path().join("backup"))
        .iter()
        .map(|n| std::fs::read(dir.path().join("backup").join(n)).unwrap())
        .collect();

    assert_eq!(first, second);
    assert_eq!(file_names(&dir.path().join("backup")), vec!["ledger.csv", "notes.txt"]);
}

#[test]
fn backup_can_be_disabled() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "doc.pdf");
    let backend = MockBackend::new().with_text("doc.pdf", "paid 05/05/2021");

    let mut config = config(dir.path());
    config.backup = false;
    pipeline::run(&config, &backend, |_| {}).unwrap();

    assert!(!dir.path().join("backup").exists());
    assert!(dir.path().join("2021-05-05.pdf").exists());
}

#[test]
fn non_pdf_files_are_never_processed() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "readme.txt");
    touch(dir.path(), "doc.PDF"); // extension match is case-insensitive
    let backend = MockBackend::new().with_text("doc.PDF", "paid 03/03/2023");

    let summary = pipeline::run(&config(dir.path()), &backend, |_| {}).unwrap();

    assert_eq!(summary.renamed.len(), 1);
    assert!(dir.path().join("readme.txt").exists());
    assert!(dir.path().join("2023-03-03.PDF").exists());
}

#[test]
fn progress_events_are_emitted_in_order() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "doc.pdf");
    let backend = MockBackend::new().with_text("doc.pdf", "paid 03/03/2023");

    let mut events = Vec::new();
    pipeline::run(&config(dir.path()), &backend, |e| events.push(e)).unwrap();

    assert!(matches!(events[0], ProgressEvent::BackupComplete { files: 1 }));
    assert!(matches!(events[1], ProgressEvent::Extracting { index: 0, total: 1, .. }));
    assert!(matches!(events[2], ProgressEvent::Renamed { .. }));
}

#[test]
fn plan_reports_targets_without_touching_disk() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "doc.pdf");
    touch(dir.path(), "memo.pdf");
    let backend = MockBackend::new()
        .with_text("doc.pdf", "paid 03/03/2023")
        .with_text("memo.pdf", "no dates");

    let plan = pipeline::plan(&config(dir.path()), &backend).unwrap();

    assert_eq!(plan.entries.len(), 2);
    assert!(plan.entries.iter().any(|e| matches!(
        &e.outcome,
        PlanOutcome::Rename { target } if target == "2023-03-03.pdf"
    )));
    assert!(plan.entries.iter().any(|e| matches!(
        &e.outcome,
        PlanOutcome::Skip(SkipReason::NoDateFound)
    )));
    // Nothing moved, nothing created.
    assert_eq!(file_names(dir.path()), vec!["doc.pdf", "memo.pdf"]);
}

#[test]
fn missing_root_is_a_setup_error() {
    let backend = MockBackend::new();
    let config = RunConfig::new("/nonexistent/chronofile-test-root");
    assert!(pipeline::run(&config, &backend, |_| {}).is_err());
}
