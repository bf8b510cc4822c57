//! End-to-end extraction runs over PNG sheet fixtures.

use std::sync::{Arc, Mutex};

use icon_extractor::pipeline::SnapshotOutcome;
use icon_extractor::{
    ExtractError, ImageCodec, IconOutcome, PerIconError, PreconditionError, ProgressCallback,
    ProgressEvent, run,
};

use crate::helpers::{Workspace, cell_colour, write_manifest, write_sheet};

#[test]
fn unmapped_icons_keep_lowercased_manifest_names() {
    let ws = Workspace::new();
    write_sheet(&ws.sheet, 32, 2, 2);
    write_manifest(&ws.manifest, [32, 32, 64, 64], &["Fire.DDS", "ice.dds", "Bolt.dds", "x.y.dds"]);

    let request = ws.config().to_request().unwrap();
    let report = run(&request, &ImageCodec, None).unwrap();

    assert!(report.all_succeeded());
    assert_eq!(report.per_row, 2);
    assert_eq!(
        ws.outputs(),
        vec!["bolt.png", "fire.png", "ice.png", "sheet.png", "x.y.png"]
    );

    let bolt = image::open(ws.out.join("bolt.png")).unwrap().to_rgba8();
    assert_eq!(bolt.dimensions(), (32, 32));
    assert!(bolt.pixels().all(|p| *p == cell_colour(2)));
}

#[test]
fn bad_entries_do_not_stop_later_icons() {
    let ws = Workspace::new();
    write_sheet(&ws.sheet, 16, 4, 1);
    write_manifest(
        &ws.manifest,
        [16, 16, 16, 64],
        &["a.dds", "", "../escape.dds", "d.dds", "beyond.dds", "e.dds"],
    );

    let request = ws.config().to_request().unwrap();
    let report = run(&request, &ImageCodec, None).unwrap();

    assert_eq!(report.total(), 6);
    assert_eq!((report.succeeded, report.failed), (2, 4));
    let errors: Vec<&PerIconError> = report.failures().map(|(_, e)| e).collect();
    assert!(matches!(errors[0], PerIconError::EmptyName));
    assert!(matches!(errors[1], PerIconError::InvalidName { .. }));
    assert!(matches!(errors[2], PerIconError::OutOfBounds { .. }));
    assert!(matches!(errors[3], PerIconError::OutOfBounds { .. }));

    // d.dds is still cell 3 despite the failures before it.
    let d = image::open(ws.out.join("d.png")).unwrap().to_rgba8();
    assert!(d.pixels().all(|p| *p == cell_colour(3)));
    assert!(!ws.dir.path().join("escape.png").exists());
}

#[test]
fn snapshot_can_be_disabled() {
    let ws = Workspace::new();
    write_sheet(&ws.sheet, 8, 1, 1);
    write_manifest(&ws.manifest, [8, 8, 8, 8], &["only.dds"]);

    let mut config = ws.config();
    config.output.snapshot = false;
    let report = run(&config.to_request().unwrap(), &ImageCodec, None).unwrap();

    assert_eq!(report.snapshot, SnapshotOutcome::Skipped);
    assert_eq!(ws.outputs(), vec!["only.png"]);
}

#[test]
fn snapshot_goes_to_its_own_directory() {
    let ws = Workspace::new();
    write_sheet(&ws.sheet, 8, 2, 1);
    write_manifest(&ws.manifest, [8, 8, 8, 16], &["a.dds"]);
    let snaps = ws.dir.path().join("snaps");
    std::fs::create_dir(&snaps).unwrap();

    let mut config = ws.config();
    config.output.snapshot_dir = Some(snaps.clone());
    let report = run(&config.to_request().unwrap(), &ImageCodec, None).unwrap();

    assert_eq!(
        report.snapshot,
        SnapshotOutcome::Written {
            path: snaps.join("sheet.png")
        }
    );
    let snapshot = image::open(snaps.join("sheet.png")).unwrap().to_rgba8();
    assert_eq!(snapshot.dimensions(), (16, 8));
    assert_eq!(ws.outputs(), vec!["a.png"]);
}

#[test]
fn icon_named_like_the_sheet_keeps_the_snapshot_intact() {
    let ws = Workspace::new();
    write_sheet(&ws.sheet, 8, 2, 1);
    write_manifest(&ws.manifest, [8, 8, 8, 16], &["a.dds", "sheet.dds"]);

    let report = run(&ws.config().to_request().unwrap(), &ImageCodec, None).unwrap();

    let snapshot = ws.out.join("sheet.png");
    assert_eq!(
        report.snapshot,
        SnapshotOutcome::Written {
            path: snapshot.clone()
        }
    );
    assert_eq!((report.succeeded, report.failed), (1, 1));
    assert!(matches!(
        report.items[1].outcome,
        IconOutcome::Failed {
            error: PerIconError::SnapshotCollision { .. }
        }
    ));
    let written = image::open(&snapshot).unwrap().to_rgba8();
    assert_eq!(written.dimensions(), (16, 8));
    assert_eq!(ws.outputs(), vec!["a.png", "sheet.png"]);
}

#[test]
fn colliding_icon_is_written_when_snapshot_is_elsewhere() {
    let ws = Workspace::new();
    write_sheet(&ws.sheet, 8, 2, 1);
    write_manifest(&ws.manifest, [8, 8, 8, 16], &["a.dds", "sheet.dds"]);
    let mut config = ws.config();
    config.output.snapshot = false;

    let report = run(&config.to_request().unwrap(), &ImageCodec, None).unwrap();

    assert!(report.all_succeeded());
    let icon = image::open(ws.out.join("sheet.png")).unwrap().to_rgba8();
    assert!(icon.pixels().all(|p| *p == cell_colour(1)));
}

#[test]
fn missing_manifest_aborts_before_writing() {
    let ws = Workspace::new();
    write_sheet(&ws.sheet, 8, 1, 1);

    let err = run(&ws.config().to_request().unwrap(), &ImageCodec, None).unwrap_err();
    assert!(matches!(
        err,
        ExtractError::Precondition(PreconditionError::ManifestMissing(_))
    ));
    assert!(ws.outputs().is_empty());
}

#[test]
fn invalid_grid_aborts_before_writing() {
    let ws = Workspace::new();
    write_sheet(&ws.sheet, 8, 1, 1);
    // Cell wider than the sheet: zero cells per row.
    write_manifest(&ws.manifest, [8, 64, 8, 8], &["a.dds"]);

    let err = run(&ws.config().to_request().unwrap(), &ImageCodec, None).unwrap_err();
    assert!(matches!(err, ExtractError::InvalidGridSpec { .. }));
    assert!(ws.outputs().is_empty());
}

#[test]
fn progress_events_arrive_in_order() {
    let ws = Workspace::new();
    write_sheet(&ws.sheet, 8, 2, 1);
    write_manifest(&ws.manifest, [8, 8, 8, 16], &["a.dds", "", "c.dds"]);

    let labels: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&labels);
    let callback: ProgressCallback = Box::new(move |event| {
        let label = match event {
            ProgressEvent::SheetDecoded { .. } => "decoded",
            ProgressEvent::NamesResolved { .. } => "names",
            ProgressEvent::ExtractionStarted { .. } => "started",
            ProgressEvent::IconWritten { .. } => "written",
            ProgressEvent::IconFailed { .. } => "failed",
            ProgressEvent::ExtractionFinished { .. } => "finished",
        };
        sink.lock().unwrap().push(label);
    });

    let report = run(&ws.config().to_request().unwrap(), &ImageCodec, Some(callback)).unwrap();
    assert!(matches!(report.items[2].outcome, IconOutcome::Failed { .. }));
    assert_eq!(
        *labels.lock().unwrap(),
        vec!["decoded", "names", "started", "written", "failed", "failed", "finished"]
    );
}

#[test]
fn report_serializes_for_tooling() {
    let ws = Workspace::new();
    write_sheet(&ws.sheet, 8, 1, 1);
    write_manifest(&ws.manifest, [8, 8, 8, 8], &["a.dds", "b.dds"]);

    let report = run(&ws.config().to_request().unwrap(), &ImageCodec, None).unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["succeeded"], 1);
    assert_eq!(json["items"][0]["status"], "success");
    assert_eq!(json["items"][1]["status"], "failed");
    assert_eq!(json["items"][1]["error"]["kind"], "out_of_bounds");
    assert_eq!(json["snapshot"]["status"], "written");
}
