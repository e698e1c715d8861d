//! End-to-end capture flow against the software render host.

use std::path::PathBuf;

use chrono::{DateTime, TimeZone, Utc};
use cubecap_capture_engine::{
    CaptureOrchestrator, DeclineOverwrite, FaceEncoder, LossyAlphaCodec, RenderHost,
    SoftwareRenderHost, Step, TickOutcome,
};
use cubecap_common::{CaptureConfig, CubecapError, CubecapResult, ImageFormat};
use cubecap_processing_core::{PixelBuffer, Vec3};
use cubecap_storage_index::{ProbeExportRecord, StorageIndex, FACE_NAMES, PROBE_SETTINGS_FILE};

fn fixed_noon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap()
}

fn orchestrator(
    root: &std::path::Path,
    config: CaptureConfig,
    consent: bool,
) -> CaptureOrchestrator<SoftwareRenderHost> {
    let index = StorageIndex::with_clock(root, fixed_noon);
    CaptureOrchestrator::new(SoftwareRenderHost::new(), index, config, consent)
}

fn small_config(format: ImageFormat) -> CaptureConfig {
    CaptureConfig {
        resolution: 256,
        format,
        ..CaptureConfig::default()
    }
}

struct FailingCodec;

impl LossyAlphaCodec for FailingCodec {
    fn encode(&self, _pixels: &PixelBuffer, _quality: u8) -> CubecapResult<Vec<u8>> {
        Err(CubecapError::encoding("simulated native codec failure"))
    }
}

fn face_files(folder: &std::path::Path, ext: &str) -> Vec<PathBuf> {
    FACE_NAMES
        .iter()
        .map(|face| folder.join(format!("{face}.{ext}")))
        .collect()
}

#[test]
fn capture_walks_the_step_sequence_and_writes_all_faces() {
    let dir = tempfile::tempdir().unwrap();
    let mut orch = orchestrator(dir.path(), small_config(ImageFormat::Png), false);

    orch.request_capture("Lamp", Vec3::ZERO).unwrap();
    assert!(orch.is_capturing());

    assert_eq!(orch.tick(), TickOutcome::Working(Step::Preparing));
    assert!(orch.host().clock_paused());
    assert_eq!(orch.host().live_cameras(), 6);
    assert_eq!(orch.host().live_targets(), 6);

    assert_eq!(orch.tick(), TickOutcome::Working(Step::Rendering));
    assert_eq!(orch.tick(), TickOutcome::Working(Step::Processing));

    let outcome = orch.tick();
    let TickOutcome::Completed(folder) = outcome else {
        panic!("expected completion, got {outcome:?}");
    };

    for file in face_files(&folder, "png") {
        assert!(file.is_file(), "{file:?} missing");
    }
    assert!(folder.join("metadata.json").is_file());
    assert!(StorageIndex::has_existing_output(&folder));

    // Everything released, clock restored, machine back to idle.
    assert_eq!(orch.host().live_cameras(), 0);
    assert_eq!(orch.host().live_targets(), 0);
    assert!(!orch.host().clock_paused());
    assert!(!orch.is_capturing());
    assert_eq!(orch.tick(), TickOutcome::Idle);
}

#[test]
fn second_request_is_rejected_while_capturing() {
    let dir = tempfile::tempdir().unwrap();
    let mut orch = orchestrator(dir.path(), small_config(ImageFormat::Png), false);

    orch.request_capture("Lamp", Vec3::ZERO).unwrap();
    orch.tick();
    let step_before = orch.step();

    let err = orch.request_capture("Other", Vec3::ZERO).unwrap_err();
    assert!(matches!(err, CubecapError::CaptureInProgress));

    // First session untouched, and it still completes.
    assert_eq!(orch.step(), step_before);
    assert!(matches!(
        orch.run_to_completion(),
        TickOutcome::Completed(_)
    ));
}

#[test]
fn out_of_bounds_resolution_is_rejected_with_no_side_effects() {
    let dir = tempfile::tempdir().unwrap();
    let config = CaptureConfig {
        resolution: 128,
        ..CaptureConfig::default()
    };
    let mut orch = orchestrator(dir.path(), config, false);

    let err = orch.request_capture("Lamp", Vec3::ZERO).unwrap_err();
    assert!(matches!(err, CubecapError::Config { .. }));
    assert!(!orch.is_capturing());
    assert_eq!(orch.host().live_cameras(), 0);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn high_resolution_without_consent_is_rejected_before_allocation() {
    let dir = tempfile::tempdir().unwrap();
    let config = CaptureConfig {
        resolution: 8192,
        ..CaptureConfig::default()
    };
    let mut orch = orchestrator(dir.path(), config.clone(), false);

    let err = orch.request_capture("Lamp", Vec3::ZERO).unwrap_err();
    assert!(matches!(err, CubecapError::ConsentMissing));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);

    // With consent the same request is accepted.
    let mut orch = orchestrator(dir.path(), config, true);
    orch.request_capture("Lamp", Vec3::ZERO).unwrap();
    assert!(orch.is_capturing());
    assert_eq!(orch.step(), Step::Preparing);
}

#[test]
fn empty_identity_is_rejected_before_allocation() {
    let dir = tempfile::tempdir().unwrap();
    let mut orch = orchestrator(dir.path(), small_config(ImageFormat::Png), false);

    let err = orch.request_capture("(((", Vec3::ZERO).unwrap_err();
    assert!(matches!(err, CubecapError::MissingIdentity { .. }));
    assert!(!orch.is_capturing());
}

#[test]
fn declined_overwrite_aborts_without_allocating() {
    let dir = tempfile::tempdir().unwrap();
    let mut orch = orchestrator(dir.path(), small_config(ImageFormat::Png), false);
    orch.request_capture("Lamp", Vec3::ZERO).unwrap();
    let TickOutcome::Completed(folder) = orch.run_to_completion() else {
        panic!("first capture should complete");
    };

    let index = StorageIndex::with_clock(dir.path(), fixed_noon);
    let mut orch = CaptureOrchestrator::new(
        SoftwareRenderHost::new(),
        index,
        small_config(ImageFormat::Png),
        false,
    )
    .with_policy(Box::new(DeclineOverwrite));

    orch.request_capture("Lamp", Vec3::ZERO).unwrap();
    assert_eq!(orch.tick(), TickOutcome::Working(Step::Preparing));
    // The decline happened before any camera or target was created.
    assert_eq!(orch.host().live_cameras(), 0);
    assert_eq!(orch.host().live_targets(), 0);
    assert!(!orch.host().clock_paused());
    assert_eq!(orch.tick(), TickOutcome::Aborted);

    // The earlier output is still intact.
    assert!(StorageIndex::has_existing_output(&folder));
}

#[test]
fn webp_encoder_failure_degrades_to_png_files() {
    let dir = tempfile::tempdir().unwrap();
    let index = StorageIndex::with_clock(dir.path(), fixed_noon);
    let mut orch = CaptureOrchestrator::new(
        SoftwareRenderHost::new(),
        index,
        small_config(ImageFormat::Webp { quality: 80 }),
        false,
    )
    .with_encoder(FaceEncoder::with_codec(Box::new(FailingCodec)));

    orch.request_capture("Lamp", Vec3::ZERO).unwrap();
    let TickOutcome::Completed(folder) = orch.run_to_completion() else {
        panic!("capture should complete through the fallback");
    };

    // Extensions match the format actually produced, not the requested one.
    for file in face_files(&folder, "png") {
        assert!(file.is_file(), "{file:?} missing");
    }
    for file in face_files(&folder, "webp") {
        assert!(!file.exists(), "{file:?} should not exist");
    }

    // The fallback bytes decode as PNG.
    let bytes = std::fs::read(folder.join("Left.png")).unwrap();
    assert!(image::load_from_memory(&bytes).is_ok());
}

#[test]
fn render_failure_forces_cleanup_without_leaks() {
    let dir = tempfile::tempdir().unwrap();
    let mut orch = orchestrator(dir.path(), small_config(ImageFormat::Png), false);

    orch.request_capture("Lamp", Vec3::ZERO).unwrap();
    assert_eq!(orch.tick(), TickOutcome::Working(Step::Preparing));
    orch.host_mut().set_fail_renders(true);

    assert_eq!(orch.tick(), TickOutcome::Aborted);
    assert_eq!(orch.host().live_cameras(), 0);
    assert_eq!(orch.host().live_targets(), 0);
    assert!(!orch.host().clock_paused());
    assert_eq!(orch.host().active_target(), None);
    assert!(!orch.is_capturing());
}

#[test]
fn probe_export_writes_settings_next_to_faces() {
    let dir = tempfile::tempdir().unwrap();
    let mut orch = orchestrator(dir.path(), small_config(ImageFormat::Png), false);

    let settings = ProbeExportRecord {
        intensity: 2.0,
        box_projection: true,
        ..ProbeExportRecord::default()
    };
    orch.request_probe_export("Probe_Main", Vec3::ZERO, settings.clone())
        .unwrap();
    let TickOutcome::Completed(folder) = orch.run_to_completion() else {
        panic!("probe export should complete");
    };

    assert!(folder.ends_with("Probe_Main_2026-03-14_12-00-00"));
    let json = std::fs::read_to_string(folder.join(PROBE_SETTINGS_FILE)).unwrap();
    let back: ProbeExportRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(back, settings);

    let record = orch.index().record("Probe_Main").unwrap();
    assert!(record.is_probe_source);
}

#[test]
fn repeated_captures_accumulate_history_in_one_folder() {
    let dir = tempfile::tempdir().unwrap();
    let mut orch = orchestrator(dir.path(), small_config(ImageFormat::Png), false);

    orch.request_capture("Lamp", Vec3::ZERO).unwrap();
    let TickOutcome::Completed(first) = orch.run_to_completion() else {
        panic!("first capture should complete");
    };

    orch.request_capture("Lamp", Vec3::ZERO).unwrap();
    let TickOutcome::Completed(second) = orch.run_to_completion() else {
        panic!("second capture should complete");
    };

    assert_eq!(first, second);
    let record = orch.index().record("Lamp").unwrap();
    assert_eq!(record.capture_history.len(), 2);
    assert!(record.capture_history[0] <= record.capture_history[1]);
    assert_eq!(
        record.last_capture_date.as_deref(),
        record.capture_history.last().map(String::as_str)
    );
}
