//! The capture state machine.
//!
//! One step runs per external `tick()`; control returns to the caller
//! between steps. Any error inside a step logs and forces an immediate
//! transition through Cleanup, so cameras and targets are never left
//! allocated. Partially written face files are left in place.

use std::path::{Path, PathBuf};

use cubecap_common::{CaptureConfig, CubecapError, CubecapResult};
use cubecap_processing_core::Vec3;
use cubecap_storage_index::{
    export_probe_settings, sanitize_object_name, ProbeExportRecord, StorageError, StorageIndex,
};

use crate::encoder::FaceEncoder;
use crate::faces::{camera_orientation, FACES};
use crate::render::{ActiveTargetGuard, CameraHandle, CameraSpec, RenderHost, TargetHandle};

/// State-machine step. Exactly one step runs per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Idle,
    Preparing,
    Rendering,
    Processing,
    Cleanup,
}

/// Result of driving the state machine one step forward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// No session is active.
    Idle,
    /// The named step completed; call `tick()` again to continue.
    Working(Step),
    /// The session finished; all faces were written to this folder.
    Completed(PathBuf),
    /// The session ended without output (declined overwrite or error).
    Aborted,
}

/// Injected yes/no decision point, called by the orchestrator and never by
/// the storage core. The interactive layer supplies the real one.
pub trait DecisionPolicy {
    /// Existing output was found in `folder`; capture over it?
    fn confirm_overwrite(&self, folder: &Path) -> bool;
}

/// Policy that always proceeds.
pub struct AlwaysProceed;

impl DecisionPolicy for AlwaysProceed {
    fn confirm_overwrite(&self, _folder: &Path) -> bool {
        true
    }
}

/// Policy that always declines to overwrite.
pub struct DeclineOverwrite;

impl DecisionPolicy for DeclineOverwrite {
    fn confirm_overwrite(&self, _folder: &Path) -> bool {
        false
    }
}

/// A single capture request.
#[derive(Debug, Clone)]
pub struct CaptureRequest {
    /// Storage identity of the captured object.
    pub object_id: String,
    /// World position the cube is captured around.
    pub origin: Vec3,
    /// Probe parameters to export alongside the faces, when the source is
    /// a reflection probe.
    pub probe: Option<ProbeExportRecord>,
}

/// Ephemeral in-flight state. At most one exists per orchestrator.
#[derive(Debug)]
struct CaptureSession {
    request: CaptureRequest,
    output_path: Option<PathBuf>,
    cameras: Vec<CameraHandle>,
    targets: Vec<TargetHandle>,
    step: Step,
    aborted: bool,
}

/// Drives a capture from request through cleanup.
pub struct CaptureOrchestrator<H: RenderHost> {
    host: H,
    index: StorageIndex,
    config: CaptureConfig,
    high_res_consent: bool,
    encoder: FaceEncoder,
    policy: Box<dyn DecisionPolicy>,
    session: Option<CaptureSession>,
}

impl<H: RenderHost> CaptureOrchestrator<H> {
    pub fn new(host: H, index: StorageIndex, config: CaptureConfig, high_res_consent: bool) -> Self {
        Self {
            host,
            index,
            config,
            high_res_consent,
            encoder: FaceEncoder::new(),
            policy: Box::new(AlwaysProceed),
            session: None,
        }
    }

    pub fn with_policy(mut self, policy: Box<dyn DecisionPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_encoder(mut self, encoder: FaceEncoder) -> Self {
        self.encoder = encoder;
        self
    }

    /// Request a capture of `object_id` around `origin`.
    ///
    /// Validation (resolution bounds, consent, identity) happens here,
    /// synchronously and with zero side effects on rejection. The actual
    /// work runs across subsequent `tick()` calls.
    pub fn request_capture(
        &mut self,
        object_id: impl Into<String>,
        origin: Vec3,
    ) -> CubecapResult<()> {
        self.request(CaptureRequest {
            object_id: object_id.into(),
            origin,
            probe: None,
        })
    }

    /// Request a capture of a reflection probe, exporting its parameters
    /// next to the face images.
    pub fn request_probe_export(
        &mut self,
        probe_id: impl Into<String>,
        origin: Vec3,
        settings: ProbeExportRecord,
    ) -> CubecapResult<()> {
        self.request(CaptureRequest {
            object_id: probe_id.into(),
            origin,
            probe: Some(settings),
        })
    }

    fn request(&mut self, request: CaptureRequest) -> CubecapResult<()> {
        if self.session.is_some() {
            tracing::warn!(
                object = %request.object_id,
                "Capture already in progress; request rejected"
            );
            return Err(CubecapError::CaptureInProgress);
        }

        self.config.validate(self.high_res_consent)?;

        if sanitize_object_name(&request.object_id).is_empty() {
            return Err(CubecapError::missing_identity(request.object_id));
        }

        tracing::info!(object = %request.object_id, "Capture requested");
        self.session = Some(CaptureSession {
            request,
            output_path: None,
            cameras: Vec::with_capacity(FACES.len()),
            targets: Vec::with_capacity(FACES.len()),
            step: Step::Preparing,
            aborted: false,
        });
        Ok(())
    }

    pub fn is_capturing(&self) -> bool {
        self.session.is_some()
    }

    /// The step the next tick will run.
    pub fn step(&self) -> Step {
        self.session.as_ref().map_or(Step::Idle, |s| s.step)
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn index(&self) -> &StorageIndex {
        &self.index
    }

    /// Run exactly one state-machine step and return control.
    pub fn tick(&mut self) -> TickOutcome {
        let step = match &self.session {
            None => return TickOutcome::Idle,
            Some(session) => session.step,
        };

        let result = match step {
            Step::Idle => return TickOutcome::Idle,
            Step::Preparing => self.prepare(),
            Step::Rendering => self.render(),
            Step::Processing => self.process(),
            Step::Cleanup => return self.cleanup(),
        };

        match result {
            Ok(()) => TickOutcome::Working(step),
            Err(e) => {
                tracing::error!(error = %e, ?step, "Capture step failed; cleaning up");
                if let Some(session) = self.session.as_mut() {
                    session.aborted = true;
                }
                self.cleanup()
            }
        }
    }

    /// Drive the state machine until the session ends. Convenience for
    /// hosts without a frame loop (the CLI).
    pub fn run_to_completion(&mut self) -> TickOutcome {
        loop {
            match self.tick() {
                TickOutcome::Working(_) => continue,
                outcome => return outcome,
            }
        }
    }

    /// Preparing: storage prepare, overwrite gate, camera and target
    /// allocation. Declining the overwrite aborts before any allocation.
    fn prepare(&mut self) -> CubecapResult<()> {
        let (object_id, is_probe, origin) = {
            let session = self.session_mut();
            (
                session.request.object_id.clone(),
                session.request.probe.is_some(),
                session.request.origin,
            )
        };

        let folder = self
            .index
            .prepare_capture(&object_id, is_probe)
            .map_err(|e| match e {
                StorageError::EmptyObjectId => CubecapError::missing_identity(object_id.clone()),
                StorageError::CreateDir { path, source } => {
                    CubecapError::DirectoryCreate { path, source }
                }
                other => CubecapError::storage(other.to_string()),
            })?;

        if StorageIndex::has_existing_output(&folder) && !self.policy.confirm_overwrite(&folder) {
            tracing::info!(path = %folder.display(), "Existing output kept; capture aborted");
            let session = self.session_mut();
            session.aborted = true;
            session.step = Step::Cleanup;
            return Ok(());
        }

        self.session_mut().output_path = Some(folder);
        self.host.pause_clock();

        for face in &FACES {
            let spec = CameraSpec {
                name: format!("CubemapCam_{}", face.name),
                position: origin,
                orientation: camera_orientation(face),
                fov_deg: 90.0,
                aspect: 1.0,
                culling_mask: self.config.culling_mask,
                include_background: self.config.include_background,
                background_color: self.config.background_color,
            };
            let camera = self.host.create_camera(&spec)?;
            self.session_mut().cameras.push(camera);

            let target = self.host.create_target(self.config.resolution)?;
            self.session_mut().targets.push(target);
        }

        self.session_mut().step = Step::Rendering;
        Ok(())
    }

    /// Rendering: all six faces, synchronously, within this tick.
    fn render(&mut self) -> CubecapResult<()> {
        let pairs: Vec<(CameraHandle, TargetHandle)> = {
            let session = self.session_mut();
            session
                .cameras
                .iter()
                .copied()
                .zip(session.targets.iter().copied())
                .collect()
        };

        for (camera, target) in pairs {
            self.host.render(camera, target)?;
        }

        self.session_mut().step = Step::Processing;
        Ok(())
    }

    /// Processing: read back, flip where the scan origin differs, encode
    /// with fallback, write files, export probe settings.
    fn process(&mut self) -> CubecapResult<()> {
        let (folder, probe, targets) = {
            let session = self.session_mut();
            (
                session
                    .output_path
                    .clone()
                    .ok_or_else(|| CubecapError::storage("session has no output path"))?,
                session.request.probe.clone(),
                session.targets.clone(),
            )
        };

        if let Some(settings) = probe {
            // Failure is logged inside and does not abort the capture.
            export_probe_settings(&settings, &folder);
        }

        let format = self.config.format;
        let mut guard = ActiveTargetGuard::new(&mut self.host);
        for (face, target) in FACES.iter().zip(targets) {
            guard.bind(target);
            let pixels = guard.host().read_pixels(target)?;
            let pixels = if format.requires_vertical_flip() {
                pixels.flipped_vertically()
            } else {
                pixels
            };

            let encoded = self.encoder.encode(&pixels, format)?;
            let file = folder.join(format!("{}.{}", face.name, encoded.extension));
            std::fs::write(&file, &encoded.bytes)?;
            tracing::info!(face = face.name, path = %file.display(), "Saved face");
        }
        drop(guard);

        self.session_mut().step = Step::Cleanup;
        Ok(())
    }

    /// Cleanup: release everything, restore the clock, report the result.
    ///
    /// Tolerates partial allocation and is safe to reach from any step;
    /// once the session is taken, further ticks observe Idle.
    fn cleanup(&mut self) -> TickOutcome {
        let Some(mut session) = self.session.take() else {
            return TickOutcome::Idle;
        };

        self.host.set_active_target(None);
        for target in session.targets.drain(..) {
            self.host.release_target(target);
        }
        for camera in session.cameras.drain(..) {
            self.host.release_camera(camera);
        }
        self.host.resume_clock();

        if session.aborted {
            tracing::warn!(object = %session.request.object_id, "Capture aborted");
            return TickOutcome::Aborted;
        }
        match session.output_path {
            Some(path) => {
                tracing::info!(path = %path.display(), "Capture complete");
                TickOutcome::Completed(path)
            }
            None => TickOutcome::Aborted,
        }
    }

    fn session_mut(&mut self) -> &mut CaptureSession {
        self.session.as_mut().expect("step ran without a session")
    }
}
