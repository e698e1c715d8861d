//! Render-host abstraction: virtual cameras, off-screen targets, and the
//! single global "active target" slot.
//!
//! The orchestrator talks to the hosting engine only through [`RenderHost`].
//! [`SoftwareRenderHost`] is a deterministic in-process implementation used
//! by the CLI and tests.

use std::collections::BTreeMap;

use cubecap_common::{CubecapError, CubecapResult};
use cubecap_processing_core::{PixelBuffer, Quat, Vec3};

/// Everything needed to position one capture camera.
#[derive(Debug, Clone)]
pub struct CameraSpec {
    pub name: String,
    pub position: Vec3,
    pub orientation: Quat,
    pub fov_deg: f32,
    pub aspect: f32,
    pub culling_mask: u32,
    pub include_background: bool,
    pub background_color: [f32; 4],
}

/// Opaque handle to a camera proxy owned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CameraHandle(pub u64);

/// Opaque handle to an off-screen render target owned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TargetHandle(pub u64);

/// The seam to the hosting engine.
///
/// All calls are synchronous; the orchestrator owns exactly which handles
/// are alive and releases each exactly once during Cleanup.
pub trait RenderHost {
    fn create_camera(&mut self, spec: &CameraSpec) -> CubecapResult<CameraHandle>;
    fn create_target(&mut self, resolution: u32) -> CubecapResult<TargetHandle>;

    /// Render the camera's view into the target, blocking until done.
    fn render(&mut self, camera: CameraHandle, target: TargetHandle) -> CubecapResult<()>;

    /// Read back the target's pixels, top row first.
    fn read_pixels(&mut self, target: TargetHandle) -> CubecapResult<PixelBuffer>;

    fn active_target(&self) -> Option<TargetHandle>;
    fn set_active_target(&mut self, target: Option<TargetHandle>);

    fn release_camera(&mut self, camera: CameraHandle);
    fn release_target(&mut self, target: TargetHandle);

    /// Pause/resume the host's global clock while a capture is in flight.
    fn pause_clock(&mut self);
    fn resume_clock(&mut self);
}

/// Scoped holder of the global active-target slot.
///
/// Records the prior slot value on construction and restores it when
/// dropped, so every exit path of the Processing step (including `?`)
/// leaves the host the way it was found.
pub struct ActiveTargetGuard<'a, H: RenderHost + ?Sized> {
    host: &'a mut H,
    prior: Option<TargetHandle>,
}

impl<'a, H: RenderHost + ?Sized> ActiveTargetGuard<'a, H> {
    pub fn new(host: &'a mut H) -> Self {
        let prior = host.active_target();
        Self { host, prior }
    }

    /// Make `target` the active target.
    pub fn bind(&mut self, target: TargetHandle) {
        self.host.set_active_target(Some(target));
    }

    pub fn host(&mut self) -> &mut H {
        self.host
    }
}

impl<H: RenderHost + ?Sized> Drop for ActiveTargetGuard<'_, H> {
    fn drop(&mut self) {
        self.host.set_active_target(self.prior);
    }
}

#[derive(Debug)]
struct SoftwareTarget {
    resolution: u32,
    pixels: Option<PixelBuffer>,
}

/// Deterministic in-process render host.
///
/// "Rendering" fills the target with a flat color derived from the
/// camera's forward direction (or the configured background color when
/// the backdrop is disabled), which keeps faces distinguishable in tests
/// and CLI output without a scene.
#[derive(Debug, Default)]
pub struct SoftwareRenderHost {
    next_handle: u64,
    cameras: BTreeMap<u64, CameraSpec>,
    targets: BTreeMap<u64, SoftwareTarget>,
    active: Option<TargetHandle>,
    clock_paused: bool,
    fail_renders: bool,
    fail_reads: bool,
}

impl SoftwareRenderHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (unreleased) cameras.
    pub fn live_cameras(&self) -> usize {
        self.cameras.len()
    }

    /// Number of live (unreleased) targets.
    pub fn live_targets(&self) -> usize {
        self.targets.len()
    }

    pub fn clock_paused(&self) -> bool {
        self.clock_paused
    }

    /// Make every subsequent render call fail. Failure injection for
    /// error-path tests.
    pub fn set_fail_renders(&mut self, fail: bool) {
        self.fail_renders = fail;
    }

    /// Make every subsequent readback fail.
    pub fn set_fail_reads(&mut self, fail: bool) {
        self.fail_reads = fail;
    }

    fn allocate_handle(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }
}

/// Map a unit direction component from [-1, 1] to a byte.
fn direction_byte(component: f32) -> u8 {
    ((component.clamp(-1.0, 1.0) + 1.0) * 127.5).round() as u8
}

fn color_byte(component: f32) -> u8 {
    (component.clamp(0.0, 1.0) * 255.0).round() as u8
}

impl RenderHost for SoftwareRenderHost {
    fn create_camera(&mut self, spec: &CameraSpec) -> CubecapResult<CameraHandle> {
        let id = self.allocate_handle();
        self.cameras.insert(id, spec.clone());
        tracing::debug!(camera = %spec.name, id, "Created camera proxy");
        Ok(CameraHandle(id))
    }

    fn create_target(&mut self, resolution: u32) -> CubecapResult<TargetHandle> {
        let id = self.allocate_handle();
        self.targets.insert(
            id,
            SoftwareTarget {
                resolution,
                pixels: None,
            },
        );
        Ok(TargetHandle(id))
    }

    fn render(&mut self, camera: CameraHandle, target: TargetHandle) -> CubecapResult<()> {
        if self.fail_renders {
            return Err(CubecapError::render("injected render failure"));
        }
        let spec = self
            .cameras
            .get(&camera.0)
            .ok_or_else(|| CubecapError::render(format!("unknown camera {camera:?}")))?;

        let forward = spec.orientation.rotate(Vec3::Z);
        let rgba = if spec.include_background {
            [
                direction_byte(forward.x),
                direction_byte(forward.y),
                direction_byte(forward.z),
                255,
            ]
        } else {
            let [r, g, b, a] = spec.background_color;
            [color_byte(r), color_byte(g), color_byte(b), color_byte(a)]
        };

        let slot = self
            .targets
            .get_mut(&target.0)
            .ok_or_else(|| CubecapError::render(format!("unknown target {target:?}")))?;
        slot.pixels = Some(PixelBuffer::filled(slot.resolution, slot.resolution, rgba));
        Ok(())
    }

    fn read_pixels(&mut self, target: TargetHandle) -> CubecapResult<PixelBuffer> {
        if self.fail_reads {
            return Err(CubecapError::render("injected readback failure"));
        }
        self.targets
            .get(&target.0)
            .and_then(|t| t.pixels.clone())
            .ok_or_else(|| CubecapError::render(format!("target {target:?} has no rendered pixels")))
    }

    fn active_target(&self) -> Option<TargetHandle> {
        self.active
    }

    fn set_active_target(&mut self, target: Option<TargetHandle>) {
        self.active = target;
    }

    fn release_camera(&mut self, camera: CameraHandle) {
        self.cameras.remove(&camera.0);
    }

    fn release_target(&mut self, target: TargetHandle) {
        self.targets.remove(&target.0);
    }

    fn pause_clock(&mut self) {
        self.clock_paused = true;
    }

    fn resume_clock(&mut self) {
        self.clock_paused = false;
    }
}
