//! CubeCap Capture Engine
//!
//! Orchestrates a one-shot, six-face cubemap capture around a point and
//! writes the result into the object's storage folder.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────┐
//! │             CaptureOrchestrator                │
//! │   Idle → Preparing → Rendering → Processing    │
//! │                  ↘ Cleanup ↙                   │
//! │  ┌──────────┐ ┌─────────────┐ ┌─────────────┐  │
//! │  │ Render   │ │ FaceEncoder │ │ StorageIndex│  │
//! │  │ Host     │ │ (fallback)  │ │ (identity)  │  │
//! │  └──────────┘ └─────────────┘ └─────────────┘  │
//! │        │             │               │         │
//! │        ▼             ▼               ▼         │
//! │  ┌──────────────────────────────────────────┐  │
//! │  │        Capture Folder (Disk)             │  │
//! │  │  Left.png ... Back.png  metadata.json    │  │
//! │  └──────────────────────────────────────────┘  │
//! └────────────────────────────────────────────────┘
//! ```
//!
//! One state-machine step runs per external `tick()`; the host regains
//! control between steps.

pub mod encoder;
pub mod faces;
pub mod orchestrator;
pub mod render;

pub use encoder::*;
pub use faces::*;
pub use orchestrator::*;
pub use render::*;
