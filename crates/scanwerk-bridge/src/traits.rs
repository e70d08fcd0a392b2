// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait definitions for native acquisition capabilities.
//
// Each trait wraps one platform API (permission subsystem, camera hardware,
// photo library, file chooser). Platforms that lack a channel report it
// through the `has_*`/`supports_*` probes and return
// `ScanwerkError::PlatformUnavailable` if called anyway.

use async_trait::async_trait;
use scanwerk_core::error::Result;
use scanwerk_core::types::Payload;

/// Unified bridge that groups all native acquisition capabilities.
pub trait PlatformBridge:
    NativePermissions
    + NativeCamera
    + NativeCameraStream
    + NativeGallery
    + NativeFilePicker
    + NativeAssetReader
    + Send
    + Sync
{
    /// Human-readable platform name (e.g. "iOS 17", "Android 14").
    fn platform_name(&self) -> &str;
}

/// State of the camera permission as last reported by the OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
    /// Never asked, or the OS will prompt again.
    Undetermined,
}

/// Camera permission queries.
#[async_trait]
pub trait NativePermissions: Send + Sync {
    /// Current permission status without prompting.
    fn camera_permission(&self) -> PermissionStatus;

    /// Prompt the user for camera access. Resolves to whether access was granted.
    async fn request_camera_permission(&self) -> Result<bool>;
}

/// One-shot system camera UI.
#[async_trait]
pub trait NativeCamera: Send + Sync {
    /// Whether a system camera UI exists on this platform.
    fn has_native_camera(&self) -> bool;

    /// Launch the system camera. `quality` is a JPEG quality hint in 0.0–1.0.
    async fn capture_image(&self, quality: f32) -> Result<PickerOutcome>;
}

/// Long-lived camera preview stream.
pub trait NativeCameraStream: Send + Sync {
    /// Whether a live preview can be embedded on this platform.
    fn supports_live_stream(&self) -> bool;

    /// Start the preview. The returned stream holds the camera until stopped.
    fn open_stream(&self) -> Result<Box<dyn CameraStream>>;
}

/// An open camera preview.
#[async_trait]
pub trait CameraStream: Send {
    /// Grab one still frame from the running preview.
    async fn take_picture(&mut self, options: FrameOptions) -> Result<CapturedFrame>;

    /// Release the camera. Must be idempotent.
    fn stop(&mut self);

    fn is_active(&self) -> bool;
}

/// Device photo library.
#[async_trait]
pub trait NativeGallery: Send + Sync {
    fn has_gallery(&self) -> bool;

    /// Show the photo library picker, filtered to the given extensions.
    async fn pick_from_gallery(&self, extensions: &[&str]) -> Result<PickerOutcome>;
}

/// Generic file chooser.
#[async_trait]
pub trait NativeFilePicker: Send + Sync {
    fn has_file_picker(&self) -> bool;

    /// Show a file picker filtered to the given extensions.
    async fn pick_file(&self, extensions: &[&str]) -> Result<PickerOutcome>;
}

/// Reads payloads that are only reachable through a platform handle.
#[async_trait]
pub trait NativeAssetReader: Send + Sync {
    /// Read the full contents behind a `content://`, `ph://` or `file://` URI.
    async fn read_handle(&self, uri: &str) -> Result<Vec<u8>>;
}

// ---------------------------------------------------------------------------
// Data handed back by the platform
// ---------------------------------------------------------------------------

/// Options for grabbing a still frame from a live stream.
#[derive(Debug, Clone, Copy)]
pub struct FrameOptions {
    /// JPEG quality hint in 0.0–1.0.
    pub quality: f32,
    /// Ask the platform to include a base64 copy of the frame.
    pub base64: bool,
}

impl Default for FrameOptions {
    fn default() -> Self {
        Self {
            quality: 0.8,
            base64: true,
        }
    }
}

/// A still frame taken from a live stream. Always JPEG.
#[derive(Debug, Clone)]
pub struct CapturedFrame {
    pub payload: Payload,
    pub width: u32,
    pub height: u32,
    /// Bare base64 (no data-URI prefix), when requested and supported.
    pub base64: Option<String>,
}

/// One item returned by a picker or the system camera.
#[derive(Debug, Clone)]
pub struct PickedImage {
    pub payload: Payload,
    pub mime_type: Option<String>,
    pub file_size: Option<u64>,
    pub file_name: Option<String>,
    pub base64: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl PickedImage {
    pub fn new(payload: Payload) -> Self {
        Self {
            payload,
            mime_type: None,
            file_size: None,
            file_name: None,
            base64: None,
            width: None,
            height: None,
        }
    }
}

/// What a picker resolved with. Platforms differ in how they report an
/// abandoned picker, so both the flag and an empty list are possible.
#[derive(Debug, Clone, Default)]
pub struct PickerOutcome {
    pub cancelled: bool,
    pub assets: Vec<PickedImage>,
}

impl PickerOutcome {
    pub fn cancelled() -> Self {
        Self {
            cancelled: true,
            assets: Vec::new(),
        }
    }

    pub fn picked(image: PickedImage) -> Self {
        Self {
            cancelled: false,
            assets: vec![image],
        }
    }

    /// The first picked asset, or `None` when nothing usable came back.
    pub fn into_first(self) -> Option<PickedImage> {
        if self.cancelled {
            return None;
        }
        self.assets.into_iter().next()
    }
}
