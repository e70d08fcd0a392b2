// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scripted in-memory platform shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use scanwerk_bridge::traits::{
    CameraStream, CapturedFrame, FrameOptions, NativeAssetReader, NativeCamera,
    NativeCameraStream, NativeFilePicker, NativeGallery, NativePermissions, PermissionStatus,
    PickedImage, PickerOutcome, PlatformBridge,
};
use scanwerk_capture::source::{
    FilePickerSource, GallerySource, LiveCameraSource, NativeCameraSource,
};
use scanwerk_capture::{
    CapabilityBroker, CaptureObserver, CaptureResult, FailureNotice, Phase, PipelineController,
};
use scanwerk_core::config::ValidationPolicy;
use scanwerk_core::error::{Result, ScanwerkError};
use scanwerk_core::types::{Payload, SessionId};

/// 1x1 transparent PNG.
pub const TINY_PNG: [u8; 67] = [
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F, 0x15, 0xC4,
    0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00, 0x01, 0x00, 0x00,
    0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE,
    0x42, 0x60, 0x82,
];

/// How a single-shot channel answers.
#[derive(Clone)]
pub enum Script {
    Pick(PickerOutcome),
    Fail(String),
    /// Never resolves; only an abort ends it.
    Hang,
}

impl Script {
    async fn play(&self) -> Result<PickerOutcome> {
        match self {
            Script::Pick(outcome) => Ok(outcome.clone()),
            Script::Fail(reason) => Err(ScanwerkError::Bridge(reason.clone())),
            Script::Hang => std::future::pending().await,
        }
    }
}

/// A picked image with the given MIME type and declared size.
pub fn picked(payload: Payload, mime: &str, size: Option<u64>) -> PickedImage {
    let mut image = PickedImage::new(payload);
    image.mime_type = Some(mime.to_owned());
    image.file_size = size;
    image
}

pub fn pick(image: PickedImage) -> Script {
    Script::Pick(PickerOutcome::picked(image))
}

/// The policy from the admission scenarios.
pub fn scenario_policy() -> Arc<ValidationPolicy> {
    Arc::new(ValidationPolicy::new(["image/jpeg", "image/png"], 10_000_000).unwrap())
}

pub struct FakeBridge {
    permission: Mutex<PermissionStatus>,
    grant_on_request: bool,
    prompt_delay: Duration,
    pub permission_requests: AtomicUsize,

    pub live_stream: bool,
    pub native_camera: bool,
    pub gallery: bool,
    pub file_picker: bool,

    camera: Script,
    gallery_script: Script,
    picker_script: Script,
    frame_failure: Option<String>,
    frame_size: (u32, u32),
    handles: HashMap<String, Vec<u8>>,

    pub streams_opened: AtomicUsize,
    /// Streams started and not yet stopped.
    pub streams_live: Arc<AtomicUsize>,
    pub last_extensions: Mutex<Vec<String>>,
}

impl FakeBridge {
    /// Every channel present, camera granted, pickers cancel.
    pub fn new() -> Self {
        Self {
            permission: Mutex::new(PermissionStatus::Granted),
            grant_on_request: true,
            prompt_delay: Duration::ZERO,
            permission_requests: AtomicUsize::new(0),
            live_stream: true,
            native_camera: true,
            gallery: true,
            file_picker: true,
            camera: Script::Pick(PickerOutcome::cancelled()),
            gallery_script: Script::Pick(PickerOutcome::cancelled()),
            picker_script: Script::Pick(PickerOutcome::cancelled()),
            frame_failure: None,
            frame_size: (100, 50),
            handles: HashMap::new(),
            streams_opened: AtomicUsize::new(0),
            streams_live: Arc::new(AtomicUsize::new(0)),
            last_extensions: Mutex::new(Vec::new()),
        }
    }

    pub fn with_permission(mut self, status: PermissionStatus, grant_on_request: bool) -> Self {
        self.permission = Mutex::new(status);
        self.grant_on_request = grant_on_request;
        self
    }

    pub fn with_prompt_delay(mut self, delay: Duration) -> Self {
        self.prompt_delay = delay;
        self
    }

    pub fn with_camera(mut self, script: Script) -> Self {
        self.camera = script;
        self
    }

    pub fn with_gallery(mut self, script: Script) -> Self {
        self.gallery_script = script;
        self
    }

    pub fn with_picker(mut self, script: Script) -> Self {
        self.picker_script = script;
        self
    }

    pub fn without_cameras(mut self) -> Self {
        self.live_stream = false;
        self.native_camera = false;
        self
    }

    pub fn with_frame_size(mut self, width: u32, height: u32) -> Self {
        self.frame_size = (width, height);
        self
    }

    pub fn with_frame_failure(mut self, reason: &str) -> Self {
        self.frame_failure = Some(reason.to_owned());
        self
    }

    pub fn with_handle(mut self, uri: &str, bytes: &[u8]) -> Self {
        self.handles.insert(uri.to_owned(), bytes.to_vec());
        self
    }

    /// Simulate the user revoking camera access in system settings.
    pub fn revoke_camera(&self) {
        *self.permission.lock().unwrap() = PermissionStatus::Denied;
    }

    pub fn prompts(&self) -> usize {
        self.permission_requests.load(Ordering::SeqCst)
    }

    pub fn live_streams(&self) -> usize {
        self.streams_live.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NativePermissions for FakeBridge {
    fn camera_permission(&self) -> PermissionStatus {
        *self.permission.lock().unwrap()
    }

    async fn request_camera_permission(&self) -> Result<bool> {
        self.permission_requests.fetch_add(1, Ordering::SeqCst);
        if !self.prompt_delay.is_zero() {
            tokio::time::sleep(self.prompt_delay).await;
        }
        let answer = if self.grant_on_request {
            PermissionStatus::Granted
        } else {
            PermissionStatus::Denied
        };
        *self.permission.lock().unwrap() = answer;
        Ok(self.grant_on_request)
    }
}

#[async_trait]
impl NativeCamera for FakeBridge {
    fn has_native_camera(&self) -> bool {
        self.native_camera
    }

    async fn capture_image(&self, _quality: f32) -> Result<PickerOutcome> {
        self.camera.play().await
    }
}

impl NativeCameraStream for FakeBridge {
    fn supports_live_stream(&self) -> bool {
        self.live_stream
    }

    fn open_stream(&self) -> Result<Box<dyn CameraStream>> {
        self.streams_opened.fetch_add(1, Ordering::SeqCst);
        self.streams_live.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeStream {
            active: true,
            live: Arc::clone(&self.streams_live),
            failure: self.frame_failure.clone(),
            size: self.frame_size,
        }))
    }
}

#[async_trait]
impl NativeGallery for FakeBridge {
    fn has_gallery(&self) -> bool {
        self.gallery
    }

    async fn pick_from_gallery(&self, extensions: &[&str]) -> Result<PickerOutcome> {
        *self.last_extensions.lock().unwrap() =
            extensions.iter().map(|ext| ext.to_string()).collect();
        self.gallery_script.play().await
    }
}

#[async_trait]
impl NativeFilePicker for FakeBridge {
    fn has_file_picker(&self) -> bool {
        self.file_picker
    }

    async fn pick_file(&self, extensions: &[&str]) -> Result<PickerOutcome> {
        *self.last_extensions.lock().unwrap() =
            extensions.iter().map(|ext| ext.to_string()).collect();
        self.picker_script.play().await
    }
}

#[async_trait]
impl NativeAssetReader for FakeBridge {
    async fn read_handle(&self, uri: &str) -> Result<Vec<u8>> {
        self.handles
            .get(uri)
            .cloned()
            .ok_or_else(|| ScanwerkError::Bridge(format!("handle revoked: {uri}")))
    }
}

impl PlatformBridge for FakeBridge {
    fn platform_name(&self) -> &str {
        "test"
    }
}

struct FakeStream {
    active: bool,
    live: Arc<AtomicUsize>,
    failure: Option<String>,
    size: (u32, u32),
}

#[async_trait]
impl CameraStream for FakeStream {
    async fn take_picture(&mut self, options: FrameOptions) -> Result<CapturedFrame> {
        if let Some(reason) = &self.failure {
            return Err(ScanwerkError::Bridge(reason.clone()));
        }
        Ok(CapturedFrame {
            payload: Payload::Bytes(vec![0xFF, 0xD8, 0xFF, 0xD9]),
            width: self.size.0,
            height: self.size.1,
            base64: options.base64.then(|| "/9j/2Q==".to_owned()),
        })
    }

    fn stop(&mut self) {
        if self.active {
            self.active = false;
            self.live.fetch_sub(1, Ordering::SeqCst);
        }
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

/// Records every outbound event.
#[derive(Default)]
pub struct RecordingObserver {
    pub phases: Mutex<Vec<Phase>>,
    pub ready: Mutex<Vec<CaptureResult>>,
    pub failed: Mutex<Vec<FailureNotice>>,
}

impl RecordingObserver {
    pub fn ready_count(&self) -> usize {
        self.ready.lock().unwrap().len()
    }

    pub fn failures(&self) -> Vec<FailureNotice> {
        self.failed.lock().unwrap().clone()
    }

    pub fn phase_count(&self, phase: Phase) -> usize {
        self.phases
            .lock()
            .unwrap()
            .iter()
            .filter(|seen| **seen == phase)
            .count()
    }
}

impl CaptureObserver for RecordingObserver {
    fn on_phase(&self, _session: SessionId, phase: Phase) {
        self.phases.lock().unwrap().push(phase);
    }

    fn on_ready(&self, result: &CaptureResult) {
        self.ready.lock().unwrap().push(result.clone());
    }

    fn on_failed(&self, notice: &FailureNotice) {
        self.failed.lock().unwrap().push(notice.clone());
    }
}

/// A controller wired to a fake platform with all four sources registered.
pub struct Harness {
    pub bridge: Arc<FakeBridge>,
    pub live: Arc<LiveCameraSource<FakeBridge>>,
    pub observer: Arc<RecordingObserver>,
    pub controller: Arc<PipelineController>,
}

impl Harness {
    pub fn new(bridge: FakeBridge) -> Self {
        let bridge = Arc::new(bridge);
        let policy = scenario_policy();
        let live = Arc::new(LiveCameraSource::new(
            Arc::clone(&bridge),
            FrameOptions::default(),
        ));
        let observer = Arc::new(RecordingObserver::default());

        let controller = PipelineController::new(
            CapabilityBroker::new(bridge.clone()),
            Arc::clone(&policy),
        )
        .with_adapter(live.clone())
        .with_adapter(Arc::new(NativeCameraSource::new(Arc::clone(&bridge), 0.8)))
        .with_adapter(Arc::new(GallerySource::new(Arc::clone(&bridge), &policy)))
        .with_adapter(Arc::new(FilePickerSource::new(Arc::clone(&bridge), &policy)))
        .with_observer(observer.clone());

        Self {
            bridge,
            live,
            observer,
            controller: Arc::new(controller),
        }
    }

    /// Yield until the controller reaches `phase`.
    pub async fn wait_for_phase(&self, phase: Phase) {
        while self.controller.phase() != phase {
            tokio::task::yield_now().await;
        }
    }

    /// Yield until the live source holds the camera.
    pub async fn wait_for_stream(&self) {
        while !self.live.is_streaming() {
            tokio::task::yield_now().await;
        }
    }
}
