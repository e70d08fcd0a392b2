// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Capability broker — which acquisition channels can be offered right now.
//
// Permission denial is not an error here; it only narrows the offered set.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use scanwerk_bridge::traits::{NativeAssetReader, PermissionStatus, PlatformBridge};
use scanwerk_core::types::CapabilitySet;
use tracing::{debug, info, warn};

/// Queries the platform for usable sources and owns the camera permission
/// prompt, so that concurrent callers share one prompt.
pub struct CapabilityBroker {
    bridge: Arc<dyn PlatformBridge>,
    /// Held for the duration of an OS permission prompt.
    prompt: tokio::sync::Mutex<()>,
    prompts_issued: AtomicU64,
    last_answer: AtomicBool,
}

impl CapabilityBroker {
    pub fn new(bridge: Arc<dyn PlatformBridge>) -> Self {
        Self {
            bridge,
            prompt: tokio::sync::Mutex::new(()),
            prompts_issued: AtomicU64::new(0),
            last_answer: AtomicBool::new(false),
        }
    }

    /// The bridge viewed as a handle reader, for the encoder.
    pub(crate) fn asset_reader(&self) -> Arc<dyn NativeAssetReader> {
        self.bridge.clone()
    }

    /// Snapshot the available channels.
    ///
    /// Prompts for camera permission only when the OS has never been asked.
    pub async fn query_capabilities(&self) -> CapabilitySet {
        let camera = match self.bridge.camera_permission() {
            PermissionStatus::Granted => true,
            PermissionStatus::Undetermined => self.ensure_camera_permission().await,
            PermissionStatus::Denied => false,
        };

        let caps = CapabilitySet {
            live_camera: camera && self.bridge.supports_live_stream(),
            native_camera: camera && self.bridge.has_native_camera(),
            gallery: self.bridge.has_gallery(),
            file_picker: self.bridge.has_file_picker(),
        };
        debug!(
            platform = self.bridge.platform_name(),
            live_camera = caps.live_camera,
            native_camera = caps.native_camera,
            gallery = caps.gallery,
            file_picker = caps.file_picker,
            "capabilities queried"
        );
        caps
    }

    /// Make sure camera access is granted, prompting if needed.
    ///
    /// Callers arriving while a prompt is on screen wait for it and reuse its
    /// answer instead of issuing their own.
    pub async fn ensure_camera_permission(&self) -> bool {
        if self.bridge.camera_permission() == PermissionStatus::Granted {
            return true;
        }

        let seen = self.prompts_issued.load(Ordering::Acquire);
        let _pending = self.prompt.lock().await;
        if self.prompts_issued.load(Ordering::Acquire) != seen {
            return self.last_answer.load(Ordering::Acquire);
        }

        info!("requesting camera permission");
        let granted = match self.bridge.request_camera_permission().await {
            Ok(granted) => granted,
            Err(err) => {
                warn!(error = %err, "camera permission request failed");
                false
            }
        };
        self.last_answer.store(granted, Ordering::Release);
        self.prompts_issued.fetch_add(1, Ordering::AcqRel);
        info!(granted, "camera permission answered");
        granted
    }

    /// Number of OS permission prompts issued so far.
    pub fn prompts_issued(&self) -> u64 {
        self.prompts_issued.load(Ordering::Acquire)
    }
}
