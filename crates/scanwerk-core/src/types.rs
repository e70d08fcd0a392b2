// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for document image acquisition.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, ScanwerkError};

/// Unique identifier for one capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The acquisition channels an image can come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    /// Long-lived camera preview; a still frame is taken on user trigger.
    LiveCamera,
    /// One-shot system camera UI.
    NativeCamera,
    /// Device photo library.
    Gallery,
    /// Generic file chooser (desktop dialog, browser `<input type=file>`).
    FilePicker,
}

impl SourceKind {
    /// Every source, in the order the chooser offers them.
    pub const ALL: [SourceKind; 4] = [
        SourceKind::LiveCamera,
        SourceKind::NativeCamera,
        SourceKind::Gallery,
        SourceKind::FilePicker,
    ];

    /// Label shown on the chooser button.
    pub fn label(&self) -> &'static str {
        match self {
            Self::LiveCamera => "Live Camera Preview",
            Self::NativeCamera => "Take Photo",
            Self::Gallery => "Choose from Gallery",
            Self::FilePicker => "Choose File",
        }
    }

    /// Whether this source needs camera permission before it can be used.
    pub fn needs_camera(&self) -> bool {
        matches!(self, Self::LiveCamera | Self::NativeCamera)
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::LiveCamera => "live-camera",
            Self::NativeCamera => "native-camera",
            Self::Gallery => "gallery",
            Self::FilePicker => "file-picker",
        };
        f.write_str(name)
    }
}

/// Snapshot of which acquisition channels are usable right now.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySet {
    pub live_camera: bool,
    pub native_camera: bool,
    pub gallery: bool,
    pub file_picker: bool,
}

impl CapabilitySet {
    /// Whether the given source is available.
    pub fn contains(&self, kind: SourceKind) -> bool {
        match kind {
            SourceKind::LiveCamera => self.live_camera,
            SourceKind::NativeCamera => self.native_camera,
            SourceKind::Gallery => self.gallery,
            SourceKind::FilePicker => self.file_picker,
        }
    }

    /// Available sources in chooser order.
    pub fn offered(&self) -> Vec<SourceKind> {
        SourceKind::ALL
            .into_iter()
            .filter(|kind| self.contains(*kind))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.offered().is_empty()
    }
}

/// Width/height of an image in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelDimensions {
    pub width: u32,
    pub height: u32,
}

impl PixelDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Uncompressed RGBA footprint, used as a size estimate for live frames.
    pub fn rgba_bytes(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height) * 4
    }
}

/// Where the bytes of an acquired image live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Bytes already in memory (e.g. a frame grabbed from a live stream).
    Bytes(Vec<u8>),
    /// A file on the local filesystem.
    Path(PathBuf),
    /// An opaque platform handle (`content://`, `ph://`, `blob:` ...).
    Handle(String),
}

impl Payload {
    /// A reference suitable for preview rendering, when one exists without
    /// reading the payload.
    pub fn preview_uri(&self) -> Option<String> {
        match self {
            Self::Bytes(_) => None,
            Self::Path(path) => Some(format!("file://{}", path.display())),
            Self::Handle(uri) => Some(uri.clone()),
        }
    }
}

/// An image as handed back by a source adapter, before admission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAsset {
    payload: Payload,
    declared_mime_type: String,
    declared_size_bytes: Option<u64>,
    size_is_estimate: bool,
    inline_encoding: Option<String>,
    pixel_dimensions: Option<PixelDimensions>,
    display_name: Option<String>,
}

impl RawAsset {
    /// Create an asset. The MIME type is lowercased and must not be empty.
    pub fn new(payload: Payload, mime_type: impl Into<String>) -> Result<Self> {
        let declared_mime_type = mime_type.into().trim().to_ascii_lowercase();
        if declared_mime_type.is_empty() {
            return Err(ScanwerkError::AcquisitionFailed(
                "source did not report a MIME type".into(),
            ));
        }
        Ok(Self {
            payload,
            declared_mime_type,
            declared_size_bytes: None,
            size_is_estimate: false,
            inline_encoding: None,
            pixel_dimensions: None,
            display_name: None,
        })
    }

    /// Authoritative size reported by the source.
    pub fn with_size(mut self, bytes: u64) -> Self {
        self.declared_size_bytes = Some(bytes);
        self.size_is_estimate = false;
        self
    }

    /// Non-authoritative size (e.g. computed from frame dimensions).
    pub fn with_estimated_size(mut self, bytes: u64) -> Self {
        self.declared_size_bytes = Some(bytes);
        self.size_is_estimate = true;
        self
    }

    pub fn with_inline_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.inline_encoding = Some(encoding.into());
        self
    }

    pub fn with_dimensions(mut self, dimensions: PixelDimensions) -> Self {
        self.pixel_dimensions = Some(dimensions);
        self
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !name.trim().is_empty() {
            self.display_name = Some(name);
        }
        self
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn declared_mime_type(&self) -> &str {
        &self.declared_mime_type
    }

    pub fn declared_size_bytes(&self) -> Option<u64> {
        self.declared_size_bytes
    }

    pub fn size_is_estimate(&self) -> bool {
        self.size_is_estimate
    }

    pub fn inline_encoding(&self) -> Option<&str> {
        self.inline_encoding.as_deref()
    }

    pub fn pixel_dimensions(&self) -> Option<PixelDimensions> {
        self.pixel_dimensions
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }
}

/// Default name for an asset whose source provided none: `scan_<unix millis>`.
pub fn default_display_name(at: DateTime<Utc>) -> String {
    format!("scan_{}", at.timestamp_millis())
}
