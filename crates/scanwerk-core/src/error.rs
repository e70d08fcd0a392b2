// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Scanwerk.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::SourceKind;

/// Top-level error type for all Scanwerk operations.
#[derive(Debug, Error)]
pub enum ScanwerkError {
    // -- Acquisition errors --
    #[error("acquisition cancelled by user")]
    AcquisitionCancelled,

    #[error("acquisition failed: {0}")]
    AcquisitionFailed(String),

    // -- Admission policy errors --
    #[error("unsupported image type: {0}")]
    UnsupportedType(String),

    #[error("image size {size} bytes exceeds the {limit} byte limit")]
    SizeExceeded { size: u64, limit: u64 },

    // -- Encoding errors --
    #[error("encoding failed: {0}")]
    EncodingFailed(String),

    // -- Session errors --
    #[error("a capture is already in progress")]
    CaptureInFlight,

    #[error("cannot {action} while {from}")]
    InvalidTransition { from: String, action: String },

    #[error("source not offered: {0}")]
    SourceNotOffered(SourceKind),

    // -- Configuration / persistence --
    #[error("configuration error: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // -- Platform bridge --
    #[error("platform bridge error: {0}")]
    Bridge(String),

    #[error("feature not available on this platform")]
    PlatformUnavailable,
}

/// Coarse error classification handed to the UI notification layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    AcquisitionCancelled,
    AcquisitionFailed,
    UnsupportedType,
    SizeExceeded,
    EncodingFailed,
    /// Retrigger rejected or invalid transition requested.
    Busy,
    /// Configuration, bridge or platform problems outside a capture.
    Platform,
}

impl ScanwerkError {
    /// Classify this error into the capture taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AcquisitionCancelled => ErrorKind::AcquisitionCancelled,
            Self::AcquisitionFailed(_) => ErrorKind::AcquisitionFailed,
            Self::UnsupportedType(_) => ErrorKind::UnsupportedType,
            Self::SizeExceeded { .. } => ErrorKind::SizeExceeded,
            Self::EncodingFailed(_) => ErrorKind::EncodingFailed,
            Self::CaptureInFlight | Self::InvalidTransition { .. } | Self::SourceNotOffered(_) => {
                ErrorKind::Busy
            }
            Self::Config(_)
            | Self::Io(_)
            | Self::Serialization(_)
            | Self::Bridge(_)
            | Self::PlatformUnavailable => ErrorKind::Platform,
        }
    }

    /// Whether this failure should be shown to the user at all.
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::AcquisitionCancelled)
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ScanwerkError>;
