// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Capture session state, owned by the pipeline controller.

use serde::Serialize;
use scanwerk_core::config::ValidationPolicy;
use scanwerk_core::error::{ErrorKind, ScanwerkError};
use scanwerk_core::human_errors::humanize_error;
use scanwerk_core::types::{SessionId, SourceKind};

use crate::result::CaptureResult;

/// Lifecycle phases of a capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    Idle,
    /// The chooser is open and sources are offered.
    SourceSelecting,
    /// An adapter is in flight.
    Acquiring,
    Validating,
    Encoding,
    /// A `CaptureResult` is held for preview.
    Ready,
    /// Transient: a failure was recorded and the session is returning to idle.
    Failed,
}

impl Phase {
    /// Whether a capture attempt is currently running.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::Acquiring | Self::Validating | Self::Encoding)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::SourceSelecting => "selecting a source",
            Self::Acquiring => "acquiring",
            Self::Validating => "validating",
            Self::Encoding => "encoding",
            Self::Ready => "ready",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// User-facing description of a failed capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureNotice {
    pub kind: ErrorKind,
    pub message: String,
    pub suggestion: String,
    pub retriable: bool,
    /// The underlying error, for logs and bug reports.
    pub detail: String,
}

impl FailureNotice {
    /// Like `From`, but a type rejection also lists what `policy` accepts.
    pub fn with_policy(err: &ScanwerkError, policy: &ValidationPolicy) -> Self {
        let mut notice = Self::from(err);
        if let ScanwerkError::UnsupportedType(_) = err {
            let accepted: Vec<&str> = policy.allowed_mime_types().collect();
            notice.suggestion = format!("{} Accepted: {}.", notice.suggestion, accepted.join(", "));
        }
        notice
    }
}

impl From<&ScanwerkError> for FailureNotice {
    fn from(err: &ScanwerkError) -> Self {
        let human = humanize_error(err);
        Self {
            kind: err.kind(),
            message: human.message,
            suggestion: human.suggestion,
            retriable: human.retriable,
            detail: err.to_string(),
        }
    }
}

/// Snapshot of one capture session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionState {
    pub id: SessionId,
    pub phase: Phase,
    pub active_source: Option<SourceKind>,
    /// Sources offered when the chooser was opened.
    pub offered: Vec<SourceKind>,
    pub last_error: Option<FailureNotice>,
    pub result: Option<CaptureResult>,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            id: SessionId::new(),
            phase: Phase::Idle,
            active_source: None,
            offered: Vec::new(),
            last_error: None,
            result: None,
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
