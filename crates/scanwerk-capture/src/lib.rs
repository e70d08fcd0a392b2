// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanwerk capture — acquire a document image from whichever source the
// device offers, admit it against the policy and encode it for upload.

pub mod capabilities;
pub mod controller;
pub mod encode;
pub mod result;
pub mod session;
pub mod source;
pub mod validate;

pub use capabilities::CapabilityBroker;
pub use controller::{CaptureObserver, NoopObserver, PipelineController};
pub use encode::Encoder;
pub use result::CaptureResult;
pub use session::{FailureNotice, Phase, SessionState};
pub use source::SourceAdapter;
pub use validate::AdmissionValidator;
