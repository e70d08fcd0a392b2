// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pipeline controller — the capture session state machine.
//
//   Idle → SourceSelecting → Acquiring → Validating → Encoding → Ready
//
// Any failure records a notice and returns the session to Idle. At most one
// attempt is in flight; retriggering while Acquiring/Validating/Encoding is
// rejected with `CaptureInFlight`. The session lock is never held across an
// await, so the UI can query state or cancel while a step is suspended.
// Dropping a `select_source` future mid-flight counts as a cancellation.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use scanwerk_core::config::ValidationPolicy;
use scanwerk_core::error::{Result, ScanwerkError};
use scanwerk_core::types::{SessionId, SourceKind};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::capabilities::CapabilityBroker;
use crate::encode::Encoder;
use crate::result::CaptureResult;
use crate::session::{FailureNotice, Phase, SessionState};
use crate::source::{SourceAdapter, abortable};
use crate::validate::AdmissionValidator;

/// Receives the pipeline's outbound events (preview renderer, upload
/// module, toast/alert layer).
pub trait CaptureObserver: Send + Sync {
    fn on_phase(&self, _session: SessionId, _phase: Phase) {}

    /// Called exactly once per successful session.
    fn on_ready(&self, result: &CaptureResult);

    /// Called for user-visible failures. Cancellations are not reported.
    fn on_failed(&self, notice: &FailureNotice);
}

/// Observer that ignores everything.
pub struct NoopObserver;

impl CaptureObserver for NoopObserver {
    fn on_ready(&self, _result: &CaptureResult) {}

    fn on_failed(&self, _notice: &FailureNotice) {}
}

struct Inner {
    state: SessionState,
    /// Fired by `cancel`/`close_chooser`; replaced on every new session.
    abort: CancellationToken,
}

/// Coordinates source selection, acquisition, admission and encoding for one
/// session at a time.
pub struct PipelineController {
    broker: CapabilityBroker,
    adapters: Vec<Arc<dyn SourceAdapter>>,
    validator: AdmissionValidator,
    encoder: Encoder,
    observer: Arc<dyn CaptureObserver>,
    inner: Mutex<Inner>,
}

/// Resets the session when a `select_source` future is dropped before it
/// reaches `finish`.
struct InFlight<'a> {
    controller: &'a PipelineController,
    session: SessionId,
    abort: CancellationToken,
    armed: bool,
}

impl InFlight<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        self.abort.cancel();
        let reset = {
            let mut inner = self.controller.lock();
            let stale = inner.state.id == self.session && inner.state.phase.is_in_flight();
            if stale {
                inner.state.phase = Phase::Idle;
                inner.state.active_source = None;
                inner.state.offered.clear();
            }
            stale
        };
        if reset {
            info!(session = %self.session, "capture abandoned mid-flight");
            self.controller.observer.on_phase(self.session, Phase::Idle);
        }
    }
}

impl PipelineController {
    /// The encoder reads platform handles through the broker's bridge and
    /// warns past the policy ceiling.
    pub fn new(broker: CapabilityBroker, policy: Arc<ValidationPolicy>) -> Self {
        let encoder = Encoder::new()
            .with_reader(broker.asset_reader())
            .with_size_ceiling(policy.max_size_bytes());
        Self {
            broker,
            adapters: Vec::new(),
            validator: AdmissionValidator::new(policy),
            encoder,
            observer: Arc::new(NoopObserver),
            inner: Mutex::new(Inner {
                state: SessionState::new(),
                abort: CancellationToken::new(),
            }),
        }
    }

    /// Register a source. A later adapter for the same kind replaces the
    /// earlier one.
    pub fn with_adapter(mut self, adapter: Arc<dyn SourceAdapter>) -> Self {
        self.adapters.retain(|existing| existing.kind() != adapter.kind());
        self.adapters.push(adapter);
        self
    }

    /// Replace the encoder. A reader or ceiling it leaves unset is kept
    /// from the current one.
    pub fn with_encoder(mut self, encoder: Encoder) -> Self {
        self.encoder = encoder.inherit(&self.encoder);
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn CaptureObserver>) -> Self {
        self.observer = observer;
        self
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn adapter(&self, kind: SourceKind) -> Option<Arc<dyn SourceAdapter>> {
        self.adapters
            .iter()
            .find(|adapter| adapter.kind() == kind)
            .cloned()
    }

    // -- Queries --------------------------------------------------------------

    pub fn phase(&self) -> Phase {
        self.lock().state.phase
    }

    pub fn snapshot(&self) -> SessionState {
        self.lock().state.clone()
    }

    /// The capture held for preview, if the session is `Ready`.
    pub fn current_result(&self) -> Option<CaptureResult> {
        self.lock().state.result.clone()
    }

    // -- Transitions ----------------------------------------------------------

    /// Start a new session and return the sources the chooser should offer.
    ///
    /// From `Ready` this discards the previous capture.
    pub async fn open_chooser(&self) -> Result<Vec<SourceKind>> {
        let session = {
            let mut inner = self.lock();
            let phase = inner.state.phase;
            if phase.is_in_flight() {
                warn!(
                    session = %inner.state.id,
                    %phase,
                    "chooser reopened during capture, rejected"
                );
                return Err(ScanwerkError::CaptureInFlight);
            }
            if phase == Phase::Ready {
                info!(session = %inner.state.id, "discarding previous capture");
            }
            inner.state = SessionState::new();
            inner.state.phase = Phase::SourceSelecting;
            inner.abort = CancellationToken::new();
            inner.state.id
        };
        self.observer.on_phase(session, Phase::SourceSelecting);

        let caps = self.broker.query_capabilities().await;
        let offered: Vec<SourceKind> = caps
            .offered()
            .into_iter()
            .filter(|kind| self.adapter(*kind).is_some())
            .collect();

        let mut inner = self.lock();
        if inner.state.id != session || inner.state.phase != Phase::SourceSelecting {
            debug!(%session, "chooser closed before capabilities arrived");
            return Err(ScanwerkError::AcquisitionCancelled);
        }
        inner.state.offered = offered.clone();
        info!(%session, offered = ?offered, "capture chooser opened");
        Ok(offered)
    }

    /// Close the chooser. Aborts an acquisition in progress; a session that
    /// is only selecting goes back to `Idle`.
    pub fn close_chooser(&self) {
        let closed = {
            let mut inner = self.lock();
            match inner.state.phase {
                Phase::SourceSelecting => {
                    inner.state.phase = Phase::Idle;
                    inner.state.offered.clear();
                    Some(inner.state.id)
                }
                Phase::Acquiring => {
                    inner.abort.cancel();
                    None
                }
                _ => None,
            }
        };
        if let Some(session) = closed {
            debug!(%session, "chooser closed");
            self.observer.on_phase(session, Phase::Idle);
        }
    }

    /// Fire the abort signal for an in-flight acquisition.
    ///
    /// Only `Acquiring` is abortable; once an asset is in hand the
    /// validate/encode steps run to completion.
    pub fn cancel(&self) {
        let inner = self.lock();
        if inner.state.phase == Phase::Acquiring {
            info!(session = %inner.state.id, "abort requested");
            inner.abort.cancel();
        } else {
            debug!(phase = %inner.state.phase, "cancel ignored");
        }
    }

    /// Drop the held capture and return to `Idle`.
    pub fn dismiss_preview(&self) -> Option<CaptureResult> {
        let (session, taken) = {
            let mut inner = self.lock();
            if inner.state.phase != Phase::Ready {
                return None;
            }
            inner.state.phase = Phase::Idle;
            (inner.state.id, inner.state.result.take())
        };
        debug!(%session, "preview dismissed");
        self.observer.on_phase(session, Phase::Idle);
        taken
    }

    /// Acquire from `kind`, admit, encode and publish the result.
    pub async fn select_source(&self, kind: SourceKind) -> Result<CaptureResult> {
        let (session, adapter, abort) = {
            let mut inner = self.lock();
            let phase = inner.state.phase;
            if phase.is_in_flight() {
                warn!(
                    session = %inner.state.id,
                    source = %kind,
                    "capture already in flight, rejected"
                );
                return Err(ScanwerkError::CaptureInFlight);
            }
            if phase != Phase::SourceSelecting {
                return Err(ScanwerkError::InvalidTransition {
                    from: phase.to_string(),
                    action: "select a source".into(),
                });
            }
            let adapter = inner
                .state
                .offered
                .contains(&kind)
                .then(|| self.adapter(kind))
                .flatten()
                .ok_or(ScanwerkError::SourceNotOffered(kind))?;
            inner.state.phase = Phase::Acquiring;
            inner.state.active_source = Some(kind);
            (inner.state.id, adapter, inner.abort.clone())
        };
        let in_flight = InFlight {
            controller: self,
            session,
            abort: abort.clone(),
            armed: true,
        };
        info!(%session, source = %kind, "acquisition started");
        self.observer.on_phase(session, Phase::Acquiring);

        let outcome = self.run(session, kind, adapter.as_ref(), &abort).await;
        in_flight.disarm();
        self.finish(session, outcome)
    }

    async fn run(
        &self,
        session: SessionId,
        kind: SourceKind,
        adapter: &dyn SourceAdapter,
        abort: &CancellationToken,
    ) -> Result<CaptureResult> {
        if kind.needs_camera() {
            let granted =
                abortable(abort, async { Ok(self.broker.ensure_camera_permission().await) })
                    .await?;
            if !granted {
                return Err(ScanwerkError::AcquisitionFailed(
                    "camera permission required".into(),
                ));
            }
        }

        let asset = adapter.acquire(abort).await?;
        if abort.is_cancelled() {
            debug!(%session, "asset arrived after abort, dropping it");
            return Err(ScanwerkError::AcquisitionCancelled);
        }

        self.advance(session, Phase::Validating);
        let asset = self.validator.admit(asset)?;

        self.advance(session, Phase::Encoding);
        let asset = self.encoder.ensure_encoding(asset).await?;

        CaptureResult::from_admitted(asset, kind, Utc::now())
    }

    fn advance(&self, session: SessionId, phase: Phase) {
        {
            let mut inner = self.lock();
            if inner.state.id != session {
                return;
            }
            inner.state.phase = phase;
        }
        debug!(%session, %phase, "phase changed");
        self.observer.on_phase(session, phase);
    }

    fn finish(&self, session: SessionId, outcome: Result<CaptureResult>) -> Result<CaptureResult> {
        match outcome {
            Ok(result) => {
                {
                    let mut inner = self.lock();
                    inner.state.phase = Phase::Ready;
                    inner.state.active_source = None;
                    inner.state.offered.clear();
                    inner.state.result = Some(result.clone());
                }
                info!(
                    %session,
                    source = %result.source(),
                    mime = result.mime_type(),
                    size = result.size_bytes(),
                    name = result.display_name(),
                    "capture ready"
                );
                self.observer.on_phase(session, Phase::Ready);
                self.observer.on_ready(&result);
                Ok(result)
            }
            Err(err) => {
                let notice = (!err.is_silent())
                    .then(|| FailureNotice::with_policy(&err, self.validator.policy()));
                {
                    let mut inner = self.lock();
                    inner.state.phase = Phase::Idle;
                    inner.state.active_source = None;
                    inner.state.offered.clear();
                    inner.state.last_error = notice.clone();
                }
                match &notice {
                    Some(notice) => {
                        warn!(%session, error = %err, "capture failed");
                        self.observer.on_phase(session, Phase::Failed);
                        self.observer.on_failed(notice);
                    }
                    None => info!(%session, "capture cancelled"),
                }
                self.observer.on_phase(session, Phase::Idle);
                Err(err)
            }
        }
    }
}
