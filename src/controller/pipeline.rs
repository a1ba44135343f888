//! Capture lifecycle.
//!
//! duplicate-check → (confirm) → assemble → hide chrome → one frame →
//! bounded send → release target → delayed restorations.
//!
//! Every step after an `.await` re-borrows the state and checks the session
//! it started in; a task that outlives its session does nothing further.

use std::rc::Rc;

use futures::FutureExt;

use super::{PendingCapture, Shared, State, Task};
use crate::capture::record::{CaptureRecord, CaptureRequest, DuplicateCheckRequest};
use crate::capture::{duplicate_message, failure_notice, Suppression};
use crate::error::{CaptureError, CaptureResult};
use crate::geometry::Rect;
use crate::host::NodeId;
use crate::overlay::describe_node;
use crate::region::{RegionCaptureRequest, RegionKind};
use crate::service::{expect_ok, with_timeout};

// ============================================================================
// In-flight finalizer
// ============================================================================

/// Owns the "a capture is running" claim.
///
/// Dropping it (task finished, task dropped, assembly failed) releases the
/// target and restores chrome unless that already happened.
struct InFlight {
    shared: Rc<Shared>,
    session: u64,
    target_released: bool,
    finished: bool,
}

impl InFlight {
    fn new(shared: &Rc<Shared>, session: u64) -> Self {
        Self {
            shared: Rc::clone(shared),
            session,
            target_released: false,
            finished: false,
        }
    }

    fn release_target(&mut self, state: &mut State) {
        if !self.target_released {
            state.cell.release();
            self.target_released = true;
        }
    }

    /// Release the target, lift the capture gate, bring chrome back and
    /// recompute the hover target once.
    fn finish(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        let shared = Rc::clone(&self.shared);
        let Ok(mut guard) = shared.state.try_borrow_mut() else {
            log::warn!("[CAPTURE] Finalizer ran while state was borrowed");
            return;
        };
        let state = &mut *guard;
        if state.session != self.session {
            return;
        }
        self.release_target(state);
        state.overlay.end_capture();
        if let Some(suppression) = state.suppression.take() {
            suppression.restore(&mut *state.host);
        }
        state.in_flight = false;
        if !state.region.is_active() {
            let point = state
                .overlay
                .last_pointer()
                .unwrap_or_else(|| state.host.viewport().size.center());
            state
                .overlay
                .recompute_at(&mut *state.host, &mut state.cell, &shared.config, point);
        }
        log::debug!("[CAPTURE] Chrome restored");
    }

    /// Keep the in-flight flag but drop responsibility for it.
    fn disarm(mut self) {
        self.finished = true;
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.finish();
    }
}

// ============================================================================
// Element capture
// ============================================================================

/// Start a capture of `node`. `None` while another capture is in flight.
pub(super) fn begin_capture(
    shared: &Rc<Shared>,
    state: &mut State,
    node: NodeId,
    request: CaptureRequest,
) -> Option<Task> {
    if state.in_flight {
        log::debug!("[CAPTURE] {}", CaptureError::Busy);
        return None;
    }
    state.in_flight = true;
    let check = DuplicateCheckRequest::for_target(
        &*state.host,
        node,
        request.state,
        shared.config.intent_text_max,
    );
    let guard = InFlight::new(shared, state.session);
    log::info!(
        "[CAPTURE] {} ({})",
        describe_node(&*state.host, node),
        request.state.as_str()
    );
    Some(check_then_capture(Rc::clone(shared), node, request, check, guard).boxed_local())
}

/// Continue a capture the user confirmed despite a duplicate.
pub(super) fn resume_capture(
    shared: &Rc<Shared>,
    state: &mut State,
    node: NodeId,
    request: CaptureRequest,
) -> Task {
    let guard = InFlight::new(shared, state.session);
    run_capture(Rc::clone(shared), node, request, guard).boxed_local()
}

async fn check_then_capture(
    shared: Rc<Shared>,
    node: NodeId,
    request: CaptureRequest,
    check: DuplicateCheckRequest,
    guard: InFlight,
) {
    let config = &shared.config;
    let reply = with_timeout(
        &*shared.scheduler,
        "duplicate-check",
        config.duplicate_check_timeout(),
        shared.service.duplicate_check(check),
    )
    .await;
    let duplicate = match reply {
        Ok(reply) => reply.ok && reply.is_duplicate,
        Err(e) => {
            log::warn!("[CAPTURE] Duplicate check failed, capturing anyway: {}", e);
            false
        }
    };

    if duplicate {
        let mut state = shared.state.borrow_mut();
        if state.session != guard.session {
            return;
        }
        log::debug!("[CAPTURE] Duplicate reported, asking for confirmation");
        state.pending_confirm = Some(PendingCapture { node, request });
        state.show_confirm(duplicate_message(request.state));
        drop(state);
        guard.disarm();
        return;
    }

    run_capture(Rc::clone(&shared), node, request, guard).await;
}

async fn run_capture(shared: Rc<Shared>, node: NodeId, request: CaptureRequest, mut guard: InFlight) {
    let config = &shared.config;
    let assembled = {
        let mut borrowed = shared.state.borrow_mut();
        let state = &mut *borrowed;
        if state.session != guard.session {
            return;
        }
        match CaptureRecord::assemble(&*state.host, node, request.state, config) {
            Ok(record) => {
                state.cell.set_last_captured(node);
                state.suppression = Some(Suppression::hide_all(&mut *state.host));
                state.overlay.begin_capture(&mut *state.host);
                state.capture_generation += 1;
                Ok((record, state.capture_generation))
            }
            Err(e) => {
                log::warn!("[CAPTURE] Could not assemble record: {}", e);
                guard.release_target(state);
                Err(state.show_notice(failure_notice(&e), config))
            }
        }
    };

    let (record, generation) = match assembled {
        Ok(assembled) => assembled,
        Err(notice) => {
            guard.finish();
            hide_notice_later(&shared, guard.session, notice).await;
            return;
        }
    };

    shared.scheduler.next_frame().await;

    let result = with_timeout(
        &*shared.scheduler,
        "capture",
        config.send_timeout(),
        shared.service.capture(record, Some(request.options())),
    )
    .await
    .and_then(|ack| expect_ok("capture", ack));

    settle(shared, guard, generation, result).await;
}

// ============================================================================
// Region capture
// ============================================================================

/// Start a region (or full-viewport) capture of `rect`.
pub(super) fn begin_region_capture(
    shared: &Rc<Shared>,
    state: &mut State,
    rect: Rect,
    kind: RegionKind,
) -> Option<Task> {
    if state.in_flight {
        log::debug!("[REGION] {}", CaptureError::Busy);
        return None;
    }
    state.in_flight = true;
    let viewport = state.host.viewport();
    let request = RegionCaptureRequest {
        bounding_box: rect,
        device_pixel_ratio: viewport.device_pixel_ratio,
        url: state.host.url(),
        viewport: viewport.size,
        kind,
    };
    state.suppression = Some(Suppression::hide_all(&mut *state.host));
    state.overlay.begin_capture(&mut *state.host);
    state.capture_generation += 1;
    let generation = state.capture_generation;
    let guard = InFlight::new(shared, state.session);
    log::info!(
        "[REGION] {:?} capture {:.0}x{:.0} at ({:.0}, {:.0})",
        kind,
        rect.width,
        rect.height,
        rect.left,
        rect.top
    );

    let shared = Rc::clone(shared);
    Some(
        async move {
            shared.scheduler.next_frame().await;
            let result = with_timeout(
                &*shared.scheduler,
                "region-capture",
                shared.config.send_timeout(),
                shared.service.region_capture(request),
            )
            .await
            .and_then(|ack| expect_ok("region-capture", ack));
            settle(shared, guard, generation, result).await;
        }
        .boxed_local(),
    )
}

// ============================================================================
// Shared tail
// ============================================================================

/// Release the target, report a failure once, then run the restorations.
///
/// Chrome comes back after the short delay, the "CAPTURING…" readout after
/// the long one, and the notice (if any) hides on its own timer.
async fn settle(
    shared: Rc<Shared>,
    mut guard: InFlight,
    generation: u64,
    result: CaptureResult<()>,
) {
    let config = &shared.config;
    let session = guard.session;
    let notice = {
        let mut borrowed = shared.state.borrow_mut();
        let state = &mut *borrowed;
        if state.session != session {
            return;
        }
        guard.release_target(state);
        match result {
            Ok(()) => {
                log::info!("[CAPTURE] Saved");
                None
            }
            Err(e) => {
                if e.is_transient() {
                    log::warn!("[CAPTURE] Not confirmed: {}", e);
                } else {
                    log::error!("[CAPTURE] Failed: {}", e);
                }
                Some(state.show_notice(failure_notice(&e), config))
            }
        }
    };

    let scheduler = &*shared.scheduler;
    let chrome = async {
        scheduler.sleep(config.chrome_restore_delay()).await;
        guard.finish();
    };
    let metadata = async {
        scheduler.sleep(config.metadata_restore_delay()).await;
        let mut borrowed = shared.state.borrow_mut();
        let state = &mut *borrowed;
        if state.session == session
            && state.capture_generation == generation
            && state.overlay.clear_status()
        {
            state
                .overlay
                .render(&mut *state.host, &state.cell, config, true);
        }
    };
    let notice = async {
        if let Some(notice) = notice {
            hide_notice_later(&shared, session, notice).await;
        }
    };
    futures::join!(chrome, metadata, notice);
}

async fn hide_notice_later(shared: &Rc<Shared>, session: u64, notice: u64) {
    shared
        .scheduler
        .sleep(shared.config.notice_duration())
        .await;
    let mut state = shared.state.borrow_mut();
    if state.session == session {
        state.hide_notice(notice);
    }
}
