//! Persistence-service boundary.
//!
//! The controller talks to the service only through [`EvidenceService`].
//! Every call is fire-and-forget with a bounded wait: [`with_timeout`] races
//! the call against a scheduler sleep, and losing the race does not cancel
//! the remote operation.

use std::rc::Rc;
use std::time::Duration;

use futures::future::{select, Either, LocalBoxFuture};
use futures::FutureExt;
use serde::de::DeserializeOwned;

use crate::capture::record::{CaptureOptions, CaptureRecord, DuplicateCheckRequest};
use crate::error::{CaptureError, CaptureResult};
use crate::host::Scheduler;
use crate::protocol::{Ack, DuplicateCheckReply, ServiceMessage};
use crate::region::RegionCaptureRequest;

pub trait EvidenceService {
    fn duplicate_check(
        &self,
        request: DuplicateCheckRequest,
    ) -> LocalBoxFuture<'static, CaptureResult<DuplicateCheckReply>>;

    fn capture(
        &self,
        record: CaptureRecord,
        options: Option<CaptureOptions>,
    ) -> LocalBoxFuture<'static, CaptureResult<Ack>>;

    fn region_capture(
        &self,
        request: RegionCaptureRequest,
    ) -> LocalBoxFuture<'static, CaptureResult<Ack>>;
}

/// Race `call` against `timeout`.
///
/// On expiry the call future is dropped locally; whatever it already sent
/// stays sent.
pub async fn with_timeout<T>(
    scheduler: &dyn Scheduler,
    operation: &'static str,
    timeout: Duration,
    call: LocalBoxFuture<'static, CaptureResult<T>>,
) -> CaptureResult<T> {
    match select(call, scheduler.sleep(timeout)).await {
        Either::Left((result, _)) => result,
        Either::Right(((), _)) => {
            log::warn!(
                "[CAPTURE] {} got no answer within {}ms",
                operation,
                timeout.as_millis()
            );
            Err(CaptureError::Timeout {
                operation,
                timeout_ms: timeout.as_millis() as u64,
            })
        }
    }
}

/// Require `ok: true`.
pub fn expect_ok(operation: &str, ack: Ack) -> CaptureResult<()> {
    if ack.ok {
        Ok(())
    } else {
        Err(CaptureError::Rejected(operation.to_string()))
    }
}

// ============================================================================
// JSON message adapter
// ============================================================================

/// One request/response round-trip carrying JSON values.
pub trait MessageTransport {
    fn send(&self, message: serde_json::Value)
        -> LocalBoxFuture<'static, CaptureResult<serde_json::Value>>;
}

/// [`EvidenceService`] over a JSON [`MessageTransport`].
pub struct MessageService<T: MessageTransport> {
    transport: Rc<T>,
}

impl<T: MessageTransport> MessageService<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport: Rc::new(transport),
        }
    }

    fn request<R: DeserializeOwned + 'static>(
        &self,
        message: ServiceMessage,
    ) -> LocalBoxFuture<'static, CaptureResult<R>> {
        let kind = message.kind();
        let encoded = match serde_json::to_value(&message) {
            Ok(value) => value,
            Err(e) => return futures::future::ready(Err(e.into())).boxed_local(),
        };
        log::debug!("[PROTOCOL] -> {}", kind);
        let reply = self.transport.send(encoded);
        async move {
            let value = reply.await?;
            serde_json::from_value::<R>(value).map_err(|e| {
                log::warn!("[PROTOCOL] Malformed {} reply: {}", kind, e);
                CaptureError::from(e)
            })
        }
        .boxed_local()
    }
}

impl<T: MessageTransport> EvidenceService for MessageService<T> {
    fn duplicate_check(
        &self,
        request: DuplicateCheckRequest,
    ) -> LocalBoxFuture<'static, CaptureResult<DuplicateCheckReply>> {
        self.request(ServiceMessage::DuplicateCheck(request))
    }

    fn capture(
        &self,
        record: CaptureRecord,
        options: Option<CaptureOptions>,
    ) -> LocalBoxFuture<'static, CaptureResult<Ack>> {
        self.request(ServiceMessage::capture(record, options))
    }

    fn region_capture(
        &self,
        request: RegionCaptureRequest,
    ) -> LocalBoxFuture<'static, CaptureResult<Ack>> {
        self.request(ServiceMessage::RegionCapture(request))
    }
}
