// src/capture/mod.rs
use tokio::sync::oneshot;
use tracing::debug;
use uuid::Uuid;

use crate::core::gallery::FeatureSample;

/// What the capture producer ended up doing with its one shot.
#[derive(Debug, PartialEq)]
pub enum CaptureOutcome {
    Delivered(FeatureSample),
    Cancelled,
}

/// Producer half of a capture session, handed to the camera worker. It
/// carries exactly one probe; both `deliver` and `cancel` consume it.
pub struct CaptureHandle {
    session_id: Uuid,
    sender: oneshot::Sender<FeatureSample>,
}

/// Consumer half of a capture session. The authorization side awaits it
/// for the single probe or an explicit cancellation.
pub struct CaptureSession {
    session_id: Uuid,
    receiver: oneshot::Receiver<FeatureSample>,
}

/// Creates a linked handle/session pair for one capture attempt.
pub fn session() -> (CaptureHandle, CaptureSession) {
    let session_id = Uuid::new_v4();
    let (sender, receiver) = oneshot::channel();
    debug!("Opened capture session {}", session_id);
    (
        CaptureHandle { session_id, sender },
        CaptureSession {
            session_id,
            receiver,
        },
    )
}

impl CaptureHandle {
    /// Delivers the probe. Returns false when the consumer already gave up
    /// on the session.
    pub fn deliver(self, sample: FeatureSample) -> bool {
        let delivered = self.sender.send(sample).is_ok();
        if !delivered {
            debug!(
                "Capture session {} delivered to a dropped consumer",
                self.session_id
            );
        }
        delivered
    }

    /// Abandons the capture. Dropping the handle has the same effect; this
    /// just says so in the log.
    pub fn cancel(self) {
        debug!("Capture session {} cancelled", self.session_id);
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }
}

impl CaptureSession {
    /// Waits for the producer's single delivery; a dropped or cancelled
    /// producer resolves to [`CaptureOutcome::Cancelled`].
    pub async fn resolve(self) -> CaptureOutcome {
        match self.receiver.await {
            Ok(sample) => CaptureOutcome::Delivered(sample),
            Err(_) => CaptureOutcome::Cancelled,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }
}
