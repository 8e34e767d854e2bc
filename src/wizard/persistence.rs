//! Persistence bridge: mirrors the wizard profile into a durable slot.
//!
//! The bridge is a [`StoreObserver`]: each mutation serializes the whole
//! profile and queues it for a background writer, so the store never waits
//! on I/O. Only the profile is written, never the step index; a rehydrated
//! wizard always restarts at the first step with its fields pre-filled.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::profile::ProfileData;
use crate::store::KeyValueSlot;

use super::store::StoreObserver;

/// Slot key holding the in-progress profile.
pub const PROFILE_SLOT_KEY: &str = "multistep_form_data";

enum SlotCommand {
    Write(Vec<u8>),
    Flush(oneshot::Sender<()>),
}

/// Serialize a profile the way it is stored in the slot.
pub fn encode_profile(data: &ProfileData) -> Option<Vec<u8>> {
    match serde_json::to_vec(data) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            warn!("Failed to serialize wizard profile: {}", e);
            None
        }
    }
}

/// Load the stored profile, or the empty profile if the slot is missing,
/// unreadable, or holds something that does not parse.
pub async fn rehydrate(slot: &dyn KeyValueSlot) -> ProfileData {
    let bytes = match slot.get_slot(PROFILE_SLOT_KEY).await {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return ProfileData::empty(),
        Err(e) => {
            warn!("Failed to read wizard slot, starting empty: {}", e);
            return ProfileData::empty();
        }
    };
    match serde_json::from_slice::<ProfileData>(&bytes) {
        Ok(data) => {
            debug!(bytes = bytes.len(), "Rehydrated wizard profile");
            data
        }
        Err(e) => {
            warn!("Discarding malformed wizard slot: {}", e);
            ProfileData::empty()
        }
    }
}

pub struct PersistenceBridge {
    tx: mpsc::UnboundedSender<SlotCommand>,
}

impl PersistenceBridge {
    /// Start the writer task for `slot`. The task ends once the bridge is
    /// dropped and its queue is drained.
    pub fn spawn(slot: Arc<dyn KeyValueSlot>) -> (Arc<Self>, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<SlotCommand>();
        let handle = tokio::spawn(async move {
            while let Some(cmd) = rx.recv().await {
                match cmd {
                    SlotCommand::Write(bytes) => {
                        if let Err(e) = slot.set_slot(PROFILE_SLOT_KEY, &bytes).await {
                            warn!("Failed to persist wizard profile: {}", e);
                        }
                    }
                    SlotCommand::Flush(ack) => {
                        let _ = ack.send(());
                    }
                }
            }
            debug!("Wizard persistence writer stopped");
        });
        (Arc::new(Self { tx }), handle)
    }

    /// Wait until every write queued so far has been attempted.
    pub async fn flush(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(SlotCommand::Flush(ack_tx)).is_ok() {
            let _ = ack_rx.await;
        }
    }
}

impl StoreObserver for PersistenceBridge {
    fn profile_changed(&self, data: &ProfileData) {
        let Some(bytes) = encode_profile(data) else {
            return;
        };
        if self.tx.send(SlotCommand::Write(bytes)).is_err() {
            warn!("Wizard persistence writer is gone; change not persisted");
        }
    }
}
