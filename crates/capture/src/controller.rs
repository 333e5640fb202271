//! Background task that owns a [`CaptureSession`].
//!
//! User commands arrive over an mpsc channel and the recording
//! countdown is driven by a 1-second `tokio::time::interval`; both are
//! multiplexed in one `select!` loop so a stop request and a limit tick
//! can never finalize the same recording twice. Cancelling the token
//! finalizes any in-progress recording and releases the camera before
//! the task returns the session.

use std::sync::Arc;
use std::time::Duration;

use sway_client::api::AnalysisBackend;
use sway_client::types::UploadReceipt;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::error::CaptureError;
use crate::events::CaptureEvent;
use crate::media::{ImportedFile, SlotIndex};
use crate::session::{CaptureSession, CaptureSnapshot};

/// Countdown resolution.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

const COMMAND_CHANNEL_CAPACITY: usize = 32;

type Reply<T> = oneshot::Sender<Result<T, CaptureError>>;

enum Command {
    EnableCamera(Reply<()>),
    DisableCamera(Reply<()>),
    StartRecording(Reply<()>),
    StopRecording(Reply<Option<SlotIndex>>),
    ImportFile(ImportedFile, Reply<SlotIndex>),
    SelectSlot(SlotIndex, Reply<()>),
    Submit(Reply<UploadReceipt>),
    Snapshot(Reply<CaptureSnapshot>),
    ClearError(Reply<()>),
}

/// Spawns and runs the session task.
pub struct CaptureController;

impl CaptureController {
    /// Move `session` onto a background task.
    ///
    /// The returned join handle yields the session back once `cancel`
    /// fires or every [`CaptureHandle`] is dropped.
    pub fn spawn(
        session: CaptureSession,
        backend: Arc<dyn AnalysisBackend>,
        cancel: CancellationToken,
    ) -> (CaptureHandle, JoinHandle<CaptureSession>) {
        let (tx, rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let handle = CaptureHandle {
            commands: tx,
            events: session.event_sender(),
        };
        let task = tokio::spawn(run(session, backend, rx, cancel));
        (handle, task)
    }
}

async fn run(
    mut session: CaptureSession,
    backend: Arc<dyn AnalysisBackend>,
    mut commands: mpsc::Receiver<Command>,
    cancel: CancellationToken,
) -> CaptureSession {
    let mut ticker = tokio::time::interval(TICK_PERIOD);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::debug!("Capture controller started");

    loop {
        let recording = session.is_recording();
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Capture controller cancelled");
                break;
            }
            command = commands.recv() => {
                let Some(command) = command else {
                    tracing::debug!("All capture handles dropped");
                    break;
                };
                handle_command(&mut session, backend.as_ref(), command).await;
                if !recording && session.is_recording() {
                    // First countdown tick lands one full period after the start.
                    ticker.reset();
                }
            }
            _ = ticker.tick(), if recording => {
                if let Err(e) = session.countdown_tick().await {
                    tracing::error!(error = %e, "Countdown stop failed");
                }
            }
        }
    }

    if let Err(e) = session.disable_camera().await {
        tracing::warn!(error = %e, "Error releasing camera on shutdown");
    }
    session
}

async fn handle_command(
    session: &mut CaptureSession,
    backend: &dyn AnalysisBackend,
    command: Command,
) {
    // A dropped reply receiver just means the caller stopped waiting.
    match command {
        Command::EnableCamera(reply) => {
            let _ = reply.send(session.enable_camera().await);
        }
        Command::DisableCamera(reply) => {
            let _ = reply.send(session.disable_camera().await);
        }
        Command::StartRecording(reply) => {
            let _ = reply.send(session.start_recording());
        }
        Command::StopRecording(reply) => {
            let _ = reply.send(session.stop_recording().await);
        }
        Command::ImportFile(file, reply) => {
            let _ = reply.send(session.import_file(file).await);
        }
        Command::SelectSlot(slot, reply) => {
            session.select_slot(slot);
            let _ = reply.send(Ok(()));
        }
        Command::Submit(reply) => {
            let _ = reply.send(session.submit(backend).await);
        }
        Command::Snapshot(reply) => {
            let _ = reply.send(Ok(session.snapshot()));
        }
        Command::ClearError(reply) => {
            session.clear_error();
            let _ = reply.send(Ok(()));
        }
    }
}

/// Cloneable front end to a running [`CaptureController`].
#[derive(Clone)]
pub struct CaptureHandle {
    commands: mpsc::Sender<Command>,
    events: broadcast::Sender<CaptureEvent>,
}

impl CaptureHandle {
    pub fn subscribe(&self) -> broadcast::Receiver<CaptureEvent> {
        self.events.subscribe()
    }

    /// Whether the controller task has exited.
    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    pub async fn enable_camera(&self) -> Result<(), CaptureError> {
        self.request(Command::EnableCamera).await
    }

    pub async fn disable_camera(&self) -> Result<(), CaptureError> {
        self.request(Command::DisableCamera).await
    }

    pub async fn start_recording(&self) -> Result<(), CaptureError> {
        self.request(Command::StartRecording).await
    }

    pub async fn stop_recording(&self) -> Result<Option<SlotIndex>, CaptureError> {
        self.request(Command::StopRecording).await
    }

    pub async fn import_file(&self, file: ImportedFile) -> Result<SlotIndex, CaptureError> {
        self.request(|reply| Command::ImportFile(file, reply)).await
    }

    pub async fn select_slot(&self, slot: SlotIndex) -> Result<(), CaptureError> {
        self.request(|reply| Command::SelectSlot(slot, reply)).await
    }

    pub async fn submit(&self) -> Result<UploadReceipt, CaptureError> {
        self.request(Command::Submit).await
    }

    pub async fn snapshot(&self) -> Result<CaptureSnapshot, CaptureError> {
        self.request(Command::Snapshot).await
    }

    pub async fn clear_error(&self) -> Result<(), CaptureError> {
        self.request(Command::ClearError).await
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(Reply<T>) -> Command,
    ) -> Result<T, CaptureError> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(make(tx))
            .await
            .map_err(|_| CaptureError::ControllerClosed)?;
        rx.await.map_err(|_| CaptureError::ControllerClosed)?
    }
}
