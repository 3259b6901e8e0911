use cozy_chess::Square;
use tokio::sync::{broadcast, mpsc, oneshot};

use crate::commands::*;
use crate::events::SessionEvent;
use crate::selection::TapOutcome;
use crate::snapshot::SessionSnapshot;
use crate::time_control::TimeControl;

/// Cheap, cloneable handle to a session actor.
#[derive(Clone)]
pub struct SessionHandle {
    id: String,
    cmd_tx: mpsc::Sender<SessionCommand>,
}

impl SessionHandle {
    pub(crate) fn new(id: String, cmd_tx: mpsc::Sender<SessionCommand>) -> Self {
        Self { id, cmd_tx }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub async fn tap(&self, square: Square) -> Result<TapOutcome, SessionError> {
        self.request(|reply| SessionCommand::Tap { square, reply }).await
    }

    pub async fn start(&self) -> Result<(), SessionError> {
        self.request(|reply| SessionCommand::Start { reply }).await?
    }

    /// Returns the new paused state.
    pub async fn toggle_pause(&self) -> Result<bool, SessionError> {
        self.request(|reply| SessionCommand::TogglePause { reply }).await?
    }

    pub async fn new_game(
        &self,
        control: Option<TimeControl>,
    ) -> Result<SessionSnapshot, SessionError> {
        self.request(|reply| SessionCommand::NewGame { control, reply }).await
    }

    pub async fn import_fen(&self, fen: String) -> Result<SessionSnapshot, SessionError> {
        self.request(|reply| SessionCommand::ImportFen { fen, reply }).await?
    }

    pub async fn export_fen(&self) -> Result<String, SessionError> {
        self.request(|reply| SessionCommand::ExportFen { reply }).await
    }

    pub async fn undo(&self) -> Result<SessionSnapshot, SessionError> {
        self.request(|reply| SessionCommand::Undo { reply }).await?
    }

    pub async fn go_to_ply(&self, ply: usize) -> Result<SessionSnapshot, SessionError> {
        self.request(|reply| SessionCommand::GoToPly { ply, reply }).await?
    }

    pub async fn get_snapshot(&self) -> Result<SessionSnapshot, SessionError> {
        self.request(|reply| SessionCommand::GetSnapshot { reply }).await
    }

    pub async fn subscribe(
        &self,
    ) -> Result<(SessionSnapshot, broadcast::Receiver<SessionEvent>), SessionError> {
        self.request(|reply| SessionCommand::Subscribe { reply }).await
    }

    pub async fn shutdown(&self) {
        let _ = self.cmd_tx.send(SessionCommand::Shutdown).await;
    }

    /// Send a command built around a fresh reply channel and wait for the
    /// actor's answer.
    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> SessionCommand,
    ) -> Result<T, SessionError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(build(tx))
            .await
            .map_err(|_| SessionError::Internal("Session actor closed".into()))?;
        rx.await
            .map_err(|_| SessionError::Internal("Reply dropped".into()))
    }
}
