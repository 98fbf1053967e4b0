//! Data bridge -- forwards background poll results into the action
//! queue. The poll loop never touches UI state; this is its only way in.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use plotwatch_core::PollUpdate;

use crate::action::Action;

/// Forward every [`PollUpdate`] as an [`Action::Poll`] until either
/// side hangs up.
pub fn spawn_poll_bridge(
    mut poll_rx: mpsc::UnboundedReceiver<PollUpdate>,
    action_tx: mpsc::UnboundedSender<Action>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(update) = poll_rx.recv().await {
            if action_tx.send(Action::Poll(update)).is_err() {
                break;
            }
        }
        debug!("poll bridge shut down");
    })
}
