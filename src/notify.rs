use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::broadcast;
use ulid::Ulid;

use crate::model::{Ms, UtilizationMap};
use crate::occupancy::OccupancyBoard;

const CHANNEL_CAPACITY: usize = 64;

/// Recomputed state of one clinic, published after every snapshot swap.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardUpdate {
    pub clinic: String,
    pub at: Ms,
    pub occupancy: OccupancyBoard,
    pub utilization: UtilizationMap,
}

/// Broadcast hub for board updates, one channel per board.
///
/// Channels are keyed by board id rather than clinic name, so a board that
/// outlives its registry entry never reaches a later board of the same clinic.
pub struct NotifyHub {
    channels: DashMap<Ulid, broadcast::Sender<BoardUpdate>>,
}

impl Default for NotifyHub {
    fn default() -> Self {
        Self::new()
    }
}

impl NotifyHub {
    pub fn new() -> Self {
        Self {
            channels: DashMap::new(),
        }
    }

    /// Subscribe to updates from a board. Creates the channel if needed.
    pub fn subscribe(&self, board: Ulid) -> broadcast::Receiver<BoardUpdate> {
        let sender = self
            .channels
            .entry(board)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0);
        sender.subscribe()
    }

    /// Send an update. No-op if nobody is listening.
    pub fn send(&self, board: Ulid, update: &BoardUpdate) {
        if let Some(sender) = self.channels.get(&board) {
            let _ = sender.send(update.clone());
        }
    }

    /// Drop a board's channel; current subscribers see the stream close.
    pub fn remove(&self, board: Ulid) {
        self.channels.remove(&board);
    }
}
