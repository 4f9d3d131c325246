use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{broadcast, RwLock};
use tracing::info;
use ulid::Ulid;

use crate::model::*;
use crate::notify::{BoardUpdate, NotifyHub};
use crate::observability::*;
use crate::occupancy::{resolve_board, utilization_by_provider, GridError, OccupancyBoard, SlotGrid, UtilizationConfig, WorkDay};
use crate::snapshot::Snapshot;

/// Utilization settings with the grid shape validated up front, so a board
/// refresh never fails on configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardConfig {
    utilization: UtilizationConfig,
    work_day: WorkDay,
    grid: SlotGrid,
}

impl BoardConfig {
    pub fn new(utilization: UtilizationConfig, work_day: WorkDay) -> Result<Self, GridError> {
        let grid = utilization.grid(work_day.window_for(0))?;
        Ok(Self {
            utilization,
            work_day,
            grid,
        })
    }

    pub fn utilization(&self) -> &UtilizationConfig {
        &self.utilization
    }

    /// Slot grid over the working window of the UTC day containing `t`.
    pub fn grid_for(&self, t: Ms) -> SlotGrid {
        self.grid.moved_to(self.work_day.window_for(t).start)
    }
}

/// The current snapshot of one clinic. Callers push fresh snapshots in;
/// every swap recomputes occupancy and utilization and notifies subscribers.
pub struct Board {
    id: Ulid,
    clinic: String,
    config: BoardConfig,
    snapshot: RwLock<Arc<Snapshot>>,
    notify: Arc<NotifyHub>,
}

impl Board {
    pub fn new(clinic: impl Into<String>, config: BoardConfig, notify: Arc<NotifyHub>) -> Self {
        Self {
            id: Ulid::new(),
            clinic: clinic.into(),
            config,
            snapshot: RwLock::new(Arc::new(Snapshot::default())),
            notify,
        }
    }

    /// Unique per board, even across boards of the same clinic.
    pub fn id(&self) -> Ulid {
        self.id
    }

    pub fn clinic(&self) -> &str {
        &self.clinic
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    /// Swap in `snapshot`, recompute at `now`, and broadcast the result.
    ///
    /// The write lock is held until the broadcast is out, so concurrent swaps
    /// publish in the order they are stored.
    pub async fn replace_snapshot(&self, snapshot: Snapshot, now: Ms) -> BoardUpdate {
        let started = Instant::now();
        let grid = self.config.grid_for(now);
        let occupancy = resolve_board(&snapshot, now);
        let utilization = utilization_by_provider(&snapshot, &grid, &self.config.utilization);
        let double_bookings = snapshot.double_booking_count();

        metrics::histogram!(BOARD_RECOMPUTE_SECONDS, "clinic" => self.clinic.clone())
            .record(started.elapsed().as_secs_f64());
        metrics::counter!(SNAPSHOTS_APPLIED_TOTAL, "clinic" => self.clinic.clone()).increment(1);
        metrics::gauge!(DOUBLE_BOOKINGS, "clinic" => self.clinic.clone()).set(double_bookings as f64);
        for status in [OccupancyStatus::Available, OccupancyStatus::Occupied, OccupancyStatus::Maintenance] {
            metrics::gauge!(RESOURCES_BY_STATUS, "clinic" => self.clinic.clone(), "status" => status.as_str())
                .set(occupancy.count(status) as f64);
        }

        let mut current = self.snapshot.write().await;
        *current = Arc::new(snapshot);

        info!(
            clinic = %self.clinic,
            occupied = occupancy.count(OccupancyStatus::Occupied),
            maintenance = occupancy.count(OccupancyStatus::Maintenance),
            available = occupancy.count(OccupancyStatus::Available),
            double_bookings,
            "board refreshed"
        );

        let update = BoardUpdate {
            clinic: self.clinic.clone(),
            at: now,
            occupancy,
            utilization,
        };
        self.notify.send(self.id, &update);
        drop(current);
        update
    }

    pub async fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshot.read().await.clone()
    }

    pub async fn occupancy_at(&self, t: Ms) -> OccupancyBoard {
        let snapshot = self.snapshot().await;
        resolve_board(&snapshot, t)
    }

    /// Utilization over the working day containing `t`.
    pub async fn utilization_for(&self, t: Ms) -> UtilizationMap {
        let snapshot = self.snapshot().await;
        utilization_by_provider(&snapshot, &self.config.grid_for(t), &self.config.utilization)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BoardUpdate> {
        self.notify.subscribe(self.id)
    }
}
