//! Pure occupancy and utilization computations over an immutable snapshot.
//!
//! Nothing here blocks, logs, or holds state between calls: every entry point
//! takes the snapshot and the instant it should answer for.

mod conflict;
mod error;
mod index;
mod resolver;
mod utilization;

pub use conflict::{find_double_bookings, DoubleBooking};
pub use error::{GridError, SnapshotError};
pub use index::AppointmentIndex;
pub use resolver::{now_ms, resolve_board, resolve_board_now, resolve_resource, OccupancyBoard};
pub use utilization::{
    provider_utilization, utilization_by_provider, SlotGrid, UtilizationConfig, UtilizationFormula, WorkDay,
};
