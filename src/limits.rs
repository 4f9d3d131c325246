use crate::model::Ms;

// ── Snapshot ingestion ───────────────────────────────────────────

/// Max resources accepted in one snapshot.
pub const MAX_SNAPSHOT_RESOURCES: usize = 10_000;

/// Max appointments accepted in one snapshot.
pub const MAX_SNAPSHOT_APPOINTMENTS: usize = 500_000;

/// Max providers accepted in one snapshot.
pub const MAX_SNAPSHOT_PROVIDERS: usize = 10_000;

// ── Slot grid ────────────────────────────────────────────────────

/// Shortest slot a utilization grid may use (1 minute).
pub const MIN_SLOT_MS: Ms = 60_000;

/// Max slots in one grid (a week of 1-minute slots).
pub const MAX_GRID_SLOTS: usize = 7 * 24 * 60;

// ── Registry ─────────────────────────────────────────────────────

/// Max clinic boards held by one registry.
pub const MAX_CLINICS: usize = 1_000;

/// Max clinic name length in bytes.
pub const MAX_CLINIC_NAME_LEN: usize = 128;
