use serde::{Deserialize, Serialize};

use crate::limits::*;
use crate::model::*;
use crate::snapshot::Snapshot;

use super::error::GridError;
use super::index::AppointmentIndex;

const MINUTE: Ms = 60_000;
const DAY: Ms = 24 * 60 * MINUTE;

/// Fixed-granularity slots tiling a working window. The last slot is cut at
/// the window end when the window is not a whole number of slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotGrid {
    window: Span,
    slot_ms: Ms,
    len: usize,
}

impl SlotGrid {
    pub fn new(window: Span, slot_ms: Ms) -> Result<Self, GridError> {
        if window.is_empty() {
            return Err(GridError::EmptyWindow);
        }
        if slot_ms < MIN_SLOT_MS {
            return Err(GridError::SlotTooShort(slot_ms));
        }
        let duration = window
            .end
            .checked_sub(window.start)
            .ok_or(GridError::TooManySlots(usize::MAX))?;
        let len = duration / slot_ms + Ms::from(duration % slot_ms != 0);
        let len = usize::try_from(len).map_err(|_| GridError::TooManySlots(usize::MAX))?;
        if len > MAX_GRID_SLOTS {
            return Err(GridError::TooManySlots(len));
        }
        Ok(Self { window, slot_ms, len })
    }

    pub fn window(&self) -> Span {
        self.window
    }

    pub fn slot_ms(&self) -> Ms {
        self.slot_ms
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Same shape, window starting at `start`. Saturates at the end of time.
    pub fn moved_to(&self, start: Ms) -> SlotGrid {
        SlotGrid {
            window: Span {
                start,
                end: start.saturating_add(self.window.duration_ms()),
            },
            ..*self
        }
    }

    pub fn slots(&self) -> impl Iterator<Item = Span> + '_ {
        let Span { start, end } = self.window;
        // Slots past a saturated window end come out empty and never overlap.
        (0..self.len as Ms).map(move |i| {
            let s = start.saturating_add(i * self.slot_ms).min(end);
            Span {
                start: s,
                end: s.saturating_add(self.slot_ms).min(end),
            }
        })
    }
}

/// Opening hours as offsets from UTC midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkDay {
    pub open_offset_ms: Ms,
    pub length_ms: Ms,
}

impl Default for WorkDay {
    /// 08:00 for eight hours.
    fn default() -> Self {
        Self {
            open_offset_ms: 8 * 60 * MINUTE,
            length_ms: 8 * 60 * MINUTE,
        }
    }
}

impl WorkDay {
    /// Working window of the UTC day containing `t`, clamped to the `Ms` range.
    pub fn window_for(&self, t: Ms) -> Span {
        let midnight = t.div_euclid(DAY).saturating_mul(DAY);
        let start = midnight.saturating_add(self.open_offset_ms);
        Span {
            start,
            end: start.saturating_add(self.length_ms),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UtilizationFormula {
    /// Appointments overlapping the grid / total slots. A two-hour appointment
    /// counts once; two ten-minute appointments in one slot count twice.
    #[default]
    AppointmentCount,
    /// Slots overlapped by at least one appointment / total slots.
    SlotCoverage,
}

impl std::str::FromStr for UtilizationFormula {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "appointment_count" => Ok(UtilizationFormula::AppointmentCount),
            "slot_coverage" => Ok(UtilizationFormula::SlotCoverage),
            other => Err(format!("unknown utilization formula: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtilizationConfig {
    pub slot_ms: Ms,
    pub formula: UtilizationFormula,
    /// Cap results at 100. The appointment-count formula can exceed it otherwise.
    pub clamp: bool,
}

impl Default for UtilizationConfig {
    fn default() -> Self {
        Self {
            slot_ms: 15 * MINUTE,
            formula: UtilizationFormula::default(),
            clamp: true,
        }
    }
}

impl UtilizationConfig {
    pub fn grid(&self, window: Span) -> Result<SlotGrid, GridError> {
        SlotGrid::new(window, self.slot_ms)
    }
}

/// `round(100 * occupied / grid.len())` for one provider.
pub fn provider_utilization(
    index: &AppointmentIndex<'_>,
    provider_id: ProviderId,
    grid: &SlotGrid,
    config: &UtilizationConfig,
) -> u32 {
    if grid.is_empty() {
        return 0;
    }
    let occupied = match config.formula {
        // The grid tiles its window, so overlapping any slot is overlapping the window.
        UtilizationFormula::AppointmentCount => index
            .for_provider(provider_id)
            .filter(|a| a.span().overlaps(&grid.window()))
            .count(),
        UtilizationFormula::SlotCoverage => grid
            .slots()
            .filter(|slot| index.for_provider(provider_id).any(|a| a.span().overlaps(slot)))
            .count(),
    };
    let pct = (100.0 * occupied as f64 / grid.len() as f64).round() as u32;
    if config.clamp { pct.min(100) } else { pct }
}

/// Utilization for every provider in the snapshot, inactive ones included.
pub fn utilization_by_provider(snapshot: &Snapshot, grid: &SlotGrid, config: &UtilizationConfig) -> UtilizationMap {
    let index = snapshot.index();
    snapshot
        .providers()
        .iter()
        .map(|p| (p.id, provider_utilization(&index, p.id, grid, config)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ulid::Ulid;

    const H: Ms = 3_600_000;
    const M: Ms = 60_000;

    fn appt(provider: Ulid, start: Ms, end: Ms) -> Appointment {
        Appointment {
            id: Ulid::new(),
            patient_id: Ulid::new(),
            provider_id: provider,
            resource_id: Some(Ulid::new()),
            appointment_type_id: None,
            status: AppointmentStatus::Confirmed,
            start_time: start,
            end_time: end,
        }
    }

    fn day_grid() -> SlotGrid {
        SlotGrid::new(Span::new(8 * H, 16 * H), 15 * M).unwrap()
    }

    #[test]
    fn default_grid_has_32_slots() {
        let grid = UtilizationConfig::default()
            .grid(WorkDay::default().window_for(0))
            .unwrap();
        assert_eq!(grid.len(), 32);
        assert_eq!(grid.window(), Span::new(8 * H, 16 * H));
    }

    #[test]
    fn partial_last_slot() {
        let grid = SlotGrid::new(Span::new(0, 40 * M), 15 * M).unwrap();
        let slots: Vec<Span> = grid.slots().collect();
        assert_eq!(grid.len(), 3);
        assert_eq!(slots[2], Span::new(30 * M, 40 * M));
    }

    #[test]
    fn grid_rejects_bad_input() {
        assert_eq!(SlotGrid::new(Span { start: 5, end: 5 }, 15 * M), Err(GridError::EmptyWindow));
        assert_eq!(SlotGrid::new(Span::new(0, H), 1_000), Err(GridError::SlotTooShort(1_000)));
        assert!(matches!(
            SlotGrid::new(Span::new(0, 30 * 24 * H), M),
            Err(GridError::TooManySlots(_))
        ));
        // Slot lengths near the top of the range are too coarse, not a panic.
        assert_eq!(
            SlotGrid::new(Span::new(0, 8 * H), 9_223_372_036_854_720_000),
            Ok(SlotGrid {
                window: Span::new(0, 8 * H),
                slot_ms: 9_223_372_036_854_720_000,
                len: 1,
            })
        );
        assert!(matches!(
            SlotGrid::new(Span::new(Ms::MIN, Ms::MAX), 15 * M),
            Err(GridError::TooManySlots(_))
        ));
    }

    #[test]
    fn moved_grid_keeps_shape() {
        let grid = day_grid().moved_to(32 * H);
        assert_eq!(grid.len(), 32);
        assert_eq!(grid.window(), Span::new(32 * H, 40 * H));
        assert_eq!(grid.slots().next(), Some(Span::new(32 * H, 32 * H + 15 * M)));
    }

    #[test]
    fn window_for_uses_utc_day() {
        let wd = WorkDay::default();
        let day3 = 3 * 24 * H;
        assert_eq!(wd.window_for(day3 + 13 * H), Span::new(day3 + 8 * H, day3 + 16 * H));
        assert_eq!(wd.window_for(day3), Span::new(day3 + 8 * H, day3 + 16 * H));
        assert_eq!(wd.window_for(-1), Span::new(-24 * H + 8 * H, -24 * H + 16 * H));
    }

    #[test]
    fn extreme_instants_saturate() {
        let wd = WorkDay::default();
        let late = wd.window_for(Ms::MAX - 1_000);
        assert_eq!(late.end, Ms::MAX);
        assert!(late.start <= late.end);
        let early = wd.window_for(Ms::MIN);
        assert!(early.start < early.end);

        // A grid pushed past the end of time keeps its shape but covers nothing.
        let grid = day_grid().moved_to(late.start);
        assert_eq!(grid.len(), 32);
        assert!(grid.slots().all(|slot| slot.end <= Ms::MAX));
        let p = Ulid::new();
        let appts = vec![appt(p, Ms::MAX - 2 * H, Ms::MAX - H)];
        let idx = AppointmentIndex::new(&appts);
        let config = UtilizationConfig {
            formula: UtilizationFormula::SlotCoverage,
            ..Default::default()
        };
        assert_eq!(provider_utilization(&idx, p, &grid, &config), 0);
    }

    #[test]
    fn four_appointments_over_32_slots() {
        let p = Ulid::new();
        let appts: Vec<Appointment> = (0..4).map(|i| appt(p, 9 * H + i * H, 9 * H + i * H + 30 * M)).collect();
        let idx = AppointmentIndex::new(&appts);
        let pct = provider_utilization(&idx, p, &day_grid(), &UtilizationConfig::default());
        assert_eq!(pct, 13);
    }

    #[test]
    fn legacy_counts_appointments_not_slots() {
        let p = Ulid::new();
        // One two-hour appointment covers 8 slots but counts once.
        let appts = vec![appt(p, 9 * H, 11 * H)];
        let idx = AppointmentIndex::new(&appts);
        let legacy = provider_utilization(&idx, p, &day_grid(), &UtilizationConfig::default());
        let coverage = provider_utilization(
            &idx,
            p,
            &day_grid(),
            &UtilizationConfig {
                formula: UtilizationFormula::SlotCoverage,
                ..Default::default()
            },
        );
        assert_eq!(legacy, 3); // round(100 / 32)
        assert_eq!(coverage, 25); // 8 / 32
    }

    #[test]
    fn slot_coverage_counts_shared_slot_once() {
        let p = Ulid::new();
        let appts = vec![appt(p, 9 * H, 9 * H + 5 * M), appt(p, 9 * H + 5 * M, 9 * H + 10 * M)];
        let idx = AppointmentIndex::new(&appts);
        let config = UtilizationConfig {
            formula: UtilizationFormula::SlotCoverage,
            ..Default::default()
        };
        assert_eq!(provider_utilization(&idx, p, &day_grid(), &config), 3); // 1 / 32
    }

    #[test]
    fn outside_window_ignored() {
        let p = Ulid::new();
        let appts = vec![appt(p, 6 * H, 7 * H), appt(p, 16 * H, 17 * H)];
        let idx = AppointmentIndex::new(&appts);
        assert_eq!(provider_utilization(&idx, p, &day_grid(), &UtilizationConfig::default()), 0);
    }

    #[test]
    fn clamping_is_configurable() {
        let p = Ulid::new();
        // 40 five-minute appointments in a 2-hour, 8-slot grid.
        let appts: Vec<Appointment> = (0..40).map(|i| appt(p, i * 3 * M, i * 3 * M + 5 * M)).collect();
        let idx = AppointmentIndex::new(&appts);
        let grid = SlotGrid::new(Span::new(0, 2 * H), 15 * M).unwrap();

        let clamped = provider_utilization(&idx, p, &grid, &UtilizationConfig::default());
        let raw = provider_utilization(
            &idx,
            p,
            &grid,
            &UtilizationConfig {
                clamp: false,
                ..Default::default()
            },
        );
        assert_eq!(clamped, 100);
        assert_eq!(raw, 500);
    }

    #[test]
    fn monotonic_in_appointment_count() {
        let p = Ulid::new();
        let grid = day_grid();
        for formula in [UtilizationFormula::AppointmentCount, UtilizationFormula::SlotCoverage] {
            let config = UtilizationConfig {
                formula,
                ..Default::default()
            };
            let mut appts = Vec::new();
            let mut last = 0;
            for i in 0..16 {
                appts.push(appt(p, 8 * H + i * 30 * M, 8 * H + i * 30 * M + 20 * M));
                let idx = AppointmentIndex::new(&appts);
                let pct = provider_utilization(&idx, p, &grid, &config);
                assert!(pct >= last, "{formula:?}: {pct} < {last}");
                last = pct;
            }
        }
    }

    #[test]
    fn formula_from_str() {
        assert_eq!("slot_coverage".parse::<UtilizationFormula>(), Ok(UtilizationFormula::SlotCoverage));
        assert_eq!("appointment_count".parse::<UtilizationFormula>(), Ok(UtilizationFormula::AppointmentCount));
        assert!("slots".parse::<UtilizationFormula>().is_err());
    }
}
