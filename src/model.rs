use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unix milliseconds. The only time type.
pub type Ms = i64;

pub type ResourceId = Ulid;
pub type ProviderId = Ulid;

/// Half-open interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: Ms,
    pub end: Ms,
}

impl Span {
    pub fn new(start: Ms, end: Ms) -> Self {
        debug_assert!(start < end, "Span start must be before end");
        Self { start, end }
    }

    /// `None` unless `start < end`.
    pub fn try_new(start: Ms, end: Ms) -> Option<Self> {
        (start < end).then_some(Self { start, end })
    }

    pub fn duration_ms(&self) -> Ms {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Zero-length spans never overlap anything, not even themselves.
    pub fn overlaps(&self, other: &Span) -> bool {
        !self.is_empty() && !other.is_empty() && self.start < other.end && other.start < self.end
    }

    pub fn contains_instant(&self, t: Ms) -> bool {
        self.start <= t && t < self.end
    }

    /// Returns true if `self` fully contains `other`.
    pub fn contains_span(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn intersection(&self, other: &Span) -> Option<Span> {
        Span::try_new(self.start.max(other.start), self.end.min(other.end))
    }
}

/// `interval.start <= t < interval.end`.
pub fn contains(interval: &Span, t: Ms) -> bool {
    interval.contains_instant(t)
}

/// `a.start < b.end && b.start < a.end`, false for zero-length spans.
pub fn overlaps(a: &Span, b: &Span) -> bool {
    a.overlaps(b)
}

// ── Snapshot records ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Chair,
    Operatory,
    Equipment,
    Room,
}

/// A bookable physical asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    pub name: String,
    pub kind: ResourceKind,
    /// Administrative flag. `false` means withdrawn from service, whatever is booked.
    pub is_available: bool,
    /// Free-form maintenance schedule as entered by staff. Not interpreted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintenance_schedule: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    CheckedIn,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    /// Cancelled appointments never count toward occupancy or utilization.
    pub fn counts(&self) -> bool {
        !matches!(self, AppointmentStatus::Cancelled)
    }
}

/// One provider seeing one patient on (usually) one resource over `[start_time, end_time)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Ulid,
    pub patient_id: Ulid,
    pub provider_id: ProviderId,
    #[serde(default)]
    pub resource_id: Option<ResourceId>,
    #[serde(default)]
    pub appointment_type_id: Option<Ulid>,
    pub status: AppointmentStatus,
    pub start_time: Ms,
    pub end_time: Ms,
}

impl Appointment {
    /// Built without the ordering assertion: malformed records are rejected at
    /// ingestion, and an empty span simply never matches anything.
    pub fn span(&self) -> Span {
        Span {
            start: self.start_time,
            end: self.end_time,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Dentist,
    Hygienist,
    Specialist,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    pub id: ProviderId,
    pub name: String,
    pub kind: ProviderKind,
    pub is_active: bool,
}

// ── Derived results ──────────────────────────────────────────────

/// Derived per instant, never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OccupancyStatus {
    #[default]
    Available,
    Occupied,
    Maintenance,
}

impl OccupancyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OccupancyStatus::Available => "available",
            OccupancyStatus::Occupied => "occupied",
            OccupancyStatus::Maintenance => "maintenance",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceOccupancy {
    pub status: OccupancyStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

impl ResourceOccupancy {
    pub fn available() -> Self {
        Self::default()
    }

    pub fn maintenance() -> Self {
        Self {
            status: OccupancyStatus::Maintenance,
            provider: None,
        }
    }

    pub fn occupied(provider: Option<String>) -> Self {
        Self {
            status: OccupancyStatus::Occupied,
            provider,
        }
    }
}

/// Utilization percentage per provider.
pub type UtilizationMap = BTreeMap<ProviderId, u32>;
