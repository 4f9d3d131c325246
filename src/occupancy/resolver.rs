use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::*;
use crate::snapshot::Snapshot;

use super::index::AppointmentIndex;

/// Status of a single resource at `t`. First match wins:
/// withdrawn from service → `maintenance`, active appointment → `occupied`, else `available`.
///
/// Maintenance beats occupancy, so an out-of-service chair is never reported
/// as occupied even mid-appointment.
pub fn resolve_resource<'a, F>(
    resource: &Resource,
    index: &AppointmentIndex<'_>,
    provider_name: F,
    t: Ms,
) -> ResourceOccupancy
where
    F: Fn(ProviderId) -> Option<&'a str>,
{
    if !resource.is_available {
        return ResourceOccupancy::maintenance();
    }
    match index.active_at(resource.id, t) {
        Some(appt) => ResourceOccupancy::occupied(provider_name(appt.provider_id).map(str::to_owned)),
        None => ResourceOccupancy::available(),
    }
}

/// Status of every resource in the snapshot at `t`.
pub fn resolve_board(snapshot: &Snapshot, t: Ms) -> OccupancyBoard {
    let index = snapshot.index();
    let entries = snapshot
        .resources()
        .iter()
        .map(|r| {
            let occupancy = resolve_resource(r, &index, |pid| snapshot.provider_name(pid), t);
            (r.id, occupancy)
        })
        .collect();
    OccupancyBoard { entries }
}

/// `resolve_board` at the wall clock.
pub fn resolve_board_now(snapshot: &Snapshot) -> OccupancyBoard {
    resolve_board(snapshot, now_ms())
}

pub fn now_ms() -> Ms {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as Ms)
        .unwrap_or(0)
}

/// Resource id → occupancy at one instant. Serializes as a plain map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OccupancyBoard {
    entries: BTreeMap<ResourceId, ResourceOccupancy>,
}

impl OccupancyBoard {
    pub fn get(&self, id: &ResourceId) -> Option<&ResourceOccupancy> {
        self.entries.get(id)
    }

    /// Unknown resources are `available`: no data means no constraint.
    pub fn status_of(&self, id: &ResourceId) -> OccupancyStatus {
        self.entries.get(id).map(|o| o.status).unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ResourceId, &ResourceOccupancy)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count(&self, status: OccupancyStatus) -> usize {
        self.entries.values().filter(|o| o.status == status).count()
    }
}

impl FromIterator<(ResourceId, ResourceOccupancy)> for OccupancyBoard {
    fn from_iter<I: IntoIterator<Item = (ResourceId, ResourceOccupancy)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
