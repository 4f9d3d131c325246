use std::collections::{HashMap, HashSet};

use serde::Deserialize;
use tracing::{debug, warn};
use ulid::Ulid;

use crate::limits::*;
use crate::model::*;
use crate::occupancy::{find_double_bookings, AppointmentIndex, DoubleBooking, SnapshotError};

/// Validated, read-only view of one clinic's resources, appointments and providers.
///
/// Malformed intervals are rejected here so the resolver never has to fail.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    resources: Vec<Resource>,
    appointments: Vec<Appointment>,
    providers: Vec<Provider>,
    provider_pos: HashMap<ProviderId, usize>,
    double_booking_count: usize,
}

/// Wire shape of a snapshot document. Missing lists are empty.
#[derive(Debug, Deserialize)]
struct SnapshotDoc {
    #[serde(default)]
    resources: Vec<Resource>,
    #[serde(default)]
    appointments: Vec<Appointment>,
    #[serde(default)]
    providers: Vec<Provider>,
}

impl Snapshot {
    pub fn new(
        resources: Vec<Resource>,
        appointments: Vec<Appointment>,
        providers: Vec<Provider>,
    ) -> Result<Self, SnapshotError> {
        if resources.len() > MAX_SNAPSHOT_RESOURCES {
            return Err(SnapshotError::LimitExceeded("too many resources"));
        }
        if appointments.len() > MAX_SNAPSHOT_APPOINTMENTS {
            return Err(SnapshotError::LimitExceeded("too many appointments"));
        }
        if providers.len() > MAX_SNAPSHOT_PROVIDERS {
            return Err(SnapshotError::LimitExceeded("too many providers"));
        }

        check_unique(resources.iter().map(|r| r.id))?;
        check_unique(appointments.iter().map(|a| a.id))?;
        check_unique(providers.iter().map(|p| p.id))?;

        for a in &appointments {
            if a.start_time >= a.end_time {
                return Err(SnapshotError::MalformedInterval {
                    id: a.id,
                    start: a.start_time,
                    end: a.end_time,
                });
            }
        }

        let double_bookings = find_double_bookings(&AppointmentIndex::new(&appointments));
        for d in &double_bookings {
            warn!(
                resource = %d.resource_id,
                first = %d.first,
                second = %d.second,
                "double booking from {} to {}",
                d.overlap.start,
                d.overlap.end
            );
        }

        let provider_pos = providers.iter().enumerate().map(|(i, p)| (p.id, i)).collect();
        let snapshot = Self {
            resources,
            appointments,
            providers,
            provider_pos,
            double_booking_count: double_bookings.len(),
        };
        debug!(
            resources = snapshot.resources.len(),
            appointments = snapshot.appointments.len(),
            providers = snapshot.providers.len(),
            "snapshot ingested"
        );
        Ok(snapshot)
    }

    /// Parse `{ "resources": [...], "appointments": [...], "providers": [...] }` and validate.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let doc: SnapshotDoc = serde_json::from_str(json)?;
        Self::new(doc.resources, doc.appointments, doc.providers)
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn appointments(&self) -> &[Appointment] {
        &self.appointments
    }

    pub fn providers(&self) -> &[Provider] {
        &self.providers
    }

    pub fn provider(&self, id: ProviderId) -> Option<&Provider> {
        self.provider_pos.get(&id).map(|&i| &self.providers[i])
    }

    pub fn provider_name(&self, id: ProviderId) -> Option<&str> {
        self.provider(id).map(|p| p.name.as_str())
    }

    /// Fresh O(n) index over the non-cancelled appointments.
    pub fn index(&self) -> AppointmentIndex<'_> {
        AppointmentIndex::new(&self.appointments)
    }

    /// Rescans the index. Use `double_booking_count` when only the number matters.
    pub fn double_bookings(&self) -> Vec<DoubleBooking> {
        find_double_bookings(&self.index())
    }

    /// Overlapping pairs found at ingestion.
    pub fn double_booking_count(&self) -> usize {
        self.double_booking_count
    }
}

fn check_unique(ids: impl Iterator<Item = Ulid>) -> Result<(), SnapshotError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(SnapshotError::DuplicateId(id));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const H: Ms = 3_600_000;

    fn provider(name: &str) -> Provider {
        Provider {
            id: Ulid::new(),
            name: name.into(),
            kind: ProviderKind::Hygienist,
            is_active: true,
        }
    }

    fn appt(start: Ms, end: Ms) -> Appointment {
        Appointment {
            id: Ulid::new(),
            patient_id: Ulid::new(),
            provider_id: Ulid::new(),
            resource_id: None,
            appointment_type_id: None,
            status: AppointmentStatus::Scheduled,
            start_time: start,
            end_time: end,
        }
    }

    #[test]
    fn empty_snapshot_is_valid() {
        let snap = Snapshot::new(vec![], vec![], vec![]).unwrap();
        assert!(snap.resources().is_empty());
        assert!(snap.double_bookings().is_empty());
        assert_eq!(snap.double_booking_count(), 0);
        assert_eq!(Snapshot::default().double_booking_count(), 0);
    }

    #[test]
    fn double_bookings_counted_at_ingestion() {
        let chair = Ulid::new();
        let mut first = appt(9 * H, 10 * H);
        let mut second = appt(9 * H + H / 2, 11 * H);
        let mut later = appt(11 * H, 12 * H);
        for a in [&mut first, &mut second, &mut later] {
            a.resource_id = Some(chair);
        }
        let snap = Snapshot::new(vec![], vec![first, second, later], vec![]).unwrap();
        assert_eq!(snap.double_booking_count(), 1);
        assert_eq!(snap.double_bookings().len(), snap.double_booking_count());
    }

    #[test]
    fn rejects_malformed_interval() {
        let bad = appt(2 * H, H);
        let id = bad.id;
        let err = Snapshot::new(vec![], vec![bad], vec![]).unwrap_err();
        assert!(matches!(err, SnapshotError::MalformedInterval { id: e, .. } if e == id));

        let zero = appt(H, H);
        assert!(matches!(
            Snapshot::new(vec![], vec![zero], vec![]),
            Err(SnapshotError::MalformedInterval { .. })
        ));
    }

    #[test]
    fn rejects_duplicate_provider() {
        let p = provider("Dr. Haas");
        let err = Snapshot::new(vec![], vec![], vec![p.clone(), p]).unwrap_err();
        assert!(matches!(err, SnapshotError::DuplicateId(_)));
    }

    #[test]
    fn provider_lookup() {
        let p = provider("Dr. Haas");
        let pid = p.id;
        let snap = Snapshot::new(vec![], vec![], vec![p]).unwrap();
        assert_eq!(snap.provider_name(pid), Some("Dr. Haas"));
        assert_eq!(snap.provider_name(Ulid::new()), None);
    }

    #[test]
    fn from_json_defaults_missing_lists() {
        let snap = Snapshot::from_json(r#"{ "resources": [] }"#).unwrap();
        assert!(snap.appointments().is_empty());
        assert!(snap.providers().is_empty());
    }

    #[test]
    fn from_json_reports_parse_errors() {
        let err = Snapshot::from_json("{ not json").unwrap_err();
        assert!(matches!(err, SnapshotError::Parse(_)));
        assert!(err.to_string().starts_with("snapshot parse error"));
    }
}
