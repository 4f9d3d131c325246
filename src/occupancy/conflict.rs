use ulid::Ulid;

use crate::model::*;

use super::index::AppointmentIndex;

/// Two non-cancelled appointments overlapping on the same resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoubleBooking {
    pub resource_id: ResourceId,
    pub first: Ulid,
    pub second: Ulid,
    pub overlap: Span,
}

/// Every overlapping pair per resource. Detection only, nothing is resolved.
///
/// Buckets are start-sorted, so each appointment only needs comparing against
/// later ones until the first that starts at or after its end.
pub fn find_double_bookings(index: &AppointmentIndex<'_>) -> Vec<DoubleBooking> {
    let mut found = Vec::new();
    for (resource_id, bucket) in index.resource_buckets() {
        for (i, a) in bucket.iter().enumerate() {
            let a_span = a.span();
            for b in bucket[i + 1..].iter().take_while(|b| b.start_time < a.end_time) {
                if let Some(overlap) = a_span.intersection(&b.span()) {
                    found.push(DoubleBooking {
                        resource_id,
                        first: a.id,
                        second: b.id,
                        overlap,
                    });
                }
            }
        }
    }
    found.sort_by_key(|d| (d.resource_id, d.overlap.start, d.first, d.second));
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    const H: Ms = 3_600_000;
    const M: Ms = 60_000;

    fn booking(resource: Ulid, start: Ms, end: Ms, status: AppointmentStatus) -> Appointment {
        Appointment {
            id: Ulid::new(),
            patient_id: Ulid::new(),
            provider_id: Ulid::new(),
            resource_id: Some(resource),
            appointment_type_id: None,
            status,
            start_time: start,
            end_time: end,
        }
    }

    #[test]
    fn back_to_back_is_not_a_conflict() {
        let r = Ulid::new();
        let appts = vec![
            booking(r, 9 * H, 9 * H + 30 * M, AppointmentStatus::Confirmed),
            booking(r, 9 * H + 30 * M, 10 * H, AppointmentStatus::Confirmed),
        ];
        let idx = AppointmentIndex::new(&appts);
        assert!(find_double_bookings(&idx).is_empty());
    }

    #[test]
    fn overlap_reported_once() {
        let r = Ulid::new();
        let appts = vec![
            booking(r, 9 * H, 10 * H, AppointmentStatus::Confirmed),
            booking(r, 9 * H + 30 * M, 11 * H, AppointmentStatus::Scheduled),
        ];
        let idx = AppointmentIndex::new(&appts);
        let found = find_double_bookings(&idx);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].resource_id, r);
        assert_eq!(found[0].first, appts[0].id);
        assert_eq!(found[0].second, appts[1].id);
        assert_eq!(found[0].overlap, Span::new(9 * H + 30 * M, 10 * H));
    }

    #[test]
    fn long_appointment_conflicts_with_several() {
        let r = Ulid::new();
        let appts = vec![
            booking(r, 8 * H, 12 * H, AppointmentStatus::InProgress),
            booking(r, 9 * H, 9 * H + 15 * M, AppointmentStatus::Scheduled),
            booking(r, 10 * H, 10 * H + 15 * M, AppointmentStatus::Scheduled),
        ];
        let idx = AppointmentIndex::new(&appts);
        assert_eq!(find_double_bookings(&idx).len(), 2);
    }

    #[test]
    fn cancelled_and_other_resources_ignored() {
        let r1 = Ulid::new();
        let r2 = Ulid::new();
        let appts = vec![
            booking(r1, 9 * H, 10 * H, AppointmentStatus::Confirmed),
            booking(r1, 9 * H, 10 * H, AppointmentStatus::Cancelled),
            booking(r2, 9 * H, 10 * H, AppointmentStatus::Confirmed),
        ];
        let idx = AppointmentIndex::new(&appts);
        assert!(find_double_bookings(&idx).is_empty());
    }
}
