use std::collections::HashMap;

use crate::model::*;

/// Non-cancelled appointments of one snapshot, bucketed by resource and by provider.
///
/// Resource buckets are sorted by `(start_time, id)`, so when a resource is
/// double-booked `active_at` always returns the earliest-starting appointment.
#[derive(Debug, Default)]
pub struct AppointmentIndex<'a> {
    by_resource: HashMap<ResourceId, Vec<&'a Appointment>>,
    by_provider: HashMap<ProviderId, Vec<&'a Appointment>>,
}

impl<'a> AppointmentIndex<'a> {
    pub fn new(appointments: &'a [Appointment]) -> Self {
        let mut by_resource: HashMap<ResourceId, Vec<&'a Appointment>> = HashMap::new();
        let mut by_provider: HashMap<ProviderId, Vec<&'a Appointment>> = HashMap::new();

        for appt in appointments.iter().filter(|a| a.status.counts()) {
            if let Some(rid) = appt.resource_id {
                by_resource.entry(rid).or_default().push(appt);
            }
            by_provider.entry(appt.provider_id).or_default().push(appt);
        }

        for bucket in by_resource.values_mut().chain(by_provider.values_mut()) {
            bucket.sort_by_key(|a| (a.start_time, a.id));
        }

        Self {
            by_resource,
            by_provider,
        }
    }

    /// The appointment occupying `resource_id` at `t`, if any.
    pub fn active_at(&self, resource_id: ResourceId, t: Ms) -> Option<&'a Appointment> {
        let bucket = self.by_resource.get(&resource_id)?;
        // Everything at index >= right_bound starts after t.
        let right_bound = bucket.partition_point(|a| a.start_time <= t);
        bucket[..right_bound]
            .iter()
            .find(|a| a.span().contains_instant(t))
            .copied()
    }

    /// Non-cancelled appointments for a provider. Re-iterating yields the same sequence.
    pub fn for_provider(&self, provider_id: ProviderId) -> impl Iterator<Item = &'a Appointment> + '_ {
        self.by_provider.get(&provider_id).into_iter().flatten().copied()
    }

    /// Non-cancelled appointments on a resource, earliest first.
    pub fn on_resource(&self, resource_id: ResourceId) -> impl Iterator<Item = &'a Appointment> + '_ {
        self.by_resource.get(&resource_id).into_iter().flatten().copied()
    }

    /// Appointments on a resource whose span overlaps `query`.
    pub fn overlapping(&self, resource_id: ResourceId, query: Span) -> impl Iterator<Item = &'a Appointment> + '_ {
        let bucket: &[&'a Appointment] = self
            .by_resource
            .get(&resource_id)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        let right_bound = bucket.partition_point(|a| a.start_time < query.end);
        bucket[..right_bound]
            .iter()
            .filter(move |a| a.span().overlaps(&query))
            .copied()
    }

    pub(super) fn resource_buckets(&self) -> impl Iterator<Item = (ResourceId, &[&'a Appointment])> + '_ {
        self.by_resource.iter().map(|(rid, bucket)| (*rid, bucket.as_slice()))
    }

    pub fn resource_count(&self) -> usize {
        self.by_resource.len()
    }
}
