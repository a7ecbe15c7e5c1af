//! Incidence of each adverse-event type per arm.

use crate::data::{AdverseEvent, ParticipantTable, TreatmentArm};
use serde::{Deserialize, Serialize};

/// Incidence of one adverse event in both arms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventIncidence {
    pub event: AdverseEvent,
    /// Participants with the event, per arm (Drug, Placebo).
    pub counts: [u64; 2],
    /// Participants per arm (Drug, Placebo).
    pub nobs: [u64; 2],
}

impl EventIncidence {
    /// Proportion of an arm with the event.
    pub fn rate(&self, arm: TreatmentArm) -> f64 {
        let i = arm.index();
        if self.nobs[i] == 0 {
            f64::NAN
        } else {
            self.counts[i] as f64 / self.nobs[i] as f64
        }
    }
}

/// Count participants with each adverse event, per arm.
pub fn profile_events(table: &ParticipantTable) -> Vec<EventIncidence> {
    let arm_counts = table.arm_counts();
    let nobs = [arm_counts.drug as u64, arm_counts.placebo as u64];

    AdverseEvent::ALL
        .iter()
        .map(|&event| {
            let mut counts = [0u64; 2];
            for p in table.iter().filter(|p| p.has_event(event)) {
                counts[p.arm.index()] += 1;
            }
            EventIncidence { event, counts, nobs }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{aggregate_participants, ConsistencyPolicy, RawRecord};

    #[test]
    fn test_profile_events() {
        let records = vec![
            RawRecord::new("D1", TreatmentArm::Drug, 30.0).with_event(AdverseEvent::Headache),
            RawRecord::new("D1", TreatmentArm::Drug, 30.0).with_event(AdverseEvent::Headache),
            RawRecord::new("D2", TreatmentArm::Drug, 40.0).with_event(AdverseEvent::Headache),
            RawRecord::new("P1", TreatmentArm::Placebo, 35.0).with_event(AdverseEvent::Coad),
            RawRecord::new("P2", TreatmentArm::Placebo, 45.0),
        ];
        let table = aggregate_participants(&records, ConsistencyPolicy::Strict).unwrap();
        let incidence = profile_events(&table);

        assert_eq!(incidence.len(), 5);
        let headache = &incidence[AdverseEvent::Headache.index()];
        assert_eq!(headache.counts, [2, 0]);
        assert_eq!(headache.nobs, [2, 2]);
        assert_eq!(headache.rate(TreatmentArm::Drug), 1.0);

        let coad = &incidence[AdverseEvent::Coad.index()];
        assert_eq!(coad.counts, [0, 1]);
        assert_eq!(coad.rate(TreatmentArm::Placebo), 0.5);
    }
}
