// per-shot result records and the run ensemble.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};

/// Append-only per-shot ledger of recorded outputs.
///
/// Entry order matches `RecordOutput` instruction order, not handle or
/// index order: two modules with the same measurements but different
/// recording order produce differently ordered records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShotRecord {
    entries: Vec<(String, u8)>,
}

impl ShotRecord {
    pub fn new() -> Self {
        ShotRecord::default()
    }

    pub fn append(&mut self, label: String, bit: u8) {
        self.entries.push((label, bit));
    }

    pub fn entries(&self) -> &[(String, u8)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One ensemble slot, written exactly once by exactly one shot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ShotSlot {
    /// Shot ran to the last instruction and sealed its record.
    Completed(ShotRecord),
    /// Shot aborted; the error stays attributable to this slot.
    Failed(EngineError),
    /// Shot was never dispatched (cancelled or aborted run).
    NotRun,
}

impl ShotSlot {
    pub fn record(&self) -> Option<&ShotRecord> {
        match self {
            ShotSlot::Completed(record) => Some(record),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&EngineError> {
        match self {
            ShotSlot::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// The complete collection of per-shot outcomes for one run,
/// slot index = shot number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ensemble {
    requested: usize,
    slots: Vec<ShotSlot>,
}

impl Ensemble {
    pub(crate) fn from_slots(requested: usize, slots: Vec<ShotSlot>) -> Self {
        debug_assert_eq!(requested, slots.len());
        Ensemble { requested, slots }
    }

    /// Configured shot count for the run.
    pub fn requested(&self) -> usize {
        self.requested
    }

    pub fn slots(&self) -> &[ShotSlot] {
        &self.slots
    }

    pub fn slot(&self, shot: usize) -> Option<&ShotSlot> {
        self.slots.get(shot)
    }

    /// True when every requested shot ran to completion or failure;
    /// a cancelled run leaves `NotRun` slots and reports false.
    pub fn is_complete(&self) -> bool {
        !self.slots.iter().any(|s| matches!(s, ShotSlot::NotRun))
    }

    /// Records of completed shots, in slot order.
    pub fn records(&self) -> impl Iterator<Item = (usize, &ShotRecord)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.record().map(|r| (i, r)))
    }

    /// Failed slots with their errors, in slot order.
    pub fn failures(&self) -> impl Iterator<Item = (usize, &EngineError)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.error().map(|e| (i, e)))
    }

    /// Every requested shot failed: a systemic module defect rather than a
    /// per-shot accident. Returns the first failure as its representative.
    pub fn systemic_failure(&self) -> Option<&EngineError> {
        if self.requested > 0 && self.failed() == self.requested {
            self.failures().next().map(|(_, e)| e)
        } else {
            None
        }
    }

    pub fn completed(&self) -> usize {
        self.records().count()
    }

    pub fn failed(&self) -> usize {
        self.failures().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_preserves_append_order() {
        let mut record = ShotRecord::new();
        record.append("z_check".into(), 1);
        record.append("x_check".into(), 0);
        let labels: Vec<_> = record.entries().iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(labels, ["z_check", "x_check"]);
    }

    #[test]
    fn ensemble_completeness() {
        let done = Ensemble::from_slots(2, vec![
            ShotSlot::Completed(ShotRecord::new()),
            ShotSlot::Failed(EngineError::backend("measure", "boom")),
        ]);
        assert!(done.is_complete());
        assert_eq!(done.completed(), 1);
        assert_eq!(done.failed(), 1);

        let partial = Ensemble::from_slots(2, vec![
            ShotSlot::Completed(ShotRecord::new()),
            ShotSlot::NotRun,
        ]);
        assert!(!partial.is_complete());
    }
}
