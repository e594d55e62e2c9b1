// measurement tallies over a finished ensemble. aggregation only; what to
// do with the numbers is the caller's business.

use crate::record::Ensemble;
use std::collections::HashMap;

/// Zero/one tallies for a single recorded output label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitStats {
    pub zeros: usize,
    pub ones: usize,
}

impl BitStats {
    pub fn add(&mut self, bit: u8) {
        match bit {
            0 => self.zeros += 1,
            1 => self.ones += 1,
            other => log::warn!("ignoring non-binary measurement value {other}"),
        }
    }

    pub fn total(&self) -> usize {
        self.zeros + self.ones
    }

    pub fn fraction_ones(&self) -> f64 {
        if self.total() == 0 {
            0.0
        } else {
            self.ones as f64 / self.total() as f64
        }
    }
}

/// Per-label tallies across all completed shots of an ensemble.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeasurementStatistics {
    pub total_shots: usize,
    pub per_label: HashMap<String, BitStats>,
}

impl MeasurementStatistics {
    /// Tally every completed shot; failed and not-run slots contribute
    /// nothing (they remain visible on the ensemble itself).
    pub fn from_ensemble(ensemble: &Ensemble) -> Self {
        let mut per_label: HashMap<String, BitStats> = HashMap::new();
        let mut total_shots = 0;
        for (_, record) in ensemble.records() {
            total_shots += 1;
            for (label, bit) in record.entries() {
                per_label.entry(label.clone()).or_default().add(*bit);
            }
        }
        MeasurementStatistics {
            total_shots,
            per_label,
        }
    }
}
