//! Echo stage: hold every fresh frame on the wire for a few extra polls.

use crate::types::SwitchReport;

/// Replays the last fresh report until its credit runs out.
#[derive(Debug, Clone)]
pub struct Echo {
    echoes: u8,
    credit: u8,
    last: SwitchReport,
}

impl Echo {
    /// `echoes` is the number of extra polls each fresh frame is repeated.
    #[must_use]
    pub const fn new(echoes: u8) -> Self {
        Self {
            echoes,
            credit: 0,
            last: SwitchReport::neutral(),
        }
    }

    /// Remember a fresh report and refill the credit.
    pub fn store(&mut self, report: SwitchReport) {
        self.last = report;
        self.credit = self.echoes;
    }

    /// Spend one credit on the stored report, if any remains.
    pub fn replay(&mut self) -> Option<SwitchReport> {
        if self.credit == 0 {
            return None;
        }
        self.credit -= 1;
        Some(self.last)
    }

    /// Drop the remaining credit, keeping the stored report.
    pub fn cancel(&mut self) {
        self.credit = 0;
    }

    #[inline]
    #[must_use]
    pub fn credit(&self) -> u8 {
        self.credit
    }

    #[inline]
    #[must_use]
    pub fn last(&self) -> &SwitchReport {
        &self.last
    }
}
