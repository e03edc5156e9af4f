//! Crops and crop rows.

use serde::{Deserialize, Serialize};

use crate::core::Point2D;
use crate::ids::{AgentId, CropId, RowId};

/// Work progress of a single crop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CropState {
    Unprocessed,
    Scanning,
    Scanned,
    Processing,
    Processed,
}

impl CropState {
    pub fn name(&self) -> &'static str {
        match self {
            CropState::Unprocessed => "Unprocessed",
            CropState::Scanning => "Scanning",
            CropState::Scanned => "Scanned",
            CropState::Processing => "Processing",
            CropState::Processed => "Processed",
        }
    }

    /// Still needs scanning work.
    pub fn needs_scan(&self) -> bool {
        matches!(self, CropState::Unprocessed | CropState::Scanning)
    }
}

/// A work target at a fixed position.
#[derive(Clone, Debug, PartialEq)]
pub struct Crop {
    pub id: CropId,
    pub row: RowId,
    pub position: Point2D,
    state: CropState,
    worked_ticks: u32,
    scan_ticks: u32,
    process_ticks: u32,
}

impl Crop {
    pub fn new(id: CropId, row: RowId, position: Point2D, scan_ticks: u32, process_ticks: u32) -> Self {
        Self {
            id,
            row,
            position,
            state: CropState::Unprocessed,
            worked_ticks: 0,
            scan_ticks,
            process_ticks,
        }
    }

    #[inline]
    pub fn state(&self) -> CropState {
        self.state
    }

    #[inline]
    pub fn worked_ticks(&self) -> u32 {
        self.worked_ticks
    }

    #[inline]
    pub fn is_processed(&self) -> bool {
        self.state == CropState::Processed
    }

    /// Apply one tick of work.
    ///
    /// The first call on an unprocessed crop starts scanning, the first
    /// call on a scanned crop starts processing. The counter resets when a
    /// phase completes.
    pub fn process(&mut self) -> CropState {
        match self.state {
            CropState::Processed => return self.state,
            CropState::Unprocessed => self.state = CropState::Scanning,
            CropState::Scanned => self.state = CropState::Processing,
            CropState::Scanning | CropState::Processing => {}
        }

        self.worked_ticks += 1;
        match self.state {
            CropState::Scanning if self.worked_ticks >= self.scan_ticks => {
                self.state = CropState::Scanned;
                self.worked_ticks = 0;
            }
            CropState::Processing if self.worked_ticks >= self.process_ticks => {
                self.state = CropState::Processed;
                self.worked_ticks = 0;
            }
            _ => {}
        }
        self.state
    }

    /// Abandon unfinished work. Processed crops are unaffected.
    pub fn quit_work(&mut self) {
        if self.state != CropState::Processed {
            self.state = CropState::Unprocessed;
            self.worked_ticks = 0;
        }
    }
}

/// An ordered line of crops claimed as a unit.
#[derive(Clone, Debug, PartialEq)]
pub struct CropRow {
    pub id: RowId,
    /// Member crops from one end of the row to the other
    pub crops: Vec<CropId>,
    pub(crate) processed: bool,
    pub(crate) claim: Option<AgentId>,
}

impl CropRow {
    pub fn new(id: RowId, crops: Vec<CropId>) -> Self {
        Self {
            id,
            crops,
            processed: false,
            claim: None,
        }
    }

    #[inline]
    pub fn is_processed(&self) -> bool {
        self.processed
    }

    #[inline]
    pub fn claim(&self) -> Option<AgentId> {
        self.claim
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crop(scan: u32, process: u32) -> Crop {
        Crop::new(CropId(0), RowId(0), Point2D::ZERO, scan, process)
    }

    #[test]
    fn test_full_lifecycle() {
        let mut c = crop(3, 2);
        assert_eq!(c.process(), CropState::Scanning);
        assert_eq!(c.process(), CropState::Scanning);
        assert_eq!(c.process(), CropState::Scanned);
        assert_eq!(c.worked_ticks(), 0);
        assert_eq!(c.process(), CropState::Processing);
        assert_eq!(c.process(), CropState::Processed);
        assert_eq!(c.process(), CropState::Processed);
    }

    #[test]
    fn test_single_tick_phases() {
        let mut c = crop(1, 1);
        assert_eq!(c.process(), CropState::Scanned);
        assert_eq!(c.process(), CropState::Processed);
    }

    #[test]
    fn test_quit_work_resets_unfinished() {
        let mut c = crop(5, 5);
        c.process();
        c.process();
        c.quit_work();
        assert_eq!(c.state(), CropState::Unprocessed);
        assert_eq!(c.worked_ticks(), 0);

        let mut done = crop(1, 1);
        done.process();
        done.process();
        done.quit_work();
        assert!(done.is_processed());
    }
}
