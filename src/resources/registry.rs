//! Arena of crops, rows and stations plus the row claim table.

use std::collections::BTreeSet;

use crate::core::Point2D;
use crate::ids::{AgentId, CropId, RowId, StationId};

use super::crop::{Crop, CropRow, CropState};
use super::station::ChargingStation;

/// Owns every crop, row and station. Everything else refers to them by id.
#[derive(Clone, Debug, Default)]
pub struct ResourceRegistry {
    crops: Vec<Crop>,
    rows: Vec<CropRow>,
    stations: Vec<ChargingStation>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a row of crops ordered from one end to the other.
    pub fn add_row(&mut self, positions: &[Point2D], scan_ticks: u32, process_ticks: u32) -> RowId {
        let row = RowId(self.rows.len());
        let ids = positions
            .iter()
            .map(|&position| {
                let id = CropId(self.crops.len());
                self.crops
                    .push(Crop::new(id, row, position, scan_ticks, process_ticks));
                id
            })
            .collect();
        self.rows.push(CropRow::new(row, ids));
        self.refresh_row(row);
        row
    }

    pub fn add_station(&mut self, position: Point2D, queue_direction: Point2D, waiting_offset: f64) -> StationId {
        let id = StationId(self.stations.len());
        self.stations
            .push(ChargingStation::new(id, position, queue_direction, waiting_offset));
        id
    }

    #[inline]
    pub fn crop(&self, id: CropId) -> Option<&Crop> {
        self.crops.get(id.0)
    }

    #[inline]
    pub fn row(&self, id: RowId) -> Option<&CropRow> {
        self.rows.get(id.0)
    }

    #[inline]
    pub fn station(&self, id: StationId) -> Option<&ChargingStation> {
        self.stations.get(id.0)
    }

    #[inline]
    pub fn station_mut(&mut self, id: StationId) -> Option<&mut ChargingStation> {
        self.stations.get_mut(id.0)
    }

    pub fn crops(&self) -> &[Crop] {
        &self.crops
    }

    pub fn rows(&self) -> &[CropRow] {
        &self.rows
    }

    pub fn stations(&self) -> &[ChargingStation] {
        &self.stations
    }

    /// Work a crop for one tick and refresh its row.
    pub fn work_crop(&mut self, id: CropId) -> Option<CropState> {
        let crop = self.crops.get_mut(id.0)?;
        let state = crop.process();
        let row = crop.row;
        self.refresh_row(row);
        Some(state)
    }

    /// Abandon work on a crop and refresh its row.
    pub fn quit_crop(&mut self, id: CropId) {
        if let Some(crop) = self.crops.get_mut(id.0) {
            crop.quit_work();
            let row = crop.row;
            self.refresh_row(row);
        }
    }

    /// Recompute a row's aggregate state. A processed row drops its claim.
    pub fn refresh_row(&mut self, id: RowId) {
        let Some(row) = self.rows.get(id.0) else {
            return;
        };
        let processed = row
            .crops
            .iter()
            .all(|c| self.crops.get(c.0).is_some_and(Crop::is_processed));

        let row = &mut self.rows[id.0];
        row.processed = processed;
        if processed {
            if let Some(agent) = row.claim.take() {
                tracing::debug!("[Resources] {} processed, releasing claim of {}", id, agent);
            }
        }
    }

    /// Claim a row for `agent`. Fails if another agent holds it.
    pub fn claim_row(&mut self, id: RowId, agent: AgentId) -> bool {
        let Some(row) = self.rows.get_mut(id.0) else {
            return false;
        };
        match row.claim {
            Some(owner) if owner != agent => false,
            _ => {
                row.claim = Some(agent);
                true
            }
        }
    }

    /// Drop `agent`'s claim on a row, if it holds it.
    pub fn release_row(&mut self, id: RowId, agent: AgentId) {
        if let Some(row) = self.rows.get_mut(id.0) {
            if row.claim == Some(agent) {
                row.claim = None;
            }
        }
        self.refresh_row(id);
    }

    /// Drop every row claim held by `agent`.
    pub fn release_rows_of(&mut self, agent: AgentId) {
        for row in &mut self.rows {
            if row.claim == Some(agent) {
                row.claim = None;
            }
        }
    }

    /// Rows currently claimed by `agent`.
    pub fn rows_claimed_by(&self, agent: AgentId) -> Vec<RowId> {
        self.rows
            .iter()
            .filter(|r| r.claim == Some(agent))
            .map(|r| r.id)
            .collect()
    }

    /// Crops `agent` may be assigned next.
    ///
    /// Only the first and last unprocessed crop of a row are eligible. If
    /// the agent already holds an unfinished row it continues there;
    /// otherwise every unclaimed unfinished row is open to it.
    pub fn frontier_crops(&self, agent: AgentId) -> Vec<CropId> {
        let own: Vec<&CropRow> = self
            .rows
            .iter()
            .filter(|r| !r.processed && r.claim == Some(agent))
            .collect();
        let candidates: Vec<&CropRow> = if own.is_empty() {
            self.rows
                .iter()
                .filter(|r| !r.processed && r.claim.is_none())
                .collect()
        } else {
            own
        };

        let mut seen = BTreeSet::new();
        let mut frontier = Vec::new();
        for row in candidates {
            let open = |c: &&CropId| self.crops.get(c.0).is_some_and(|crop| !crop.is_processed());
            let first = row.crops.iter().find(open);
            let last = row.crops.iter().rev().find(open);
            for id in first.into_iter().chain(last) {
                if seen.insert(*id) {
                    frontier.push(*id);
                }
            }
        }
        frontier
    }

    /// True once every row is processed.
    pub fn is_field_processed(&self) -> bool {
        self.rows.iter().all(CropRow::is_processed)
    }

    /// Number of processed crops.
    pub fn processed_crops(&self) -> usize {
        self.crops.iter().filter(|c| c.is_processed()).count()
    }
}
