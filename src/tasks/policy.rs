//! Pluggable charging and station selection policies.

use std::fmt;

use crate::config::{ChargingPolicyKind, StationSelection, TaskConfig};
use crate::core::Point2D;
use crate::ids::{AgentId, StationId};
use crate::resources::ResourceRegistry;

/// Charge level of an agent the policy may send to a station.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChargeCandidate {
    pub agent: AgentId,
    pub soc: f64,
}

/// Decides which agents go charging this tick.
pub trait ChargingPolicy: fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    /// Pick agents from `candidates` (in order). `station_bound` counts
    /// agents already holding a station task.
    fn select(
        &self,
        candidates: &[ChargeCandidate],
        station_bound: usize,
        registry: &ResourceRegistry,
    ) -> Vec<AgentId>;
}

/// Send every agent below a fixed charge level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThresholdPolicy {
    pub critical_soc: f64,
}

impl ChargingPolicy for ThresholdPolicy {
    fn name(&self) -> &'static str {
        "threshold"
    }

    fn select(&self, candidates: &[ChargeCandidate], _station_bound: usize, _registry: &ResourceRegistry) -> Vec<AgentId> {
        candidates
            .iter()
            .filter(|c| c.soc < self.critical_soc)
            .map(|c| c.agent)
            .collect()
    }
}

/// Send agents below `low_soc` while fewer than the capacity are
/// station-bound; beyond that only agents below `critical_soc`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CapacityAwarePolicy {
    pub low_soc: f64,
    pub critical_soc: f64,
    /// Defaults to the number of stations
    pub max_agents: Option<usize>,
}

impl ChargingPolicy for CapacityAwarePolicy {
    fn name(&self) -> &'static str {
        "capacity_aware"
    }

    fn select(&self, candidates: &[ChargeCandidate], station_bound: usize, registry: &ResourceRegistry) -> Vec<AgentId> {
        let capacity = self.max_agents.unwrap_or(registry.stations().len());
        let mut bound = station_bound;
        let mut selected = Vec::new();
        for c in candidates {
            let send = (c.soc < self.low_soc && bound < capacity) || c.soc < self.critical_soc;
            if send {
                bound += 1;
                selected.push(c.agent);
            }
        }
        selected
    }
}

/// Picks the station an agent should queue at.
pub trait StationSelector: fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    fn select(&self, position: Point2D, registry: &ResourceRegistry) -> Option<StationId>;
}

/// Always the first station.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FirstStation;

impl StationSelector for FirstStation {
    fn name(&self) -> &'static str {
        "first"
    }

    fn select(&self, _position: Point2D, registry: &ResourceRegistry) -> Option<StationId> {
        registry.stations().first().map(|s| s.id)
    }
}

/// Closest station by straight-line distance.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NearestStation;

impl StationSelector for NearestStation {
    fn name(&self) -> &'static str {
        "nearest"
    }

    fn select(&self, position: Point2D, registry: &ResourceRegistry) -> Option<StationId> {
        registry
            .stations()
            .iter()
            .min_by(|a, b| {
                a.position
                    .distance(&position)
                    .total_cmp(&b.position.distance(&position))
            })
            .map(|s| s.id)
    }
}

/// Minimum of `distance + weight * queue_length`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QueueWeighted {
    pub weight: f64,
}

impl QueueWeighted {
    fn score(&self, position: Point2D, station: &crate::resources::ChargingStation) -> f64 {
        station.position.distance(&position) + self.weight * station.queue_len() as f64
    }
}

impl StationSelector for QueueWeighted {
    fn name(&self) -> &'static str {
        "queue_weighted"
    }

    fn select(&self, position: Point2D, registry: &ResourceRegistry) -> Option<StationId> {
        registry
            .stations()
            .iter()
            .min_by(|a, b| self.score(position, a).total_cmp(&self.score(position, b)))
            .map(|s| s.id)
    }
}

/// Charging policy configured in `[tasks]`.
pub fn charging_policy_from_config(config: &TaskConfig) -> Box<dyn ChargingPolicy> {
    match config.charging_policy {
        ChargingPolicyKind::Threshold => Box::new(ThresholdPolicy {
            critical_soc: config.critical_soc,
        }),
        ChargingPolicyKind::CapacityAware => Box::new(CapacityAwarePolicy {
            low_soc: config.low_soc,
            critical_soc: config.capacity_critical_soc,
            max_agents: config.max_charging_agents,
        }),
    }
}

/// Station selector configured in `[tasks]`.
pub fn station_selector_from_config(config: &TaskConfig) -> Box<dyn StationSelector> {
    match config.station_selection {
        StationSelection::First => Box::new(FirstStation),
        StationSelection::Nearest => Box::new(NearestStation),
        StationSelection::QueueWeighted => Box::new(QueueWeighted {
            weight: config.queue_weight,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ResourceRegistry {
        let mut registry = ResourceRegistry::new();
        registry.add_station(Point2D::new(0.0, 0.0), Point2D::new(0.0, 1.0), 1.0);
        registry.add_station(Point2D::new(10.0, 0.0), Point2D::new(0.0, 1.0), 1.0);
        registry
    }

    fn candidates(socs: &[f64]) -> Vec<ChargeCandidate> {
        socs.iter()
            .enumerate()
            .map(|(i, &soc)| ChargeCandidate { agent: AgentId(i), soc })
            .collect()
    }

    #[test]
    fn test_threshold() {
        let policy = ThresholdPolicy { critical_soc: 60.0 };
        let picked = policy.select(&candidates(&[70.0, 59.0, 10.0, 60.0]), 0, &registry());
        assert_eq!(picked, vec![AgentId(1), AgentId(2)]);
    }

    #[test]
    fn test_capacity_aware_escalates() {
        let policy = CapacityAwarePolicy {
            low_soc: 60.0,
            critical_soc: 45.0,
            max_agents: None,
        };
        // Two stations, one already bound: only one low agent fits, critical ones always go
        let picked = policy.select(&candidates(&[55.0, 50.0, 40.0, 80.0]), 1, &registry());
        assert_eq!(picked, vec![AgentId(0), AgentId(2)]);
    }

    #[test]
    fn test_selectors() {
        let mut registry = registry();
        let near_second = Point2D::new(8.0, 0.0);
        assert_eq!(FirstStation.select(near_second, &registry), Some(StationId(0)));
        assert_eq!(NearestStation.select(near_second, &registry), Some(StationId(1)));

        let weighted = QueueWeighted { weight: 4.0 };
        assert_eq!(weighted.select(near_second, &registry), Some(StationId(1)));

        // Two agents queued at the near station outweigh the 6 m detour
        let station = registry.station_mut(StationId(1)).unwrap();
        station.request_charge(AgentId(5));
        station.request_charge(AgentId(6));
        assert_eq!(weighted.select(near_second, &registry), Some(StationId(0)));
    }

    #[test]
    fn test_no_stations() {
        let empty = ResourceRegistry::new();
        assert_eq!(QueueWeighted { weight: 4.0 }.select(Point2D::ZERO, &empty), None);
    }
}
