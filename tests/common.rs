//! Shared fixtures for integration tests.

#![allow(dead_code)]

use kshetra::config::{ChargingPolicyKind, SimConfig};
use kshetra::core::{Point2D, Pose2D};
use kshetra::scenario::{AgentSpec, Scenario, StationSpec};
use kshetra::{AgentId, Simulation};

/// Counter-clockwise axis-aligned rectangle ring.
pub fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<Point2D> {
    vec![
        Point2D::new(x0, y0),
        Point2D::new(x1, y0),
        Point2D::new(x1, y1),
        Point2D::new(x0, y1),
    ]
}

/// Open 10 x 10 square with no obstacles, crops, stations or agents.
pub fn empty_square() -> Scenario {
    Scenario {
        boundary: rect(0.0, 0.0, 10.0, 10.0),
        ..Default::default()
    }
}

pub fn agent_at(x: f64, y: f64, soc: f64) -> AgentSpec {
    AgentSpec {
        pose: Pose2D::new(x, y, 0.0),
        soc,
    }
}

pub fn station_at(x: f64, y: f64) -> StationSpec {
    StationSpec {
        position: Point2D::new(x, y),
        queue_direction: Point2D::new(0.0, 1.0),
    }
}

/// Config where nobody is ever sent to charge unless below `critical_soc`.
pub fn threshold_config(critical_soc: f64) -> SimConfig {
    let mut config = SimConfig::default();
    config.tasks.charging_policy = ChargingPolicyKind::Threshold;
    config.tasks.critical_soc = critical_soc;
    config
}

/// Agents whose current task targets `station`.
pub fn agents_bound_for(sim: &Simulation, station: kshetra::StationId) -> Vec<AgentId> {
    sim.world()
        .agents
        .iter()
        .filter(|a| a.task().and_then(|t| t.target.station()) == Some(station))
        .map(|a| a.id)
        .collect()
}

/// Panic if any shared-resource invariant is broken.
pub fn assert_resource_invariants(sim: &Simulation) {
    let world = sim.world();

    for row in world.registry.rows() {
        let working: Vec<AgentId> = world
            .agents
            .iter()
            .filter(|a| {
                a.task()
                    .and_then(|t| t.target.crop())
                    .and_then(|c| world.registry.crop(c))
                    .is_some_and(|c| c.row == row.id)
            })
            .map(|a| a.id)
            .collect();
        assert!(working.len() <= 1, "{} targeted by {:?}", row.id, working);
        if let Some(agent) = working.first() {
            if !row.is_processed() {
                assert_eq!(row.claim(), Some(*agent), "{} claim out of sync", row.id);
            }
        }
    }

    for station in world.registry.stations() {
        let bound = agents_bound_for(sim, station.id);
        assert_eq!(bound.len(), station.queue_len(), "{} queue out of sync", station.id);
        for agent in bound {
            assert!(station.queue_index(agent).is_some());
        }
    }

    for agent in &world.agents {
        let battery = agent.battery();
        assert!(battery.energy_wh() >= 0.0);
        assert!(battery.energy_wh() <= battery.capacity_wh());
    }
}
