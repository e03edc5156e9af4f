//! Arena holding the navmesh, agents and shared resources.

use std::sync::Arc;

use crate::agent::Agent;
use crate::config::SimConfig;
use crate::core::densify;
use crate::energy::ChargeProfile;
use crate::error::Result;
use crate::ids::AgentId;
use crate::navmesh::NavMesh;
use crate::resources::ResourceRegistry;
use crate::scenario::Scenario;

/// Everything a tick mutates. Agents are indexed by [`AgentId`].
#[derive(Clone, Debug)]
pub struct World {
    pub navmesh: NavMesh,
    pub agents: Vec<Agent>,
    pub registry: ResourceRegistry,
}

impl World {
    /// Build the navmesh, resources and agents of a scenario.
    pub fn new(scenario: &Scenario, config: &SimConfig) -> Result<World> {
        scenario.validate()?;
        let holes: Vec<_> = scenario
            .obstacles
            .iter()
            .map(|ring| densify(ring, config.navmesh.obstacle_densify))
            .collect();
        let navmesh = NavMesh::build(&scenario.boundary, &holes, &scenario.seeds, &config.navmesh)?;

        let mut registry = ResourceRegistry::new();
        for row in &scenario.rows {
            registry.add_row(row, config.crop.scan_ticks, config.crop.process_ticks);
        }
        for station in &scenario.stations {
            registry.add_station(station.position, station.queue_direction, config.station.waiting_offset);
        }

        let profile = Arc::new(ChargeProfile::generated(
            config.battery.capacity_wh,
            config.battery.winter_full_charge_s,
            config.battery.summer_full_charge_s,
        )?);
        let agents = scenario
            .agents
            .iter()
            .enumerate()
            .map(|(i, spec)| Agent::new(AgentId(i), spec.pose, spec.soc, config, Arc::clone(&profile)))
            .collect::<Vec<_>>();

        tracing::info!(
            "[World] {} agents, {} rows / {} crops, {} stations",
            agents.len(),
            registry.rows().len(),
            registry.crops().len(),
            registry.stations().len()
        );

        Ok(World {
            navmesh,
            agents,
            registry,
        })
    }

    #[inline]
    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id.index())
    }

    #[inline]
    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.get_mut(id.index())
    }
}
