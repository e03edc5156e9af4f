//! Charging stations with FIFO waiting queues.

use std::collections::VecDeque;

use crate::core::Point2D;
use crate::ids::{AgentId, StationId};

/// A charging slot plus a queue of agents waiting in line behind it.
///
/// The agent at index 0 occupies the station itself; index `i` waits
/// `i * waiting_offset` metres along `queue_direction`.
#[derive(Clone, Debug, PartialEq)]
pub struct ChargingStation {
    pub id: StationId,
    pub position: Point2D,
    queue_direction: Point2D,
    waiting_offset: f64,
    queue: VecDeque<AgentId>,
}

impl ChargingStation {
    pub fn new(id: StationId, position: Point2D, queue_direction: Point2D, waiting_offset: f64) -> Self {
        Self {
            id,
            position,
            queue_direction: queue_direction.normalize(),
            waiting_offset,
            queue: VecDeque::new(),
        }
    }

    #[inline]
    pub fn queue_direction(&self) -> Point2D {
        self.queue_direction
    }

    /// Heading an agent holds while queued (facing the station).
    pub fn agent_heading(&self) -> f64 {
        (-self.queue_direction).angle()
    }

    pub fn waiting_position(&self, index: usize) -> Point2D {
        self.position + self.queue_direction * (index as f64 * self.waiting_offset)
    }

    pub fn queue_index(&self, agent: AgentId) -> Option<usize> {
        self.queue.iter().position(|&a| a == agent)
    }

    #[inline]
    pub fn is_head(&self, agent: AgentId) -> bool {
        self.queue.front() == Some(&agent)
    }

    #[inline]
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn queue(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.queue.iter().copied()
    }

    /// Join the queue (once) and return the agent's waiting position.
    pub fn request_charge(&mut self, agent: AgentId) -> Point2D {
        let index = match self.queue_index(agent) {
            Some(index) => index,
            None => {
                self.queue.push_back(agent);
                self.queue.len() - 1
            }
        };
        self.waiting_position(index)
    }

    /// Leave the queue.
    ///
    /// Returns the agents that moved up, with their new waiting positions.
    pub fn release_agent(&mut self, agent: AgentId) -> Vec<(AgentId, Point2D)> {
        let Some(index) = self.queue_index(agent) else {
            return Vec::new();
        };
        self.queue.remove(index);
        (index..self.queue.len())
            .map(|i| (self.queue[i], self.waiting_position(i)))
            .collect()
    }
}
