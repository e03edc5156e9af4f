//! Scenario description and generated crop-field layouts.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI};

use crate::config::ScenarioConfig;
use crate::core::{Point2D, Polygon, Pose2D};
use crate::error::{KshetraError, Result};

/// A charging station to place.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StationSpec {
    pub position: Point2D,
    /// Direction the waiting queue extends in
    pub queue_direction: Point2D,
}

/// An agent to spawn.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentSpec {
    pub pose: Pose2D,
    /// Initial state of charge, percent
    pub soc: f64,
}

/// Static geometry and initial population of a run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Outer boundary ring
    pub boundary: Vec<Point2D>,
    /// Obstacle rings, already padded
    pub obstacles: Vec<Vec<Point2D>>,
    /// Extra interior triangulation points
    pub seeds: Vec<Point2D>,
    /// Crop positions per row, from one end to the other
    pub rows: Vec<Vec<Point2D>>,
    pub stations: Vec<StationSpec>,
    pub agents: Vec<AgentSpec>,
}

impl Scenario {
    /// Reject resources and agents the simulation cannot represent.
    ///
    /// Geometry is checked separately when the navmesh is built.
    pub fn validate(&self) -> Result<()> {
        if let Some(i) = self.rows.iter().position(Vec::is_empty) {
            return Err(KshetraError::Scenario(format!("row {} has no crops", i)));
        }
        for (i, station) in self.stations.iter().enumerate() {
            if !station.position.is_finite() || station.queue_direction.length() < 1e-9 {
                return Err(KshetraError::Scenario(format!(
                    "station {} needs a finite position and a non-zero queue direction",
                    i
                )));
            }
        }
        for (i, agent) in self.agents.iter().enumerate() {
            if !(0.0..=100.0).contains(&agent.soc) {
                return Err(KshetraError::Scenario(format!(
                    "agent {} starts at {:.1}% charge",
                    i, agent.soc
                )));
            }
        }
        Ok(())
    }
}

/// Parameters of a generated crop field.
///
/// Rows are laid out along `field_angle`, crops within a row along
/// `field_angle + 90°`. A thin wall runs between neighbouring rows and
/// along both outer sides.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScenarioLayout {
    pub boundary: Vec<Point2D>,

    pub spawn_origin: Point2D,
    pub spawn_width: f64,
    pub spawn_height: f64,
    pub spawn_angle: f64,

    pub field_origin: Point2D,
    pub field_angle: f64,
    pub rows: usize,
    pub row_spacing: f64,
    pub crops_per_row: usize,
    pub crop_spacing: f64,

    pub wall_width: f64,
    /// How far walls reach past the first and last crop
    pub wall_extension: f64,
    pub obstacle_padding: f64,

    pub stations: Vec<StationSpec>,

    pub agents: usize,
    pub seed: u64,
    pub initial_soc_min: f64,
    pub initial_soc_max: f64,
}

impl Default for ScenarioLayout {
    fn default() -> Self {
        Self {
            boundary: vec![
                Point2D::new(0.0, 0.0),
                Point2D::new(20.0, 0.0),
                Point2D::new(20.0, 15.0),
                Point2D::new(0.0, 15.0),
            ],
            spawn_origin: Point2D::new(3.0, 4.0),
            spawn_width: 4.0,
            spawn_height: 1.0,
            spawn_angle: 0.0,
            field_origin: Point2D::new(3.0, 0.5),
            field_angle: 0.0,
            rows: 4,
            row_spacing: 0.5,
            crops_per_row: 3,
            crop_spacing: 0.3,
            wall_width: 0.08,
            wall_extension: 0.2,
            obstacle_padding: 0.05,
            stations: vec![
                StationSpec {
                    position: Point2D::new(1.0, 2.0),
                    queue_direction: Point2D::new(0.0, 1.0),
                },
                StationSpec {
                    position: Point2D::new(7.5, 1.0),
                    queue_direction: Point2D::new(0.0, 1.0),
                },
            ],
            agents: 4,
            seed: 42,
            initial_soc_min: 50.0,
            initial_soc_max: 70.0,
        }
    }
}

impl ScenarioLayout {
    /// Default field with population settings from `[scenario]`.
    pub fn from_config(config: &ScenarioConfig) -> Self {
        Self {
            agents: config.agents,
            seed: config.seed,
            initial_soc_min: config.initial_soc_min,
            initial_soc_max: config.initial_soc_max,
            ..Default::default()
        }
    }

    /// Crop positions of every row.
    pub fn crop_rows(&self) -> Vec<Vec<Point2D>> {
        let (along, across) = self.field_axes();
        (0..self.rows)
            .map(|r| {
                let row_origin = self.field_origin + along * (r as f64 * self.row_spacing);
                (0..self.crops_per_row)
                    .map(|c| row_origin + across * (c as f64 * self.crop_spacing))
                    .collect()
            })
            .collect()
    }

    /// Padded wall rings, one more than the number of rows.
    pub fn walls(&self) -> Vec<Polygon> {
        let (along, across) = self.field_axes();
        let row_length = self.crops_per_row.saturating_sub(1) as f64 * self.crop_spacing;
        let half_width = self.wall_width / 2.0;
        let half_length = row_length / 2.0 + self.wall_extension;

        (0..=self.rows)
            .map(|k| {
                let center = self.field_origin
                    + along * ((k as f64 - 0.5) * self.row_spacing)
                    + across * (row_length / 2.0);
                Polygon::new(vec![
                    center - along * half_width - across * half_length,
                    center + along * half_width - across * half_length,
                    center + along * half_width + across * half_length,
                    center - along * half_width + across * half_length,
                ])
                .inflate(self.obstacle_padding)
            })
            .collect()
    }

    /// Seeded spawn poses and charge levels.
    pub fn spawn_agents(&self) -> Vec<AgentSpec> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let along = Point2D::from_angle(self.spawn_angle);
        let across = Point2D::from_angle(self.spawn_angle + FRAC_PI_2);

        (0..self.agents)
            .map(|_| {
                let position = self.spawn_origin
                    + along * rng.random_range(0.0..=self.spawn_width)
                    + across * rng.random_range(0.0..=self.spawn_height);
                let heading = rng.random_range(-PI..PI);
                let soc = rng.random_range(self.initial_soc_min..=self.initial_soc_max);
                AgentSpec {
                    pose: Pose2D::at(position, heading),
                    soc,
                }
            })
            .collect()
    }

    pub fn build(&self) -> Scenario {
        Scenario {
            boundary: self.boundary.clone(),
            obstacles: self.walls().into_iter().map(Polygon::into_points).collect(),
            seeds: Vec::new(),
            rows: self.crop_rows(),
            stations: self.stations.clone(),
            agents: self.spawn_agents(),
        }
    }

    fn field_axes(&self) -> (Point2D, Point2D) {
        (
            Point2D::from_angle(self.field_angle),
            Point2D::from_angle(self.field_angle + FRAC_PI_2),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_field_shape() {
        let layout = ScenarioLayout::default();
        let rows = layout.crop_rows();
        assert_eq!(rows.len(), 4);
        assert!(rows.iter().all(|r| r.len() == 3));
        assert!(rows[1][2].approx_eq(&Point2D::new(3.5, 1.1), 1e-12));
    }

    #[test]
    fn test_walls_clear_of_crops() {
        let layout = ScenarioLayout::default();
        let walls = layout.walls();
        assert_eq!(walls.len(), 5);
        for crop in layout.crop_rows().iter().flatten() {
            assert!(walls.iter().all(|w| !w.contains(crop)));
        }
        // Padded wall width
        let xs: Vec<f64> = walls[0].points().iter().map(|p| p.x).collect();
        let width = xs.iter().cloned().fold(f64::MIN, f64::max) - xs.iter().cloned().fold(f64::MAX, f64::min);
        assert!((width - 0.18).abs() < 1e-9);
    }

    #[test]
    fn test_validate_rejects_bad_population() {
        let mut scenario = ScenarioLayout::default().build();
        assert!(scenario.validate().is_ok());

        scenario.agents[0].soc = 120.0;
        assert!(matches!(scenario.validate(), Err(KshetraError::Scenario(_))));

        let mut scenario = ScenarioLayout::default().build();
        scenario.stations[0].queue_direction = Point2D::ZERO;
        assert!(scenario.validate().is_err());
    }

    #[test]
    fn test_spawn_is_seeded() {
        let layout = ScenarioLayout::default();
        let a = layout.spawn_agents();
        let b = layout.spawn_agents();
        assert_eq!(a, b);
        for spec in &a {
            assert!((50.0..=70.0).contains(&spec.soc));
            assert!((3.0..=7.0).contains(&spec.pose.x));
            assert!((4.0..=5.0).contains(&spec.pose.y));
        }

        let other = ScenarioLayout {
            seed: 7,
            ..Default::default()
        };
        assert_ne!(other.spawn_agents(), a);
    }
}
