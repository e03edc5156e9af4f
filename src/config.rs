//! Configuration loading for Kshetra
//!
//! Every field has a serde default, so a partial TOML file (or none at all)
//! yields a complete [`SimConfig`].

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    #[serde(default)]
    pub robot: RobotConfig,
    #[serde(default)]
    pub tolerance: ToleranceConfig,
    #[serde(default)]
    pub power: PowerConfig,
    #[serde(default)]
    pub battery: BatteryConfig,
    #[serde(default)]
    pub crop: CropConfig,
    #[serde(default)]
    pub station: StationConfig,
    #[serde(default)]
    pub tasks: TaskConfig,
    #[serde(default)]
    pub navmesh: NavmeshConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub scenario: ScenarioConfig,
}

/// Differential-drive robot parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RobotConfig {
    /// Maximum forward wheel velocity in m/s (default: 10 km/h)
    #[serde(default = "default_max_forward_velocity")]
    pub max_forward_velocity: f64,

    /// Angular velocity limit in rad/s (default: 3.0)
    #[serde(default = "default_max_angular_velocity")]
    pub max_angular_velocity: f64,

    /// Distance between wheels in meters (default: 0.2)
    #[serde(default = "default_wheel_base")]
    pub wheel_base: f64,

    /// Forward command per meter of remaining distance (default: 0.5)
    #[serde(default = "default_speed_gain")]
    pub speed_gain: f64,

    /// Turn command scale applied to heading error / π (default: 1.0)
    #[serde(default = "default_turn_gain")]
    pub turn_gain: f64,

    /// Motor commands below this magnitude are zeroed (default: 1e-4)
    #[serde(default = "default_command_deadband")]
    pub command_deadband: f64,
}

/// Arrival tolerances
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToleranceConfig {
    /// Position tolerance in meters (default: 0.05)
    #[serde(default = "default_distance_tolerance")]
    pub distance: f64,

    /// Heading tolerance in degrees (default: 2.0)
    #[serde(default = "default_angle_tolerance_deg")]
    pub angle_deg: f64,
}

impl ToleranceConfig {
    /// Heading tolerance in radians.
    pub fn angle_rad(&self) -> f64 {
        self.angle_deg.to_radians()
    }
}

/// Power draw per agent state, in watts
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PowerConfig {
    #[serde(default = "default_idle_w")]
    pub idle_w: f64,

    /// Draw at maximum forward velocity; scaled by |v| / v_max
    #[serde(default = "default_travel_w")]
    pub travel_w: f64,

    #[serde(default = "default_work_scan_w")]
    pub work_scan_w: f64,

    #[serde(default = "default_work_process_w")]
    pub work_process_w: f64,
}

/// Battery and charge-curve parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BatteryConfig {
    /// Capacity in watt-hours (default: 423)
    #[serde(default = "default_capacity_wh")]
    pub capacity_wh: f64,

    /// Seconds from empty to full on the winter curve (default: 3 h)
    #[serde(default = "default_winter_full_charge_s")]
    pub winter_full_charge_s: f64,

    /// Seconds from empty to full on the summer curve (default: 2 h)
    #[serde(default = "default_summer_full_charge_s")]
    pub summer_full_charge_s: f64,
}

/// Crop work durations, counted in ticks
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CropConfig {
    #[serde(default = "default_scan_ticks")]
    pub scan_ticks: u32,

    #[serde(default = "default_process_ticks")]
    pub process_ticks: u32,
}

/// Charging station queue layout
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StationConfig {
    /// Spacing between queued agents in meters (default: 1.0)
    #[serde(default = "default_waiting_offset")]
    pub waiting_offset: f64,
}

/// Which agents get sent to charge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargingPolicyKind {
    /// Every agent below `critical_soc`
    Threshold,
    /// Agents below `low_soc` until stations saturate, then below `capacity_critical_soc`
    CapacityAware,
}

/// How a station is chosen for an agent that must charge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StationSelection {
    First,
    Nearest,
    QueueWeighted,
}

/// Task allocation policy
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaskConfig {
    #[serde(default = "default_charging_policy")]
    pub charging_policy: ChargingPolicyKind,

    /// Threshold policy: charge below this SoC (default: 60%)
    #[serde(default = "default_critical_soc")]
    pub critical_soc: f64,

    /// Capacity-aware policy: charge below this SoC while stations have room
    #[serde(default = "default_low_soc")]
    pub low_soc: f64,

    /// Capacity-aware policy: charge below this SoC once stations are full
    #[serde(default = "default_capacity_critical_soc")]
    pub capacity_critical_soc: f64,

    /// Cap on agents bound for stations (default: number of stations)
    #[serde(default)]
    pub max_charging_agents: Option<usize>,

    #[serde(default = "default_station_selection")]
    pub station_selection: StationSelection,

    /// Queue-weighted selection: meters of travel one queued agent is worth
    #[serde(default = "default_queue_weight")]
    pub queue_weight: f64,
}

/// Navmesh build and path query parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NavmeshConfig {
    /// Merge triangles into larger convex cells (default: true)
    #[serde(default = "default_merge_cells")]
    pub merge_cells: bool,

    /// Maximum committed funnel points per path (default: 30)
    #[serde(default = "default_max_path_points")]
    pub max_path_points: usize,

    /// Grid that triangle vertices are rounded to (default: 1e-8)
    #[serde(default = "default_coordinate_precision")]
    pub coordinate_precision: f64,

    /// Allowed merge area deviation (default: 1e-6)
    #[serde(default = "default_area_epsilon")]
    pub area_epsilon: f64,

    /// Squared distance below which two points are equal (default: 1e-6)
    #[serde(default = "default_point_epsilon")]
    pub point_epsilon: f64,

    /// Points inserted on each long obstacle edge (default: 2)
    #[serde(default = "default_obstacle_densify")]
    pub obstacle_densify: usize,
}

/// Tick and clock settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Simulated seconds per tick (default: 0.1)
    #[serde(default = "default_dt")]
    pub dt: f64,

    /// Calendar start, `%Y-%m-%dT%H:%M:%S`
    #[serde(default = "default_start_date")]
    pub start_date: String,
}

/// Generated scenario parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    #[serde(default = "default_agent_count")]
    pub agents: usize,

    /// Seed for spawn poses and initial charge
    #[serde(default = "default_seed")]
    pub seed: u64,

    #[serde(default = "default_initial_soc_min")]
    pub initial_soc_min: f64,

    #[serde(default = "default_initial_soc_max")]
    pub initial_soc_max: f64,
}

macro_rules! impl_default {
    ($ty:ident { $($field:ident: $default:ident),* $(,)? }) => {
        impl Default for $ty {
            fn default() -> Self {
                Self { $($field: $default()),* }
            }
        }
    };
}

impl_default!(RobotConfig {
    max_forward_velocity: default_max_forward_velocity,
    max_angular_velocity: default_max_angular_velocity,
    wheel_base: default_wheel_base,
    speed_gain: default_speed_gain,
    turn_gain: default_turn_gain,
    command_deadband: default_command_deadband,
});
impl_default!(ToleranceConfig {
    distance: default_distance_tolerance,
    angle_deg: default_angle_tolerance_deg,
});
impl_default!(PowerConfig {
    idle_w: default_idle_w,
    travel_w: default_travel_w,
    work_scan_w: default_work_scan_w,
    work_process_w: default_work_process_w,
});
impl_default!(BatteryConfig {
    capacity_wh: default_capacity_wh,
    winter_full_charge_s: default_winter_full_charge_s,
    summer_full_charge_s: default_summer_full_charge_s,
});
impl_default!(CropConfig {
    scan_ticks: default_scan_ticks,
    process_ticks: default_process_ticks,
});
impl_default!(StationConfig {
    waiting_offset: default_waiting_offset,
});
impl_default!(TaskConfig {
    charging_policy: default_charging_policy,
    critical_soc: default_critical_soc,
    low_soc: default_low_soc,
    capacity_critical_soc: default_capacity_critical_soc,
    max_charging_agents: default_none,
    station_selection: default_station_selection,
    queue_weight: default_queue_weight,
});
impl_default!(NavmeshConfig {
    merge_cells: default_merge_cells,
    max_path_points: default_max_path_points,
    coordinate_precision: default_coordinate_precision,
    area_epsilon: default_area_epsilon,
    point_epsilon: default_point_epsilon,
    obstacle_densify: default_obstacle_densify,
});
impl_default!(SimulationConfig {
    dt: default_dt,
    start_date: default_start_date,
});
impl_default!(ScenarioConfig {
    agents: default_agent_count,
    seed: default_seed,
    initial_soc_min: default_initial_soc_min,
    initial_soc_max: default_initial_soc_max,
});

// Default value functions
fn default_none() -> Option<usize> {
    None
}
fn default_max_forward_velocity() -> f64 {
    10.0 / 3.6
}
fn default_max_angular_velocity() -> f64 {
    3.0
}
fn default_wheel_base() -> f64 {
    0.2
}
fn default_speed_gain() -> f64 {
    0.5
}
fn default_turn_gain() -> f64 {
    1.0
}
fn default_command_deadband() -> f64 {
    1e-4
}
fn default_distance_tolerance() -> f64 {
    0.05
}
fn default_angle_tolerance_deg() -> f64 {
    2.0
}

// Power defaults
fn default_idle_w() -> f64 {
    10.0
}
fn default_travel_w() -> f64 {
    700.0
}
fn default_work_scan_w() -> f64 {
    100.0
}
fn default_work_process_w() -> f64 {
    400.0
}
fn default_capacity_wh() -> f64 {
    423.0
}
fn default_winter_full_charge_s() -> f64 {
    3.0 * 3600.0
}
fn default_summer_full_charge_s() -> f64 {
    2.0 * 3600.0
}

fn default_scan_ticks() -> u32 {
    60
}
fn default_process_ticks() -> u32 {
    120
}
fn default_waiting_offset() -> f64 {
    1.0
}

// Task allocation defaults
fn default_charging_policy() -> ChargingPolicyKind {
    ChargingPolicyKind::CapacityAware
}
fn default_critical_soc() -> f64 {
    60.0
}
fn default_low_soc() -> f64 {
    60.0
}
fn default_capacity_critical_soc() -> f64 {
    45.0
}
fn default_station_selection() -> StationSelection {
    StationSelection::QueueWeighted
}
fn default_queue_weight() -> f64 {
    4.0
}

// Navmesh defaults
fn default_merge_cells() -> bool {
    true
}
fn default_max_path_points() -> usize {
    30
}
fn default_coordinate_precision() -> f64 {
    1e-8
}
fn default_area_epsilon() -> f64 {
    1e-6
}
fn default_point_epsilon() -> f64 {
    1e-6
}
fn default_obstacle_densify() -> usize {
    2
}

fn default_dt() -> f64 {
    0.1
}
fn default_start_date() -> String {
    "2025-01-01T00:00:00".to_string()
}
fn default_agent_count() -> usize {
    4
}
fn default_seed() -> u64 {
    42
}
fn default_initial_soc_min() -> f64 {
    50.0
}
fn default_initial_soc_max() -> f64 {
    70.0
}

impl SimConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to TOML text
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject values that make the simulation meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("robot.max_forward_velocity", self.robot.max_forward_velocity),
            ("robot.max_angular_velocity", self.robot.max_angular_velocity),
            ("robot.wheel_base", self.robot.wheel_base),
            ("robot.speed_gain", self.robot.speed_gain),
            ("robot.turn_gain", self.robot.turn_gain),
            ("tolerance.distance", self.tolerance.distance),
            ("tolerance.angle_deg", self.tolerance.angle_deg),
            ("battery.capacity_wh", self.battery.capacity_wh),
            ("battery.winter_full_charge_s", self.battery.winter_full_charge_s),
            ("battery.summer_full_charge_s", self.battery.summer_full_charge_s),
            ("station.waiting_offset", self.station.waiting_offset),
            ("navmesh.coordinate_precision", self.navmesh.coordinate_precision),
            ("simulation.dt", self.simulation.dt),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be positive, got {}", value),
                });
            }
        }

        if self.crop.scan_ticks == 0 || self.crop.process_ticks == 0 {
            return Err(ConfigError::Invalid {
                field: "crop",
                reason: "work durations must be at least one tick".to_string(),
            });
        }
        if self.navmesh.max_path_points == 0 {
            return Err(ConfigError::Invalid {
                field: "navmesh.max_path_points",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.scenario.initial_soc_min > self.scenario.initial_soc_max {
            return Err(ConfigError::Invalid {
                field: "scenario.initial_soc_min",
                reason: "exceeds initial_soc_max".to_string(),
            });
        }
        if chrono::NaiveDateTime::parse_from_str(
            &self.simulation.start_date,
            crate::energy::DATE_FORMAT,
        )
        .is_err()
        {
            return Err(ConfigError::Invalid {
                field: "simulation.start_date",
                reason: format!("expected {}", crate::energy::DATE_FORMAT),
            });
        }
        Ok(())
    }
}
