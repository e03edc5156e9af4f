//! Error types for Kshetra

use thiserror::Error;

use crate::core::Point2D;
use crate::ids::{AgentId, RowId};

/// Fatal problems with navmesh input geometry or the mesh derived from it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("{what} has {count} vertices, at least 3 required")]
    TooFewVertices { what: &'static str, count: usize },

    #[error("{what} contains a non-finite coordinate")]
    NonFinite { what: &'static str },

    #[error("{what} has zero area")]
    ZeroArea { what: &'static str },

    #[error("constraint edge ({from:?} -> {to:?}) intersects another constraint")]
    SelfIntersection { from: Point2D, to: Point2D },

    #[error("point {point:?} cannot be inserted into the triangulation: {reason}")]
    Unrepresentable { point: Point2D, reason: String },

    #[error("triangulation produced no traversable cells")]
    EmptyMesh,

    #[error("merge of cells {a} and {b} changed area: {merged:.9} != {expected:.9}")]
    MergeAreaMismatch {
        a: usize,
        b: usize,
        merged: f64,
        expected: f64,
    },
}

impl GeometryError {
    /// Short error code for logging.
    pub fn code(&self) -> &'static str {
        match self {
            Self::TooFewVertices { .. } => "TOO_FEW_VERTICES",
            Self::NonFinite { .. } => "NON_FINITE",
            Self::ZeroArea { .. } => "ZERO_AREA",
            Self::SelfIntersection { .. } => "SELF_INTERSECTION",
            Self::Unrepresentable { .. } => "UNREPRESENTABLE",
            Self::EmptyMesh => "EMPTY_MESH",
            Self::MergeAreaMismatch { .. } => "MERGE_AREA_MISMATCH",
        }
    }
}

/// Recoverable path query failure.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathError {
    #[error("no path between cell {from_cell} and cell {to_cell}")]
    NoPath { from_cell: usize, to_cell: usize },
}

/// Battery curve data defects. Always fatal.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BatteryError {
    #[error("energy {energy_wh:.3} Wh outside curve range [{min_wh:.3}, {max_wh:.3}]")]
    EnergyOutOfRange {
        energy_wh: f64,
        min_wh: f64,
        max_wh: f64,
    },

    #[error("invalid charge curve: {0}")]
    InvalidCurve(String),
}

/// Rejected task assignments.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskError {
    #[error("unknown agent {0}")]
    UnknownAgent(AgentId),

    #[error("task targets unknown {0}")]
    UnknownTarget(&'static str),

    #[error("{row} is claimed by {owner}")]
    RowClaimed { row: RowId, owner: AgentId },
}

/// Configuration loading and validation errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config value {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Kshetra error type
#[derive(Error, Debug)]
pub enum KshetraError {
    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),

    #[error("Path error: {0}")]
    Path(#[from] PathError),

    #[error("Battery error: {0}")]
    Battery(#[from] BatteryError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Task error: {0}")]
    Task(#[from] TaskError),

    #[error("Scenario error: {0}")]
    Scenario(String),
}

pub type Result<T> = std::result::Result<T, KshetraError>;
