//! Estimator configuration, persisted as YAML.

use std::fs::File;
use std::io::prelude::*;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::traversal::TraversalOrder;

pub const DEFAULT_LEAF_SIZE: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraversalMode {
    /// Dual-tree, most promising child pair first.
    DepthFirst,
    /// Dual-tree, level by level.
    BreadthFirst,
    /// One reference-tree walk per query point.
    SingleTree,
    /// Every query/reference pair, no tree traversal at all.
    Naive,
}

impl TraversalMode {

    /// Order used by the dual-tree traverser, if this mode uses one.
    pub fn dual_tree_order(&self) -> Option<TraversalOrder> {
        match self {
            TraversalMode::DepthFirst => Some(TraversalOrder::DepthFirst),
            TraversalMode::BreadthFirst => Some(TraversalOrder::BreadthFirst),
            _ => None,
        }
    }
}

impl std::str::FromStr for TraversalMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "depth_first" | "dfs" => Ok(TraversalMode::DepthFirst),
            "breadth_first" | "bfs" => Ok(TraversalMode::BreadthFirst),
            "single_tree" => Ok(TraversalMode::SingleTree),
            "naive" => Ok(TraversalMode::Naive),
            _ => Err(Error::Configuration(format!("unknown traversal mode: {}", s))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KernelType {
    Gaussian,
    Epanechnikov,
    Triangular,
    Spherical,
    Laplacian,
}

impl std::str::FromStr for KernelType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gaussian" => Ok(KernelType::Gaussian),
            "epanechnikov" => Ok(KernelType::Epanechnikov),
            "triangular" => Ok(KernelType::Triangular),
            "spherical" => Ok(KernelType::Spherical),
            "laplacian" => Ok(KernelType::Laplacian),
            _ => Err(Error::Configuration(format!("unknown kernel: {}", s))),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct KdeConfig {
    pub kernel: KernelType,
    pub bandwidth: f64,
    pub rel_error: f64,
    pub abs_error: f64,
    pub mode: TraversalMode,
    pub leaf_size: usize,
}

impl Default for KdeConfig {

    fn default() -> Self {
        return Self {
            kernel: KernelType::Gaussian,
            bandwidth: 1.0,
            rel_error: 0.05,
            abs_error: 0.0,
            mode: TraversalMode::DepthFirst,
            leaf_size: DEFAULT_LEAF_SIZE,
        }
    }
}

impl KdeConfig {

    pub fn from_file(filename: &str) -> Result<Self, Error> {

        let serialized = std::fs::read_to_string(filename)?;
        let deserialized: Self = serde_yaml::from_str(&serialized)?;

        return Ok(deserialized);
    }

    pub fn to_file(&self, filename: &str) -> Result<(), Error> {

        let serialized = serde_yaml::to_string(&self)?;
        let mut file = File::create(filename)?;

        file.write_all(serialized.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_round_trips_through_a_file() {

        let mut config = KdeConfig::default();
        config.kernel = KernelType::Epanechnikov;
        config.mode = TraversalMode::BreadthFirst;
        config.abs_error = 0.01;

        let path = std::env::temp_dir().join(format!("kde_config_{}.yaml", std::process::id()));
        let filename = path.to_string_lossy().to_string();

        config.to_file(&filename).unwrap();
        let read = KdeConfig::from_file(&filename).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(read, config);
    }

    #[test]
    fn yaml_uses_snake_case_names() {

        let yaml = "kernel: laplacian\nbandwidth: 0.5\nrel_error: 0.0\nabs_error: 0.1\nmode: single_tree\nleaf_size: 8\n";
        let config: KdeConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.kernel, KernelType::Laplacian);
        assert_eq!(config.mode, TraversalMode::SingleTree);
        assert_eq!(config.leaf_size, 8);
    }

    #[test]
    fn missing_file_is_an_io_error() {

        let result = KdeConfig::from_file("/nonexistent/kde/config.yaml");
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn parse_names() {

        assert_eq!("bfs".parse::<TraversalMode>().unwrap(), TraversalMode::BreadthFirst);
        assert_eq!("gaussian".parse::<KernelType>().unwrap(), KernelType::Gaussian);
        assert!("sideways".parse::<TraversalMode>().is_err());
        assert_eq!(TraversalMode::Naive.dual_tree_order(), None);
    }
}
