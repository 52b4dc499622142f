pub mod config;
pub mod dataset;
pub mod error;
pub mod export;
pub mod geometry;
pub mod hierarchy;
pub mod human;
pub mod logging;
pub mod model;
pub mod power;
pub mod progress;
pub mod render;
pub mod treemap;

pub use config::*;
pub use error::*;
pub use model::*;
pub use treemap::{Cell, Partitioner, Treemap, VoronoiTreemap};
