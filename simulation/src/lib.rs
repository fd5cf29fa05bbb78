//! Simulation framework for the fee recycler
//!
//! Provides:
//! - An in-memory reference curve engine with flash-accounted custody
//! - TOML scenario files
//! - A scenario runner producing JSON-serializable reports

pub mod config;
pub mod curve_engine;
pub mod error;
pub mod scenario_runner;

pub use config::{create_example_config, example_config, ScenarioConfig, TradeConfig};
pub use curve_engine::{InMemoryCurve, PoolState, SwapOutcome};
pub use error::{SimulationError, SimulationResult};
pub use scenario_runner::{ScenarioReport, ScenarioRunner, TradeReport};
