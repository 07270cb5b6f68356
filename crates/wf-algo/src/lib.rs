//! wf-algo: the wake calculation drivers.
//!
//! Contains:
//! - farm_wakes (turbine-target loop over the downwind order)
//! - point_wakes (the same loop for arbitrary evaluation points)
//! - downwind (`Downwind`: chunked ambient pass, farm and point calculations)
//! - config (chunking options)

pub mod config;
pub mod downwind;
pub mod farm_wakes;
pub mod point_wakes;

pub use config::AlgoConfig;
pub use downwind::{Downwind, DownwindBuilder};
pub use farm_wakes::FarmWakesCalculation;
pub use point_wakes::PointWakesCalculation;
