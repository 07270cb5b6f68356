//! wf-core: stable foundation for the wake engine.
//!
//! Contains:
//! - error (shared error taxonomy)
//! - numeric (Real + tolerances + float helpers)
//! - ids (typed turbine and chunk indices)
//! - units (uom SI types + constructors)
//! - vars (the closed set of meteorological/farm variables)
//! - wind (wind vector geometry helpers)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod units;
pub mod vars;
pub mod wind;

// Re-exports: nice ergonomics for downstream crates
pub use error::{WfError, WfResult};
pub use ids::*;
pub use numeric::*;
pub use vars::Var;
pub use wind::{uv2wd, vector_mean, wd2uv};
