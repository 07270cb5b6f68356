//! wf-states: ambient inflow providers and point-data model chains.
//!
//! Contains:
//! - traits (`PointDataModel`, `States`, `PointDataModelList`)
//! - rows (`StateRow`, `UniformStates`, `StatesTable`)
//! - post (point post-processing: shear, power density)
//! - extended (`ExtendedStates`: a base provider plus a model chain)

pub mod extended;
pub mod post;
pub mod rows;
pub mod traits;

pub use extended::ExtendedStates;
pub use post::{PowerDensity, PowerLawShear};
pub use rows::{StateRow, StatesTable, UniformStates};
pub use traits::{PointDataModel, PointDataModelList, States};
