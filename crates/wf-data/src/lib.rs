//! wf-data: chunked data containers for the wake engine.
//!
//! Every container shares a leading state axis. Farm data is indexed
//! `(state, turbine)`, point data `(state, point)`, and wake deltas
//! `(state, target)` where a target is a point or a turbine rotor point.
//! Containers are built per chunk and carry nothing across chunks.

pub mod chunk;
pub mod deltas;
pub mod farm;
pub mod layout;
pub mod model;
pub mod point;
pub mod select;
pub mod table;

pub use chunk::{ChunkRange, split_range};
pub use deltas::WakeDeltas;
pub use farm::FarmData;
pub use layout::{Turbine, WindFarm};
pub use model::{ModelData, RotorPointData};
pub use point::PointData;
pub use select::{broadcast_points, check_per_state, selected_pairs, target_columns};
pub use table::{Coords, Field, Mask, VarTable, stack_cols, stack_rows};

pub use nalgebra::{DMatrix, Vector2, Vector3};
