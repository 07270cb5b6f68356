//! wf-models: pluggable model contracts and the concrete models of the wake engine.
//!
//! Contains:
//! - traits (wake frame, wake model, superposition, rotor, partial wakes, turbine type)
//! - superposition (speed and turbulence combination rules)
//! - wake (distance-sliced wake models and the sliced evaluation helpers)
//! - rotor (rotor point placement and aggregation)
//! - partial (partial-wakes strategies)
//! - wake_frame / order (downwind geometry)
//! - turbine (tabulated power/thrust curves)
//!
//! Models hold configuration only and are shared between chunks through
//! `Arc`; per-chunk scratch goes into [`wf_data::ModelData`].

pub mod order;
pub mod partial;
pub mod rotor;
pub mod superposition;
pub mod traits;
pub mod turbine;
pub mod wake;
pub mod wake_frame;

pub use order::downwind_order;
pub use partial::{PartialDistSliced, RotorPoints};
pub use rotor::{CentreRotor, GridRotor};
pub use superposition::{
    SuperpositionTable, TiLinear, TiMax, TiQuadratic, WsLinear, WsMax, WsQuadratic,
};
pub use traits::{
    DistSlicedWakeModel, PartialWakesModel, RotorModel, SlicedDeltas, Superposition, TurbineType,
    WakeContext, WakeFrame, WakeModel, require_dist_sliced,
};
pub use turbine::PCtCurve;
pub use wake::{Bastankhah2014, CrespoHernandez, Jensen, LinearDecay};
pub use wake_frame::RotorWd;
