//! Simulation of a moving, rotating range sensor. A structured grid of rays is cast into a scene,
//! the closest hit of each ray is turned into an oriented footprint ellipse, and the footprints
//! are accumulated into a fixed-capacity ring buffer that a renderer can draw from.

pub mod accumulation;
pub mod config;
mod errors;
pub mod geom3;
pub mod io;
pub mod motion;
pub mod scene;
pub mod schedule;
pub mod sensors;
pub mod simulator;

pub use parry3d_f64::na;

pub use accumulation::{DirtyRange, DisplaySink, PointRingBuffer};
pub use config::ScanConfig;
pub use errors::LidarError;
pub use geom3::{Iso3, Matrix4, Point3, UnitQuat, UnitVec3, Vector3};
pub use motion::{CircularPath, MotionPolicy, SensorState, Stationary};
pub use scene::{Scene, SceneObject};
pub use schedule::{PulseIndicator, ScanScheduler, SchedulerState};
pub use sensors::{
    BeamParams, Hit, IntersectionProvider, LidarScanner, PointRecord, ProviderHit, SamplingGrid,
    ScanOutput,
};
pub use simulator::{FrameReport, LidarSimulator};

pub type Result<T> = std::result::Result<T, LidarError>;
