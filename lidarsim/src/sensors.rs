//! This module contains the scan pipeline of the simulated range sensor: generating the ray
//! grid, resolving the nearest hit of each ray, and sizing the footprint of each hit.

mod footprint;
mod lidar;
mod raycast;
mod sampling;

pub use footprint::{
    BeamParams, DEGENERATE_TANGENT_SQ, FOOTPRINT_DEPTH, MIN_INCIDENCE_COS, PointRecord,
    estimate_footprint,
};
pub use lidar::{LidarScanner, ScanOutput};
pub use raycast::{Hit, IntersectionProvider, ProviderHit, cast_nearest};
pub use sampling::{SamplingGrid, spherical_direction};
