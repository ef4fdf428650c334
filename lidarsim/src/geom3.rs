//! Aliases for the nalgebra types used throughout the crate. The world is Y-up.

pub type Point3 = parry3d_f64::na::Point3<f64>;
pub type Vector3 = parry3d_f64::na::Vector3<f64>;
pub type UnitVec3 = parry3d_f64::na::Unit<Vector3>;
pub type Iso3 = parry3d_f64::na::Isometry3<f64>;
pub type UnitQuat = parry3d_f64::na::UnitQuaternion<f64>;
pub type Matrix4 = parry3d_f64::na::Matrix4<f64>;
