//! The nearest-hit policy applied on top of an external intersection provider. The provider
//! does the geometric search; this module picks the closest candidate and moves its normal into
//! world space.

use crate::{Iso3, Point3, UnitVec3, Vector3};
use parry3d_f64::query::Ray;

/// One intersection reported by an `IntersectionProvider`.
#[derive(Debug, Clone, Copy)]
pub struct ProviderHit {
    /// World space position of the intersection
    pub position: Point3,

    /// Distance along the (unit) ray direction
    pub distance: f64,

    /// The face normal in the local frame of the object that was hit, if the provider had one
    pub local_normal: Option<Vector3>,

    /// The world transform of the object that was hit
    pub transform: Iso3,
}

/// A collection of collidable objects that rays can be cast against.
pub trait IntersectionProvider: Sync {
    /// Return the intersections of the ray with the scene objects that lie within
    /// `[near, far]`. The results may be in any order and may contain more than one hit per
    /// object; the caller is responsible for choosing between them.
    fn intersections(&self, ray: &Ray, near: f64, far: f64) -> Vec<ProviderHit>;
}

/// The closest surface hit of a single ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub position: Point3,
    pub distance: f64,

    /// World space, unit length surface normal
    pub normal: UnitVec3,

    /// The unit direction of the ray that produced this hit
    pub ray_direction: UnitVec3,
}

fn finite_unit(v: &Vector3) -> Option<UnitVec3> {
    UnitVec3::try_new(*v, 1.0e-12).filter(|u| u.iter().all(|c| c.is_finite()))
}

/// Convert a provider's local normal into a world space unit normal. When the provider has no
/// usable normal the direction from the hit back toward the sensor is used instead.
fn world_normal(hit: &ProviderHit, origin: &Point3, direction: &UnitVec3) -> UnitVec3 {
    hit.local_normal
        .and_then(|n| finite_unit(&(hit.transform.rotation * n)))
        .or_else(|| finite_unit(&(origin - hit.position)))
        .unwrap_or(-*direction)
}

/// Cast a single ray through the provider and return the closest hit within `[near, far]`, or
/// `None` if nothing was hit.
///
/// # Arguments
///
/// * `provider`: the scene to search
/// * `origin`: the ray origin, which is the sensor position at the time of the cast
/// * `direction`: the unit ray direction
/// * `near`: the minimum accepted distance
/// * `far`: the maximum accepted distance
///
/// returns: Option<Hit>
pub fn cast_nearest<P: IntersectionProvider + ?Sized>(
    provider: &P,
    origin: &Point3,
    direction: &UnitVec3,
    near: f64,
    far: f64,
) -> Option<Hit> {
    let ray = Ray::new(*origin, direction.into_inner());

    let closest = provider
        .intersections(&ray, near, far)
        .into_iter()
        .filter(|h| h.distance.is_finite() && h.distance >= near && h.distance <= far)
        .min_by(|a, b| a.distance.total_cmp(&b.distance))?;

    Some(Hit {
        position: closest.position,
        distance: closest.distance,
        normal: world_normal(&closest, origin, direction),
        ray_direction: *direction,
    })
}
