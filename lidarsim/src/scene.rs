//! A scene of collidable objects built on parry3d shapes, which serves as the intersection
//! provider for the simulated sensor.

use crate::sensors::{IntersectionProvider, ProviderHit};
use crate::{Iso3, Point3, UnitVec3, Vector3};
use parry3d_f64::query::{Ray, RayCast};
use parry3d_f64::shape::SharedShape;

/// Half thickness of the slab used for finite ground planes
const GROUND_HALF_THICKNESS: f64 = 1.0e-3;

/// A shape placed in the world by an isometry.
#[derive(Clone)]
pub struct SceneObject {
    shape: SharedShape,
    transform: Iso3,
}

impl SceneObject {
    pub fn new(shape: SharedShape, transform: Iso3) -> Self {
        Self { shape, transform }
    }

    /// An infinite plane through `point`, with the solid side opposite to `normal`
    pub fn plane(point: Point3, normal: UnitVec3) -> Self {
        Self::new(
            SharedShape::halfspace(normal),
            Iso3::translation(point.x, point.y, point.z),
        )
    }

    /// A finite, horizontal square of ground with its upper surface at `height`
    pub fn ground(center_x: f64, center_z: f64, height: f64, size: f64) -> Self {
        let half = size / 2.0;
        Self::new(
            SharedShape::cuboid(half, GROUND_HALF_THICKNESS, half),
            Iso3::translation(center_x, height - GROUND_HALF_THICKNESS, center_z),
        )
    }

    pub fn cuboid(center: Point3, half_extents: Vector3) -> Self {
        Self::new(
            SharedShape::cuboid(half_extents.x, half_extents.y, half_extents.z),
            Iso3::translation(center.x, center.y, center.z),
        )
    }

    pub fn ball(center: Point3, radius: f64) -> Self {
        Self::new(
            SharedShape::ball(radius),
            Iso3::translation(center.x, center.y, center.z),
        )
    }

    /// A cylinder with its axis along Y
    pub fn cylinder(center: Point3, half_height: f64, radius: f64) -> Self {
        Self::new(
            SharedShape::cylinder(half_height, radius),
            Iso3::translation(center.x, center.y, center.z),
        )
    }

    pub fn shape(&self) -> &SharedShape {
        &self.shape
    }

    pub fn transform(&self) -> &Iso3 {
        &self.transform
    }

    /// Cast a world space ray against the object, ignoring anything closer than `near`. The ray
    /// is started at the near limit rather than filtered afterward, so a surface right at the
    /// sensor does not hide the surfaces behind it.
    fn cast(&self, ray: &Ray, near: f64, far: f64) -> Option<ProviderHit> {
        let start = Ray::new(ray.point_at(near), ray.dir);
        let local = start.inverse_transform_by(&self.transform);

        let ri = self
            .shape
            .cast_local_ray_and_get_normal(&local, far - near, false)?;
        let distance = ri.time_of_impact + near;

        Some(ProviderHit {
            position: ray.point_at(distance),
            distance,
            local_normal: Some(ri.normal).filter(|n| n.norm_squared() > 0.0),
            transform: self.transform,
        })
    }
}

/// A flat collection of scene objects. Every object is tested for every ray.
#[derive(Clone, Default)]
pub struct Scene {
    objects: Vec<SceneObject>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// The ground, box, and ball arrangement used by the command line driver
    pub fn demo() -> Self {
        let mut scene = Self::new();
        scene.add(SceneObject::ground(0.0, 0.0, -1.0, 20.0));
        scene.add(SceneObject::cuboid(
            Point3::new(-3.0, 0.0, -2.0),
            Vector3::new(1.0, 1.0, 1.0),
        ));
        scene.add(SceneObject::ball(Point3::new(4.0, 0.5, 1.0), 1.5));
        scene
    }

    pub fn add(&mut self, object: SceneObject) {
        self.objects.push(object);
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl IntersectionProvider for Scene {
    fn intersections(&self, ray: &Ray, near: f64, far: f64) -> Vec<ProviderHit> {
        if far <= near {
            return Vec::new();
        }
        self.objects
            .iter()
            .filter_map(|o| o.cast(ray, near, far))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::cast_nearest;
    use crate::na::UnitQuaternion;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn down() -> UnitVec3 {
        -Vector3::y_axis()
    }

    #[test]
    fn ground_hit_from_above() {
        let mut scene = Scene::new();
        scene.add(SceneObject::ground(0.0, 0.0, -1.0, 20.0));

        let hits = scene.intersections(&Ray::new(Point3::new(0.0, 1.0, 0.0), down().into_inner()), 0.01, 15.0);
        assert_eq!(hits.len(), 1);
        assert_relative_eq!(hits[0].distance, 2.0, epsilon = 1e-9);
        assert_relative_eq!(hits[0].position, Point3::new(0.0, -1.0, 0.0), epsilon = 1e-9);
        assert_relative_eq!(hits[0].local_normal.unwrap(), Vector3::y(), epsilon = 1e-12);
    }

    #[test]
    fn ground_is_finite() {
        let mut scene = Scene::new();
        scene.add(SceneObject::ground(0.0, 0.0, -1.0, 20.0));
        let ray = Ray::new(Point3::new(12.0, 1.0, 0.0), down().into_inner());
        assert!(scene.intersections(&ray, 0.01, 15.0).is_empty());
    }

    #[test]
    fn returns_one_hit_per_object_along_ray() {
        let mut scene = Scene::new();
        scene.add(SceneObject::ball(Point3::new(10.0, 0.0, 0.0), 1.0));
        scene.add(SceneObject::ball(Point3::new(5.0, 0.0, 0.0), 1.0));

        let dir = Vector3::x_axis();
        let hits = scene.intersections(&Ray::new(Point3::origin(), dir.into_inner()), 0.01, 15.0);
        assert_eq!(hits.len(), 2);

        let nearest = cast_nearest(&scene, &Point3::origin(), &dir, 0.01, 15.0).unwrap();
        assert_relative_eq!(nearest.distance, 4.0, epsilon = 1e-9);
        assert_relative_eq!(nearest.normal.into_inner(), -Vector3::x(), epsilon = 1e-9);
    }

    #[test]
    fn near_limit_skips_surface_at_sensor() {
        let mut scene = Scene::new();
        // The sensor sits on the surface of this ball, the next hit is the far wall
        scene.add(SceneObject::ball(Point3::new(0.0, 0.0, 0.0), 1.0));
        scene.add(SceneObject::ground(0.0, 0.0, -1.0, 20.0));

        let origin = Point3::new(0.0, 1.0, 0.0);
        let hit = cast_nearest(&scene, &origin, &down(), 0.01, 15.0).unwrap();
        assert_relative_eq!(hit.distance, 2.0, epsilon = 1e-9);
    }

    #[test]
    fn rotated_object_normal_is_in_world_space() {
        let rotation = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), PI / 4.0);
        let transform = Iso3::from_parts(Vector3::new(5.0, 0.0, 0.0).into(), rotation);
        let mut scene = Scene::new();
        scene.add(SceneObject::new(SharedShape::cuboid(1.0, 1.0, 1.0), transform));

        // Ray travels along +X and strikes an edge-on face rotated 45 degrees about Z
        let origin = Point3::new(0.0, 0.3, 0.0);
        let hit = cast_nearest(&scene, &origin, &Vector3::x_axis(), 0.01, 15.0).unwrap();
        assert_relative_eq!(hit.normal.norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(hit.normal.z, 0.0, epsilon = 1e-9);
        assert_relative_eq!(hit.normal.x.abs(), (PI / 4.0).cos(), epsilon = 1e-9);
        assert!(hit.normal.x < 0.0);
    }

    #[test]
    fn demo_scene_has_three_objects() {
        let scene = Scene::demo();
        assert_eq!(scene.len(), 3);
        let hit = cast_nearest(&scene, &Point3::new(4.0, 5.0, 1.0), &down(), 0.01, 15.0).unwrap();
        assert_relative_eq!(hit.position.y, 2.0, epsilon = 1e-9);
    }
}
