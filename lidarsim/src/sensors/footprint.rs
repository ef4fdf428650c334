//! This module turns a single beam return into the oriented ellipse that approximates the area the
//! beam illuminated. Two effects are modeled: the beam spreads with distance (divergence), and
//! the pulse smears along the surface as the incidence angle grows (pulse length divided by the
//! cosine of the incidence angle). This is a stylized approximation and not an optical model.

use crate::config::non_negative;
use crate::errors::LidarError;
use crate::na::{Matrix3, Rotation3, Translation3};
use crate::sensors::Hit;
use crate::{Iso3, Matrix4, Point3, Result, UnitQuat, UnitVec3, Vector3};
use std::f64::consts::FRAC_PI_2;
use serde::{Deserialize, Serialize};

/// Lower bound on the incidence cosine, which bounds the pulse smear at grazing incidence
pub const MIN_INCIDENCE_COS: f64 = 0.01;

/// Squared length below which the in-plane view direction is treated as degenerate
pub const DEGENERATE_TANGENT_SQ: f64 = 1.0e-4;

/// Thickness of the footprint along the surface normal, before the point scale is applied
pub const FOOTPRINT_DEPTH: f64 = 0.01;

/// The beam characteristics needed to size a footprint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeamParams {
    /// Half of the divergence cone angle, in radians
    pub half_divergence: f64,

    /// Spatial length of the pulse, pulse duration times the speed of light
    pub pulse_length: f64,

    pub point_scale: f64,
}

impl BeamParams {
    /// Create beam parameters. Every value must be finite and non-negative, and the half
    /// divergence must be below 90 degrees so the cone has a finite width.
    pub fn new(half_divergence: f64, pulse_length: f64, point_scale: f64) -> Result<Self> {
        non_negative("beam_half_divergence", half_divergence)?;
        non_negative("pulse_length", pulse_length)?;
        non_negative("point_scale", point_scale)?;
        if half_divergence >= FRAC_PI_2 {
            return Err(LidarError::invalid("beam half divergence must be below 90 degrees"));
        }

        Ok(Self {
            half_divergence,
            pulse_length,
            point_scale,
        })
    }

    /// Diameter of the divergence cone at the given distance from the sensor
    pub fn divergence_diameter(&self, distance: f64) -> f64 {
        2.0 * distance * self.half_divergence.tan()
    }

    /// Length of the pulse projected onto a surface seen at the given incidence cosine. The
    /// cosine is floored at `MIN_INCIDENCE_COS`.
    pub fn pulse_projection(&self, cos_angle: f64) -> f64 {
        self.pulse_length / cos_angle.abs().max(MIN_INCIDENCE_COS)
    }
}

/// The transform of one displayed point: where it is, how the ellipse is oriented, and how large
/// it is. The local X axis of the orientation is the ellipse's major axis, local Y is the minor
/// axis, and local Z is the surface normal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointRecord {
    pub position: Point3,
    pub orientation: UnitQuat,

    /// Major diameter, minor diameter, and depth, all multiplied by the point scale
    pub scale: Vector3,
}

impl PointRecord {
    pub fn major_diameter(&self) -> f64 {
        self.scale.x
    }

    pub fn minor_diameter(&self) -> f64 {
        self.scale.y
    }

    /// Compose the record into a homogeneous transform, translation * rotation * scale, which is
    /// the form instance buffers expect.
    pub fn to_matrix(&self) -> Matrix4 {
        let iso = Iso3::from_parts(Translation3::from(self.position.coords), self.orientation);
        iso.to_homogeneous() * Matrix4::new_nonuniform_scaling(&self.scale)
    }
}

/// Pick a tangent perpendicular to the normal using only the normal itself, used when the view
/// direction gives no usable in-plane component.
fn fallback_tangent(normal: &UnitVec3) -> UnitVec3 {
    let t = if normal.x.abs() > normal.z.abs() {
        Vector3::new(-normal.y, normal.x, 0.0)
    } else {
        Vector3::new(0.0, -normal.z, normal.y)
    };
    UnitVec3::new_normalize(t)
}

/// Build the right-handed orthonormal basis (tangent, bitangent, normal) for a surface seen from
/// `view`. The tangent is the component of the view direction lying in the surface plane, so the
/// major axis of the footprint points back toward the sensor.
fn footprint_basis(normal: &UnitVec3, view: &Vector3) -> (UnitVec3, UnitVec3) {
    let rejection = view - normal.into_inner() * normal.dot(view);
    let tangent = if rejection.norm_squared() < DEGENERATE_TANGENT_SQ {
        fallback_tangent(normal)
    } else {
        UnitVec3::new_normalize(rejection)
    };
    let bitangent = UnitVec3::new_normalize(normal.cross(tangent.as_ref()));
    (tangent, bitangent)
}

/// Compute the footprint of a hit.
///
/// # Arguments
///
/// * `hit`: the surface hit, with a unit normal and the unit direction of the incoming ray
/// * `beam`: the beam divergence, pulse length, and display scale
///
/// returns: PointRecord
pub fn estimate_footprint(hit: &Hit, beam: &BeamParams) -> PointRecord {
    let view = -hit.ray_direction.into_inner();
    let normal = hit.normal;

    let divergence = beam.divergence_diameter(hit.distance);
    let cos_angle = normal.dot(&view).abs();
    let major = beam.pulse_projection(cos_angle) + divergence;
    let minor = divergence;

    let (tangent, bitangent) = footprint_basis(&normal, &view);
    let rotation = Rotation3::from_matrix_unchecked(Matrix3::from_columns(&[
        tangent.into_inner(),
        bitangent.into_inner(),
        normal.into_inner(),
    ]));

    PointRecord {
        position: hit.position,
        orientation: UnitQuat::from_rotation_matrix(&rotation),
        scale: Vector3::new(major, minor, FOOTPRINT_DEPTH) * beam.point_scale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::Rng;
    use test_case::test_case;

    fn beam() -> BeamParams {
        BeamParams::new(15.1_f64.to_radians(), 0.01 * 0.299792458, 1.0).unwrap()
    }

    fn hit(normal: Vector3, direction: Vector3, distance: f64) -> Hit {
        let ray_direction = UnitVec3::new_normalize(direction);
        Hit {
            position: Point3::origin() + ray_direction.into_inner() * distance,
            distance,
            normal: UnitVec3::new_normalize(normal),
            ray_direction,
        }
    }

    fn assert_unit_rotation(q: &UnitQuat) {
        assert_relative_eq!(q.norm(), 1.0, epsilon = 1e-9);
        let m = q.to_rotation_matrix();
        assert_relative_eq!(m.matrix().determinant(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn normal_incidence_is_circle_plus_pulse() {
        let b = beam();
        let record = estimate_footprint(&hit(Vector3::y(), -Vector3::y(), 5.0), &b);

        let divergence = 2.0 * 5.0 * b.half_divergence.tan();
        assert_relative_eq!(record.minor_diameter(), divergence, epsilon = 1e-12);
        assert_relative_eq!(record.major_diameter(), divergence + b.pulse_length, epsilon = 1e-12);
        assert_relative_eq!(record.scale.z, FOOTPRINT_DEPTH, epsilon = 1e-12);
        assert_unit_rotation(&record.orientation);

        // The local Z axis follows the surface normal
        let z = record.orientation * Vector3::z();
        assert_relative_eq!(z, Vector3::y(), epsilon = 1e-9);
    }

    #[test]
    fn oblique_incidence_stretches_major_axis() {
        let b = beam();
        let d = 10.0;
        // 60 degrees off the normal gives a cosine of 0.5
        let dir = Vector3::new((60.0_f64).to_radians().sin(), -(60.0_f64).to_radians().cos(), 0.0);
        let record = estimate_footprint(&hit(Vector3::y(), dir, d), &b);

        let divergence = b.divergence_diameter(d);
        assert_relative_eq!(record.major_diameter(), b.pulse_length / 0.5 + divergence, epsilon = 1e-9);
        assert_relative_eq!(record.minor_diameter(), divergence, epsilon = 1e-12);

        // The major axis lies in the surface plane, pointing back toward the sensor
        let x = record.orientation * Vector3::x();
        assert_relative_eq!(x, Vector3::new(-1.0, 0.0, 0.0), epsilon = 1e-9);
    }

    #[test]
    fn grazing_incidence_is_bounded_by_floor() {
        let b = beam();
        let d = 3.0;
        // Travelling almost exactly along the surface
        let record = estimate_footprint(&hit(Vector3::y(), Vector3::new(1.0, -1.0e-5, 0.0), d), &b);

        let expected = b.pulse_length / MIN_INCIDENCE_COS + b.divergence_diameter(d);
        assert_relative_eq!(record.major_diameter(), expected, epsilon = 1e-9);
        assert!(record.major_diameter().is_finite());
    }

    #[test]
    fn perpendicular_ray_is_bounded_by_floor() {
        let b = beam();
        let record = estimate_footprint(&hit(Vector3::y(), Vector3::x(), 2.0), &b);
        let expected = b.pulse_length / MIN_INCIDENCE_COS + b.divergence_diameter(2.0);
        assert_relative_eq!(record.major_diameter(), expected, epsilon = 1e-12);
    }

    #[test_case(Vector3::x() ; "normal along x")]
    #[test_case(Vector3::y() ; "normal along y")]
    #[test_case(Vector3::z() ; "normal along z")]
    #[test_case(-Vector3::z() ; "normal along -z")]
    #[test_case(Vector3::new(1.0, 1.0, 0.0) ; "normal in xy")]
    #[test_case(Vector3::new(0.3, -0.2, 0.9) ; "general normal")]
    fn head_on_uses_deterministic_fallback(normal: Vector3) {
        let b = beam();
        let h = hit(normal, -normal, 4.0);
        let first = estimate_footprint(&h, &b);
        let second = estimate_footprint(&h, &b);

        assert_eq!(first, second);
        assert_unit_rotation(&first.orientation);
        let z = first.orientation * Vector3::z();
        assert_relative_eq!(z, h.normal.into_inner(), epsilon = 1e-9);
    }

    #[test_case(-0.1, 0.003, 1.0 ; "negative divergence")]
    #[test_case(FRAC_PI_2, 0.003, 1.0 ; "right angle divergence")]
    #[test_case(0.1, f64::NAN, 1.0 ; "nan pulse")]
    #[test_case(0.1, 0.003, -1.0 ; "negative scale")]
    #[test_case(0.1, 0.003, f64::INFINITY ; "infinite scale")]
    fn rejects_bad_beam(half_divergence: f64, pulse_length: f64, point_scale: f64) {
        let result = BeamParams::new(half_divergence, pulse_length, point_scale);
        assert!(matches!(result, Err(LidarError::InvalidConfig(_))));
    }

    #[test]
    fn point_scale_multiplies_all_axes() {
        let b = beam();
        let scaled = BeamParams::new(b.half_divergence, b.pulse_length, 2.5).unwrap();
        let h = hit(Vector3::new(0.2, 1.0, 0.1), Vector3::new(0.4, -1.0, 0.3), 6.0);

        let base = estimate_footprint(&h, &b);
        let big = estimate_footprint(&h, &scaled);
        assert_relative_eq!(big.scale, base.scale * 2.5, epsilon = 1e-12);
        assert_relative_eq!(big.position, base.position);
    }

    #[test]
    fn random_hits_give_valid_records() {
        let mut rng = rand::rng();
        let b = beam();
        for _ in 0..1000 {
            let normal = Vector3::new(
                rng.random_range(-1.0..1.0),
                rng.random_range(-1.0..1.0),
                rng.random_range(-1.0..1.0),
            );
            let dir = Vector3::new(
                rng.random_range(-1.0..1.0),
                rng.random_range(-1.0..1.0),
                rng.random_range(-1.0..1.0),
            );
            if normal.norm() < 1e-3 || dir.norm() < 1e-3 {
                continue;
            }
            let d = rng.random_range(0.01..15.0);
            let record = estimate_footprint(&hit(normal, dir, d), &b);

            assert_unit_rotation(&record.orientation);
            for s in record.scale.iter() {
                assert!(s.is_finite() && *s >= 0.0, "bad scale {:?}", record.scale);
            }
        }
    }

    #[test]
    fn matrix_composes_translation_rotation_scale() {
        let h = hit(Vector3::new(0.0, 0.0, 1.0), Vector3::new(0.5, 0.0, -1.0), 5.0);
        let record = estimate_footprint(&h, &beam());
        let m = record.to_matrix();

        let local = crate::na::Vector4::new(1.0, 0.0, 0.0, 1.0);
        let world = m * local;
        let expected = record.position + record.orientation * Vector3::x() * record.scale.x;
        assert_relative_eq!(world.xyz(), expected.coords, epsilon = 1e-9);
        assert_relative_eq!(world.w, 1.0);
    }
}
