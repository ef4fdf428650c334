//! Generation of the fixed grid of ray directions cast during one scan.

use crate::config::check_ray_count;
use crate::errors::LidarError;
use crate::{Result, ScanConfig, UnitVec3, Vector3};
use itertools::iproduct;

/// Converts an elevation angle (above the horizontal plane) and an azimuth angle into a unit
/// direction. This is the spherical mapping with the polar angle measured from +Y as
/// `pi/2 - elevation`, and azimuth measured from +Z toward +X.
///
/// # Arguments
///
/// * `elevation`: angle above the XZ plane, in radians
/// * `azimuth`: angle around the Y axis, in radians
///
/// returns: Unit<Matrix<f64, Const<3>, Const<1>, ArrayStorage<f64, 3, 1>>>
pub fn spherical_direction(elevation: f64, azimuth: f64) -> UnitVec3 {
    let (se, ce) = elevation.sin_cos();
    let (sa, ca) = azimuth.sin_cos();
    UnitVec3::new_normalize(Vector3::new(ce * sa, se, ce * ca))
}

/// The directions of every ray in one scan. The grid is ordered with the vertical index as the
/// outer loop and the horizontal index as the inner loop, so the sample at vertical index `i` and
/// horizontal index `j` is found at `i * horizontal_count + j`.
#[derive(Debug, Clone)]
pub struct SamplingGrid {
    horizontal_count: usize,
    vertical_count: usize,
    horizontal_fov: f64,
    vertical_fov: f64,
    directions: Vec<UnitVec3>,
}

impl SamplingGrid {
    /// Build the grid of directions. The vertical count must be at least 2 because the vertical
    /// angle step divides the field of view by `vertical_count - 1`, and the grid may hold at
    /// most `MAX_RAYS_PER_SCAN` directions.
    ///
    /// # Arguments
    ///
    /// * `horizontal_count`: number of azimuth samples, at least 1
    /// * `vertical_count`: number of elevation samples, at least 2
    /// * `horizontal_fov`: azimuth span in radians, sampled from 0 up to but not including this
    /// * `vertical_fov`: elevation span in radians, sampled inclusively and centered on 0
    ///
    /// returns: Result<SamplingGrid, LidarError>
    pub fn new(
        horizontal_count: usize,
        vertical_count: usize,
        horizontal_fov: f64,
        vertical_fov: f64,
    ) -> Result<Self> {
        if horizontal_count < 1 {
            return Err(LidarError::invalid("horizontal ray count must be at least 1"));
        }
        if vertical_count < 2 {
            return Err(LidarError::invalid(format!(
                "vertical ray count must be at least 2, got {vertical_count}"
            )));
        }
        check_ray_count(horizontal_count, vertical_count)?;
        if !horizontal_fov.is_finite() || !vertical_fov.is_finite() {
            return Err(LidarError::invalid("field of view angles must be finite"));
        }

        let directions = iproduct!(0..vertical_count, 0..horizontal_count)
            .map(|(i, j)| {
                let (phi, theta) =
                    grid_angles(i, j, horizontal_count, vertical_count, horizontal_fov, vertical_fov);
                spherical_direction(phi, theta)
            })
            .collect();

        Ok(Self {
            horizontal_count,
            vertical_count,
            horizontal_fov,
            vertical_fov,
            directions,
        })
    }

    pub fn from_config(config: &ScanConfig) -> Result<Self> {
        Self::new(
            config.horizontal_count,
            config.vertical_count,
            config.horizontal_fov,
            config.vertical_fov,
        )
    }

    pub fn directions(&self) -> &[UnitVec3] {
        &self.directions
    }

    pub fn len(&self) -> usize {
        self.directions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directions.is_empty()
    }

    pub fn horizontal_count(&self) -> usize {
        self.horizontal_count
    }

    pub fn vertical_count(&self) -> usize {
        self.vertical_count
    }

    /// The flat sample index of the vertical index `i` and horizontal index `j`
    pub fn index(&self, i: usize, j: usize) -> usize {
        i * self.horizontal_count + j
    }

    /// The (elevation, azimuth) pair of the vertical index `i` and horizontal index `j`
    pub fn angles(&self, i: usize, j: usize) -> (f64, f64) {
        grid_angles(
            i,
            j,
            self.horizontal_count,
            self.vertical_count,
            self.horizontal_fov,
            self.vertical_fov,
        )
    }
}

fn grid_angles(
    i: usize,
    j: usize,
    horizontal_count: usize,
    vertical_count: usize,
    horizontal_fov: f64,
    vertical_fov: f64,
) -> (f64, f64) {
    let phi = vertical_fov * (i as f64 / (vertical_count - 1) as f64) - vertical_fov / 2.0;
    let theta = horizontal_fov * (j as f64 / horizontal_count as f64);
    (phi, theta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;
    use test_case::test_case;

    #[test_case(1, 2)]
    #[test_case(4, 2)]
    #[test_case(7, 5)]
    #[test_case(50, 50)]
    fn produces_h_times_v_unit_directions(h: usize, v: usize) {
        let grid = SamplingGrid::new(h, v, 2.0 * PI, PI).unwrap();
        assert_eq!(grid.len(), h * v);
        for d in grid.directions() {
            assert_relative_eq!(d.norm(), 1.0, epsilon = 1e-12);
        }
    }

    #[test_case(0)]
    #[test_case(1)]
    fn rejects_vertical_count_below_two(v: usize) {
        let result = SamplingGrid::new(4, v, 2.0 * PI, PI);
        assert!(matches!(result, Err(LidarError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_zero_horizontal_count() {
        assert!(SamplingGrid::new(0, 4, 2.0 * PI, PI).is_err());
    }

    #[test_case(100_000, 100_000)]
    #[test_case(usize::MAX / 2, 4)]
    fn rejects_oversized_grid(h: usize, v: usize) {
        let result = SamplingGrid::new(h, v, 2.0 * PI, PI);
        assert!(matches!(result, Err(LidarError::InvalidConfig(_))));
    }

    #[test]
    fn vertical_outer_horizontal_inner() {
        let grid = SamplingGrid::new(4, 3, 2.0 * PI, PI).unwrap();

        // First row points straight down, middle row is horizontal, last row straight up
        for j in 0..4 {
            assert_relative_eq!(grid.directions()[grid.index(0, j)].y, -1.0, epsilon = 1e-12);
            assert_relative_eq!(grid.directions()[grid.index(1, j)].y, 0.0, epsilon = 1e-12);
            assert_relative_eq!(grid.directions()[grid.index(2, j)].y, 1.0, epsilon = 1e-12);
        }

        // The horizontal row sweeps azimuth in quarter turns starting at +Z
        let expected = [
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, -1.0),
            Vector3::new(-1.0, 0.0, 0.0),
        ];
        for (j, e) in expected.iter().enumerate() {
            assert_relative_eq!(grid.directions()[grid.index(1, j)].into_inner(), *e, epsilon = 1e-12);
        }
    }

    #[test]
    fn azimuth_excludes_end_of_fov() {
        let grid = SamplingGrid::new(8, 2, PI, PI / 2.0).unwrap();
        let (_, last) = grid.angles(0, 7);
        assert_relative_eq!(last, PI * 7.0 / 8.0, epsilon = 1e-12);

        let (low, _) = grid.angles(0, 0);
        let (high, _) = grid.angles(1, 0);
        assert_relative_eq!(low, -PI / 4.0, epsilon = 1e-12);
        assert_relative_eq!(high, PI / 4.0, epsilon = 1e-12);
    }

    #[test]
    fn deterministic_for_fixed_inputs() {
        let a = SamplingGrid::new(13, 9, 1.3, 0.7).unwrap();
        let b = SamplingGrid::new(13, 9, 1.3, 0.7).unwrap();
        assert_eq!(a.directions(), b.directions());
    }
}
