// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Provides a 4x4 column-major matrix for camera and transform math.

use super::vector::{Vec3, Vec4};
use std::ops::Mul;

// --- Mat4 ---

/// A 4x4 column-major matrix, used for 3D affine transformations.
///
/// This is the primary type for representing transformations (translation,
/// rotation, scale) in 3D space. It is also used for camera view and
/// projection matrices. The memory layout is column-major, which is compatible
/// with modern graphics APIs like Vulkan, Metal, and DirectX.
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(C)]
pub struct Mat4 {
    /// The four columns of the matrix.
    pub cols: [Vec4; 4],
}

impl Mat4 {
    /// The 4x4 identity matrix.
    pub const IDENTITY: Self = Self {
        cols: [Vec4::X, Vec4::Y, Vec4::Z, Vec4::W],
    };

    /// A 4x4 matrix with all elements set to 0.
    pub const ZERO: Self = Self {
        cols: [Vec4::ZERO; 4],
    };

    /// Creates a new matrix from four column vectors.
    #[inline]
    pub const fn from_cols(c0: Vec4, c1: Vec4, c2: Vec4, c3: Vec4) -> Self {
        Self {
            cols: [c0, c1, c2, c3],
        }
    }

    /// Returns the row at `index` as a `Vec4`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is greater than 3.
    #[inline]
    pub fn get_row(&self, index: usize) -> Vec4 {
        Vec4 {
            x: self.cols[0].get(index),
            y: self.cols[1].get(index),
            z: self.cols[2].get(index),
            w: self.cols[3].get(index),
        }
    }

    /// Creates a translation matrix.
    ///
    /// # Arguments
    ///
    /// * `v`: The translation vector to apply.
    #[inline]
    pub const fn from_translation(v: Vec3) -> Self {
        Self {
            cols: [
                Vec4::X,
                Vec4::Y,
                Vec4::Z,
                Vec4::new(v.x, v.y, v.z, 1.0),
            ],
        }
    }

    /// Creates a non-uniform scale matrix.
    #[inline]
    pub const fn from_scale(v: Vec3) -> Self {
        Self {
            cols: [
                Vec4::new(v.x, 0.0, 0.0, 0.0),
                Vec4::new(0.0, v.y, 0.0, 0.0),
                Vec4::new(0.0, 0.0, v.z, 0.0),
                Vec4::W,
            ],
        }
    }

    /// Returns the transpose of the matrix, where rows and columns are swapped.
    #[inline]
    pub fn transpose(&self) -> Self {
        Self::from_cols(
            self.get_row(0),
            self.get_row(1),
            self.get_row(2),
            self.get_row(3),
        )
    }

    /// Creates a right-handed perspective projection matrix with a [0, 1]
    /// depth range (ZO).
    ///
    /// # Arguments
    ///
    /// * `fov_y_radians`: Vertical field of view, in radians.
    /// * `aspect_ratio`: Width divided by height of the viewport.
    /// * `z_near`: Distance to the near clipping plane (must be positive).
    /// * `z_far`: Distance to the far clipping plane (must be positive and > `z_near`).
    #[inline]
    pub fn perspective_rh_zo(
        fov_y_radians: f32,
        aspect_ratio: f32,
        z_near: f32,
        z_far: f32,
    ) -> Self {
        assert!(z_near > 0.0 && z_far > z_near);
        let tan_half_fovy = (fov_y_radians / 2.0).tan();
        let f = 1.0 / tan_half_fovy;
        let aa = f / aspect_ratio;
        let bb = f;
        let cc = z_far / (z_near - z_far);
        let dd = (z_near * z_far) / (z_near - z_far);

        Self::from_cols(
            Vec4::new(aa, 0.0, 0.0, 0.0),
            Vec4::new(0.0, bb, 0.0, 0.0),
            Vec4::new(0.0, 0.0, cc, -1.0),
            Vec4::new(0.0, 0.0, dd, 0.0),
        )
    }

    /// Creates a right-handed view matrix looking from `eye` toward `target`.
    ///
    /// Returns `None` if a valid view basis cannot be constructed, e.g. if
    /// `eye` and `target` are too close, or if `up` is parallel to the view
    /// direction.
    #[inline]
    pub fn look_at_rh(eye: Vec3, target: Vec3, up: Vec3) -> Option<Self> {
        let forward = target - eye;
        if forward.length_squared() < crate::math::EPSILON * crate::math::EPSILON {
            return None;
        }
        let f = forward.normalize();
        let s = f.cross(up);
        if s.length_squared() < crate::math::EPSILON * crate::math::EPSILON {
            return None;
        }
        let s = s.normalize();
        let u = s.cross(f);

        Some(Self::from_cols(
            Vec4::new(s.x, u.x, -f.x, 0.0),
            Vec4::new(s.y, u.y, -f.y, 0.0),
            Vec4::new(s.z, u.z, -f.z, 0.0),
            Vec4::new(-eye.dot(s), -eye.dot(u), eye.dot(f), 1.0),
        ))
    }
}

impl Default for Mat4 {
    /// Returns `Mat4::IDENTITY`.
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul<Mat4> for Mat4 {
    type Output = Self;
    /// Multiplies this matrix by another `Mat4`. Note that matrix multiplication is not commutative.
    #[inline]
    fn mul(self, rhs: Mat4) -> Self::Output {
        let mut result_cols = [Vec4::ZERO; 4];
        for (c_idx, target_col) in result_cols.iter_mut().enumerate() {
            let col_from_rhs = rhs.cols[c_idx];
            *target_col = Vec4 {
                x: self.get_row(0).dot(col_from_rhs),
                y: self.get_row(1).dot(col_from_rhs),
                z: self.get_row(2).dot(col_from_rhs),
                w: self.get_row(3).dot(col_from_rhs),
            };
        }
        Mat4 { cols: result_cols }
    }
}

impl Mul<Vec4> for Mat4 {
    type Output = Vec4;
    /// Transforms a `Vec4` by this matrix.
    #[inline]
    fn mul(self, rhs: Vec4) -> Self::Output {
        self.cols[0] * rhs.x + self.cols[1] * rhs.y + self.cols[2] * rhs.z + self.cols[3] * rhs.w
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{approx_eq, FRAC_PI_2};

    fn vec4_approx_eq(a: Vec4, b: Vec4) -> bool {
        approx_eq(a.x, b.x) && approx_eq(a.y, b.y) && approx_eq(a.z, b.z) && approx_eq(a.w, b.w)
    }

    #[test]
    fn test_mat4_identity() {
        let m = Mat4::IDENTITY;
        let v = Vec4::new(1.0, 2.0, 3.0, 1.0);
        assert_eq!(m * v, v);
        assert_eq!(Mat4::default(), Mat4::IDENTITY);
    }

    #[test]
    fn test_mat4_get_row() {
        let m = Mat4::from_cols(
            Vec4::new(1.0, 2.0, 3.0, 4.0),
            Vec4::new(5.0, 6.0, 7.0, 8.0),
            Vec4::new(9.0, 10.0, 11.0, 12.0),
            Vec4::new(13.0, 14.0, 15.0, 16.0),
        );
        assert_eq!(m.get_row(0), Vec4::new(1.0, 5.0, 9.0, 13.0));
        assert_eq!(m.get_row(3), Vec4::new(4.0, 8.0, 12.0, 16.0));
    }

    #[test]
    fn test_mat4_translation() {
        let m = Mat4::from_translation(Vec3::new(10.0, 20.0, 30.0));
        let p = m * Vec4::new(1.0, 2.0, 3.0, 1.0);
        assert!(vec4_approx_eq(p, Vec4::new(11.0, 22.0, 33.0, 1.0)));
        // Direction vectors (w = 0) are unaffected by translation.
        let d = m * Vec4::new(1.0, 2.0, 3.0, 0.0);
        assert!(vec4_approx_eq(d, Vec4::new(1.0, 2.0, 3.0, 0.0)));
    }

    #[test]
    fn test_mat4_scale() {
        let m = Mat4::from_scale(Vec3::new(2.0, 3.0, 4.0));
        let p = m * Vec4::new(1.0, 1.0, 1.0, 1.0);
        assert!(vec4_approx_eq(p, Vec4::new(2.0, 3.0, 4.0, 1.0)));
    }

    #[test]
    fn test_mat4_mul_identity() {
        let m = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let r = m * Mat4::IDENTITY;
        assert_eq!(r, m);
        let r = Mat4::IDENTITY * m;
        assert_eq!(r, m);
    }

    #[test]
    fn test_mat4_transpose_roundtrip() {
        let m = Mat4::from_cols(
            Vec4::new(1.0, 2.0, 3.0, 4.0),
            Vec4::new(5.0, 6.0, 7.0, 8.0),
            Vec4::new(9.0, 10.0, 11.0, 12.0),
            Vec4::new(13.0, 14.0, 15.0, 16.0),
        );
        assert_eq!(m.transpose().transpose(), m);
    }

    #[test]
    fn test_perspective_maps_near_plane_to_zero_depth() {
        let proj = Mat4::perspective_rh_zo(FRAC_PI_2, 1.0, 0.1, 100.0);
        // A point on the near plane straight ahead of the camera.
        let clip = proj * Vec4::new(0.0, 0.0, -0.1, 1.0);
        let ndc_z = clip.z / clip.w;
        assert!(approx_eq(ndc_z, 0.0));
    }

    #[test]
    fn test_look_at_rh_basics() {
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y)
            .expect("valid view basis");
        // The target lands on the -Z axis in view space.
        let p = view * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert!(approx_eq(p.x, 0.0));
        assert!(approx_eq(p.y, 0.0));
        assert!(approx_eq(p.z, -5.0));
    }

    #[test]
    fn test_look_at_rh_rejects_degenerate_input() {
        let eye = Vec3::new(1.0, 2.0, 3.0);
        assert!(Mat4::look_at_rh(eye, eye, Vec3::Y).is_none());
        // Up parallel to the view direction has no valid right vector.
        assert!(Mat4::look_at_rh(Vec3::ZERO, Vec3::Y, Vec3::Y).is_none());
    }
}
