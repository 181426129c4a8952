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

//! Provides geometric primitive shapes for spatial calculations.
//!
//! This module contains the structures used for visibility culling and other
//! spatial reasoning tasks: axis-aligned bounding boxes, planes, and the view
//! frustum extracted from a camera's view-projection matrix.

use super::{Mat4, Vec3, Vec4};

/// Represents an Axis-Aligned Bounding Box (AABB).
///
/// An AABB is a rectangular prism aligned with the coordinate axes, defined by
/// its minimum and maximum corner points. It is a simple but highly efficient
/// volume for broad-phase visibility culling.
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(C)]
pub struct Aabb {
    /// The corner of the box with the smallest coordinates on all axes.
    pub min: Vec3,
    /// The corner of the box with the largest coordinates on all axes.
    pub max: Vec3,
}

impl Aabb {
    /// Creates a new `Aabb` from two corner points.
    ///
    /// This constructor automatically ensures that the `min` field holds the
    /// component-wise minimum and `max` holds the component-wise maximum,
    /// regardless of the order the points are passed in.
    #[inline]
    pub fn from_min_max(min_pt: Vec3, max_pt: Vec3) -> Self {
        Self {
            min: min_pt.min(max_pt),
            max: min_pt.max(max_pt),
        }
    }

    /// Creates a new `Aabb` from a center point and its half-extents.
    ///
    /// The half-extents represent the distance from the center to the faces of
    /// the box. The provided `half_extents` will be made non-negative.
    #[inline]
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        let safe_half_extents = half_extents.abs();
        Self {
            min: center - safe_half_extents,
            max: center + safe_half_extents,
        }
    }

    /// Calculates the center point of the `Aabb`.
    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Calculates the half-extents (half the size on each axis) of the `Aabb`.
    #[inline]
    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Calculates the full size (width, height, depth) of the `Aabb`.
    #[inline]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Checks if the `Aabb` is valid (i.e., `min` <= `max` on all axes).
    /// Degenerate boxes where `min == max` are considered valid.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
    }

    /// Checks if this `Aabb` intersects with another `Aabb`.
    ///
    /// Two `Aabb`s intersect if they overlap on all three axes. Boxes that only
    /// touch at the boundary are considered to be intersecting.
    #[inline]
    pub fn intersects_aabb(&self, other: &Aabb) -> bool {
        (self.min.x <= other.max.x && self.max.x >= other.min.x)
            && (self.min.y <= other.max.y && self.max.y >= other.min.y)
            && (self.min.z <= other.max.z && self.max.z >= other.min.z)
    }
}

// --- Plane ---

/// A plane in 3D space in the form `normal . p + d = 0`.
///
/// Points with a positive signed distance lie on the side the normal points
/// toward. Frustum planes store their normals pointing inward, so a positive
/// distance means "inside".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// The plane normal. Unit length after [`Plane::from_coefficients`].
    pub normal: Vec3,
    /// The signed distance term.
    pub d: f32,
}

impl Plane {
    /// Creates a plane from its normal and distance term without normalizing.
    #[inline]
    pub const fn new(normal: Vec3, d: f32) -> Self {
        Self { normal, d }
    }

    /// Creates a normalized plane from raw `(a, b, c, d)` coefficients.
    ///
    /// The coefficients are scaled so that `(a, b, c)` becomes a unit vector,
    /// which makes [`Plane::distance_to_point`] a true Euclidean distance.
    /// Degenerate coefficients (zero-length normal) are returned unscaled.
    #[inline]
    pub fn from_coefficients(v: Vec4) -> Self {
        let normal = Vec3::new(v.x, v.y, v.z);
        let len = normal.length();
        if len > 0.0 {
            let inv_len = 1.0 / len;
            Self {
                normal: normal * inv_len,
                d: v.w * inv_len,
            }
        } else {
            Self { normal, d: v.w }
        }
    }

    /// Returns the signed distance from `point` to the plane.
    #[inline]
    pub fn distance_to_point(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.d
    }
}

// --- Frustum ---

/// Plane indices into the frustum planes array.
const LEFT: usize = 0;
const RIGHT: usize = 1;
const BOTTOM: usize = 2;
const TOP: usize = 3;
const NEAR: usize = 4;
const FAR: usize = 5;

/// A view frustum defined by six inward-pointing planes extracted from the
/// view-projection matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    /// Six planes: left, right, bottom, top, near, far.
    planes: [Plane; 6],
}

impl Frustum {
    /// Extracts frustum planes from a combined view-projection matrix using
    /// the Gribb-Hartmann method.
    ///
    /// The near/far rows assume a `[0, 1]` clip-space depth range, matching
    /// [`Mat4::perspective_rh_zo`]: the near plane is `row2` and the far plane
    /// is `row3 - row2`.
    pub fn from_view_projection(vp: &Mat4) -> Self {
        let rows = [vp.get_row(0), vp.get_row(1), vp.get_row(2), vp.get_row(3)];

        let mut planes = [Plane::new(Vec3::ZERO, 0.0); 6];
        planes[LEFT] = Plane::from_coefficients(rows[3] + rows[0]);
        planes[RIGHT] = Plane::from_coefficients(rows[3] - rows[0]);
        planes[BOTTOM] = Plane::from_coefficients(rows[3] + rows[1]);
        planes[TOP] = Plane::from_coefficients(rows[3] - rows[1]);
        planes[NEAR] = Plane::from_coefficients(rows[2]);
        planes[FAR] = Plane::from_coefficients(rows[3] - rows[2]);

        Self { planes }
    }

    /// Returns the six frustum planes in left, right, bottom, top, near, far order.
    #[inline]
    pub fn planes(&self) -> &[Plane; 6] {
        &self.planes
    }

    /// Tests whether an AABB is at least partially inside the frustum.
    ///
    /// Uses the p-vertex (positive vertex) method: for each plane, find the
    /// corner of the AABB furthest along the plane normal. If that corner is
    /// behind the plane, the entire AABB is outside.
    ///
    /// The test is conservative: it may report some AABBs near frustum
    /// corners as intersecting when they are fully outside, but it never
    /// rejects a visible box.
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        for plane in &self.planes {
            let normal = plane.normal;

            // Positive vertex: the corner furthest along the plane normal.
            let p = Vec3::new(
                if normal.x >= 0.0 {
                    aabb.max.x
                } else {
                    aabb.min.x
                },
                if normal.y >= 0.0 {
                    aabb.max.y
                } else {
                    aabb.min.y
                },
                if normal.z >= 0.0 {
                    aabb.max.z
                } else {
                    aabb.min.z
                },
            );

            if plane.distance_to_point(p) < 0.0 {
                return false;
            }
        }
        true
    }
}
