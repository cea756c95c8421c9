///
/// Axis aligned bounding box
/// Adapted from Javascript/C++ code provided by Jeppe Revall Frisvad,
/// originally based on code by Nvidia, MIT License (2008-2010)

use super::vector::*;

///
/// ### Bounding Box
/// Axis aligned bounding box type
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct Bbox {
    pub min: Vec3f32,
    pub max: Vec3f32,
}

/// Alias for the "Bounds" vocabulary used elsewhere; same type as `Bbox`.
pub type Bounds = Bbox;

/// Result of a ray/AABB slab test.
#[derive(Debug, Clone, Copy)]
pub struct RayHit {
    pub hit: bool,
    pub t: f32,
}

#[allow(dead_code)]
impl Bbox {
    ///
    /// Create a new bounding box including nothing
    pub fn new() -> Bbox {
        Self {
            min: vec3f( 1.0E+37, 1.0E+37, 1.0e+37),
            max: vec3f(-1.0e+37, -1.0e+37, -1.0e+37),
        }
    }

    ///
    /// Create a bounding box from a given triangle
    pub fn from_triangle(v0: Vec3f32, v1: Vec3f32, v2: Vec3f32) -> Bbox {
        let mut b = Self { min: v0, max: v0 };
        b.include_vertex(v1);
        b.include_vertex(v2);
        b
    }

    /// Extend the bounding box to include the given vertex
    pub fn include_vertex(&mut self, v: Vec3f32) {
        self.min.0 = f32::min(self.min.0, v.0);
        self.min.1 = f32::min(self.min.1, v.1);
        self.min.2 = f32::min(self.min.2, v.2);

        self.max.0 = f32::max(self.max.0, v.0);
        self.max.1 = f32::max(self.max.1, v.1);
        self.max.2 = f32::max(self.max.2, v.2);
    }

    /// Extend the bounding box to include the given bounding box
    pub fn include_bbox(&mut self, other: &Bbox) {
        self.min.0 = f32::min(self.min.0, other.min.0);
        self.min.1 = f32::min(self.min.1, other.min.1);
        self.min.2 = f32::min(self.min.2, other.min.2);

        self.max.0 = f32::max(self.max.0, other.max.0);
        self.max.1 = f32::max(self.max.1, other.max.1);
        self.max.2 = f32::max(self.max.2, other.max.2);
    }

    /// Get the center of the bounding box
    pub fn center(&self) -> Vec3f32 {
        (self.min + self.max) * 0.5
    }

    /// Get the extents of the bounding box, also called the diagonal
    pub fn extent(&self) -> Vec3f32 {
        self.max - self.min
    }

    /// Get the extent of the bounding box in the given dimension
    pub fn extent_dim(&self, dim: u32) -> f32 {
        self.max[dim] - self.min[dim]
    }

    /// Get the surface area of the bounding box: 2(dx*dy + dy*dz + dz*dx)
    pub fn surface_area(&self) -> f32 {
        let d = self.extent();
        2.0 * (d.0 * d.1 + d.1 * d.2 + d.2 * d.0)
    }

    /// Get the axis of maximum extent as an index (0 = x, 1 = y, 2 = z)
    pub fn max_dimension(&self) -> u32 {
        let d = self.extent();
        if d.0 > d.1 && d.0 > d.2 {
            0
        } else if d.1 > d.2 {
            1
        } else {
            2
        }
    }

    /// Get the largest extent of the bounding box
    pub fn max_extent(&self) -> f32 {
        self.extent_dim(self.max_dimension())
    }

    /// Check if the bounding box intersects with the other bounding box
    pub fn intersects(&self, other: &Bbox) -> bool {
        !(other.min.0 > self.max.0 || other.max.0 < self.min.0) &&
        !(other.min.1 > self.max.1 || other.max.1 < self.min.1) &&
        !(other.min.2 > self.max.2 || other.max.2 < self.min.2)
    }

    /// Offset function (from the PBR book).
    /// Return the relative position of a point inside of the box.
    ///
    /// The minimum corner will have an offset of (0, 0, 0) and
    /// the maximum corner will have an offset of (1, 1, 1). Assumes a
    /// non-degenerate extent on every axis that's queried; callers are
    /// responsible for having already taken the degenerate-bounds exit.
    pub fn offset(&self, point: Vec3f32) -> Vec3f32 {
        let o = point - self.min;
        let d = self.extent();
        vec3f32(o.0 / d.0, o.1 / d.1, o.2 / d.2)
    }

    /// Ray/AABB slab test. `inv_dir` must already be the epsilon-guarded
    /// reciprocal of the ray direction (see `Vec3::inv_approximate`).
    pub fn intersect_ray_inv_dir(&self, ray_origin: Vec3f32, inv_dir: Vec3f32, mut tmin: f32, mut tmax: f32) -> RayHit {
        let corners = [self.min, self.max];
        for d in 0..3u32 {
            let sign = if inv_dir[d] < 0.0 { 1usize } else { 0usize };
            let bmin = corners[sign][d];
            let bmax = corners[1 - sign][d];

            let dmin = (bmin - ray_origin[d]) * inv_dir[d];
            let dmax = (bmax - ray_origin[d]) * inv_dir[d];

            tmin = f32::max(tmin, dmin);
            tmax = f32::min(tmax, dmax);
        }
        RayHit { hit: tmin <= tmax, t: tmin }
    }

    pub fn intersect_ray(&self, ray_origin: Vec3f32, ray_direction: Vec3f32, tmin: f32, tmax: f32) -> RayHit {
        let inv_dir = ray_direction.inv_approximate();
        self.intersect_ray_inv_dir(ray_origin, inv_dir, tmin, tmax)
    }
}

impl Default for Bbox {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod bbox_test {
    use super::*;

    #[test]
    fn surface_area_of_unit_cube() {
        let b = Bbox { min: vec3f(0.0, 0.0, 0.0), max: vec3f(1.0, 1.0, 1.0) };
        assert_eq!(b.surface_area(), 6.0);
    }

    #[test]
    fn degenerate_bbox_has_zero_area() {
        let b = Bbox::from_triangle(vec3f(1.0, 1.0, 1.0), vec3f(1.0, 1.0, 1.0), vec3f(1.0, 1.0, 1.0));
        assert_eq!(b.surface_area(), 0.0);
    }

    #[test]
    fn offset_maps_corners_to_unit_cube() {
        let b = Bbox { min: vec3f(0.0, 0.0, 0.0), max: vec3f(2.0, 4.0, 8.0) };
        assert_eq!(b.offset(b.min), vec3f(0.0, 0.0, 0.0));
        assert_eq!(b.offset(b.max), vec3f(1.0, 1.0, 1.0));
    }

    #[test]
    fn ray_through_unit_cube_hits() {
        let b = Bbox { min: vec3f(-1.0, -1.0, -1.0), max: vec3f(1.0, 1.0, 1.0) };
        let hit = b.intersect_ray(vec3f(0.0, 0.0, -5.0), vec3f(0.0, 0.0, 1.0), 0.0, f32::INFINITY);
        assert!(hit.hit);
        assert!((hit.t - 4.0).abs() < 1e-5);
    }

    #[test]
    fn ray_missing_unit_cube_misses() {
        let b = Bbox { min: vec3f(-1.0, -1.0, -1.0), max: vec3f(1.0, 1.0, 1.0) };
        let hit = b.intersect_ray(vec3f(5.0, 5.0, -5.0), vec3f(0.0, 0.0, 1.0), 0.0, f32::INFINITY);
        assert!(!hit.hit);
    }
}
