///
/// Triangle primitive: vertices, bounding box, centroid, and the two
/// intersection kernels the construction engines fold over every
/// triangle in the mesh.

use super::bbox::Bbox;
use super::vector::*;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub p0: Vec3f32,
    pub p1: Vec3f32,
    pub p2: Vec3f32,
}

/// Ray/triangle intersection result.
#[derive(Debug, Clone, Copy)]
pub struct TriangleHit {
    pub hit: bool,
    pub t: f32,
    pub normal: Vec3f32,
}

/// Determinant epsilon used by both the Möller–Trumbore ray test and
/// `intersects_box`'s separating-axis sweep.
pub const TRIANGLE_EPSILON: f32 = 1.0e-4;

#[allow(dead_code)]
impl Triangle {
    pub fn new(p0: Vec3f32, p1: Vec3f32, p2: Vec3f32) -> Triangle {
        Triangle { p0, p1, p2 }
    }

    pub fn bounding_box(&self) -> Bbox {
        Bbox::from_triangle(self.p0, self.p1, self.p2)
    }

    /// Midpoint of the bounding box, not the vertex average.
    pub fn centroid(&self) -> Vec3f32 {
        self.bounding_box().center()
    }

    /// Geometric (unnormalized-input) face normal, matching the original's
    /// `normalize((p3 - p1) x (p2 - p1))`.
    pub fn normal(&self) -> Vec3f32 {
        let edge1 = self.p2 - self.p0;
        let edge2 = self.p1 - self.p0;
        edge1.cross(edge2).normalize()
    }

    /// Möller-Trumbore ray/triangle intersection.
    pub fn intersect_ray(&self, ray_origin: Vec3f32, ray_direction: Vec3f32) -> TriangleHit {
        let miss = TriangleHit { hit: false, t: 0.0, normal: vec3f(0.0, 0.0, 0.0) };

        let edge1 = self.p1 - self.p0;
        let edge2 = self.p2 - self.p0;
        let pvec = ray_direction.cross(edge2);
        let det = dot(edge1, pvec);

        if det.abs() < TRIANGLE_EPSILON {
            return miss;
        }
        let inv_det = 1.0 / det;

        let tvec = ray_origin - self.p0;
        let u = dot(tvec, pvec) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return miss;
        }

        let qvec = tvec.cross(edge1);
        let v = dot(ray_direction, qvec) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return miss;
        }

        let t = dot(edge2, qvec) * inv_det;
        if t <= 0.0 {
            return miss;
        }

        TriangleHit { hit: true, t, normal: edge1.cross(edge2).normalize() }
    }

    /// Akenine-Möller separating-axis test against an AABB given by its
    /// center and half-extents: 3 box-face axes, 1 triangle-normal axis,
    /// 9 edge cross-product axes.
    pub fn intersects_box(&self, box_center: Vec3f32, box_half_extent: Vec3f32) -> bool {
        let v0 = self.p0 - box_center;
        let v1 = self.p1 - box_center;
        let v2 = self.p2 - box_center;

        let e0 = v1 - v0;
        let e1 = v2 - v1;
        let e2 = v0 - v2;

        // 3 box-face axes: overlap of the triangle's own AABB with the box.
        for d in 0..3u32 {
            let (min, max) = min_max3(v0[d], v1[d], v2[d]);
            if min > box_half_extent[d] || max < -box_half_extent[d] {
                return false;
            }
        }

        // 1 triangle-normal axis.
        let normal = e0.cross(e1);
        if !plane_box_overlap(normal, v0, box_half_extent) {
            return false;
        }

        // 9 edge x box-axis cross-product axes.
        let box_axes = [vec3f(1.0, 0.0, 0.0), vec3f(0.0, 1.0, 0.0), vec3f(0.0, 0.0, 1.0)];
        let edges = [e0, e1, e2];
        let verts = [v0, v1, v2];
        for axis in &box_axes {
            for edge in &edges {
                let test_axis = axis.cross(*edge);
                if test_axis.0.abs() < TRIANGLE_EPSILON
                    && test_axis.1.abs() < TRIANGLE_EPSILON
                    && test_axis.2.abs() < TRIANGLE_EPSILON
                {
                    continue;
                }
                if separated_on_axis(test_axis, &verts, box_half_extent) {
                    return false;
                }
            }
        }

        true
    }
}

fn min_max3(a: f32, b: f32, c: f32) -> (f32, f32) {
    (a.min(b).min(c), a.max(b).max(c))
}

fn plane_box_overlap(normal: Vec3f32, vert: Vec3f32, max_box: Vec3f32) -> bool {
    let mut vmin = vec3f(0.0, 0.0, 0.0);
    let mut vmax = vec3f(0.0, 0.0, 0.0);
    for d in 0..3u32 {
        let v = -vert[d];
        if normal[d] > 0.0 {
            vmin[d] = -max_box[d] - v;
            vmax[d] = max_box[d] - v;
        } else {
            vmin[d] = max_box[d] - v;
            vmax[d] = -max_box[d] - v;
        }
    }
    if dot(normal, vmin) > 0.0 {
        return false;
    }
    dot(normal, vmax) >= 0.0
}

fn separated_on_axis(axis: Vec3f32, verts: &[Vec3f32; 3], box_half_extent: Vec3f32) -> bool {
    let p0 = dot(axis, verts[0]);
    let p1 = dot(axis, verts[1]);
    let p2 = dot(axis, verts[2]);
    let (pmin, pmax) = min_max3(p0, p1, p2);

    let r = box_half_extent.0 * axis.0.abs() + box_half_extent.1 * axis.1.abs() + box_half_extent.2 * axis.2.abs();
    pmin > r || pmax < -r
}

#[cfg(test)]
mod triangle_test {
    use super::*;

    fn unit_xy_triangle() -> Triangle {
        Triangle::new(vec3f(0.0, 0.0, 0.0), vec3f(1.0, 0.0, 0.0), vec3f(0.0, 1.0, 0.0))
    }

    #[test]
    fn bounding_box_matches_vertices() {
        let t = unit_xy_triangle();
        let b = t.bounding_box();
        assert_eq!(b.min, vec3f(0.0, 0.0, 0.0));
        assert_eq!(b.max, vec3f(1.0, 1.0, 0.0));
    }

    #[test]
    fn centroid_is_bbox_midpoint() {
        let t = unit_xy_triangle();
        let c = t.centroid();
        assert_eq!(c, vec3f(0.5, 0.5, 0.0));
    }

    #[test]
    fn ray_hits_triangle_head_on() {
        let t = unit_xy_triangle();
        let hit = t.intersect_ray(vec3f(0.2, 0.2, -1.0), vec3f(0.0, 0.0, 1.0));
        assert!(hit.hit);
        assert!((hit.t - 1.0).abs() < 1e-5);
    }

    #[test]
    fn ray_misses_outside_triangle() {
        let t = unit_xy_triangle();
        let hit = t.intersect_ray(vec3f(5.0, 5.0, -1.0), vec3f(0.0, 0.0, 1.0));
        assert!(!hit.hit);
    }

    #[test]
    fn triangle_straddling_box_intersects_without_vertex_inside() {
        // Triangle spans well beyond a small box at the origin, with no
        // vertex inside it: only the SAT edge-axis tests can catch this.
        let t = Triangle::new(vec3f(-10.0, 0.0, 0.0), vec3f(10.0, 0.0, -0.1), vec3f(0.0, 10.0, 0.1));
        assert!(t.intersects_box(vec3f(0.0, 0.0, 0.0), vec3f(0.5, 0.5, 0.5)));
    }

    #[test]
    fn distant_triangle_does_not_intersect_box() {
        let t = unit_xy_triangle();
        assert!(!t.intersects_box(vec3f(100.0, 100.0, 100.0), vec3f(0.5, 0.5, 0.5)));
    }
}
