///
/// A triangle tagged with its original position in the host's input
/// array. The BVH builder reorders a `Vec<BvhPrimitive>`, not the
/// triangles themselves; the original index is what survives into the
/// reordered-triangle buffer in the blob.

use crate::data_structures::bbox::Bbox;
use crate::data_structures::triangle::Triangle;
use crate::data_structures::vector::Vec3f32;

#[derive(Debug, Clone, Copy)]
pub struct BvhPrimitive {
    pub index: u32,
    pub triangle: Triangle,
    pub bounds: Bbox,
    pub centroid: Vec3f32,
}

impl BvhPrimitive {
    pub fn new(index: u32, triangle: Triangle) -> BvhPrimitive {
        let bounds = triangle.bounding_box();
        let centroid = triangle.centroid();
        BvhPrimitive { index, triangle, bounds, centroid }
    }

    pub fn from_triangles(triangles: &[Triangle]) -> Vec<BvhPrimitive> {
        triangles
            .iter()
            .enumerate()
            .map(|(i, &t)| BvhPrimitive::new(i as u32, t))
            .collect()
    }
}

#[cfg(test)]
mod primitive_test {
    use super::*;
    use crate::data_structures::vector::vec3f;

    #[test]
    fn from_triangles_preserves_order_and_index() {
        let tris = vec![
            Triangle::new(vec3f(0.0, 0.0, 0.0), vec3f(1.0, 0.0, 0.0), vec3f(0.0, 1.0, 0.0)),
            Triangle::new(vec3f(10.0, 0.0, 0.0), vec3f(11.0, 0.0, 0.0), vec3f(10.0, 1.0, 0.0)),
        ];
        let prims = BvhPrimitive::from_triangles(&tris);
        assert_eq!(prims.len(), 2);
        assert_eq!(prims[0].index, 0);
        assert_eq!(prims[1].index, 1);
        assert_eq!(prims[1].centroid, tris[1].centroid());
    }
}
