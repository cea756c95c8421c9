///
/// Sparse voxel octree: point insertion by octant, bottom-up
/// simplification on normal coherence, and breadth-first serialization
/// with packed child-mask/first-child-offset records.
///
/// The octree is a `Box`-tree with exclusive parent-owns-child
/// semantics, the same shape the BVH's transient tree uses.

use std::collections::VecDeque;

use crate::blob::BlobWriter;
use crate::data_structures::triangle::Triangle;
use crate::data_structures::vector::{dot, vec3f, Vec3f32};
use crate::voxel;

/// Nodes within this many levels of the root's depth are always treated
/// as collapse candidates, even with absent children. See the Open
/// Question resolution in DESIGN.md: this is a deliberate level-of-detail
/// cap, not a bug to route around.
const SIMPLIFY_THRESHOLD: u32 = 5;

/// Cosine-similarity threshold for merging sibling leaves during
/// simplification.
const NORMAL_SIMILARITY_THRESHOLD: f32 = 0.9;

struct SvoNode {
    min: Vec3f32,
    max: Vec3f32,
    depth: u32,
    children: [Option<Box<SvoNode>>; 8],
    normal: Vec3f32,
    is_leaf: bool,
}

impl SvoNode {
    fn new(min: Vec3f32, max: Vec3f32, depth: u32) -> SvoNode {
        SvoNode {
            min,
            max,
            depth,
            children: Default::default(),
            normal: vec3f(0.0, 0.0, 0.0),
            is_leaf: depth == 0,
        }
    }

    fn point_index(&self, point: Vec3f32) -> usize {
        let mid = (self.min + self.max) * 0.5;
        let mut index = 0usize;
        if point.0 > mid.0 {
            index |= 1;
        }
        if point.1 > mid.1 {
            index |= 2;
        }
        if point.2 > mid.2 {
            index |= 4;
        }
        index
    }

    fn create_child(&self, index: usize) -> SvoNode {
        let mid = (self.min + self.max) * 0.5;
        let min = vec3f(
            if index & 1 != 0 { mid.0 } else { self.min.0 },
            if index & 2 != 0 { mid.1 } else { self.min.1 },
            if index & 4 != 0 { mid.2 } else { self.min.2 },
        );
        let max = vec3f(
            if index & 1 != 0 { self.max.0 } else { mid.0 },
            if index & 2 != 0 { self.max.1 } else { mid.1 },
            if index & 4 != 0 { self.max.2 } else { mid.2 },
        );
        SvoNode::new(min, max, self.depth - 1)
    }

    fn insert_voxel(&mut self, center: Vec3f32, normal: Vec3f32, node_count: &mut u32) {
        if self.depth == 0 {
            self.normal = normal;
            return;
        }
        let index = self.point_index(center);
        if self.children[index].is_none() {
            self.children[index] = Some(Box::new(self.create_child(index)));
            *node_count += 1;
        }
        self.children[index].as_mut().unwrap().insert_voxel(center, normal, node_count);
    }

    /// Post-order simplification. `root_depth` is fixed across the whole
    /// recursion (the root's own depth), not decremented per call — see
    /// the `SIMPLIFY_THRESHOLD` comparison below.
    fn simplify(&mut self, root_depth: u32, remove_count: &mut u32) {
        let mut full_child = true;
        for child in self.children.iter_mut() {
            match child {
                Some(c) => c.simplify(root_depth, remove_count),
                None => full_child = false,
            }
        }

        full_child = (root_depth - self.depth >= SIMPLIFY_THRESHOLD) || full_child;
        if !full_child {
            return;
        }

        let mut first_normal: Option<Vec3f32> = None;
        let mut all_similar = true;
        for child in self.children.iter() {
            if let Some(c) = child {
                if !c.is_leaf {
                    all_similar = false;
                    break;
                }
                match first_normal {
                    None => first_normal = Some(c.normal),
                    Some(fm) => {
                        if dot(fm, c.normal) < NORMAL_SIMILARITY_THRESHOLD {
                            all_similar = false;
                            break;
                        }
                    }
                }
            }
        }

        if !all_similar {
            return;
        }

        if let Some(fm) = first_normal {
            for child in self.children.iter_mut() {
                if child.take().is_some() {
                    *remove_count += 1;
                }
            }
            self.is_leaf = true;
            self.normal = fm;
        }
    }
}

struct SvoRecord {
    mask: u8,
    is_leaf: bool,
    first_child_offset: u32,
    normal: Vec3f32,
}

fn serialize(root: &SvoNode) -> Vec<SvoRecord> {
    let mut records = Vec::new();
    let mut queue: VecDeque<&SvoNode> = VecDeque::new();
    queue.push_back(root);
    let mut next_index = 1usize;

    while let Some(node) = queue.pop_front() {
        let self_index = records.len();
        let mut mask = 0u8;
        let mut first_child_index: Option<usize> = None;

        if !node.is_leaf {
            for (i, child) in node.children.iter().enumerate() {
                if let Some(c) = child {
                    mask |= 1 << i;
                    if first_child_index.is_none() {
                        first_child_index = Some(next_index);
                    }
                    queue.push_back(c.as_ref());
                    next_index += 1;
                }
            }
        }

        let first_child_offset = first_child_index.map(|ci| (ci - self_index) as u32).unwrap_or(0);
        records.push(SvoRecord { mask, is_leaf: node.is_leaf, first_child_offset, normal: node.normal });
    }

    records
}

/// Build a sparse voxel octree of maximum depth `depth` over `triangles`,
/// returned as a flat word blob (see the SVO blob layout in the crate's
/// design notes).
///
/// # Panics
/// Panics if `triangles` is empty, `depth == 0`, or `depth > 30`.
pub fn build_svo(triangles: &[Triangle], depth: u32) -> Vec<u32> {
    assert!(!triangles.is_empty(), "build_svo requires at least one triangle");
    assert!(depth > 0 && depth <= 30, "depth must be in 1..=30, got {depth}");

    log::debug!("build_svo: {} triangles, depth={}", triangles.len(), depth);

    let leaf_side = 1u32 << depth;
    let grid = voxel::VoxelGrid::build(triangles, leaf_side);
    let (nx, ny, nz) = grid.dims;
    let grid_max = grid.origin + vec3f(nx as f32, ny as f32, nz as f32) * grid.voxel_size;

    let mut root = SvoNode::new(grid.origin, grid_max, depth);
    let mut node_count = 1u32;

    for z in 0..nz {
        for y in 0..ny {
            for x in 0..nx {
                let voxel = grid.voxel(x, y, z);
                if voxel.count == 0 {
                    continue;
                }
                let center = grid.origin
                    + vec3f(
                        (x as f32 + 0.5) * grid.voxel_size,
                        (y as f32 + 0.5) * grid.voxel_size,
                        (z as f32 + 0.5) * grid.voxel_size,
                    );
                let normal = voxel.normal_sum * (1.0 / voxel.count as f32);
                root.insert_voxel(center, normal, &mut node_count);
            }
        }
    }

    let mut removed = 0u32;
    root.simplify(depth, &mut removed);

    let records = serialize(&root);

    log::debug!(
        "build_svo: inserted_nodes={}, emitted_nodes={}, simplified_away={}",
        node_count, records.len(), removed
    );

    let mut bw = BlobWriter::with_capacity(8 + 4 * records.len());
    bw.push_f32_slice(&[grid.origin.0, grid.origin.1, grid.origin.2]);
    bw.push_f32_slice(&[grid_max.0, grid_max.1, grid_max.2]);
    bw.push_u32(leaf_side);
    bw.push_u32(records.len() as u32);

    for r in &records {
        let packed = (r.mask as u32) | ((r.is_leaf as u32) << 8) | (r.first_child_offset << 9);
        bw.push_u32(packed);
        bw.push_f32_slice(&[r.normal.0, r.normal.1, r.normal.2]);
    }

    bw.into_vec()
}

#[cfg(test)]
mod svo_test {
    use super::*;
    use crate::data_structures::vector::vec3f;

    fn box_triangles(min: Vec3f32, max: Vec3f32) -> Vec<Triangle> {
        // Six axis-aligned quads (two triangles each) forming a closed box.
        let (x0, y0, z0) = (min.0, min.1, min.2);
        let (x1, y1, z1) = (max.0, max.1, max.2);
        let v = |x: f32, y: f32, z: f32| vec3f(x, y, z);
        vec![
            // -z and +z faces
            Triangle::new(v(x0, y0, z0), v(x1, y0, z0), v(x1, y1, z0)),
            Triangle::new(v(x0, y0, z0), v(x1, y1, z0), v(x0, y1, z0)),
            Triangle::new(v(x0, y0, z1), v(x1, y1, z1), v(x1, y0, z1)),
            Triangle::new(v(x0, y0, z1), v(x0, y1, z1), v(x1, y1, z1)),
            // -y and +y faces
            Triangle::new(v(x0, y0, z0), v(x1, y0, z1), v(x1, y0, z0)),
            Triangle::new(v(x0, y0, z0), v(x0, y0, z1), v(x1, y0, z1)),
            Triangle::new(v(x0, y1, z0), v(x1, y1, z0), v(x1, y1, z1)),
            Triangle::new(v(x0, y1, z0), v(x1, y1, z1), v(x0, y1, z1)),
            // -x and +x faces
            Triangle::new(v(x0, y0, z0), v(x0, y1, z0), v(x0, y1, z1)),
            Triangle::new(v(x0, y0, z0), v(x0, y1, z1), v(x0, y0, z1)),
            Triangle::new(v(x1, y0, z0), v(x1, y1, z1), v(x1, y1, z0)),
            Triangle::new(v(x1, y0, z0), v(x1, y0, z1), v(x1, y1, z1)),
        ]
    }

    #[test]
    fn box_at_depth_three_serializes_with_root_record() {
        let tris = box_triangles(vec3f(0.0, 0.0, 0.0), vec3f(4.0, 4.0, 4.0));
        let blob = build_svo(&tris, 3);

        let leaf_side = blob[6];
        let node_count = blob[7];
        assert_eq!(leaf_side, 8);
        assert!(node_count >= 1);

        let root_packed = blob[8];
        let root_mask = root_packed & 0xFF;
        let root_is_leaf = (root_packed >> 8) & 0x1;
        // A voxelized box should occupy multiple octants unless fully
        // simplified; either a populated mask or a collapsed leaf root
        // is an acceptable outcome depending on normal coherence.
        assert!(root_mask != 0 || root_is_leaf == 1);
    }

    #[test]
    #[should_panic]
    fn zero_depth_panics() {
        let tris = box_triangles(vec3f(0.0, 0.0, 0.0), vec3f(1.0, 1.0, 1.0));
        build_svo(&tris, 0);
    }
}
