///
/// Dense voxel grid construction: sizing from a target resolution,
/// conservative triangle rasterization via the Akenine-Möller SAT test,
/// and serialization into the voxel-grid blob.

use crate::blob::BlobWriter;
use crate::data_structures::bbox::Bbox;
use crate::data_structures::triangle::Triangle;
use crate::data_structures::vector::{vec3f, Vec3f32};

#[derive(Debug, Clone, Copy, Default)]
pub struct Voxel {
    pub count: u32,
    pub normal_sum: Vec3f32,
}

#[derive(Debug, Clone)]
pub struct VoxelGrid {
    pub origin: Vec3f32,
    pub dims: (u32, u32, u32),
    pub voxel_size: f32,
    pub voxels: Vec<Voxel>,
}

impl VoxelGrid {
    pub(crate) fn index(&self, x: u32, y: u32, z: u32) -> usize {
        let (nx, ny, _nz) = self.dims;
        (z as usize * nx as usize * ny as usize) + (y as usize * nx as usize) + x as usize
    }

    pub(crate) fn voxel(&self, x: u32, y: u32, z: u32) -> Voxel {
        self.voxels[self.index(x, y, z)]
    }

    /// Compute the sizing described in the construction steps: grid
    /// origin, dimensions, and uniform voxel size for a target `size`
    /// resolution along the mesh's longest extent.
    pub(crate) fn sizing(triangles: &[Triangle], size: u32) -> (Bbox, (u32, u32, u32), f32) {
        let mut bounds = Bbox::new();
        for t in triangles {
            bounds.include_bbox(&t.bounding_box());
        }

        let voxel_size = bounds.max_extent() / (size as f32 - 1.0);

        let half = vec3f(voxel_size * 0.5, voxel_size * 0.5, voxel_size * 0.5);
        bounds.min = bounds.min - half;
        bounds.max = bounds.max + half;

        let voxel_size = bounds.max_extent() / size as f32;

        let extent = bounds.extent();
        let nx = (extent.0 / voxel_size).ceil() as u32;
        let ny = (extent.1 / voxel_size).ceil() as u32;
        let nz = (extent.2 / voxel_size).ceil() as u32;

        bounds.max = bounds.min + vec3f(nx as f32, ny as f32, nz as f32) * voxel_size;

        (bounds, (nx, ny, nz), voxel_size)
    }

    /// Build a dense grid over `triangles` at a target `size` resolution
    /// along the mesh's longest extent: sizes the grid, then rasterizes
    /// every triangle into it via conservative AABB-vs-triangle SAT.
    pub(crate) fn build(triangles: &[Triangle], size: u32) -> VoxelGrid {
        let (bounds, dims, voxel_size) = Self::sizing(triangles, size);
        let (nx, ny, nz) = dims;
        let mut grid = VoxelGrid {
            origin: bounds.min,
            dims,
            voxel_size,
            voxels: vec![Voxel::default(); nx as usize * ny as usize * nz as usize],
        };
        grid.rasterize(triangles);
        grid
    }

    fn rasterize(&mut self, triangles: &[Triangle]) {
        let (nx, ny, nz) = self.dims;
        let half = self.voxel_size * 0.5;
        let half_extents = vec3f(half, half, half);

        for t in triangles {
            let (x0, y0, z0) = index_of(t.p0, self.origin, self.voxel_size);
            let (x1, y1, z1) = index_of(t.p1, self.origin, self.voxel_size);
            let (x2, y2, z2) = index_of(t.p2, self.origin, self.voxel_size);

            let lo_x = x0.min(x1).min(x2).max(0) as u32;
            let lo_y = y0.min(y1).min(y2).max(0) as u32;
            let lo_z = z0.min(z1).min(z2).max(0) as u32;
            let hi_x = (x0.max(x1).max(x2)).min(nx as i64 - 1).max(0) as u32;
            let hi_y = (y0.max(y1).max(y2)).min(ny as i64 - 1).max(0) as u32;
            let hi_z = (z0.max(z1).max(z2)).min(nz as i64 - 1).max(0) as u32;

            let normal = t.normal();

            for z in lo_z..=hi_z {
                for y in lo_y..=hi_y {
                    for x in lo_x..=hi_x {
                        let center = self.origin
                            + vec3f(
                                (x as f32 + 0.5) * self.voxel_size,
                                (y as f32 + 0.5) * self.voxel_size,
                                (z as f32 + 0.5) * self.voxel_size,
                            );
                        if t.intersects_box(center, half_extents) {
                            let idx = self.index(x, y, z);
                            self.voxels[idx].count += 1;
                            self.voxels[idx].normal_sum = self.voxels[idx].normal_sum + normal;
                        }
                    }
                }
            }
        }
    }
}

fn index_of(point: Vec3f32, origin: Vec3f32, voxel_size: f32) -> (i64, i64, i64) {
    (
        ((point.0 - origin.0) / voxel_size).floor() as i64,
        ((point.1 - origin.1) / voxel_size).floor() as i64,
        ((point.2 - origin.2) / voxel_size).floor() as i64,
    )
}

/// Build a dense voxel grid over `triangles` at a target `size`
/// resolution along the mesh's longest extent, returned as a flat word
/// blob (see the voxel-grid blob layout in the crate's design notes).
///
/// # Panics
/// Panics if `triangles` is empty or `size < 2`.
pub fn build_voxel_grid(triangles: &[Triangle], size: u32) -> Vec<u32> {
    assert!(!triangles.is_empty(), "build_voxel_grid requires at least one triangle");
    assert!(size >= 2, "size must be at least 2, got {size}");

    log::debug!("build_voxel_grid: {} triangles, size={}", triangles.len(), size);

    let grid = VoxelGrid::build(triangles, size);

    log::debug!(
        "build_voxel_grid: dims=({},{},{}), voxel_size={}",
        grid.dims.0, grid.dims.1, grid.dims.2, grid.voxel_size
    );

    let (nx, ny, nz) = grid.dims;
    let mut bw = BlobWriter::with_capacity(7 + 4 * nx as usize * ny as usize * nz as usize);
    bw.push_f32_slice(&[grid.origin.0, grid.origin.1, grid.origin.2]);
    bw.push_u32(nx);
    bw.push_u32(ny);
    bw.push_u32(nz);
    bw.push_f32(grid.voxel_size);

    for z in 0..nz {
        for y in 0..ny {
            for x in 0..nx {
                let voxel = grid.voxel(x, y, z);
                if voxel.count > 0 {
                    let avg = voxel.normal_sum * (1.0 / voxel.count as f32);
                    bw.push_f32_slice(&[avg.0, avg.1, avg.2]);
                    bw.push_u32(1);
                } else {
                    bw.push_f32_slice(&[0.0, 0.0, 0.0]);
                    bw.push_u32(0);
                }
            }
        }
    }

    bw.into_vec()
}

#[cfg(test)]
mod voxel_test {
    use super::*;
    use crate::data_structures::vector::vec3f;

    fn unit_tetrahedron() -> Vec<Triangle> {
        let a = vec3f(0.0, 0.0, 0.0);
        let b = vec3f(1.0, 0.0, 0.0);
        let c = vec3f(0.0, 1.0, 0.0);
        let d = vec3f(0.0, 0.0, 1.0);
        vec![
            Triangle::new(a, c, b),
            Triangle::new(a, b, d),
            Triangle::new(a, d, c),
            Triangle::new(b, c, d),
        ]
    }

    #[test]
    fn tetrahedron_has_at_least_one_filled_voxel() {
        let tris = unit_tetrahedron();
        let blob = build_voxel_grid(&tris, 4);

        let nx = blob[3];
        let ny = blob[4];
        let nz = blob[5];

        let mut any_filled = false;
        for z in 0..nz {
            for y in 0..ny {
                for x in 0..nx {
                    let offset = 7 + 4 * (z * nx * ny + y * nx + x) as usize;
                    if blob[offset + 3] == 1 {
                        any_filled = true;
                    }
                }
            }
        }
        assert!(any_filled);
    }

    #[test]
    #[should_panic]
    fn empty_input_panics() {
        let tris: Vec<Triangle> = vec![];
        build_voxel_grid(&tris, 4);
    }
}
