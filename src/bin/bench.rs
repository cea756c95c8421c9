///
/// Ambient benchmark binary: builds all three acceleration structures
/// over a handful of procedurally generated meshes and reports timing
/// (no `.obj` loading — that's a host concern, out of scope for this
/// crate).

use std::time::{Duration, Instant};

use accel_builder::data_structures::vector::vec3f;
use accel_builder::data_structures::triangle::Triangle;

#[derive(Debug, Default)]
struct BuildTimes {
    bvh: Duration,
    voxel_grid: Duration,
    svo: Duration,
}

impl BuildTimes {
    fn display(&self, label: &str, triangle_count: usize) {
        log::info!(
            "{label}: {triangle_count} triangles — bvh {:?}, voxel_grid {:?}, svo {:?}",
            self.bvh, self.voxel_grid, self.svo
        );
    }
}

/// Generate a grid of disjoint unit triangles, cheap stand-in for a
/// real mesh fixture since this crate carries no `.obj` loader.
fn synthetic_mesh(triangles_per_axis: u32) -> Vec<Triangle> {
    let mut triangles = Vec::with_capacity((triangles_per_axis * triangles_per_axis) as usize);
    for x in 0..triangles_per_axis {
        for y in 0..triangles_per_axis {
            let ox = x as f32 * 2.0;
            let oy = y as f32 * 2.0;
            triangles.push(Triangle::new(
                vec3f(ox, oy, 0.0),
                vec3f(ox + 1.0, oy, 0.0),
                vec3f(ox, oy + 1.0, 0.0),
            ));
        }
    }
    triangles
}

fn run(label: &str, triangles: &[Triangle]) -> anyhow::Result<()> {
    let mut times = BuildTimes::default();

    let start = Instant::now();
    let bvh_blob = accel_builder::build_bvh(triangles, 4);
    times.bvh = start.elapsed();

    let start = Instant::now();
    let grid_blob = accel_builder::build_voxel_grid(triangles, 32);
    times.voxel_grid = start.elapsed();

    let start = Instant::now();
    let svo_blob = accel_builder::build_svo(triangles, 5);
    times.svo = start.elapsed();

    times.display(label, triangles.len());
    log::info!(
        "{label}: bvh_words={}, grid_words={}, svo_words={}",
        bvh_blob.len(), grid_blob.len(), svo_blob.len()
    );

    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    for size in [4u32, 8, 16] {
        let triangles = synthetic_mesh(size);
        run(&format!("grid-{size}x{size}"), &triangles)?;
    }

    Ok(())
}
