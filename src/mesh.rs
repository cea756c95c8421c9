///
/// Boundary adapter between the host's flat triangle array and this
/// crate's `Triangle` type. No file I/O, no `.obj` parsing: the host
/// owns mesh loading, this crate only owns the three build pipelines.

use crate::data_structures::triangle::Triangle;
use crate::data_structures::vector::vec3f;

/// Converts a flat `[p1x, p1y, p1z, p2x, p2y, p2z, p3x, p3y, p3z] x T`
/// array into owned `Triangle` values.
///
/// # Panics
/// Panics if `flat.len()` is not a multiple of 9.
pub fn triangles_from_flat(flat: &[f32]) -> Vec<Triangle> {
    assert!(flat.len() % 9 == 0, "triangle float array length must be a multiple of 9, got {}", flat.len());

    flat.chunks_exact(9)
        .map(|v| {
            Triangle::new(
                vec3f(v[0], v[1], v[2]),
                vec3f(v[3], v[4], v[5]),
                vec3f(v[6], v[7], v[8]),
            )
        })
        .collect()
}
