///
/// Bucket binning and cost sweep for the SAH split search, plus the
/// in-place partition that realizes the chosen split. Kept separate
/// from `build_recursive` so the cost math can be unit tested against
/// the documented tie-break and empty-bucket behavior in isolation.

use crate::data_structures::bbox::Bbox;
use crate::primitive::BvhPrimitive;

#[derive(Debug, Clone, Copy, Default)]
struct Bucket {
    count: u32,
    bounds: Bbox,
    bounds_set: bool,
}

pub struct SplitSearch {
    pub bucket_index: usize,
    pub cost: f32,
}

pub fn bucket_for(centroid: crate::data_structures::vector::Vec3f32, centroid_bounds: &Bbox, axis: u32, n_buckets: usize) -> usize {
    let t = centroid_bounds.offset(centroid)[axis];
    let b = (t * n_buckets as f32) as i64;
    b.clamp(0, n_buckets as i64 - 1) as usize
}

fn bin(span: &[BvhPrimitive], centroid_bounds: &Bbox, axis: u32, n_buckets: usize) -> Vec<Bucket> {
    let mut buckets = vec![Bucket::default(); n_buckets];
    for prim in span {
        let b = bucket_for(prim.centroid, centroid_bounds, axis, n_buckets);
        buckets[b].count += 1;
        if buckets[b].bounds_set {
            buckets[b].bounds.include_bbox(&prim.bounds);
        } else {
            buckets[b].bounds = prim.bounds;
            buckets[b].bounds_set = true;
        }
    }
    buckets
}

/// Evaluate the `n_buckets - 1` candidate splits and return the
/// lowest-cost one, or `None` if every candidate has zero cost (i.e.
/// all primitives fall in a single bucket).
pub fn search_best_split(span: &[BvhPrimitive], centroid_bounds: &Bbox, axis: u32, n_buckets: usize) -> Option<SplitSearch> {
    let buckets = bin(span, centroid_bounds, axis, n_buckets);
    let n_splits = n_buckets - 1;
    let mut costs = vec![0.0f32; n_splits];

    // Prefix sweep: costLeft(i) accumulated into costs[i].
    let mut count_below = 0u32;
    let mut bounds_below = Bbox::new();
    let mut bounds_below_set = false;
    for i in 0..n_splits {
        count_below += buckets[i].count;
        if buckets[i].bounds_set {
            if bounds_below_set {
                bounds_below.include_bbox(&buckets[i].bounds);
            } else {
                bounds_below = buckets[i].bounds;
                bounds_below_set = true;
            }
        }
        let area = if bounds_below_set { bounds_below.surface_area() } else { 0.0 };
        costs[i] = count_below as f32 * area;
    }

    // Suffix sweep: costRight(i) accumulated into costs[i - 1], i.e. for
    // bucket i from the top down, it contributes to split index i - 1.
    let mut count_above = 0u32;
    let mut bounds_above = Bbox::new();
    let mut bounds_above_set = false;
    for i in (1..n_buckets).rev() {
        count_above += buckets[i].count;
        if buckets[i].bounds_set {
            if bounds_above_set {
                bounds_above.include_bbox(&buckets[i].bounds);
            } else {
                bounds_above = buckets[i].bounds;
                bounds_above_set = true;
            }
        }
        let area = if bounds_above_set { bounds_above.surface_area() } else { 0.0 };
        costs[i - 1] += count_above as f32 * area;
    }

    let mut best: Option<SplitSearch> = None;
    for (i, &cost) in costs.iter().enumerate() {
        if cost == 0.0 {
            continue;
        }
        let better = match &best {
            None => true,
            Some(b) => cost < b.cost,
        };
        if better {
            best = Some(SplitSearch { bucket_index: i, cost });
        }
    }
    best
}

/// Move every primitive whose bucket index is greater than
/// `split_bucket` to the tail of `span` via swap-to-tail, returning the
/// index of the first element in the "greater" group.
pub fn partition_span(span: &mut [BvhPrimitive], centroid_bounds: &Bbox, axis: u32, n_buckets: usize, split_bucket: usize) -> usize {
    let len = span.len();
    let mut greater_count = 0usize;
    let mut i = 0usize;
    while i < len - greater_count {
        let b = bucket_for(span[i].centroid, centroid_bounds, axis, n_buckets);
        if b <= split_bucket {
            i += 1;
            continue;
        }
        span.swap(i, len - 1 - greater_count);
        greater_count += 1;
    }
    len - greater_count
}
