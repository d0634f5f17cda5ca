//! Layout validity gate: worst-case nearest-neighbor distance.

use crate::mapgen::Beacon;

/// Returns the most isolated beacon's distance to its nearest neighbor.
///
/// The modern map variant re-rolls any layout where this exceeds
/// [`crate::constants::ISOLATION_THRESHOLD`], which is what keeps every
/// beacon reachable. Zero or one beacon yields 0.
#[must_use]
pub fn max_isolation(beacons: &[Beacon]) -> f64 {
    let mut result = 0.0f64;

    for (i, a) in beacons.iter().enumerate() {
        let mut min_dist: Option<f64> = None;
        for (j, b) in beacons.iter().enumerate() {
            if i == j {
                continue;
            }
            let d = f64::from(a.x - b.x).hypot(f64::from(a.y - b.y));
            min_dist = Some(min_dist.map_or(d, |m: f64| m.min(d)));
        }
        if let Some(d) = min_dist {
            result = result.max(d);
        }
    }

    result
}
