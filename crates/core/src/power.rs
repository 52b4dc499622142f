//! Power diagrams clipped to a convex polygon.
//!
//! The power distance from `x` to a site `(p, w)` is `|x - p|² - w`. A site's
//! cell is the set of points closer to it, in that sense, than to any other
//! site. Each cell is the clip polygon cut by one half-plane per rival site,
//! so cells stay convex as long as the clip polygon is.

use rayon::prelude::*;

use crate::geometry::{Point, Polygon};

/// Smallest weight a site may carry after adaptation.
pub const WEIGHT_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Site {
    pub position: Point,
    pub weight: f64,
}

impl Site {
    pub fn new(position: Point, weight: f64) -> Self {
        Self { position, weight }
    }

    pub fn power(&self, x: Point) -> f64 {
        x.distance_squared(self.position) - self.weight
    }
}

/// One cell per site, in site order. Cells of dominated sites come back empty.
pub fn power_cells(sites: &[Site], clip: &Polygon) -> Vec<Polygon> {
    (0..sites.len())
        .into_par_iter()
        .map(|i| cell_of(i, sites, clip))
        .collect()
}

fn cell_of(i: usize, sites: &[Site], clip: &Polygon) -> Polygon {
    let own = sites[i];
    let mut cell = clip.clone();
    for (j, rival) in sites.iter().enumerate() {
        if j == i {
            continue;
        }
        let normal = (rival.position - own.position) * 2.0;
        let offset = rival.position.norm_squared() - own.position.norm_squared() - rival.weight
            + own.weight;
        if normal.norm_squared() == 0.0 {
            // Coincident sites: the heavier one wins, ties go to the lower index.
            if offset < 0.0 || (offset == 0.0 && j < i) {
                return Polygon::default();
            }
            continue;
        }
        cell = cell.clip_half_plane(normal, offset);
        if cell.len() < 3 {
            return Polygon::default();
        }
    }
    cell
}

/// Lower weights until every site lies inside its own cell, i.e.
/// `w_i - w_j <= |p_i - p_j|²` for every pair.
pub fn fix_overweighted(sites: &mut [Site]) {
    let n = sites.len();
    for _ in 0..n.max(1) {
        let mut fixed = false;
        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                let overweight = sites[i].weight
                    - sites[j].weight
                    - sites[i].position.distance_squared(sites[j].position);
                if overweight > 0.0 {
                    sites[i].weight -= overweight + WEIGHT_EPSILON;
                    fixed = true;
                }
            }
        }
        if !fixed {
            break;
        }
    }
}
