//! Voronoi treemap partitioning.
//!
//! The boundary is split among the root's children, then each child's cell
//! among its own children, and so on down to the leaves. One split is a
//! *Voronoi map*: sites start at random points, and every iteration moves
//! each site to its cell's centroid and nudges its power weight towards the
//! area it is owed, until the total area error is small enough.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::TreemapConfig;
use crate::error::PartitionError;
use crate::geometry::{Point, Polygon};
use crate::model::{NodeId, Tree};
use crate::power::{fix_overweighted, power_cells, Site, WEIGHT_EPSILON};
use crate::progress::{Convergence, Progress};

const SAMPLING_ATTEMPTS: usize = 1000;

/// Region assigned to a node plus the site that drove it, used for labels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cell {
    pub polygon: Polygon,
    pub site: Point,
}

/// Cells for every node of a tree, indexed by `NodeId`.
#[derive(Debug, Clone, Serialize)]
pub struct Treemap {
    pub boundary: Polygon,
    pub cells: Vec<Option<Cell>>,
    pub levels: Vec<Convergence>,
}

impl Treemap {
    pub fn cell(&self, id: NodeId) -> Option<&Cell> {
        self.cells.get(id.index()).and_then(Option::as_ref)
    }

    /// Combined area of the leaf cells; equals the boundary area when the
    /// partition tiles it.
    pub fn leaf_area(&self, tree: &Tree) -> f64 {
        tree.leaves()
            .into_iter()
            .filter_map(|id| self.cell(id))
            .map(|c| c.polygon.area())
            .sum()
    }

    pub fn progress(&self) -> Progress {
        Progress::from_levels(&self.levels)
    }
}

/// Anything that can assign every node of a weighted tree a cell inside a
/// boundary, with leaf areas proportional to leaf values.
pub trait Partitioner {
    fn partition(&self, tree: &Tree, boundary: &Polygon) -> Result<Treemap, PartitionError>;
}

#[derive(Debug, Clone, Default)]
pub struct VoronoiTreemap {
    config: TreemapConfig,
}

impl VoronoiTreemap {
    pub fn new(config: TreemapConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TreemapConfig {
        &self.config
    }
}

impl Partitioner for VoronoiTreemap {
    fn partition(&self, tree: &Tree, boundary: &Polygon) -> Result<Treemap, PartitionError> {
        if boundary.is_degenerate() {
            return Err(PartitionError::DegenerateBoundary);
        }
        if tree.is_empty() || tree.total() <= 0.0 {
            return Err(PartitionError::EmptyTree);
        }

        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut cells: Vec<Option<Cell>> = vec![None; tree.len()];
        cells[tree.root.index()] = Some(Cell {
            polygon: boundary.clone(),
            site: boundary.centroid().unwrap_or_default(),
        });
        let mut levels = Vec::new();

        // Arena order visits every parent before its children.
        for node in &tree.nodes {
            if node.is_leaf() {
                continue;
            }
            let Some(parent) = cells[node.id.index()].clone() else {
                continue;
            };
            let weights: Vec<f64> = tree.children(node.id).map(|c| c.value).collect();

            let (child_cells, mut convergence) = if parent.polygon.is_degenerate() {
                warn!(group = %tree.path(node.id), "group cell is empty; children get no area");
                let empty = Cell {
                    polygon: Polygon::default(),
                    site: parent.site,
                };
                (vec![empty; weights.len()], stalled(weights.len()))
            } else {
                voronoi_map(&parent, &weights, &self.config, &mut rng)
            };
            convergence.node = node.id;
            debug!(
                group = %node.name,
                sites = convergence.sites,
                iterations = convergence.iterations,
                area_error = convergence.area_error,
                "group partitioned"
            );
            if !convergence.converged {
                warn!(group = %tree.path(node.id), area_error = convergence.area_error, "partition did not converge");
            }
            levels.push(convergence);

            for (child, cell) in node.children.iter().zip(child_cells) {
                cells[child.index()] = Some(cell);
            }
        }

        let treemap = Treemap {
            boundary: boundary.clone(),
            cells,
            levels,
        };
        let progress = treemap.progress();
        info!(
            groups = progress.groups,
            iterations = progress.iterations,
            worst_error = progress.worst_error,
            "treemap computed"
        );
        Ok(treemap)
    }
}

fn stalled(sites: usize) -> Convergence {
    Convergence {
        node: NodeId::default(),
        sites,
        iterations: 0,
        area_error: 1.0,
        converged: false,
    }
}

/// Split one cell among sites with the given weights.
fn voronoi_map(
    parent: &Cell,
    weights: &[f64],
    config: &TreemapConfig,
    rng: &mut StdRng,
) -> (Vec<Cell>, Convergence) {
    let clip = &parent.polygon;
    let total_area = clip.area();

    if weights.len() == 1 {
        let cell = Cell {
            polygon: clip.clone(),
            site: clip.centroid().unwrap_or(parent.site),
        };
        let done = Convergence {
            node: NodeId::default(),
            sites: 1,
            iterations: 0,
            area_error: 0.0,
            converged: true,
        };
        return (vec![cell], done);
    }

    let targets = target_areas(weights, config.min_weight_ratio, total_area);
    let initial_weight = total_area / weights.len() as f64 / 2.0;
    let mut sites: Vec<Site> = (0..weights.len())
        .map(|_| Site::new(random_point_in(clip, parent.site, rng), initial_weight))
        .collect();

    let mut polygons = power_cells(&sites, clip);
    let mut error = area_error(&polygons, &targets) / total_area;
    let mut iterations = 0;
    while error >= config.convergence_ratio && iterations < config.max_iterations {
        iterations += 1;
        adapt_positions(&mut sites, &polygons);
        fix_overweighted(&mut sites);
        polygons = power_cells(&sites, clip);
        adapt_weights(&mut sites, &polygons, &targets, config.flickering_influence);
        fix_overweighted(&mut sites);
        polygons = power_cells(&sites, clip);
        error = area_error(&polygons, &targets) / total_area;
    }

    let cells = polygons
        .into_iter()
        .zip(&sites)
        .map(|(polygon, site)| Cell {
            polygon,
            site: site.position,
        })
        .collect();
    let convergence = Convergence {
        node: NodeId::default(),
        sites: weights.len(),
        iterations,
        area_error: error,
        converged: error < config.convergence_ratio,
    };
    (cells, convergence)
}

/// Areas owed to each site. Very light siblings are raised to
/// `min_ratio · heaviest` so they still get a visible cell.
fn target_areas(weights: &[f64], min_ratio: f64, area: f64) -> Vec<f64> {
    let max = weights.iter().copied().fold(0.0, f64::max);
    let adjusted: Vec<f64> = if max <= 0.0 {
        vec![1.0; weights.len()]
    } else {
        weights.iter().map(|w| w.max(max * min_ratio)).collect()
    };
    let sum: f64 = adjusted.iter().sum();
    adjusted.into_iter().map(|w| w / sum * area).collect()
}

fn area_error(polygons: &[Polygon], targets: &[f64]) -> f64 {
    polygons
        .iter()
        .zip(targets)
        .map(|(p, t)| (p.area() - t).abs())
        .sum()
}

fn adapt_positions(sites: &mut [Site], polygons: &[Polygon]) {
    for (site, polygon) in sites.iter_mut().zip(polygons) {
        if polygon.is_degenerate() {
            continue;
        }
        if let Some(c) = polygon.centroid() {
            site.position = c;
        }
    }
}

fn adapt_weights(sites: &mut [Site], polygons: &[Polygon], targets: &[f64], influence: f64) {
    for ((site, polygon), target) in sites.iter_mut().zip(polygons).zip(targets) {
        let current = polygon.area();
        let ratio = if current > f64::EPSILON {
            target / current
        } else {
            f64::INFINITY
        };
        let ratio = ratio.clamp(1.0 - influence, 1.0 + influence);
        site.weight = (site.weight * ratio).max(WEIGHT_EPSILON);
    }
}

/// Uniform sample by rejection from the bounding box, falling back to a
/// point between the centroid and a random vertex, which is inside any
/// convex polygon.
fn random_point_in(polygon: &Polygon, fallback: Point, rng: &mut StdRng) -> Point {
    let Some((lo, hi)) = polygon.bounds() else {
        return fallback;
    };
    for _ in 0..SAMPLING_ATTEMPTS {
        let p = Point::new(rng.gen_range(lo.x..=hi.x), rng.gen_range(lo.y..=hi.y));
        if polygon.contains(p) {
            return p;
        }
    }
    let center = polygon.centroid().unwrap_or(fallback);
    let vertex = polygon.points[rng.gen_range(0..polygon.len())];
    center.lerp(vertex, rng.gen_range(0.0..0.9))
}
