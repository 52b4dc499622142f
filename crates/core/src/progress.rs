use serde::Serialize;

use crate::model::NodeId;

/// Outcome of relaxing the children of one group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Convergence {
    pub node: NodeId,
    pub sites: usize,
    pub iterations: usize,
    /// Sum of |area - target| over the children, relative to the group's area.
    pub area_error: f64,
    pub converged: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Progress {
    pub groups: usize,
    pub iterations: usize,
    pub worst_error: f64,
    pub unconverged: usize,
}

impl Progress {
    pub fn from_levels(levels: &[Convergence]) -> Self {
        levels.iter().fold(Progress::default(), |mut acc, c| {
            acc.groups += 1;
            acc.iterations += c.iterations;
            acc.worst_error = acc.worst_error.max(c.area_error);
            if !c.converged {
                acc.unconverged += 1;
            }
            acc
        })
    }
}
