//! Dataset → weighted arena tree.

use tracing::{debug, warn};

use crate::error::DatasetError;
use crate::model::{DatasetNode, NodeId, Tree, TreeNode};

/// Build the tree and roll weights up from the leaves.
///
/// A record with non-empty `children` is a group; any `weight` it carries is
/// ignored. Every other record is a leaf and must have a finite, non-negative
/// `weight`.
pub fn build(root: &DatasetNode) -> Result<Tree, DatasetError> {
    let mut nodes = Vec::with_capacity(64);
    let root_id = insert(root, None, 0, &root.name, &mut nodes)?;
    let mut tree = Tree { root: root_id, nodes };
    rollup(&mut tree);
    debug!(nodes = tree.len(), total = tree.total(), "hierarchy built");
    Ok(tree)
}

fn insert(
    record: &DatasetNode,
    parent: Option<NodeId>,
    depth: u16,
    path: &str,
    nodes: &mut Vec<TreeNode>,
) -> Result<NodeId, DatasetError> {
    let id = NodeId(nodes.len() as u32);
    let children = record.children.as_deref().unwrap_or_default();

    let weight = if children.is_empty() {
        match record.weight {
            None => {
                return Err(DatasetError::MissingWeight {
                    path: path.to_string(),
                })
            }
            Some(w) if !w.is_finite() || w < 0.0 => {
                return Err(DatasetError::InvalidWeight {
                    path: path.to_string(),
                    weight: w,
                })
            }
            Some(w) => w,
        }
    } else {
        if let Some(w) = record.weight {
            warn!(path, weight = w, "ignoring weight on a group; using the sum of its children");
        }
        0.0
    };

    nodes.push(TreeNode {
        id,
        parent,
        name: record.name.clone(),
        code: record.code.clone(),
        color: record.color.clone(),
        weight,
        value: weight,
        depth,
        children: Vec::with_capacity(children.len()),
    });

    let mut ids = Vec::with_capacity(children.len());
    for child in children {
        let child_path = format!("{path}/{}", child.name);
        ids.push(insert(child, Some(id), depth + 1, &child_path, nodes)?);
    }
    nodes[id.index()].children = ids;
    Ok(id)
}

/// Children sit at higher indices than parents, so a reverse sweep sees every
/// subtree complete before its parent.
fn rollup(tree: &mut Tree) {
    for i in (0..tree.nodes.len()).rev() {
        if tree.nodes[i].is_leaf() {
            continue;
        }
        let total: f64 = tree.nodes[i]
            .children
            .iter()
            .map(|c| tree.nodes[c.index()].value)
            .sum();
        tree.nodes[i].value = total;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn europe() -> DatasetNode {
        DatasetNode::group(
            "Root",
            None,
            vec![DatasetNode::group(
                "Europe",
                Some("#aaa"),
                vec![
                    DatasetNode::leaf("France", "FR", 10.0),
                    DatasetNode::leaf("Germany", "DE", 20.0),
                ],
            )],
        )
    }

    fn world() -> DatasetNode {
        DatasetNode::group(
            "World",
            None,
            vec![
                DatasetNode::group(
                    "Asia",
                    Some("#f00"),
                    vec![
                        DatasetNode::leaf("China", "CN", 18.5),
                        DatasetNode::leaf("Japan", "JP", 4.25),
                        DatasetNode::leaf("Nepal", "NP", 0.0),
                    ],
                ),
                DatasetNode::group(
                    "Oceania",
                    Some("#0f0"),
                    vec![DatasetNode::group(
                        "Pacific",
                        None,
                        vec![
                            DatasetNode::leaf("Fiji", "FJ", 0.3),
                            DatasetNode::leaf("Samoa", "WS", 0.2),
                        ],
                    )],
                ),
            ],
        )
    }

    #[test]
    fn rolls_up_the_two_country_scenario() {
        let tree = build(&europe()).unwrap();
        assert_eq!(tree.total(), 30.0);
        let europe = tree.top_level().next().unwrap();
        assert_eq!(europe.value, 30.0);
        let leaves: Vec<f64> = tree.leaves().iter().map(|id| tree.get(*id).value).collect();
        assert_eq!(leaves, vec![10.0, 20.0]);
    }

    #[test]
    fn internal_values_equal_sum_of_children() {
        let tree = build(&world()).unwrap();
        for node in &tree.nodes {
            if node.is_leaf() {
                continue;
            }
            let sum: f64 = tree.children(node.id).map(|c| c.value).sum();
            assert!((node.value - sum).abs() < 1e-12, "{}", node.name);
        }
        let leaf_sum: f64 = tree.leaves().iter().map(|id| tree.get(*id).weight).sum();
        assert!((tree.total() - leaf_sum).abs() < 1e-12);
    }

    #[test]
    fn preserves_input_order_and_parent_links() {
        let tree = build(&world()).unwrap();
        let names: Vec<&str> = tree
            .leaves()
            .iter()
            .map(|id| tree.get(*id).name.as_str())
            .collect();
        assert_eq!(names, ["China", "Japan", "Nepal", "Fiji", "Samoa"]);
        for node in &tree.nodes {
            if let Some(p) = node.parent {
                assert!(p.index() < node.id.index());
                assert!(tree.get(p).children.contains(&node.id));
                assert_eq!(node.depth, tree.get(p).depth + 1);
            }
        }
    }

    #[test]
    fn nested_leaves_inherit_the_group_color() {
        let tree = build(&world()).unwrap();
        let fiji = tree
            .nodes
            .iter()
            .find(|n| n.name == "Fiji")
            .unwrap();
        assert_eq!(tree.inherited_color(fiji.id), Some("#0f0"));
        assert_eq!(tree.path(fiji.id), "World/Oceania/Pacific/Fiji");
        assert_eq!(tree.inherited_color(tree.root), None);
    }

    #[test]
    fn rebuilding_is_idempotent() {
        let data = world();
        assert_eq!(build(&data).unwrap(), build(&data).unwrap());
    }

    #[test]
    fn leaf_without_weight_is_rejected() {
        let mut data = europe();
        data.children.as_mut().unwrap()[0]
            .children
            .as_mut()
            .unwrap()
            .push(DatasetNode {
                name: "Atlantis".into(),
                ..Default::default()
            });
        match build(&data) {
            Err(DatasetError::MissingWeight { path }) => assert_eq!(path, "Root/Europe/Atlantis"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn empty_group_counts_as_a_leaf_without_weight() {
        let data = DatasetNode::group("Root", None, vec![DatasetNode::group("Void", None, vec![])]);
        assert!(matches!(build(&data), Err(DatasetError::MissingWeight { .. })));
    }

    #[test]
    fn negative_and_nan_weights_are_rejected() {
        for bad in [-1.0, f64::NAN, f64::INFINITY] {
            let data = DatasetNode::group("Root", None, vec![DatasetNode::leaf("X", "X", bad)]);
            assert!(matches!(build(&data), Err(DatasetError::InvalidWeight { .. })));
        }
    }

    #[test]
    fn group_weight_is_ignored() {
        let mut data = europe();
        data.children.as_mut().unwrap()[0].weight = Some(1000.0);
        let tree = build(&data).unwrap();
        assert_eq!(tree.total(), 30.0);
    }

    #[test]
    fn a_bare_leaf_root_is_a_single_node_tree() {
        let tree = build(&DatasetNode::leaf("Solo", "SO", 4.0)).unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.leaves(), vec![tree.root]);
        assert_eq!(tree.total(), 4.0);
    }
}
