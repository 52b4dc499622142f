use serde::{Deserialize, Serialize};

/// One record of the input document. Leaves carry `weight`, groups carry
/// `children` and usually a `color`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DatasetNode {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<DatasetNode>>,
}

impl DatasetNode {
    pub fn leaf(name: &str, code: &str, weight: f64) -> Self {
        Self {
            name: name.to_string(),
            code: Some(code.to_string()),
            weight: Some(weight),
            ..Default::default()
        }
    }

    pub fn group(name: &str, color: Option<&str>, children: Vec<DatasetNode>) -> Self {
        Self {
            name: name.to_string(),
            color: color.map(str::to_string),
            children: Some(children),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    pub name: String,
    pub code: Option<String>,
    pub color: Option<String>,
    /// Weight as given in the dataset. Only meaningful for leaves.
    pub weight: f64,
    /// Rolled-up weight: the leaf weight, or the sum over the subtree.
    pub value: f64,
    pub depth: u16,
    pub children: Vec<NodeId>,
}

impl TreeNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Flat arena; a parent always sits at a lower index than its children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Tree {
    pub root: NodeId,
    pub nodes: Vec<TreeNode>,
}

impl Tree {
    pub fn get(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id.index()]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &TreeNode> + '_ {
        self.get(id).children.iter().map(move |c| self.get(*c))
    }

    /// Children of the root, in input order. These are the legend groups.
    pub fn top_level(&self) -> impl Iterator<Item = &TreeNode> + '_ {
        self.children(self.root)
    }

    /// Leaves in preorder, which is input order.
    pub fn leaves(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|n| n.is_leaf())
            .map(|n| n.id)
            .collect()
    }

    /// Color of the node itself or its nearest colored ancestor.
    pub fn inherited_color(&self, id: NodeId) -> Option<&str> {
        let mut cur = Some(id);
        while let Some(cid) = cur {
            let node = self.get(cid);
            if let Some(color) = node.color.as_deref() {
                return Some(color);
            }
            cur = node.parent;
        }
        None
    }

    /// Slash-joined names from the root down to `id`.
    pub fn path(&self, id: NodeId) -> String {
        let mut names = Vec::new();
        let mut cur = Some(id);
        while let Some(cid) = cur {
            let node = self.get(cid);
            names.push(node.name.as_str());
            cur = node.parent;
        }
        names.reverse();
        names.join("/")
    }

    pub fn total(&self) -> f64 {
        self.nodes.get(self.root.index()).map_or(0.0, |n| n.value)
    }
}
