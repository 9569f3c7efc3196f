use crate::{Node, NodeId, Status, Symbol};
use serde::{Deserialize, Serialize};

/// A detached, serializable copy of a tree's debug surface, for visualizers
/// that live outside the ticking thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub id: NodeId,
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<Symbol>,
    pub last_status: Option<Status>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSnapshot>,
}

impl NodeSnapshot {
    pub fn capture<A>(node: &Node<A>) -> Self {
        Self {
            id: node.id(),
            kind: node.kind().to_owned(),
            label: node.label(),
            last_status: node.last_status(),
            children: node.children().into_iter().map(Self::capture).collect(),
        }
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Pre-order iteration over this snapshot and all its descendants.
    pub fn iter(&self) -> impl Iterator<Item = &NodeSnapshot> + '_ {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            stack.extend(next.children.iter().rev());
            Some(next)
        })
    }
}
