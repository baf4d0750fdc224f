use serde::{Deserialize, Serialize};

/// Index of a node inside its [`IrTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

/// Intermediate representation node.
///
/// Children are referenced by id and always precede their parent in the
/// arena, so a tree can never contain a cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IrNode {
    /// Numeric literal. Tag: `literal`.
    Literal(f64),

    /// Binary operation. The tag is the operator symbol.
    ///
    /// The operator is only resolved at evaluation time, against whatever
    /// evaluation table is absorbed then.
    Binary {
        op: String,
        left: NodeId,
        right: NodeId,
    },
}

impl IrNode {
    pub const LITERAL_TAG: &'static str = "literal";

    pub fn tag(&self) -> &str {
        match self {
            IrNode::Literal(_) => Self::LITERAL_TAG,
            IrNode::Binary { op, .. } => op,
        }
    }
}

/// Arena holding one parsed expression.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IrTree {
    pub nodes: Vec<IrNode>,
    pub root: Option<NodeId>,
}

impl IrTree {
    pub fn get(&self, id: NodeId) -> Option<&IrNode> {
        self.nodes.get(id.0)
    }

    pub fn root_node(&self) -> Option<&IrNode> {
        self.root.and_then(|id| self.get(id))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Counts, for every node up to the root, how many parents reach it from
    /// the root (the root itself counts once). Unreachable nodes get 0.
    ///
    /// Empty when there is no root or the root is outside the arena. A
    /// binary node whose children do not precede it references nothing.
    /// Children precede parents, so one backward sweep settles every count
    /// without recursion, however deep the tree.
    pub fn reference_counts(&self) -> Vec<usize> {
        let Some(root) = self.root.filter(|r| r.0 < self.nodes.len()) else {
            return Vec::new();
        };

        let mut counts = vec![0; root.0 + 1];
        counts[root.0] = 1;
        for (i, node) in self.nodes[..=root.0].iter().enumerate().rev() {
            if counts[i] == 0 {
                continue;
            }
            if let IrNode::Binary { left, right, .. } = node {
                if left.0 < i && right.0 < i {
                    counts[left.0] += 1;
                    counts[right.0] += 1;
                }
            }
        }
        counts
    }

    /// Renders the tree as a fully parenthesized infix string.
    pub fn to_infix(&self) -> String {
        if self.root.is_none() {
            return String::new();
        }
        let mut counts = self.reference_counts();
        if counts.is_empty() {
            return "?".to_string();
        }

        let mut parts = vec![String::new(); counts.len()];
        for (i, node) in self.nodes[..counts.len()].iter().enumerate() {
            if counts[i] == 0 {
                continue;
            }
            parts[i] = match node {
                IrNode::Literal(v) => format!("{}", v),
                IrNode::Binary { op, left, right } if left.0 < i && right.0 < i => {
                    let l = claim(&mut parts, &mut counts, left.0);
                    let r = claim(&mut parts, &mut counts, right.0);
                    format!("({} {} {})", l, op, r)
                }
                IrNode::Binary { .. } => "?".to_string(),
            };
        }
        parts.pop().unwrap_or_default()
    }
}

/// Hands a rendered child to its parent: moved out on the last reference,
/// cloned while other parents still need it.
pub(crate) fn claim(parts: &mut [String], counts: &mut [usize], id: usize) -> String {
    counts[id] = counts[id].saturating_sub(1);
    if counts[id] == 0 {
        std::mem::take(&mut parts[id])
    } else {
        parts[id].clone()
    }
}

/// Appends nodes to an arena, children first.
#[derive(Debug, Default)]
pub struct IrBuilder {
    nodes: Vec<IrNode>,
}

impl IrBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn literal(&mut self, value: f64) -> NodeId {
        self.add(IrNode::Literal(value))
    }

    pub fn binary(&mut self, op: impl Into<String>, left: NodeId, right: NodeId) -> NodeId {
        self.add(IrNode::Binary {
            op: op.into(),
            left,
            right,
        })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn finish(self, root: NodeId) -> IrTree {
        IrTree {
            nodes: self.nodes,
            root: Some(root),
        }
    }

    fn add(&mut self, node: IrNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }
}
