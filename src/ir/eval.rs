use indexmap::IndexMap;

use crate::ir::binary_fn::BinaryFn;
use crate::ir::eval_error::EvalError;
use crate::ir::node::{IrNode, IrTree};

/// Arena evaluator over an absorbed operator table.
///
/// Nodes are visited once in id order. Children always precede their parent,
/// so both operands are ready when a binary node is reached and the left
/// subtree, built first by the parser, is evaluated before the right. Nothing
/// recurses, so a chain of any length evaluates in constant stack.
pub struct Evaluator<'a> {
    ops: &'a IndexMap<String, BinaryFn>,
}

impl<'a> Evaluator<'a> {
    pub fn new(ops: &'a IndexMap<String, BinaryFn>) -> Self {
        Self { ops }
    }

    pub fn evaluate(&self, tree: &IrTree) -> Result<f64, EvalError> {
        // empty when the root is missing or outside the arena
        let live = tree.reference_counts();
        if live.is_empty() {
            return Err(EvalError::NullNode);
        }

        let mut values = vec![0.0; live.len()];
        for (i, node) in tree.nodes[..live.len()].iter().enumerate() {
            if live[i] == 0 {
                continue;
            }
            values[i] = match node {
                IrNode::Literal(v) => *v,
                IrNode::Binary { op, left, right } => {
                    if left.0 >= i || right.0 >= i {
                        return Err(EvalError::InvalidStructure(i));
                    }
                    let f = self
                        .ops
                        .get(op.as_str())
                        .ok_or_else(|| EvalError::UnknownOperator(op.clone()))?;
                    f.apply(values[left.0], values[right.0])
                }
            };
        }

        values.last().copied().ok_or(EvalError::NullNode)
    }
}
