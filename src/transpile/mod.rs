//! Template-based lowering of an [`IrTree`] into target-language source.
//!
//! A [`Transpiler`] holds one handler per IR tag. Node tags (`literal`, or the
//! operator symbol of a binary node) are first rewritten through the absorbed
//! IR map, then looked up; binary nodes fall back to the generic `binary`
//! handler. A tag with no handler renders as `/* unknown: tag */` instead of
//! failing, so gaps stay visible in the output.

use std::collections::HashMap;
use std::str::FromStr;

use indexmap::IndexMap;
use tracing::debug;

use crate::ir::node::{IrNode, IrTree, claim};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Go,
    Rust,
    Cpp,
}

impl Target {
    pub fn name(self) -> &'static str {
        match self {
            Target::Go => "go",
            Target::Rust => "rust",
            Target::Cpp => "cpp",
        }
    }

    /// Wraps a rendered expression in a program that prints it.
    fn skeleton(self, expr: &str) -> String {
        match self {
            Target::Go => format!(
                "package main\n\nimport \"fmt\"\n\nfunc main() {{\n    fmt.Println({})\n}}\n",
                expr
            ),
            Target::Rust => format!("fn main() {{\n    println!(\"{{}}\", {});\n}}\n", expr),
            Target::Cpp => format!(
                "#include <iostream>\n\nint main() {{\n    std::cout << {} << std::endl;\n    return 0;\n}}\n",
                expr
            ),
        }
    }
}

impl FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "go" => Ok(Target::Go),
            "rust" | "rs" => Ok(Target::Rust),
            "cpp" | "c++" => Ok(Target::Cpp),
            other => Err(format!("unknown target '{}'", other)),
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// What a handler receives: the node with its children already rendered.
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment<'a> {
    Literal(f64),
    Binary {
        /// Operator after IR-map rewriting.
        op: &'a str,
        left: String,
        right: String,
    },
}

pub type Rule = Box<dyn Fn(&Fragment<'_>) -> String + Send + Sync>;

pub struct Transpiler {
    target: Target,
    rules: HashMap<String, Rule>,
}

impl Transpiler {
    pub const LITERAL_TAG: &'static str = IrNode::LITERAL_TAG;
    pub const BINARY_TAG: &'static str = "binary";

    /// Default backend: numeric literals and fully parenthesized infix.
    pub fn for_target(target: Target) -> Self {
        let mut t = Self::empty(target);
        t.register(Self::LITERAL_TAG, |f: &Fragment<'_>| match f {
            Fragment::Literal(v) => format_number(*v),
            Fragment::Binary { .. } => placeholder(Self::LITERAL_TAG),
        });
        t.register(Self::BINARY_TAG, |f: &Fragment<'_>| match f {
            Fragment::Binary { op, left, right } => format!("({} {} {})", left, op, right),
            Fragment::Literal(_) => placeholder(Self::BINARY_TAG),
        });
        t
    }

    /// A backend with no handlers; every node renders as a placeholder until
    /// rules are registered.
    pub fn empty(target: Target) -> Self {
        Self {
            target,
            rules: HashMap::new(),
        }
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn register<F>(&mut self, tag: impl Into<String>, rule: F) -> &mut Self
    where
        F: Fn(&Fragment<'_>) -> String + Send + Sync + 'static,
    {
        self.rules.insert(tag.into(), Box::new(rule));
        self
    }

    pub fn has_rule(&self, tag: &str) -> bool {
        self.rules.contains_key(tag)
    }

    /// Renders the whole program for this backend's target.
    pub fn emit(&self, tree: &IrTree, ir_map: &IndexMap<String, String>) -> String {
        let expr = self.emit_expr(tree, ir_map);
        debug!(backend = %self.target, nodes = tree.len(), "transpiled");
        self.target.skeleton(&expr)
    }

    /// Renders only the expression, without the program skeleton.
    ///
    /// Fragments are built bottom-up in one pass over the arena, children
    /// before parents, so rendering depth does not grow with the tree.
    pub fn emit_expr(&self, tree: &IrTree, ir_map: &IndexMap<String, String>) -> String {
        if tree.root.is_none() {
            return "/* empty */".to_string();
        }
        let mut counts = tree.reference_counts();
        if counts.is_empty() {
            return "/* null */".to_string();
        }

        let mut parts = vec![String::new(); counts.len()];
        for (i, node) in tree.nodes[..counts.len()].iter().enumerate() {
            if counts[i] == 0 {
                continue;
            }

            let tag = node.tag();
            let resolved = ir_map.get(tag).map(String::as_str).unwrap_or(tag);

            parts[i] = match node {
                IrNode::Literal(v) => self.apply(tag, resolved, None, &Fragment::Literal(*v)),
                IrNode::Binary { left, right, .. } => {
                    if left.0 >= i || right.0 >= i {
                        "/* invalid */".to_string()
                    } else {
                        let fragment = Fragment::Binary {
                            op: resolved,
                            left: claim(&mut parts, &mut counts, left.0),
                            right: claim(&mut parts, &mut counts, right.0),
                        };
                        self.apply(tag, resolved, Some(Self::BINARY_TAG), &fragment)
                    }
                }
            };
        }

        parts.pop().unwrap_or_default()
    }

    /// Looks up the handler for the rewritten tag, then the node's own tag,
    /// then the generic one.
    fn apply(
        &self,
        tag: &str,
        resolved: &str,
        generic: Option<&str>,
        fragment: &Fragment<'_>,
    ) -> String {
        let rule = self
            .rules
            .get(resolved)
            .or_else(|| self.rules.get(tag))
            .or_else(|| generic.and_then(|g| self.rules.get(g)));

        match rule {
            Some(rule) => rule(fragment),
            None => placeholder(resolved),
        }
    }
}

fn placeholder(tag: &str) -> String {
    format!("/* unknown: {} */", tag)
}

/// Integral values keep a trailing `.0` so every target reads them as floats.
pub fn format_number(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 {
        format!("{:.1}", v)
    } else {
        format!("{}", v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::node::{IrBuilder, NodeId};

    /// (3 + (5 * 2))
    fn sample() -> IrTree {
        let mut b = IrBuilder::new();
        let three = b.literal(3.0);
        let five = b.literal(5.0);
        let two = b.literal(2.0);
        let mul = b.binary("*", five, two);
        let add = b.binary("+", three, mul);
        b.finish(add)
    }

    #[test]
    fn test_go_program() {
        let out = Transpiler::for_target(Target::Go).emit(&sample(), &IndexMap::new());
        assert_eq!(
            out,
            "package main\n\nimport \"fmt\"\n\nfunc main() {\n    fmt.Println((3.0 + (5.0 * 2.0)))\n}\n"
        );
    }

    #[test]
    fn test_rust_and_cpp_skeletons() {
        let rust = Transpiler::for_target(Target::Rust).emit(&sample(), &IndexMap::new());
        assert!(rust.starts_with("fn main() {\n"));
        assert!(rust.contains("println!(\"{}\", (3.0 + (5.0 * 2.0)));"));

        let cpp = Transpiler::for_target(Target::Cpp).emit(&sample(), &IndexMap::new());
        assert!(cpp.starts_with("#include <iostream>"));
        assert!(cpp.contains("std::cout << (3.0 + (5.0 * 2.0)) << std::endl;"));
    }

    #[test]
    fn test_ir_map_rewrites_operator() {
        let ir_map: IndexMap<String, String> = [("*".to_string(), "·".to_string())].into();
        let out = Transpiler::for_target(Target::Go).emit_expr(&sample(), &ir_map);
        assert_eq!(out, "(3.0 + (5.0 · 2.0))");
    }

    #[test]
    fn test_per_operator_rule() {
        let mut t = Transpiler::for_target(Target::Go);
        t.register("*", |f: &Fragment<'_>| match f {
            Fragment::Binary { left, right, .. } => format!("mul({}, {})", left, right),
            Fragment::Literal(_) => String::new(),
        });
        assert_eq!(
            t.emit_expr(&sample(), &IndexMap::new()),
            "(3.0 + mul(5.0, 2.0))"
        );
    }

    #[test]
    fn test_unknown_tag_placeholder() {
        let mut t = Transpiler::empty(Target::Go);
        t.register(Transpiler::LITERAL_TAG, |f: &Fragment<'_>| match f {
            Fragment::Literal(v) => format_number(*v),
            Fragment::Binary { .. } => String::new(),
        });
        assert_eq!(
            t.emit_expr(&sample(), &IndexMap::new()),
            "/* unknown: + */"
        );
    }

    #[test]
    fn test_empty_tree() {
        let t = Transpiler::for_target(Target::Rust);
        assert_eq!(t.emit_expr(&IrTree::default(), &IndexMap::new()), "/* empty */");
    }

    #[test]
    fn test_long_chain_renders() {
        let mut b = IrBuilder::new();
        let mut acc = b.literal(1.0);
        for _ in 0..50_000 {
            let one = b.literal(1.0);
            acc = b.binary("-", acc, one);
        }
        let out = Transpiler::for_target(Target::Cpp).emit_expr(&b.finish(acc), &IndexMap::new());
        assert_eq!(out.matches(" - 1.0)").count(), 50_000);
        assert!(out.starts_with("((("));
        assert!(out.contains("(1.0 - 1.0) - 1.0)"));
    }

    #[test]
    fn test_shared_child_rendered_twice() {
        let mut b = IrBuilder::new();
        let two = b.literal(2.0);
        let sq = b.binary("*", two, two);
        assert_eq!(
            Transpiler::for_target(Target::Go).emit_expr(&b.finish(sq), &IndexMap::new()),
            "(2.0 * 2.0)"
        );
    }

    #[test]
    fn test_child_after_parent_invalid() {
        let tree = IrTree {
            nodes: vec![
                IrNode::Literal(1.0),
                IrNode::Binary {
                    op: "+".to_string(),
                    left: NodeId(0),
                    right: NodeId(1),
                },
            ],
            root: Some(NodeId(1)),
        };
        let t = Transpiler::for_target(Target::Go);
        assert_eq!(t.emit_expr(&tree, &IndexMap::new()), "/* invalid */");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(3.0), "3.0");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(-4.0), "-4.0");
    }

    #[test]
    fn test_target_from_str() {
        assert_eq!("Go".parse::<Target>(), Ok(Target::Go));
        assert_eq!("c++".parse::<Target>(), Ok(Target::Cpp));
        assert!("java".parse::<Target>().is_err());
    }
}
