//! Collapsed-stack emission: flattens the canonical tree back into the
//! `frame;frame;frame count` text format understood by the FlameGraph tools.

use std::fmt::Write;

use crate::model::{CallTree, CallTreeNode};

/// Serialize the tree as collapsed stacks, one line per node carrying its
/// self time. The synthetic root is skipped; its children (threads) become
/// the first path segment.
pub fn write_collapsed(tree: &CallTree) -> String {
    let mut out = String::new();
    let mut stack: Vec<&str> = Vec::new();
    for child in &tree.root.children {
        dump(child, &mut stack, &mut out);
    }
    out
}

fn dump<'a>(node: &'a CallTreeNode, stack: &mut Vec<&'a str>, out: &mut String) {
    stack.push(&node.name);
    let _ = writeln!(out, "{} {:.0}", stack.join(";"), node.self_time);
    for child in &node.children {
        dump(child, stack, out);
    }
    stack.pop();
}
