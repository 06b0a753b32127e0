use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::call_tree::{CallTreeNode, compilation_scale};

/// Flattened self-time profile: one entry per distinct frame name anywhere
/// in the tree. The same name at different stack positions merges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistogramEntry {
    pub name: String,
    /// Self samples summed over every occurrence of the name.
    pub self_time: f64,
    /// Compiled self samples summed the same way.
    pub compiled: f64,
}

impl HistogramEntry {
    /// Compilation ratio of the aggregate, same formula as the tree nodes.
    pub fn scale(&self) -> f64 {
        compilation_scale(self.compiled, self.self_time)
    }
}

/// Depth-first traversal accumulating self time by name, sorted by
/// descending aggregate self time (ties broken by name for determinism).
pub fn sum_self_time(root: &CallTreeNode) -> Vec<HistogramEntry> {
    let mut by_name: HashMap<&str, (f64, f64)> = HashMap::new();
    accumulate(root, &mut by_name);

    let mut entries: Vec<HistogramEntry> = by_name
        .into_iter()
        .map(|(name, (self_time, compiled))| HistogramEntry {
            name: name.to_string(),
            self_time,
            compiled,
        })
        .collect();
    entries.sort_by(|a, b| {
        b.self_time
            .total_cmp(&a.self_time)
            .then_with(|| a.name.cmp(&b.name))
    });
    entries
}

fn accumulate<'a>(node: &'a CallTreeNode, by_name: &mut HashMap<&'a str, (f64, f64)>) {
    if node.self_time > 0.0 {
        let entry = by_name.entry(&node.name).or_insert((0.0, 0.0));
        entry.0 += node.self_time;
        entry.1 += node.compiled;
    }
    for child in &node.children {
        accumulate(child, by_name);
    }
}
