use serde::{Deserialize, Serialize};

/// One stack frame in the canonical call tree.
///
/// Nodes exclusively own their children; the tree is immutable once an
/// adapter has finished building it. `offset` is the start position along
/// the time axis and chains across siblings: the first child starts at
/// `parent.offset + parent.self_time` (frames accrue self time before their
/// callees under stack-sampling semantics), each later sibling at the
/// previous sibling's `offset + total`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallTreeNode {
    /// Display label, with `;` stripped (reserved as the collapsed-stack
    /// path separator).
    pub name: String,
    /// Source language tag of the frame, if the profiler reported one.
    pub language: Option<String>,
    /// Start position along the time axis.
    pub offset: f64,
    /// Inclusive samples: this frame plus all descendants.
    pub total: f64,
    /// Samples attributed to this frame alone.
    pub self_time: f64,
    /// Self samples taken while the frame was compiled code.
    pub compiled: f64,
    /// Normalized compilation ratio in [-1, 1]; see [`compilation_scale`].
    pub scale: f64,
    pub children: Vec<CallTreeNode>,
}

/// `(compiled − interpreted) / self`, with `interpreted = self − compiled`,
/// or 0 for a frame with no self samples. Clamped to [-1, 1]: profiler output
/// where `compiled > self` would otherwise push the diverging color scale out
/// of range.
pub fn compilation_scale(compiled: f64, self_time: f64) -> f64 {
    if self_time == 0.0 {
        return 0.0;
    }
    let interpreted = self_time - compiled;
    ((compiled - interpreted) / self_time).clamp(-1.0, 1.0)
}

impl CallTreeNode {
    pub fn new(
        name: impl Into<String>,
        language: Option<String>,
        offset: f64,
        total: f64,
        self_time: f64,
        compiled: f64,
    ) -> Self {
        Self {
            name: name.into().replace(';', ""),
            language,
            offset,
            total,
            self_time,
            compiled,
            scale: compilation_scale(compiled, self_time),
            children: Vec::new(),
        }
    }

    /// Self samples taken while the frame was interpreted.
    pub fn interpreted(&self) -> f64 {
        self.self_time - self.compiled
    }

    /// Tree depth counting only subtrees wide enough to render: a node with
    /// `total < min_duration` contributes 0 and its children are not visited.
    /// `depth(leaf, 0) == 1`.
    pub fn depth(&self, min_duration: f64) -> u32 {
        if self.total < min_duration {
            return 0;
        }
        1 + self
            .children
            .iter()
            .map(|c| c.depth(min_duration))
            .max()
            .unwrap_or(0)
    }
}

/// The canonical tree an adapter hands to the layout pipeline. `root` is a
/// synthetic node spanning every top-level entry (e.g. thread totals).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallTree {
    pub root: CallTreeNode,
}

impl CallTree {
    pub fn new(root: CallTreeNode) -> Self {
        Self { root }
    }

    /// Total samples in the whole tree.
    pub fn duration(&self) -> f64 {
        self.root.total
    }

    pub fn depth(&self, min_duration: f64) -> u32 {
        self.root.depth(min_duration)
    }

    /// Build a tree from `(stack, weight)` pairs.
    ///
    /// With `merge` set, identical call paths are merged (classic flame
    /// graph); without it every pair keeps its own column in input order
    /// (flame chart). `reverse` flips each stack before building, switching
    /// the merge end.
    pub fn from_stacks(stacks: Vec<(Vec<String>, f64)>, merge: bool, reverse: bool) -> Self {
        let mut stacks = stacks;
        if reverse {
            for (stack, _) in &mut stacks {
                stack.reverse();
            }
        }
        if merge {
            stacks.sort_by(|a, b| a.0.cmp(&b.0));
        }
        let refs: Vec<(&[String], f64)> = stacks
            .iter()
            .map(|(stack, weight)| (stack.as_slice(), *weight))
            .collect();
        let total: f64 = refs.iter().map(|(_, w)| w).sum();
        // Weight attached to an empty stack counts as root self time.
        // `+ 0.0` normalizes the -0.0 an empty f64 sum produces, which would
        // otherwise render as "-0" in collapsed output.
        let root_self: f64 = refs
            .iter()
            .filter(|(stack, _)| stack.is_empty())
            .map(|(_, w)| w)
            .sum::<f64>()
            + 0.0;
        let mut root = CallTreeNode::new("all", None, 0.0, total, root_self, 0.0);
        root.children = build_level(&refs, root_self, merge);
        Self { root }
    }
}

/// Group a run of stacks by their leading frame and recurse. Assumes the
/// slice is sorted when `merge` is set, so equal paths are adjacent.
fn build_level(stacks: &[(&[String], f64)], mut offset: f64, merge: bool) -> Vec<CallTreeNode> {
    let mut nodes: Vec<CallTreeNode> = Vec::new();
    let mut i = 0;
    while i < stacks.len() {
        let (stack, _) = stacks[i];
        let Some(head) = stack.first() else {
            i += 1;
            continue;
        };

        let mut j = i + 1;
        if merge {
            while j < stacks.len() && stacks[j].0.first() == Some(head) {
                j += 1;
            }
        }

        let run = &stacks[i..j];
        let total: f64 = run.iter().map(|(_, w)| w).sum();
        let self_time: f64 = run
            .iter()
            .filter(|(stack, _)| stack.len() == 1)
            .map(|(_, w)| w)
            .sum::<f64>()
            + 0.0;
        let rest: Vec<(&[String], f64)> = run
            .iter()
            .filter(|(stack, _)| stack.len() > 1)
            .map(|(stack, w)| (&stack[1..], *w))
            .collect();

        let mut node = CallTreeNode::new(head.as_str(), None, offset, total, self_time, 0.0);
        node.children = build_level(&rest, offset + self_time, merge);
        offset += total;
        nodes.push(node);
        i = j;
    }
    nodes
}
