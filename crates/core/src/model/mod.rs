pub mod call_tree;
pub mod histogram;

pub use call_tree::{CallTree, CallTreeNode, compilation_scale};
pub use histogram::{HistogramEntry, sum_self_time};
