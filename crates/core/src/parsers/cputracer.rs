//! Parser for `--cputracer` JSON output: flat per-method invocation counts,
//! rendered as a single-level graph.

use serde_json::{Map, Value};

use crate::model::{CallTree, CallTreeNode};

use super::{ParseError, as_object, fetch_array, fetch_f64, fetch_str};

pub fn parse(obj: &Map<String, Value>) -> Result<CallTree, ParseError> {
    let profile = fetch_array(obj, "profile")?;

    let mut children = Vec::with_capacity(profile.len());
    let mut offset = 0.0;
    for method in profile {
        let method = as_object(method, "profile entry")?;
        let name = fetch_str(method, "root_name")?;
        let count = fetch_f64(method, "count")?;
        children.push(CallTreeNode::new(name, None, offset, count, count, 0.0));
        offset += count;
    }

    let mut root = CallTreeNode::new("all", None, 0.0, offset, 0.0, 0.0);
    root.children = children;
    Ok(CallTree::new(root))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::{ParseOptions, parse_tool};

    #[test]
    fn flat_counts_become_one_level() {
        let json = br#"{
            "tool": "cputracer",
            "profile": [
                {"root_name": "Kernel#require", "count": 120},
                {"root_name": "String#gsub", "count": 30}
            ]
        }"#;
        let tree = parse_tool(json, ParseOptions::default()).unwrap();
        assert_eq!(tree.duration(), 150.0);
        assert_eq!(tree.root.children.len(), 2);
        assert_eq!(tree.root.children[0].name, "Kernel#require");
        assert_eq!(tree.root.children[1].offset, 120.0);
        assert!(tree.root.children.iter().all(|c| c.children.is_empty()));
    }

    #[test]
    fn missing_count_is_fatal() {
        let json = br#"{"tool": "cputracer", "profile": [{"root_name": "x"}]}"#;
        let err = parse_tool(json, ParseOptions::default()).unwrap_err();
        assert!(matches!(err, ParseError::MissingField("count")));
    }
}
