//! Parser for `--cpusampler` JSON output: per-thread trees of sampled
//! methods with self/total hit counts and compilation split.

use serde_json::{Map, Value};

use crate::model::{CallTree, CallTreeNode};

use super::{ParseError, ParseOptions, as_object, fetch, fetch_array, fetch_f64, fetch_str};

pub fn parse(obj: &Map<String, Value>, options: ParseOptions) -> Result<CallTree, ParseError> {
    let profile = fetch_array(obj, "profile")?;

    if options.timestamp_order {
        if !fetch(obj, "gathered_hit_times")
            .ok()
            .and_then(Value::as_bool)
            .unwrap_or(false)
        {
            return Err(ParseError::MissingHitTimes);
        }
        return parse_timestamp_order(profile, options);
    }
    if options.stack_reverse || options.flame_chart {
        return parse_as_stacks(profile, options);
    }

    // Direct tree translation, one subtree per thread.
    let mut threads = Vec::with_capacity(profile.len());
    let mut offset = 0.0;
    for thread in profile {
        let thread = as_object(thread, "profile entry")?;
        let name = fetch_str(thread, "thread")?;
        let samples = fetch_array(thread, "samples")?;
        let (children, total) = make_trees(samples, offset, options.source_info)?;
        let mut node = CallTreeNode::new(name, None, offset, total, 0.0, 0.0);
        node.children = children;
        threads.push(node);
        offset += total;
    }
    let mut root = CallTreeNode::new("all", None, 0.0, offset, 0.0, 0.0);
    root.children = threads;
    Ok(CallTree::new(root))
}

/// Recursively translate a `samples` array. A node's first child starts at
/// `offset + self_time`; each sibling advances the offset by its total.
fn make_trees(
    samples: &[Value],
    mut offset: f64,
    source_info: bool,
) -> Result<(Vec<CallTreeNode>, f64), ParseError> {
    let mut nodes = Vec::with_capacity(samples.len());
    let mut total_time = 0.0;
    for method in samples {
        let method = as_object(method, "sample")?;
        let total = fetch_f64(method, "hit_count")?;
        let self_time = fetch_f64(method, "self_hit_count")?;
        let compiled = fetch_f64(method, "self_compiled_hit_count")?;
        let source_section = as_object(fetch(method, "source_section")?, "source_section")?;
        let language = source_section
            .get("language")
            .and_then(Value::as_str)
            .map(str::to_string);
        let name = method_name(method, source_info)?;

        let (children, _) = make_trees(
            fetch_array(method, "children")?,
            offset + self_time,
            source_info,
        )?;
        let mut node = CallTreeNode::new(name, language, offset, total, self_time, compiled);
        node.children = children;
        nodes.push(node);
        total_time += total;
        offset += total;
    }
    Ok((nodes, total_time))
}

/// One stack per individual sample, ordered by hit timestamp. Paths are
/// never merged, so the x axis reads as time.
fn parse_timestamp_order(
    profile: &[Value],
    options: ParseOptions,
) -> Result<CallTree, ParseError> {
    let mut samples: Vec<(Vec<String>, f64)> = Vec::new();
    for thread in profile {
        let thread = as_object(thread, "profile entry")?;
        let mut stack = vec![fetch_str(thread, "thread")?.to_string()];
        gather_samples(
            fetch_array(thread, "samples")?,
            &mut stack,
            options.source_info,
            &mut samples,
        )?;
    }
    samples.sort_by(|a, b| a.1.total_cmp(&b.1));
    let stacks = samples.into_iter().map(|(stack, _)| (stack, 1.0)).collect();
    Ok(CallTree::from_stacks(stacks, false, options.stack_reverse))
}

fn gather_samples(
    samples: &[Value],
    stack: &mut Vec<String>,
    source_info: bool,
    out: &mut Vec<(Vec<String>, f64)>,
) -> Result<(), ParseError> {
    for method in samples {
        let method = as_object(method, "sample")?;
        stack.push(method_name(method, source_info)?);
        for time in fetch_array(method, "self_hit_times")? {
            let time = time.as_f64().ok_or(ParseError::WrongType("self_hit_times"))?;
            out.push((stack.clone(), time));
        }
        gather_samples(fetch_array(method, "children")?, stack, source_info, out)?;
        stack.pop();
    }
    Ok(())
}

/// Flatten the per-thread trees to `(stack, self_hits)` pairs and rebuild,
/// so the stack-reverse and flame-chart variants share one code path.
fn parse_as_stacks(profile: &[Value], options: ParseOptions) -> Result<CallTree, ParseError> {
    let mut stacks: Vec<(Vec<String>, f64)> = Vec::new();
    for thread in profile {
        let thread = as_object(thread, "profile entry")?;
        let mut stack = vec![fetch_str(thread, "thread")?.to_string()];
        dump_stacks(
            fetch_array(thread, "samples")?,
            &mut stack,
            options.source_info,
            &mut stacks,
        )?;
    }
    Ok(CallTree::from_stacks(
        stacks,
        !options.flame_chart,
        options.stack_reverse,
    ))
}

fn dump_stacks(
    samples: &[Value],
    stack: &mut Vec<String>,
    source_info: bool,
    out: &mut Vec<(Vec<String>, f64)>,
) -> Result<(), ParseError> {
    for method in samples {
        let method = as_object(method, "sample")?;
        stack.push(method_name(method, source_info)?);
        out.push((stack.clone(), fetch_f64(method, "self_hit_count")?));
        dump_stacks(fetch_array(method, "children")?, stack, source_info, out)?;
        stack.pop();
    }
    Ok(())
}

/// Frame display name; with `source_info`, `"name file.rb:3"` or
/// `"name file.rb:3-7"`. Semicolons are stripped later by the node
/// constructor.
fn method_name(method: &Map<String, Value>, source_info: bool) -> Result<String, ParseError> {
    let name = fetch_str(method, "root_name")?;
    if !source_info {
        return Ok(name.to_string());
    }
    let section = as_object(fetch(method, "source_section")?, "source_section")?;
    let source_name = section.get("source_name").and_then(Value::as_str);
    let start_line = section.get("start_line").and_then(Value::as_i64);
    let end_line = section.get("end_line").and_then(Value::as_i64);
    match (source_name, start_line, end_line) {
        (Some(file), Some(start), Some(end)) if start == end => Ok(format!("{name} {file}:{start}")),
        (Some(file), Some(start), Some(end)) => Ok(format!("{name} {file}:{start}-{end}")),
        _ => Ok(name.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::parse_tool;

    fn sample_json() -> &'static [u8] {
        br#"{
            "tool": "cpusampler",
            "gathered_hit_times": true,
            "profile": [
                {
                    "thread": "main",
                    "samples": [
                        {
                            "root_name": "Object#run",
                            "hit_count": 10,
                            "self_hit_count": 4,
                            "self_compiled_hit_count": 4,
                            "self_interpreted_hit_count": 0,
                            "self_hit_times": [5, 1, 9, 3],
                            "source_section": {
                                "language": "ruby",
                                "source_name": "app.rb",
                                "start_line": 1,
                                "end_line": 20
                            },
                            "children": [
                                {
                                    "root_name": "Array#each",
                                    "hit_count": 6,
                                    "self_hit_count": 6,
                                    "self_compiled_hit_count": 0,
                                    "self_interpreted_hit_count": 6,
                                    "self_hit_times": [2, 4, 6, 7, 8, 10],
                                    "source_section": {
                                        "language": "ruby",
                                        "source_name": "app.rb",
                                        "start_line": 5,
                                        "end_line": 5
                                    },
                                    "children": []
                                }
                            ]
                        }
                    ]
                }
            ]
        }"#
    }

    #[test]
    fn builds_per_thread_tree() {
        let tree = parse_tool(sample_json(), ParseOptions::default()).unwrap();
        assert_eq!(tree.root.name, "all");
        assert_eq!(tree.duration(), 10.0);

        let thread = &tree.root.children[0];
        assert_eq!(thread.name, "main");
        assert_eq!(thread.total, 10.0);

        let run = &thread.children[0];
        assert_eq!(run.name, "Object#run");
        assert_eq!(run.self_time, 4.0);
        assert_eq!(run.scale, 1.0);
        assert_eq!(run.language.as_deref(), Some("ruby"));

        // Child starts after the parent's self time.
        let each = &run.children[0];
        assert_eq!(each.offset, run.offset + run.self_time);
        assert_eq!(each.scale, -1.0);
    }

    #[test]
    fn source_info_appends_location() {
        let tree = parse_tool(
            sample_json(),
            ParseOptions {
                source_info: true,
                ..ParseOptions::default()
            },
        )
        .unwrap();
        let run = &tree.root.children[0].children[0];
        assert_eq!(run.name, "Object#run app.rb:1-20");
        assert_eq!(run.children[0].name, "Array#each app.rb:5");
    }

    #[test]
    fn timestamp_order_emits_one_column_per_sample() {
        let tree = parse_tool(
            sample_json(),
            ParseOptions {
                timestamp_order: true,
                ..ParseOptions::default()
            },
        )
        .unwrap();
        // 10 samples, one top-level "main" column each, never merged.
        assert_eq!(tree.duration(), 10.0);
        assert_eq!(tree.root.children.len(), 10);
        // First sample (time 1) is Object#run self, second (time 2) is Array#each.
        assert_eq!(tree.root.children[0].children[0].name, "Object#run");
        assert_eq!(tree.root.children[0].children[0].children.len(), 0);
        assert_eq!(tree.root.children[1].children[0].children[0].name, "Array#each");
    }

    #[test]
    fn timestamp_order_requires_hit_times() {
        let json = br#"{"tool": "cpusampler", "profile": []}"#;
        let err = parse_tool(
            json,
            ParseOptions {
                timestamp_order: true,
                ..ParseOptions::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, ParseError::MissingHitTimes));
    }

    #[test]
    fn stack_reverse_flips_the_merge_end() {
        let tree = parse_tool(
            sample_json(),
            ParseOptions {
                stack_reverse: true,
                ..ParseOptions::default()
            },
        )
        .unwrap();
        // Leaves become the merge roots: Array#each and Object#run on top.
        let names: Vec<&str> = tree
            .root
            .children
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert!(names.contains(&"Array#each"));
        assert!(names.contains(&"Object#run"));
    }

    #[test]
    fn missing_field_aborts_construction() {
        let json = br#"{
            "tool": "cpusampler",
            "profile": [{"thread": "main", "samples": [{"root_name": "x"}]}]
        }"#;
        let err = parse_tool(json, ParseOptions::default()).unwrap_err();
        assert!(matches!(err, ParseError::MissingField("hit_count")));
    }
}
