use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Placeholder replaced by the trailing command token.
pub const ARG_PLACEHOLDER: &str = "{{arg}}";
/// Placeholder replaced by the configured base URL.
pub const BASE_PLACEHOLDER: &str = "{{base}}";

/// One node of the endpoint mapping tree: either an inner mapping keyed by
/// command token, or a leaf URL template.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EndpointNode {
    /// URL template, possibly containing [`ARG_PLACEHOLDER`] / [`BASE_PLACEHOLDER`].
    Leaf(String),
    /// Inner mapping; lookup is case-sensitive exact match per token.
    Branch(BTreeMap<String, EndpointNode>),
}

/// The leaf found by walking a command path, plus how many argv tokens the
/// walk consumed. The flag tail starts at index `consumed` of the raw argv.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTemplate {
    pub template: String,
    pub consumed: usize,
}

/// Parse the endpoint mapping from JSON, falling back to YAML.
pub fn parse_endpoint_map(text: &str) -> Result<EndpointNode> {
    if let Ok(node) = serde_json::from_str::<EndpointNode>(text) {
        return Ok(node);
    }
    let node = serde_yaml::from_str::<EndpointNode>(text)
        .context("Failed to parse endpoint mapping as JSON, and also failed to parse as YAML")?;
    Ok(node)
}

/// Walk `path` against the mapping and return the first leaf encountered.
///
/// The cursor descends one branch per token; a token with no matching child
/// ends the walk. The first leaf found wins (shallowest matching depth), and
/// `consumed` is its depth in tokens. When the leaf template contains
/// [`ARG_PLACEHOLDER`], `consumed` is incremented once more: the trailing
/// command token is reused as the substitution argument, not a path segment.
///
/// # Errors
///
/// `Error::EndpointNotFound` when the walk ends without reaching a leaf. The
/// caller reports it and terminates; there is no default endpoint.
pub fn resolve(root: &EndpointNode, path: &[String]) -> std::result::Result<ResolvedTemplate, Error> {
    let mut cursor = root;
    for (depth, token) in path.iter().enumerate() {
        let child = match cursor {
            EndpointNode::Branch(children) => children.get(token.as_str()),
            EndpointNode::Leaf(_) => None,
        };
        match child {
            None => break,
            Some(EndpointNode::Leaf(template)) => {
                let mut consumed = depth + 1;
                if template.contains(ARG_PLACEHOLDER) {
                    consumed += 1;
                }
                return Ok(ResolvedTemplate {
                    template: template.clone(),
                    consumed,
                });
            }
            Some(branch) => cursor = branch,
        }
    }
    Err(Error::EndpointNotFound)
}

/// Flatten every root-to-leaf path, in sorted token order, for help output.
pub fn command_paths(root: &EndpointNode) -> Vec<(String, String)> {
    fn walk(node: &EndpointNode, prefix: &str, out: &mut Vec<(String, String)>) {
        match node {
            EndpointNode::Leaf(template) => {
                out.push((prefix.to_string(), template.clone()));
            }
            EndpointNode::Branch(children) => {
                for (token, child) in children {
                    let next = if prefix.is_empty() {
                        token.clone()
                    } else {
                        format!("{prefix} {token}")
                    };
                    walk(child, &next, out);
                }
            }
        }
    }
    let mut out = Vec::new();
    walk(root, "", &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_args(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    fn sample_map() -> EndpointNode {
        parse_endpoint_map(
            r#"{
                "get": {
                    "subdomains": "{{base}}/api/subdomains/{{arg}}",
                    "lives": "{{base}}/api/lives",
                    "latest": "{{base}}/api/latest?since=1d"
                },
                "orch": "{{base}}/api/orchestrate",
                "regexp": {
                    "test": "{{base}}/api/regexp/test",
                    "apply": "{{base}}/api/regexp/apply"
                }
            }"#,
        )
        .unwrap()
    }

    // ==================== parse_endpoint_map tests ====================

    #[test]
    fn test_parse_json_branch_and_leaf() {
        let root = sample_map();
        match &root {
            EndpointNode::Branch(children) => {
                assert!(matches!(children.get("orch"), Some(EndpointNode::Leaf(_))));
                assert!(matches!(children.get("get"), Some(EndpointNode::Branch(_))));
            }
            EndpointNode::Leaf(_) => panic!("Expected Branch root"),
        }
    }

    #[test]
    fn test_parse_yaml_fallback() {
        let yaml = r#"
get:
  lives: "{{base}}/api/lives"
"#;
        let root = parse_endpoint_map(yaml).unwrap();
        let resolved = resolve(&root, &to_args(&["get", "lives"])).unwrap();
        assert_eq!(resolved.template, "{{base}}/api/lives");
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse_endpoint_map("{not valid at all").is_err());
    }

    // ==================== resolve tests ====================

    #[test]
    fn test_resolve_leaf_at_depth_two() {
        let root = sample_map();
        let resolved = resolve(&root, &to_args(&["get", "lives"])).unwrap();
        assert_eq!(resolved.template, "{{base}}/api/lives");
        assert_eq!(resolved.consumed, 2);
    }

    #[test]
    fn test_resolve_leaf_at_depth_one() {
        let root = sample_map();
        let resolved = resolve(&root, &to_args(&["orch"])).unwrap();
        assert_eq!(resolved.template, "{{base}}/api/orchestrate");
        assert_eq!(resolved.consumed, 1);
    }

    #[test]
    fn test_resolve_arg_placeholder_consumes_extra_token() {
        let root = sample_map();
        let resolved = resolve(&root, &to_args(&["get", "subdomains", "example.com"])).unwrap();
        assert_eq!(resolved.template, "{{base}}/api/subdomains/{{arg}}");
        assert_eq!(resolved.consumed, 3);
    }

    #[test]
    fn test_resolve_shallowest_leaf_wins() {
        // Tokens past the first leaf are left for substitution/flags.
        let root = sample_map();
        let resolved = resolve(&root, &to_args(&["get", "lives", "whatever"])).unwrap();
        assert_eq!(resolved.consumed, 2);
    }

    #[test]
    fn test_resolve_not_found() {
        let root = sample_map();
        assert!(matches!(
            resolve(&root, &to_args(&["get", "unknown"])),
            Err(Error::EndpointNotFound)
        ));
        assert!(matches!(
            resolve(&root, &to_args(&["nothing"])),
            Err(Error::EndpointNotFound)
        ));
    }

    #[test]
    fn test_resolve_path_ending_at_branch_is_not_found() {
        let root = sample_map();
        assert!(matches!(
            resolve(&root, &to_args(&["get"])),
            Err(Error::EndpointNotFound)
        ));
    }

    #[test]
    fn test_resolve_is_case_sensitive() {
        let root = sample_map();
        assert!(matches!(
            resolve(&root, &to_args(&["GET", "lives"])),
            Err(Error::EndpointNotFound)
        ));
    }

    #[test]
    fn test_resolve_empty_path() {
        let root = sample_map();
        assert!(matches!(resolve(&root, &[]), Err(Error::EndpointNotFound)));
    }

    // ==================== command_paths tests ====================

    #[test]
    fn test_command_paths_flattens_all_leaves() {
        let root = sample_map();
        let paths = command_paths(&root);
        let joined: Vec<&str> = paths.iter().map(|(p, _)| p.as_str()).collect();
        assert!(joined.contains(&"get subdomains"));
        assert!(joined.contains(&"orch"));
        assert!(joined.contains(&"regexp apply"));
        assert_eq!(paths.len(), 6);
    }

    #[test]
    fn test_command_paths_sorted() {
        let root = sample_map();
        let paths = command_paths(&root);
        let mut sorted = paths.clone();
        sorted.sort();
        assert_eq!(paths, sorted);
    }
}
