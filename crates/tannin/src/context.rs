//! Context annotation: deciding how each interpolation escapes.
//!
//! After parsing, the tree is walked once in source order. Literal text runs
//! feed an incremental [`ContextScanner`]; at each interpolation the
//! scanner's state picks exactly one escaping modifier, which is appended to
//! that interpolation's modifier chain:
//!
//! - inside a `<script>` element: `contextJs`
//! - inside a tag's attribute list: `contextTag`
//! - anywhere else: `contextOutTag`
//!
//! A chain that already carries `ignoreContext()` or `preventTagEncode()` is
//! left alone — that is the escape hatch for intentionally raw output. The
//! decision depends only on the interpolation's syntactic position in the
//! template, never on the value that later flows through it, and each
//! interpolation is classified once no matter how many times its node
//! renders.

use tannin_htmlscan::ContextScanner;

use crate::ast::Node;
use crate::path::ModifierCall;

/// Names whose presence in a chain suppresses the automatic escape.
const ESCAPE_HATCHES: &[&str] = &["ignoreContext", "preventTagEncode"];

/// Walks `nodes` in source order, appending a context escape to every
/// interpolation that does not opt out.
pub fn annotate(nodes: &mut [Node], context_aware: bool) {
    if !context_aware {
        return;
    }
    let mut scanner = ContextScanner::new();
    annotate_nodes(nodes, &mut scanner);
}

fn annotate_nodes(nodes: &mut [Node], scanner: &mut ContextScanner) {
    for node in nodes {
        match node {
            Node::Text(text) => scanner.feed(text),
            Node::Var(path) => {
                if ESCAPE_HATCHES.iter().any(|name| path.has_modifier(name)) {
                    continue;
                }
                let state = scanner.state();
                let in_str = if state.in_string { "1" } else { "" };
                let call = if state.tag == "script" {
                    ModifierCall::new("contextJs", vec![in_str.to_string()])
                } else if state.in_tag {
                    ModifierCall::new("contextTag", vec![in_str.to_string()])
                } else {
                    ModifierCall::new("contextOutTag", Vec::new())
                };
                path.modifiers.push(call);
            }
            Node::If(n) => {
                for (_, body) in &mut n.branches {
                    annotate_nodes(body, scanner);
                }
                if let Some(body) = &mut n.else_body {
                    annotate_nodes(body, scanner);
                }
            }
            Node::Loop(n) => annotate_nodes(&mut n.body, scanner),
            Node::Block(n) => annotate_nodes(&mut n.body, scanner),
            Node::Switch(n) => {
                for (_, body) in &mut n.cases {
                    annotate_nodes(body, scanner);
                }
                if let Some(body) = &mut n.default {
                    annotate_nodes(body, scanner);
                }
            }
            Node::Include(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::parse::{parse, Tokenizer};

    use super::*;

    fn annotated(input: &str) -> Vec<Node> {
        let mut ast = parse(Tokenizer::new(input).collect()).unwrap();
        annotate(&mut ast.nodes, true);
        ast.nodes
    }

    fn last_modifier(node: &Node) -> Option<&ModifierCall> {
        match node {
            Node::Var(path) => path.modifiers.last(),
            _ => None,
        }
    }

    #[test]
    fn test_plain_text_gets_out_tag() {
        let nodes = annotated("<p>{$name}</p>");
        assert_eq!(last_modifier(&nodes[1]).unwrap().name, "contextOutTag");
    }

    #[test]
    fn test_quoted_attribute_gets_tag_in_string() {
        let nodes = annotated("<a href=\"{$url}\">x</a>");
        let call = last_modifier(&nodes[1]).unwrap();
        assert_eq!(call.name, "contextTag");
        assert_eq!(call.args, vec!["1".to_string()]);
    }

    #[test]
    fn test_bare_attribute_gets_tag_outside_string() {
        let nodes = annotated("<a href={$url}>x</a>");
        let call = last_modifier(&nodes[1]).unwrap();
        assert_eq!(call.name, "contextTag");
        assert_eq!(call.args, vec!["".to_string()]);
    }

    #[test]
    fn test_script_gets_js() {
        let nodes = annotated("<script>var x = {$data};</script>");
        assert_eq!(last_modifier(&nodes[1]).unwrap().name, "contextJs");
    }

    #[test]
    fn test_escape_hatch_suppresses() {
        let nodes = annotated("<p>{$html.ignoreContext()}</p>");
        assert_eq!(last_modifier(&nodes[1]).unwrap().name, "ignoreContext");
    }

    #[test]
    fn test_loop_body_classified_once() {
        let nodes = annotated("{loop $u in $users}<b>{$u}</b>{endloop}");
        let Node::Loop(node) = &nodes[0] else {
            panic!("expected loop");
        };
        let call = last_modifier(&node.body[1]).unwrap();
        assert_eq!(call.name, "contextOutTag");
    }

    #[test]
    fn test_context_disabled() {
        let mut ast = parse(Tokenizer::new("<p>{$x}</p>").collect()).unwrap();
        annotate(&mut ast.nodes, false);
        assert!(matches!(&ast.nodes[1], Node::Var(p) if p.modifiers.is_empty()));
    }
}
