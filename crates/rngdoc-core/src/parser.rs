use std::collections::BTreeMap;

use roxmltree::{Document, Node, NodeType};
use tracing::debug;

use crate::catalogs::RNG_NS;
use crate::error::{Error, Result};
use crate::types::*;

/// Parse a RELAX NG grammar in XML syntax into a [`Grammar`].
pub fn parse_grammar(xml: &str) -> Result<Grammar> {
    let doc = Document::parse(xml).map_err(|e| Error::malformed(e.to_string()))?;
    let root = doc.root_element();

    if root.tag_name().namespace() != Some(RNG_NS) || root.tag_name().name() != "grammar" {
        return Err(Error::malformed(format!(
            "document element must be <grammar> in namespace {RNG_NS}, found {}",
            clark_name(&root)
        )));
    }

    let namespaces: BTreeMap<String, String> = root
        .namespaces()
        .filter(|ns| ns.name() != Some("xml"))
        .map(|ns| (ns.name().unwrap_or_default().to_string(), ns.uri().to_string()))
        .collect();

    let pattern = convert_node(root)?;
    let grammar = Grammar::new(pattern, namespaces)?;
    debug!(
        defines = grammar.defines().count(),
        elements = grammar.element_definitions().count(),
        "parsed grammar"
    );
    Ok(grammar)
}

/// Parse the baseline grammar. Any failure is reported as a baseline error.
pub fn parse_baseline(xml: &str) -> Result<Grammar> {
    parse_grammar(xml).map_err(|e| Error::baseline(e.to_string()))
}

fn convert_node(node: Node<'_, '_>) -> Result<PatternNode> {
    if node.tag_name().namespace() != Some(RNG_NS) {
        return Err(Error::UnrenderablePattern {
            kind: clark_name(&node),
        });
    }
    let kind: PatternKind = node.tag_name().name().parse()?;
    let mut pattern = PatternNode::new(kind);

    for attr in node.attributes() {
        match attr.namespace() {
            None if attr.name() == "name" => {
                pattern.name = Some(attr.value().trim().to_string());
            }
            None => {
                pattern
                    .attributes
                    .insert(attr.name().to_string(), attr.value().to_string());
            }
            Some(uri) => {
                pattern
                    .attributes
                    .insert(format!("{{{uri}}}{}", attr.name()), attr.value().to_string());
            }
        }
    }

    let mut text = String::new();
    for child in node.children() {
        match child.node_type() {
            NodeType::Element => pattern.children.push(convert_node(child)?),
            NodeType::Text => text.push_str(child.text().unwrap_or_default()),
            // Comments and processing instructions carry no pattern.
            _ => {}
        }
    }

    if kind == PatternKind::Value {
        pattern.text = Some(text);
    } else if !text.trim().is_empty() {
        return Err(Error::malformed(format!(
            "unexpected text \"{}\" inside <{kind}>",
            text.trim()
        )));
    }

    Ok(pattern)
}

fn clark_name(node: &Node<'_, '_>) -> String {
    match node.tag_name().namespace() {
        Some(uri) => format!("{{{uri}}}{}", node.tag_name().name()),
        None => node.tag_name().name().to_string(),
    }
}
