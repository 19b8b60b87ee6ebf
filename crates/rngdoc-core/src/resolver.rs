use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::types::*;

/// Resolves `ref` names to the element names they stand for.
pub struct ReferenceResolver<'a> {
    grammar: &'a Grammar,
}

impl<'a> ReferenceResolver<'a> {
    pub fn new(grammar: &'a Grammar) -> Self {
        Self { grammar }
    }

    /// Element names reachable from a `ref` to `name`.
    ///
    /// A ref to a define yields the elements declared directly inside that
    /// define (possibly none, for pattern-only defines such as attribute
    /// groups). Without a define, a ref naming an element yields that element.
    /// Returns `None` when the name is not defined at all.
    pub fn resolve(&self, name: &str) -> Option<Vec<&'a str>> {
        let defines = self.grammar.defines_named(name);
        if !defines.is_empty() {
            let elements = defines
                .into_iter()
                .flat_map(|d| d.children.iter())
                .filter(|c| c.kind == PatternKind::Element)
                .map(PatternNode::name_str)
                .collect();
            return Some(elements);
        }
        self.grammar
            .element_definitions()
            .find(|e| e.name.as_deref() == Some(name))
            .map(|e| vec![e.name_str()])
    }

    /// Every element referenced from anywhere inside `element`'s subtree.
    /// Fails on the first ref that resolves to nothing.
    pub fn referenced_elements(&self, element: &'a PatternNode) -> Result<BTreeSet<&'a str>> {
        let mut names = BTreeSet::new();
        for reference in element.descendants_of(PatternKind::Ref) {
            let target = reference.name_str();
            let resolved = self
                .resolve(target)
                .ok_or_else(|| Error::DanglingReference {
                    name: target.to_string(),
                    element: element.name_str().to_string(),
                })?;
            names.extend(resolved);
        }
        Ok(names)
    }

    /// Checks every `ref` in the grammar, including those under `start` and
    /// pattern-only defines. A dangling ref is reported against the innermost
    /// enclosing element, define, or `start`.
    pub fn check_references(&self) -> Result<()> {
        self.check_node(&self.grammar.root, "grammar")
    }

    fn check_node(&self, node: &'a PatternNode, context: &'a str) -> Result<()> {
        let context = match node.kind {
            PatternKind::Start => "start",
            PatternKind::Define | PatternKind::Element => node.name_str(),
            _ => context,
        };
        if node.kind == PatternKind::Ref && self.resolve(node.name_str()).is_none() {
            return Err(Error::DanglingReference {
                name: node.name_str().to_string(),
                element: context.to_string(),
            });
        }
        for child in &node.children {
            self.check_node(child, context)?;
        }
        Ok(())
    }
}
