use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use crate::catalogs::{CATALOG_VERSION, DEFAULT_VALUE_KEY};
use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Pattern model
// ---------------------------------------------------------------------------

/// Closed set of pattern kinds understood by the renderer and the catalog builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PatternKind {
    Grammar,
    Define,
    Element,
    Attribute,
    Ref,
    Choice,
    Optional,
    ZeroOrMore,
    OneOrMore,
    Interleave,
    Text,
    Empty,
    Value,
    Data,
    Start,
    Include,
}

impl PatternKind {
    /// Local element name in the RELAX NG XML syntax.
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternKind::Grammar => "grammar",
            PatternKind::Define => "define",
            PatternKind::Element => "element",
            PatternKind::Attribute => "attribute",
            PatternKind::Ref => "ref",
            PatternKind::Choice => "choice",
            PatternKind::Optional => "optional",
            PatternKind::ZeroOrMore => "zeroOrMore",
            PatternKind::OneOrMore => "oneOrMore",
            PatternKind::Interleave => "interleave",
            PatternKind::Text => "text",
            PatternKind::Empty => "empty",
            PatternKind::Value => "value",
            PatternKind::Data => "data",
            PatternKind::Start => "start",
            PatternKind::Include => "include",
        }
    }

    /// Kinds that cannot be loaded without a `name` attribute.
    pub fn requires_name(&self) -> bool {
        matches!(
            self,
            PatternKind::Element | PatternKind::Attribute | PatternKind::Define | PatternKind::Ref
        )
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PatternKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let kind = match s {
            "grammar" => PatternKind::Grammar,
            "define" => PatternKind::Define,
            "element" => PatternKind::Element,
            "attribute" => PatternKind::Attribute,
            "ref" => PatternKind::Ref,
            "choice" => PatternKind::Choice,
            "optional" => PatternKind::Optional,
            "zeroOrMore" => PatternKind::ZeroOrMore,
            "oneOrMore" => PatternKind::OneOrMore,
            "interleave" => PatternKind::Interleave,
            "text" => PatternKind::Text,
            "empty" => PatternKind::Empty,
            "value" => PatternKind::Value,
            "data" => PatternKind::Data,
            "start" => PatternKind::Start,
            "include" => PatternKind::Include,
            other => {
                return Err(Error::UnrenderablePattern {
                    kind: other.to_string(),
                })
            }
        };
        Ok(kind)
    }
}

/// One node of a grammar pattern tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternNode {
    pub kind: PatternKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Raw XML attributes of the source node. Namespaced attributes use
    /// Clark notation (`{uri}local`).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<PatternNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl PatternNode {
    pub fn new(kind: PatternKind) -> Self {
        Self {
            kind,
            name: None,
            attributes: BTreeMap::new(),
            children: Vec::new(),
            text: None,
        }
    }

    /// Shorthand for a node carrying a `name`.
    pub fn named(kind: PatternKind, name: impl Into<String>) -> Self {
        Self::new(kind).with_name(name)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_child(mut self, child: PatternNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = PatternNode>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn name_str(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Value of the `a:defaultValue` annotation, if the node carries one.
    pub fn default_value(&self) -> Option<&str> {
        self.attr(DEFAULT_VALUE_KEY.as_str())
    }

    pub fn is(&self, kind: PatternKind) -> bool {
        self.kind == kind
    }

    /// All nodes below this one, pre-order, each paired with its parent.
    pub fn descendants_with_parent(&self) -> Vec<(&PatternNode, &PatternNode)> {
        let mut out = Vec::new();
        let mut stack: Vec<(&PatternNode, &PatternNode)> =
            self.children.iter().rev().map(|c| (self, c)).collect();
        while let Some((parent, node)) = stack.pop() {
            out.push((parent, node));
            stack.extend(node.children.iter().rev().map(|c| (node, c)));
        }
        out
    }

    /// All nodes below this one of the given kind, pre-order.
    pub fn descendants_of(&self, kind: PatternKind) -> impl Iterator<Item = &PatternNode> {
        self.descendants_with_parent()
            .into_iter()
            .map(|(_, node)| node)
            .filter(move |node| node.kind == kind)
    }

    fn check_well_formed(&self) -> Result<()> {
        if self.kind.requires_name() && self.name.as_deref().map_or(true, str::is_empty) {
            return Err(Error::malformed(format!(
                "<{}> without a name attribute",
                self.kind
            )));
        }
        match self.kind {
            PatternKind::Include if self.attr("href").is_none() => {
                return Err(Error::malformed("<include> without an href attribute"));
            }
            PatternKind::Data if self.attr("type").is_none() => {
                return Err(Error::malformed("<data> without a type attribute"));
            }
            PatternKind::Grammar => {
                return Err(Error::malformed("nested <grammar> is not supported"));
            }
            _ => {}
        }
        self.children.iter().try_for_each(PatternNode::check_well_formed)
    }
}

/// A loaded grammar: the pattern tree plus its namespace declarations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grammar {
    pub root: PatternNode,
    /// prefix → namespace URI; the default namespace has the empty prefix.
    pub namespaces: BTreeMap<String, String>,
}

impl Grammar {
    /// Build a grammar, checking that the tree is well formed.
    pub fn new(root: PatternNode, namespaces: BTreeMap<String, String>) -> Result<Self> {
        if root.kind != PatternKind::Grammar {
            return Err(Error::malformed(format!(
                "root pattern must be <grammar>, found <{}>",
                root.kind
            )));
        }
        root.children
            .iter()
            .try_for_each(PatternNode::check_well_formed)?;
        Ok(Self { root, namespaces })
    }

    /// Top-level `define` patterns in declaration order.
    pub fn defines(&self) -> impl Iterator<Item = &PatternNode> {
        self.root
            .children
            .iter()
            .filter(|c| c.kind == PatternKind::Define)
    }

    /// Every top-level define with the given name (combined defines repeat a name).
    pub fn defines_named(&self, name: &str) -> Vec<&PatternNode> {
        self.defines()
            .filter(|d| d.name.as_deref() == Some(name))
            .collect()
    }

    pub fn define(&self, name: &str) -> Option<&PatternNode> {
        self.defines().find(|d| d.name.as_deref() == Some(name))
    }

    /// Element definitions directly under a top-level define, in declaration order.
    pub fn element_definitions(&self) -> impl Iterator<Item = &PatternNode> {
        self.defines().flat_map(|d| {
            d.children
                .iter()
                .filter(|c| c.kind == PatternKind::Element)
        })
    }

    /// Every top-level definition of the named element.
    pub fn element_definitions_named(&self, name: &str) -> Vec<&PatternNode> {
        self.element_definitions()
            .filter(|e| e.name.as_deref() == Some(name))
            .collect()
    }

    pub fn has_element(&self, name: &str) -> bool {
        self.element_definitions()
            .any(|e| e.name.as_deref() == Some(name))
    }

    /// Prefix the grammar declares for a namespace URI. The default
    /// namespace (empty prefix) never counts.
    pub fn prefix_for(&self, uri: &str) -> Option<&str> {
        self.namespaces
            .iter()
            .find(|(p, u)| !p.is_empty() && u.as_str() == uri)
            .map(|(p, _)| p.as_str())
    }
}

// ---------------------------------------------------------------------------
// Deprecation configuration
// ---------------------------------------------------------------------------

/// Names flagged as deprecated, supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeprecationConfig {
    #[serde(default)]
    pub elements: BTreeSet<String>,
    /// `(element, attribute)` pairs.
    #[serde(default)]
    pub attributes: BTreeSet<(String, String)>,
}

impl DeprecationConfig {
    pub fn is_element_deprecated(&self, element: &str) -> bool {
        self.elements.contains(element)
    }

    pub fn is_attribute_deprecated(&self, element: &str, attribute: &str) -> bool {
        self.attributes
            .contains(&(element.to_string(), attribute.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Catalog (serialized to JSON for the templating step)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Choice {
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeEntry {
    pub name: String,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    pub choices: Vec<Choice>,
    pub is_new: bool,
    pub is_deprecated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub has_choice_descriptions: bool,
    /// Compact rendering of the value pattern, present when the attribute has choices.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rendered: Option<String>,
}

/// A direct content child of an element, with its compact rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChildEntry {
    pub pattern: PatternNode,
    pub rendered: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementEntry {
    pub name: String,
    pub attributes: Vec<AttributeEntry>,
    pub children: Vec<ChildEntry>,
    pub parents: BTreeSet<String>,
    pub is_new: bool,
    pub is_deprecated: bool,
    pub has_deprecated_attributes: bool,
    pub rendered_children: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ElementEntry {
    pub fn attribute(&self, name: &str) -> Option<&AttributeEntry> {
        self.attributes.iter().find(|a| a.name == name)
    }
}

/// Everything the templating step needs: the full compact rendering and the
/// per-element records.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub catalog_version: String,
    pub schema: String,
    pub elements: Vec<ElementEntry>,
}

impl Catalog {
    pub fn new(schema: String, elements: Vec<ElementEntry>) -> Self {
        Self {
            catalog_version: CATALOG_VERSION.to_string(),
            schema,
            elements,
        }
    }

    pub fn element(&self, name: &str) -> Option<&ElementEntry> {
        self.elements.iter().find(|e| e.name == name)
    }

    /// Element names, sorted and deduplicated.
    pub fn element_tags(&self) -> Vec<&str> {
        let tags: BTreeSet<&str> = self.elements.iter().map(|e| e.name.as_str()).collect();
        tags.into_iter().collect()
    }

    /// Element names that are not deprecated, sorted.
    pub fn current_element_tags(&self) -> Vec<&str> {
        let tags: BTreeSet<&str> = self
            .elements
            .iter()
            .filter(|e| !e.is_deprecated)
            .map(|e| e.name.as_str())
            .collect();
        tags.into_iter().collect()
    }
}
