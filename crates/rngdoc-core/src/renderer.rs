//! RELAX NG compact-syntax renderer.
//!
//! Turns a pattern tree into readable compact-syntax text. The output is meant
//! for display next to prose documentation; it is not guaranteed to parse
//! back into the same grammar.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::LazyLock;

use regex::Regex;

use crate::catalogs::{ANNOTATIONS_NS, DEFAULT_ANNOTATIONS_PREFIX, RESERVED_KEYWORDS};
use crate::error::{Error, Result};
use crate::types::*;

/// Runs of blank or whitespace-only lines inside an element body.
static RE_BLANK_LINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\n[ \t]*)+\n").unwrap());
/// A single-line rendering wrapped in parentheses.
static RE_PARENTHESIZED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\(.*\)$").unwrap());

/// Renders pattern nodes of one grammar.
///
/// The context (namespace prefixes, reserved keywords, deprecated element
/// names) is fixed at construction, so rendering the same node twice always
/// yields the same text.
pub struct CompactRenderer<'a> {
    namespaces: &'a BTreeMap<String, String>,
    annotations_prefix: &'a str,
    keywords: &'a HashSet<&'static str>,
    deprecated: &'a BTreeSet<String>,
}

impl<'a> CompactRenderer<'a> {
    /// Create a renderer for `grammar`. References to any element named in
    /// `deprecated` are dropped from the output.
    pub fn new(grammar: &'a Grammar, deprecated: &'a BTreeSet<String>) -> Self {
        Self {
            namespaces: &grammar.namespaces,
            annotations_prefix: grammar
                .prefix_for(ANNOTATIONS_NS)
                .unwrap_or(DEFAULT_ANNOTATIONS_PREFIX),
            keywords: &RESERVED_KEYWORDS,
            deprecated,
        }
    }

    /// Replace the reserved-keyword set used for escaping identifiers.
    pub fn with_keywords(mut self, keywords: &'a HashSet<&'static str>) -> Self {
        self.keywords = keywords;
        self
    }

    pub fn render(&self, node: &PatternNode) -> Result<String> {
        match node.kind {
            PatternKind::Text => Ok("text".to_string()),
            PatternKind::Empty => Ok("empty".to_string()),
            PatternKind::Value => Ok(format!("\"{}\"", node.text.as_deref().unwrap_or_default())),
            PatternKind::Data => Ok(format!("xsd:{}", node.attr("type").unwrap_or_default())),
            PatternKind::Ref => Ok(self.render_ref(node)),
            PatternKind::ZeroOrMore => self.render_repeat(node, "( ", " )", " *"),
            PatternKind::OneOrMore => self.render_repeat(node, "( ", " )", " +"),
            PatternKind::Optional => self.render_repeat(node, "(", ")", " ?"),
            PatternKind::Choice => self.render_alternation(node, "|"),
            PatternKind::Interleave => self.render_alternation(node, "&"),
            PatternKind::Element => self.render_element(node),
            PatternKind::Attribute => self.render_attribute(node),
            PatternKind::Define => self.render_define(node),
            PatternKind::Grammar => self.render_grammar(node),
            PatternKind::Include => Ok(format!(
                "include \"{}\"",
                node.attr("href").unwrap_or_default().replace(".rng", ".rnc")
            )),
            PatternKind::Start => self.render_start(node),
        }
    }

    /// Render every child and join the non-empty results.
    /// Returns the joined text and how many children contributed to it.
    fn join_children(&self, node: &PatternNode, sep: &str) -> Result<(String, usize)> {
        let mut parts = Vec::with_capacity(node.children.len());
        for child in &node.children {
            let text = self.render(child)?;
            if !text.is_empty() {
                parts.push(text);
            }
        }
        Ok((parts.join(sep), parts.len()))
    }

    fn escape<'n>(&self, name: &'n str) -> Cow<'n, str> {
        if self.keywords.contains(name) {
            Cow::Owned(format!("\\{name}"))
        } else {
            Cow::Borrowed(name)
        }
    }

    fn render_ref(&self, node: &PatternNode) -> String {
        let name = node.name_str();
        if self.deprecated.contains(name) {
            return String::new();
        }
        self.escape(name).into_owned()
    }

    fn render_repeat(
        &self,
        node: &PatternNode,
        open: &str,
        close: &str,
        suffix: &str,
    ) -> Result<String> {
        let (joined, count) = self.join_children(node, ", ")?;
        if joined.is_empty() {
            return Ok(joined);
        }
        let sub = if count > 1 {
            format!("{open}{joined}{close}")
        } else {
            joined
        };
        Ok(format!("{sub}{suffix}"))
    }

    fn render_alternation(&self, node: &PatternNode, op: &str) -> Result<String> {
        let (joined, count) = self.join_children(node, &format!(" {op} "))?;
        let sub = if count > 1 {
            format!("( {joined} )")
        } else {
            joined
        };
        Ok(break_alternatives(&sub, op))
    }

    fn render_element(&self, node: &PatternNode) -> Result<String> {
        let (joined, _) = self.join_children(node, ",\n    ")?;
        let text = format!("element {} {{\n    {}\n  }}\n", node.name_str(), joined);
        Ok(RE_BLANK_LINES.replace_all(&text, "\n").into_owned())
    }

    fn render_attribute(&self, node: &PatternNode) -> Result<String> {
        let sub = if node.children.is_empty() {
            "text".to_string()
        } else {
            let (joined, count) = self.join_children(node, ", ")?;
            if count == 1 && RE_PARENTHESIZED.is_match(&joined) {
                joined[1..joined.len() - 1].to_string()
            } else {
                joined
            }
        };

        let mut text = String::new();
        if let Some(default) = node.default_value() {
            let prefix = self.annotations_prefix;
            text.push_str(&format!("\n    [ {prefix}:defaultValue = \"{default}\" ]\n    "));
        }
        text.push_str(&format!("attribute {} {{ {} }}", node.name_str(), sub));
        Ok(text)
    }

    fn render_define(&self, node: &PatternNode) -> Result<String> {
        let (joined, _) = self.join_children(node, ",\n")?;
        Ok(format!("{} =\n  {}\n", self.escape(node.name_str()), joined))
    }

    fn render_grammar(&self, node: &PatternNode) -> Result<String> {
        let mut text = String::from("\n");
        for (prefix, uri) in self.namespaces {
            if !prefix.is_empty() {
                text.push_str(&format!("namespace {prefix} = \"{uri}\"\n"));
            }
        }
        for child in &node.children {
            text.push_str(&self.render(child)?);
            text.push('\n');
        }
        Ok(text)
    }

    fn render_start(&self, node: &PatternNode) -> Result<String> {
        let op = match node.attr("combine") {
            None => "=",
            Some("choice") => "|=",
            Some("interleave") => "&=",
            Some(other) => {
                return Err(Error::UnsupportedCombineMode {
                    mode: other.to_string(),
                })
            }
        };
        let (joined, _) = self.join_children(node, ", ")?;
        Ok(format!("start {op} {joined}"))
    }
}

/// Put each parenthesized alternative of a rendered choice (`|`) or
/// interleave (`&`) on its own line.
///
/// This is a textual pass over already-rendered output, applied the same way
/// at every nesting depth.
pub fn break_alternatives(text: &str, op: &str) -> String {
    text.replace(&format!(")* {op} ("), &format!(")*\n{op} ("))
        .replace(&format!(") {op} ("), &format!(")\n{op} ("))
        .replace(&format!(")+ {op} ("), &format!(")+\n{op} ("))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogs::DEFAULT_VALUE_KEY;
    use pretty_assertions::assert_eq;

    fn grammar_with(namespaces: &[(&str, &str)]) -> Grammar {
        let ns = namespaces
            .iter()
            .map(|(p, u)| (p.to_string(), u.to_string()))
            .collect();
        Grammar::new(PatternNode::new(PatternKind::Grammar), ns).unwrap()
    }

    fn r(name: &str) -> PatternNode {
        PatternNode::named(PatternKind::Ref, name)
    }

    fn v(text: &str) -> PatternNode {
        PatternNode::new(PatternKind::Value).with_text(text)
    }

    fn render(node: &PatternNode) -> String {
        let g = grammar_with(&[("a", ANNOTATIONS_NS)]);
        let deprecated: BTreeSet<String> = ["c".to_string()].into();
        CompactRenderer::new(&g, &deprecated).render(node).unwrap()
    }

    #[test]
    fn leaves() {
        assert_eq!(render(&PatternNode::new(PatternKind::Text)), "text");
        assert_eq!(render(&PatternNode::new(PatternKind::Empty)), "empty");
        assert_eq!(render(&v("yes")), "\"yes\"");
        assert_eq!(
            render(&PatternNode::new(PatternKind::Data).with_attr("type", "nonNegativeInteger")),
            "xsd:nonNegativeInteger"
        );
        assert_eq!(render(&r("xref")), "xref");
    }

    #[test]
    fn keyword_refs_are_escaped() {
        assert_eq!(render(&r("text")), "\\text");
        assert_eq!(render(&r("list")), "\\list");
    }

    #[test]
    fn custom_keyword_set() {
        let g = grammar_with(&[]);
        let none = BTreeSet::new();
        let keywords: HashSet<&'static str> = ["section"].into();
        let renderer = CompactRenderer::new(&g, &none).with_keywords(&keywords);
        assert_eq!(renderer.render(&r("section")).unwrap(), "\\section");
        assert_eq!(renderer.render(&r("text")).unwrap(), "text");
    }

    #[test]
    fn deprecated_refs_vanish() {
        assert_eq!(render(&r("c")), "");
        let choice = PatternNode::new(PatternKind::Choice).with_children([r("a"), r("c"), r("b")]);
        assert_eq!(render(&choice), "( a | b )");
        let single = PatternNode::new(PatternKind::Choice).with_children([r("c"), r("a")]);
        assert_eq!(render(&single), "a");
        let gone = PatternNode::new(PatternKind::ZeroOrMore).with_child(r("c"));
        assert_eq!(render(&gone), "");
    }

    #[test]
    fn repeats() {
        let zero = PatternNode::new(PatternKind::ZeroOrMore).with_child(r("xref"));
        assert_eq!(render(&zero), "xref *");
        let one = PatternNode::new(PatternKind::OneOrMore).with_children([r("t"), r("ul")]);
        assert_eq!(render(&one), "( t, ul ) +");
        let opt = PatternNode::new(PatternKind::Optional).with_children([r("name"), r("date")]);
        assert_eq!(render(&opt), "(name, date) ?");
        let opt_one = PatternNode::new(PatternKind::Optional).with_children([r("name"), r("c")]);
        assert_eq!(render(&opt_one), "name ?");
    }

    #[test]
    fn choice_of_values_is_wrapped() {
        let choice =
            PatternNode::new(PatternKind::Choice).with_children([v("yes"), v("no"), v("maybe")]);
        assert_eq!(render(&choice), "( \"yes\" | \"no\" | \"maybe\" )");
    }

    #[test]
    fn nested_alternatives_break_lines() {
        let inner1 = PatternNode::new(PatternKind::Choice).with_children([r("a"), r("b")]);
        let inner2 = PatternNode::new(PatternKind::Choice).with_children([r("d"), r("e")]);
        let outer = PatternNode::new(PatternKind::Choice).with_children([inner1, inner2]);
        assert_eq!(render(&outer), "( ( a | b )\n| ( d | e ) )");

        let i1 = PatternNode::new(PatternKind::Interleave).with_children([r("a"), r("b")]);
        let i2 = PatternNode::new(PatternKind::Interleave).with_children([r("d"), r("e")]);
        let outer = PatternNode::new(PatternKind::Interleave).with_children([i1, i2]);
        assert_eq!(render(&outer), "( ( a & b )\n& ( d & e ) )");
    }

    #[test]
    fn break_alternatives_rules() {
        assert_eq!(break_alternatives("(a)* | (b)", "|"), "(a)*\n| (b)");
        assert_eq!(break_alternatives("(a)+ & (b)", "&"), "(a)+\n& (b)");
        assert_eq!(break_alternatives("(a) | b", "|"), "(a) | b");
    }

    #[test]
    fn element_body() {
        let el = PatternNode::named(PatternKind::Element, "p").with_children([
            PatternNode::new(PatternKind::Optional).with_child(
                PatternNode::named(PatternKind::Attribute, "anchor")
                    .with_child(PatternNode::new(PatternKind::Data).with_attr("type", "ID")),
            ),
            PatternNode::new(PatternKind::ZeroOrMore).with_child(r("t")),
        ]);
        assert_eq!(
            render(&el),
            "element p {\n    attribute anchor { xsd:ID } ?,\n    t *\n  }\n"
        );
    }

    #[test]
    fn element_collapses_blank_lines() {
        let el = PatternNode::named(PatternKind::Element, "p").with_child(
            PatternNode::named(PatternKind::Attribute, "k").with_attr(DEFAULT_VALUE_KEY.as_str(), "x"),
        );
        assert_eq!(
            render(&el),
            "element p {\n    [ a:defaultValue = \"x\" ]\n    attribute k { text }\n  }\n"
        );
    }

    #[test]
    fn attribute_default_block() {
        let attr = PatternNode::named(PatternKind::Attribute, "indent")
            .with_attr(DEFAULT_VALUE_KEY.as_str(), "");
        assert_eq!(
            render(&attr),
            "\n    [ a:defaultValue = \"\" ]\n    attribute indent { text }"
        );
    }

    #[test]
    fn attribute_default_uses_declared_prefix() {
        let g = grammar_with(&[("ann", ANNOTATIONS_NS)]);
        let none = BTreeSet::new();
        let attr = PatternNode::named(PatternKind::Attribute, "x")
            .with_attr(DEFAULT_VALUE_KEY.as_str(), "1");
        let text = CompactRenderer::new(&g, &none).render(&attr).unwrap();
        assert!(text.contains("[ ann:defaultValue = \"1\" ]"));
    }

    #[test]
    fn attribute_default_ignores_default_namespace_prefix() {
        let g = grammar_with(&[("", ANNOTATIONS_NS)]);
        let none = BTreeSet::new();
        let attr = PatternNode::named(PatternKind::Attribute, "x")
            .with_attr(DEFAULT_VALUE_KEY.as_str(), "1");
        let text = CompactRenderer::new(&g, &none).render(&attr).unwrap();
        assert!(text.contains("[ a:defaultValue = \"1\" ]"), "{text}");
        assert!(!text.contains("[ :defaultValue"));
    }

    #[test]
    fn attribute_strips_single_parenthesized_child() {
        let attr = PatternNode::named(PatternKind::Attribute, "toc").with_child(
            PatternNode::new(PatternKind::Choice).with_children([v("yes"), v("no")]),
        );
        assert_eq!(render(&attr), "attribute toc {  \"yes\" | \"no\"  }");
    }

    #[test]
    fn define_and_start() {
        let define = PatternNode::named(PatternKind::Define, "start")
            .with_children([r("rfc"), r("c"), r("back")]);
        assert_eq!(render(&define), "\\start =\n  rfc,\nback\n");

        let start = PatternNode::new(PatternKind::Start).with_child(r("rfc"));
        assert_eq!(render(&start), "start = rfc");
        let start = start.with_attr("combine", "choice");
        assert_eq!(render(&start), "start |= rfc");
        let start = start.with_attr("combine", "interleave");
        assert_eq!(render(&start), "start &= rfc");
    }

    #[test]
    fn unknown_combine_mode_fails() {
        let g = grammar_with(&[]);
        let none = BTreeSet::new();
        let start = PatternNode::new(PatternKind::Start)
            .with_attr("combine", "replace")
            .with_child(r("rfc"));
        let err = CompactRenderer::new(&g, &none).render(&start).unwrap_err();
        assert_eq!(
            err,
            Error::UnsupportedCombineMode {
                mode: "replace".into()
            }
        );
    }

    #[test]
    fn include_swaps_extension() {
        let inc = PatternNode::new(PatternKind::Include).with_attr("href", "common.rng");
        assert_eq!(render(&inc), "include \"common.rnc\"");
    }

    #[test]
    fn grammar_declares_prefixed_namespaces() {
        let g = grammar_with(&[
            ("", "http://relaxng.org/ns/structure/1.0"),
            ("a", ANNOTATIONS_NS),
        ]);
        let none = BTreeSet::new();
        let root = PatternNode::new(PatternKind::Grammar).with_child(
            PatternNode::named(PatternKind::Define, "note")
                .with_child(PatternNode::named(PatternKind::Element, "note")
                    .with_child(PatternNode::new(PatternKind::Text))),
        );
        let text = CompactRenderer::new(&g, &none).render(&root).unwrap();
        assert_eq!(
            text,
            format!(
                "\nnamespace a = \"{ANNOTATIONS_NS}\"\nnote =\n  element note {{\n    text\n  }}\n\n\n"
            )
        );
    }

    #[test]
    fn rendering_is_idempotent() {
        let el = PatternNode::named(PatternKind::Element, "list").with_children([
            PatternNode::new(PatternKind::Choice).with_children([v("a"), v("b")]),
            PatternNode::new(PatternKind::OneOrMore).with_child(r("li")),
        ]);
        assert_eq!(render(&el), render(&el));
    }
}
