use std::collections::{BTreeMap, BTreeSet, HashSet};

use tracing::{debug, info, info_span};

use crate::catalogs::{IGNORED_ATTRIBUTES, RESERVED_KEYWORDS};
use crate::descriptions::{attribute_key, choice_key, element_key, DescriptionLookup};
use crate::differ::BaselineDiffer;
use crate::error::Result;
use crate::renderer::CompactRenderer;
use crate::resolver::ReferenceResolver;
use crate::types::*;

/// Builds the element/attribute catalog of a grammar.
///
/// Novelty is judged against `baseline`, deprecation comes from the caller's
/// [`DeprecationConfig`], prose from a [`DescriptionLookup`]. The first error
/// aborts the build; no partial catalog is returned.
pub struct CatalogBuilder<'a> {
    grammar: &'a Grammar,
    baseline: &'a Grammar,
    deprecation: &'a DeprecationConfig,
    descriptions: &'a dyn DescriptionLookup,
    keywords: &'a HashSet<&'static str>,
}

impl<'a> CatalogBuilder<'a> {
    pub fn new(
        grammar: &'a Grammar,
        baseline: &'a Grammar,
        deprecation: &'a DeprecationConfig,
        descriptions: &'a dyn DescriptionLookup,
    ) -> Self {
        Self {
            grammar,
            baseline,
            deprecation,
            descriptions,
            keywords: &RESERVED_KEYWORDS,
        }
    }

    /// Replace the reserved compact-syntax keywords used when rendering.
    pub fn with_keywords(mut self, keywords: &'a HashSet<&'static str>) -> Self {
        self.keywords = keywords;
        self
    }

    pub fn build(&self) -> Result<Catalog> {
        let _span = info_span!("build_catalog").entered();

        let resolver = ReferenceResolver::new(self.grammar);
        resolver.check_references()?;

        let renderer = CompactRenderer::new(self.grammar, &self.deprecation.elements)
            .with_keywords(self.keywords);
        let differ = BaselineDiffer::new(self.baseline);

        let schema = renderer.render(&self.grammar.root)?;

        let mut elements: Vec<ElementEntry> = Vec::new();
        // child element → elements whose definition references it
        let mut parents: BTreeMap<&str, BTreeSet<String>> = BTreeMap::new();

        for element in self.grammar.element_definitions() {
            let entry = self.build_element(element, &renderer, &differ)?;
            for child in resolver.referenced_elements(element)? {
                parents
                    .entry(child)
                    .or_default()
                    .insert(entry.name.clone());
            }
            debug!(
                element = %entry.name,
                attributes = entry.attributes.len(),
                children = entry.children.len(),
                is_new = entry.is_new,
                "cataloged element"
            );
            elements.push(entry);
        }

        for entry in &mut elements {
            if let Some(p) = parents.get(entry.name.as_str()) {
                entry.parents = p.clone();
            }
        }

        info!(
            elements = elements.len(),
            new = elements.iter().filter(|e| e.is_new).count(),
            "built catalog"
        );
        Ok(Catalog::new(schema, elements))
    }

    fn describe(&self, key: &str) -> Option<String> {
        self.descriptions.lookup(key).map(str::to_string)
    }

    fn build_element(
        &self,
        element: &PatternNode,
        renderer: &CompactRenderer<'_>,
        differ: &BaselineDiffer<'_>,
    ) -> Result<ElementEntry> {
        let name = element.name_str();

        let mut attributes = Vec::new();
        for (parent, node) in element.descendants_with_parent() {
            if !node.is(PatternKind::Attribute) || IGNORED_ATTRIBUTES.contains(node.name_str()) {
                continue;
            }
            attributes.push(self.build_attribute(name, parent, node, renderer, differ)?);
        }
        attributes.sort_by(|a, b| a.name.cmp(&b.name));

        // Content children: anything that is not an attribute and does not
        // directly wrap one.
        let mut children = Vec::new();
        for child in &element.children {
            if child.is(PatternKind::Attribute)
                || child.children.iter().any(|c| c.is(PatternKind::Attribute))
            {
                continue;
            }
            children.push(ChildEntry {
                rendered: renderer.render(child)?,
                pattern: child.clone(),
            });
        }
        let rendered_children = children
            .iter()
            .map(|c| c.rendered.as_str())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ");

        let has_deprecated_attributes = attributes.iter().any(|a| a.is_deprecated);

        Ok(ElementEntry {
            name: name.to_string(),
            attributes,
            children,
            parents: BTreeSet::new(),
            is_new: differ.is_new_element(name),
            is_deprecated: self.deprecation.is_element_deprecated(name),
            has_deprecated_attributes,
            rendered_children,
            description: self.describe(&element_key(name)),
        })
    }

    fn build_attribute(
        &self,
        element: &str,
        parent: &PatternNode,
        node: &PatternNode,
        renderer: &CompactRenderer<'_>,
        differ: &BaselineDiffer<'_>,
    ) -> Result<AttributeEntry> {
        let name = node.name_str();

        let values: Vec<&PatternNode> = node
            .children
            .iter()
            .filter(|c| c.is(PatternKind::Choice))
            .flat_map(|c| c.children.iter())
            .filter(|v| v.is(PatternKind::Value))
            .collect();

        let choices: Vec<Choice> = values
            .iter()
            .map(|v| {
                let value = v.text.clone().unwrap_or_default();
                Choice {
                    description: self.describe(&choice_key(element, name, &value)),
                    value,
                }
            })
            .collect();

        let rendered = match node.children.first() {
            Some(first) if !choices.is_empty() => Some(renderer.render(first)?),
            _ => None,
        };

        let has_choice_descriptions = choices
            .iter()
            .any(|c| c.description.as_deref().is_some_and(|d| !d.is_empty()));

        Ok(AttributeEntry {
            name: name.to_string(),
            required: !parent.is(PatternKind::Optional),
            default: node
                .default_value()
                .filter(|d| !d.is_empty())
                .map(str::to_string),
            choices,
            is_new: differ.is_new_attribute(element, name),
            is_deprecated: self.deprecation.is_attribute_deprecated(element, name),
            description: self.describe(&attribute_key(element, name)),
            has_choice_descriptions,
            rendered,
        })
    }
}

/// Build the catalog of `grammar` in one call.
pub fn build_catalog(
    grammar: &Grammar,
    baseline: &Grammar,
    deprecation: &DeprecationConfig,
    descriptions: &dyn DescriptionLookup,
) -> Result<Catalog> {
    CatalogBuilder::new(grammar, baseline, deprecation, descriptions).build()
}

/// Compact rendering of the whole grammar.
pub fn render_grammar(grammar: &Grammar, deprecation: &DeprecationConfig) -> Result<String> {
    CompactRenderer::new(grammar, &deprecation.elements).render(&grammar.root)
}
