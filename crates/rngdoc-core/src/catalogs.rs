use std::collections::HashSet;
use std::sync::LazyLock;

/// RELAX NG structure namespace.
pub const RNG_NS: &str = "http://relaxng.org/ns/structure/1.0";

/// RELAX NG DTD-compatibility annotations namespace (`a:defaultValue`).
pub const ANNOTATIONS_NS: &str = "http://relaxng.org/ns/compatibility/annotations/1.0";

/// Prefix used for the default-value annotation when the grammar does not
/// declare one for [`ANNOTATIONS_NS`].
pub const DEFAULT_ANNOTATIONS_PREFIX: &str = "a";

/// Clark-notation key of the default-value annotation attribute.
pub static DEFAULT_VALUE_KEY: LazyLock<String> =
    LazyLock::new(|| format!("{{{ANNOTATIONS_NS}}}defaultValue"));

/// RELAX NG compact-syntax keywords. Identifiers that collide with one of
/// these are written with a leading backslash.
pub static RESERVED_KEYWORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    let mut s = HashSet::new();
    s.insert("attribute");
    s.insert("default");
    s.insert("datatypes");
    s.insert("div");
    s.insert("element");
    s.insert("empty");
    s.insert("external");
    s.insert("grammar");
    s.insert("include");
    s.insert("inherit");
    s.insert("list");
    s.insert("mixed");
    s.insert("namespace");
    s.insert("notAllowed");
    s.insert("parent");
    s.insert("start");
    s.insert("string");
    s.insert("text");
    s.insert("token");
    s
});

/// Attributes left out of the element catalog.
/// Structural, derived or internal bookkeeping attributes with nothing to document.
pub static IGNORED_ATTRIBUTES: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    let mut s = HashSet::new();
    // XML built-ins
    s.insert("xml:base");
    s.insert("xml:lang");
    s.insert("xml:space");
    // Filled in by the preparation step
    s.insert("derivedAnchor");
    s.insert("derivedContent");
    s.insert("derivedCounter");
    s.insert("derivedLink");
    s.insert("displayFormat");
    s.insert("expiresDate");
    s.insert("mode");
    s.insert("originalSrc");
    s.insert("pn");
    s.insert("quoteTitle");
    s.insert("pageno");
    s.insert("scripts");
    s.insert("slugifiedName");
    s
});

/// Catalog format version, bumped whenever the JSON shape changes.
pub const CATALOG_VERSION: &str = "1.0";
