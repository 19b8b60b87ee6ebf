pub mod catalog;
pub mod catalogs;
pub mod descriptions;
pub mod differ;
pub mod error;
pub mod ffi;
pub mod parser;
pub mod renderer;
pub mod resolver;
pub mod types;

pub use catalog::{build_catalog, render_grammar, CatalogBuilder};
pub use catalogs::{CATALOG_VERSION, RESERVED_KEYWORDS};
pub use descriptions::{DescriptionLookup, Descriptions, NoDescriptions};
pub use differ::{diff_grammars, BaselineDiffer, GrammarDiff};
pub use error::{Error, Result};
pub use ffi::{catalog_to_json, render_to_json};
pub use parser::{parse_baseline, parse_grammar};
pub use renderer::CompactRenderer;
pub use resolver::ReferenceResolver;
pub use types::*;
