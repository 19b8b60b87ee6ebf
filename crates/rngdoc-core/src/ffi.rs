//! FFI-oriented JSON API for embedding hosts.
//!
//! All functions take string inputs and return JSON strings of the shape
//! `{ "success": bool, "data"?: ..., "error"?: "...", "code"?: "..." }`.

use std::collections::BTreeSet;
use std::panic::{catch_unwind, AssertUnwindSafe};

use serde::{Deserialize, Serialize};

use crate::catalog::{build_catalog, render_grammar};
use crate::descriptions::Descriptions;
use crate::error::Result;
use crate::parser::{parse_baseline, parse_grammar};
use crate::types::*;

// ---------------------------------------------------------------------------
// Options types (deserialized from JSON input)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogOptions {
    #[serde(default)]
    pub deprecated_elements: BTreeSet<String>,
    /// `[element, attribute]` pairs.
    #[serde(default)]
    pub deprecated_attributes: BTreeSet<(String, String)>,
    #[serde(default)]
    pub descriptions: Descriptions,
}

impl CatalogOptions {
    pub fn deprecation(&self) -> DeprecationConfig {
        DeprecationConfig {
            elements: self.deprecated_elements.clone(),
            attributes: self.deprecated_attributes.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Result types (serialized to JSON output)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct FfiResult<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
}

impl FfiResult<()> {
    fn failure(error: String, code: Option<&'static str>) -> String {
        let result = FfiResult::<()> {
            success: false,
            data: None,
            error: Some(error),
            code,
        };
        serde_json::to_string(&result)
            .unwrap_or_else(|_| r#"{"success":false,"error":"serialization failed"}"#.to_string())
    }
}

fn respond<T: Serialize>(outcome: std::thread::Result<Result<T>>) -> String {
    match outcome {
        Ok(Ok(data)) => {
            let result = FfiResult {
                success: true,
                data: Some(data),
                error: None,
                code: None,
            };
            serde_json::to_string(&result).unwrap_or_else(|e| {
                FfiResult::<()>::failure(format!("JSON serialization error: {e}"), None)
            })
        }
        Ok(Err(e)) => FfiResult::<()>::failure(e.to_string(), Some(e.code())),
        Err(_) => FfiResult::<()>::failure("Internal renderer panic".to_string(), None),
    }
}

// ---------------------------------------------------------------------------
// Public FFI functions
// ---------------------------------------------------------------------------

/// Render a grammar to compact syntax.
///
/// Input: RELAX NG XML text
/// Output: JSON string whose `data` is the compact rendering
pub fn render_to_json(rng: &str) -> String {
    respond(catch_unwind(|| {
        let grammar = parse_grammar(rng)?;
        render_grammar(&grammar, &DeprecationConfig::default())
    }))
}

/// Build the documentation catalog of a grammar.
///
/// Input: RELAX NG XML text of the current and baseline grammars, plus an
/// options JSON object (`deprecatedElements`, `deprecatedAttributes`,
/// `descriptions`); an empty options string means defaults.
/// Output: JSON string whose `data` is the catalog
pub fn catalog_to_json(rng: &str, baseline_rng: &str, options_json: &str) -> String {
    let opts: CatalogOptions = if options_json.trim().is_empty() {
        CatalogOptions::default()
    } else {
        match serde_json::from_str(options_json) {
            Ok(o) => o,
            Err(e) => return FfiResult::<()>::failure(format!("Invalid options JSON: {e}"), None),
        }
    };

    respond(catch_unwind(AssertUnwindSafe(|| {
        let grammar = parse_grammar(rng)?;
        let baseline = parse_baseline(baseline_rng)?;
        build_catalog(&grammar, &baseline, &opts.deprecation(), &opts.descriptions)
    })))
}
