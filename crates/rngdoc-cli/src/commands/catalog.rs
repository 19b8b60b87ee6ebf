use std::path::{Path, PathBuf};

use tracing::info;

use rngdoc_core::{build_catalog, Error};

use crate::commands::{emit, schema_path};
use crate::reader::{find_project, read_baseline, read_descriptions, read_grammar, Project};

pub struct CatalogArgs<'a> {
    pub schema: Option<&'a Path>,
    pub baseline: Option<&'a Path>,
    /// Extra description files, merged after the config's.
    pub descriptions: &'a [PathBuf],
    pub config: Option<&'a Path>,
    pub output: Option<&'a Path>,
}

pub fn run_catalog(args: &CatalogArgs<'_>) -> Result<String, String> {
    let project = find_project(args.config)?;
    let schema = schema_path(args.schema, project.as_ref())?;
    let baseline_path = args
        .baseline
        .map(Path::to_path_buf)
        .or_else(|| project.as_ref().and_then(Project::baseline))
        .ok_or_else(|| {
            Error::baseline("no baseline given (use --baseline or set `baseline` in the config)")
                .to_string()
        })?;

    let mut description_files = match &project {
        Some(p) => p.description_files()?,
        None => Vec::new(),
    };
    description_files.extend(args.descriptions.iter().cloned());

    let grammar = read_grammar(&schema)?;
    let baseline = read_baseline(&baseline_path)?;
    let descriptions = read_descriptions(&description_files)?;
    let deprecation = project
        .as_ref()
        .map(Project::deprecation)
        .unwrap_or_default();

    let catalog = build_catalog(&grammar, &baseline, &deprecation, &descriptions)
        .map_err(|e| e.to_string())?;
    info!(
        schema = %schema.display(),
        baseline = %baseline_path.display(),
        elements = catalog.elements.len(),
        "built catalog"
    );

    let json = serde_json::to_string_pretty(&catalog)
        .map_err(|e| format!("JSON serialization error: {e}"))?;
    emit(json, args.output)
}
