use std::path::Path;

use tracing::info;

use rngdoc_core::render_grammar;

use crate::commands::{emit, schema_path};
use crate::reader::{find_project, read_grammar};

pub fn run_render(
    schema: Option<&Path>,
    config: Option<&Path>,
    output: Option<&Path>,
) -> Result<String, String> {
    let project = find_project(config)?;
    let schema = schema_path(schema, project.as_ref())?;
    let grammar = read_grammar(&schema)?;
    let deprecation = project.map(|p| p.deprecation()).unwrap_or_default();

    let text = render_grammar(&grammar, &deprecation).map_err(|e| e.to_string())?;
    info!(schema = %schema.display(), "rendered grammar");
    emit(text, output)
}
