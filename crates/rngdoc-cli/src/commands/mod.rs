pub mod catalog;
pub mod diff;
pub mod render;

use std::path::{Path, PathBuf};

use crate::reader::{Project, CONFIG_FILE};

/// The schema argument, falling back to the config's `schema`.
pub fn schema_path(arg: Option<&Path>, project: Option<&Project>) -> Result<PathBuf, String> {
    arg.map(Path::to_path_buf)
        .or_else(|| project.and_then(Project::schema))
        .ok_or_else(|| format!("No schema given (pass a path or set `schema` in {CONFIG_FILE})"))
}

/// Write `text` to `output` when given, otherwise hand it back for stdout.
pub fn emit(text: String, output: Option<&Path>) -> Result<String, String> {
    if let Some(out_path) = output {
        std::fs::write(out_path, &text)
            .map_err(|e| format!("Failed to write {}: {e}", out_path.display()))?;
        return Ok(format!("Written to {}", out_path.display()));
    }
    Ok(text)
}
