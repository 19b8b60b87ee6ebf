use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

use rngdoc_core::{parse_baseline, parse_grammar, DeprecationConfig, Descriptions, Error, Grammar};

pub const CONFIG_FILE: &str = "rngdoc.config.yaml";

/// Project configuration from rngdoc.config.yaml.
#[derive(Debug, Default, Deserialize)]
pub struct RngdocConfig {
    pub schema: Option<String>,
    pub baseline: Option<String>,
    /// Glob patterns; matched files are merged in order, later keys win.
    #[serde(default)]
    pub descriptions: Vec<String>,
    #[serde(default)]
    pub deprecated_elements: Vec<String>,
    /// `[element, attribute]` pairs.
    #[serde(default)]
    pub deprecated_attributes: Vec<(String, String)>,
}

/// A loaded config together with the directory its relative paths start from.
#[derive(Debug)]
pub struct Project {
    pub base_dir: PathBuf,
    pub config: RngdocConfig,
}

impl Project {
    pub fn path(&self, relative: &str) -> PathBuf {
        self.base_dir.join(relative)
    }

    pub fn schema(&self) -> Option<PathBuf> {
        self.config.schema.as_deref().map(|p| self.path(p))
    }

    pub fn baseline(&self) -> Option<PathBuf> {
        self.config.baseline.as_deref().map(|p| self.path(p))
    }

    pub fn deprecation(&self) -> DeprecationConfig {
        DeprecationConfig {
            elements: self.config.deprecated_elements.iter().cloned().collect(),
            attributes: self.config.deprecated_attributes.iter().cloned().collect(),
        }
    }

    /// Description files matched by the config's glob patterns, pattern by
    /// pattern, each pattern's matches sorted.
    pub fn description_files(&self) -> Result<Vec<PathBuf>, String> {
        let mut files: Vec<PathBuf> = Vec::new();
        let mut seen: HashSet<PathBuf> = HashSet::new();

        for pattern in &self.config.descriptions {
            let full_pattern = self.base_dir.join(pattern);
            let pattern_str = full_pattern.to_string_lossy().replace('\\', "/");
            let entries = glob::glob(&pattern_str)
                .map_err(|e| format!("Invalid glob pattern '{}': {}", pattern, e))?;

            let mut matched: Vec<PathBuf> = Vec::new();
            for entry in entries {
                match entry {
                    Ok(path) => {
                        if seen.insert(path.clone()) {
                            matched.push(path);
                        }
                    }
                    Err(e) => return Err(format!("Glob error: {}", e)),
                }
            }
            if matched.is_empty() {
                debug!(pattern = %pattern, "description pattern matched no files");
            }
            matched.sort();
            files.extend(matched);
        }

        Ok(files)
    }
}

/// Load the project config: the explicit path if given, otherwise
/// rngdoc.config.yaml in the current directory when it exists.
pub fn find_project(explicit: Option<&Path>) -> Result<Option<Project>, String> {
    match explicit {
        Some(path) => read_project(path).map(Some),
        None => {
            let default = Path::new(CONFIG_FILE);
            if default.exists() {
                read_project(default).map(Some)
            } else {
                Ok(None)
            }
        }
    }
}

pub fn read_project(config_path: &Path) -> Result<Project, String> {
    let yaml_content = read_text(config_path)?;
    let config: RngdocConfig = if yaml_content.trim().is_empty() {
        RngdocConfig::default()
    } else {
        serde_yaml::from_str(&yaml_content)
            .map_err(|e| format!("Invalid YAML config {}: {}", config_path.display(), e))?
    };
    let base_dir = config_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    debug!(config = %config_path.display(), "loaded project config");
    Ok(Project { base_dir, config })
}

pub fn read_text(path: &Path) -> Result<String, String> {
    if !path.exists() {
        return Err(format!("Path does not exist: {}", path.display()));
    }
    fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path.display(), e))
}

pub fn read_grammar(path: &Path) -> Result<Grammar, String> {
    let xml = read_text(path)?;
    parse_grammar(&xml).map_err(|e| format!("{}: {}", path.display(), e))
}

/// A missing or unreadable baseline is a baseline error, not a plain I/O error.
pub fn read_baseline(path: &Path) -> Result<Grammar, String> {
    let xml = fs::read_to_string(path)
        .map_err(|e| Error::baseline(format!("{}: {}", path.display(), e)).to_string())?;
    parse_baseline(&xml).map_err(|e| e.to_string())
}

/// Read and merge description files in order; later files win.
pub fn read_descriptions(paths: &[PathBuf]) -> Result<Descriptions, String> {
    let mut merged = Descriptions::new();
    for path in paths {
        let yaml = read_text(path)?;
        let descriptions = parse_descriptions(&yaml)
            .map_err(|e| format!("Invalid descriptions file {}: {}", path.display(), e))?;
        debug!(path = %path.display(), entries = descriptions.len(), "read descriptions");
        merged.merge(descriptions);
    }
    if !paths.is_empty() {
        info!(files = paths.len(), entries = merged.len(), "loaded descriptions");
    }
    Ok(merged)
}

/// Parse one description file. Entries whose key or value is not a string
/// are skipped.
pub fn parse_descriptions(yaml: &str) -> Result<Descriptions, String> {
    let text = escape_markup(yaml);
    if text.trim().is_empty() {
        return Ok(Descriptions::new());
    }
    let mapping: Option<serde_yaml::Mapping> =
        serde_yaml::from_str(&text).map_err(|e| e.to_string())?;

    let mut descriptions = Descriptions::new();
    for (key, value) in mapping.iter().flatten() {
        if let (Some(k), Some(v)) = (key.as_str(), value.as_str()) {
            descriptions.insert(k, v);
        }
    }
    Ok(descriptions)
}

/// Authors write `\<`, `\>` and `\&` for literal markup characters; the
/// templates expect entities.
fn escape_markup(text: &str) -> String {
    text.replace("\\<", "&lt;")
        .replace("\\>", "&gt;")
        .replace("\\&", "&amp;")
}
