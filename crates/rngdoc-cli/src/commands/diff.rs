use std::path::Path;

use rngdoc_core::{diff_grammars, GrammarDiff};

use crate::reader::{read_baseline, read_grammar};

pub fn run_diff(baseline_path: &Path, current_path: &Path, format: &str) -> Result<String, String> {
    let baseline = read_baseline(baseline_path)?;
    let current = read_grammar(current_path)?;
    let diff = diff_grammars(&baseline, &current);

    if format == "json" {
        return serde_json::to_string_pretty(&diff)
            .map_err(|e| format!("JSON serialization error: {e}"));
    }
    Ok(format_diff(&diff))
}

fn format_diff(diff: &GrammarDiff) -> String {
    if diff.is_empty() {
        return "No differences found.".to_string();
    }

    let mut lines: Vec<String> = Vec::new();
    for name in &diff.added_elements {
        lines.push(format!("+ element {name}"));
    }
    for name in &diff.removed_elements {
        lines.push(format!("- element {name}"));
    }
    for (element, attribute) in &diff.added_attributes {
        lines.push(format!("+ attribute {element}@{attribute}"));
    }
    for (element, attribute) in &diff.removed_attributes {
        lines.push(format!("- attribute {element}@{attribute}"));
    }
    lines.sort();

    let add_count = lines.iter().filter(|l| l.starts_with('+')).count();
    let rem_count = lines.iter().filter(|l| l.starts_with('-')).count();
    lines.push(format!("\n{add_count} added, {rem_count} removed"));

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn human_report_is_sorted() {
        let diff = GrammarDiff {
            added_elements: vec!["note".into(), "cref".into()],
            removed_elements: vec!["spanx".into()],
            added_attributes: vec![("section".into(), "numbered".into())],
            removed_attributes: vec![],
        };
        assert_eq!(
            format_diff(&diff),
            "+ attribute section@numbered\n+ element cref\n+ element note\n- element spanx\n\n3 added, 1 removed"
        );
    }

    #[test]
    fn empty_diff() {
        assert_eq!(format_diff(&GrammarDiff::default()), "No differences found.");
    }
}
