//! Loading the normalized API definition from disk

use std::path::Path;

use apiprobe_core::{Api, DefinitionError};

/// Read, parse and validate a definition file.
///
/// # Errors
///
/// Returns `DefinitionError` if the file cannot be read, does not parse
/// into the definition model, or breaks an operation invariant.
pub fn load_api(path: &Path) -> Result<Api, DefinitionError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| DefinitionError::Io(path.to_path_buf(), e.to_string()))?;
    let api = parse_api(path, &content)?;
    api.validate()?;
    log::debug!(
        "loaded {} operations from {}",
        api.operations.len(),
        path.display()
    );
    Ok(api)
}

/// Parse definition content, choosing YAML or JSON by extension and
/// sniffing the content otherwise.
///
/// # Errors
///
/// Returns `DefinitionError::Parse` naming the format that failed.
pub fn parse_api(path: &Path, content: &str) -> Result<Api, DefinitionError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "yaml" | "yml" => from_yaml(content),
        "json" => from_json(content),
        _ => {
            if content.trim_start().starts_with('{') {
                from_json(content)
            } else {
                from_yaml(content)
            }
        }
    }
}

fn from_json(content: &str) -> Result<Api, DefinitionError> {
    serde_json::from_str(content).map_err(|e| DefinitionError::Parse(format!("Invalid JSON: {e}")))
}

fn from_yaml(content: &str) -> Result<Api, DefinitionError> {
    serde_yml::from_str(content).map_err(|e| DefinitionError::Parse(format!("Invalid YAML: {e}")))
}
