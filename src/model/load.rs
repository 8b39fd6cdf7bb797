use super::types::Model;
use anyhow::Context;
use std::path::Path;

/// Load a model from YAML (`.yaml`/`.yml`) or JSON.
pub fn load_model(path: &Path) -> anyhow::Result<Model> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read model file: {}", path.display()))?;
    parse_model(&content, is_yaml(path))
        .with_context(|| format!("Failed to parse model file: {}", path.display()))
}

/// Parse model text; `yaml` selects the YAML reader, JSON otherwise.
pub fn parse_model(content: &str, yaml: bool) -> anyhow::Result<Model> {
    let model = if yaml {
        serde_yaml::from_str(content)?
    } else {
        serde_json::from_str(content)?
    };
    Ok(model)
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext == "yaml" || ext == "yml")
        .unwrap_or(false)
}
