use std::path::Path;

use image_reference::ImageDefaults;
use log::debug;

use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    /// `.json` files are read as JSON, anything else as YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|extension| extension.to_str()) {
            Some(extension) if extension.eq_ignore_ascii_case("json") => Format::Json,
            _ => Format::Yaml,
        }
    }
}

pub fn parse(contents: &str, format: Format) -> Result<ImageDefaults> {
    Ok(match format {
        Format::Json => serde_json::from_str(contents)?,
        Format::Yaml => serde_yaml::from_str(contents)?,
    })
}

pub fn load(path: &Path) -> Result<ImageDefaults> {
    let contents = std::fs::read_to_string(path)
        .map_err(|error| format!("failed to read image defaults from {path:?}: {error}"))?;
    let defaults = parse(&contents, Format::from_path(path))
        .map_err(|error| format!("failed to parse image defaults from {path:?}: {error}"))?;
    debug!("loaded image defaults from {path:?}: {defaults:?}");
    Ok(defaults)
}

/// Combines the defaults file, if any, with individual overrides. Returns `None` when no defaults
/// were supplied at all.
pub fn resolve(
    path: Option<&Path>,
    image: Option<String>,
    version: Option<String>,
) -> Result<Option<ImageDefaults>> {
    if path.is_none() && image.is_none() && version.is_none() {
        return Ok(None);
    }

    let mut defaults = path.map(load).transpose()?.unwrap_or_default();
    if let Some(image) = image {
        defaults.image = image;
    }
    if let Some(version) = version {
        defaults.version = version;
    }
    Ok(Some(defaults))
}
