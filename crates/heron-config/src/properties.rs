//! `.properties` file loading.
//!
//! The format is one `key=value` pair per line, split at the first `=`.
//! Keys and values are taken verbatim. Blank lines and lines starting with
//! `#` or `!` are skipped; lines without `=` are reported at debug level
//! and ignored.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{ConfigError, PropertiesConfig};

/// File extension recognized when scanning a directory (case-insensitive).
pub const PROPERTIES_EXTENSION: &str = "properties";

/// Resolves the full property map for a [`PropertiesConfig`].
///
/// # Errors
///
/// Returns `ConfigError` if a listed file or directory does not exist or
/// cannot be read.
///
/// # Example
///
/// ```
/// use heron_config::{load_properties, PropertiesConfig};
///
/// let mut config = PropertiesConfig::default();
/// config.values.insert("site.name".to_string(), "heron".to_string());
///
/// let properties = load_properties(&config).unwrap();
/// assert_eq!(properties["site.name"], "heron");
/// ```
pub fn load_properties(config: &PropertiesConfig) -> Result<HashMap<String, String>, ConfigError> {
    let mut properties = HashMap::new();

    for (key, value) in &config.values {
        debug!(key = %key, value = %value, "system property");
        properties.insert(key.clone(), value.clone());
    }

    for location in &config.files {
        load_location(location, &mut properties)?;
    }

    Ok(properties)
}

fn load_location(location: &Path, properties: &mut HashMap<String, String>) -> Result<(), ConfigError> {
    let metadata = fs::metadata(location).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ConfigError::not_found(location)
        } else {
            ConfigError::read(location, e)
        }
    })?;

    if !metadata.is_dir() {
        return load_file(location, properties);
    }

    let entries = fs::read_dir(location).map_err(|e| ConfigError::read(location, e))?;
    let mut files: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| ConfigError::read(location, e))?.path();
        if path.is_file() && has_properties_extension(&path) {
            files.push(path);
        }
    }
    files.sort();

    for file in files {
        load_file(&file, properties)?;
    }
    Ok(())
}

fn has_properties_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(PROPERTIES_EXTENSION))
}

fn load_file(path: &Path, properties: &mut HashMap<String, String>) -> Result<(), ConfigError> {
    debug!(file = %path.display(), "loading properties file");
    let content = fs::read_to_string(path).map_err(|e| ConfigError::read(path, e))?;
    parse_properties(&content, path, properties);
    Ok(())
}

/// Parses `content` into `properties`, overriding existing keys.
///
/// `source` is only used for diagnostics.
pub fn parse_properties(content: &str, source: &Path, properties: &mut HashMap<String, String>) {
    for (index, line) in content.lines().enumerate() {
        let line_number = index + 1;

        if line.trim().is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            debug!(
                file = %source.display(),
                line = line_number,
                content = %line,
                "malformed properties line"
            );
            continue;
        };

        if let Some(old) = properties.get(key) {
            debug!(
                file = %source.display(),
                line = line_number,
                key = %key,
                old = %old,
                new = %value,
                "duplicate property overridden"
            );
        }
        properties.insert(key.to_string(), value.to_string());
    }
}
