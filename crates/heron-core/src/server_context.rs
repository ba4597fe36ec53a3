//! Server-wide context and the collaborator contracts it exposes.
//!
//! A [`ServerContext`] is shared by every request. It gives handlers access
//! to system properties, named databases and the template engine. Heron
//! does not ship a database layer or a template engine; both are consumed
//! through the [`Database`] and [`TemplateRenderer`] traits.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use heron_config::{ConfigError, HeronConfig};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{DatabaseError, TemplateError};

/// A database handle.
///
/// Parameters and rows use JSON values so that drivers can map them onto
/// their own types.
pub trait Database: Send + Sync {
    /// Runs a query and returns the resulting rows.
    fn query(&self, statement: &str, params: &[Value]) -> Result<Vec<Map<String, Value>>, DatabaseError>;

    /// Runs a statement and returns the number of affected rows.
    fn execute(&self, statement: &str, params: &[Value]) -> Result<u64, DatabaseError>;
}

/// A template engine.
pub trait TemplateRenderer: Send + Sync {
    /// Renders the template `name` with `data`.
    fn render(&self, name: &str, data: &Value) -> Result<Bytes, TemplateError>;
}

/// The renderer used when no template engine is configured.
///
/// Every render fails, so template outputs fall back to a redirect.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTemplates;

impl TemplateRenderer for NoTemplates {
    fn render(&self, _name: &str, _data: &Value) -> Result<Bytes, TemplateError> {
        Err(TemplateError::NotConfigured)
    }
}

/// Server-wide state shared by all requests.
pub trait ServerContext: Send + Sync {
    /// Returns a system property.
    fn property(&self, key: &str) -> Option<&str>;

    /// Returns true if the system property exists.
    fn contains_property(&self, key: &str) -> bool {
        self.property(key).is_some()
    }

    /// Returns the named database, or the default one for `None`.
    fn database(&self, name: Option<&str>) -> Option<Arc<dyn Database>>;

    /// Renders a template with the given data.
    fn render_template(&self, name: &str, data: &Value) -> Result<Bytes, TemplateError>;
}

/// Default [`ServerContext`] backed by in-memory maps.
///
/// # Example
///
/// ```
/// use heron_core::{DefaultServerContext, ServerContext};
///
/// let ctx = DefaultServerContext::new()
///     .with_property("site.name", "heron");
///
/// assert_eq!(ctx.property("site.name"), Some("heron"));
/// assert!(!ctx.contains_property("missing"));
/// assert!(ctx.database(None).is_none());
/// ```
pub struct DefaultServerContext {
    properties: HashMap<String, String>,
    databases: HashMap<String, Arc<dyn Database>>,
    default_database: Option<String>,
    templates: Arc<dyn TemplateRenderer>,
}

impl DefaultServerContext {
    /// Creates an empty context without templates or databases.
    #[must_use]
    pub fn new() -> Self {
        Self {
            properties: HashMap::new(),
            databases: HashMap::new(),
            default_database: None,
            templates: Arc::new(NoTemplates),
        }
    }

    /// Creates a context whose properties come from the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a configured properties file cannot be read.
    pub fn from_config(config: &HeronConfig) -> Result<Self, ConfigError> {
        let properties = heron_config::load_properties(&config.properties)?;
        debug!(count = properties.len(), "loaded system properties");
        Ok(Self {
            properties,
            ..Self::new()
        })
    }

    /// Sets a system property.
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Registers a named database.
    ///
    /// The first registered database becomes the default unless
    /// [`with_default_database`](Self::with_default_database) names another.
    #[must_use]
    pub fn with_database(mut self, name: impl Into<String>, database: Arc<dyn Database>) -> Self {
        let name = name.into();
        if self.default_database.is_none() {
            self.default_database = Some(name.clone());
        }
        self.databases.insert(name, database);
        self
    }

    /// Selects the default database by name.
    #[must_use]
    pub fn with_default_database(mut self, name: impl Into<String>) -> Self {
        self.default_database = Some(name.into());
        self
    }

    /// Installs a template engine.
    #[must_use]
    pub fn with_templates(mut self, templates: Arc<dyn TemplateRenderer>) -> Self {
        self.templates = templates;
        self
    }

    /// Returns all system properties.
    #[must_use]
    pub fn properties(&self) -> &HashMap<String, String> {
        &self.properties
    }
}

impl Default for DefaultServerContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DefaultServerContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultServerContext")
            .field("properties", &self.properties)
            .field("databases", &self.databases.keys().collect::<Vec<_>>())
            .field("default_database", &self.default_database)
            .finish_non_exhaustive()
    }
}

impl ServerContext for DefaultServerContext {
    fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    fn database(&self, name: Option<&str>) -> Option<Arc<dyn Database>> {
        let name = name.or(self.default_database.as_deref())?;
        self.databases.get(name).cloned()
    }

    fn render_template(&self, name: &str, data: &Value) -> Result<Bytes, TemplateError> {
        self.templates.render(name, data)
    }
}
