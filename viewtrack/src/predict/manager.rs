//! Named plugin registry with load/configure/teardown lifecycle.

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, warn};

use crate::orientation::OrientationSample;

use super::plugin::{
    LinearPredictor, PluginError, PredictOptions, PredictedOrientation, PredictPlugin,
};

/// Factory producing one plugin instance.
type PluginFactory = Box<dyn Fn() -> Box<dyn PredictPlugin> + Send + Sync>;

/// Resolves a plugin name and library directory to a live plugin instance.
///
/// Loading is a factory call returning a polymorphic handle; how a resolver
/// binds the module behind that handle (built-in registry, dynamic library,
/// remote model) is its own concern.
pub trait PluginResolver: Send + Sync {
    /// Resolve the plugin module at `library_dir` + `name`.
    fn resolve(
        &self,
        name: &str,
        library_dir: &Path,
    ) -> Result<Box<dyn PredictPlugin>, PluginError>;
}

/// Resolver backed by a name-keyed factory registry.
///
/// Mirrors the original module layout on disk: the plugin module is expected
/// at `library_dir/name`, and a missing module file or unregistered name is
/// a [`PluginError::LoadFailure`].
pub struct LibraryPathResolver {
    factories: HashMap<String, PluginFactory>,
}

impl Default for LibraryPathResolver {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl LibraryPathResolver {
    /// Create an empty resolver.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Create a resolver with the built-in plugins registered
    /// (`linear` -> [`LinearPredictor`]).
    pub fn with_builtins() -> Self {
        let mut resolver = Self::new();
        resolver.register("linear", || Box::new(LinearPredictor::new()));
        resolver
    }

    /// Register a factory under a plugin name, replacing any existing one.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn PredictPlugin> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
    }
}

impl PluginResolver for LibraryPathResolver {
    fn resolve(
        &self,
        name: &str,
        library_dir: &Path,
    ) -> Result<Box<dyn PredictPlugin>, PluginError> {
        let path = library_dir.join(name);
        if !path.exists() {
            return Err(PluginError::LoadFailure {
                name: name.to_string(),
                path,
                reason: "plugin module not found".into(),
            });
        }
        match self.factories.get(name) {
            Some(factory) => Ok(factory()),
            None => Err(PluginError::LoadFailure {
                name: name.to_string(),
                path,
                reason: "no factory registered for plugin name".into(),
            }),
        }
    }
}

impl std::fmt::Debug for LibraryPathResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LibraryPathResolver")
            .field("registered", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Owns named prediction plugin instances, one live instance per name.
///
/// Not safe for concurrent invocation; the selection engine serializes all
/// calls behind its plugin lock.
pub struct PluginManager {
    resolver: Box<dyn PluginResolver>,
    plugins: HashMap<String, Box<dyn PredictPlugin>>,
}

impl PluginManager {
    /// Create a manager using the given resolver.
    pub fn new(resolver: Box<dyn PluginResolver>) -> Self {
        Self {
            resolver,
            plugins: HashMap::new(),
        }
    }

    /// Load the named plugin from the library directory.
    ///
    /// Re-registering an existing name destroys the previous instance before
    /// the entry is replaced.
    pub fn load(&mut self, name: &str, library_dir: &Path) -> Result<(), PluginError> {
        let plugin = self.resolver.resolve(name, library_dir)?;
        if let Some(mut previous) = self.plugins.insert(name.to_string(), plugin) {
            warn!(plugin = name, "replacing previously loaded prediction plugin");
            previous.destroy();
        }
        debug!(plugin = name, dir = %library_dir.display(), "prediction plugin loaded");
        Ok(())
    }

    /// Forward configuration to the named plugin.
    pub fn configure(&mut self, name: &str, options: &PredictOptions) -> Result<(), PluginError> {
        let plugin = self
            .plugins
            .get_mut(name)
            .ok_or_else(|| PluginError::Unknown(name.to_string()))?;
        plugin.initialize(options)
    }

    /// Forward the freshest orientation sample to the named plugin.
    ///
    /// Ignored for absent names; feeding is decoupled from decision cycles
    /// and must not fail them.
    pub fn feed(&mut self, name: &str, sample: &OrientationSample) {
        if let Some(plugin) = self.plugins.get_mut(name) {
            plugin.feed(sample);
        }
    }

    /// Ask the named plugin for a prediction over the history, oldest first.
    ///
    /// `None` for an absent name or a plugin that judges its input
    /// insufficient.
    pub fn predict(
        &mut self,
        name: &str,
        history: &[OrientationSample],
    ) -> Option<PredictedOrientation> {
        self.plugins.get_mut(name)?.predict(history)
    }

    /// Destroy and remove the named plugin. Idempotent for absent names.
    pub fn unload(&mut self, name: &str) {
        if let Some(mut plugin) = self.plugins.remove(name) {
            plugin.destroy();
            debug!(plugin = name, "prediction plugin unloaded");
        }
    }

    /// Whether a plugin is loaded under the given name.
    pub fn is_loaded(&self, name: &str) -> bool {
        self.plugins.contains_key(name)
    }

    /// Destroy and remove every loaded plugin.
    ///
    /// Plugins must be explicitly torn down at engine shutdown; no automatic
    /// finalization is guaranteed.
    pub fn shutdown(&mut self) {
        for (name, mut plugin) in self.plugins.drain() {
            debug!(plugin = %name, "destroying prediction plugin");
            plugin.destroy();
        }
    }
}

impl std::fmt::Debug for PluginManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginManager")
            .field("loaded", &self.plugins.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
