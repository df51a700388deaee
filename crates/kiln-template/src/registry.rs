//! Plugin capability traits and the name-indexed component registry.
//!
//! The registry is supplied by the embedding system. Each of its three
//! lookups may be left unset; the compiler only treats that as a broken
//! contract when a build actually needs a component of that kind.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::template::ConfigMap;

/// A plugin that produces the initial artifact of a build.
pub trait Builder: Send + Sync + fmt::Debug {
    /// Validates the build-specific configuration before a run.
    ///
    /// Returns non-fatal warnings to surface to the user.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is unusable.
    fn prepare(&self, config: &ConfigMap) -> anyhow::Result<Vec<String>>;
}

/// A plugin that runs against the machine a builder brought up.
pub trait Provisioner: Send + Sync + fmt::Debug {
    /// Validates the build-specific configuration before a run.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is unusable.
    fn prepare(&self, config: &ConfigMap) -> anyhow::Result<()>;
}

/// A plugin that transforms an artifact after the build.
pub trait PostProcessor: Send + Sync + fmt::Debug {
    /// Validates the build-specific configuration before a run.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is unusable.
    fn configure(&self, config: &ConfigMap) -> anyhow::Result<()>;
}

/// Resolves a component type name to an instance, or `None` if unknown.
pub type Lookup<T> = Box<dyn Fn(&str) -> Option<Arc<T>> + Send + Sync>;

/// Builder lookup capability.
pub type BuilderLookup = Lookup<dyn Builder>;

/// Provisioner lookup capability.
pub type ProvisionerLookup = Lookup<dyn Provisioner>;

/// Post-processor lookup capability.
pub type PostProcessorLookup = Lookup<dyn PostProcessor>;

/// Name-indexed lookup of plugin components, one capability per kind.
#[derive(Default)]
pub struct ComponentFinder {
    /// Resolves builder types.
    pub builder: Option<BuilderLookup>,
    /// Resolves provisioner types.
    pub provisioner: Option<ProvisionerLookup>,
    /// Resolves post-processor types.
    pub post_processor: Option<PostProcessorLookup>,
}

impl ComponentFinder {
    /// Creates a finder with no capabilities wired.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wires the builder lookup.
    #[must_use]
    pub fn with_builder<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<Arc<dyn Builder>> + Send + Sync + 'static,
    {
        self.builder = Some(Box::new(lookup));
        self
    }

    /// Wires the provisioner lookup.
    #[must_use]
    pub fn with_provisioner<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<Arc<dyn Provisioner>> + Send + Sync + 'static,
    {
        self.provisioner = Some(Box::new(lookup));
        self
    }

    /// Wires the post-processor lookup.
    #[must_use]
    pub fn with_post_processor<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<Arc<dyn PostProcessor>> + Send + Sync + 'static,
    {
        self.post_processor = Some(Box::new(lookup));
        self
    }

    /// Wires the builder lookup to a fixed table.
    #[must_use]
    pub fn with_builders(self, builders: HashMap<String, Arc<dyn Builder>>) -> Self {
        self.with_builder(move |name| builders.get(name).cloned())
    }

    /// Wires the provisioner lookup to a fixed table.
    #[must_use]
    pub fn with_provisioners(self, provisioners: HashMap<String, Arc<dyn Provisioner>>) -> Self {
        self.with_provisioner(move |name| provisioners.get(name).cloned())
    }

    /// Wires the post-processor lookup to a fixed table.
    #[must_use]
    pub fn with_post_processors(
        self,
        post_processors: HashMap<String, Arc<dyn PostProcessor>>,
    ) -> Self {
        self.with_post_processor(move |name| post_processors.get(name).cloned())
    }
}

impl fmt::Debug for ComponentFinder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentFinder")
            .field("builder", &self.builder.is_some())
            .field("provisioner", &self.provisioner.is_some())
            .field("post_processor", &self.post_processor.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct NoopBuilder;

    impl Builder for NoopBuilder {
        fn prepare(&self, _config: &ConfigMap) -> anyhow::Result<Vec<String>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn new_finder_has_nothing_wired() {
        let finder = ComponentFinder::new();
        assert!(finder.builder.is_none());
        assert!(finder.provisioner.is_none());
        assert!(finder.post_processor.is_none());
    }

    #[test]
    fn table_lookup_resolves_known_types_only() {
        let builder: Arc<dyn Builder> = Arc::new(NoopBuilder);
        let mut table = HashMap::new();
        let _ = table.insert("docker".to_string(), Arc::clone(&builder));
        let finder = ComponentFinder::new().with_builders(table);

        let lookup = finder.builder.as_ref().expect("builder wired");
        let found = lookup("docker").expect("docker resolves");
        assert!(Arc::ptr_eq(&found, &builder));
        assert!(lookup("qemu").is_none());
    }

    #[test]
    fn debug_shows_wired_capabilities() {
        let finder = ComponentFinder::new().with_provisioner(|_| None);
        let text = format!("{finder:?}");
        assert!(text.contains("provisioner: true"), "got: {text}");
        assert!(text.contains("builder: false"), "got: {text}");
    }
}
