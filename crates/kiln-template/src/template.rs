//! In-memory representation of a validated template document.
//!
//! A [`Template`] is produced by [`crate::parser`] and never mutated
//! afterwards; [`Template::compile`] turns it into build plans.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use serde_json::Value;

/// A plugin configuration object, kept verbatim for the plugin to decode.
pub type ConfigMap = serde_json::Map<String, Value>;

/// The parsed and validated template document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Template {
    /// Free-form description of the template.
    pub description: Option<String>,
    /// Minimum tool version the template declares it needs.
    pub min_version: Option<String>,
    /// User variables keyed by name.
    pub variables: BTreeMap<String, Variable>,
    /// Builders keyed by build name.
    pub builders: BTreeMap<String, BuilderConfig>,
    /// Provisioners in execution order.
    pub provisioners: Vec<ProvisionerConfig>,
    /// Post-processor chains in execution order.
    pub post_processors: Vec<Vec<PostProcessorConfig>>,
    /// Hook names keyed by event.
    pub hooks: BTreeMap<String, Vec<String>>,
    /// Raw `push` section, not interpreted here.
    pub push: Option<ConfigMap>,
}

impl Template {
    /// Returns the declared build names in sorted order.
    #[must_use]
    pub fn build_names(&self) -> Vec<&str> {
        self.builders.keys().map(String::as_str).collect()
    }

    /// Returns `true` if a build with the given name is declared.
    #[must_use]
    pub fn has_build(&self, name: &str) -> bool {
        self.builders.contains_key(name)
    }
}

/// A user variable declared in the template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Variable {
    /// Default value rendered as text. Empty when required.
    pub default: String,
    /// Whether a value must be supplied by the user.
    pub required: bool,
}

impl Variable {
    /// A variable the user must supply.
    #[must_use]
    pub const fn required() -> Self {
        Self {
            default: String::new(),
            required: true,
        }
    }

    /// An optional variable with the given default.
    #[must_use]
    pub fn with_default(default: impl Into<String>) -> Self {
        Self {
            default: default.into(),
            required: false,
        }
    }
}

/// A builder entry. Each one defines a build.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuilderConfig {
    /// Build name, defaulting to the builder type.
    pub name: String,
    /// Builder plugin type.
    #[serde(rename = "type")]
    pub builder_type: String,
    /// Original configuration object without the `name` field.
    pub raw_config: ConfigMap,
}

/// A provisioner entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProvisionerConfig {
    /// Provisioner plugin type.
    #[serde(rename = "type")]
    pub provisioner_type: String,
    /// Configuration object without the filter and override fields.
    pub raw_config: ConfigMap,
    /// Builds this provisioner is restricted to.
    pub only: BTreeSet<String>,
    /// Builds this provisioner is skipped for.
    pub except: BTreeSet<String>,
    /// Extra fields merged into the configuration for specific builds.
    #[serde(rename = "override")]
    pub overrides: BTreeMap<String, ConfigMap>,
}

impl ProvisionerConfig {
    /// Returns `true` if this provisioner runs for the named build.
    #[must_use]
    pub fn applies_to(&self, build: &str) -> bool {
        filter_applies(&self.only, &self.except, build)
    }
}

/// A single post-processor within a chain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostProcessorConfig {
    /// Post-processor plugin type.
    #[serde(rename = "type")]
    pub post_processor_type: String,
    /// Configuration object without the control fields.
    pub raw_config: ConfigMap,
    /// Whether the input artifact survives this post-processor.
    pub keep_input_artifact: bool,
    /// Builds this post-processor is restricted to.
    pub only: BTreeSet<String>,
    /// Builds this post-processor is skipped for.
    pub except: BTreeSet<String>,
}

impl PostProcessorConfig {
    /// Returns `true` if this post-processor runs for the named build.
    #[must_use]
    pub fn applies_to(&self, build: &str) -> bool {
        filter_applies(&self.only, &self.except, build)
    }
}

fn filter_applies(only: &BTreeSet<String>, except: &BTreeSet<String>, build: &str) -> bool {
    if except.contains(build) {
        return false;
    }
    only.is_empty() || only.contains(build)
}
