//! Compiled, build-specific execution plans.
//!
//! A [`BuildPlan`] is produced by [`crate::Template::compile`] and handed to
//! the execution layer, which drives the builder, then the provisioners in
//! order, then each post-processor chain in order.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use kiln_common::constants::USER_VARIABLES_KEY;
use kiln_common::types::ComponentKind;
use serde_json::Value;

use crate::error::PrepareError;
use crate::registry::{Builder, PostProcessor, Provisioner};
use crate::template::{ConfigMap, Variable};

/// A resolved provisioner and its final configuration.
#[derive(Debug, Clone)]
pub struct ProvisionerBinding {
    /// Resolved component instance.
    pub provisioner: Arc<dyn Provisioner>,
    /// Plugin type the instance was resolved from.
    pub provisioner_type: String,
    /// Raw config merged with overrides and build-context metadata.
    pub config: ConfigMap,
}

impl PartialEq for ProvisionerBinding {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.provisioner, &other.provisioner)
            && self.provisioner_type == other.provisioner_type
            && self.config == other.config
    }
}

/// A resolved post-processor and its final configuration.
#[derive(Debug, Clone)]
pub struct PostProcessorBinding {
    /// Resolved component instance.
    pub post_processor: Arc<dyn PostProcessor>,
    /// Plugin type the instance was resolved from.
    pub post_processor_type: String,
    /// Raw config merged with build-context metadata.
    pub config: ConfigMap,
    /// Whether the artifact fed into this post-processor is kept.
    pub keep_input_artifact: bool,
}

impl PartialEq for PostProcessorBinding {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.post_processor, &other.post_processor)
            && self.post_processor_type == other.post_processor_type
            && self.config == other.config
            && self.keep_input_artifact == other.keep_input_artifact
    }
}

/// Everything the execution layer needs to run one build.
#[derive(Debug, Clone)]
pub struct BuildPlan {
    pub(crate) name: String,
    pub(crate) builder_type: String,
    pub(crate) builder: Arc<dyn Builder>,
    pub(crate) builder_config: ConfigMap,
    pub(crate) provisioners: Vec<ProvisionerBinding>,
    pub(crate) post_processors: Vec<Vec<PostProcessorBinding>>,
    pub(crate) variables: BTreeMap<String, Variable>,
}

impl PartialEq for BuildPlan {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.builder_type == other.builder_type
            && Arc::ptr_eq(&self.builder, &other.builder)
            && self.builder_config == other.builder_config
            && self.provisioners == other.provisioners
            && self.post_processors == other.post_processors
            && self.variables == other.variables
    }
}

/// Outcome of [`BuildPlan::prepare`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreparedBuild {
    /// Final variable values, declared defaults overlaid with user input.
    pub variables: BTreeMap<String, String>,
    /// Warnings reported by the builder.
    pub warnings: Vec<String>,
}

impl BuildPlan {
    /// Name of the build.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Plugin type of the builder.
    #[must_use]
    pub fn builder_type(&self) -> &str {
        &self.builder_type
    }

    /// Resolved builder instance.
    #[must_use]
    pub fn builder(&self) -> &Arc<dyn Builder> {
        &self.builder
    }

    /// The builder's raw configuration.
    #[must_use]
    pub const fn builder_config(&self) -> &ConfigMap {
        &self.builder_config
    }

    /// Applicable provisioners in execution order.
    #[must_use]
    pub fn provisioners(&self) -> &[ProvisionerBinding] {
        &self.provisioners
    }

    /// Applicable post-processor chains in execution order.
    #[must_use]
    pub fn post_processors(&self) -> &[Vec<PostProcessorBinding>] {
        &self.post_processors
    }

    /// Variables declared by the template.
    #[must_use]
    pub const fn variables(&self) -> &BTreeMap<String, Variable> {
        &self.variables
    }

    /// Overlays user-supplied values on the declared variable defaults.
    ///
    /// # Errors
    ///
    /// Returns [`PrepareError::UnknownVariables`] if the user supplied a
    /// variable the template does not declare, and
    /// [`PrepareError::MissingVariables`] if a required variable is unset.
    pub fn resolve_variables(
        &self,
        user: &HashMap<String, String>,
    ) -> Result<BTreeMap<String, String>, PrepareError> {
        let mut unknown: Vec<String> = user
            .keys()
            .filter(|name| !self.variables.contains_key(*name))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            unknown.sort();
            return Err(PrepareError::UnknownVariables { names: unknown });
        }

        let mut resolved = BTreeMap::new();
        let mut missing = Vec::new();
        for (name, variable) in &self.variables {
            match user.get(name) {
                Some(value) => {
                    let _ = resolved.insert(name.clone(), value.clone());
                }
                None if variable.required => missing.push(name.clone()),
                None => {
                    let _ = resolved.insert(name.clone(), variable.default.clone());
                }
            }
        }
        if !missing.is_empty() {
            return Err(PrepareError::MissingVariables { names: missing });
        }
        Ok(resolved)
    }

    /// Resolves variables and lets every component validate its config.
    ///
    /// Components see their plan config plus the resolved variables under
    /// the reserved user-variables key. The builder goes first, then the
    /// provisioners, then the post-processors in chain order.
    ///
    /// # Errors
    ///
    /// Returns the variable errors of [`Self::resolve_variables`], or
    /// [`PrepareError::Component`] for the first component that rejects
    /// its configuration.
    pub fn prepare(&self, user: &HashMap<String, String>) -> Result<PreparedBuild, PrepareError> {
        tracing::info!(build = %self.name, "preparing build");
        let variables = self.resolve_variables(user)?;
        let user_variables = Value::Object(
            variables
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect(),
        );
        let with_variables = |config: &ConfigMap| {
            let mut config = config.clone();
            let _ = config.insert(USER_VARIABLES_KEY.to_string(), user_variables.clone());
            config
        };

        let warnings = self
            .builder
            .prepare(&with_variables(&self.builder_config))
            .map_err(|e| component_error(ComponentKind::Builder, &self.builder_type, &e))?;

        for binding in &self.provisioners {
            binding
                .provisioner
                .prepare(&with_variables(&binding.config))
                .map_err(|e| {
                    component_error(ComponentKind::Provisioner, &binding.provisioner_type, &e)
                })?;
        }

        for binding in self.post_processors.iter().flatten() {
            binding
                .post_processor
                .configure(&with_variables(&binding.config))
                .map_err(|e| {
                    component_error(
                        ComponentKind::PostProcessor,
                        &binding.post_processor_type,
                        &e,
                    )
                })?;
        }

        if !warnings.is_empty() {
            tracing::warn!(build = %self.name, count = warnings.len(), "builder reported warnings");
        }
        Ok(PreparedBuild {
            variables,
            warnings,
        })
    }
}

fn component_error(kind: ComponentKind, type_name: &str, err: &anyhow::Error) -> PrepareError {
    PrepareError::Component {
        kind,
        type_name: type_name.to_string(),
        message: format!("{err:#}"),
    }
}
