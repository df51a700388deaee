//! Compiles one named build of a [`Template`] into a [`BuildPlan`].
//!
//! Compilation filters provisioners and post-processors down to the ones
//! that apply to the build, resolves every component through the
//! [`ComponentFinder`], and assembles the final per-component configs:
//! raw config, then per-build overrides, then build-context metadata.

use kiln_common::config::KilnConfig;
use kiln_common::constants::{BUILD_NAME_KEY, BUILDER_TYPE_KEY, DEBUG_KEY, FORCE_KEY};
use serde_json::Value;

use crate::error::CompileError;
use crate::plan::{BuildPlan, PostProcessorBinding, ProvisionerBinding};
use crate::registry::{ComponentFinder, Lookup};
use crate::template::{ConfigMap, PostProcessorConfig, ProvisionerConfig, Template};

/// Reserved metadata describing the build being compiled.
#[derive(Debug, Clone, Copy)]
struct BuildContext<'a> {
    name: &'a str,
    builder_type: &'a str,
    config: &'a KilnConfig,
}

impl BuildContext<'_> {
    /// Writes the reserved keys into a component config.
    ///
    /// Runs after overrides, so these keys always win.
    fn inject(&self, config: &mut ConfigMap) {
        let _ = config.insert(BUILD_NAME_KEY.to_string(), Value::from(self.name));
        let _ = config.insert(BUILDER_TYPE_KEY.to_string(), Value::from(self.builder_type));
        let _ = config.insert(DEBUG_KEY.to_string(), Value::from(self.config.debug));
        let _ = config.insert(FORCE_KEY.to_string(), Value::from(self.config.force));
    }
}

/// Overlays per-build override fields on a raw config.
fn merge_override(raw: &ConfigMap, fields: Option<&ConfigMap>) -> ConfigMap {
    let mut merged = raw.clone();
    if let Some(fields) = fields {
        for (key, value) in fields {
            let _ = merged.insert(key.clone(), value.clone());
        }
    }
    merged
}

/// Returns the lookup capability, aborting if the embedder never wired it.
///
/// # Panics
///
/// Panics with `message` when `lookup` is `None`.
#[allow(clippy::panic)]
fn require<'a, T: ?Sized>(lookup: Option<&'a Lookup<T>>, message: &str) -> &'a Lookup<T> {
    match lookup {
        Some(lookup) => lookup,
        None => panic!("{message}"),
    }
}

impl Template {
    /// Compiles the named build with default build-context settings.
    ///
    /// # Errors
    ///
    /// See [`Template::compile_with`].
    ///
    /// # Panics
    ///
    /// See [`Template::compile_with`].
    pub fn compile(
        &self,
        name: &str,
        registry: &ComponentFinder,
    ) -> Result<BuildPlan, CompileError> {
        self.compile_with(name, registry, &KilnConfig::default())
    }

    /// Compiles the named build into an executable plan.
    ///
    /// The template is not modified, so the same build may be compiled any
    /// number of times and always yields an equal plan.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::UnknownBuild`] if the build is not declared,
    /// or the matching `Unknown*Type` error for the first component type
    /// the registry cannot resolve.
    ///
    /// # Panics
    ///
    /// Panics with `no builder function` if the registry has no builder
    /// lookup, and with `no provisioner function` or
    /// `no post-processor function` if the build needs a component of that
    /// kind but the registry has no lookup for it. These indicate a broken
    /// embedding, not bad input.
    pub fn compile_with(
        &self,
        name: &str,
        registry: &ComponentFinder,
        config: &KilnConfig,
    ) -> Result<BuildPlan, CompileError> {
        tracing::info!(build = name, "compiling build");

        let builder_config = self
            .builders
            .get(name)
            .ok_or_else(|| CompileError::UnknownBuild {
                name: name.to_string(),
            })?;

        let lookup = require(registry.builder.as_ref(), "no builder function");
        let builder = lookup(builder_config.builder_type.as_str()).ok_or_else(|| {
            CompileError::UnknownBuilderType {
                build: name.to_string(),
                type_name: builder_config.builder_type.clone(),
            }
        })?;
        tracing::debug!(
            build = name,
            builder_type = %builder_config.builder_type,
            "resolved builder"
        );

        let context = BuildContext {
            name,
            builder_type: &builder_config.builder_type,
            config,
        };
        let provisioners = self.compile_provisioners(&context, registry)?;
        let post_processors = self.compile_post_processors(&context, registry)?;

        tracing::info!(
            build = name,
            provisioners = provisioners.len(),
            post_processor_chains = post_processors.len(),
            "build compiled"
        );
        Ok(BuildPlan {
            name: name.to_string(),
            builder_type: builder_config.builder_type.clone(),
            builder,
            builder_config: builder_config.raw_config.clone(),
            provisioners,
            post_processors,
            variables: self.variables.clone(),
        })
    }

    fn compile_provisioners(
        &self,
        context: &BuildContext<'_>,
        registry: &ComponentFinder,
    ) -> Result<Vec<ProvisionerBinding>, CompileError> {
        let applicable: Vec<&ProvisionerConfig> = self
            .provisioners
            .iter()
            .filter(|p| {
                let applies = p.applies_to(context.name);
                if !applies {
                    tracing::debug!(
                        build = context.name,
                        provisioner = %p.provisioner_type,
                        "provisioner filtered out"
                    );
                }
                applies
            })
            .collect();
        if applicable.is_empty() {
            return Ok(Vec::new());
        }

        let lookup = require(registry.provisioner.as_ref(), "no provisioner function");
        applicable
            .into_iter()
            .map(|p| -> Result<ProvisionerBinding, CompileError> {
                let provisioner = lookup(p.provisioner_type.as_str()).ok_or_else(|| {
                    CompileError::UnknownProvisionerType {
                        build: context.name.to_string(),
                        type_name: p.provisioner_type.clone(),
                    }
                })?;
                let mut config = merge_override(&p.raw_config, p.overrides.get(context.name));
                context.inject(&mut config);
                Ok(ProvisionerBinding {
                    provisioner,
                    provisioner_type: p.provisioner_type.clone(),
                    config,
                })
            })
            .collect()
    }

    fn compile_post_processors(
        &self,
        context: &BuildContext<'_>,
        registry: &ComponentFinder,
    ) -> Result<Vec<Vec<PostProcessorBinding>>, CompileError> {
        // Filters apply per element; a chain left empty is dropped.
        let chains: Vec<Vec<&PostProcessorConfig>> = self
            .post_processors
            .iter()
            .map(|chain| {
                chain
                    .iter()
                    .filter(|pp| {
                        let applies = pp.applies_to(context.name);
                        if !applies {
                            tracing::debug!(
                                build = context.name,
                                post_processor = %pp.post_processor_type,
                                "post-processor filtered out"
                            );
                        }
                        applies
                    })
                    .collect::<Vec<_>>()
            })
            .filter(|chain| !chain.is_empty())
            .collect();
        if chains.is_empty() {
            return Ok(Vec::new());
        }

        let lookup = require(registry.post_processor.as_ref(), "no post-processor function");
        chains
            .into_iter()
            .map(|chain| {
                chain
                    .into_iter()
                    .map(|pp| -> Result<PostProcessorBinding, CompileError> {
                        let post_processor = lookup(pp.post_processor_type.as_str()).ok_or_else(|| {
                            CompileError::UnknownPostProcessorType {
                                build: context.name.to_string(),
                                type_name: pp.post_processor_type.clone(),
                            }
                        })?;
                        let mut config = pp.raw_config.clone();
                        context.inject(&mut config);
                        Ok(PostProcessorBinding {
                            post_processor,
                            post_processor_type: pp.post_processor_type.clone(),
                            config,
                            keep_input_artifact: pp.keep_input_artifact,
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect()
    }
}
