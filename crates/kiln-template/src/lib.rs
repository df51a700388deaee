//! # kiln-template
//!
//! Parser and compiler for Kiln template documents.
//!
//! Handles:
//! - **Parser**: Decoding JSON or YAML documents and validating them into a [`Template`].
//! - **Template**: The immutable, validated model of builds, provisioners and post-processors.
//! - **Registry**: Plugin capability traits and the [`ComponentFinder`] lookup.
//! - **Compiler**: Filtering, override merging and component resolution for one build.
//! - **Plan**: The resulting [`BuildPlan`] and its variable bookkeeping.
//!
//! # Example
//!
//! ```rust,no_run
//! use kiln_template::{ComponentFinder, parse_template_file};
//!
//! let template = parse_template_file("template.json")?;
//! let finder = ComponentFinder::new().with_builder(|_| None);
//! for name in template.build_names() {
//!     let plan = template.compile(name, &finder)?;
//!     println!("{} uses {}", plan.name(), plan.builder_type());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used, clippy::panic))]

mod compiler;
pub mod error;
pub mod parser;
pub mod plan;
pub mod registry;
pub mod template;

pub use error::{CompileError, ParseError, PrepareError, SchemaError};
pub use parser::{parse_template, parse_template_file, parse_template_value, parse_template_yaml};
pub use plan::{BuildPlan, PostProcessorBinding, PreparedBuild, ProvisionerBinding};
pub use registry::{Builder, ComponentFinder, PostProcessor, Provisioner};
pub use template::{
    BuilderConfig, ConfigMap, PostProcessorConfig, ProvisionerConfig, Template, Variable,
};
