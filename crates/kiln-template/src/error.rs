//! Error types for parsing, compiling and preparing templates.
//!
//! Parsing stops at the first problem found and compiling stops at the
//! first component that cannot be resolved, so each error carries exactly
//! one offending key, name or type.

use std::path::PathBuf;

use kiln_common::types::ComponentKind;
use thiserror::Error;

/// Failure to turn a raw document into a [`crate::Template`].
#[derive(Debug, Error)]
pub enum ParseError {
    /// The template source could not be read.
    #[error("failed to read template {path}: {source}")]
    Io {
        /// Path of the source, `-` for standard input.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The document is not well-formed JSON or YAML.
    #[error("syntax error in template: {message}")]
    Syntax {
        /// Diagnostic produced by the decoder.
        message: String,
    },

    /// The document is well-formed but violates the template schema.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl ParseError {
    /// Builds a syntax error from a decoder diagnostic.
    pub(crate) fn syntax(err: impl std::fmt::Display) -> Self {
        Self::Syntax {
            message: err.to_string(),
        }
    }
}

/// A structural or referential problem in a decoded document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A top-level key outside the recognized set.
    #[error("unknown root level key in template: {key:?}")]
    UnknownKey {
        /// The offending key.
        key: String,
    },

    /// A component entry without a `type` field.
    #[error("{context}: missing 'type' field")]
    MissingType {
        /// Location of the entry, e.g. `builder 2`.
        context: String,
    },

    /// A component entry whose `type` field is not a string.
    #[error("{context}: 'type' must be a string, found {found}")]
    InvalidType {
        /// Location of the entry.
        context: String,
        /// JSON kind actually found.
        found: &'static str,
    },

    /// Two builders resolve to the same build name.
    #[error("duplicate build name: {name:?}")]
    DuplicateBuildName {
        /// The repeated name.
        name: String,
    },

    /// An entry sets both `only` and `except`.
    #[error("{context}: 'only' and 'except' cannot both be specified")]
    ConflictingFilter {
        /// Location of the entry.
        context: String,
    },

    /// An `only`, `except` or `override` entry names an undeclared build.
    #[error("{context}: '{field}' references unknown build {name:?}")]
    UnknownBuildReference {
        /// Location of the entry.
        context: String,
        /// Field holding the reference.
        field: &'static str,
        /// The unknown build name.
        name: String,
    },

    /// The `builders` section is absent or empty.
    #[error("no builders are defined in the template")]
    NoBuilders,

    /// A field has the wrong shape.
    #[error("{context}: expected {expected}")]
    InvalidValue {
        /// Location of the field.
        context: String,
        /// Description of the accepted shape.
        expected: &'static str,
    },
}

/// Failure to compile a build into a [`crate::BuildPlan`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// The requested build is not declared.
    #[error("build {name:?} does not exist in the template")]
    UnknownBuild {
        /// Requested build name.
        name: String,
    },

    /// The registry has no builder for the build's type.
    #[error("build {build:?}: builder type not found: {type_name}")]
    UnknownBuilderType {
        /// Build being compiled.
        build: String,
        /// Unresolved builder type.
        type_name: String,
    },

    /// The registry has no provisioner for an applicable entry's type.
    #[error("build {build:?}: provisioner type not found: {type_name}")]
    UnknownProvisionerType {
        /// Build being compiled.
        build: String,
        /// Unresolved provisioner type.
        type_name: String,
    },

    /// The registry has no post-processor for an applicable entry's type.
    #[error("build {build:?}: post-processor type not found: {type_name}")]
    UnknownPostProcessorType {
        /// Build being compiled.
        build: String,
        /// Unresolved post-processor type.
        type_name: String,
    },
}

/// Failure while preparing a compiled plan for execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrepareError {
    /// Required variables were not supplied.
    #[error("required variables not set: {}", .names.join(", "))]
    MissingVariables {
        /// Sorted names of the missing variables.
        names: Vec<String>,
    },

    /// Supplied variables are not declared in the template.
    #[error("unknown variables provided: {}", .names.join(", "))]
    UnknownVariables {
        /// Sorted names of the unknown variables.
        names: Vec<String>,
    },

    /// A component rejected its configuration.
    #[error("{kind} {type_name:?} rejected its configuration: {message}")]
    Component {
        /// Kind of the failing component.
        kind: ComponentKind,
        /// Plugin type of the failing component.
        type_name: String,
        /// Rendered error chain reported by the component.
        message: String,
    },
}
