//! Domain primitive types used across the Kiln workspace.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The three plugin families a template wires together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComponentKind {
    /// Produces the initial artifact for a build.
    Builder,
    /// Runs against the machine a builder brought up.
    Provisioner,
    /// Transforms an artifact after the build completes.
    PostProcessor,
}

impl ComponentKind {
    /// Returns the kebab-case name used in documents and messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Builder => "builder",
            Self::Provisioner => "provisioner",
            Self::PostProcessor => "post-processor",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
