//! Reserved document keys and system-wide constants.

/// Top-level keys a template document may contain.
pub const TEMPLATE_KEYS: &[&str] = &[
    "variables",
    "builders",
    "provisioners",
    "post-processors",
    "hooks",
    "description",
    "min-packer-version",
    "push",
];

/// Path that selects standard input instead of a named file.
pub const STDIN_SENTINEL: &str = "-";

/// Component type field, required on every builder, provisioner and post-processor.
pub const TYPE_KEY: &str = "type";

/// Optional builder field naming the build. Defaults to the builder type.
pub const NAME_KEY: &str = "name";

/// Filter restricting an entry to the listed builds.
pub const ONLY_KEY: &str = "only";

/// Filter excluding an entry from the listed builds.
pub const EXCEPT_KEY: &str = "except";

/// Per-build provisioner overrides.
pub const OVERRIDE_KEY: &str = "override";

/// Post-processor flag keeping the artifact that was fed into it.
pub const KEEP_INPUT_ARTIFACT_KEY: &str = "keep_input_artifact";

/// Build-context key carrying the active build name.
pub const BUILD_NAME_KEY: &str = "packer_build_name";

/// Build-context key carrying the active builder type.
pub const BUILDER_TYPE_KEY: &str = "packer_builder_type";

/// Build-context key carrying the debug flag.
pub const DEBUG_KEY: &str = "packer_debug";

/// Build-context key carrying the force flag.
pub const FORCE_KEY: &str = "packer_force";

/// Key under which resolved user variables are handed to components.
pub const USER_VARIABLES_KEY: &str = "packer_user_variables";

/// File extensions decoded as YAML rather than JSON.
pub const YAML_EXTENSIONS: &[&str] = &["yml", "yaml"];

/// Binary name for the CLI.
pub const BIN_NAME: &str = "kiln";
