//! Formatted output helpers for CLI commands.

use std::fmt::Write as _;

use kiln_common::config::KilnConfig;
use kiln_template::Template;

/// Renders the sectioned `inspect` listing of a template.
///
/// Each build lists the provisioners and post-processor chains that apply
/// to it after `only`/`except` filtering.
#[must_use]
pub fn render_template(template: &Template, config: &KilnConfig) -> String {
    let mut out = String::new();

    if let Some(description) = &template.description {
        let _ = writeln!(out, "Description: {description}\n");
    }

    let _ = writeln!(out, "Variables:");
    if template.variables.is_empty() {
        let _ = writeln!(out, "  <none>");
    }
    for (name, variable) in &template.variables {
        if variable.required {
            let _ = writeln!(out, "  {name} (required)");
        } else {
            let _ = writeln!(out, "  {name} = {:?}", variable.default);
        }
    }

    let _ = writeln!(
        out,
        "\nBuilds (debug: {}, force: {}):",
        config.debug, config.force
    );
    for (name, builder) in &template.builders {
        let _ = writeln!(out, "  {name} ({})", builder.builder_type);

        for provisioner in template.provisioners.iter().filter(|p| p.applies_to(name)) {
            let marker = if provisioner.overrides.contains_key(name) {
                " [override]"
            } else {
                ""
            };
            let _ = writeln!(
                out,
                "    provisioner: {}{marker}",
                provisioner.provisioner_type
            );
        }

        for chain in &template.post_processors {
            let steps: Vec<String> = chain
                .iter()
                .filter(|pp| pp.applies_to(name))
                .map(|pp| {
                    if pp.keep_input_artifact {
                        format!("{} (keep input)", pp.post_processor_type)
                    } else {
                        pp.post_processor_type.clone()
                    }
                })
                .collect();
            if !steps.is_empty() {
                let _ = writeln!(out, "    post-processors: {}", steps.join(" -> "));
            }
        }
    }

    if !template.hooks.is_empty() {
        let hooks: Vec<&str> = template.hooks.keys().map(String::as_str).collect();
        let _ = writeln!(out, "\nHooks: {}", hooks.join(", "));
    }

    out.trim_end().to_string()
}
