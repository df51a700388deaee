//! Cross-referential validation of a decoded template.
//!
//! Runs once every section is decoded, so the full set of build names is
//! known before filters and overrides are checked against it.

use std::collections::BTreeSet;

use kiln_common::constants::{EXCEPT_KEY, ONLY_KEY, OVERRIDE_KEY};

use crate::error::SchemaError;
use crate::template::Template;

/// Validates filters and overrides of every provisioner and post-processor.
///
/// # Checks performed
///
/// 1. No entry sets both `only` and `except`.
/// 2. Every name in `only`, `except` and `override` is a declared build.
///
/// # Errors
///
/// Returns the first violation found, in declaration order.
pub fn validate(template: &Template) -> Result<(), SchemaError> {
    tracing::debug!(builds = template.builders.len(), "validating build references");

    for (index, provisioner) in template.provisioners.iter().enumerate() {
        let context = format!("provisioner {} ({})", index + 1, provisioner.provisioner_type);
        check_filters(&provisioner.only, &provisioner.except, &context)?;
        check_references(template, ONLY_KEY, provisioner.only.iter(), &context)?;
        check_references(template, EXCEPT_KEY, provisioner.except.iter(), &context)?;
        check_references(template, OVERRIDE_KEY, provisioner.overrides.keys(), &context)?;
    }

    for (index, chain) in template.post_processors.iter().enumerate() {
        for (position, post_processor) in chain.iter().enumerate() {
            let context = format!(
                "post-processor {}.{} ({})",
                index + 1,
                position + 1,
                post_processor.post_processor_type
            );
            check_filters(&post_processor.only, &post_processor.except, &context)?;
            check_references(template, ONLY_KEY, post_processor.only.iter(), &context)?;
            check_references(template, EXCEPT_KEY, post_processor.except.iter(), &context)?;
        }
    }
    Ok(())
}

fn check_filters(
    only: &BTreeSet<String>,
    except: &BTreeSet<String>,
    context: &str,
) -> Result<(), SchemaError> {
    if !only.is_empty() && !except.is_empty() {
        return Err(SchemaError::ConflictingFilter {
            context: context.to_string(),
        });
    }
    Ok(())
}

fn check_references<'a>(
    template: &Template,
    field: &'static str,
    names: impl Iterator<Item = &'a String>,
    context: &str,
) -> Result<(), SchemaError> {
    for name in names {
        if !template.has_build(name) {
            return Err(SchemaError::UnknownBuildReference {
                context: context.to_string(),
                field,
                name: name.clone(),
            });
        }
    }
    Ok(())
}
