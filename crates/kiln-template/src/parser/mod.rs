//! Template document parser.
//!
//! Turns raw JSON or YAML into a validated [`Template`] through three
//! phases: decoding into a generic tree, per-section decoding, and
//! cross-referential validation. Parsing never resolves components.

mod decode;
pub mod validator;

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use kiln_common::constants::{STDIN_SENTINEL, TEMPLATE_KEYS, YAML_EXTENSIONS};
use serde_json::Value;

use crate::error::{ParseError, SchemaError};
use crate::template::Template;

/// Parses a JSON template document from bytes.
///
/// # Errors
///
/// Returns [`ParseError::Syntax`] for malformed JSON and
/// [`ParseError::Schema`] for the first schema violation found.
pub fn parse_template(data: &[u8]) -> Result<Template, ParseError> {
    tracing::info!(bytes = data.len(), "parsing JSON template");
    let value: Value = serde_json::from_slice(data).map_err(ParseError::syntax)?;
    parse_template_value(value)
}

/// Parses a YAML template document.
///
/// The YAML is decoded into the same generic tree as JSON, so every
/// schema rule applies unchanged.
///
/// # Errors
///
/// Returns [`ParseError::Syntax`] for malformed YAML and
/// [`ParseError::Schema`] for the first schema violation found.
pub fn parse_template_yaml(input: &str) -> Result<Template, ParseError> {
    tracing::info!(bytes = input.len(), "parsing YAML template");
    let yaml: serde_yaml::Value = serde_yaml::from_str(input).map_err(ParseError::syntax)?;
    reject_non_finite(&yaml)?;
    let value = serde_json::to_value(yaml).map_err(ParseError::syntax)?;
    parse_template_value(value)
}

/// JSON has no `.inf` or `.nan`; converting them would silently yield `null`.
fn reject_non_finite(value: &serde_yaml::Value) -> Result<(), ParseError> {
    match value {
        serde_yaml::Value::Number(n) if n.is_infinite() || n.is_nan() => Err(ParseError::syntax(
            format!("non-finite number {n} is not allowed"),
        )),
        serde_yaml::Value::Sequence(items) => items.iter().try_for_each(reject_non_finite),
        serde_yaml::Value::Mapping(entries) => entries
            .iter()
            .try_for_each(|(key, value)| {
                reject_non_finite(key)?;
                reject_non_finite(value)
            }),
        serde_yaml::Value::Tagged(tagged) => reject_non_finite(&tagged.value),
        _ => Ok(()),
    }
}

/// Reads and parses a template from a file, or from standard input when
/// the path is `-`.
///
/// Files ending in `.yml` or `.yaml` are decoded as YAML, everything else
/// as JSON.
///
/// # Errors
///
/// Returns [`ParseError::Io`] if the source cannot be read, otherwise the
/// same errors as [`parse_template`].
pub fn parse_template_file(path: impl AsRef<Path>) -> Result<Template, ParseError> {
    let path = path.as_ref();
    tracing::info!(path = %path.display(), "reading template");
    let data = read_source(path)?;

    if is_yaml(path) {
        let text = String::from_utf8(data).map_err(ParseError::syntax)?;
        parse_template_yaml(&text)
    } else {
        parse_template(&data)
    }
}

fn read_source(path: &Path) -> Result<Vec<u8>, ParseError> {
    if path == Path::new(STDIN_SENTINEL) {
        return read_all(std::io::stdin().lock(), path);
    }
    std::fs::read(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn read_all(mut reader: impl Read, path: &Path) -> Result<Vec<u8>, ParseError> {
    let mut data = Vec::new();
    let _ = reader
        .read_to_end(&mut data)
        .map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(data)
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| YAML_EXTENSIONS.iter().any(|y| ext.eq_ignore_ascii_case(y)))
}

/// Validates an already-decoded document tree.
///
/// Sections are checked in a fixed order: top-level keys, builders,
/// variables, provisioners, post-processors, build references, hooks.
///
/// # Errors
///
/// Returns [`ParseError::Schema`] for the first violation found.
pub fn parse_template_value(value: Value) -> Result<Template, ParseError> {
    let Value::Object(mut root) = value else {
        return Err(SchemaError::InvalidValue {
            context: "template".into(),
            expected: "an object at the document root",
        }
        .into());
    };

    if let Some(key) = root
        .keys()
        .find(|key| !TEMPLATE_KEYS.contains(&key.as_str()))
    {
        return Err(SchemaError::UnknownKey { key: key.clone() }.into());
    }

    let builders = decode::builders(root.remove("builders"))?;
    let variables = decode::variables(root.remove("variables"))?;
    let provisioners = decode::provisioners(root.remove("provisioners"))?;
    let post_processors = decode::post_processors(root.remove("post-processors"))?;

    let mut template = Template {
        description: decode::optional_string(root.remove("description"), "description")?,
        min_version: decode::optional_string(
            root.remove("min-packer-version"),
            "min-packer-version",
        )?,
        variables,
        builders,
        provisioners,
        post_processors,
        hooks: BTreeMap::new(),
        push: decode::optional_object(root.remove("push"), "push")?,
    };
    validator::validate(&template)?;
    template.hooks = decode::hooks(root.remove("hooks"))?;

    tracing::info!(
        builds = template.builders.len(),
        provisioners = template.provisioners.len(),
        post_processor_chains = template.post_processors.len(),
        "template parsed"
    );
    Ok(template)
}
