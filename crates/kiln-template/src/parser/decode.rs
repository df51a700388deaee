//! Per-section decoding of a generic document tree.
//!
//! Each function takes the value of one top-level section (already removed
//! from the root object) and produces the typed model for it. Shape errors
//! are reported with a location string such as `provisioner 2` or
//! `post-processor 3.1` (1-based).

use std::collections::{BTreeMap, BTreeSet};

use kiln_common::constants::{
    EXCEPT_KEY, KEEP_INPUT_ARTIFACT_KEY, NAME_KEY, ONLY_KEY, OVERRIDE_KEY, TYPE_KEY,
};
use serde_json::Value;

use crate::error::SchemaError;
use crate::template::{BuilderConfig, ConfigMap, PostProcessorConfig, ProvisionerConfig, Variable};

type Result<T> = std::result::Result<T, SchemaError>;

fn invalid(context: impl Into<String>, expected: &'static str) -> SchemaError {
    SchemaError::InvalidValue {
        context: context.into(),
        expected,
    }
}

const fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn object(value: Value, context: &str) -> Result<ConfigMap> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(invalid(context, "an object")),
    }
}

/// Reads the `type` field, leaving it in the config.
fn component_type(raw: &ConfigMap, context: &str) -> Result<String> {
    match raw.get(TYPE_KEY) {
        None => Err(SchemaError::MissingType {
            context: context.to_string(),
        }),
        Some(Value::String(t)) if t.is_empty() => Err(SchemaError::MissingType {
            context: context.to_string(),
        }),
        Some(Value::String(t)) => Ok(t.clone()),
        Some(other) => Err(SchemaError::InvalidType {
            context: context.to_string(),
            found: kind_of(other),
        }),
    }
}

fn name_set(value: Option<Value>, context: &str, field: &str) -> Result<BTreeSet<String>> {
    let items = match value {
        None | Some(Value::Null) => return Ok(BTreeSet::new()),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(invalid(format!("{context} {field}"), "an array of build names")),
    };
    items
        .into_iter()
        .map(|item| match item {
            Value::String(name) => Ok(name),
            _ => Err(invalid(format!("{context} {field}"), "an array of build names")),
        })
        .collect()
}

/// Decodes the `builders` section into a map keyed by build name.
pub(super) fn builders(value: Option<Value>) -> Result<BTreeMap<String, BuilderConfig>> {
    let entries = match value {
        None | Some(Value::Null) => return Err(SchemaError::NoBuilders),
        Some(Value::Array(entries)) => entries,
        Some(_) => return Err(invalid("builders", "an array of objects")),
    };
    if entries.is_empty() {
        return Err(SchemaError::NoBuilders);
    }

    let mut builders = BTreeMap::new();
    for (index, entry) in entries.into_iter().enumerate() {
        let context = format!("builder {}", index + 1);
        let mut raw = object(entry, &context)?;
        let builder_type = component_type(&raw, &context)?;
        let name = match raw.remove(NAME_KEY) {
            None | Some(Value::Null) => builder_type.clone(),
            Some(Value::String(name)) if !name.is_empty() => name,
            Some(_) => return Err(invalid(format!("{context} name"), "a non-empty string")),
        };
        if builders.contains_key(&name) {
            return Err(SchemaError::DuplicateBuildName { name });
        }
        tracing::debug!(build = %name, builder_type = %builder_type, "decoded builder");
        let _ = builders.insert(
            name.clone(),
            BuilderConfig {
                name,
                builder_type,
                raw_config: raw,
            },
        );
    }
    Ok(builders)
}

/// Decodes the `variables` section.
///
/// `null` marks a variable as required; scalars become its textual default.
pub(super) fn variables(value: Option<Value>) -> Result<BTreeMap<String, Variable>> {
    let entries = match value {
        None | Some(Value::Null) => return Ok(BTreeMap::new()),
        Some(Value::Object(entries)) => entries,
        Some(_) => return Err(invalid("variables", "an object")),
    };

    entries
        .into_iter()
        .map(|(name, value)| {
            let variable = match value {
                Value::Null => Variable::required(),
                Value::String(s) => Variable::with_default(s),
                Value::Number(n) => Variable::with_default(number_text(&n)),
                Value::Bool(b) => Variable::with_default(b.to_string()),
                Value::Array(_) | Value::Object(_) => {
                    return Err(invalid(
                        format!("variable {name:?}"),
                        "a string, number, boolean or null",
                    ));
                }
            };
            Ok((name, variable))
        })
        .collect()
}

/// Renders a number the way it was meant, not the way it was stored:
/// `27.0` and `1e3` become `27` and `1000`.
fn number_text(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        i.to_string()
    } else if let Some(u) = n.as_u64() {
        u.to_string()
    } else {
        n.as_f64().map_or_else(|| n.to_string(), |f| f.to_string())
    }
}

/// Decodes the `provisioners` section, preserving declaration order.
pub(super) fn provisioners(value: Option<Value>) -> Result<Vec<ProvisionerConfig>> {
    let entries = match value {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(entries)) => entries,
        Some(_) => return Err(invalid("provisioners", "an array of objects")),
    };

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| provisioner(entry, &format!("provisioner {}", index + 1)))
        .collect()
}

fn provisioner(entry: Value, context: &str) -> Result<ProvisionerConfig> {
    let mut raw = object(entry, context)?;
    let provisioner_type = component_type(&raw, context)?;
    let only = name_set(raw.remove(ONLY_KEY), context, ONLY_KEY)?;
    let except = name_set(raw.remove(EXCEPT_KEY), context, EXCEPT_KEY)?;
    let overrides = overrides(raw.remove(OVERRIDE_KEY), context)?;
    Ok(ProvisionerConfig {
        provisioner_type,
        raw_config: raw,
        only,
        except,
        overrides,
    })
}

fn overrides(value: Option<Value>, context: &str) -> Result<BTreeMap<String, ConfigMap>> {
    let entries = match value {
        None | Some(Value::Null) => return Ok(BTreeMap::new()),
        Some(Value::Object(entries)) => entries,
        Some(_) => {
            return Err(invalid(
                format!("{context} override"),
                "an object keyed by build name",
            ));
        }
    };

    entries
        .into_iter()
        .map(|(build, fields)| {
            let fields = object(fields, &format!("{context} override for {build:?}"))?;
            Ok((build, fields))
        })
        .collect()
}

/// Decodes the `post-processors` section into chains.
///
/// A bare string or an object is a one-element chain; a nested array is a
/// chain whose elements run left to right.
pub(super) fn post_processors(value: Option<Value>) -> Result<Vec<Vec<PostProcessorConfig>>> {
    let entries = match value {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(entries)) => entries,
        Some(_) => return Err(invalid("post-processors", "an array")),
    };

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| -> Result<Vec<PostProcessorConfig>> {
            let context = format!("post-processor {}", index + 1);
            match entry {
                Value::Array(chain) if chain.is_empty() => {
                    Err(invalid(context, "a non-empty post-processor chain"))
                }
                Value::Array(chain) => chain
                    .into_iter()
                    .enumerate()
                    .map(|(position, element)| {
                        post_processor(element, &format!("{context}.{}", position + 1))
                    })
                    .collect(),
                other => Ok(vec![post_processor(other, &context)?]),
            }
        })
        .collect()
}

fn post_processor(entry: Value, context: &str) -> Result<PostProcessorConfig> {
    let mut raw = match entry {
        Value::String(type_name) => {
            let mut raw = ConfigMap::new();
            let _ = raw.insert(TYPE_KEY.to_string(), Value::String(type_name));
            raw
        }
        Value::Object(raw) => raw,
        _ => return Err(invalid(context, "a type name or an object")),
    };
    let post_processor_type = component_type(&raw, context)?;
    let keep_input_artifact = match raw.remove(KEEP_INPUT_ARTIFACT_KEY) {
        None | Some(Value::Null) => false,
        Some(Value::Bool(keep)) => keep,
        Some(_) => {
            return Err(invalid(
                format!("{context} {KEEP_INPUT_ARTIFACT_KEY}"),
                "a boolean",
            ));
        }
    };
    let only = name_set(raw.remove(ONLY_KEY), context, ONLY_KEY)?;
    let except = name_set(raw.remove(EXCEPT_KEY), context, EXCEPT_KEY)?;
    Ok(PostProcessorConfig {
        post_processor_type,
        raw_config: raw,
        keep_input_artifact,
        only,
        except,
    })
}

/// Decodes the `hooks` section.
pub(super) fn hooks(value: Option<Value>) -> Result<BTreeMap<String, Vec<String>>> {
    let entries = match value {
        None | Some(Value::Null) => return Ok(BTreeMap::new()),
        Some(Value::Object(entries)) => entries,
        Some(_) => return Err(invalid("hooks", "an object")),
    };

    entries
        .into_iter()
        .map(|(event, names)| {
            let context = format!("hooks {event:?}");
            let Value::Array(names) = names else {
                return Err(invalid(context, "an array of hook names"));
            };
            let names = names
                .into_iter()
                .map(|name| match name {
                    Value::String(name) => Ok(name),
                    _ => Err(invalid(context.clone(), "an array of hook names")),
                })
                .collect::<Result<Vec<_>>>()?;
            Ok((event, names))
        })
        .collect()
}

/// Decodes an optional string-valued top-level field.
pub(super) fn optional_string(value: Option<Value>, field: &str) -> Result<Option<String>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(invalid(field, "a string")),
    }
}

/// Decodes an optional object-valued top-level field.
pub(super) fn optional_object(value: Option<Value>, field: &str) -> Result<Option<ConfigMap>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(value) => object(value, field).map(Some),
    }
}
