//! Schema-driven field extraction.
//!
//! A [`SelectionSchema`] declares which fields may be read from an untrusted
//! JSON object and how each one is coerced and bounded. [`select`] walks the
//! schema, never the input, so anything undeclared is left behind (or
//! reported, when the schema rejects unknown fields).
//!
//! Query-string values always arrive as strings, so numeric and boolean kinds
//! also accept their textual form (`"10"`, `"true"`).
//!
//! ```rust
//! use crudservice::selector::{FieldSpec, SelectionSchema};
//! use serde_json::json;
//!
//! let schema = SelectionSchema::new()
//!     .field("title", FieldSpec::string().required().max(120))
//!     .field("priority", FieldSpec::integer().min(0).default_value(json!(3)));
//!
//! let picked = schema
//!     .select(&json!({"title": "Write docs", "owner": "mallory"}))
//!     .unwrap();
//! assert_eq!(picked.get("priority"), Some(&json!(3)));
//! assert!(picked.get("owner").is_none());
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::validation::{ValidationError, ValidationErrors, validators};

/// Fields picked out of an input object, already coerced to their declared kind.
pub type Selection = Map<String, Value>;

/// Logical type of a selectable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    String,
    Integer,
    Float,
    Boolean,
    Uuid,
    /// Any JSON value, passed through untouched.
    Json,
}

impl FieldKind {
    const fn describe(self) -> &'static str {
        match self {
            Self::String => "a string",
            Self::Integer => "an integer",
            Self::Float => "a number",
            Self::Boolean => "a boolean",
            Self::Uuid => "a UUID",
            Self::Json => "a JSON value",
        }
    }
}

/// Type and constraint descriptor for one field.
///
/// `min`/`max` bound the value for numeric kinds and the character count for
/// strings. They are ignored for the other kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
}

impl FieldSpec {
    #[must_use]
    pub const fn new(kind: FieldKind) -> Self {
        Self {
            kind,
            required: false,
            nullable: false,
            default: None,
            min: None,
            max: None,
        }
    }

    #[must_use]
    pub const fn string() -> Self {
        Self::new(FieldKind::String)
    }

    #[must_use]
    pub const fn integer() -> Self {
        Self::new(FieldKind::Integer)
    }

    #[must_use]
    pub const fn float() -> Self {
        Self::new(FieldKind::Float)
    }

    #[must_use]
    pub const fn boolean() -> Self {
        Self::new(FieldKind::Boolean)
    }

    #[must_use]
    pub const fn uuid() -> Self {
        Self::new(FieldKind::Uuid)
    }

    #[must_use]
    pub const fn json() -> Self {
        Self::new(FieldKind::Json)
    }

    /// Page number selector type: integer, at least 1, defaults to 1.
    #[must_use]
    pub fn page() -> Self {
        Self::integer().min(1).default_value(Value::from(1))
    }

    /// Page size selector type: integer in `1..=max`, defaults to `default`.
    #[must_use]
    pub fn limit(default: u64, max: u64) -> Self {
        Self::integer()
            .min(1)
            .max(i64::try_from(max).unwrap_or(i64::MAX))
            .default_value(Value::from(default))
    }

    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    #[must_use]
    pub const fn min(mut self, min: i64) -> Self {
        self.min = Some(min);
        self
    }

    #[must_use]
    pub const fn max(mut self, max: i64) -> Self {
        self.max = Some(max);
        self
    }

    #[must_use]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Coerce and bound-check a single present value.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming `field` when the value has the wrong
    /// shape or falls outside the declared bounds.
    pub fn coerce(&self, field: &str, value: &Value) -> Result<Value, ValidationError> {
        if value.is_null() {
            return if self.nullable {
                Ok(Value::Null)
            } else {
                Err(ValidationError::new(field, "Must not be null"))
            };
        }

        let mismatch = || ValidationError::new(field, format!("Must be {}", self.kind.describe()));

        match self.kind {
            FieldKind::String => {
                let s = value.as_str().ok_or_else(mismatch)?;
                if self.required {
                    validators::validate_required(field, s)?;
                }
                validators::validate_length(
                    field,
                    s,
                    self.min.and_then(|m| usize::try_from(m).ok()),
                    self.max.and_then(|m| usize::try_from(m).ok()),
                )?;
                Ok(Value::String(s.to_owned()))
            }
            FieldKind::Integer => {
                let n = match value {
                    Value::Number(n) => n.as_i64(),
                    Value::String(s) => s.trim().parse::<i64>().ok(),
                    _ => None,
                }
                .ok_or_else(mismatch)?;
                validators::validate_range(field, n, self.min, self.max)?;
                Ok(Value::from(n))
            }
            FieldKind::Float => {
                let n = match value {
                    Value::Number(n) => n.as_f64(),
                    Value::String(s) => s.trim().parse::<f64>().ok(),
                    _ => None,
                }
                .filter(|n| n.is_finite())
                .ok_or_else(mismatch)?;
                #[allow(clippy::cast_precision_loss)]
                let (min, max) = (self.min.map(|m| m as f64), self.max.map(|m| m as f64));
                validators::validate_range(field, n, min, max)?;
                serde_json::Number::from_f64(n)
                    .map(Value::Number)
                    .ok_or_else(mismatch)
            }
            FieldKind::Boolean => match value {
                Value::Bool(b) => Ok(Value::Bool(*b)),
                Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                    "true" | "1" => Ok(Value::Bool(true)),
                    "false" | "0" => Ok(Value::Bool(false)),
                    _ => Err(mismatch()),
                },
                _ => Err(mismatch()),
            },
            FieldKind::Uuid => {
                let s = value.as_str().ok_or_else(mismatch)?;
                let id = Uuid::parse_str(s.trim()).map_err(|_| mismatch())?;
                Ok(Value::String(id.hyphenated().to_string()))
            }
            FieldKind::Json => Ok(value.clone()),
        }
    }
}

/// What to do with input keys the schema does not declare.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownFields {
    #[default]
    Ignore,
    Reject,
}

/// Declared set of selectable fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionSchema {
    #[serde(default)]
    fields: BTreeMap<String, FieldSpec>,
    #[serde(default)]
    unknown_fields: UnknownFields,
}

impl SelectionSchema {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn field(mut self, name: impl Into<String>, spec: FieldSpec) -> Self {
        self.fields.insert(name.into(), spec);
        self
    }

    /// Report undeclared input keys instead of dropping them.
    #[must_use]
    pub const fn reject_unknown(mut self) -> Self {
        self.unknown_fields = UnknownFields::Reject;
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// See [`select`].
    ///
    /// # Errors
    ///
    /// Returns every field-level problem found in `input`.
    pub fn select(&self, input: &Value) -> Result<Selection, ValidationErrors> {
        select(self, input)
    }

    /// Like [`select`], but absent fields are simply left out: no defaults
    /// are applied and required fields may be omitted. Used for partial
    /// updates, where an absent field means "leave unchanged".
    ///
    /// # Errors
    ///
    /// Returns every field-level problem found among the fields present.
    pub fn select_partial(&self, input: &Value) -> Result<Selection, ValidationErrors> {
        extract(self, input, Presence::Partial)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Presence {
    Complete,
    Partial,
}

/// Extract the fields declared by `schema` from `input`.
///
/// `null` input is treated as an empty object. Absent fields take their
/// default when one is declared, fail when required, and are otherwise left
/// out of the selection.
///
/// # Errors
///
/// Returns the collected [`ValidationErrors`] when `input` is not an object,
/// a value cannot be coerced, a required field is missing, or (with
/// [`UnknownFields::Reject`]) an undeclared key is present.
pub fn select(schema: &SelectionSchema, input: &Value) -> Result<Selection, ValidationErrors> {
    extract(schema, input, Presence::Complete)
}

fn extract(
    schema: &SelectionSchema,
    input: &Value,
    presence: Presence,
) -> Result<Selection, ValidationErrors> {
    let empty = Map::new();
    let object = match input {
        Value::Object(map) => map,
        Value::Null => &empty,
        _ => {
            return Err(ValidationError::new("body", "Expected a JSON object").into());
        }
    };

    let mut errors = ValidationErrors::new();
    let mut selection = Selection::new();

    for (name, spec) in &schema.fields {
        match object.get(name) {
            Some(raw) => match spec.coerce(name, raw) {
                Ok(value) => {
                    selection.insert(name.clone(), value);
                }
                Err(e) => errors.add(e),
            },
            None if presence == Presence::Partial => {}
            None => {
                if let Some(default) = &spec.default {
                    selection.insert(name.clone(), default.clone());
                } else if spec.required {
                    errors.add(ValidationError::new(name.as_str(), "This field is required"));
                }
            }
        }
    }

    if schema.unknown_fields == UnknownFields::Reject {
        for key in object.keys().filter(|k| !schema.fields.contains_key(*k)) {
            errors.add(ValidationError::new(key.as_str(), "Unknown field"));
        }
    }

    errors.result().map(|()| selection)
}
