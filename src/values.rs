//! JSON → `sea_orm::Value` coercion driven by the target column's type.
//!
//! Active models only accept the exact `Value` variant their field was
//! generated with, so the variant is picked from `ColumnDef::get_column_type`
//! rather than from the JSON shape.

use sea_orm::{ColumnTrait, ColumnType, Value};
use serde_json::Value as Json;
use uuid::Uuid;

use crate::validation::ValidationError;

/// Find the column of `C` whose name is `name`.
#[must_use]
pub fn column_by_name<C: ColumnTrait>(name: &str) -> Option<C> {
    C::iter().find(|column| column.as_str() == name)
}

fn parse_i64(json: &Json) -> Option<i64> {
    match json {
        Json::Number(n) => n.as_i64(),
        Json::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_u64(json: &Json) -> Option<u64> {
    match json {
        Json::Number(n) => n.as_u64(),
        Json::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_f64(json: &Json) -> Option<f64> {
    match json {
        Json::Number(n) => n.as_f64(),
        Json::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_bool(json: &Json) -> Option<bool> {
    match json {
        Json::Bool(b) => Some(*b),
        Json::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn parse_string(json: &Json) -> Option<String> {
    match json {
        Json::String(s) => Some(s.clone()),
        Json::Number(n) => Some(n.to_string()),
        Json::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Convert `json` into the `Value` variant stored by `column`.
///
/// `null` becomes the typed `None` of that variant and is only accepted for
/// nullable columns.
///
/// # Errors
///
/// Returns a [`ValidationError`] named after the column when the value does not
/// fit the column type or the column type is not supported.
pub fn column_value<C: ColumnTrait>(column: &C, json: &Json) -> Result<Value, ValidationError> {
    let def = column.def();
    let field = column.as_str();
    let null = json.is_null();
    if null && !def.is_null() {
        return Err(ValidationError::new(field, "Must not be null"));
    }
    let invalid = |expected: &str| ValidationError::new(field, format!("Must be {expected}"));

    macro_rules! int {
        ($variant:ident, $ty:ty, $parse:ident) => {
            if null {
                Value::$variant(None)
            } else {
                let n = $parse(json).ok_or_else(|| invalid("an integer"))?;
                let n = <$ty>::try_from(n).map_err(|_| invalid("within the column's range"))?;
                Value::$variant(Some(n))
            }
        };
    }

    let value = match def.get_column_type() {
        ColumnType::Char(_) | ColumnType::String(_) | ColumnType::Text => {
            if null {
                Value::String(None)
            } else {
                let s = parse_string(json).ok_or_else(|| invalid("a string"))?;
                Value::String(Some(Box::new(s)))
            }
        }
        ColumnType::TinyInteger => int!(TinyInt, i8, parse_i64),
        ColumnType::SmallInteger => int!(SmallInt, i16, parse_i64),
        ColumnType::Integer => int!(Int, i32, parse_i64),
        ColumnType::BigInteger => int!(BigInt, i64, parse_i64),
        ColumnType::TinyUnsigned => int!(TinyUnsigned, u8, parse_u64),
        ColumnType::SmallUnsigned => int!(SmallUnsigned, u16, parse_u64),
        ColumnType::Unsigned => int!(Unsigned, u32, parse_u64),
        ColumnType::BigUnsigned => int!(BigUnsigned, u64, parse_u64),
        ColumnType::Float => {
            if null {
                Value::Float(None)
            } else {
                #[allow(clippy::cast_possible_truncation)]
                let n = parse_f64(json).ok_or_else(|| invalid("a number"))? as f32;
                Value::Float(Some(n))
            }
        }
        ColumnType::Double => {
            if null {
                Value::Double(None)
            } else {
                Value::Double(Some(parse_f64(json).ok_or_else(|| invalid("a number"))?))
            }
        }
        ColumnType::Boolean => {
            if null {
                Value::Bool(None)
            } else {
                Value::Bool(Some(parse_bool(json).ok_or_else(|| invalid("a boolean"))?))
            }
        }
        ColumnType::Uuid => {
            if null {
                Value::Uuid(None)
            } else {
                let id = json
                    .as_str()
                    .and_then(|s| Uuid::parse_str(s.trim()).ok())
                    .ok_or_else(|| invalid("a UUID"))?;
                Value::Uuid(Some(Box::new(id)))
            }
        }
        ColumnType::Json | ColumnType::JsonBinary => {
            if null {
                Value::Json(None)
            } else {
                Value::Json(Some(Box::new(json.clone())))
            }
        }
        other => {
            return Err(ValidationError::new(
                field,
                format!("Unsupported column type {other:?}"),
            ));
        }
    };

    Ok(value)
}
