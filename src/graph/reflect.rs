//! Narrow accessors over the schema-less parts of the dump (action inputs,
//! workflow trigger configuration). Each helper either returns the one value
//! its call site needs or says precisely why it could not.

use serde_json::{Map, Value};
use crate::error::ReflectError;

/// Key marking a dynamic reference placeholder in an input bag.
pub const REFERENCE_KEY: &str = "$:ref";

/// Input properties of record actions that hold per-field values.
pub const FIELD_CONTAINERS: [&str; 4] = ["appendValues", "patchValues", "removeValues", "fields"];

pub fn as_object<'a>(value: &'a Value) -> Result<&'a Map<String, Value>, ReflectError> {
    value.as_object().ok_or_else(|| ReflectError::NotAnObject {
        found: describe(value),
    })
}

pub fn get_str<'a>(obj: &'a Map<String, Value>, field: &str) -> Result<&'a str, ReflectError> {
    match obj.get(field) {
        None => Err(ReflectError::MissingField { field: field.to_string() }),
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(ReflectError::WrongType {
            field: field.to_string(),
            expected: "a string",
            found: describe(other),
        }),
    }
}

/// First cron expression of a `schedules` trigger: a list of maps whose
/// values are cron strings.
pub fn cron_schedule(conf: &Value) -> Result<String, ReflectError> {
    if let Value::Array(schedules) = conf {
        for schedule in schedules {
            if let Value::Object(map) = schedule {
                if let Some(cron) = map.values().find_map(Value::as_str) {
                    return Ok(cron.to_string());
                }
            }
        }
    }
    Err(ReflectError::Malformed {
        what: "cron trigger",
        found: conf.to_string(),
    })
}

/// Sensor name of a `sensors`/`flows` trigger: the first key of the first map in the list.
pub fn sensor_trigger(conf: &Value) -> Result<String, ReflectError> {
    conf.as_array()
        .and_then(|list| list.first())
        .and_then(Value::as_object)
        .and_then(|map| map.keys().next())
        .map(|name| name.to_string())
        .ok_or_else(|| ReflectError::Malformed {
            what: "sensor trigger",
            found: conf.to_string(),
        })
}

pub fn emit_sensor_name(inputs: &Value) -> Result<String, ReflectError> {
    let obj = as_object(inputs)?;
    Ok(get_str(obj, "sensorName")?.to_string())
}

/// Application referenced by a record action. Only literal ids can be
/// resolved; a map in `applicationId` is a dynamic reference.
pub fn record_application_id(inputs: &Value) -> Result<String, ReflectError> {
    let obj = as_object(inputs)?;
    match obj.get("applicationId") {
        Some(Value::String(id)) => Ok(id.clone()),
        Some(reference @ Value::Object(_)) => Err(ReflectError::DynamicReference {
            field: "applicationId".to_string(),
            reference: reference.to_string(),
        }),
        Some(other) => Err(ReflectError::WrongType {
            field: "applicationId".to_string(),
            expected: "a string",
            found: describe(other),
        }),
        None => Err(ReflectError::MissingField { field: "applicationId".to_string() }),
    }
}

/// Whether any field container in a record action's inputs holds `field_key`.
/// A container that is itself a dynamic reference cannot be inspected.
pub fn touches_field(inputs: &Map<String, Value>, field_key: &str) -> Result<bool, ReflectError> {
    for property in FIELD_CONTAINERS {
        let Some(Value::Object(container)) = inputs.get(property) else {
            continue;
        };
        if let Some(reference) = container.get(REFERENCE_KEY) {
            return Err(ReflectError::DynamicReference {
                field: property.to_string(),
                reference: reference.to_string(),
            });
        }
        if container.contains_key(field_key) {
            return Ok(true);
        }
    }
    Ok(false)
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(_) => "a boolean".to_string(),
        Value::Number(_) => "a number".to_string(),
        Value::String(_) => "a string".to_string(),
        Value::Array(_) => "a list".to_string(),
        Value::Object(_) => "an object".to_string(),
    }
}
