use super::error::DecodeError;
use rusoto_dynamodb::AttributeValue;
use serde_json::{Map, Value};
use std::{collections::HashMap, fs, path::Path};

pub const MISSING_KEY_PLACEHOLDER: &str = "unknown";

/// One object of the input array, fields kept in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    fields: Map<String, Value>,
}

pub type RecordBatch = Vec<Record>;

impl Record {
    pub fn new(fields: Map<String, Value>) -> Record {
        Record { fields }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    // value of the key field for progress lines, strings are printed without quotes
    pub fn key_label(&self, key_field: &str) -> String {
        match self.get(key_field) {
            Some(Value::String(text)) => text.to_owned(),
            Some(other) => other.to_string(),
            None => MISSING_KEY_PLACEHOLDER.to_string(),
        }
    }
}

// read the whole file, then decode it as an array of objects
// numbers keep their literal text so DynamoDB gets the exact decimal
pub fn parse_json_file(filename: &Path) -> Result<RecordBatch, DecodeError> {
    let text = fs::read_to_string(filename)?;
    parse_json_text(&text)
}

pub fn parse_json_text(text: &str) -> Result<RecordBatch, DecodeError> {
    let document: Value = serde_json::from_str(text)?;

    let elements = match document {
        Value::Array(elements) => elements,
        other => return Err(DecodeError::NotAnArray(json_type_name(&other))),
    };

    let mut records = Vec::with_capacity(elements.len());
    for (index, element) in elements.into_iter().enumerate() {
        match element {
            Value::Object(fields) => records.push(Record::new(fields)),
            other => {
                return Err(DecodeError::NotAnObject {
                    index,
                    found: json_type_name(&other),
                })
            }
        }
    }

    Ok(records)
}

// convert a record to the item map of a PutItem request
pub fn build_item(record: &Record) -> HashMap<String, AttributeValue> {
    record
        .fields()
        .iter()
        .map(|(name, value)| (name.to_owned(), parse_json_as_attr(value)))
        .collect()
}

fn parse_json_as_attr(json: &Value) -> AttributeValue {
    match json {
        Value::Null => build_null_attr(),

        Value::Bool(x) => build_bool_attr(*x),

        // with arbitrary_precision this is the literal from the file, e.g. "19.99"
        Value::Number(x) => build_number_attr(x.to_string()),

        Value::String(x) => build_string_attr(x.to_owned()),

        Value::Array(array) => build_list_attr(array.iter().map(parse_json_as_attr).collect()),

        Value::Object(dictionary) => {
            let mut attr_map = HashMap::new();
            for (k, v) in dictionary {
                attr_map.insert(k.to_owned(), parse_json_as_attr(v));
            }
            build_map_attr(attr_map)
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn build_null_attr() -> AttributeValue {
    AttributeValue {
        null: Some(true),
        ..Default::default()
    }
}

fn build_string_attr(text: String) -> AttributeValue {
    AttributeValue {
        s: Some(text),
        ..Default::default()
    }
}

fn build_bool_attr(b: bool) -> AttributeValue {
    AttributeValue {
        bool: Some(b),
        ..Default::default()
    }
}

fn build_number_attr(text: String) -> AttributeValue {
    AttributeValue {
        n: Some(text),
        ..Default::default()
    }
}

fn build_list_attr(list: Vec<AttributeValue>) -> AttributeValue {
    AttributeValue {
        l: Some(list),
        ..Default::default()
    }
}

fn build_map_attr(map: HashMap<String, AttributeValue>) -> AttributeValue {
    AttributeValue {
        m: Some(map),
        ..Default::default()
    }
}
