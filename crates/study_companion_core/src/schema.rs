//! crates/study_companion_core/src/schema.rs
//!
//! The content schema registry. For each `ContentKind` it declares the exact
//! JSON shape the generation provider must return. The same descriptor is used
//! twice: rendered as JSON Schema to constrain the provider, and compiled into a
//! validator that checks the decoded response before it is trusted.

use crate::domain::ContentKind;
use jsonschema::error::ValidationErrorKind;
use jsonschema::{validator_for, ValidationError as JsonSchemaError};
use serde_json::{json, Map, Value};
use std::fmt;

//=========================================================================================
// Descriptor Types
//=========================================================================================

/// A declarative description of one node of an expected JSON document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaDescriptor {
    String {
        description: Option<&'static str>,
    },
    Integer {
        description: Option<&'static str>,
        minimum: Option<i64>,
        maximum: Option<i64>,
    },
    Array {
        description: Option<&'static str>,
        items: Box<SchemaDescriptor>,
        min_items: Option<usize>,
        max_items: Option<usize>,
    },
    Object {
        description: Option<&'static str>,
        fields: Vec<FieldDescriptor>,
    },
}

/// A named property of an object descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub required: bool,
    pub schema: SchemaDescriptor,
}

impl FieldDescriptor {
    pub fn required(name: &'static str, schema: SchemaDescriptor) -> Self {
        Self {
            name,
            required: true,
            schema,
        }
    }
}

impl SchemaDescriptor {
    pub fn string() -> Self {
        SchemaDescriptor::String { description: None }
    }

    pub fn integer() -> Self {
        SchemaDescriptor::Integer {
            description: None,
            minimum: None,
            maximum: None,
        }
    }

    pub fn array_of(items: SchemaDescriptor) -> Self {
        SchemaDescriptor::Array {
            description: None,
            items: Box::new(items),
            min_items: None,
            max_items: None,
        }
    }

    pub fn object(fields: Vec<FieldDescriptor>) -> Self {
        SchemaDescriptor::Object {
            description: None,
            fields,
        }
    }

    /// Attaches a human-readable description, forwarded to the provider.
    pub fn described(mut self, text: &'static str) -> Self {
        match &mut self {
            SchemaDescriptor::String { description }
            | SchemaDescriptor::Integer { description, .. }
            | SchemaDescriptor::Array { description, .. }
            | SchemaDescriptor::Object { description, .. } => *description = Some(text),
        }
        self
    }

    /// Bounds an integer node. No effect on other nodes.
    pub fn ranged(mut self, min: i64, max: i64) -> Self {
        if let SchemaDescriptor::Integer {
            minimum, maximum, ..
        } = &mut self
        {
            *minimum = Some(min);
            *maximum = Some(max);
        }
        self
    }

    /// Sets a minimum length on an array node. No effect on other nodes.
    pub fn at_least(mut self, len: usize) -> Self {
        if let SchemaDescriptor::Array { min_items, .. } = &mut self {
            *min_items = Some(len);
        }
        self
    }

    /// Pins an array node to an exact length. No effect on other nodes.
    pub fn exactly(mut self, len: usize) -> Self {
        if let SchemaDescriptor::Array {
            min_items,
            max_items,
            ..
        } = &mut self
        {
            *min_items = Some(len);
            *max_items = Some(len);
        }
        self
    }

    fn type_name(&self) -> &'static str {
        match self {
            SchemaDescriptor::String { .. } => "string",
            SchemaDescriptor::Integer { .. } => "integer",
            SchemaDescriptor::Array { .. } => "array",
            SchemaDescriptor::Object { .. } => "object",
        }
    }

    fn description(&self) -> Option<&'static str> {
        match self {
            SchemaDescriptor::String { description }
            | SchemaDescriptor::Integer { description, .. }
            | SchemaDescriptor::Array { description, .. }
            | SchemaDescriptor::Object { description, .. } => *description,
        }
    }

    //=====================================================================================
    // Rendering
    //=====================================================================================

    /// Renders the descriptor as the JSON Schema subset understood by
    /// structured-output providers.
    pub fn to_json_schema(&self) -> Value {
        self.render(true)
    }

    /// The same schema without numeric or length bounds. Those bounds steer the
    /// provider; the decoded response is only held to its structure.
    fn structural_schema(&self) -> Value {
        self.render(false)
    }

    fn render(&self, with_bounds: bool) -> Value {
        let mut node = Map::new();
        node.insert("type".to_string(), json!(self.type_name()));

        match self {
            SchemaDescriptor::String { .. } => {}
            SchemaDescriptor::Integer {
                minimum, maximum, ..
            } => {
                if with_bounds {
                    if let Some(min) = minimum {
                        node.insert("minimum".to_string(), json!(min));
                    }
                    if let Some(max) = maximum {
                        node.insert("maximum".to_string(), json!(max));
                    }
                }
            }
            SchemaDescriptor::Array {
                items,
                min_items,
                max_items,
                ..
            } => {
                node.insert("items".to_string(), items.render(with_bounds));
                if with_bounds {
                    if let Some(min) = min_items {
                        node.insert("minItems".to_string(), json!(min));
                    }
                    if let Some(max) = max_items {
                        node.insert("maxItems".to_string(), json!(max));
                    }
                }
            }
            SchemaDescriptor::Object { fields, .. } => {
                let properties: Map<String, Value> = fields
                    .iter()
                    .map(|field| (field.name.to_string(), field.schema.render(with_bounds)))
                    .collect();
                let required: Vec<&str> = fields
                    .iter()
                    .filter(|field| field.required)
                    .map(|field| field.name)
                    .collect();
                node.insert("properties".to_string(), Value::Object(properties));
                node.insert("required".to_string(), json!(required));
            }
        }

        if let Some(text) = self.description() {
            node.insert("description".to_string(), json!(text));
        }

        Value::Object(node)
    }

    //=====================================================================================
    // Validation
    //=====================================================================================

    /// Checks that `value` has the declared structure: JSON types, nesting and
    /// required fields. Unknown fields are ignored. Integer ranges and array
    /// lengths are instructions to the provider and are not checked here.
    pub fn validate(&self, value: &Value) -> Result<(), ShapeViolation> {
        let validator = validator_for(&self.structural_schema()).map_err(|e| ShapeViolation {
            path: "$".to_string(),
            expected: "a compilable schema".to_string(),
            found: e.to_string(),
        })?;

        match validator.validate(value) {
            Ok(()) => Ok(()),
            Err(error) => Err(self.error_to_violation(&error)),
        }
    }

    /// Converts a JSON Schema error into a violation whose path and expected
    /// type are read off this descriptor.
    fn error_to_violation(&self, error: &JsonSchemaError) -> ShapeViolation {
        let (mut path, node) = self.locate(error.instance_path.as_str());

        match &error.kind {
            ValidationErrorKind::Required { property } => {
                let name = property
                    .as_str()
                    .map(str::to_string)
                    .unwrap_or_else(|| property.to_string());
                let expected = match node {
                    Some(SchemaDescriptor::Object { fields, .. }) => fields
                        .iter()
                        .find(|field| field.name == name)
                        .map(|field| field.schema.type_name())
                        .unwrap_or("a value"),
                    _ => "a value",
                };
                path.push('.');
                path.push_str(&name);
                ShapeViolation {
                    path,
                    expected: expected.to_string(),
                    found: "nothing".to_string(),
                }
            }
            ValidationErrorKind::Type { .. } => ShapeViolation {
                path,
                expected: node.map_or("a value", |n| n.type_name()).to_string(),
                found: json_type_name(&error.instance).to_string(),
            },
            _ => ShapeViolation {
                path,
                expected: node.map_or("a value", |n| n.type_name()).to_string(),
                found: error.to_string(),
            },
        }
    }

    /// Walks a JSON pointer (`/schedule/1/topic`) through the descriptor,
    /// returning the `$.schedule[1].topic` form and the node it lands on.
    fn locate(&self, pointer: &str) -> (String, Option<&SchemaDescriptor>) {
        let mut path = "$".to_string();
        let mut node = Some(self);

        for segment in pointer.split('/').skip(1) {
            let segment = segment.replace("~1", "/").replace("~0", "~");
            node = match node {
                Some(SchemaDescriptor::Array { items, .. }) => {
                    path.push_str(&format!("[{}]", segment));
                    Some(items.as_ref())
                }
                Some(SchemaDescriptor::Object { fields, .. }) => {
                    path.push('.');
                    path.push_str(&segment);
                    fields
                        .iter()
                        .find(|field| field.name == segment)
                        .map(|field| &field.schema)
                }
                _ => {
                    path.push('.');
                    path.push_str(&segment);
                    None
                }
            };
        }

        (path, node)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// The first place a decoded response departs from its descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeViolation {
    /// JSON path of the offending node, e.g. `$.schedule[2].topic`.
    pub path: String,
    pub expected: String,
    pub found: String,
}

impl fmt::Display for ShapeViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "expected {} at {}, found {}",
            self.expected, self.path, self.found
        )
    }
}

//=========================================================================================
// Registry
//=========================================================================================

/// Returns the response descriptor for a content kind.
pub fn schema_for(kind: ContentKind) -> SchemaDescriptor {
    match kind {
        ContentKind::StudyPlan => study_plan_schema(),
        ContentKind::FlashcardDeck => flashcard_deck_schema(),
        ContentKind::Quiz => quiz_schema(),
    }
}

fn study_plan_schema() -> SchemaDescriptor {
    let day = SchemaDescriptor::object(vec![
        FieldDescriptor::required("day", SchemaDescriptor::integer()),
        FieldDescriptor::required("topic", SchemaDescriptor::string()),
        FieldDescriptor::required("focus", SchemaDescriptor::string()),
        FieldDescriptor::required(
            "activities",
            SchemaDescriptor::array_of(SchemaDescriptor::string()),
        ),
    ]);

    SchemaDescriptor::object(vec![
        FieldDescriptor::required("examName", SchemaDescriptor::string()),
        FieldDescriptor::required("targetDate", SchemaDescriptor::string()),
        FieldDescriptor::required("schedule", SchemaDescriptor::array_of(day).at_least(1)),
    ])
}

fn flashcard_deck_schema() -> SchemaDescriptor {
    SchemaDescriptor::array_of(SchemaDescriptor::object(vec![
        FieldDescriptor::required("id", SchemaDescriptor::string()),
        FieldDescriptor::required(
            "front",
            SchemaDescriptor::string().described("The term or question"),
        ),
        FieldDescriptor::required(
            "back",
            SchemaDescriptor::string().described("The definition or answer"),
        ),
        FieldDescriptor::required("category", SchemaDescriptor::string()),
    ]))
}

fn quiz_schema() -> SchemaDescriptor {
    SchemaDescriptor::array_of(SchemaDescriptor::object(vec![
        FieldDescriptor::required("id", SchemaDescriptor::string()),
        FieldDescriptor::required("question", SchemaDescriptor::string()),
        FieldDescriptor::required(
            "options",
            SchemaDescriptor::array_of(SchemaDescriptor::string())
                .exactly(4)
                .described("Array of 4 possible answers"),
        ),
        FieldDescriptor::required(
            "correctAnswerIndex",
            SchemaDescriptor::integer()
                .ranged(0, 3)
                .described("Index of the correct option (0-3)"),
        ),
        FieldDescriptor::required(
            "explanation",
            SchemaDescriptor::string()
                .described("Short explanation of why the answer is correct"),
        ),
    ]))
}
