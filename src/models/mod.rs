pub mod course;
pub mod professor;
pub mod student;

use std::fmt;
use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::validation::{EntityDescriptor, FormValues};
use crate::view::table::Cell;

pub use course::Course;
pub use professor::Professor;
pub use student::Student;

/// Store-assigned row identity. Never derived from the natural key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub i64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored entity together with the columns the store owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record<T> {
    pub id: RecordId,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(flatten)]
    pub data: T,
}

pub trait Entity: Serialize + DeserializeOwned + Clone + Debug + Send + Sync + 'static {
    fn descriptor() -> &'static EntityDescriptor;

    /// Display cells, one per data column (the actions column is added by the
    /// table renderer).
    fn cells(&self) -> Vec<Cell>;

    fn form_values(&self) -> FormValues {
        let mut values = FormValues::new();
        if let Ok(Value::Object(map)) = serde_json::to_value(self) {
            for (name, value) in map {
                let text = match value {
                    Value::Null => String::new(),
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                values.insert(name, text);
            }
        }
        values
    }
}
