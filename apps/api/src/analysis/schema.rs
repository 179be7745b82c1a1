//! The fixed nine-field extraction schema and the result built from it.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};

/// One field of the extraction schema. Declaration order is display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobField {
    Company,
    Position,
    Summary,
    Salary,
    Location,
    Requirements,
    PreferredQualifications,
    Responsibilities,
    Other,
}

impl JobField {
    pub const ALL: [JobField; 9] = [
        JobField::Company,
        JobField::Position,
        JobField::Summary,
        JobField::Salary,
        JobField::Location,
        JobField::Requirements,
        JobField::PreferredQualifications,
        JobField::Responsibilities,
        JobField::Other,
    ];

    /// JSON key the model is asked to emit.
    pub fn key(&self) -> &'static str {
        match self {
            JobField::Company => "회사명",
            JobField::Position => "포지션명",
            JobField::Summary => "회사소개",
            JobField::Salary => "급여",
            JobField::Location => "회사위치",
            JobField::Requirements => "지원자격",
            JobField::PreferredQualifications => "우대사항",
            JobField::Responsibilities => "주요업무",
            JobField::Other => "기타",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            JobField::Company => "Company",
            JobField::Position => "Position",
            JobField::Summary => "Company summary",
            JobField::Salary => "Salary",
            JobField::Location => "Location",
            JobField::Requirements => "Requirements",
            JobField::PreferredQualifications => "Preferred qualifications",
            JobField::Responsibilities => "Responsibilities",
            JobField::Other => "Other",
        }
    }

    pub fn marker(&self) -> &'static str {
        match self {
            JobField::Company => "🏢",
            JobField::Position => "💼",
            JobField::Summary => "📝",
            JobField::Salary => "💰",
            JobField::Location => "📍",
            JobField::Requirements => "✅",
            JobField::PreferredQualifications => "⭐",
            JobField::Responsibilities => "📋",
            JobField::Other => "💡",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// A non-empty field, ready for display.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct DisplayField {
    pub key: &'static str,
    pub label: &'static str,
    pub marker: &'static str,
    pub value: String,
}

/// Values for every schema field. Absent fields hold an empty string.
///
/// Built once from a decoded model object and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedResult {
    values: [String; 9],
}

impl ExtractedResult {
    /// Maps a decoded JSON object onto the schema. Keys outside the schema are ignored.
    pub(crate) fn from_object(object: &Map<String, Value>) -> Self {
        let mut values: [String; 9] = Default::default();
        for field in JobField::ALL {
            if let Some(value) = object.get(field.key()) {
                values[field.index()] = field_text(value);
            }
        }
        Self { values }
    }

    pub fn get(&self, field: JobField) -> &str {
        &self.values[field.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (JobField, &str)> + '_ {
        JobField::ALL
            .into_iter()
            .map(move |field| (field, self.get(field)))
    }

    /// True when the model produced nothing usable for any field.
    pub fn is_empty(&self) -> bool {
        self.values.iter().all(String::is_empty)
    }

    /// Non-empty fields in display order.
    pub fn display_fields(&self) -> Vec<DisplayField> {
        self.iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(field, value)| DisplayField {
                key: field.key(),
                label: field.label(),
                marker: field.marker(),
                value: value.to_string(),
            })
            .collect()
    }
}

impl Serialize for ExtractedResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(JobField::ALL.len()))?;
        for (field, value) in self.iter() {
            map.serialize_entry(field.key(), value)?;
        }
        map.end()
    }
}

/// Text for one field, trimmed. Scalars are stringified and lists of scalars are
/// joined line by line; nulls and nested objects count as empty.
fn field_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => items
            .iter()
            .map(field_text)
            .filter(|item| !item.is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
        Value::Null | Value::Object(_) => String::new(),
    }
}
