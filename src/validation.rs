use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Raw form input, keyed by wire field name.
pub type FormValues = BTreeMap<String, String>;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Date,
}

#[derive(Debug, Clone, Copy)]
pub enum Rule {
    Pattern { regex: &'static LazyLock<Regex>, message: &'static str },
    Contains { needle: char, message: &'static str },
    IntRange { min: i64, max: i64, message: &'static str },
    /// Age in whole years on the submission day, inclusive bounds.
    AgeRange { min: i32, max: i32, message: &'static str },
}

#[derive(Debug)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub rules: &'static [Rule],
}

/// Static description of one entity collection: its fields and rules, how it
/// is listed and searched, which fields the store keeps unique, and the nouns
/// used in captions and notices.
#[derive(Debug)]
pub struct EntityDescriptor {
    pub table: &'static str,
    pub singular: &'static str,
    pub plural: &'static str,
    pub fields: &'static [FieldSpec],
    pub order_by: &'static str,
    pub search_columns: &'static [&'static str],
    pub unique_fields: &'static [&'static str],
    pub columns: &'static [&'static str],
}

impl EntityDescriptor {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn lower_singular(&self) -> String {
        self.singular.to_lowercase()
    }

    /// Checks `values` field by field and returns the typed row on success.
    ///
    /// Format rules run first, in field order, for every non-empty value; the
    /// first failing rule wins. Required-but-empty fields are reported after
    /// that. Empty optional fields become `null`.
    pub fn validate(
        &self,
        values: &FormValues,
        today: NaiveDate,
    ) -> Result<Map<String, Value>, ValidationError> {
        for field in self.fields {
            let raw = value_of(values, field.name);
            if raw.trim().is_empty() {
                continue;
            }
            check_kind(field, raw)?;
            for rule in field.rules {
                check_rule(field, rule, raw, today)?;
            }
        }

        if let Some(field) = self
            .fields
            .iter()
            .find(|f| f.required && value_of(values, f.name).trim().is_empty())
        {
            return Err(ValidationError::new(
                field.name,
                format!("El campo {} es obligatorio", field.label),
            ));
        }

        let mut row = Map::new();
        for field in self.fields {
            let raw = value_of(values, field.name);
            let value = if raw.trim().is_empty() {
                Value::Null
            } else {
                match field.kind {
                    FieldKind::Integer => Value::from(parse_int(field, raw)?),
                    FieldKind::Text | FieldKind::Date => Value::String(raw.to_string()),
                }
            };
            row.insert(field.name.to_string(), value);
        }
        Ok(row)
    }
}

/// Whole years between `birth` and `today`.
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age
}

fn value_of<'a>(values: &'a FormValues, name: &str) -> &'a str {
    values.get(name).map(String::as_str).unwrap_or("")
}

fn parse_int(field: &FieldSpec, raw: &str) -> Result<i64, ValidationError> {
    raw.trim().parse::<i64>().map_err(|_| {
        ValidationError::new(
            field.name,
            format!("El campo {} debe ser un número entero", field.label),
        )
    })
}

fn parse_date(field: &FieldSpec, raw: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|_| {
        ValidationError::new(
            field.name,
            format!("El campo {} debe ser una fecha válida", field.label),
        )
    })
}

fn check_kind(field: &FieldSpec, raw: &str) -> Result<(), ValidationError> {
    match field.kind {
        FieldKind::Text => Ok(()),
        FieldKind::Integer => parse_int(field, raw).map(|_| ()),
        FieldKind::Date => parse_date(field, raw).map(|_| ()),
    }
}

fn check_rule(
    field: &FieldSpec,
    rule: &Rule,
    raw: &str,
    today: NaiveDate,
) -> Result<(), ValidationError> {
    let (ok, message) = match *rule {
        Rule::Pattern { regex, message } => (regex.is_match(raw), message),
        Rule::Contains { needle, message } => (raw.contains(needle), message),
        Rule::IntRange { min, max, message } => {
            let n = parse_int(field, raw)?;
            ((min..=max).contains(&n), message)
        }
        Rule::AgeRange { min, max, message } => {
            let age = age_on(parse_date(field, raw)?, today);
            ((min..=max).contains(&age), message)
        }
    };

    if ok {
        Ok(())
    } else {
        Err(ValidationError::new(field.name, message))
    }
}
