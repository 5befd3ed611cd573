//! Query templates and positional binding.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::{ReportError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Arity {
    /// A single `?`.
    One,
    /// A `{name}` marker expanded to `?, ?, ...`, one per value.
    List,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BindSlot {
    pub name: &'static str,
    pub arity: Arity,
}

impl BindSlot {
    pub fn one(name: &'static str) -> Self {
        Self { name, arity: Arity::One }
    }

    pub fn list(name: &'static str) -> Self {
        Self { name, arity: Arity::List }
    }

    pub(crate) fn marker(name: &str) -> String {
        format!("{{{}}}", name)
    }
}

/// An immutable query template plus the order its slots are bound in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuerySpec {
    template: String,
    bind_order: Vec<BindSlot>,
}

impl QuerySpec {
    pub fn new(template: String, bind_order: Vec<BindSlot>) -> Self {
        Self { template, bind_order }
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn bind_order(&self) -> &[BindSlot] {
        &self.bind_order
    }

    /// Produce executable SQL and its positional values.
    ///
    /// The SQL depends only on the template and on how many values each list
    /// slot holds; values never enter the text.
    pub fn bind(&self, values: &BindValues) -> Result<BoundQuery> {
        let mut sql = self.template.clone();
        let mut bound = Vec::new();

        for slot in &self.bind_order {
            let value = values.get(slot.name).ok_or_else(|| {
                ReportError::Validation(format!("missing value for {}", slot.name))
            })?;
            match (slot.arity, value) {
                (Arity::One, BindValue::One(v)) => bound.push(v.clone()),
                (Arity::List, BindValue::Many(vs)) => {
                    if vs.is_empty() {
                        return Err(ReportError::Validation(format!(
                            "{} needs at least one value",
                            slot.name
                        )));
                    }
                    let placeholders = vec!["?"; vs.len()].join(", ");
                    sql = sql.replacen(&BindSlot::marker(slot.name), &placeholders, 1);
                    bound.extend(vs.iter().cloned());
                }
                (Arity::One, BindValue::Many(_)) => {
                    return Err(ReportError::Validation(format!(
                        "{} takes a single value",
                        slot.name
                    )))
                }
                (Arity::List, BindValue::One(v)) => {
                    sql = sql.replacen(&BindSlot::marker(slot.name), "?", 1);
                    bound.push(v.clone());
                }
            }
        }

        Ok(BoundQuery { sql, values: bound })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindValue {
    One(String),
    Many(Vec<String>),
}

/// Values keyed by slot name.
#[derive(Debug, Clone, Default)]
pub struct BindValues {
    values: HashMap<&'static str, BindValue>,
}

impl BindValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn one(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.values.insert(name, BindValue::One(value.into()));
        self
    }

    pub fn many<I, S>(mut self, name: &'static str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.values.insert(
            name,
            BindValue::Many(values.into_iter().map(Into::into).collect()),
        );
        self
    }

    pub fn get(&self, name: &str) -> Option<&BindValue> {
        self.values.get(name)
    }
}

/// SQL ready for execution with its positional values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundQuery {
    pub sql: String,
    pub values: Vec<String>,
}

impl BoundQuery {
    /// A query without parameters.
    pub fn unbound(sql: impl Into<String>) -> Self {
        Self { sql: sql.into(), values: Vec::new() }
    }
}
