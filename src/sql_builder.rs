//! SQL builder producing query templates with named bind slots.
//!
//! Conditions name the parameter they bind instead of carrying a value, so the
//! output is a reusable [`QuerySpec`]: the SQL text is fixed when the builder
//! runs and request values only ever travel through `?` placeholders.
//!
//! # Example
//!
//! ```rust
//! use epichart::SqlBuilder;
//! let spec = SqlBuilder::new("covid_data")
//!     .select(&["date", "total_deaths"])
//!     .where_eq("location", "location")
//!     .order_by(&["date ASC"])
//!     .build();
//! assert_eq!(spec.bind_order().len(), 1);
//! ```

use crate::queries::spec::{BindSlot, QuerySpec};

/// Builds parameterized query templates.
///
/// Column and table names are trusted text chosen by the caller; values are
/// referenced by slot name and bound later. Methods return `&mut Self` for
/// chaining.
pub struct SqlBuilder {
    ctes: Vec<(String, QuerySpec)>,
    select_cols: Vec<String>,
    from_table: String,
    joins: Vec<String>,
    where_clauses: Vec<String>,
    slots: Vec<BindSlot>,
    group_by_cols: Vec<String>,
    order_by_cols: Vec<String>,
    limit_val: Option<usize>,
}

impl SqlBuilder {
    /// Create a builder targeting the given table, view or CTE.
    pub fn new(table: &str) -> Self {
        Self {
            ctes: Vec::new(),
            select_cols: vec!["*".to_string()],
            from_table: table.to_string(),
            joins: Vec::new(),
            where_clauses: Vec::new(),
            slots: Vec::new(),
            group_by_cols: Vec::new(),
            order_by_cols: Vec::new(),
            limit_val: None,
        }
    }

    /// Prepend a named common table expression.
    ///
    /// The CTE's slots are bound before any slot of the outer query.
    pub fn with(&mut self, name: &str, cte: QuerySpec) -> &mut Self {
        self.ctes.push((name.to_string(), cte));
        self
    }

    /// Set the columns to select (replaces the default `*`).
    pub fn select(&mut self, cols: &[&str]) -> &mut Self {
        self.select_cols = cols.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Add a JOIN clause, e.g. `"JOIN covid_data t ON ld.location = t.location"`.
    pub fn join(&mut self, clause: &str) -> &mut Self {
        self.joins.push(clause.to_string());
        self
    }

    /// Add a WHERE condition with one `?` per named slot, in order.
    pub fn where_clause(&mut self, condition: &str, slots: &[&'static str]) -> &mut Self {
        self.where_clauses.push(condition.to_string());
        self.slots.extend(slots.iter().copied().map(BindSlot::one));
        self
    }

    /// Add a WHERE condition with no parameters, e.g. `"beds <> 0"`.
    pub fn where_literal(&mut self, condition: &str) -> &mut Self {
        self.where_clauses.push(condition.to_string());
        self
    }

    /// Add an equality condition: `{column} = ?`.
    pub fn where_eq(&mut self, column: &str, slot: &'static str) -> &mut Self {
        self.where_clause(&format!("{} = ?", column), &[slot])
    }

    /// Add an IN condition bound from a list slot.
    ///
    /// The placeholder list is expanded to one `?` per value at bind time.
    pub fn where_in(&mut self, column: &str, slot: &'static str) -> &mut Self {
        self.where_clauses
            .push(format!("{} IN ({})", column, BindSlot::marker(slot)));
        self.slots.push(BindSlot::list(slot));
        self
    }

    /// `CAST({column} AS DATE) <= CAST(? AS DATE)`.
    pub fn where_date_lte(&mut self, column: &str, slot: &'static str) -> &mut Self {
        self.where_clause(
            &format!("CAST({} AS DATE) <= CAST(? AS DATE)", column),
            &[slot],
        )
    }

    /// `CAST({column} AS DATE) = CAST(? AS DATE)`.
    pub fn where_date_eq(&mut self, column: &str, slot: &'static str) -> &mut Self {
        self.where_clause(
            &format!("CAST({} AS DATE) = CAST(? AS DATE)", column),
            &[slot],
        )
    }

    /// Inclusive date range over two slots.
    pub fn where_date_between(
        &mut self,
        column: &str,
        from_slot: &'static str,
        to_slot: &'static str,
    ) -> &mut Self {
        self.where_clause(
            &format!(
                "CAST({} AS DATE) BETWEEN CAST(? AS DATE) AND CAST(? AS DATE)",
                column
            ),
            &[from_slot, to_slot],
        )
    }

    /// Add GROUP BY columns.
    pub fn group_by(&mut self, cols: &[&str]) -> &mut Self {
        self.group_by_cols
            .extend(cols.iter().map(|c| c.to_string()));
        self
    }

    /// Add ORDER BY clauses (e.g. `"date ASC"`, `"total_cases DESC"`).
    pub fn order_by(&mut self, clauses: &[&str]) -> &mut Self {
        self.order_by_cols
            .extend(clauses.iter().map(|c| c.to_string()));
        self
    }

    /// Set the maximum number of rows to return.
    pub fn limit(&mut self, n: usize) -> &mut Self {
        self.limit_val = Some(n);
        self
    }

    /// Build the final template and its bind order.
    pub fn build(&self) -> QuerySpec {
        let mut parts = Vec::new();
        let mut bind_order = Vec::new();

        if !self.ctes.is_empty() {
            let ctes: Vec<String> = self
                .ctes
                .iter()
                .map(|(name, cte)| format!("{} AS (\n{}\n)", name, cte.template()))
                .collect();
            parts.push(format!("WITH {}", ctes.join(",\n")));
            for (_, cte) in &self.ctes {
                bind_order.extend(cte.bind_order().iter().cloned());
            }
        }

        parts.push(format!("SELECT {}", self.select_cols.join(", ")));
        parts.push(format!("FROM {}", self.from_table));

        for j in &self.joins {
            parts.push(j.clone());
        }

        if !self.where_clauses.is_empty() {
            parts.push(format!("WHERE {}", self.where_clauses.join(" AND ")));
        }

        if !self.group_by_cols.is_empty() {
            parts.push(format!("GROUP BY {}", self.group_by_cols.join(", ")));
        }

        if !self.order_by_cols.is_empty() {
            parts.push(format!("ORDER BY {}", self.order_by_cols.join(", ")));
        }

        if let Some(n) = self.limit_val {
            parts.push(format!("LIMIT {}", n));
        }

        bind_order.extend(self.slots.iter().cloned());
        QuerySpec::new(parts.join("\n"), bind_order)
    }
}
