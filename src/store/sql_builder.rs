//! Parameterized SELECT construction for the card store.
//!
//! Values are always bound through `?` placeholders. Builder methods return
//! `&mut Self` for chaining.
//!
//! ```rust
//! use commander_forge::store::SqlBuilder;
//! let (sql, params) = SqlBuilder::new("cards c")
//!     .select(&["c.name"])
//!     .where_in_lower(&["c.name"], &["Sol Ring"])
//!     .limit(5)
//!     .build();
//! assert!(sql.contains("LOWER(c.name) IN (?)"));
//! assert_eq!(params, vec!["sol ring"]);
//! ```

pub struct SqlBuilder {
    select_cols: Vec<String>,
    from_table: String,
    joins: Vec<String>,
    where_clauses: Vec<String>,
    params: Vec<String>,
    order_by_cols: Vec<String>,
    limit_val: Option<usize>,
}

impl SqlBuilder {
    pub fn new(table: &str) -> Self {
        Self {
            select_cols: vec!["*".to_string()],
            from_table: table.to_string(),
            joins: Vec::new(),
            where_clauses: Vec::new(),
            params: Vec::new(),
            order_by_cols: Vec::new(),
            limit_val: None,
        }
    }

    pub fn select(&mut self, cols: &[&str]) -> &mut Self {
        self.select_cols = cols.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Add a full JOIN expression, e.g. `"LEFT JOIN card_legalities l ON c.uuid = l.uuid"`.
    pub fn join(&mut self, clause: &str) -> &mut Self {
        self.joins.push(clause.to_string());
        self
    }

    /// Case-insensitive membership of any of `columns` in `values`.
    ///
    /// Values are lower-cased before binding. An empty list matches nothing.
    pub fn where_in_lower(&mut self, columns: &[&str], values: &[&str]) -> &mut Self {
        if values.is_empty() || columns.is_empty() {
            self.where_clauses.push("FALSE".to_string());
            return self;
        }
        let placeholders = vec!["?"; values.len()].join(", ");
        let parts: Vec<String> = columns
            .iter()
            .map(|c| format!("LOWER({}) IN ({})", c, placeholders))
            .collect();
        for _ in columns {
            self.params
                .extend(values.iter().map(|v| v.trim().to_lowercase()));
        }
        self.where_clauses.push(format!("({})", parts.join(" OR ")));
        self
    }

    /// Case-insensitive substring match against any of `columns`.
    pub fn where_contains(&mut self, columns: &[&str], needle: &str) -> &mut Self {
        if columns.is_empty() {
            return self;
        }
        let pattern = format!("%{}%", needle.trim().to_lowercase());
        let parts: Vec<String> = columns
            .iter()
            .map(|c| format!("LOWER({}) LIKE ?", c))
            .collect();
        for _ in columns {
            self.params.push(pattern.clone());
        }
        self.where_clauses.push(format!("({})", parts.join(" OR ")));
        self
    }

    pub fn order_by(&mut self, clauses: &[&str]) -> &mut Self {
        self.order_by_cols
            .extend(clauses.iter().map(|c| c.to_string()));
        self
    }

    pub fn limit(&mut self, n: usize) -> &mut Self {
        self.limit_val = Some(n);
        self
    }

    /// The SQL text and its bound parameters, in placeholder order.
    pub fn build(&self) -> (String, Vec<String>) {
        let mut parts = vec![
            format!("SELECT {}", self.select_cols.join(", ")),
            format!("FROM {}", self.from_table),
        ];
        parts.extend(self.joins.iter().cloned());
        if !self.where_clauses.is_empty() {
            parts.push(format!("WHERE {}", self.where_clauses.join(" AND ")));
        }
        if !self.order_by_cols.is_empty() {
            parts.push(format!("ORDER BY {}", self.order_by_cols.join(", ")));
        }
        if let Some(n) = self.limit_val {
            parts.push(format!("LIMIT {}", n));
        }
        (parts.join("\n"), self.params.clone())
    }
}
