//! Translation of typed list queries into PostgREST query parameters.

use brandintel_core::{Filter, FilterOp, FilterValue, ListQuery, RecordKind};

/// Query pairs for a `GET /rest/v1/{table}` selecting full rows.
#[must_use]
pub fn select_pairs(kind: RecordKind, query: &ListQuery) -> Vec<(String, String)> {
    let mut pairs = Vec::with_capacity(query.filters.len() + 4);
    pairs.push(("select".to_owned(), "*".to_owned()));
    for filter in &query.filters {
        pairs.push((filter.column.to_owned(), render_filter(filter)));
    }
    let direction = if kind.order_descending() { "desc" } else { "asc" };
    pairs.push((
        "order".to_owned(),
        format!("{}.{direction}", kind.order_column()),
    ));
    pairs.push(("limit".to_owned(), query.page.limit.to_string()));
    pairs.push(("offset".to_owned(), query.page.offset.to_string()));
    pairs
}

/// Render one filter as a PostgREST `operator.value` expression.
#[must_use]
pub fn render_filter(filter: &Filter) -> String {
    match (filter.op, &filter.value) {
        (FilterOp::Eq, value) => format!("eq.{}", value.as_text()),
        (FilterOp::Gte, value) => format!("gte.{}", value.as_text()),
        (FilterOp::Lte, value) => format!("lte.{}", value.as_text()),
        (FilterOp::ILike, value) => format!("ilike.*{}*", like_pattern(&value.as_text())),
        (FilterOp::Contains, FilterValue::List(values)) => {
            format!("cs.{}", serde_json::Value::from(values.clone()))
        }
        (FilterOp::Contains, value) => {
            format!("cs.{}", serde_json::Value::from(vec![value.as_text()]))
        }
        (FilterOp::In, FilterValue::List(values)) => format!(
            "in.({})",
            values.iter().map(|v| quote(v)).collect::<Vec<_>>().join(",")
        ),
        (FilterOp::In, value) => format!("in.({})", quote(&value.as_text())),
    }
}

/// Parse the total out of a `Content-Range` header (`0-19/57`, `*/0`).
#[must_use]
pub fn parse_content_range(value: &str) -> Option<u64> {
    value.rsplit_once('/')?.1.parse().ok()
}

/// Escape LIKE metacharacters so the search term matches literally.
fn like_pattern(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        match c {
            '*' => {}
            '%' | '_' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

/// Double-quote a list element so reserved characters survive.
fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}
