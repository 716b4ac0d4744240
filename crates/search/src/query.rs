//! Construction of Typesense wire requests
//!
//! Callers speak in structured terms (free text, sort tokens, equality
//! filters, facet groups, numeric ranges); this module translates those
//! into the engine's query-string parameters and `filter_by` boolean
//! expression syntax.

use bazaar_core::models::SortOption;

/// Default multi-language field list for free-text product queries.
/// Covers name, brand, shop name, and all three category levels in
/// English, Arabic, and Kurdish so queries match localized metadata.
pub const DEFAULT_PRODUCT_QUERY_BY: &str = "name,name_ar,name_ku,brand,shop_name,\
category_name,category_name_ar,category_name_ku,\
subcategory_name,subcategory_name_ar,subcategory_name_ku,\
subsubcategory_name,subsubcategory_name_ar,subsubcategory_name_ku";

/// Wire-level parameters for one search request.
///
/// `page` here is already 1-indexed as the engine expects; use
/// [`SearchParams::for_page`] to convert from the public 0-indexed API.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchParams {
    pub q: String,
    pub query_by: String,
    pub sort_by: Option<String>,
    pub page: usize,
    pub per_page: usize,
    pub filter_by: Option<String>,
    pub facet_by: Option<String>,
    pub max_facet_values: Option<usize>,
    pub include_fields: Option<String>,
}

impl SearchParams {
    /// Build params for a 0-indexed public page
    pub fn for_page(query: &str, query_by: &str, page: usize, per_page: usize) -> Self {
        Self {
            q: normalize_query(query),
            query_by: query_by.to_string(),
            page: page + 1,
            per_page,
            ..Self::default()
        }
    }

    pub fn with_sort(mut self, sort: SortOption) -> Self {
        self.sort_by = Some(sort_expression(sort));
        self
    }

    pub fn with_filter(mut self, filter: Option<String>) -> Self {
        self.filter_by = filter;
        self
    }

    pub fn with_include_fields(mut self, fields: Option<String>) -> Self {
        self.include_fields = fields;
        self
    }

    pub fn with_facets(mut self, facet_by: &str, max_values: usize) -> Self {
        self.facet_by = Some(facet_by.to_string());
        self.max_facet_values = Some(max_values);
        self
    }

    /// Render as query-string pairs for the HTTP request
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("q".to_string(), self.q.clone()),
            ("query_by".to_string(), self.query_by.clone()),
            ("page".to_string(), self.page.to_string()),
            ("per_page".to_string(), self.per_page.to_string()),
        ];
        if let Some(sort_by) = &self.sort_by {
            pairs.push(("sort_by".to_string(), sort_by.clone()));
        }
        if let Some(filter_by) = &self.filter_by {
            pairs.push(("filter_by".to_string(), filter_by.clone()));
        }
        if let Some(facet_by) = &self.facet_by {
            pairs.push(("facet_by".to_string(), facet_by.clone()));
        }
        if let Some(max) = self.max_facet_values {
            pairs.push(("max_facet_values".to_string(), max.to_string()));
        }
        if let Some(fields) = &self.include_fields {
            pairs.push(("include_fields".to_string(), fields.clone()));
        }
        pairs
    }
}

/// Empty or whitespace-only queries become the match-all wildcard
pub fn normalize_query(query: &str) -> String {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        "*".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Map a sort option to the engine's `field:direction` expression
pub fn sort_expression(sort: SortOption) -> String {
    match sort {
        SortOption::Date => "created_at:desc".to_string(),
        SortOption::Alphabetical => "name:asc".to_string(),
        SortOption::PriceAsc => "price:asc".to_string(),
        SortOption::PriceDesc => "price:desc".to_string(),
        SortOption::Timestamp => "updated_at:desc".to_string(),
        SortOption::Relevance => "promotion_score:desc,created_at:desc".to_string(),
    }
}

/// Rewrite an equality filter of shape `field:"value"` (or `field:value`)
/// into the engine's `field:=value` syntax.
pub fn equality_filter(raw: &str) -> Option<String> {
    let (field, value) = raw.split_once(':')?;
    let field = field.trim();
    let value = value.trim().trim_matches('"');
    if field.is_empty() || value.is_empty() {
        return None;
    }
    Some(format!("{field}:={value}"))
}

/// Combine grouped facet filters: values within a group are OR'd
/// (parenthesized when the group has more than one value), groups are
/// AND'd together by the caller via [`combine_filters`].
pub fn facet_group_clause(group: &[String]) -> Option<String> {
    let clauses: Vec<String> = group.iter().filter_map(|v| equality_filter(v)).collect();
    match clauses.len() {
        0 => None,
        1 => Some(clauses.into_iter().next()?),
        _ => Some(format!("({})", clauses.join(" || "))),
    }
}

/// Rewrite a numeric filter of shape `"field op value"` into the
/// engine's `field:opvalue` syntax. Ops: `>=`, `<=`, `>`, `<`, `=`.
pub fn numeric_filter(raw: &str) -> Option<String> {
    // Two-character operators must be checked before their prefixes.
    for op in [">=", "<=", ">", "<", "="] {
        if let Some((field, value)) = raw.split_once(op) {
            let field = field.trim();
            let value = value.trim();
            if field.is_empty() || value.is_empty() || field.contains(' ') {
                return None;
            }
            return Some(format!("{field}:{op}{value}"));
        }
    }
    None
}

/// AND together all non-empty filter clauses
pub fn combine_filters<I>(clauses: I) -> Option<String>
where
    I: IntoIterator<Item = String>,
{
    let parts: Vec<String> = clauses.into_iter().filter(|c| !c.is_empty()).collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" && "))
    }
}

/// Build the full `filter_by` expression from an optional base filter,
/// facet groups, and numeric filters.
pub fn build_filter_by(
    base: Option<&str>,
    facet_groups: &[Vec<String>],
    numeric_filters: &[String],
) -> Option<String> {
    let mut clauses = Vec::new();
    if let Some(base) = base {
        let base = base.trim();
        if !base.is_empty() {
            clauses.push(base.to_string());
        }
    }
    clauses.extend(facet_groups.iter().filter_map(|g| facet_group_clause(g)));
    clauses.extend(numeric_filters.iter().filter_map(|n| numeric_filter(n)));
    combine_filters(clauses)
}
