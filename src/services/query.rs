use serde::Serialize;
use serde_json::Value;

/// A single list filter in Appwrite's JSON query syntax.
///
/// Each query is sent as one `queries[]` parameter, e.g.
/// `{"method":"equal","attribute":"status","values":["active"]}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Query {
    method: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    attribute: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    values: Option<Vec<Value>>,
}

impl Query {
    fn with_attribute(method: &'static str, attribute: &str, values: Vec<Value>) -> Self {
        Self {
            method,
            attribute: Some(attribute.to_string()),
            values: Some(values),
        }
    }

    pub fn equal(attribute: &str, value: impl Into<Value>) -> Self {
        Self::with_attribute("equal", attribute, vec![value.into()])
    }

    /// Matches any of `values`.
    pub fn equal_any<V: Into<Value>>(attribute: &str, values: impl IntoIterator<Item = V>) -> Self {
        Self::with_attribute("equal", attribute, values.into_iter().map(Into::into).collect())
    }

    pub fn not_equal(attribute: &str, value: impl Into<Value>) -> Self {
        Self::with_attribute("notEqual", attribute, vec![value.into()])
    }

    /// Full-text search; the attribute needs a fulltext index.
    pub fn search(attribute: &str, text: &str) -> Self {
        Self::with_attribute("search", attribute, vec![Value::from(text)])
    }

    pub fn order_asc(attribute: &str) -> Self {
        Self {
            method: "orderAsc",
            attribute: Some(attribute.to_string()),
            values: None,
        }
    }

    pub fn order_desc(attribute: &str) -> Self {
        Self {
            method: "orderDesc",
            attribute: Some(attribute.to_string()),
            values: None,
        }
    }

    pub fn limit(limit: u32) -> Self {
        Self {
            method: "limit",
            attribute: None,
            values: Some(vec![Value::from(limit)]),
        }
    }

    pub fn offset(offset: u32) -> Self {
        Self {
            method: "offset",
            attribute: None,
            values: Some(vec![Value::from(offset)]),
        }
    }

    pub fn to_param(&self) -> String {
        // Only strings, numbers and static names inside; serialization cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// The listing filter used when the caller passes none: active posts only.
pub fn default_post_queries() -> Vec<Query> {
    vec![Query::equal("status", "active")]
}
