use serde_json::{Map, Value};

/// The three inputs an operation reads: query-string values, path parameters
/// and the decoded JSON body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrudRequest {
    pub query: Map<String, Value>,
    pub params: Map<String, Value>,
    pub body: Value,
}

impl CrudRequest {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw string pairs as an HTTP layer hands them over.
    pub fn from_parts<Q, P>(query: Q, params: P, body: Value) -> Self
    where
        Q: IntoIterator<Item = (String, String)>,
        P: IntoIterator<Item = (String, String)>,
    {
        Self {
            query: query.into_iter().map(|(k, v)| (k, Value::String(v))).collect(),
            params: params.into_iter().map(|(k, v)| (k, Value::String(v))).collect(),
            body,
        }
    }

    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = body;
        self
    }

    /// `params.id`
    #[must_use]
    pub fn id(&self) -> Option<&Value> {
        self.params.get("id")
    }

    /// Path parameters win over query-string values.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<&Value> {
        self.params.get(key).or_else(|| self.query.get(key))
    }
}
