use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `{results: [...]}` wrapper used by the record-returning endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultsEnvelope<T> {
    pub results: Vec<T>,
}

impl<T> ResultsEnvelope<T> {
    pub fn new(results: Vec<T>) -> Self {
        Self { results }
    }
}

/// `{data: [...], count: N}` wrapper used by the tabular endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabularEnvelope {
    pub data: Vec<Map<String, Value>>,
    pub count: usize,
}

impl TabularEnvelope {
    pub fn new(data: Vec<Map<String, Value>>) -> Self {
        let count = data.len();
        Self { data, count }
    }
}
