use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Run plan written by the test runner before any worker starts.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RunPlan {
    pub worker_count: usize,

    /// Tests grouped by module.
    #[serde(default)]
    pub groups: BTreeMap<String, Vec<TestItem>>,

    /// Parameter names shared by every test, shown as table columns by the UI.
    #[serde(default)]
    pub row_params: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TestItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub params: Map<String, Value>,
}
