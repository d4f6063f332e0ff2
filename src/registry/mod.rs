//! Operation registry: the catalog of supported API operations and the
//! translation of an operation plus parameters into a concrete request.
//!
//! The registry performs no I/O. Descriptors are built once and shared
//! read-only; [`OperationRegistry::standard`] returns the built-in catalog.

mod catalog;
pub mod operation;
pub mod validators;

pub use operation::{HttpMethod, Operation, ParamValidator, RequestPlan};

use crate::error::{Error, ErrorContext};
use crate::types::Parameters;
use crate::Result;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct OperationRegistry {
    operations: Vec<Operation>,
    index: HashMap<String, usize>,
}

impl OperationRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in catalog of user, project, file, analysis and system operations.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        for op in catalog::standard_operations() {
            registry.register(op);
        }
        registry
    }

    /// Add an operation, replacing any existing one with the same id.
    pub fn register(&mut self, operation: Operation) {
        match self.index.get(&operation.id) {
            Some(&i) => self.operations[i] = operation,
            None => {
                self.index.insert(operation.id.clone(), self.operations.len());
                self.operations.push(operation);
            }
        }
    }

    pub fn get_operation(&self, id: &str) -> Option<&Operation> {
        self.index.get(id).map(|&i| &self.operations[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Descriptors in registration order.
    pub fn list(&self) -> &[Operation] {
        &self.operations
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Look up `id` and build its request plan.
    pub fn build_request(&self, id: &str, parameters: &Parameters) -> Result<RequestPlan> {
        let op = self.get_operation(id).ok_or_else(|| {
            Error::validation_with_context(
                format!("unknown operation: {}", id),
                ErrorContext::new().with_source("operation_registry"),
            )
        })?;
        op.build_request(parameters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(v: serde_json::Value) -> Parameters {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn standard_catalog_is_complete_and_ordered() {
        let reg = OperationRegistry::standard();
        assert_eq!(reg.len(), 20);
        assert_eq!(reg.list()[0].id, "login");
        assert_eq!(reg.list()[19].id, "get_usage_statistics");
        assert!(reg.contains("download_file"));
        assert!(!reg.contains("format_disk"));
    }

    #[test]
    fn lookups_are_stable() {
        let reg = OperationRegistry::standard();
        let a = reg.get_operation("update_project").unwrap();
        let b = reg.get_operation("update_project").unwrap();
        assert!(std::ptr::eq(a, b));
        assert_eq!(a.method, b.method);
        assert_eq!(a.path_template, b.path_template);
        assert_eq!(a.required_params, b.required_params);
        assert_eq!(a.optional_params, b.optional_params);
    }

    #[test]
    fn unknown_operation_is_rejected() {
        let reg = OperationRegistry::standard();
        let err = reg.build_request("nope", &Parameters::new()).unwrap_err();
        assert_eq!(err.message(), "unknown operation: nope");
    }

    #[test]
    fn register_replaces_existing_id() {
        let mut reg = OperationRegistry::standard();
        let op = Operation::new("list_projects", "GET", "/v2/projects").unwrap();
        reg.register(op);
        assert_eq!(reg.len(), 20);
        let plan = reg.build_request("list_projects", &Parameters::new()).unwrap();
        assert_eq!(plan.url, "/v2/projects");
    }

    #[test]
    fn get_with_only_path_params_has_empty_query() {
        let reg = OperationRegistry::standard();
        let plan = reg
            .build_request("download_file", &params(json!({"project_id": "p1", "file_id": 7})))
            .unwrap();
        assert_eq!(plan.method, HttpMethod::Get);
        assert_eq!(plan.url, "/projects/p1/files/7");
        assert!(plan.query_params.is_empty());
        assert!(plan.body_params.is_empty());
    }

    #[test]
    fn catalog_validators_are_wired() {
        let reg = OperationRegistry::standard();
        let err = reg
            .build_request("create_project", &params(json!({"name": "X"})))
            .unwrap_err();
        assert_eq!(err.message(), "project name must be between 3 and 100 characters");

        let err = reg
            .build_request(
                "run_analysis",
                &params(json!({"project_id": "p", "analysis_type": "magic"})),
            )
            .unwrap_err();
        assert!(err.message().starts_with("analysis type must be one of"));
    }
}
