//! Row-level access policy model

use serde::{Deserialize, Serialize};

use super::enums::PolicyOperation;

/// Per-table, per-operation predicate restricting which rows a statement may
/// see or write.
///
/// Shape by operation: INSERT carries only `with_check`, UPDATE carries both,
/// SELECT and DELETE carry only `using`. Use the constructors to build
/// well-shaped policies; [`AccessPolicy::shape_violations`] reports the rest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AccessPolicy {
    pub table: String,
    pub name: String,
    pub operation: PolicyOperation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub using: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub with_check: Option<String>,
    /// Roles the policy applies to; empty means `public`.
    #[serde(default)]
    pub roles: Vec<String>,
}

impl AccessPolicy {
    fn base(table: impl Into<String>, name: impl Into<String>, operation: PolicyOperation) -> Self {
        Self {
            table: table.into(),
            name: name.into(),
            operation,
            using: None,
            with_check: None,
            roles: Vec::new(),
        }
    }

    pub fn select(
        table: impl Into<String>,
        name: impl Into<String>,
        using: impl Into<String>,
    ) -> Self {
        let mut policy = Self::base(table, name, PolicyOperation::Select);
        policy.using = Some(using.into());
        policy
    }

    pub fn insert(
        table: impl Into<String>,
        name: impl Into<String>,
        with_check: impl Into<String>,
    ) -> Self {
        let mut policy = Self::base(table, name, PolicyOperation::Insert);
        policy.with_check = Some(with_check.into());
        policy
    }

    pub fn update(
        table: impl Into<String>,
        name: impl Into<String>,
        using: impl Into<String>,
        with_check: impl Into<String>,
    ) -> Self {
        let mut policy = Self::base(table, name, PolicyOperation::Update);
        policy.using = Some(using.into());
        policy.with_check = Some(with_check.into());
        policy
    }

    pub fn delete(
        table: impl Into<String>,
        name: impl Into<String>,
        using: impl Into<String>,
    ) -> Self {
        let mut policy = Self::base(table, name, PolicyOperation::Delete);
        policy.using = Some(using.into());
        policy
    }

    pub fn for_roles(mut self, roles: Vec<String>) -> Self {
        self.roles = roles;
        self
    }

    /// Describe every way the predicates deviate from the operation shape.
    pub fn shape_violations(&self) -> Vec<String> {
        let mut violations = Vec::new();
        let op = self.operation;

        match (&self.using, op.takes_using()) {
            (Some(_), false) => violations.push(format!("{} policies must not have USING", op)),
            (None, true) => violations.push(format!("{} policies require USING", op)),
            _ => {}
        }
        match (&self.with_check, op.takes_with_check()) {
            (Some(_), false) => {
                violations.push(format!("{} policies must not have WITH CHECK", op))
            }
            (None, true) => violations.push(format!("{} policies require WITH CHECK", op)),
            _ => {}
        }

        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_are_well_shaped() {
        let policies = [
            AccessPolicy::select("notes", "read_own", "owner_id = auth.uid()"),
            AccessPolicy::insert("notes", "write_own", "owner_id = auth.uid()"),
            AccessPolicy::update(
                "notes",
                "edit_own",
                "owner_id = auth.uid()",
                "owner_id = auth.uid()",
            ),
            AccessPolicy::delete("notes", "drop_own", "owner_id = auth.uid()"),
        ];
        for policy in &policies {
            assert!(policy.shape_violations().is_empty(), "{:?}", policy);
        }
    }

    #[test]
    fn test_insert_with_using_is_violation() {
        let mut policy = AccessPolicy::insert("notes", "write_own", "true");
        policy.using = Some("true".to_string());
        let violations = policy.shape_violations();
        assert_eq!(violations, vec!["INSERT policies must not have USING".to_string()]);
    }

    #[test]
    fn test_update_missing_check_is_violation() {
        let mut policy = AccessPolicy::update("notes", "edit", "true", "true");
        policy.with_check = None;
        assert_eq!(policy.shape_violations().len(), 1);
    }
}
