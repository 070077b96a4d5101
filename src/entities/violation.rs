//! Violation catalog records

use crate::catalog;
use crate::core::{Procedure, ProcedureArgs, SqlParam};
use crate::params;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Payload of `POST /violation`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct NewViolation {
    #[validate(length(
        min = 1,
        max = 100,
        message = "violation_name must be between 1 and 100 characters"
    ))]
    pub violation_name: String,

    #[validate(length(
        min = 1,
        max = 50,
        message = "level_of_serious must be between 1 and 50 characters"
    ))]
    pub level_of_serious: String,

    pub status: i32,
}

impl ProcedureArgs for NewViolation {
    const PROCEDURE: &'static Procedure = &catalog::INSERT_MASTER_VIOLATION;

    fn args(&self) -> Vec<SqlParam> {
        params![&self.violation_name, &self.level_of_serious, self.status]
    }
}

/// Payload of `PUT /violation`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ViolationUpdate {
    #[validate(range(min = 1, message = "id must be a positive integer"))]
    pub id: i32,

    #[validate(length(
        min = 1,
        max = 100,
        message = "violation_name must be between 1 and 100 characters"
    ))]
    pub violation_name: String,

    #[validate(length(
        min = 1,
        max = 50,
        message = "level_of_serious must be between 1 and 50 characters"
    ))]
    pub level_of_serious: String,

    pub status: i32,
}

impl ProcedureArgs for ViolationUpdate {
    const PROCEDURE: &'static Procedure = &catalog::UPDATE_MASTER_VIOLATION;

    fn args(&self) -> Vec<SqlParam> {
        params![
            self.id,
            &self.violation_name,
            &self.level_of_serious,
            self.status
        ]
    }
}

/// Path parameter of `DELETE /violation/{id}`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViolationId(pub i32);

impl ProcedureArgs for ViolationId {
    const PROCEDURE: &'static Procedure = &catalog::DELETE_MASTER_VIOLATION;

    fn args(&self) -> Vec<SqlParam> {
        params![self.0]
    }
}

/// Row of `get_master_violations()`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub id: i32,
    pub violation_name: String,
    pub level_of_serious: String,
    pub status: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_binds_in_declared_order() {
        let v = NewViolation {
            violation_name: "Violation A".to_string(),
            level_of_serious: "High".to_string(),
            status: 1,
        };
        let call = v.bind().unwrap();
        assert_eq!(call.sql(), "CALL insert_master_violation($1, $2, $3)");
        assert_eq!(call.args(), params!["Violation A", "High", 1].as_slice());
    }

    #[test]
    fn test_update_requires_positive_id() {
        let v = ViolationUpdate {
            id: 0,
            violation_name: "Late delivery".to_string(),
            level_of_serious: "Low".to_string(),
            status: 1,
        };
        let errors = v.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("id"));
    }

    #[test]
    fn test_blank_level_is_rejected() {
        let v = NewViolation {
            violation_name: "Late delivery".to_string(),
            level_of_serious: String::new(),
            status: 1,
        };
        assert!(v.validate().is_err());
    }

    #[test]
    fn test_violation_row_serializes_numbers() {
        let row = Violation {
            id: 2,
            violation_name: "Violation B".to_string(),
            level_of_serious: "Medium".to_string(),
            status: 0,
        };
        let json = serde_json::to_value(&row).unwrap();
        assert!(json["id"].is_number());
        assert!(json["status"].is_number());
    }
}
