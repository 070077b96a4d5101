//! Stored procedures and functions exposed by the master-data schema

use crate::core::{ParamType, Procedure, ProcedureError};
use std::collections::HashSet;

use ParamType::{Int, Text};

/// `insert_master_product(category_id, product_name, status)`
pub static INSERT_MASTER_PRODUCT: Procedure =
    Procedure::call("insert_master_product", &[Int, Text, Int]);

/// `update_master_product(product_id, category_id, product_name, status)`
pub static UPDATE_MASTER_PRODUCT: Procedure =
    Procedure::call("update_master_product", &[Int, Int, Text, Int]);

/// `delete_master_product(product_id)`
pub static DELETE_MASTER_PRODUCT: Procedure = Procedure::call("delete_master_product", &[Int]);

/// `insert_master_violation(violation_name, level_of_serious, status)`
pub static INSERT_MASTER_VIOLATION: Procedure =
    Procedure::call("insert_master_violation", &[Text, Text, Int]);

/// `update_master_violation(id, violation_name, level_of_serious, status)`
pub static UPDATE_MASTER_VIOLATION: Procedure =
    Procedure::call("update_master_violation", &[Int, Text, Text, Int]);

/// `delete_master_violation(id)`
pub static DELETE_MASTER_VIOLATION: Procedure =
    Procedure::call("delete_master_violation", &[Int]);

/// Rows of `(id, violation_name, level_of_serious, status)`
pub static GET_MASTER_VIOLATIONS: Procedure =
    Procedure::select_from("get_master_violations", &[]);

/// Rows of `(order_id, order_status)`
pub static GET_ORDER_STATUSES: Procedure = Procedure::select_from("sp_get_order_status", &[]);

/// Every descriptor the API may invoke
pub static ALL: [&Procedure; 8] = [
    &INSERT_MASTER_PRODUCT,
    &UPDATE_MASTER_PRODUCT,
    &DELETE_MASTER_PRODUCT,
    &INSERT_MASTER_VIOLATION,
    &UPDATE_MASTER_VIOLATION,
    &DELETE_MASTER_VIOLATION,
    &GET_MASTER_VIOLATIONS,
    &GET_ORDER_STATUSES,
];

/// Check that every routine name is a bare identifier and declared once
pub fn verify() -> Result<(), ProcedureError> {
    let mut seen = HashSet::new();

    for procedure in ALL {
        procedure.verify_name()?;
        if !seen.insert(procedure.name()) {
            return Err(ProcedureError::Duplicate {
                name: procedure.name(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CallStyle;

    #[test]
    fn test_catalog_is_valid() {
        assert!(verify().is_ok());
    }

    #[test]
    fn test_rendered_statements() {
        assert_eq!(
            INSERT_MASTER_PRODUCT.sql(),
            "CALL insert_master_product($1, $2, $3)"
        );
        assert_eq!(
            UPDATE_MASTER_VIOLATION.sql(),
            "CALL update_master_violation($1, $2, $3, $4)"
        );
        assert_eq!(DELETE_MASTER_PRODUCT.sql(), "CALL delete_master_product($1)");
        assert_eq!(
            GET_MASTER_VIOLATIONS.sql(),
            "SELECT * FROM get_master_violations()"
        );
        assert_eq!(GET_ORDER_STATUSES.sql(), "SELECT * FROM sp_get_order_status()");
    }

    #[test]
    fn test_list_routines_are_select_style() {
        let selects: Vec<_> = ALL
            .iter()
            .filter(|p| p.style() == CallStyle::SelectFrom)
            .map(|p| p.name())
            .collect();
        assert_eq!(selects, vec!["get_master_violations", "sp_get_order_status"]);
    }
}
