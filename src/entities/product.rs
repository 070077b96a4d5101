//! Product catalog records

use crate::catalog;
use crate::core::{Procedure, ProcedureArgs, SqlParam};
use crate::params;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Payload of `POST /product`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct NewProduct {
    #[validate(range(min = 1, message = "category_id must be a positive integer"))]
    pub category_id: i32,

    #[validate(length(
        min = 1,
        max = 100,
        message = "product_name must be between 1 and 100 characters"
    ))]
    pub product_name: String,

    pub status: i32,
}

impl ProcedureArgs for NewProduct {
    const PROCEDURE: &'static Procedure = &catalog::INSERT_MASTER_PRODUCT;

    fn args(&self) -> Vec<SqlParam> {
        params![self.category_id, &self.product_name, self.status]
    }
}

/// Payload of `PUT /product`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ProductUpdate {
    #[validate(range(min = 1, message = "product_id must be a positive integer"))]
    pub product_id: i32,

    #[validate(range(min = 1, message = "category_id must be a positive integer"))]
    pub category_id: i32,

    #[validate(length(
        min = 1,
        max = 100,
        message = "product_name must be between 1 and 100 characters"
    ))]
    pub product_name: String,

    pub status: i32,
}

impl ProcedureArgs for ProductUpdate {
    const PROCEDURE: &'static Procedure = &catalog::UPDATE_MASTER_PRODUCT;

    fn args(&self) -> Vec<SqlParam> {
        params![
            self.product_id,
            self.category_id,
            &self.product_name,
            self.status
        ]
    }
}

/// Path parameter of `DELETE /product/{id}`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductId(pub i32);

impl ProcedureArgs for ProductId {
    const PROCEDURE: &'static Procedure = &catalog::DELETE_MASTER_PRODUCT;

    fn args(&self) -> Vec<SqlParam> {
        params![self.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> NewProduct {
        NewProduct {
            category_id: 2,
            product_name: "Basmati Rice".to_string(),
            status: 1,
        }
    }

    #[test]
    fn test_valid_product_passes() {
        assert!(product().validate().is_ok());
    }

    #[test]
    fn test_category_must_be_positive() {
        let p = NewProduct {
            category_id: 0,
            ..product()
        };
        let errors = p.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("category_id"));
    }

    #[test]
    fn test_name_length_bounds() {
        let empty = NewProduct {
            product_name: String::new(),
            ..product()
        };
        assert!(empty.validate().is_err());

        let exactly_100 = NewProduct {
            product_name: "a".repeat(100),
            ..product()
        };
        assert!(exactly_100.validate().is_ok());

        let too_long = NewProduct {
            product_name: "a".repeat(101),
            ..product()
        };
        assert!(too_long.validate().is_err());
    }

    #[test]
    fn test_status_zero_is_accepted() {
        let p = NewProduct {
            status: 0,
            ..product()
        };
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_missing_status_fails_to_deserialize() {
        let result: Result<NewProduct, _> =
            serde_json::from_str(r#"{"category_id": 1, "product_name": "Rice"}"#);
        assert!(result.unwrap_err().to_string().contains("status"));
    }

    #[test]
    fn test_update_binds_in_declared_order() {
        let update = ProductUpdate {
            product_id: 9,
            category_id: 2,
            product_name: "Rice".to_string(),
            status: 0,
        };
        let call = update.bind().unwrap();
        assert_eq!(call.sql(), "CALL update_master_product($1, $2, $3, $4)");
        assert_eq!(call.args(), params![9, 2, "Rice", 0].as_slice());
    }

    #[test]
    fn test_delete_binds_id() {
        let call = ProductId(4).bind().unwrap();
        assert_eq!(call.sql(), "CALL delete_master_product($1)");
        assert_eq!(call.args(), &[SqlParam::Int(4)]);
    }
}
