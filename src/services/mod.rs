//! Per-entity services.
//!
//! Every entity is served by the same [`EntityService`](entity_service::EntityService);
//! a module here only contributes the mapper, a type alias and a factory
//! that decides the entity's caching policy.
//!
//! | Entity | Cache | Logger |
//! |--------|-------|--------|
//! | [`Expense`](crate::model::Expense) | - | - |
//! | [`FeeType`](crate::model::FeeType) | moka | tracing |
//! | [`Income`](crate::model::Income) | - | - |
//! | [`Menu`](crate::model::Menu) | - | - |
//! | [`Section`](crate::model::Section) | moka | tracing |

pub mod expense;
pub mod fee_type;
pub mod income;
pub mod menu;
pub mod section;

pub use expense::{ExpenseMapper, ExpenseService};
pub use fee_type::{FeeTypeMapper, FeeTypeService};
pub use income::{IncomeMapper, IncomeService};
pub use menu::{MenuMapper, MenuService};
pub use section::{SectionMapper, SectionService};

use entity_service::MappingError;

/// Trims `value`, rejecting blank input.
fn required(field: &'static str, value: &str) -> Result<String, MappingError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(MappingError::invalid(field, "must not be empty"));
    }
    Ok(trimmed.to_string())
}

/// Trims `value`, mapping blank input to `None`.
fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn positive(field: &'static str, amount: i64) -> Result<i64, MappingError> {
    if amount <= 0 {
        return Err(MappingError::invalid(field, "must be greater than zero"));
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_trims_and_rejects_blank() {
        assert_eq!(required("name", "  Tuition ").unwrap(), "Tuition");
        assert!(required("name", "   ").is_err());
    }

    #[test]
    fn optional_drops_blank() {
        assert_eq!(optional(Some(" x ")), Some("x".to_string()));
        assert_eq!(optional(Some("  ")), None);
        assert_eq!(optional(None), None);
    }

    #[test]
    fn positive_rejects_zero() {
        assert!(positive("amount", 0).is_err());
        assert_eq!(positive("amount", 1).unwrap(), 1);
    }
}
