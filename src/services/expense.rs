use super::{optional, positive, required};
use crate::lifecycle::Infrastructure;
use crate::model::{Expense, ExpenseModel};
use entity_service::{EntityService, Mapper, MappingError, Repository, ServiceConfig};
use std::sync::Arc;

pub const DEFAULT_CATEGORY: &str = "General";

pub type ExpenseService = EntityService<ExpenseModel, Expense>;

pub struct ExpenseMapper;

impl Mapper<ExpenseModel, Expense> for ExpenseMapper {
    fn to_model(&self, entity: &Expense) -> Result<ExpenseModel, MappingError> {
        Ok(ExpenseModel {
            id: entity.id,
            title: entity.title.clone(),
            amount: entity.amount_cents,
            category: Some(entity.category.clone()),
            spent_on: entity.spent_on,
        })
    }

    fn to_entity(&self, model: &ExpenseModel) -> Result<Expense, MappingError> {
        let category = optional(model.category.as_deref())
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());
        Ok(Expense {
            id: model.id,
            title: required("title", &model.title)?,
            amount_cents: positive("amount", model.amount)?,
            category,
            spent_on: model.spent_on,
        })
    }
}

/// Creates the Expense service (uncached).
pub fn new(repository: Arc<dyn Repository<Expense>>, infra: &Infrastructure) -> ExpenseService {
    let config: ServiceConfig<ExpenseModel, Expense> = ServiceConfig::new(
        Arc::new(ExpenseMapper),
        repository,
        infra.unit_of_work.clone(),
        infra.dispatcher.clone(),
    );
    EntityService::new(config)
}
