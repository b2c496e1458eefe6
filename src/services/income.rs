use super::{optional, positive, required};
use crate::lifecycle::Infrastructure;
use crate::model::{Income, IncomeModel};
use entity_service::{EntityService, Mapper, MappingError, Repository, ServiceConfig};
use std::sync::Arc;

pub type IncomeService = EntityService<IncomeModel, Income>;

pub struct IncomeMapper;

impl Mapper<IncomeModel, Income> for IncomeMapper {
    fn to_model(&self, entity: &Income) -> Result<IncomeModel, MappingError> {
        Ok(IncomeModel {
            id: entity.id,
            source: entity.source.clone(),
            amount: entity.amount_cents,
            received_on: entity.received_on,
            note: entity.note.clone(),
        })
    }

    fn to_entity(&self, model: &IncomeModel) -> Result<Income, MappingError> {
        Ok(Income {
            id: model.id,
            source: required("source", &model.source)?,
            amount_cents: positive("amount", model.amount)?,
            received_on: model.received_on,
            note: optional(model.note.as_deref()),
        })
    }
}

/// Creates the Income service (uncached).
pub fn new(repository: Arc<dyn Repository<Income>>, infra: &Infrastructure) -> IncomeService {
    let config: ServiceConfig<IncomeModel, Income> = ServiceConfig::new(
        Arc::new(IncomeMapper),
        repository,
        infra.unit_of_work.clone(),
        infra.dispatcher.clone(),
    );
    EntityService::new(config)
}
