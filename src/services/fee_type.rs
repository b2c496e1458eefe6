use super::{optional, required};
use crate::lifecycle::Infrastructure;
use crate::model::{FeeType, FeeTypeModel};
use entity_service::{
    EntityService, Mapper, MappingError, Repository, ServiceConfig, TracingLogger,
};
use std::sync::Arc;

pub type FeeTypeService = EntityService<FeeTypeModel, FeeType>;

pub struct FeeTypeMapper;

impl Mapper<FeeTypeModel, FeeType> for FeeTypeMapper {
    fn to_model(&self, entity: &FeeType) -> Result<FeeTypeModel, MappingError> {
        Ok(FeeTypeModel {
            id: entity.id,
            name: entity.name.clone(),
            description: entity.description.clone(),
            amount: entity.amount_cents,
        })
    }

    fn to_entity(&self, model: &FeeTypeModel) -> Result<FeeType, MappingError> {
        if model.amount < 0 {
            return Err(MappingError::invalid("amount", "must not be negative"));
        }
        Ok(FeeType {
            id: model.id,
            name: required("name", &model.name)?,
            description: optional(model.description.as_deref()),
            amount_cents: model.amount,
        })
    }
}

/// Creates the FeeType service. Fee types are cached and logged.
pub fn new(repository: Arc<dyn Repository<FeeType>>, infra: &Infrastructure) -> FeeTypeService {
    let config: ServiceConfig<FeeTypeModel, FeeType> = ServiceConfig::new(
        Arc::new(FeeTypeMapper),
        repository,
        infra.unit_of_work.clone(),
        infra.dispatcher.clone(),
    )
    .with_cache(infra.model_cache(), infra.cache_ttl())
    .with_logger(Arc::new(TracingLogger));
    EntityService::new(config)
}
