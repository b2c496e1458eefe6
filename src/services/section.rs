use super::required;
use crate::lifecycle::Infrastructure;
use crate::model::{Section, SectionModel};
use entity_service::{
    EntityService, Mapper, MappingError, Repository, ServiceConfig, TracingLogger,
};
use std::sync::Arc;

pub type SectionService = EntityService<SectionModel, Section>;

pub struct SectionMapper;

impl Mapper<SectionModel, Section> for SectionMapper {
    fn to_model(&self, entity: &Section) -> Result<SectionModel, MappingError> {
        Ok(SectionModel {
            id: entity.id,
            name: entity.name.clone(),
            class_name: entity.class_name.clone(),
            capacity: entity.capacity,
        })
    }

    fn to_entity(&self, model: &SectionModel) -> Result<Section, MappingError> {
        if model.capacity == 0 {
            return Err(MappingError::invalid("capacity", "must be at least 1"));
        }
        Ok(Section {
            id: model.id,
            name: required("name", &model.name)?,
            class_name: required("class_name", &model.class_name)?,
            capacity: model.capacity,
        })
    }
}

/// Creates the Section service. Sections are cached and logged.
pub fn new(repository: Arc<dyn Repository<Section>>, infra: &Infrastructure) -> SectionService {
    let config: ServiceConfig<SectionModel, Section> = ServiceConfig::new(
        Arc::new(SectionMapper),
        repository,
        infra.unit_of_work.clone(),
        infra.dispatcher.clone(),
    )
    .with_cache(infra.model_cache(), infra.cache_ttl())
    .with_logger(Arc::new(TracingLogger));
    EntityService::new(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_names() {
        let entity = SectionMapper
            .to_entity(&SectionModel::new(" B ", " Grade 5 ", 30))
            .unwrap();
        assert_eq!(entity.name, "B");
        assert_eq!(entity.class_name, "Grade 5");
        assert_eq!(SectionMapper.to_model(&entity).unwrap().capacity, 30);
    }

    #[test]
    fn rejects_empty_section() {
        let err = SectionMapper
            .to_entity(&SectionModel::new("A", "Grade 1", 0))
            .unwrap_err();
        assert_eq!(err, MappingError::invalid("capacity", "must be at least 1"));
        assert!(SectionMapper.to_entity(&SectionModel::new("A", "", 20)).is_err());
    }
}
