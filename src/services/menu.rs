use super::required;
use crate::lifecycle::Infrastructure;
use crate::model::{Menu, MenuModel};
use entity_service::{EntityService, Mapper, MappingError, Repository, ServiceConfig};
use std::sync::Arc;

pub type MenuService = EntityService<MenuModel, Menu>;

pub struct MenuMapper;

impl Mapper<MenuModel, Menu> for MenuMapper {
    fn to_model(&self, entity: &Menu) -> Result<MenuModel, MappingError> {
        Ok(MenuModel {
            id: entity.id,
            title: entity.title.clone(),
            url: entity.url.clone(),
            parent_id: entity.parent_id,
            position: entity.position,
        })
    }

    fn to_entity(&self, model: &MenuModel) -> Result<Menu, MappingError> {
        let url = required("url", &model.url)?;
        if !(url.starts_with('/') || url.starts_with("http://") || url.starts_with("https://")) {
            return Err(MappingError::invalid(
                "url",
                "must be a path or an http(s) address",
            ));
        }
        // 0 is never assigned as a key
        if model.parent_id == Some(0) {
            return Err(MappingError::invalid("parent_id", "must reference a stored menu"));
        }
        Ok(Menu {
            id: model.id,
            title: required("title", &model.title)?,
            url,
            parent_id: model.parent_id,
            position: model.position,
        })
    }

    fn validate(&self, entity: &Menu) -> Result<(), MappingError> {
        if entity.parent_id == Some(entity.id) {
            return Err(MappingError::invalid("parent_id", "a menu cannot be its own parent"));
        }
        Ok(())
    }
}

/// Creates the Menu service (uncached).
pub fn new(repository: Arc<dyn Repository<Menu>>, infra: &Infrastructure) -> MenuService {
    let config: ServiceConfig<MenuModel, Menu> = ServiceConfig::new(
        Arc::new(MenuMapper),
        repository,
        infra.unit_of_work.clone(),
        infra.dispatcher.clone(),
    );
    EntityService::new(config)
}
