use entity_service::Entity;
use serde::{Deserialize, Serialize};

/// A navigation entry in the administration UI.
///
/// Menus form a tree through `parent_id`; `None` marks a top-level entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Menu {
    pub id: u32,
    pub title: String,
    pub url: String,
    pub parent_id: Option<u32>,
    pub position: u32,
}

impl Entity for Menu {
    type Key = u32;
    const ENTITY_TYPE: &'static str = "Menu";

    fn key(&self) -> u32 {
        self.id
    }

    fn set_key(&mut self, key: u32) {
        self.id = key;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuModel {
    #[serde(default)]
    pub id: u32,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub parent_id: Option<u32>,
    #[serde(default)]
    pub position: u32,
}

impl MenuModel {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: 0,
            title: title.into(),
            url: url.into(),
            parent_id: None,
            position: 0,
        }
    }

    pub fn under(mut self, parent_id: u32, position: u32) -> Self {
        self.parent_id = Some(parent_id);
        self.position = position;
        self
    }
}
