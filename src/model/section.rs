use entity_service::Entity;
use serde::{Deserialize, Serialize};

/// A teaching group within a class (e.g. "Grade 5 / B").
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub id: u32,
    pub name: String,
    pub class_name: String,
    pub capacity: u32,
}

impl Entity for Section {
    type Key = u32;
    const ENTITY_TYPE: &'static str = "Section";

    fn key(&self) -> u32 {
        self.id
    }

    fn set_key(&mut self, key: u32) {
        self.id = key;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionModel {
    #[serde(default)]
    pub id: u32,
    pub name: String,
    pub class_name: String,
    pub capacity: u32,
}

impl SectionModel {
    pub fn new(name: impl Into<String>, class_name: impl Into<String>, capacity: u32) -> Self {
        Self {
            id: 0,
            name: name.into(),
            class_name: class_name.into(),
            capacity,
        }
    }
}
