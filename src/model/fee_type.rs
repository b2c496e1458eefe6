use entity_service::Entity;
use serde::{Deserialize, Serialize};

/// A kind of fee charged to students (tuition, transport, lab).
///
/// Fee types are read far more often than they change, so their service is
/// cached.
#[derive(Debug, Clone, PartialEq)]
pub struct FeeType {
    pub id: u32,
    pub name: String,
    pub description: Option<String>,
    pub amount_cents: i64,
}

impl Entity for FeeType {
    type Key = u32;
    const ENTITY_TYPE: &'static str = "FeeType";

    fn key(&self) -> u32 {
        self.id
    }

    fn set_key(&mut self, key: u32) {
        self.id = key;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeTypeModel {
    #[serde(default)]
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub amount: i64,
}

impl FeeTypeModel {
    pub fn new(name: impl Into<String>, amount: i64) -> Self {
        Self {
            id: 0,
            name: name.into(),
            description: None,
            amount,
        }
    }
}
