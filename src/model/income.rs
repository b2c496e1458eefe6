use chrono::NaiveDate;
use entity_service::Entity;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
pub struct Income {
    pub id: u32,
    pub source: String,
    pub amount_cents: i64,
    pub received_on: NaiveDate,
    pub note: Option<String>,
}

impl Entity for Income {
    type Key = u32;
    const ENTITY_TYPE: &'static str = "Income";

    fn key(&self) -> u32 {
        self.id
    }

    fn set_key(&mut self, key: u32) {
        self.id = key;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeModel {
    #[serde(default)]
    pub id: u32,
    pub source: String,
    pub amount: i64,
    pub received_on: NaiveDate,
    #[serde(default)]
    pub note: Option<String>,
}

impl IncomeModel {
    pub fn new(source: impl Into<String>, amount: i64, received_on: NaiveDate) -> Self {
        Self {
            id: 0,
            source: source.into(),
            amount,
            received_on,
            note: None,
        }
    }
}
