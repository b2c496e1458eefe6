use chrono::NaiveDate;
use entity_service::Entity;
use serde::{Deserialize, Serialize};

/// A school expenditure as stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Expense {
    pub id: u32,
    pub title: String,
    pub amount_cents: i64,
    pub category: String,
    pub spent_on: NaiveDate,
}

impl Entity for Expense {
    type Key = u32;
    const ENTITY_TYPE: &'static str = "Expense";

    fn key(&self) -> u32 {
        self.id
    }

    fn set_key(&mut self, key: u32) {
        self.id = key;
    }
}

/// Request/response shape for [`Expense`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseModel {
    #[serde(default)]
    pub id: u32,
    pub title: String,
    pub amount: i64,
    #[serde(default)]
    pub category: Option<String>,
    pub spent_on: NaiveDate,
}

impl ExpenseModel {
    pub fn new(title: impl Into<String>, amount: i64, spent_on: NaiveDate) -> Self {
        Self {
            id: 0,
            title: title.into(),
            amount,
            category: None,
            spent_on,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}
