//! Demo: boots a [`SchoolSystem`] and walks each entity through its lifecycle.

use chrono::NaiveDate;
use entity_service::telemetry::setup_tracing;
use entity_service::ListQuery;
use school_admin::config::AppConfig;
use school_admin::lifecycle::SchoolSystem;
use school_admin::model::{ExpenseModel, FeeTypeModel, IncomeModel, MenuModel, SectionModel};
use std::error::Error;
use tracing::{error, info, Instrument};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    setup_tracing();

    let config = AppConfig::load()?;
    info!(?config, "Starting school administration demo");

    let system = SchoolSystem::new(config);
    let mut events = system.subscribe();

    let span = tracing::info_span!("fee_setup");
    let tuition = async {
        let tuition = system
            .fee_types
            .create(FeeTypeModel::new("Tuition", 150_000))
            .await?;
        system
            .fee_types
            .create(FeeTypeModel::new("Transport", 30_000))
            .await?;
        // second read is served from cache
        system.fee_types.get_by_id(tuition.id).await?;
        system.fee_types.get_by_id(tuition.id).await
    }
    .instrument(span)
    .await?;
    info!(id = tuition.id, name = %tuition.name, "Fee type ready");

    let span = tracing::info_span!("sections");
    async {
        let mut section = system
            .sections
            .create(SectionModel::new("A", "Grade 5", 30))
            .await?;
        section.capacity = 32;
        system.sections.update(section.id, section).await
    }
    .instrument(span)
    .await?;

    let day = NaiveDate::from_ymd_opt(2024, 9, 2).ok_or("invalid date")?;
    let span = tracing::info_span!("ledger");
    async {
        system
            .incomes
            .create(IncomeModel::new("Term 1 tuition", 4_500_000, day))
            .await?;
        let chalk = system
            .expenses
            .create(ExpenseModel::new("Chalk", 1_250, day).with_category("Supplies"))
            .await?;
        system.expenses.delete(chalk.id).await
    }
    .instrument(span)
    .await?;

    let fees = system.menus.create(MenuModel::new("Fees", "/fees")).await?;
    system
        .menus
        .create(MenuModel::new("Fee types", "/fees/types").under(fees.id, 0))
        .await?;

    let first_page = system.fee_types.get_all(Some(ListQuery::page(1, 10))).await?;
    info!(count = first_page.len(), "Listed fee types");

    match system.expenses.get_by_id(999).await {
        Ok(_) => error!("Unexpected expense 999"),
        Err(e) => info!(error = %e, "Missing expense reported"),
    }

    while let Ok(notification) = events.try_recv() {
        info!(event = %serde_json::to_string(&notification)?, "Received");
    }

    drop(events);
    system.shutdown().await?;

    info!("Demo completed successfully");
    Ok(())
}
