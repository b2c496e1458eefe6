use super::Infrastructure;
use crate::config::AppConfig;
use crate::model::{Expense, FeeType, Income, Menu, Section};
use crate::services::{
    self, ExpenseService, FeeTypeService, IncomeService, MenuService, SectionService,
};
use entity_service::{
    BroadcastDispatcher, ChangeNotification, InMemoryRepository, InMemoryUnitOfWork, Repository,
};
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

#[derive(Debug, thiserror::Error)]
pub enum SystemError {
    #[error("Background task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}

/// Storage for each entity type.
pub struct Repositories {
    pub expenses: Arc<dyn Repository<Expense>>,
    pub fee_types: Arc<dyn Repository<FeeType>>,
    pub incomes: Arc<dyn Repository<Income>>,
    pub menus: Arc<dyn Repository<Menu>>,
    pub sections: Arc<dyn Repository<Section>>,
}

impl Repositories {
    pub fn in_memory() -> Self {
        Self {
            expenses: Arc::new(InMemoryRepository::new()),
            fee_types: Arc::new(InMemoryRepository::new()),
            incomes: Arc::new(InMemoryRepository::new()),
            menus: Arc::new(InMemoryRepository::new()),
            sections: Arc::new(InMemoryRepository::new()),
        }
    }
}

/// Runtime wiring of the school administration services.
///
/// `SchoolSystem` owns:
/// - **Services**: one [`EntityService`](entity_service::EntityService) per entity
/// - **Dispatcher**: the broadcast channel every committed write is published on
/// - **Audit task**: a subscriber that logs each notification
///
/// All services share one unit of work, so writes across entity types are
/// serialized.
///
/// # Example
///
/// ```ignore
/// let system = SchoolSystem::new(AppConfig::default());
/// let tuition = system.fee_types.create(FeeTypeModel::new("Tuition", 150_000)).await?;
/// system.shutdown().await?;
/// ```
pub struct SchoolSystem {
    pub expenses: ExpenseService,
    pub fee_types: FeeTypeService,
    pub incomes: IncomeService,
    pub menus: MenuService,
    pub sections: SectionService,

    dispatcher: BroadcastDispatcher,
    handles: Vec<JoinHandle<()>>,
}

impl SchoolSystem {
    /// Starts a system backed by in-memory storage. Requires a Tokio runtime.
    pub fn new(config: AppConfig) -> Self {
        Self::with_repositories(config, Repositories::in_memory())
    }

    pub fn with_repositories(config: AppConfig, repositories: Repositories) -> Self {
        let dispatcher = BroadcastDispatcher::new(config.notifications.capacity);
        let audit = tokio::spawn(log_notifications(dispatcher.subscribe()));

        let infra = Infrastructure::new(
            Arc::new(InMemoryUnitOfWork::new()),
            Arc::new(dispatcher.clone()),
            config,
        );

        info!(
            cache_capacity = infra.config.cache.capacity,
            cache_ttl_secs = infra.config.cache.ttl_secs,
            "School system started"
        );

        Self {
            expenses: services::expense::new(repositories.expenses, &infra),
            fee_types: services::fee_type::new(repositories.fee_types, &infra),
            incomes: services::income::new(repositories.incomes, &infra),
            menus: services::menu::new(repositories.menus, &infra),
            sections: services::section::new(repositories.sections, &infra),
            dispatcher,
            handles: vec![audit],
        }
    }

    /// A receiver for every notification published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeNotification> {
        self.dispatcher.subscribe()
    }

    /// Gracefully shuts down the system.
    ///
    /// Dropping the services and the dispatcher closes the notification
    /// channel; the audit task drains what is buffered and exits. Clones of
    /// the services keep the channel open, so drop them first.
    pub async fn shutdown(self) -> Result<(), SystemError> {
        info!("Shutting down school system...");

        drop(self.expenses);
        drop(self.fee_types);
        drop(self.incomes);
        drop(self.menus);
        drop(self.sections);
        drop(self.dispatcher);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Background task failed: {:?}", e);
                return Err(e.into());
            }
        }

        info!("School system shutdown complete.");
        Ok(())
    }
}

async fn log_notifications(mut events: broadcast::Receiver<ChangeNotification>) {
    loop {
        match events.recv().await {
            Ok(n) => info!(
                entity_type = %n.entity_type,
                operation = %n.operation,
                key = %n.key,
                "Change published"
            ),
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "Notification audit fell behind");
            }
            Err(RecvError::Closed) => break,
        }
    }
    info!("Notification audit stopped");
}
