use entity_service::mock::{
    FailingCache, FailingDispatcher, MockRepository, RecordingDispatcher, RecordingLogger,
    RejectingUnitOfWork, RepositoryCall,
};
use entity_service::{
    CacheProvider, Entity, EntityService, InMemoryUnitOfWork, ListQuery, Mapper, MappingError,
    MokaCacheProvider, NotificationDispatcher, Operation, RepositoryError, ServiceConfig,
    ServiceError,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::Level;

// --- Test Entity ---

#[derive(Clone, Debug, PartialEq)]
struct Course {
    id: u32,
    title: String,
}

impl Entity for Course {
    type Key = u32;
    const ENTITY_TYPE: &'static str = "Course";

    fn key(&self) -> u32 {
        self.id
    }

    fn set_key(&mut self, key: u32) {
        self.id = key;
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
struct CourseModel {
    id: u32,
    title: String,
}

impl CourseModel {
    fn new(title: &str) -> Self {
        Self {
            id: 0,
            title: title.to_string(),
        }
    }
}

struct CourseMapper;

impl Mapper<CourseModel, Course> for CourseMapper {
    fn to_model(&self, entity: &Course) -> Result<CourseModel, MappingError> {
        Ok(CourseModel {
            id: entity.id,
            title: entity.title.clone(),
        })
    }

    fn to_entity(&self, model: &CourseModel) -> Result<Course, MappingError> {
        if model.title.trim().is_empty() {
            return Err(MappingError::invalid("title", "must not be empty"));
        }
        Ok(Course {
            id: model.id,
            title: model.title.trim().to_string(),
        })
    }
}

/// Accepts only courses stored under odd keys.
struct OddKeyMapper;

impl Mapper<CourseModel, Course> for OddKeyMapper {
    fn to_model(&self, entity: &Course) -> Result<CourseModel, MappingError> {
        CourseMapper.to_model(entity)
    }

    fn to_entity(&self, model: &CourseModel) -> Result<Course, MappingError> {
        CourseMapper.to_entity(model)
    }

    fn validate(&self, entity: &Course) -> Result<(), MappingError> {
        if entity.id % 2 == 0 {
            return Err(MappingError::invalid("id", "must be odd"));
        }
        Ok(())
    }
}

// --- Harness ---

struct Harness {
    service: EntityService<CourseModel, Course>,
    repo: Arc<MockRepository<Course>>,
    dispatcher: RecordingDispatcher,
    cache: Option<Arc<MokaCacheProvider<u32, CourseModel>>>,
}

fn harness(cached: bool) -> Harness {
    harness_with(cached, MockRepository::new())
}

fn harness_with(cached: bool, repo: MockRepository<Course>) -> Harness {
    let repo = Arc::new(repo);
    let dispatcher = RecordingDispatcher::new();
    let mut config: ServiceConfig<CourseModel, Course> = ServiceConfig::new(
        Arc::new(CourseMapper),
        repo.clone(),
        Arc::new(InMemoryUnitOfWork::new()),
        Arc::new(dispatcher.clone()),
    );
    let cache = cached.then(|| Arc::new(MokaCacheProvider::<u32, CourseModel>::new(64, None)));
    if let Some(cache) = &cache {
        config = config.with_cache(cache.clone(), None);
    }
    Harness {
        service: EntityService::new(config),
        repo,
        dispatcher,
        cache,
    }
}

// --- Round trips ---

#[tokio::test]
async fn test_create_then_get_returns_equal_model() {
    for cached in [false, true] {
        let h = harness(cached);
        let created = h.service.create(CourseModel::new("Algebra")).await.unwrap();
        assert_eq!(created.id, 1);

        let fetched = h.service.get_by_id(created.id).await.unwrap();
        assert_eq!(fetched, created);
    }
}

#[tokio::test]
async fn test_get_all_preserves_insertion_order_and_pages() {
    let h = harness(true);
    for title in ["Algebra", "Biology", "Chemistry", "Drama"] {
        h.service.create(CourseModel::new(title)).await.unwrap();
    }

    let titles: Vec<String> = h
        .service
        .get_all(None)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.title)
        .collect();
    assert_eq!(titles, vec!["Algebra", "Biology", "Chemistry", "Drama"]);

    let page = h.service.get_all(Some(ListQuery::page(2, 3))).await.unwrap();
    assert_eq!(page, vec![CourseModel { id: 4, title: "Drama".into() }]);
    assert_eq!(h.service.count().await.unwrap(), 4);
}

// --- NotFound ---

#[tokio::test]
async fn test_absent_key_is_not_found_for_get_update_delete() {
    let h = harness(true);

    let get = h.service.get_by_id(42).await;
    assert!(matches!(get, Err(ServiceError::NotFound { entity_type: "Course", ref key }) if key == "42"));

    let update = h.service.update(42, CourseModel::new("Ghost")).await;
    assert!(matches!(update, Err(ServiceError::NotFound { .. })));

    let delete = h.service.delete(42).await;
    assert!(matches!(delete, Err(ServiceError::NotFound { .. })));

    assert!(h.dispatcher.notifications().is_empty());
    assert!(!h.service.exists(42).await.unwrap());
}

#[tokio::test]
async fn test_update_of_absent_key_is_not_found_even_with_invalid_model() {
    let h = harness(false);

    let update = h.service.update(42, CourseModel::new("  ")).await;

    assert!(matches!(update, Err(ServiceError::NotFound { ref key, .. }) if key == "42"));
    assert_eq!(h.repo.calls(RepositoryCall::Update), 0);
    assert!(h.dispatcher.notifications().is_empty());
}

#[tokio::test]
async fn test_invalid_model_for_stored_key_rolls_back_update() {
    let h = harness(true);
    let created = h.service.create(CourseModel::new("Music")).await.unwrap();

    let update = h.service.update(created.id, CourseModel::new("")).await;

    assert!(matches!(update, Err(ServiceError::Mapping(_))));
    assert_eq!(h.service.get_by_id(created.id).await.unwrap(), created);
    assert_eq!(h.dispatcher.count(Operation::Updated), 0);
}

#[tokio::test]
async fn test_second_delete_is_not_found() {
    let h = harness(false);
    let created = h.service.create(CourseModel::new("Art")).await.unwrap();

    h.service.delete(created.id).await.unwrap();
    let again = h.service.delete(created.id).await;

    assert!(matches!(again, Err(ServiceError::NotFound { .. })));
    assert_eq!(h.dispatcher.count(Operation::Deleted), 1);
}

// --- Notifications ---

#[tokio::test]
async fn test_each_write_publishes_exactly_one_matching_notification() {
    let h = harness(true);

    let created = h.service.create(CourseModel::new("Music")).await.unwrap();
    h.service
        .update(created.id, CourseModel::new("Music Theory"))
        .await
        .unwrap();
    h.service.delete(created.id).await.unwrap();

    let published = h.dispatcher.notifications();
    let summary: Vec<(Operation, String)> = published
        .iter()
        .map(|n| (n.operation, n.key.clone()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (Operation::Created, "1".to_string()),
            (Operation::Updated, "1".to_string()),
            (Operation::Deleted, "1".to_string()),
        ]
    );
    assert!(published.iter().all(|n| n.entity_type == "Course"));
    assert_eq!(published[1].payload.as_ref().unwrap()["title"], "Music Theory");
    assert!(published[2].payload.is_none());
}

// --- Caching ---

#[tokio::test]
async fn test_cached_read_skips_repository() {
    let h = harness(true);
    let created = h.service.create(CourseModel::new("Tuition")).await.unwrap();
    assert_eq!(created.id, 1);
    h.repo.reset_calls();

    let fetched = h.service.get_by_id(1).await.unwrap();
    let again = h.service.get_by_id(1).await.unwrap();

    assert_eq!(fetched, created);
    assert_eq!(again, created);
    assert_eq!(h.repo.calls(RepositoryCall::Find), 0);
}

#[tokio::test]
async fn test_uncached_reads_always_hit_repository() {
    let h = harness(false);
    for _ in 0..5 {
        h.service.create(CourseModel::new("Filler")).await.unwrap();
    }
    h.repo.reset_calls();

    h.service.get_by_id(5).await.unwrap();
    h.service.get_by_id(5).await.unwrap();

    assert_eq!(h.repo.calls(RepositoryCall::Find), 2);
}

#[tokio::test]
async fn test_update_invalidates_cached_value() {
    let h = harness(true);
    let created = h.service.create(CourseModel::new("Physics")).await.unwrap();
    h.service.get_by_id(created.id).await.unwrap();

    h.service
        .update(created.id, CourseModel::new("Applied Physics"))
        .await
        .unwrap();

    let fetched = h.service.get_by_id(created.id).await.unwrap();
    assert_eq!(fetched.title, "Applied Physics");
}

#[tokio::test]
async fn test_delete_invalidates_cached_value() {
    let h = harness(true);
    let created = h.service.create(CourseModel::new("Latin")).await.unwrap();
    h.service.get_by_id(created.id).await.unwrap();

    h.service.delete(created.id).await.unwrap();

    assert!(h.service.get_by_id(created.id).await.unwrap_err().is_not_found());
}

// --- Failures ---

#[tokio::test]
async fn test_persistence_error_mid_update_rolls_back_without_side_effects() {
    let mut repo = MockRepository::new();
    repo.expect_failure(RepositoryCall::Update)
        .return_err(RepositoryError::ConstraintViolation("duplicate title".into()));
    let h = harness_with(true, repo);

    let created = h.service.create(CourseModel::new("History")).await.unwrap();
    h.service.get_by_id(created.id).await.unwrap();
    let cache = h.cache.as_ref().unwrap();
    let before = h.dispatcher.notifications().len();

    let result = h
        .service
        .update(created.id, CourseModel::new("World History"))
        .await;

    assert!(matches!(
        result,
        Err(ServiceError::Persistence(RepositoryError::ConstraintViolation(_)))
    ));
    // cache still holds the committed value
    let cached = cache.get(&created.id).await.unwrap().unwrap();
    assert_eq!(cached.title, "History");
    assert_eq!(h.dispatcher.notifications().len(), before);
    h.repo.verify();
}

#[tokio::test]
async fn test_persistence_error_on_insert_leaves_storage_empty() {
    let mut repo = MockRepository::new();
    repo.expect_failure(RepositoryCall::Insert)
        .return_err(RepositoryError::Connection("database offline".into()));
    let h = harness_with(false, repo);

    let result = h.service.create(CourseModel::new("Geography")).await;

    assert!(matches!(result, Err(ServiceError::Persistence(_))));
    assert_eq!(h.service.count().await.unwrap(), 0);
    assert!(h.dispatcher.notifications().is_empty());
}

#[tokio::test]
async fn test_mapping_error_surfaces_before_any_write() {
    let h = harness(false);

    let result = h.service.create(CourseModel::new("   ")).await;

    assert!(matches!(
        result,
        Err(ServiceError::Mapping(MappingError::InvalidField { field: "title", .. }))
    ));
    assert_eq!(h.repo.calls(RepositoryCall::Insert), 0);
    assert!(h.dispatcher.notifications().is_empty());
}

#[tokio::test]
async fn test_cache_failures_are_logged_and_swallowed() {
    let cache = Arc::new(FailingCache::new());
    let logger = Arc::new(RecordingLogger::new());
    let dispatcher = RecordingDispatcher::new();
    let config: ServiceConfig<CourseModel, Course> = ServiceConfig::new(
        Arc::new(CourseMapper),
        Arc::new(MockRepository::<Course>::new()),
        Arc::new(InMemoryUnitOfWork::new()),
        Arc::new(dispatcher.clone()),
    )
    .with_cache(cache.clone(), None)
    .with_logger(logger.clone());
    let service = EntityService::new(config);

    let created = service.create(CourseModel::new("Ethics")).await.unwrap();
    let fetched = service.get_by_id(created.id).await.unwrap();

    assert_eq!(fetched, created);
    assert_eq!(dispatcher.count(Operation::Created), 1);
    // invalidate + set on create, then get + set on read
    assert_eq!(cache.attempts(), 4);
    assert_eq!(logger.messages_at(Level::WARN).len(), 4);
}

#[tokio::test]
async fn test_dispatch_failures_do_not_fail_the_write() {
    let dispatcher = Arc::new(FailingDispatcher::new());
    let logger = Arc::new(RecordingLogger::new());
    let config: ServiceConfig<CourseModel, Course> = ServiceConfig::new(
        Arc::new(CourseMapper),
        Arc::new(MockRepository::<Course>::new()),
        Arc::new(InMemoryUnitOfWork::new()),
        dispatcher.clone() as Arc<dyn NotificationDispatcher>,
    )
    .with_logger(logger.clone());
    let service = EntityService::new(config);

    let created = service.create(CourseModel::new("Logic")).await.unwrap();
    service.delete(created.id).await.unwrap();

    assert_eq!(dispatcher.attempts(), 2);
    let warnings = logger.messages_at(Level::WARN);
    assert_eq!(warnings.len(), 2);
    assert!(warnings[0].contains("not delivered"));
}

#[tokio::test]
async fn test_service_without_logger_is_silent_but_equivalent() {
    let h = harness(false);
    let created = h.service.create(CourseModel::new("Silent")).await.unwrap();
    assert_eq!(h.service.get_by_id(created.id).await.unwrap(), created);
    assert!(!h.service.is_cached());
}

// --- Concurrency ---

#[tokio::test]
async fn test_concurrent_creates_get_distinct_keys() {
    let h = harness(true);
    let mut handles = vec![];
    for i in 0..20 {
        let service = h.service.clone();
        handles.push(tokio::spawn(async move {
            service.create(CourseModel::new(&format!("Course {i}"))).await
        }));
    }

    let mut keys = vec![];
    for handle in handles {
        keys.push(handle.await.unwrap().unwrap().id);
    }
    keys.sort_unstable();
    keys.dedup();

    assert_eq!(keys.len(), 20);
    assert_eq!(h.dispatcher.count(Operation::Created), 20);
}

// --- Keyed validation & commit ---

#[tokio::test]
async fn test_keyed_validation_sees_the_final_key() {
    let repo = Arc::new(MockRepository::<Course>::new());
    let dispatcher = RecordingDispatcher::new();
    let config: ServiceConfig<CourseModel, Course> = ServiceConfig::new(
        Arc::new(OddKeyMapper),
        repo.clone(),
        Arc::new(InMemoryUnitOfWork::new()),
        Arc::new(dispatcher.clone()),
    );
    let service = EntityService::new(config);

    let first = service.create(CourseModel::new("Drama")).await.unwrap();
    assert_eq!(first.id, 1);

    // key 2 is generated, rejected and rolled back
    let second = service.create(CourseModel::new("Dance")).await;
    assert!(matches!(
        second,
        Err(ServiceError::Mapping(MappingError::InvalidField { field: "id", .. }))
    ));
    assert_eq!(service.count().await.unwrap(), 1);

    let third = service.create(CourseModel::new("Choir")).await.unwrap();
    assert_eq!(third.id, 3);

    // the model's own id is ignored in favour of the key argument
    let mut renamed = CourseModel::new("Drama II");
    renamed.id = 2;
    assert_eq!(service.update(1, renamed).await.unwrap().id, 1);

    assert_eq!(dispatcher.count(Operation::Created), 2);
    assert_eq!(dispatcher.count(Operation::Updated), 1);
}

#[tokio::test]
async fn test_commit_failure_is_logged_and_leaves_no_trace() {
    let repo = Arc::new(MockRepository::<Course>::new());
    let unit_of_work = Arc::new(RejectingUnitOfWork::new());
    let cache = Arc::new(MokaCacheProvider::<u32, CourseModel>::new(16, None));
    let logger = Arc::new(RecordingLogger::new());
    let dispatcher = RecordingDispatcher::new();
    let config: ServiceConfig<CourseModel, Course> = ServiceConfig::new(
        Arc::new(CourseMapper),
        repo.clone(),
        unit_of_work.clone(),
        Arc::new(dispatcher.clone()),
    )
    .with_cache(cache.clone(), None)
    .with_logger(logger.clone());
    let service = EntityService::new(config);

    let result = service.create(CourseModel::new("Poetry")).await;

    assert!(matches!(
        result,
        Err(ServiceError::Persistence(RepositoryError::Transaction(_)))
    ));
    assert_eq!(unit_of_work.commits(), 1);
    assert_eq!(service.count().await.unwrap(), 0);
    assert!(cache.get(&1).await.unwrap().is_none());
    assert!(dispatcher.notifications().is_empty());

    let warnings = logger.messages_at(Level::WARN);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("commit failed"));
}
