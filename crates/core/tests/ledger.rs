use std::sync::Arc;

use visit_ledger_core::app::ledger::{LedgerError, VisitLedger};
use visit_ledger_core::domain::model::LedgerPolicy;
use visit_ledger_core::domain::visit_state::{RegisterOutcome, VisitCounters};
use visit_ledger_core::infra::memory_store::MemoryStore;
use visit_ledger_core::infra::sqlite_store::SqliteStore;
use visit_ledger_core::ports::store::{StoreError, VisitStore};

const PHONE: &str = "612345678";

fn memory_ledger(policy: LedgerPolicy) -> VisitLedger {
    VisitLedger::new(Arc::new(MemoryStore::new()), policy)
}

async fn sqlite_ledger() -> VisitLedger {
    let store = SqliteStore::in_memory().await.unwrap();
    store.migrate().await.unwrap();
    VisitLedger::new(Arc::new(store), LedgerPolicy::default())
}

async fn register_n(ledger: &VisitLedger, n: usize) -> RegisterOutcome {
    let mut last = None;
    for _ in 0..n {
        last = Some(ledger.register_visit(PHONE, None).await.unwrap());
    }
    last.unwrap()
}

#[tokio::test]
async fn first_registration_creates_record() {
    let ledger = memory_ledger(LedgerPolicy::default());
    let outcome = ledger.register_visit(PHONE, Some("Ana")).await.unwrap();
    assert!(matches!(outcome, RegisterOutcome::FirstVisit { .. }));

    let record = ledger.find(PHONE).await.unwrap();
    assert_eq!(record.counters, VisitCounters::first());
    assert_eq!(record.name.as_deref(), Some("Ana"));
}

#[tokio::test]
async fn tenth_visit_rewards_and_eleventh_restarts() {
    let ledger = memory_ledger(LedgerPolicy::default());

    let ninth = register_n(&ledger, 9).await;
    assert_eq!(ninth.counters(), VisitCounters { monthly: 9, lifetime: 9 });

    let tenth = ledger.register_visit(PHONE, None).await.unwrap();
    assert!(tenth.is_reward());
    assert_eq!(tenth.counters(), VisitCounters { monthly: 0, lifetime: 10 });

    let eleventh = ledger.register_visit(PHONE, None).await.unwrap();
    assert_eq!(eleventh.counters(), VisitCounters { monthly: 1, lifetime: 11 });
}

#[tokio::test]
async fn lookup_before_registration_reports_absent() {
    let ledger = memory_ledger(LedgerPolicy::default());
    assert!(ledger.lookup(PHONE).await.unwrap().is_none());
    assert!(matches!(
        ledger.find(PHONE).await,
        Err(LedgerError::RecordNotFound(_))
    ));
}

#[tokio::test]
async fn name_after_first_visit_is_locked() {
    let ledger = memory_ledger(LedgerPolicy::default());
    ledger.register_visit(PHONE, None).await.unwrap();

    let err = ledger.register_visit(PHONE, Some("Ana")).await.unwrap_err();
    assert!(matches!(err, LedgerError::NameLocked));

    let record = ledger.find(PHONE).await.unwrap();
    assert_eq!(record.counters, VisitCounters::first());
    assert_eq!(record.name, None);
}

#[tokio::test]
async fn name_is_accepted_but_ignored_right_after_reward() {
    let ledger = memory_ledger(LedgerPolicy::default());
    register_n(&ledger, 10).await;

    let outcome = ledger.register_visit(PHONE, Some("Ana")).await.unwrap();
    assert_eq!(outcome.counters(), VisitCounters { monthly: 1, lifetime: 11 });
    assert_eq!(ledger.find(PHONE).await.unwrap().name, None);
}

#[tokio::test]
async fn blank_name_does_not_trigger_lock() {
    let ledger = memory_ledger(LedgerPolicy::default());
    ledger.register_visit(PHONE, None).await.unwrap();
    let outcome = ledger.register_visit(PHONE, Some("  ")).await.unwrap();
    assert_eq!(outcome.counters().monthly, 2);
}

#[tokio::test]
async fn untracked_names_never_lock() {
    let ledger = memory_ledger(LedgerPolicy {
        track_name: false,
        ..Default::default()
    });
    ledger.register_visit(PHONE, Some("Ana")).await.unwrap();
    ledger.register_visit(PHONE, Some("Eva")).await.unwrap();
    assert_eq!(ledger.find(PHONE).await.unwrap().name, None);
}

#[tokio::test]
async fn malformed_phone_is_rejected_without_writing() {
    let store = Arc::new(MemoryStore::new());
    let ledger = VisitLedger::new(store.clone(), LedgerPolicy::default());
    let err = ledger.register_visit("12345", None).await.unwrap_err();
    assert!(matches!(err, LedgerError::InvalidPhoneFormat(p) if p == "12345"));
    assert!(store.get("12345").await.unwrap().is_none());

    let lax = memory_ledger(LedgerPolicy {
        validate_phone: false,
        ..Default::default()
    });
    lax.register_visit("12345", None).await.unwrap();
    assert!(lax.lookup("12345").await.unwrap().is_some());
}

#[tokio::test]
async fn lookup_has_no_side_effects() {
    let ledger = memory_ledger(LedgerPolicy::default());
    register_n(&ledger, 3).await;
    for _ in 0..5 {
        let record = ledger.lookup(PHONE).await.unwrap().unwrap();
        assert_eq!(record.counters, VisitCounters { monthly: 3, lifetime: 3 });
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_registrations_are_not_lost() {
    let ledger = Arc::new(memory_ledger(LedgerPolicy::default()));
    let tasks: Vec<_> = (0..50)
        .map(|_| {
            let ledger = ledger.clone();
            tokio::spawn(async move { ledger.register_visit(PHONE, None).await })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let record = ledger.find(PHONE).await.unwrap();
    assert_eq!(record.counters.lifetime, 50);
    assert_eq!(record.counters.monthly, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn separate_ledgers_sharing_a_store_do_not_lose_visits() {
    // Two ledgers stand in for two server processes: no shared lock, only the store's
    // compare-and-set keeps them honest.
    let store: Arc<dyn VisitStore> = Arc::new(MemoryStore::new());
    let policy = LedgerPolicy {
        max_attempts: 1000,
        ..Default::default()
    };
    let a = Arc::new(VisitLedger::new(store.clone(), policy.clone()));
    let b = Arc::new(VisitLedger::new(store.clone(), policy));

    let mut tasks = Vec::new();
    for i in 0..40 {
        let ledger = if i % 2 == 0 { a.clone() } else { b.clone() };
        tasks.push(tokio::spawn(async move {
            ledger.register_visit(PHONE, None).await
        }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let record = store.get(PHONE).await.unwrap().unwrap();
    assert_eq!(record.counters.lifetime, 40);
}

/// Store whose compare-and-set always loses.
struct AlwaysStale(MemoryStore);

#[async_trait::async_trait]
impl VisitStore for AlwaysStale {
    async fn migrate(&self) -> Result<(), StoreError> {
        Ok(())
    }
    async fn get(
        &self,
        phone: &str,
    ) -> Result<Option<visit_ledger_core::domain::model::CustomerRecord>, StoreError> {
        self.0.get(phone).await
    }
    async fn insert(
        &self,
        phone: &str,
        name: Option<&str>,
        counters: VisitCounters,
    ) -> Result<(), StoreError> {
        self.0.insert(phone, name, counters).await
    }
    async fn update(&self, _: &str, _: VisitCounters, _: VisitCounters) -> Result<bool, StoreError> {
        Ok(false)
    }
}

#[tokio::test]
async fn exhausted_attempts_report_contention() {
    let store = AlwaysStale(MemoryStore::new());
    store.insert(PHONE, None, VisitCounters::first()).await.unwrap();
    let ledger = VisitLedger::new(
        Arc::new(store),
        LedgerPolicy {
            max_attempts: 3,
            ..Default::default()
        },
    );

    let err = ledger.register_visit(PHONE, None).await.unwrap_err();
    assert!(matches!(
        err,
        LedgerError::Contended { attempts: 3, .. }
    ));
}

#[tokio::test]
async fn sqlite_store_follows_the_same_cycle() {
    let ledger = sqlite_ledger().await;
    ledger.register_visit(PHONE, Some("Ana")).await.unwrap();
    let tenth = register_n(&ledger, 9).await;
    assert!(tenth.is_reward());

    let record = ledger.find(PHONE).await.unwrap();
    assert_eq!(record.counters, VisitCounters { monthly: 0, lifetime: 10 });
    assert_eq!(record.name.as_deref(), Some("Ana"));
}

#[tokio::test]
async fn sqlite_insert_reports_duplicates() {
    let store = SqliteStore::in_memory().await.unwrap();
    store.migrate().await.unwrap();
    store.insert(PHONE, None, VisitCounters::first()).await.unwrap();

    let err = store
        .insert(PHONE, Some("Ana"), VisitCounters::first())
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Duplicate(p) if p == PHONE));
}

#[tokio::test]
async fn sqlite_update_is_compare_and_set() {
    let store = SqliteStore::in_memory().await.unwrap();
    store.migrate().await.unwrap();
    store.insert(PHONE, None, VisitCounters::first()).await.unwrap();

    let next = VisitCounters::first().advance(10);
    assert!(store.update(PHONE, VisitCounters::first(), next).await.unwrap());
    assert!(!store.update(PHONE, VisitCounters::first(), next).await.unwrap());
    assert_eq!(store.get(PHONE).await.unwrap().unwrap().counters, next);
}

#[tokio::test]
async fn sqlite_rejects_corrupt_counters() {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    let store = SqliteStore::new(pool.clone());
    store.migrate().await.unwrap();
    sqlx::query(
        "INSERT INTO customers (phone, monthly_visits, lifetime_visits) VALUES (?1, -3, 4)",
    )
    .bind(PHONE)
    .execute(&pool)
    .await
    .unwrap();

    let err = store.get(PHONE).await.unwrap_err();
    assert!(matches!(err, StoreError::Backend(_)));
}
