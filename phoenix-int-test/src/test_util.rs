use phoenix::connection::{
    ClientSettings, ConnectionManager, DatabaseProfile, DocumentDriver, MemoryClient, MemoryDriver,
};
use phoenix::errors::{ErrorKind, PhoenixError, PhoenixResult};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Runs `test` against a context built by `before`, then always runs
/// `after`. Panics with the first error encountered.
pub fn run_test<T, B, A>(before: B, test: T, after: A)
where
    T: Fn(TestContext) -> PhoenixResult<()>,
    B: Fn() -> PhoenixResult<TestContext>,
    A: Fn(TestContext) -> PhoenixResult<()>,
{
    let ctx = match before() {
        Ok(ctx) => ctx,
        Err(e) => panic!("Before run failed: {:?}", e),
    };

    let test_result = test(ctx.clone());
    let after_result = after(ctx);

    if let Err(e) = test_result {
        panic!("Test failed: {:?}", e);
    }
    if let Err(e) = after_result {
        panic!("After run failed: {:?}", e);
    }
}

/// Memory driver that can slow down and fail client construction.
///
/// The delay widens the window in which concurrent first requests race
/// for the same profile.
#[derive(Clone, Default)]
pub struct CountingDriver {
    inner: MemoryDriver,
    connect_delay: Duration,
    failures_left: Arc<AtomicUsize>,
    attempts: Arc<AtomicUsize>,
}

impl CountingDriver {
    pub fn new() -> Self {
        CountingDriver::default()
    }

    pub fn with_connect_delay(mut self, delay: Duration) -> Self {
        self.connect_delay = delay;
        self
    }

    /// Makes the next `count` connection attempts fail.
    pub fn failing(self, count: usize) -> Self {
        self.failures_left.store(count, Ordering::SeqCst);
        self
    }

    /// Clients successfully created.
    pub fn connection_count(&self) -> usize {
        self.inner.connection_count()
    }

    /// Connection attempts, failed ones included.
    pub fn attempt_count(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl DocumentDriver for CountingDriver {
    type Client = MemoryClient;

    fn connect(&self, settings: &ClientSettings) -> PhoenixResult<MemoryClient> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if !self.connect_delay.is_zero() {
            thread::sleep(self.connect_delay);
        }

        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if failing {
            return Err(PhoenixError::new(
                "Server selection timed out",
                ErrorKind::IOError,
            ));
        }

        self.inner.connect(settings)
    }
}

#[derive(Clone)]
pub struct TestContext {
    manager: ConnectionManager<CountingDriver>,
}

impl TestContext {
    pub fn new(manager: ConnectionManager<CountingDriver>) -> Self {
        Self { manager }
    }

    pub fn manager(&self) -> ConnectionManager<CountingDriver> {
        self.manager.clone()
    }

    pub fn driver(&self) -> &CountingDriver {
        self.manager.driver()
    }
}

pub fn profile_fixture(id: &str, database: &str) -> DatabaseProfile {
    DatabaseProfile::new(id, database).with_server("localhost", 27017)
}

/// Profiles used across the integration tests.
pub fn profile_fixtures() -> Vec<DatabaseProfile> {
    vec![
        profile_fixture("Test2", "phoenix_test"),
        profile_fixture("main", "shop"),
        profile_fixture("files", "storage")
            .with_replica_set("rs0")
            .with_default_chunk_size(64 * 1024),
    ]
}

pub fn create_test_context() -> PhoenixResult<TestContext> {
    create_test_context_with(CountingDriver::new())
}

pub fn create_slow_test_context() -> PhoenixResult<TestContext> {
    create_test_context_with(CountingDriver::new().with_connect_delay(Duration::from_millis(20)))
}

pub fn create_test_context_with(driver: CountingDriver) -> PhoenixResult<TestContext> {
    let manager = profile_fixtures()
        .into_iter()
        .fold(ConnectionManager::builder(driver), |builder, profile| {
            builder.profile(profile)
        })
        .build()?;
    Ok(TestContext::new(manager))
}

pub fn cleanup(ctx: TestContext) -> PhoenixResult<()> {
    ctx.manager().reset();
    Ok(())
}
