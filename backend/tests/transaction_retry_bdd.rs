//! Behaviour-driven tests for the transactional retry engine.

use std::sync::Arc;
use std::time::Duration;

use faultline::domain::transaction_retry::TRANSACTION_CONFLICT_CODE;
use faultline::domain::{DomainError, DomainResult, RetryPolicy, retry_transaction_with_sleeper};
use faultline::test_support::{RecordingSleeper, ScriptedTransactionRunner, ScriptedUnitOfWork};
use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::{ScenarioState, given, scenario, then, when};

#[derive(Clone)]
struct RuntimeHandle(Arc<tokio::runtime::Runtime>);

#[derive(Default, ScenarioState)]
struct TransactionRetryWorld {
    runtime: Slot<RuntimeHandle>,
    policy: Slot<RetryPolicy>,
    runner: Slot<Arc<ScriptedTransactionRunner>>,
    sleeper: Slot<Arc<RecordingSleeper>>,
    work: Slot<Arc<ScriptedUnitOfWork<u32>>>,
    outcome: Slot<DomainResult<u32>>,
}

impl TransactionRetryWorld {
    fn install_work(&self, work: ScriptedUnitOfWork<u32>) {
        self.work.set(Arc::new(work));
    }

    fn retry(&self) {
        let runtime = self.runtime.get().expect("runtime should be set");
        let policy = self.policy.get().expect("policy should be set");
        let runner = self.runner.get().expect("runner should be set");
        let sleeper = self.sleeper.get().expect("sleeper should be set");
        let work = self.work.get().expect("unit of work should be set");

        let outcome = runtime.0.block_on(retry_transaction_with_sleeper(
            runner.as_ref(),
            work.as_ref(),
            &policy,
            sleeper.as_ref(),
        ));
        self.outcome.set(outcome);
    }

    fn outcome(&self) -> DomainResult<u32> {
        self.outcome.get().expect("outcome should be set")
    }
}

#[fixture]
fn world() -> TransactionRetryWorld {
    TransactionRetryWorld::default()
}

fn transaction_conflict() -> DomainError {
    DomainError::database_with_code("could not commit transaction", TRANSACTION_CONFLICT_CODE)
}

// -----------------------------------------------------------------------------
// Given Steps
// -----------------------------------------------------------------------------

#[given("a retry policy allowing {attempts} attempts")]
fn a_retry_policy_allowing_attempts(world: &TransactionRetryWorld, attempts: u32) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("create runtime");
    world.runtime.set(RuntimeHandle(Arc::new(runtime)));
    world.policy.set(RetryPolicy {
        max_attempts: attempts,
        base_delay: Duration::from_millis(100),
        max_delay: Duration::from_millis(500),
        ..RetryPolicy::default()
    });
    world.runner.set(Arc::new(ScriptedTransactionRunner::default()));
    world.sleeper.set(Arc::new(RecordingSleeper::default()));
}

#[given(
    "a unit of work that fails {failures} times with a transaction conflict before succeeding with {value}"
)]
fn a_unit_of_work_that_fails_then_succeeds(
    world: &TransactionRetryWorld,
    failures: usize,
    value: u32,
) {
    world.install_work(ScriptedUnitOfWork::failing_then(
        failures,
        &transaction_conflict(),
        value,
    ));
}

#[given("a unit of work that always fails with a deadlock")]
fn a_unit_of_work_that_always_fails_with_a_deadlock(world: &TransactionRetryWorld) {
    world.install_work(ScriptedUnitOfWork::always_failing(DomainError::database(
        "deadlock detected",
    )));
}

#[given("a unit of work that fails with a validation error")]
fn a_unit_of_work_that_fails_with_a_validation_error(world: &TransactionRetryWorld) {
    world.install_work(ScriptedUnitOfWork::always_failing(
        DomainError::validation_message("Validation failed"),
    ));
}

// -----------------------------------------------------------------------------
// When Steps
// -----------------------------------------------------------------------------

#[when("the unit of work is retried")]
fn the_unit_of_work_is_retried(world: &TransactionRetryWorld) {
    world.retry();
}

// -----------------------------------------------------------------------------
// Then Steps
// -----------------------------------------------------------------------------

#[then("the outcome is a success with value {value}")]
fn the_outcome_is_a_success(world: &TransactionRetryWorld, value: u32) {
    assert_eq!(world.outcome(), Ok(value));
}

#[then("the outcome is a failure with code {code}")]
fn the_outcome_is_a_failure_with_code(world: &TransactionRetryWorld, code: String) {
    let error = world.outcome().expect_err("outcome should be a failure");
    assert_eq!(error.code().as_str(), code);
}

#[then("the unit of work ran {count} times")]
fn the_unit_of_work_ran(world: &TransactionRetryWorld, count: usize) {
    let work = world.work.get().expect("unit of work should be set");
    assert_eq!(work.calls(), count);
}

#[then("the engine waited {count} times")]
fn the_engine_waited(world: &TransactionRetryWorld, count: usize) {
    let sleeper = world.sleeper.get().expect("sleeper should be set");
    assert_eq!(sleeper.delays().len(), count);
}

// -----------------------------------------------------------------------------
// Scenario Bindings
// -----------------------------------------------------------------------------

#[scenario(
    path = "tests/features/transaction_retry.feature",
    name = "A transaction conflict is retried until it commits"
)]
fn a_transaction_conflict_is_retried_until_it_commits(world: TransactionRetryWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/transaction_retry.feature",
    name = "A persistent deadlock exhausts the attempt budget"
)]
fn a_persistent_deadlock_exhausts_the_attempt_budget(world: TransactionRetryWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/transaction_retry.feature",
    name = "A validation failure is not retried"
)]
fn a_validation_failure_is_not_retried(world: TransactionRetryWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/transaction_retry.feature",
    name = "A single-attempt budget never backs off"
)]
fn a_single_attempt_budget_never_backs_off(world: TransactionRetryWorld) {
    let _ = world;
}
