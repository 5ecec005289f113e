//! Daily materialization of recurring rules into concrete transactions.
//!
//! One invocation per calendar day is expected, but nothing breaks when the
//! job runs twice: a generation log keyed by (rule, date) makes every rerun a
//! no-op, and the storage-level uniqueness constraint on that key backstops
//! racing invocations.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::NaiveDate;
use log::{debug, error, info, warn};

use crate::errors::Result;
use crate::recurring::recurring_model::{
    GenerationOutcome, GenerationReport, NewGenerationLogEntry, RecurringRule, Schedule,
};
use crate::recurring::recurring_traits::{
    GenerationLogRepositoryTrait, GenerationServiceTrait, RecurringRuleRepositoryTrait,
};
use crate::transactions::{NewTransaction, TransactionRepositoryTrait};

/// Default wall-clock budget for one run. Generous for the sequential
/// per-rule writes this job performs; a run that exceeds it is wedged, not
/// slow.
pub const DEFAULT_JOB_TIMEOUT: Duration = Duration::from_secs(5 * 60);

pub struct GenerationService {
    rule_repository: Arc<dyn RecurringRuleRepositoryTrait>,
    transaction_repository: Arc<dyn TransactionRepositoryTrait>,
    log_repository: Arc<dyn GenerationLogRepositoryTrait>,
    job_timeout: Duration,
}

impl GenerationService {
    pub fn new(
        rule_repository: Arc<dyn RecurringRuleRepositoryTrait>,
        transaction_repository: Arc<dyn TransactionRepositoryTrait>,
        log_repository: Arc<dyn GenerationLogRepositoryTrait>,
    ) -> Self {
        GenerationService {
            rule_repository,
            transaction_repository,
            log_repository,
            job_timeout: DEFAULT_JOB_TIMEOUT,
        }
    }

    pub fn with_job_timeout(mut self, job_timeout: Duration) -> Self {
        self.job_timeout = job_timeout;
        self
    }

    /// Handles a single rule for `today`.
    ///
    /// Effects, in order: insert the transaction, insert the log entry,
    /// stamp the rule's `last_generated_date`. A failure anywhere leaves the
    /// log entry and stamp unwritten, so the next run retries the rule.
    async fn process_rule(
        &self,
        rule: &RecurringRule,
        today: NaiveDate,
    ) -> Result<GenerationOutcome> {
        if !rule.schedule.fires_on(today) {
            if let Schedule::Unsupported { kind } = &rule.schedule {
                // Operational smell: such a rule silently skips every run
                // until someone fixes its frequency config.
                warn!(
                    "Recurring rule {} has unrecognized frequency type '{}' and will never generate",
                    rule.id, kind
                );
            }
            return Ok(GenerationOutcome::NotDue);
        }

        if self.log_repository.find_entry(&rule.id, today)?.is_some() {
            debug!("Rule {} already generated for {}", rule.id, today);
            return Ok(GenerationOutcome::AlreadyGenerated);
        }

        let transaction = self
            .transaction_repository
            .insert_transaction(NewTransaction {
                user_id: rule.user_id.clone(),
                description: Some(rule.description.clone()),
                transaction_date: today,
                transaction_type: rule.transaction_type,
                amount: rule.amount,
            })
            .await?;

        let log_insert = self
            .log_repository
            .insert_entry(NewGenerationLogEntry {
                recurring_rule_id: rule.id.clone(),
                generated_transaction_id: transaction.id.clone(),
                generated_for_date: today,
            })
            .await;

        match log_insert {
            Ok(_) => {}
            Err(err) if err.is_unique_violation() => {
                // A concurrent run logged this (rule, date) between our
                // existence check and our insert. Its transaction is the one
                // that counts; remove ours.
                warn!(
                    "Rule {} lost a generation race for {}; removing duplicate transaction {}",
                    rule.id, today, transaction.id
                );
                if let Err(cleanup_err) = self
                    .transaction_repository
                    .hard_delete_transaction(transaction.id.clone())
                    .await
                {
                    warn!(
                        "Could not remove duplicate transaction {}: {}",
                        transaction.id, cleanup_err
                    );
                }
                return Ok(GenerationOutcome::AlreadyGenerated);
            }
            Err(err) => return Err(err),
        }

        self.rule_repository
            .set_last_generated_date(&rule.id, today)
            .await?;

        info!(
            "Generated {} transaction of {} for rule '{}'",
            rule.transaction_type.as_str(),
            rule.amount,
            rule.description
        );
        Ok(GenerationOutcome::Generated)
    }
}

#[async_trait]
impl GenerationServiceTrait for GenerationService {
    async fn run_for_date(&self, today: NaiveDate) -> Result<GenerationReport> {
        let started = Instant::now();

        // A fetch failure here aborts the whole run; there is nothing useful
        // to do without the rule set.
        let rules = self.rule_repository.list_due_rules(today)?;
        info!(
            "Generation run for {}: {} eligible recurring rule(s)",
            today,
            rules.len()
        );

        let mut report = GenerationReport::new(today, rules.len());

        for rule in &rules {
            if started.elapsed() >= self.job_timeout {
                error!(
                    "Generation run for {} exceeded its {:?} budget; abandoning {} remaining rule(s)",
                    today,
                    self.job_timeout,
                    rules.len() - (report.generated + report.skipped + report.failed)
                );
                report.timed_out = true;
                break;
            }

            match self.process_rule(rule, today).await {
                Ok(GenerationOutcome::Generated) => report.generated += 1,
                Ok(GenerationOutcome::NotDue) | Ok(GenerationOutcome::AlreadyGenerated) => {
                    report.skipped += 1
                }
                // One broken rule must not take down the batch; it will be
                // retried on the next run since nothing was logged for it.
                Err(err) => {
                    error!("Failed to process recurring rule {}: {}", rule.id, err);
                    report.failed += 1;
                }
            }
        }

        info!(
            "Generation run for {} finished: {} generated, {} skipped, {} failed",
            today, report.generated, report.skipped, report.failed
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{DatabaseError, Error};
    use crate::recurring::recurring_model::GenerationLogEntry;
    use crate::transactions::{
        Transaction, TransactionType, TransactionUpdate, TransactionWithCategories,
    };
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use std::collections::HashSet;
    use std::sync::RwLock;

    // ============== Mock Repositories ==============

    struct MockRuleRepository {
        rules: Vec<RecurringRule>,
        last_generated: RwLock<Vec<(String, NaiveDate)>>,
        fail_fetch: bool,
    }

    impl MockRuleRepository {
        fn new(rules: Vec<RecurringRule>) -> Self {
            Self {
                rules,
                last_generated: RwLock::new(Vec::new()),
                fail_fetch: false,
            }
        }

        fn failing_fetch() -> Self {
            Self {
                rules: Vec::new(),
                last_generated: RwLock::new(Vec::new()),
                fail_fetch: true,
            }
        }
    }

    #[async_trait]
    impl RecurringRuleRepositoryTrait for MockRuleRepository {
        fn get_rule(&self, _: &str) -> Result<RecurringRule> {
            unimplemented!()
        }
        fn list_rules(&self, _: &str) -> Result<Vec<RecurringRule>> {
            unimplemented!()
        }
        fn list_due_rules(&self, date: NaiveDate) -> Result<Vec<RecurringRule>> {
            if self.fail_fetch {
                return Err(Error::Database(DatabaseError::QueryFailed(
                    "connection reset".to_string(),
                )));
            }
            Ok(self
                .rules
                .iter()
                .filter(|r| {
                    r.is_active
                        && r.start_date <= date
                        && r.end_date.map(|end| end >= date).unwrap_or(true)
                })
                .cloned()
                .collect())
        }
        async fn insert_rule(&self, _: crate::recurring::NewRecurringRule) -> Result<RecurringRule> {
            unimplemented!()
        }
        async fn update_rule(
            &self,
            _: crate::recurring::RecurringRuleUpdate,
        ) -> Result<RecurringRule> {
            unimplemented!()
        }
        async fn set_rule_active(&self, _: String, _: bool) -> Result<RecurringRule> {
            unimplemented!()
        }
        async fn delete_rule(&self, _: String) -> Result<usize> {
            unimplemented!()
        }
        async fn set_last_generated_date(&self, rule_id: &str, date: NaiveDate) -> Result<()> {
            self.last_generated
                .write()
                .unwrap()
                .push((rule_id.to_string(), date));
            Ok(())
        }
    }

    struct MockTransactionRepository {
        transactions: RwLock<Vec<Transaction>>,
        // Rule descriptions whose inserts should fail.
        fail_descriptions: HashSet<String>,
    }

    impl MockTransactionRepository {
        fn new() -> Self {
            Self {
                transactions: RwLock::new(Vec::new()),
                fail_descriptions: HashSet::new(),
            }
        }

        fn failing_for(descriptions: &[&str]) -> Self {
            Self {
                transactions: RwLock::new(Vec::new()),
                fail_descriptions: descriptions.iter().map(|s| s.to_string()).collect(),
            }
        }

        fn count(&self) -> usize {
            self.transactions.read().unwrap().len()
        }
    }

    #[async_trait]
    impl TransactionRepositoryTrait for MockTransactionRepository {
        fn get_transaction(&self, _: &str) -> Result<Transaction> {
            unimplemented!()
        }
        fn list_transactions(&self, _: &str) -> Result<Vec<Transaction>> {
            unimplemented!()
        }
        fn list_transactions_with_categories(
            &self,
            _: &str,
        ) -> Result<Vec<TransactionWithCategories>> {
            unimplemented!()
        }
        async fn insert_transaction(&self, new_transaction: NewTransaction) -> Result<Transaction> {
            if let Some(description) = &new_transaction.description {
                if self.fail_descriptions.contains(description) {
                    return Err(Error::Database(DatabaseError::QueryFailed(
                        "disk I/O error".to_string(),
                    )));
                }
            }
            let mut transactions = self.transactions.write().unwrap();
            let transaction = Transaction {
                id: format!("tx-{}", transactions.len()),
                user_id: new_transaction.user_id,
                description: new_transaction.description,
                transaction_date: new_transaction.transaction_date,
                transaction_type: new_transaction.transaction_type,
                amount: new_transaction.amount,
                created_at: Utc::now(),
                deleted_at: None,
            };
            transactions.push(transaction.clone());
            Ok(transaction)
        }
        async fn update_transaction(&self, _: TransactionUpdate) -> Result<Transaction> {
            unimplemented!()
        }
        async fn soft_delete_transaction(&self, _: String) -> Result<()> {
            unimplemented!()
        }
        async fn hard_delete_transaction(&self, transaction_id: String) -> Result<()> {
            self.transactions
                .write()
                .unwrap()
                .retain(|t| t.id != transaction_id);
            Ok(())
        }
    }

    struct MockLogRepository {
        entries: RwLock<Vec<GenerationLogEntry>>,
        // Simulates a racing run: insert_entry hits the uniqueness
        // constraint even though find_entry saw nothing.
        conflict_on_insert: bool,
    }

    impl MockLogRepository {
        fn new() -> Self {
            Self {
                entries: RwLock::new(Vec::new()),
                conflict_on_insert: false,
            }
        }

        fn racing() -> Self {
            Self {
                entries: RwLock::new(Vec::new()),
                conflict_on_insert: true,
            }
        }

        fn count(&self) -> usize {
            self.entries.read().unwrap().len()
        }
    }

    #[async_trait]
    impl GenerationLogRepositoryTrait for MockLogRepository {
        fn find_entry(
            &self,
            rule_id: &str,
            date: NaiveDate,
        ) -> Result<Option<GenerationLogEntry>> {
            Ok(self
                .entries
                .read()
                .unwrap()
                .iter()
                .find(|e| e.recurring_rule_id == rule_id && e.generated_for_date == date)
                .cloned())
        }

        fn list_entries_for_rule(&self, _: &str) -> Result<Vec<GenerationLogEntry>> {
            unimplemented!()
        }

        async fn insert_entry(
            &self,
            new_entry: NewGenerationLogEntry,
        ) -> Result<GenerationLogEntry> {
            let mut entries = self.entries.write().unwrap();
            let duplicate = self.conflict_on_insert
                || entries.iter().any(|e| {
                    e.recurring_rule_id == new_entry.recurring_rule_id
                        && e.generated_for_date == new_entry.generated_for_date
                });
            if duplicate {
                return Err(Error::Database(DatabaseError::UniqueViolation(
                    "transaction_generation_log.recurring_transaction_id".to_string(),
                )));
            }
            let entry = GenerationLogEntry {
                id: format!("log-{}", entries.len()),
                recurring_rule_id: new_entry.recurring_rule_id,
                generated_transaction_id: new_entry.generated_transaction_id,
                generated_for_date: new_entry.generated_for_date,
                generated_at: Utc::now(),
            };
            entries.push(entry.clone());
            Ok(entry)
        }
    }

    // ============== Helper Functions ==============

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn rule(id: &str, description: &str, schedule: Schedule) -> RecurringRule {
        RecurringRule {
            id: id.to_string(),
            user_id: "user-1".to_string(),
            description: description.to_string(),
            amount: dec!(100),
            transaction_type: TransactionType::Withdrawal,
            schedule,
            start_date: date(2024, 1, 1),
            end_date: None,
            is_active: true,
            last_generated_date: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn make_service(
        rules: Vec<RecurringRule>,
    ) -> (
        GenerationService,
        Arc<MockTransactionRepository>,
        Arc<MockLogRepository>,
    ) {
        let transaction_repo = Arc::new(MockTransactionRepository::new());
        let log_repo = Arc::new(MockLogRepository::new());
        let service = GenerationService::new(
            Arc::new(MockRuleRepository::new(rules)),
            transaction_repo.clone(),
            log_repo.clone(),
        );
        (service, transaction_repo, log_repo)
    }

    // ============== Tests ==============

    #[tokio::test]
    async fn test_due_rule_generates_one_transaction_and_log() {
        let (service, transaction_repo, log_repo) = make_service(vec![rule(
            "rule-1",
            "Rent",
            Schedule::Monthly { day: 15 },
        )]);

        let report = service.run_for_date(date(2024, 3, 15)).await.unwrap();

        assert_eq!(report.processed, 1);
        assert_eq!(report.generated, 1);
        assert_eq!(report.skipped, 0);
        assert_eq!(report.failed, 0);
        assert_eq!(transaction_repo.count(), 1);
        assert_eq!(log_repo.count(), 1);

        let generated = transaction_repo.transactions.read().unwrap()[0].clone();
        assert_eq!(generated.transaction_date, date(2024, 3, 15));
        assert_eq!(generated.amount, dec!(100));
        assert_eq!(generated.description.as_deref(), Some("Rent"));
    }

    #[tokio::test]
    async fn test_second_run_same_day_is_idempotent() {
        let (service, transaction_repo, log_repo) = make_service(vec![rule(
            "rule-1",
            "Rent",
            Schedule::Monthly { day: 15 },
        )]);
        let today = date(2024, 3, 15);

        let first = service.run_for_date(today).await.unwrap();
        assert_eq!(first.generated, 1);

        let second = service.run_for_date(today).await.unwrap();
        assert_eq!(second.generated, 0);
        assert_eq!(second.skipped, 1);
        assert_eq!(transaction_repo.count(), 1);
        assert_eq!(log_repo.count(), 1);
    }

    #[tokio::test]
    async fn test_rule_not_due_is_skipped() {
        let (service, transaction_repo, _) = make_service(vec![rule(
            "rule-1",
            "Gym",
            Schedule::Weekly { weekday: 1 },
        )]);

        // 2024-03-12 is a Tuesday.
        let report = service.run_for_date(date(2024, 3, 12)).await.unwrap();

        assert_eq!(report.generated, 0);
        assert_eq!(report.skipped, 1);
        assert_eq!(transaction_repo.count(), 0);
    }

    #[tokio::test]
    async fn test_unsupported_frequency_rule_is_skipped() {
        let (service, transaction_repo, _) = make_service(vec![rule(
            "rule-1",
            "Mystery",
            Schedule::Unsupported {
                kind: "daily".to_string(),
            },
        )]);

        let report = service.run_for_date(date(2024, 3, 15)).await.unwrap();

        assert_eq!(report.skipped, 1);
        assert_eq!(transaction_repo.count(), 0);
    }

    #[tokio::test]
    async fn test_partial_failure_does_not_abort_batch() {
        let rules = vec![
            rule("rule-a", "Broken", Schedule::Monthly { day: 15 }),
            rule("rule-b", "Rent", Schedule::Monthly { day: 15 }),
        ];
        let rule_repo = Arc::new(MockRuleRepository::new(rules));
        let transaction_repo = Arc::new(MockTransactionRepository::failing_for(&["Broken"]));
        let log_repo = Arc::new(MockLogRepository::new());
        let service = GenerationService::new(
            rule_repo.clone(),
            transaction_repo.clone(),
            log_repo.clone(),
        );

        let report = service.run_for_date(date(2024, 3, 15)).await.unwrap();

        assert_eq!(report.failed, 1);
        assert_eq!(report.generated, 1);
        // Only rule-b got a transaction, log entry, and stamp.
        assert_eq!(transaction_repo.count(), 1);
        assert_eq!(log_repo.count(), 1);
        let stamps = rule_repo.last_generated.read().unwrap().clone();
        assert_eq!(stamps, vec![("rule-b".to_string(), date(2024, 3, 15))]);
    }

    #[tokio::test]
    async fn test_failed_rule_retries_next_run() {
        let rules = vec![rule("rule-a", "Flaky", Schedule::Monthly { day: 15 })];
        let rule_repo = Arc::new(MockRuleRepository::new(rules.clone()));
        let failing_repo = Arc::new(MockTransactionRepository::failing_for(&["Flaky"]));
        let log_repo = Arc::new(MockLogRepository::new());
        let service =
            GenerationService::new(rule_repo.clone(), failing_repo, log_repo.clone());

        let report = service.run_for_date(date(2024, 3, 15)).await.unwrap();
        assert_eq!(report.failed, 1);
        assert_eq!(log_repo.count(), 0);

        // Same rule set, healthy store: the rule generates because no log
        // entry was written by the failed attempt.
        let healthy_repo = Arc::new(MockTransactionRepository::new());
        let service = GenerationService::new(rule_repo, healthy_repo.clone(), log_repo.clone());
        let report = service.run_for_date(date(2024, 3, 15)).await.unwrap();
        assert_eq!(report.generated, 1);
        assert_eq!(healthy_repo.count(), 1);
    }

    #[tokio::test]
    async fn test_racing_log_insert_counts_as_skip_and_removes_duplicate() {
        let rule_repo = Arc::new(MockRuleRepository::new(vec![rule(
            "rule-1",
            "Rent",
            Schedule::Monthly { day: 15 },
        )]));
        let transaction_repo = Arc::new(MockTransactionRepository::new());
        let log_repo = Arc::new(MockLogRepository::racing());
        let service = GenerationService::new(
            rule_repo.clone(),
            transaction_repo.clone(),
            log_repo,
        );

        let report = service.run_for_date(date(2024, 3, 15)).await.unwrap();

        // The conflict is a benign skip, not a failure, and the duplicate
        // transaction this run inserted was removed again.
        assert_eq!(report.failed, 0);
        assert_eq!(report.skipped, 1);
        assert_eq!(transaction_repo.count(), 0);
        assert!(rule_repo.last_generated.read().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_failure_aborts_run() {
        let service = GenerationService::new(
            Arc::new(MockRuleRepository::failing_fetch()),
            Arc::new(MockTransactionRepository::new()),
            Arc::new(MockLogRepository::new()),
        );

        assert!(service.run_for_date(date(2024, 3, 15)).await.is_err());
    }

    #[tokio::test]
    async fn test_inactive_and_out_of_window_rules_not_loaded() {
        let mut paused = rule("rule-a", "Paused", Schedule::Monthly { day: 15 });
        paused.is_active = false;
        let mut ended = rule("rule-b", "Ended", Schedule::Monthly { day: 15 });
        ended.end_date = Some(date(2024, 2, 1));
        let mut future = rule("rule-c", "Future", Schedule::Monthly { day: 15 });
        future.start_date = date(2025, 1, 1);

        let (service, transaction_repo, _) = make_service(vec![paused, ended, future]);
        let report = service.run_for_date(date(2024, 3, 15)).await.unwrap();

        assert_eq!(report.processed, 0);
        assert_eq!(transaction_repo.count(), 0);
    }

    #[tokio::test]
    async fn test_exhausted_deadline_abandons_remaining_rules() {
        let rules = vec![
            rule("rule-a", "Rent", Schedule::Monthly { day: 15 }),
            rule("rule-b", "Gym", Schedule::Monthly { day: 15 }),
        ];
        let (service, transaction_repo, _) = make_service(rules);
        let service = service.with_job_timeout(Duration::ZERO);

        let report = service.run_for_date(date(2024, 3, 15)).await.unwrap();

        assert!(report.timed_out);
        assert_eq!(report.generated, 0);
        assert_eq!(transaction_repo.count(), 0);
    }
}
