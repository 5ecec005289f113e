use chrono::NaiveDate;

use crate::errors::Result;
use crate::recurring::recurring_model::{
    GenerationLogEntry, GenerationReport, NewGenerationLogEntry, NewRecurringRule, RecurringRule,
    RecurringRuleUpdate, RecurringRuleWithLogs,
};
use async_trait::async_trait;

/// Trait for recurring rule repository operations
#[async_trait]
pub trait RecurringRuleRepositoryTrait: Send + Sync {
    fn get_rule(&self, rule_id: &str) -> Result<RecurringRule>;
    fn list_rules(&self, user_id: &str) -> Result<Vec<RecurringRule>>;
    /// Coarse eligibility pre-filter for the generation job: active rules
    /// whose start/end window contains `date`. Exact day matching is the
    /// schedule's job, not the store's.
    fn list_due_rules(&self, date: NaiveDate) -> Result<Vec<RecurringRule>>;
    async fn insert_rule(&self, new_rule: NewRecurringRule) -> Result<RecurringRule>;
    async fn update_rule(&self, update: RecurringRuleUpdate) -> Result<RecurringRule>;
    async fn set_rule_active(&self, rule_id: String, is_active: bool) -> Result<RecurringRule>;
    async fn delete_rule(&self, rule_id: String) -> Result<usize>;
    async fn set_last_generated_date(&self, rule_id: &str, date: NaiveDate) -> Result<()>;
}

/// Trait for generation log repository operations
#[async_trait]
pub trait GenerationLogRepositoryTrait: Send + Sync {
    fn find_entry(&self, rule_id: &str, date: NaiveDate) -> Result<Option<GenerationLogEntry>>;
    fn list_entries_for_rule(&self, rule_id: &str) -> Result<Vec<GenerationLogEntry>>;
    /// Inserts a new entry. The store enforces uniqueness of
    /// (rule, generated-for date); a violation surfaces as
    /// `DatabaseError::UniqueViolation`.
    async fn insert_entry(&self, new_entry: NewGenerationLogEntry) -> Result<GenerationLogEntry>;
}

/// Trait for recurring rule service operations
#[async_trait]
pub trait RecurringServiceTrait: Send + Sync {
    fn get_rule(&self, rule_id: &str) -> Result<RecurringRule>;
    fn list_rules(&self, user_id: &str) -> Result<Vec<RecurringRule>>;
    fn list_rules_with_logs(&self, user_id: &str) -> Result<Vec<RecurringRuleWithLogs>>;
    async fn create_rule(&self, new_rule: NewRecurringRule) -> Result<RecurringRule>;
    async fn update_rule(&self, update: RecurringRuleUpdate) -> Result<RecurringRule>;
    async fn set_rule_active(&self, rule_id: String, is_active: bool) -> Result<RecurringRule>;
    async fn delete_rule(&self, rule_id: String) -> Result<usize>;
}

/// Trait for the daily generation job
#[async_trait]
pub trait GenerationServiceTrait: Send + Sync {
    /// Runs one generation pass for the given calendar date.
    ///
    /// The date is injected rather than read from the wall clock so the job
    /// can be driven by a scheduler, an HTTP trigger, or a test equally.
    async fn run_for_date(&self, today: NaiveDate) -> Result<GenerationReport>;
}
