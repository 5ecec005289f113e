use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::errors::{Error, Result, ValidationError};

use super::recurring_model::{
    NewRecurringRule, RecurringRule, RecurringRuleUpdate, RecurringRuleWithLogs, Schedule,
};
use super::recurring_traits::{
    GenerationLogRepositoryTrait, RecurringRuleRepositoryTrait, RecurringServiceTrait,
};

pub struct RecurringService {
    rule_repository: Arc<dyn RecurringRuleRepositoryTrait>,
    log_repository: Arc<dyn GenerationLogRepositoryTrait>,
}

impl RecurringService {
    pub fn new(
        rule_repository: Arc<dyn RecurringRuleRepositoryTrait>,
        log_repository: Arc<dyn GenerationLogRepositoryTrait>,
    ) -> Self {
        RecurringService {
            rule_repository,
            log_repository,
        }
    }

    /// Rejects schedules the evaluator would silently never fire on.
    ///
    /// Existing stored rules may still carry out-of-range or unsupported
    /// configs (they skip forever, which the job warn-logs); new and edited
    /// rules must be well-formed.
    fn validate_schedule(schedule: &Schedule) -> Result<()> {
        let invalid = |message: String| Err(Error::Validation(ValidationError::InvalidInput(message)));
        match schedule {
            Schedule::Monthly { day } => {
                if !(1..=31).contains(day) {
                    return invalid(format!("Day of month must be 1-31, got {}", day));
                }
            }
            Schedule::Biweekly { days } => {
                for day in days {
                    if !(1..=31).contains(day) {
                        return invalid(format!("Day of month must be 1-31, got {}", day));
                    }
                }
                if days[0] == days[1] {
                    return invalid("Biweekly days must be two different days".to_string());
                }
            }
            Schedule::Weekly { weekday } => {
                if *weekday > 6 {
                    return invalid(format!("Weekday must be 0-6 (0 = Sunday), got {}", weekday));
                }
            }
            Schedule::Yearly { month, day } => {
                if !(1..=12).contains(month) {
                    return invalid(format!("Month must be 1-12, got {}", month));
                }
                if !(1..=31).contains(day) {
                    return invalid(format!("Day of month must be 1-31, got {}", day));
                }
            }
            Schedule::Unsupported { kind } => {
                return invalid(format!("Unknown frequency type '{}'", kind));
            }
        }
        Ok(())
    }

    fn validate_amount(amount: Decimal) -> Result<()> {
        if amount <= Decimal::ZERO {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Recurring amount must be positive, got {}",
                amount
            ))));
        }
        Ok(())
    }

    fn validate_window(start_date: NaiveDate, end_date: Option<NaiveDate>) -> Result<()> {
        if let Some(end) = end_date {
            if end < start_date {
                return Err(Error::Validation(ValidationError::InvalidInput(format!(
                    "End date {} is before start date {}",
                    end, start_date
                ))));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl RecurringServiceTrait for RecurringService {
    fn get_rule(&self, rule_id: &str) -> Result<RecurringRule> {
        self.rule_repository.get_rule(rule_id)
    }

    fn list_rules(&self, user_id: &str) -> Result<Vec<RecurringRule>> {
        self.rule_repository.list_rules(user_id)
    }

    fn list_rules_with_logs(&self, user_id: &str) -> Result<Vec<RecurringRuleWithLogs>> {
        let rules = self.rule_repository.list_rules(user_id)?;
        rules
            .into_iter()
            .map(|rule| {
                let generation_logs = self.log_repository.list_entries_for_rule(&rule.id)?;
                Ok(RecurringRuleWithLogs {
                    rule,
                    generation_logs,
                })
            })
            .collect()
    }

    async fn create_rule(&self, new_rule: NewRecurringRule) -> Result<RecurringRule> {
        Self::validate_schedule(&new_rule.schedule)?;
        Self::validate_amount(new_rule.amount)?;
        Self::validate_window(new_rule.start_date, new_rule.end_date)?;
        self.rule_repository.insert_rule(new_rule).await
    }

    async fn update_rule(&self, update: RecurringRuleUpdate) -> Result<RecurringRule> {
        Self::validate_schedule(&update.schedule)?;
        Self::validate_amount(update.amount)?;
        Self::validate_window(update.start_date, update.end_date)?;
        self.rule_repository.update_rule(update).await
    }

    async fn set_rule_active(&self, rule_id: String, is_active: bool) -> Result<RecurringRule> {
        self.rule_repository.set_rule_active(rule_id, is_active).await
    }

    async fn delete_rule(&self, rule_id: String) -> Result<usize> {
        self.rule_repository.delete_rule(rule_id).await
    }
}
