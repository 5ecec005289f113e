//! Database models for recurring rules and the generation log.

use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::utils::{
    format_date, format_decimal, format_timestamp, parse_date, parse_decimal, parse_timestamp,
    parse_transaction_type,
};
use tobby_core::recurring::{
    GenerationLogEntry, NewGenerationLogEntry, NewRecurringRule, RecurringRule,
    RecurringRuleUpdate, Schedule,
};
use tobby_core::Result;

/// Database model for recurring rules.
///
/// The schedule is persisted as the discriminator/config pair the original
/// clients wrote (`frequency_type` + JSON `frequency_config`), so rows with
/// frequency types this build does not know survive round trips untouched.
#[derive(Queryable, Identifiable, Insertable, Selectable, Debug, Clone, PartialEq,
    Serialize, Deserialize)]
#[diesel(table_name = crate::schema::recurring_transactions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RecurringRuleDB {
    pub id: String,
    pub user_id: String,
    pub description: String,
    pub amount: String,
    pub transaction_type: String,
    pub frequency_type: String,
    pub frequency_config: String,
    pub start_date: String,
    pub end_date: Option<String>,
    pub is_active: bool,
    pub last_generated_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl RecurringRuleDB {
    pub fn into_domain(self) -> Result<RecurringRule> {
        // Malformed config JSON degrades to an unsupported schedule rather
        // than failing the whole fetch; such a rule just never fires.
        let config = serde_json::from_str(&self.frequency_config)
            .unwrap_or(serde_json::Value::Null);
        let schedule = Schedule::from_parts(&self.frequency_type, &config);
        Ok(RecurringRule {
            amount: parse_decimal(&self.amount)?,
            transaction_type: parse_transaction_type(&self.transaction_type)?,
            schedule,
            start_date: parse_date(&self.start_date)?,
            end_date: self.end_date.as_deref().map(parse_date).transpose()?,
            last_generated_date: self
                .last_generated_date
                .as_deref()
                .map(parse_date)
                .transpose()?,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
            id: self.id,
            user_id: self.user_id,
            description: self.description,
            is_active: self.is_active,
        })
    }

    pub fn from_new(new_rule: NewRecurringRule) -> Self {
        let (frequency_type, frequency_config) = new_rule.schedule.to_parts();
        let now = format_timestamp(chrono::Utc::now());
        RecurringRuleDB {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: new_rule.user_id,
            description: new_rule.description,
            amount: format_decimal(new_rule.amount),
            transaction_type: new_rule.transaction_type.as_str().to_string(),
            frequency_type,
            frequency_config: frequency_config.to_string(),
            start_date: format_date(new_rule.start_date),
            end_date: new_rule.end_date.map(format_date),
            is_active: true,
            last_generated_date: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

/// Changeset for editing an existing recurring rule.
#[derive(AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::recurring_transactions)]
pub struct RecurringRuleChangesDB {
    pub description: String,
    pub amount: String,
    pub transaction_type: String,
    pub frequency_type: String,
    pub frequency_config: String,
    pub start_date: String,
    pub end_date: Option<Option<String>>,
    pub is_active: bool,
    pub updated_at: String,
}

impl From<RecurringRuleUpdate> for RecurringRuleChangesDB {
    fn from(update: RecurringRuleUpdate) -> Self {
        let (frequency_type, frequency_config) = update.schedule.to_parts();
        RecurringRuleChangesDB {
            description: update.description,
            amount: format_decimal(update.amount),
            transaction_type: update.transaction_type.as_str().to_string(),
            frequency_type,
            frequency_config: frequency_config.to_string(),
            start_date: format_date(update.start_date),
            end_date: Some(update.end_date.map(format_date)),
            is_active: update.is_active,
            updated_at: format_timestamp(chrono::Utc::now()),
        }
    }
}

/// Database model for generation log entries
#[derive(Queryable, Identifiable, Insertable, Selectable, Debug, Clone, PartialEq, Eq,
    Serialize, Deserialize)]
#[diesel(table_name = crate::schema::transaction_generation_log)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct GenerationLogDB {
    pub id: String,
    pub recurring_transaction_id: String,
    pub generated_transaction_id: String,
    pub generated_for_date: String,
    pub generated_at: String,
}

impl GenerationLogDB {
    pub fn into_domain(self) -> Result<GenerationLogEntry> {
        Ok(GenerationLogEntry {
            generated_for_date: parse_date(&self.generated_for_date)?,
            generated_at: parse_timestamp(&self.generated_at)?,
            id: self.id,
            recurring_rule_id: self.recurring_transaction_id,
            generated_transaction_id: self.generated_transaction_id,
        })
    }

    pub fn from_new(new_entry: NewGenerationLogEntry) -> Self {
        GenerationLogDB {
            id: uuid::Uuid::new_v4().to_string(),
            recurring_transaction_id: new_entry.recurring_rule_id,
            generated_transaction_id: new_entry.generated_transaction_id,
            generated_for_date: format_date(new_entry.generated_for_date),
            generated_at: format_timestamp(chrono::Utc::now()),
        }
    }
}
