use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::SqliteConnection;

use tobby_core::recurring::{
    GenerationLogEntry, GenerationLogRepositoryTrait, NewGenerationLogEntry, NewRecurringRule,
    RecurringRule, RecurringRuleRepositoryTrait, RecurringRuleUpdate,
};
use tobby_core::Result;

use super::model::{GenerationLogDB, RecurringRuleChangesDB, RecurringRuleDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::{recurring_transactions, transaction_generation_log};
use crate::utils::{format_date, format_timestamp};

pub struct RecurringRuleRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl RecurringRuleRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        RecurringRuleRepository { pool, writer }
    }
}

#[async_trait]
impl RecurringRuleRepositoryTrait for RecurringRuleRepository {
    fn get_rule(&self, rule_id: &str) -> Result<RecurringRule> {
        let mut conn = get_connection(&self.pool)?;
        recurring_transactions::table
            .find(rule_id)
            .first::<RecurringRuleDB>(&mut conn)
            .into_core()?
            .into_domain()
    }

    fn list_rules(&self, user_id: &str) -> Result<Vec<RecurringRule>> {
        let mut conn = get_connection(&self.pool)?;
        recurring_transactions::table
            .filter(recurring_transactions::user_id.eq(user_id))
            .order(recurring_transactions::created_at.desc())
            .load::<RecurringRuleDB>(&mut conn)
            .into_core()?
            .into_iter()
            .map(RecurringRuleDB::into_domain)
            .collect()
    }

    fn list_due_rules(&self, date: NaiveDate) -> Result<Vec<RecurringRule>> {
        // Dates are stored as YYYY-MM-DD text, so string comparison orders
        // the same way the calendar does.
        let date_text = format_date(date);
        let mut conn = get_connection(&self.pool)?;
        recurring_transactions::table
            .filter(recurring_transactions::is_active.eq(true))
            .filter(recurring_transactions::start_date.le(&date_text))
            .filter(
                recurring_transactions::end_date
                    .is_null()
                    .or(recurring_transactions::end_date.ge(&date_text)),
            )
            .load::<RecurringRuleDB>(&mut conn)
            .into_core()?
            .into_iter()
            .map(RecurringRuleDB::into_domain)
            .collect()
    }

    async fn insert_rule(&self, new_rule: NewRecurringRule) -> Result<RecurringRule> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<RecurringRule> {
                let row = RecurringRuleDB::from_new(new_rule);
                diesel::insert_into(recurring_transactions::table)
                    .values(&row)
                    .execute(conn)
                    .into_core()?;
                row.into_domain()
            })
            .await
    }

    async fn update_rule(&self, update: RecurringRuleUpdate) -> Result<RecurringRule> {
        let rule_id = update.id.clone();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<RecurringRule> {
                let changes = RecurringRuleChangesDB::from(update);
                diesel::update(recurring_transactions::table.find(&rule_id))
                    .set(&changes)
                    .execute(conn)
                    .into_core()?;
                recurring_transactions::table
                    .find(&rule_id)
                    .first::<RecurringRuleDB>(conn)
                    .into_core()?
                    .into_domain()
            })
            .await
    }

    async fn set_rule_active(&self, rule_id: String, is_active: bool) -> Result<RecurringRule> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<RecurringRule> {
                diesel::update(recurring_transactions::table.find(&rule_id))
                    .set((
                        recurring_transactions::is_active.eq(is_active),
                        recurring_transactions::updated_at
                            .eq(format_timestamp(chrono::Utc::now())),
                    ))
                    .execute(conn)
                    .into_core()?;
                recurring_transactions::table
                    .find(&rule_id)
                    .first::<RecurringRuleDB>(conn)
                    .into_core()?
                    .into_domain()
            })
            .await
    }

    async fn delete_rule(&self, rule_id: String) -> Result<usize> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                diesel::delete(recurring_transactions::table.find(&rule_id))
                    .execute(conn)
                    .into_core()
            })
            .await
    }

    async fn set_last_generated_date(&self, rule_id: &str, date: NaiveDate) -> Result<()> {
        let rule_id = rule_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                diesel::update(recurring_transactions::table.find(&rule_id))
                    .set(
                        recurring_transactions::last_generated_date
                            .eq(Some(format_date(date))),
                    )
                    .execute(conn)
                    .into_core()?;
                Ok(())
            })
            .await
    }
}

pub struct GenerationLogRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl GenerationLogRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        GenerationLogRepository { pool, writer }
    }
}

#[async_trait]
impl GenerationLogRepositoryTrait for GenerationLogRepository {
    fn find_entry(&self, rule_id: &str, date: NaiveDate) -> Result<Option<GenerationLogEntry>> {
        let mut conn = get_connection(&self.pool)?;
        transaction_generation_log::table
            .filter(transaction_generation_log::recurring_transaction_id.eq(rule_id))
            .filter(transaction_generation_log::generated_for_date.eq(format_date(date)))
            .first::<GenerationLogDB>(&mut conn)
            .optional()
            .into_core()?
            .map(GenerationLogDB::into_domain)
            .transpose()
    }

    fn list_entries_for_rule(&self, rule_id: &str) -> Result<Vec<GenerationLogEntry>> {
        let mut conn = get_connection(&self.pool)?;
        transaction_generation_log::table
            .filter(transaction_generation_log::recurring_transaction_id.eq(rule_id))
            .order(transaction_generation_log::generated_for_date.desc())
            .load::<GenerationLogDB>(&mut conn)
            .into_core()?
            .into_iter()
            .map(GenerationLogDB::into_domain)
            .collect()
    }

    async fn insert_entry(&self, new_entry: NewGenerationLogEntry) -> Result<GenerationLogEntry> {
        // The UNIQUE(recurring_transaction_id, generated_for_date) constraint
        // surfaces as DatabaseError::UniqueViolation, which the generation
        // job interprets as "another run already generated this".
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<GenerationLogEntry> {
                let row = GenerationLogDB::from_new(new_entry);
                diesel::insert_into(transaction_generation_log::table)
                    .values(&row)
                    .execute(conn)
                    .into_core()?;
                row.into_domain()
            })
            .await
    }
}
