//! Recurring transactions domain models.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::transactions::TransactionType;

/// Repetition pattern of a recurring rule.
///
/// Stored and transmitted as a `frequencyType` discriminator plus a
/// `frequencyConfig` object, the shape the mobile and web clients already
/// write. Unrecognized or malformed pairs deserialize to [`Schedule::Unsupported`]
/// instead of failing, so one bad rule cannot poison a whole fetch; an
/// unsupported schedule never fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ScheduleRepr", into = "ScheduleRepr")]
pub enum Schedule {
    /// Fires on one fixed day of every month. Months shorter than `day`
    /// are skipped; there is no last-day-of-month fallback.
    Monthly { day: u32 },
    /// Fires on two fixed days of every month (e.g. the 1st and the 15th).
    Biweekly { days: [u32; 2] },
    /// Fires on one weekday every week. 0 = Sunday .. 6 = Saturday.
    Weekly { weekday: u32 },
    /// Fires on one fixed date every year.
    Yearly { month: u32, day: u32 },
    /// Frequency type this version does not understand. Never fires.
    Unsupported { kind: String },
}

impl Schedule {
    /// Rebuilds a schedule from its stored discriminator and config object.
    pub fn from_parts(kind: &str, config: &serde_json::Value) -> Schedule {
        let unsupported = || Schedule::Unsupported {
            kind: kind.to_string(),
        };
        match kind {
            "monthly" => match config.get("day").and_then(|v| v.as_u64()) {
                Some(day) => Schedule::Monthly { day: day as u32 },
                None => unsupported(),
            },
            "biweekly" => {
                let days = config.get("days").and_then(|v| v.as_array());
                match days.map(|d| {
                    d.iter()
                        .filter_map(|v| v.as_u64())
                        .map(|v| v as u32)
                        .collect::<Vec<_>>()
                }) {
                    Some(days) if days.len() == 2 => Schedule::Biweekly {
                        days: [days[0], days[1]],
                    },
                    _ => unsupported(),
                }
            }
            "weekly" => match config.get("weekday").and_then(|v| v.as_u64()) {
                Some(weekday) => Schedule::Weekly {
                    weekday: weekday as u32,
                },
                None => unsupported(),
            },
            "yearly" => {
                let month = config.get("month").and_then(|v| v.as_u64());
                let day = config.get("day").and_then(|v| v.as_u64());
                match (month, day) {
                    (Some(month), Some(day)) => Schedule::Yearly {
                        month: month as u32,
                        day: day as u32,
                    },
                    _ => unsupported(),
                }
            }
            _ => unsupported(),
        }
    }

    /// Splits the schedule into its stored discriminator and config object.
    pub fn to_parts(&self) -> (String, serde_json::Value) {
        match self {
            Schedule::Monthly { day } => ("monthly".to_string(), json!({ "day": day })),
            Schedule::Biweekly { days } => ("biweekly".to_string(), json!({ "days": days })),
            Schedule::Weekly { weekday } => ("weekly".to_string(), json!({ "weekday": weekday })),
            Schedule::Yearly { month, day } => {
                ("yearly".to_string(), json!({ "month": month, "day": day }))
            }
            Schedule::Unsupported { kind } => (kind.clone(), json!({})),
        }
    }
}

/// Wire/storage representation of [`Schedule`].
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScheduleRepr {
    frequency_type: String,
    #[serde(default)]
    frequency_config: serde_json::Value,
}

impl From<ScheduleRepr> for Schedule {
    fn from(repr: ScheduleRepr) -> Self {
        Schedule::from_parts(&repr.frequency_type, &repr.frequency_config)
    }
}

impl From<Schedule> for ScheduleRepr {
    fn from(schedule: Schedule) -> Self {
        let (frequency_type, frequency_config) = schedule.to_parts();
        ScheduleRepr {
            frequency_type,
            frequency_config,
        }
    }
}

/// User-defined template describing a transaction that repeats on a schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringRule {
    pub id: String,
    pub user_id: String,
    pub description: String,
    pub amount: Decimal,
    pub transaction_type: TransactionType,
    #[serde(flatten)]
    pub schedule: Schedule,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub is_active: bool,
    pub last_generated_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input model for creating a new recurring rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRecurringRule {
    pub user_id: String,
    pub description: String,
    pub amount: Decimal,
    pub transaction_type: TransactionType,
    #[serde(flatten)]
    pub schedule: Schedule,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

/// Input model for editing an existing recurring rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringRuleUpdate {
    pub id: String,
    pub description: String,
    pub amount: Decimal,
    pub transaction_type: TransactionType,
    #[serde(flatten)]
    pub schedule: Schedule,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub is_active: bool,
}

/// De-duplication ledger entry: one row per rule per generated-for date.
///
/// Written only by the generation job, never updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationLogEntry {
    pub id: String,
    pub recurring_rule_id: String,
    pub generated_transaction_id: String,
    pub generated_for_date: NaiveDate,
    pub generated_at: DateTime<Utc>,
}

/// Input model for recording a generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGenerationLogEntry {
    pub recurring_rule_id: String,
    pub generated_transaction_id: String,
    pub generated_for_date: NaiveDate,
}

/// Recurring rule together with its generation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringRuleWithLogs {
    #[serde(flatten)]
    pub rule: RecurringRule,
    pub generation_logs: Vec<GenerationLogEntry>,
}

/// Per-rule result of one generation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// A transaction and log entry were created.
    Generated,
    /// The schedule does not fire on the given date.
    NotDue,
    /// A log entry already exists for (rule, date), either found up front or
    /// detected through the storage uniqueness constraint.
    AlreadyGenerated,
}

/// Summary of one generation job run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationReport {
    /// Calendar date the run generated for.
    pub date: NaiveDate,
    /// Number of eligible rules loaded.
    pub processed: usize,
    pub generated: usize,
    pub skipped: usize,
    pub failed: usize,
    /// True when the run hit its wall-clock deadline and abandoned the
    /// remaining rules.
    pub timed_out: bool,
}

impl GenerationReport {
    pub fn new(date: NaiveDate, processed: usize) -> Self {
        GenerationReport {
            date,
            processed,
            generated: 0,
            skipped: 0,
            failed: 0,
            timed_out: false,
        }
    }
}
