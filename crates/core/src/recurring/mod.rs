//! Recurring transactions module - schedules, rules, and the generation job.

mod generation_service;
mod recurring_model;
mod recurring_service;
mod recurring_traits;
mod schedule;

pub use generation_service::{GenerationService, DEFAULT_JOB_TIMEOUT};
pub use recurring_model::{
    GenerationLogEntry, GenerationOutcome, GenerationReport, NewGenerationLogEntry,
    NewRecurringRule, RecurringRule, RecurringRuleUpdate, RecurringRuleWithLogs, Schedule,
};
pub use recurring_service::RecurringService;
pub use recurring_traits::{
    GenerationLogRepositoryTrait, GenerationServiceTrait, RecurringRuleRepositoryTrait,
    RecurringServiceTrait,
};
