mod model;
mod repository;

pub use model::{GenerationLogDB, RecurringRuleDB};
pub use repository::{GenerationLogRepository, RecurringRuleRepository};
