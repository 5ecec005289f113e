use std::sync::Arc;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;
use tobby_core::categories::{CategoryService, CategoryServiceTrait};
use tobby_core::recurring::{
    GenerationService, GenerationServiceTrait, RecurringService, RecurringServiceTrait,
};
use tobby_core::transactions::{TransactionService, TransactionServiceTrait};
use tobby_storage_sqlite::categories::CategoryRepository;
use tobby_storage_sqlite::db::{self, write_actor};
use tobby_storage_sqlite::recurring::{GenerationLogRepository, RecurringRuleRepository};
use tobby_storage_sqlite::transactions::TransactionRepository;

pub struct AppState {
    pub transaction_service: Arc<dyn TransactionServiceTrait + Send + Sync>,
    pub category_service: Arc<dyn CategoryServiceTrait + Send + Sync>,
    pub recurring_service: Arc<dyn RecurringServiceTrait + Send + Sync>,
    pub generation_service: Arc<dyn GenerationServiceTrait + Send + Sync>,
    pub db_path: String,
}

pub fn init_tracing() {
    let log_format = std::env::var("TOBBY_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = write_actor::spawn_writer((*pool).clone());

    let transaction_repo = Arc::new(TransactionRepository::new(pool.clone(), writer.clone()));
    let category_repo = Arc::new(CategoryRepository::new(pool.clone(), writer.clone()));
    let rule_repo = Arc::new(RecurringRuleRepository::new(pool.clone(), writer.clone()));
    let log_repo = Arc::new(GenerationLogRepository::new(pool.clone(), writer.clone()));

    let transaction_service = Arc::new(TransactionService::new(transaction_repo.clone()));
    let category_service = Arc::new(CategoryService::new(category_repo));
    let recurring_service = Arc::new(RecurringService::new(rule_repo.clone(), log_repo.clone()));
    let generation_service = Arc::new(
        GenerationService::new(rule_repo, transaction_repo, log_repo)
            .with_job_timeout(config.job_timeout),
    );

    Ok(Arc::new(AppState {
        transaction_service,
        category_service,
        recurring_service,
        generation_service,
        db_path,
    }))
}
