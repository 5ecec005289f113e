pub(crate) mod model;
mod repository;

pub use model::CategoryDB;
pub use repository::CategoryRepository;
