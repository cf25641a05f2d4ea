pub mod collection;
pub mod database;
pub mod databases;

pub use collection::{read_collection, CollectionError, CollectionResult};
pub use database::{database_to_record, DatabaseDataSource};
pub use databases::DatabasesDataSource;
