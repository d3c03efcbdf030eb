pub mod sqlite;

pub use sqlite::SqliteContentStore;
