pub mod mapper;
pub mod tables;

pub use mapper::{builtin_tables, CategoryMapper, Lookup, RawTables};
