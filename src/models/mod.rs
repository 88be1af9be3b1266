pub mod filesystem;
pub mod metric;
