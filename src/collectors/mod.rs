pub mod df;
pub mod source;
pub mod subprocess;
