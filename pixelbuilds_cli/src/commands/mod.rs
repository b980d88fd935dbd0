pub mod devices;
pub mod once;
pub mod serve;
pub mod validate;
