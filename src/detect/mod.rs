pub mod detector;
pub mod field_model;
pub mod label;
