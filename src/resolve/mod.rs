pub mod generative;
pub mod template;
pub mod value_source;
