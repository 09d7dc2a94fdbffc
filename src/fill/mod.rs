pub mod filler;
pub mod policy;
