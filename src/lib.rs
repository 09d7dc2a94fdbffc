pub mod cli;
pub mod detect;
pub mod dom;
pub mod error;
pub mod fill;
pub mod message;
pub mod page;
pub mod resolve;
pub mod store;
pub mod trace;

pub use crate::detect::detector::detect;
pub use crate::detect::field_model::{FieldDescriptor, FieldKind};
pub use crate::dom::document::{Document, EventApi, WriteOp};
pub use crate::error::FillError;
pub use crate::fill::filler::{run_fill, FillReport};
pub use crate::message::router::{Router, Settings};
pub use crate::resolve::value_source::{PageContext, ResolvedValue, ValueSource};
pub use crate::store::templates::Template;
