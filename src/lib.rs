pub mod article;
pub mod config;
pub mod document;
pub mod error;
pub mod excerpt;
pub mod front_matter;
pub mod permalink;
pub mod ssg;
pub mod store;

pub use article::PostRecord;
pub use error::{Error, Result};
