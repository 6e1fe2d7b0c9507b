//! Helper functions shared by the page views and the generator

mod date;
mod html;
mod pagination;
mod text;
mod url;

pub use date::*;
pub use html::*;
pub use pagination::*;
pub use text::*;
pub use url::*;
