//! Helper functions shared by the renderer, generator and server
//!
//! These cover URL generation, HTML escaping and date formatting.

mod date;
mod html;
mod url;

pub use date::*;
pub use html::*;
pub use url::*;
