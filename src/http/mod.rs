//! HTTP protocol layer module
//!
//! Response builders and MIME mapping, decoupled from the dispatch logic
//! in `handler`.

pub mod mime;
pub mod response;

// Re-export commonly used builders
pub use response::{
    build_403_response, build_404_response, build_405_response, build_500_response,
    build_redirect_response,
};
