//! HTTP interface
//!
//! - `session`: cookie-backed session middleware and the `Session` extractor
//! - `guards`: anonymous / login / owner gates as route middleware
//! - `modules`: page handlers, health, metrics, request ids
//! - `render`: template renderer seam and `Page`
//! - `router`: route table and middleware stack

pub mod common;
pub mod error;
pub mod guards;
pub mod modules;
pub mod render;
pub mod router;
pub mod routes;
pub mod session;
pub mod state;

pub use error::WebError;
pub use render::{JsonPageRenderer, Page, TemplateRenderer};
pub use router::{create_app, create_router};
pub use routes::Route;
pub use state::{AppState, SessionCookie};
