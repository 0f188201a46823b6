//! Service layer for business logic
//!
//! HTTP handlers call into these services; storage access and
//! policy (`LinkSettings`) are injected at construction.

mod analytics_service;
pub mod code_generator;
mod link_service;
mod pagination;
mod redirect;

pub use analytics_service::*;
pub use code_generator::{CodeGenerator, RandomHexGenerator};
pub use link_service::*;
pub use pagination::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, Page, normalize_page};
pub use redirect::*;
