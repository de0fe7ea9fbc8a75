//! Routing module
//!
//! The content router: the menu table mapping request paths to content
//! entries, query-string parsing against the parameter allow-list, and
//! resolution of a request into a render context.

mod menu;
mod query;
mod resolver;

pub use menu::{Menu, MenuEntry};
pub use resolver::{error_context, resolve, RenderContext, ResolvedRequest, ERROR_PAGE};
