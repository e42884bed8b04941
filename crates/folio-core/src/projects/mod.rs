//! Project assembly, listing and pagination.
//!
//! [`ProjectService`] is the entry point. It pulls repositories from a
//! [`GitHubSource`](crate::network::GitHubSource), splits pinned from the
//! rest and converts them into UI-ready [`Project`](crate::models::Project)
//! records, with README parses cached per repository.

mod assembler;
mod paginate;
mod service;

pub use assembler::{assemble_project, extract_url_from_description, format_display_name};
pub use paginate::{split_pinned, PageRequest, PageWindow, Paginator};
pub use service::ProjectService;
