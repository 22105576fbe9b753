//! Domain logic of the admission portal: contexts, tabs, permissions,
//! business errors, wizard forms and dynamic questions. No IO.

pub mod admission;
pub mod business;
pub mod context;
pub mod error;
pub mod forms;
pub mod permissions;
pub mod questions;
pub mod tabs;
pub mod types;
