//! Shared building blocks for the ACE alerting platform.
//!
//! Everything in this crate is free of I/O: id generation, the canonical
//! KPI identifier (slug) rule, the pure list-view helpers used by the
//! dashboard panels, and the selection-set used by batch actions.

pub mod id;
pub mod selection;
pub mod slug;
pub mod types;
pub mod view;
