//! End-to-end scenarios grouped by component.

pub mod map_groups;
pub mod properties;
