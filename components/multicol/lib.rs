/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

#![deny(unsafe_code)]

//! Multi-column fragmentation.
//!
//! Content inside a multi-column container is laid out in a single, infinitely
//! tall column called the *flow thread*. This crate maps that flow thread onto
//! fragmentainers (columns) and back again: which column a flow-thread offset
//! belongs to, where that column ends up visually, how much a piece of content
//! needs to be translated, and how far its overflow may paint.
//!
//! A [`FlowThread`] owns its [`ColumnSet`]s, each of which owns one or more
//! [`FragmentainerGroup`]s. Layout mutates those structures directly; painting
//! and hit testing read them through the [`ColumnSetRef`] and
//! [`FragmentainerGroupRef`] views, which carry the back-references a query
//! needs, and through [`FragmentainerIterator`].

mod column_set;
mod column_set_interval_tree;
pub mod config;
mod flow_thread;
mod fragmentainer_group;
mod fragmentainer_iterator;
pub mod geom;

pub use column_set::{ColumnSet, ColumnSetRef};
pub use config::{ConfigError, MulticolConfig};
pub use flow_thread::FlowThread;
pub use fragmentainer_group::{FragmentainerGroup, FragmentainerGroupRef};
pub use fragmentainer_iterator::{Fragmentainer, FragmentainerIterator};

/// How to resolve an offset that sits exactly on the boundary between two
/// fragmentainers.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PageBoundaryRule {
    /// The boundary is the end of the earlier fragmentainer. Used for
    /// exclusive block-end offsets.
    AssociateWithFormerPage,
    /// The boundary is the start of the later fragmentainer.
    AssociateWithLatterPage,
}
