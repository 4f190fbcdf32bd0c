// SPDX-License-Identifier: Apache-2.0

pub mod expand;
pub mod mapping;
pub mod matcher;
pub mod port;
pub mod rewrite;
pub mod shape;

pub use mapping::MappingTable;
pub use port::{CellMatch, PinRole, PortRole, PortTable};
pub use shape::FlipFlopShape;
