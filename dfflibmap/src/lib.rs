// SPDX-License-Identifier: Apache-2.0

//! Technology mapping of generic flip-flops onto sequential cells described
//! by a Liberty library.

pub mod dff;
pub mod error;
pub mod liberty;
pub mod netlist;
pub mod pass;

pub use error::{DffLibMapError, Result};
pub use pass::{
    build_mapping, load_library, run_dfflibmap, run_dfflibmap_with_options, DffLibMapContext,
    DffLibMapOptions, DffLibMapReport,
};
