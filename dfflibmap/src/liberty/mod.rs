// SPDX-License-Identifier: Apache-2.0

mod ascii_stream;
pub mod liberty_parser;
pub mod load;
pub use liberty_parser::{Block, BlockAttr, BlockMember, LibertyParser, Value};
pub use load::{parse_liberty_file, parse_liberty_str};
