//! Stylesheet scanning and value tokenizing.

mod scanner;
mod tokenizer;

pub use scanner::{Declaration, scan_declarations};
pub use tokenizer::{split_arguments, split_top_level, unwrap_function};
