//! Application use cases (generation orchestration).

mod generate_file;
mod generate_files;

pub use generate_file::*;
pub use generate_files::*;
