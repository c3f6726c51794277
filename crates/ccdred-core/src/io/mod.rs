pub mod fits;
pub mod fits_writer;
pub mod header;
mod raw;

pub use fits::{load_frame, FitsReader, ImageLayout};
pub use fits_writer::{write_frame, write_quantized};
pub use header::{Card, Header, Value};
