pub mod images;
pub mod videos;

pub use images::*;
pub use videos::*;
