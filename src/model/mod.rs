//! Text CNN model built on the Burn framework

mod branch;
mod init;
pub mod loss;
mod text_cnn;

pub use branch::ConvMaxPool;
pub use text_cnn::{TextCnn, TextCnnBuilder, TextCnnOutput};
