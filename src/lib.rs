//! # Text CNN
//!
//! Convolutional neural network for sentence classification, built on the
//! Burn framework.
//!
//! The network embeds token ids, runs one convolution + max-pool branch per
//! filter width, concatenates the pooled features, applies dropout and a
//! linear classifier, and reports softmax cross-entropy loss (with an
//! optional L2 penalty on the output layer) and accuracy.
//!
//! The crate only defines the model. Every named intermediate tensor is
//! returned from [`TextCnn::forward`] so an external training loop can
//! differentiate `loss` and step an optimizer.
//!
//! ## Modules
//!
//! - `config` - Hyperparameters and validation
//! - `feed` - Input tensors for a forward pass
//! - `model` - Network definition, loss and accuracy
//! - `checkpoint` - Saving and loading trained models
//!
//! # Example
//!
//! ```no_run
//! use burn_ndarray::NdArray;
//! use text_cnn::{Feed, TextCnn, TextCnnConfig};
//!
//! let config = TextCnnConfig::small();
//! let device = Default::default();
//! let model: TextCnn<NdArray<f32>> = TextCnn::new(&config, &device)?;
//!
//! let ids = ndarray::Array2::<u32>::zeros((4, config.sequence_length));
//! let feed = Feed::from_arrays(&ids, &[0, 1, 0, 1], config.num_classes, 1.0, &device)?;
//! let output = model.forward(&feed)?;
//! println!("loss = {}", output.loss_value());
//! # Ok::<(), text_cnn::TextCnnError>(())
//! ```

pub mod checkpoint;
pub mod config;
pub mod error;
pub mod feed;
pub mod model;

pub use checkpoint::{load_checkpoint, save_checkpoint};
pub use config::TextCnnConfig;
pub use error::{Result, TextCnnError};
pub use feed::Feed;
pub use model::{ConvMaxPool, TextCnn, TextCnnBuilder, TextCnnOutput};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
