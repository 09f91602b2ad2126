//! Saving and loading trained models
//!
//! A checkpoint is a directory holding `config.json` and the Burn record of
//! the parameters (`model.mpk`).

use crate::config::TextCnnConfig;
use crate::error::{Result, TextCnnError};
use crate::model::TextCnn;
use burn::{
    module::Module,
    record::{FullPrecisionSettings, NamedMpkFileRecorder},
    tensor::backend::Backend,
};
use std::fs;
use std::path::Path;
use tracing::info;

const CONFIG_FILE: &str = "config.json";
const MODEL_FILE: &str = "model";

/// Write the configuration and parameters of `model` into `dir`
pub fn save_checkpoint<B: Backend, P: AsRef<Path>>(
    model: &TextCnn<B>,
    config: &TextCnnConfig,
    dir: P,
) -> Result<()> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    config.save(dir.join(CONFIG_FILE))?;

    let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
    model
        .clone()
        .save_file(dir.join(MODEL_FILE), &recorder)
        .map_err(|e| TextCnnError::Record(format!("{:?}", e)))?;

    info!("Saved checkpoint to {}", dir.display());
    Ok(())
}

/// Rebuild a model from a checkpoint directory
pub fn load_checkpoint<B: Backend, P: AsRef<Path>>(
    dir: P,
    device: &B::Device,
) -> Result<(TextCnn<B>, TextCnnConfig)> {
    let dir = dir.as_ref();
    let config = TextCnnConfig::load(dir.join(CONFIG_FILE))?;

    // Parameters come from the record, so the backend RNG is left unseeded
    let unseeded = TextCnnConfig {
        seed: None,
        ..config.clone()
    };
    let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
    let model = TextCnn::new(&unseeded, device)?
        .load_file(dir.join(MODEL_FILE), &recorder, device)
        .map_err(|e| TextCnnError::Record(format!("{:?}", e)))?;

    info!("Loaded checkpoint from {}", dir.display());
    Ok((model, config))
}
