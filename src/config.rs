//! Model configuration

use crate::error::{Result, TextCnnError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::warn;

/// Hyperparameters of the text CNN
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextCnnConfig {
    /// Padded sentence length in tokens
    pub sequence_length: usize,
    /// Number of output classes
    pub num_classes: usize,
    /// Number of rows in the embedding table
    pub vocab_size: usize,
    /// Embedding dimension
    pub embedding_size: usize,
    /// Filter widths, one convolution branch per entry
    pub filter_sizes: Vec<usize>,
    /// Filters per width
    pub num_filters: usize,
    /// Scale of the output-layer L2 penalty
    pub l2_reg_lambda: f64,
    /// Keep probability fed to dropout while training
    pub dropout_keep_prob: f64,
    /// Embedding weights are drawn from U(-range, range)
    pub embedding_init_range: f64,
    /// Standard deviation of the truncated normal filter initializer
    pub conv_init_stddev: f64,
    /// Constant initial value of convolution and output biases
    pub bias_init: f64,
    /// Seed for parameter initialization
    pub seed: Option<u64>,
}

impl Default for TextCnnConfig {
    fn default() -> Self {
        Self {
            sequence_length: 59,
            num_classes: 2,
            vocab_size: 20_000,
            embedding_size: 128,
            filter_sizes: vec![3, 4, 5],
            num_filters: 128,
            l2_reg_lambda: 0.0,
            dropout_keep_prob: 0.5,
            embedding_init_range: 1.0,
            conv_init_stddev: 0.1,
            bias_init: 0.1,
            seed: None,
        }
    }
}

impl TextCnnConfig {
    /// Small model for quick experiments
    pub fn small() -> Self {
        Self {
            sequence_length: 16,
            vocab_size: 100,
            embedding_size: 8,
            filter_sizes: vec![2, 3],
            num_filters: 4,
            ..Default::default()
        }
    }

    /// Width of the concatenated feature vector
    pub fn num_filters_total(&self) -> usize {
        self.num_filters * self.filter_sizes.len()
    }

    /// Length of a VALID convolution over the sequence, which is also the
    /// max-pool window for that branch
    ///
    /// `None` when a filter of this width does not fit in the sequence.
    pub fn pooled_length(&self, filter_size: usize) -> Option<usize> {
        if filter_size == 0 {
            return None;
        }
        (self.sequence_length + 1)
            .checked_sub(filter_size)
            .filter(|&length| length > 0)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.sequence_length == 0 {
            return Err(invalid("sequence_length must be > 0"));
        }
        if self.num_classes < 2 {
            return Err(invalid("num_classes must be >= 2"));
        }
        if self.vocab_size == 0 {
            return Err(invalid("vocab_size must be > 0"));
        }
        if self.embedding_size == 0 {
            return Err(invalid("embedding_size must be > 0"));
        }
        if self.num_filters == 0 {
            return Err(invalid("num_filters must be > 0"));
        }
        if self.filter_sizes.is_empty() {
            return Err(invalid("filter_sizes must not be empty"));
        }
        for &size in &self.filter_sizes {
            if self.pooled_length(size).is_none() {
                return Err(TextCnnError::Config(format!(
                    "filter size {} must be in [1, {}]",
                    size, self.sequence_length
                )));
            }
        }
        if !self.l2_reg_lambda.is_finite() || self.l2_reg_lambda < 0.0 {
            return Err(invalid("l2_reg_lambda must be finite and >= 0"));
        }
        if !(self.dropout_keep_prob > 0.0 && self.dropout_keep_prob <= 1.0) {
            return Err(TextCnnError::KeepProbability(self.dropout_keep_prob));
        }
        if !self.embedding_init_range.is_finite() || self.embedding_init_range <= 0.0 {
            return Err(invalid("embedding_init_range must be finite and > 0"));
        }
        if !self.conv_init_stddev.is_finite() || self.conv_init_stddev <= 0.0 {
            return Err(invalid("conv_init_stddev must be finite and > 0"));
        }
        if !self.bias_init.is_finite() {
            return Err(invalid("bias_init must be finite"));
        }

        let unique: HashSet<_> = self.filter_sizes.iter().collect();
        if unique.len() != self.filter_sizes.len() {
            warn!(
                "Duplicate filter sizes {:?}: branches of equal width are trained independently",
                self.filter_sizes
            );
        }

        Ok(())
    }

    /// Write the configuration as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Read and validate a JSON configuration
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }
}

fn invalid(message: &str) -> TextCnnError {
    TextCnnError::Config(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TextCnnConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.num_filters_total(), 384);
    }

    #[test]
    fn test_small_config() {
        let config = TextCnnConfig::small();
        assert!(config.validate().is_ok());
        assert_eq!(config.num_filters_total(), 8);
        assert_eq!(config.pooled_length(3), Some(14));
    }

    #[test]
    fn test_filter_wider_than_sequence() {
        let config = TextCnnConfig {
            sequence_length: 4,
            filter_sizes: vec![3, 5],
            ..TextCnnConfig::small()
        };
        assert!(matches!(config.validate(), Err(TextCnnError::Config(_))));
    }

    #[test]
    fn test_filter_equal_to_sequence() {
        let config = TextCnnConfig {
            sequence_length: 5,
            filter_sizes: vec![5],
            ..TextCnnConfig::small()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.pooled_length(5), Some(1));
    }

    #[test]
    fn test_invalid_keep_prob() {
        for keep_prob in [0.0, -0.5, 1.5, f64::NAN] {
            let config = TextCnnConfig {
                dropout_keep_prob: keep_prob,
                ..TextCnnConfig::small()
            };
            assert!(matches!(
                config.validate(),
                Err(TextCnnError::KeepProbability(_))
            ));
        }
    }

    #[test]
    fn test_invalid_dimensions() {
        let cases = [
            TextCnnConfig { num_classes: 1, ..TextCnnConfig::small() },
            TextCnnConfig { vocab_size: 0, ..TextCnnConfig::small() },
            TextCnnConfig { embedding_size: 0, ..TextCnnConfig::small() },
            TextCnnConfig { num_filters: 0, ..TextCnnConfig::small() },
            TextCnnConfig { filter_sizes: vec![], ..TextCnnConfig::small() },
            TextCnnConfig { filter_sizes: vec![0], ..TextCnnConfig::small() },
            TextCnnConfig { l2_reg_lambda: -1.0, ..TextCnnConfig::small() },
            TextCnnConfig { conv_init_stddev: 0.0, ..TextCnnConfig::small() },
        ];
        for config in cases {
            assert!(config.validate().is_err(), "{:?} should be rejected", config);
        }
    }

    #[test]
    fn test_pooled_length_out_of_range() {
        let config = TextCnnConfig::small();
        assert_eq!(config.pooled_length(16), Some(1));
        assert_eq!(config.pooled_length(17), None);
        assert_eq!(config.pooled_length(100), None);
        assert_eq!(config.pooled_length(0), None);
    }

    #[test]
    fn test_non_finite_init_parameters() {
        let cases = [
            TextCnnConfig { conv_init_stddev: f64::INFINITY, ..TextCnnConfig::small() },
            TextCnnConfig { conv_init_stddev: f64::NAN, ..TextCnnConfig::small() },
            TextCnnConfig { embedding_init_range: f64::INFINITY, ..TextCnnConfig::small() },
            TextCnnConfig { embedding_init_range: -1.0, ..TextCnnConfig::small() },
            TextCnnConfig { bias_init: f64::NAN, ..TextCnnConfig::small() },
        ];
        for config in cases {
            assert!(
                matches!(config.validate(), Err(TextCnnError::Config(_))),
                "{:?} should be rejected",
                config
            );
        }
    }

    #[test]
    fn test_json_roundtrip_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let config = TextCnnConfig {
            l2_reg_lambda: 0.1,
            seed: Some(7),
            ..TextCnnConfig::small()
        };
        config.save(&path).unwrap();
        assert_eq!(TextCnnConfig::load(&path).unwrap(), config);

        // Missing fields fall back to defaults
        let partial: TextCnnConfig = serde_json::from_str(r#"{"num_classes": 5}"#).unwrap();
        assert_eq!(partial.num_classes, 5);
        assert_eq!(partial.filter_sizes, vec![3, 4, 5]);
    }

    #[test]
    fn test_load_rejects_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"num_filters": 0}"#).unwrap();
        assert!(TextCnnConfig::load(&path).is_err());
    }
}
