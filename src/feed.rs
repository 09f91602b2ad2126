//! Input tensors for one forward pass

use crate::error::{Result, TextCnnError};
use burn::tensor::{backend::Backend, Int, Tensor, TensorData};
use ndarray::Array2;

/// Token ids, labels and dropout keep probability fed to
/// [`crate::TextCnn::forward`]
#[derive(Debug, Clone)]
pub struct Feed<B: Backend> {
    /// Token ids [batch_size, sequence_length]
    pub input_x: Tensor<B, 2, Int>,
    /// Label distribution, usually one-hot [batch_size, num_classes]
    pub input_y: Tensor<B, 2>,
    /// Probability of keeping a pooled feature; 1.0 disables dropout
    pub dropout_keep_prob: f64,
}

impl<B: Backend> Feed<B> {
    /// Feed from tensors already on the device; use a keep probability of
    /// 1.0 for evaluation
    pub fn new(input_x: Tensor<B, 2, Int>, input_y: Tensor<B, 2>, dropout_keep_prob: f64) -> Self {
        Self {
            input_x,
            input_y,
            dropout_keep_prob,
        }
    }

    /// Build a feed from host arrays, one-hot encoding class indices
    pub fn from_arrays(
        ids: &Array2<u32>,
        labels: &[usize],
        num_classes: usize,
        dropout_keep_prob: f64,
        device: &B::Device,
    ) -> Result<Self> {
        let (batch_size, sequence_length) = ids.dim();
        if batch_size == 0 {
            return Err(TextCnnError::EmptyBatch);
        }
        if labels.len() != batch_size {
            return Err(TextCnnError::BatchMismatch {
                inputs: batch_size,
                labels: labels.len(),
            });
        }

        let mut one_hot = vec![0.0f32; batch_size * num_classes];
        for (row, &label) in labels.iter().enumerate() {
            if label >= num_classes {
                return Err(TextCnnError::LabelOutOfRange { label, num_classes });
            }
            one_hot[row * num_classes + label] = 1.0;
        }

        let token_ids: Vec<i64> = ids.iter().map(|&id| id as i64).collect();
        let input_x = Tensor::from_data(
            TensorData::new(token_ids, [batch_size, sequence_length]),
            device,
        );
        let input_y = Tensor::from_data(TensorData::new(one_hot, [batch_size, num_classes]), device);

        Ok(Self::new(input_x, input_y, dropout_keep_prob))
    }

    /// Same inputs with a different keep probability
    pub fn with_keep_prob(mut self, dropout_keep_prob: f64) -> Self {
        self.dropout_keep_prob = dropout_keep_prob;
        self
    }

    /// Number of sentences
    pub fn batch_size(&self) -> usize {
        self.input_x.dims()[0]
    }
}
