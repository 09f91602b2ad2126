//! Convolution + max-pool branch for a single filter width

use super::init::{constant_bias, truncated_normal_param};
use crate::config::TextCnnConfig;
use crate::error::Result;
use burn::{
    module::Module,
    nn::{
        conv::{Conv2d, Conv2dConfig},
        PaddingConfig2d, Relu,
    },
    tensor::{backend::Backend, Tensor},
};
use rand::rngs::StdRng;

/// Filter bank of one width sliding over the embedded sentence, followed by
/// ReLU and max-pooling over every position
#[derive(Module, Debug)]
pub struct ConvMaxPool<B: Backend> {
    conv: Conv2d<B>,
    activation: Relu,
    filter_size: usize,
    num_filters: usize,
}

impl<B: Backend> ConvMaxPool<B> {
    /// Create a branch for `filter_size` consecutive tokens
    pub fn new(
        config: &TextCnnConfig,
        filter_size: usize,
        rng: &mut StdRng,
        device: &B::Device,
    ) -> Result<Self> {
        let mut conv = Conv2dConfig::new(
            [1, config.num_filters],
            [filter_size, config.embedding_size],
        )
        .with_stride([1, 1])
        .with_padding(PaddingConfig2d::Valid)
        .init(device);

        // [out_channels, in_channels, kernel_h, kernel_w]
        conv.weight = truncated_normal_param(
            rng,
            [config.num_filters, 1, filter_size, config.embedding_size],
            config.conv_init_stddev,
            device,
        )?;
        conv.bias = Some(constant_bias(config.num_filters, config.bias_init, device));

        Ok(Self {
            conv,
            activation: Relu::new(),
            filter_size,
            num_filters: config.num_filters,
        })
    }

    /// Pool one sentence batch
    ///
    /// # Arguments
    /// * `x` - Embedded input of shape [batch_size, 1, sequence_length, embedding_size]
    ///
    /// # Returns
    /// * Pooled features of shape [batch_size, num_filters]
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 2> {
        let batch_size = x.dims()[0];

        // [batch_size, num_filters, sequence_length - filter_size + 1, 1]
        let x = self.conv.forward(x);
        let x = self.activation.forward(x);

        // Max over every position: [batch_size, num_filters, 1]
        let x = x.squeeze::<3>(3).max_dim(2);

        x.reshape([batch_size, self.num_filters])
    }

    /// Number of consecutive tokens each filter spans
    pub fn filter_size(&self) -> usize {
        self.filter_size
    }

    /// Filter weights [num_filters, 1, filter_size, embedding_size]
    pub fn weight(&self) -> Tensor<B, 4> {
        self.conv.weight.val()
    }
}
