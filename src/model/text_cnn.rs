//! Text CNN architecture
//!
//! embedding -> [conv + relu + max-pool per filter width] -> concat
//! -> dropout -> linear -> softmax cross-entropy

use super::branch::ConvMaxPool;
use super::init::{constant_bias, init_rng};
use super::loss::{accuracy, argmax_rows, dropout, l2_loss, softmax_cross_entropy_with_logits};
use crate::config::TextCnnConfig;
use crate::error::{Result, TextCnnError};
use crate::feed::Feed;
use burn::{
    module::Module,
    nn::{Embedding, EmbeddingConfig, Initializer, Linear, LinearConfig},
    tensor::{activation::softmax, backend::Backend, ElementConversion, Int, Tensor},
};
use tracing::{debug, debug_span, info};

/// CNN for sentence classification
#[derive(Module, Debug)]
pub struct TextCnn<B: Backend> {
    /// Token embedding table [vocab_size, embedding_size]
    embedding: Embedding<B>,
    /// One convolution + max-pool branch per filter width
    branches: Vec<ConvMaxPool<B>>,
    /// Output projection [num_filters_total, num_classes]
    output: Linear<B>,
    sequence_length: usize,
    vocab_size: usize,
    num_classes: usize,
    num_filters_total: usize,
    l2_reg_lambda: f64,
}

/// Named tensors of one forward pass
#[derive(Debug, Clone)]
pub struct TextCnnOutput<B: Backend> {
    /// Looked-up embeddings [batch_size, sequence_length, embedding_size]
    pub embedded_chars: Tensor<B, 3>,
    /// Concatenated pooled features [batch_size, num_filters_total]
    pub h_pool_flat: Tensor<B, 2>,
    /// Features after dropout [batch_size, num_filters_total]
    pub h_drop: Tensor<B, 2>,
    /// Unnormalized class scores [batch_size, num_classes]
    pub scores: Tensor<B, 2>,
    /// Arg-max of the scores [batch_size]
    pub predictions: Tensor<B, 1, Int>,
    /// Output-layer L2 term, unscaled
    pub l2_loss: Tensor<B, 1>,
    /// Mean cross-entropy plus `l2_reg_lambda * l2_loss`
    pub loss: Tensor<B, 1>,
    /// Fraction of correct predictions
    pub accuracy: Tensor<B, 1>,
}

impl<B: Backend> TextCnnOutput<B> {
    /// Loss as a host scalar
    pub fn loss_value(&self) -> f32 {
        self.loss.clone().into_scalar().elem::<f32>()
    }

    /// Accuracy as a host scalar
    pub fn accuracy_value(&self) -> f32 {
        self.accuracy.clone().into_scalar().elem::<f32>()
    }
}

impl<B: Backend> TextCnn<B> {
    /// Build and initialize a model
    pub fn new(config: &TextCnnConfig, device: &B::Device) -> Result<Self> {
        config.validate()?;

        if let Some(seed) = config.seed {
            B::seed(seed);
        }
        let mut rng = init_rng(config.seed);

        let range = config.embedding_init_range;
        let embedding = EmbeddingConfig::new(config.vocab_size, config.embedding_size)
            .with_initializer(Initializer::Uniform {
                min: -range,
                max: range,
            })
            .init(device);

        let branches = config
            .filter_sizes
            .iter()
            .map(|&filter_size| ConvMaxPool::new(config, filter_size, &mut rng, device))
            .collect::<Result<Vec<_>>>()?;

        let mut output = LinearConfig::new(config.num_filters_total(), config.num_classes)
            .with_initializer(Initializer::XavierUniform { gain: 1.0 })
            .init(device);
        output.bias = Some(constant_bias(config.num_classes, config.bias_init, device));

        let model = Self {
            embedding,
            branches,
            output,
            sequence_length: config.sequence_length,
            vocab_size: config.vocab_size,
            num_classes: config.num_classes,
            num_filters_total: config.num_filters_total(),
            l2_reg_lambda: config.l2_reg_lambda,
        };

        info!(
            "Built TextCnn: sequence_length={}, vocab_size={}, embedding_size={}, filter_sizes={:?}, num_filters={}, num_classes={}, parameters={}",
            config.sequence_length,
            config.vocab_size,
            config.embedding_size,
            config.filter_sizes,
            config.num_filters,
            config.num_classes,
            model.num_params()
        );

        Ok(model)
    }

    /// Run the whole graph on a feed
    pub fn forward(&self, feed: &Feed<B>) -> Result<TextCnnOutput<B>> {
        let [batch_size, num_classes] = feed.input_y.dims();
        let inputs = feed.input_x.dims()[0];
        if batch_size != inputs {
            return Err(TextCnnError::BatchMismatch {
                inputs,
                labels: batch_size,
            });
        }
        if num_classes != self.num_classes {
            return Err(TextCnnError::ClassCount {
                expected: self.num_classes,
                actual: num_classes,
            });
        }
        check_keep_prob(feed.dropout_keep_prob)?;

        let embedded_chars = self.embed(feed.input_x.clone())?;
        let h_pool_flat = self.pool(embedded_chars.clone());

        let h_drop = {
            let _scope = debug_span!("dropout").entered();
            dropout(h_pool_flat.clone(), feed.dropout_keep_prob)
        };

        let (scores, predictions, l2) = {
            let _scope = debug_span!("output").entered();
            let scores = self.output.forward(h_drop.clone());
            let predictions = argmax_rows(scores.clone());
            (scores, predictions, self.l2_loss())
        };

        let loss = {
            let _scope = debug_span!("loss").entered();
            let losses = softmax_cross_entropy_with_logits(scores.clone(), feed.input_y.clone());
            losses.mean() + l2.clone().mul_scalar(self.l2_reg_lambda)
        };

        let accuracy = {
            let _scope = debug_span!("accuracy").entered();
            accuracy(predictions.clone(), feed.input_y.clone())
        };

        Ok(TextCnnOutput {
            embedded_chars,
            h_pool_flat,
            h_drop,
            scores,
            predictions,
            l2_loss: l2,
            loss,
            accuracy,
        })
    }

    /// Pooled feature vector `h_pool_flat` [batch_size, num_filters_total]
    pub fn features(&self, input_x: Tensor<B, 2, Int>) -> Result<Tensor<B, 2>> {
        let embedded = self.embed(input_x)?;
        Ok(self.pool(embedded))
    }

    /// Class scores with dropout at `keep_prob`
    pub fn scores(&self, input_x: Tensor<B, 2, Int>, keep_prob: f64) -> Result<Tensor<B, 2>> {
        check_keep_prob(keep_prob)?;
        let features = self.features(input_x)?;
        Ok(self.output.forward(dropout(features, keep_prob)))
    }

    /// Predicted class per sentence, dropout disabled
    pub fn predict(&self, input_x: Tensor<B, 2, Int>) -> Result<Tensor<B, 1, Int>> {
        Ok(argmax_rows(self.scores(input_x, 1.0)?))
    }

    /// Class probabilities per sentence, dropout disabled
    pub fn predict_proba(&self, input_x: Tensor<B, 2, Int>) -> Result<Tensor<B, 2>> {
        Ok(softmax(self.scores(input_x, 1.0)?, 1))
    }

    /// `sum(W²)/2 + sum(b²)/2` over the output layer only
    pub fn l2_loss(&self) -> Tensor<B, 1> {
        let weight = l2_loss(self.output.weight.val());
        match &self.output.bias {
            Some(bias) => weight + l2_loss(bias.val()),
            None => weight,
        }
    }

    /// Embedding table [vocab_size, embedding_size]
    pub fn embedding_weight(&self) -> Tensor<B, 2> {
        self.embedding.weight.val()
    }

    /// Output weights [num_filters_total, num_classes]
    pub fn output_weight(&self) -> Tensor<B, 2> {
        self.output.weight.val()
    }

    /// Output bias [num_classes]
    pub fn output_bias(&self) -> Option<Tensor<B, 1>> {
        self.output.bias.as_ref().map(|bias| bias.val())
    }

    /// Convolution branches in filter-size order
    pub fn branches(&self) -> &[ConvMaxPool<B>] {
        &self.branches
    }

    /// Filter widths in branch order
    pub fn filter_sizes(&self) -> Vec<usize> {
        self.branches.iter().map(|b| b.filter_size()).collect()
    }

    /// Padded sentence length the model accepts
    pub fn sequence_length(&self) -> usize {
        self.sequence_length
    }

    /// Number of output classes
    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    /// Width of the concatenated feature vector
    pub fn num_filters_total(&self) -> usize {
        self.num_filters_total
    }

    fn embed(&self, input_x: Tensor<B, 2, Int>) -> Result<Tensor<B, 3>> {
        let _scope = debug_span!("embedding").entered();
        self.check_input(&input_x)?;
        Ok(self.embedding.forward(input_x))
    }

    fn pool(&self, embedded: Tensor<B, 3>) -> Tensor<B, 2> {
        // Single input channel: [batch_size, 1, sequence_length, embedding_size]
        let expanded: Tensor<B, 4> = embedded.unsqueeze_dim(1);

        let pooled = self
            .branches
            .iter()
            .map(|branch| {
                let _scope = debug_span!("conv-maxpool", filter_size = branch.filter_size()).entered();
                branch.forward(expanded.clone())
            })
            .collect::<Vec<_>>();

        let h_pool_flat = Tensor::cat(pooled, 1);
        debug!("h_pool_flat shape: {:?}", h_pool_flat.dims());
        h_pool_flat
    }

    fn check_input(&self, input_x: &Tensor<B, 2, Int>) -> Result<()> {
        let [batch_size, sequence_length] = input_x.dims();
        if batch_size == 0 {
            return Err(TextCnnError::EmptyBatch);
        }
        if sequence_length != self.sequence_length {
            return Err(TextCnnError::SequenceLength {
                expected: self.sequence_length,
                actual: sequence_length,
            });
        }

        let min = input_x.clone().min().into_scalar().elem::<i64>();
        let max = input_x.clone().max().into_scalar().elem::<i64>();
        for id in [min, max] {
            if id < 0 || id as usize >= self.vocab_size {
                return Err(TextCnnError::TokenOutOfRange {
                    id,
                    vocab_size: self.vocab_size,
                });
            }
        }
        Ok(())
    }
}

fn check_keep_prob(keep_prob: f64) -> Result<()> {
    if keep_prob > 0.0 && keep_prob <= 1.0 {
        Ok(())
    } else {
        Err(TextCnnError::KeepProbability(keep_prob))
    }
}

/// Fluent construction over [`TextCnnConfig`]
pub struct TextCnnBuilder {
    config: TextCnnConfig,
}

impl TextCnnBuilder {
    /// Start from the default configuration
    pub fn new() -> Self {
        Self {
            config: TextCnnConfig::default(),
        }
    }

    /// Start from an existing configuration
    pub fn from_config(config: TextCnnConfig) -> Self {
        Self { config }
    }

    /// Set the padded sentence length
    pub fn sequence_length(mut self, length: usize) -> Self {
        self.config.sequence_length = length;
        self
    }

    /// Set the number of output classes
    pub fn num_classes(mut self, classes: usize) -> Self {
        self.config.num_classes = classes;
        self
    }

    /// Set the number of rows in the embedding table
    pub fn vocab_size(mut self, size: usize) -> Self {
        self.config.vocab_size = size;
        self
    }

    /// Set the embedding dimension
    pub fn embedding_size(mut self, size: usize) -> Self {
        self.config.embedding_size = size;
        self
    }

    /// Filter widths and the number of filters per width
    pub fn filters(mut self, sizes: &[usize], num_filters: usize) -> Self {
        self.config.filter_sizes = sizes.to_vec();
        self.config.num_filters = num_filters;
        self
    }

    /// Set the scale of the output-layer L2 penalty
    pub fn l2_reg_lambda(mut self, lambda: f64) -> Self {
        self.config.l2_reg_lambda = lambda;
        self
    }

    /// Seed parameter initialization
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Configuration built so far
    pub fn config(&self) -> &TextCnnConfig {
        &self.config
    }

    /// Build the model
    pub fn build<B: Backend>(self, device: &B::Device) -> Result<TextCnn<B>> {
        TextCnn::new(&self.config, device)
    }
}

impl Default for TextCnnBuilder {
    fn default() -> Self {
        Self::new()
    }
}
