//! Loss, regularization and accuracy

use burn::tensor::{activation::log_softmax, backend::Backend, Distribution, Int, Tensor};

/// Half the sum of squares of every element
pub fn l2_loss<B: Backend, const D: usize>(tensor: Tensor<B, D>) -> Tensor<B, 1> {
    (tensor.clone() * tensor).sum().div_scalar(2.0)
}

/// Per-example cross-entropy between softmax(logits) and a label
/// distribution
///
/// # Arguments
/// * `logits` - Unnormalized scores of shape [batch_size, num_classes]
/// * `labels` - One-hot (or soft) labels of shape [batch_size, num_classes]
///
/// # Returns
/// * Losses of shape [batch_size]
pub fn softmax_cross_entropy_with_logits<B: Backend>(
    logits: Tensor<B, 2>,
    labels: Tensor<B, 2>,
) -> Tensor<B, 1> {
    let log_probs = log_softmax(logits, 1);
    (labels * log_probs).sum_dim(1).squeeze::<1>(1).neg()
}

/// Index of the largest entry of each row
pub fn argmax_rows<B: Backend>(tensor: Tensor<B, 2>) -> Tensor<B, 1, Int> {
    tensor.argmax(1).squeeze::<1>(1)
}

/// Fraction of rows where the predicted class equals the label's arg-max
pub fn accuracy<B: Backend>(predictions: Tensor<B, 1, Int>, labels: Tensor<B, 2>) -> Tensor<B, 1> {
    predictions.equal(argmax_rows(labels)).float().mean()
}

/// Inverted dropout: keep each entry with probability `keep_prob` and scale
/// kept entries by `1 / keep_prob`
pub fn dropout<B: Backend, const D: usize>(tensor: Tensor<B, D>, keep_prob: f64) -> Tensor<B, D> {
    if keep_prob >= 1.0 {
        return tensor;
    }
    let mask = tensor.random_like(Distribution::Bernoulli(keep_prob));
    (tensor * mask).div_scalar(keep_prob)
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::tensor::{ElementConversion, TensorData};
    use burn_ndarray::NdArray;

    type TestBackend = NdArray<f32>;

    fn tensor2(values: Vec<f32>, shape: [usize; 2]) -> Tensor<TestBackend, 2> {
        Tensor::from_data(TensorData::new(values, shape), &Default::default())
    }

    #[test]
    fn test_l2_loss() {
        let device = Default::default();
        let t = Tensor::<TestBackend, 1>::from_floats([1.0, 2.0, 3.0], &device);
        let value = l2_loss(t).into_scalar().elem::<f32>();
        assert!((value - 7.0).abs() < 1e-6);
    }

    #[test]
    fn test_uniform_logits_cross_entropy() {
        let logits = tensor2(vec![0.0, 0.0, 0.0, 0.0], [2, 2]);
        let labels = tensor2(vec![1.0, 0.0, 0.0, 1.0], [2, 2]);
        let losses: Vec<f32> = softmax_cross_entropy_with_logits(logits, labels)
            .into_data()
            .to_vec()
            .unwrap();

        assert_eq!(losses.len(), 2);
        for loss in losses {
            assert!((loss - std::f32::consts::LN_2).abs() < 1e-5);
        }
    }

    #[test]
    fn test_confident_prediction_has_low_loss() {
        let logits = tensor2(vec![10.0, -10.0, -10.0, 10.0], [2, 2]);
        let right = tensor2(vec![1.0, 0.0, 0.0, 1.0], [2, 2]);
        let wrong = tensor2(vec![0.0, 1.0, 1.0, 0.0], [2, 2]);

        let low = softmax_cross_entropy_with_logits(logits.clone(), right)
            .mean()
            .into_scalar()
            .elem::<f32>();
        let high = softmax_cross_entropy_with_logits(logits, wrong)
            .mean()
            .into_scalar()
            .elem::<f32>();

        assert!(low < 1e-3);
        assert!((high - 20.0).abs() < 1e-2);
    }

    #[test]
    fn test_soft_labels() {
        let logits = tensor2(vec![1.0, 2.0, 3.0], [1, 3]);
        let labels = tensor2(vec![0.2, 0.3, 0.5], [1, 3]);
        let loss = softmax_cross_entropy_with_logits(logits, labels)
            .into_scalar()
            .elem::<f32>();

        let norm = (1.0f32.exp() + 2.0f32.exp() + 3.0f32.exp()).ln();
        let expected = 0.2 * (norm - 1.0) + 0.3 * (norm - 2.0) + 0.5 * (norm - 3.0);
        assert!((loss - expected).abs() < 1e-5);
    }

    #[test]
    fn test_accuracy() {
        let scores = tensor2(vec![0.9, 0.1, 0.2, 0.8, 0.6, 0.4, 0.3, 0.7], [4, 2]);
        let labels = tensor2(vec![1.0, 0.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0], [4, 2]);

        let predictions = argmax_rows(scores);
        let predicted: Vec<i64> = predictions
            .clone()
            .into_data()
            .convert::<i64>()
            .to_vec()
            .unwrap();
        assert_eq!(predicted, vec![0, 1, 0, 1]);

        let value = accuracy(predictions, labels).into_scalar().elem::<f32>();
        assert!((value - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_dropout_disabled_at_full_keep_prob() {
        let input = tensor2(vec![1.0, 2.0, 3.0, 4.0], [2, 2]);
        let output: Vec<f32> = dropout(input, 1.0).into_data().to_vec().unwrap();
        assert_eq!(output, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_dropout_scales_kept_entries() {
        let device = Default::default();
        let input = Tensor::<TestBackend, 2>::ones([64, 64], &device);
        let output: Vec<f32> = dropout(input, 0.5).into_data().to_vec().unwrap();

        assert!(output.iter().all(|&v| v == 0.0 || (v - 2.0).abs() < 1e-6));

        let kept = output.iter().filter(|&&v| v > 0.0).count() as f32 / output.len() as f32;
        assert!((kept - 0.5).abs() < 0.1);
    }
}
