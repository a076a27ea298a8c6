use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        loss::{MseLoss, Reduction},
        Linear, LinearConfig, PaddingConfig2d,
    },
    prelude::*,
    tensor::activation::relu,
};

use crate::domain::position::{BOARD_SIZE, NUM_CHANNELS};

/// Architecture of the evaluation network.
///
/// The defaults are the only shape that has ever been trained; the
/// config exists so the checkpoint can record which shape it holds and
/// the exporter can rebuild it.
#[derive(Config, Debug)]
pub struct EvaluationModelConfig {
    #[config(default = 12)]
    pub input_channels: usize,
    #[config(default = 32)]
    pub conv1_channels: usize,
    #[config(default = 64)]
    pub conv2_channels: usize,
    #[config(default = 128)]
    pub hidden: usize,
}

impl EvaluationModelConfig {
    /// Width of the flattened convolution output fed to `fc1`
    pub fn flattened_features(&self) -> usize {
        self.conv2_channels * BOARD_SIZE * BOARD_SIZE
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> EvaluationModel<B> {
        // 3×3 kernels with one cell of zero padding keep the 8×8 board size
        let conv1 = Conv2dConfig::new([self.input_channels, self.conv1_channels], [3, 3])
            .with_padding(PaddingConfig2d::Explicit(1, 1))
            .init(device);
        let conv2 = Conv2dConfig::new([self.conv1_channels, self.conv2_channels], [3, 3])
            .with_padding(PaddingConfig2d::Explicit(1, 1))
            .init(device);
        let fc1 = LinearConfig::new(self.flattened_features(), self.hidden).init(device);
        let fc2 = LinearConfig::new(self.hidden, 1).init(device);

        EvaluationModel { conv1, conv2, fc1, fc2 }
    }
}

impl Default for EvaluationModelConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// conv(12→32) → relu → conv(32→64) → relu → flatten → fc(4096→128) → relu → fc(128→1)
#[derive(Module, Debug)]
pub struct EvaluationModel<B: Backend> {
    pub conv1: Conv2d<B>,
    pub conv2: Conv2d<B>,
    pub fc1:   Linear<B>,
    pub fc2:   Linear<B>,
}

impl<B: Backend> EvaluationModel<B> {
    /// boards: [batch, 12, 8, 8] → evaluation: [batch, 1]
    pub fn forward(&self, boards: Tensor<B, 4>) -> Tensor<B, 2> {
        let [_, channels, rows, cols] = boards.dims();
        debug_assert_eq!([channels, rows, cols], [NUM_CHANNELS, BOARD_SIZE, BOARD_SIZE]);

        let x = relu(self.conv1.forward(boards));
        let x = relu(self.conv2.forward(x));
        let x: Tensor<B, 2> = x.flatten(1, 3);
        let x = relu(self.fc1.forward(x));
        self.fc2.forward(x)
    }

    /// Mean-squared error between predictions and targets, plus the predictions.
    pub fn forward_loss(
        &self,
        boards:  Tensor<B, 4>,
        targets: Tensor<B, 2>,
    ) -> (Tensor<B, 1>, Tensor<B, 2>) {
        let preds = self.forward(boards);
        let loss  = MseLoss::new().forward(preds.clone(), targets, Reduction::Mean);
        (loss, preds)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{Autodiff, NdArray};
    use burn::optim::{AdamConfig, GradientsParams, Optimizer};

    use crate::data::batcher::boards_to_tensor;
    use crate::domain::position::encode_fen;

    type B = NdArray;

    #[test]
    fn test_output_shape() {
        let device = Default::default();
        let model: EvaluationModel<B> = EvaluationModelConfig::new().init(&device);

        let board = encode_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1").unwrap();
        let out = model.forward(boards_to_tensor::<B>(&[board, board, board], &device));
        assert_eq!(out.dims(), [3, 1]);

        let values: Vec<f32> = out.into_data().iter::<f32>().collect();
        assert!(values.iter().all(|v| v.is_finite()));
        // Same input, same parameters → same output
        assert_eq!(values[0], values[1]);
        assert_eq!(values[1], values[2]);
    }

    #[test]
    fn test_default_architecture() {
        let cfg = EvaluationModelConfig::default();
        assert_eq!(cfg.input_channels, 12);
        assert_eq!(cfg.conv1_channels, 32);
        assert_eq!(cfg.conv2_channels, 64);
        assert_eq!(cfg.hidden, 128);
        assert_eq!(cfg.flattened_features(), 4096);

        let device = Default::default();
        let model: EvaluationModel<B> = cfg.init(&device);
        assert_eq!(model.conv1.weight.val().dims(), [32, 12, 3, 3]);
        assert_eq!(model.conv2.weight.val().dims(), [64, 32, 3, 3]);
        assert_eq!(model.fc1.weight.val().dims(), [4096, 128]);
        assert_eq!(model.fc2.weight.val().dims(), [128, 1]);
    }

    #[test]
    fn test_single_training_step() {
        let device = Default::default();
        let model: EvaluationModel<Autodiff<B>> = EvaluationModelConfig::new().init(&device);
        let mut optim = AdamConfig::new().init();

        let board = encode_fen("8/8/8/8/4K3/8/8/7k w - - 0 1").unwrap();
        let boards = boards_to_tensor::<Autodiff<B>>(&[board], &device);
        let targets = Tensor::<Autodiff<B>, 2>::from_data(TensorData::new(vec![1.0f32], [1, 1]), &device);

        let (loss, preds) = model.forward_loss(boards, targets);
        assert_eq!(preds.dims(), [1, 1]);
        assert!(loss.clone().into_scalar().elem::<f64>().is_finite());

        let grads = GradientsParams::from_grads(loss.backward(), &model);
        let _model = optim.step(1e-3, model, grads);
    }
}
