// ============================================================
// Layer 5 — ONNX Exporter
// ============================================================
// Rebuilds the trained network from its checkpoint and writes it
// as a static ONNX graph:
//
//   board [batch_size,12,8,8]
//     → Conv(3×3, pad 1) → Relu
//     → Conv(3×3, pad 1) → Relu
//     → Flatten(axis=1)
//     → Gemm → Relu
//     → Gemm
//   evaluation [batch_size,1]
//
// The checkpoint's saved model config decides the architecture,
// and every exported initialiser is checked against the shape
// that config implies before anything is written. Re-running
// the export overwrites the previous graph file.
//
// burn stores Linear weights as [d_in, d_out], which is exactly
// Gemm's B operand with transB = 0, and Conv2d weights as
// [out, in, kh, kw], which is ONNX's Conv layout.

use anyhow::{ensure, Context, Result};
use burn::{nn::conv::Conv2d, nn::Linear, prelude::*};
use prost::Message;
use std::{fs, path::Path};

use crate::domain::position::{BOARD_SIZE, NUM_CHANNELS};
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::model::{EvaluationModel, EvaluationModelConfig};
use crate::ml::{InferenceDevice, InnerBackend};
use crate::onnx::builder::{attr_float, attr_int, attr_ints};
use crate::onnx::{Dim, GraphBuilder, ModelProto};

/// Name of the graph input tensor
pub const INPUT_NAME: &str = "board";

/// Name of the graph output tensor
pub const OUTPUT_NAME: &str = "evaluation";

/// Symbolic batch dimension shared by input and output
pub const BATCH_DIM: &str = "batch_size";

/// Metadata key holding the model config JSON
pub const CONFIG_METADATA_KEY: &str = "model_config";

const PRODUCER: &str = "fen-eval";

/// Load the checkpoint into a fresh inference-mode model and write
/// it to `onnx_path` as an ONNX graph.
pub fn export_to_onnx(
    checkpoint: &CheckpointManager,
    onnx_path:  impl AsRef<Path>,
    device:     &InferenceDevice,
) -> Result<()> {
    let onnx_path = onnx_path.as_ref();

    let cfg = checkpoint.load_config()?;
    let model: EvaluationModel<InnerBackend> = checkpoint.load_model(&cfg, device)?;

    let proto = build_graph(&model, &cfg)?;
    write_model(&proto, onnx_path)?;

    tracing::info!(
        "Exported '{}' to ONNX graph '{}'",
        checkpoint.model_path().display(),
        onnx_path.display()
    );
    Ok(())
}

/// Translate a model into an ONNX ModelProto.
///
/// Fails if any parameter shape disagrees with `cfg`.
pub fn build_graph<B: Backend>(
    model: &EvaluationModel<B>,
    cfg:   &EvaluationModelConfig,
) -> Result<ModelProto> {
    let mut g = GraphBuilder::new("fen_evaluator");

    g.input(
        INPUT_NAME,
        &[
            Dim::named(BATCH_DIM),
            Dim::Fixed(NUM_CHANNELS as i64),
            Dim::Fixed(BOARD_SIZE as i64),
            Dim::Fixed(BOARD_SIZE as i64),
        ],
    );
    g.output(OUTPUT_NAME, &[Dim::named(BATCH_DIM), Dim::Fixed(1)]);

    add_conv(&mut g, "conv1", &model.conv1, [cfg.conv1_channels, cfg.input_channels, 3, 3])?;
    add_conv(&mut g, "conv2", &model.conv2, [cfg.conv2_channels, cfg.conv1_channels, 3, 3])?;
    add_linear(&mut g, "fc1", &model.fc1, [cfg.flattened_features(), cfg.hidden])?;
    add_linear(&mut g, "fc2", &model.fc2, [cfg.hidden, 1])?;

    g.node("Conv", &[INPUT_NAME, "conv1.weight", "conv1.bias"], &["conv1_out"], conv_attributes())
        .node("Relu", &["conv1_out"], &["relu1_out"], vec![])
        .node("Conv", &["relu1_out", "conv2.weight", "conv2.bias"], &["conv2_out"], conv_attributes())
        .node("Relu", &["conv2_out"], &["relu2_out"], vec![])
        .node("Flatten", &["relu2_out"], &["flat_out"], vec![attr_int("axis", 1)])
        .node("Gemm", &["flat_out", "fc1.weight", "fc1.bias"], &["fc1_out"], gemm_attributes())
        .node("Relu", &["fc1_out"], &["relu3_out"], vec![])
        .node("Gemm", &["relu3_out", "fc2.weight", "fc2.bias"], &[OUTPUT_NAME], gemm_attributes());

    let metadata = vec![(CONFIG_METADATA_KEY.to_string(), serde_json::to_string(cfg)?)];
    Ok(g.build(PRODUCER, metadata))
}

/// Serialise a ModelProto to disk, replacing any existing file.
pub fn write_model(model: &ModelProto, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, model.encode_to_vec())
        .with_context(|| format!("Cannot write ONNX graph to '{}'", path.display()))
}

/// Read an ONNX file back into a ModelProto.
pub fn read_model(path: impl AsRef<Path>) -> Result<ModelProto> {
    let path  = path.as_ref();
    let bytes = fs::read(path)
        .with_context(|| format!("Cannot read ONNX graph '{}'", path.display()))?;
    ModelProto::decode(bytes.as_slice())
        .with_context(|| format!("'{}' is not a valid ONNX model", path.display()))
}

fn conv_attributes() -> Vec<crate::onnx::proto::AttributeProto> {
    vec![
        attr_ints("kernel_shape", &[3, 3]),
        attr_ints("pads", &[1, 1, 1, 1]),
        attr_ints("strides", &[1, 1]),
        attr_ints("dilations", &[1, 1]),
        attr_int("group", 1),
    ]
}

fn gemm_attributes() -> Vec<crate::onnx::proto::AttributeProto> {
    vec![
        attr_float("alpha", 1.0),
        attr_float("beta", 1.0),
        attr_int("transA", 0),
        attr_int("transB", 0),
    ]
}

fn add_conv<B: Backend>(
    g:        &mut GraphBuilder,
    prefix:   &str,
    conv:     &Conv2d<B>,
    expected: [usize; 4],
) -> Result<()> {
    let weight = conv.weight.val();
    let dims   = weight.dims();
    ensure!(
        dims == expected,
        "{prefix}.weight has shape {dims:?}, the checkpoint config expects {expected:?}"
    );

    let bias = match &conv.bias {
        Some(b) => to_vec(b.val()),
        None    => vec![0.0; dims[0]],
    };
    g.initializer(&format!("{prefix}.weight"), &dims, &to_vec(weight))
        .initializer(&format!("{prefix}.bias"), &[dims[0]], &bias);
    Ok(())
}

fn add_linear<B: Backend>(
    g:        &mut GraphBuilder,
    prefix:   &str,
    linear:   &Linear<B>,
    expected: [usize; 2],
) -> Result<()> {
    let weight = linear.weight.val();
    let dims   = weight.dims();
    ensure!(
        dims == expected,
        "{prefix}.weight has shape {dims:?}, the checkpoint config expects {expected:?}"
    );

    let bias = match &linear.bias {
        Some(b) => to_vec(b.val()),
        None    => vec![0.0; dims[1]],
    };
    g.initializer(&format!("{prefix}.weight"), &dims, &to_vec(weight))
        .initializer(&format!("{prefix}.bias"), &[dims[1]], &bias);
    Ok(())
}

fn to_vec<B: Backend, const D: usize>(tensor: Tensor<B, D>) -> Vec<f32> {
    tensor.into_data().iter::<f32>().collect()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::onnx::builder::{tensor_values, value_info_dims};

    fn fresh_model() -> (EvaluationModel<InnerBackend>, EvaluationModelConfig) {
        let device = InferenceDevice::default();
        let cfg    = EvaluationModelConfig::new();
        (cfg.init(&device), cfg)
    }

    #[test]
    fn test_graph_structure() {
        let (model, cfg) = fresh_model();
        let proto = build_graph(&model, &cfg).unwrap();
        let graph = proto.graph.as_ref().unwrap();

        let ops: Vec<&str> = graph.node.iter().map(|n| n.op_type.as_str()).collect();
        assert_eq!(ops, ["Conv", "Relu", "Conv", "Relu", "Flatten", "Gemm", "Relu", "Gemm"]);

        assert_eq!(graph.input.len(), 1);
        assert_eq!(graph.input[0].name, INPUT_NAME);
        assert_eq!(
            value_info_dims(&graph.input[0]).unwrap(),
            vec![Dim::named(BATCH_DIM), Dim::Fixed(12), Dim::Fixed(8), Dim::Fixed(8)]
        );
        assert_eq!(graph.output[0].name, OUTPUT_NAME);
        assert_eq!(
            value_info_dims(&graph.output[0]).unwrap(),
            vec![Dim::named(BATCH_DIM), Dim::Fixed(1)]
        );
        assert_eq!(graph.node.last().unwrap().output, vec![OUTPUT_NAME.to_string()]);
        assert_eq!(proto.metadata_props[0].key, CONFIG_METADATA_KEY);
    }

    #[test]
    fn test_initializers_match_parameters() {
        let (model, cfg) = fresh_model();
        let proto = build_graph(&model, &cfg).unwrap();
        let graph = proto.graph.unwrap();

        let find = |name: &str| graph.initializer.iter().find(|t| t.name == name).unwrap().clone();

        let fc1 = find("fc1.weight");
        assert_eq!(fc1.dims, vec![4096, 128]);
        assert_eq!(tensor_values(&fc1), to_vec(model.fc1.weight.val()));

        let conv1 = find("conv1.weight");
        assert_eq!(conv1.dims, vec![32, 12, 3, 3]);
        assert_eq!(tensor_values(&conv1), to_vec(model.conv1.weight.val()));

        assert_eq!(find("conv2.bias").dims, vec![64]);
        assert_eq!(find("fc2.bias").dims, vec![1]);
        assert_eq!(graph.initializer.len(), 8);
    }

    #[test]
    fn test_rejects_mismatched_config() {
        let (model, _) = fresh_model();
        let wrong = EvaluationModelConfig::new().with_hidden(64);
        assert!(build_graph(&model, &wrong).is_err());
    }

    #[test]
    fn test_write_and_read_back() {
        let (model, cfg) = fresh_model();
        let proto = build_graph(&model, &cfg).unwrap();

        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.onnx");
        write_model(&proto, &path).unwrap();
        // Second export overwrites in place
        write_model(&proto, &path).unwrap();

        assert_eq!(read_model(&path).unwrap(), proto);
        assert!(read_model(dir.path().join("missing.onnx")).is_err());
    }

    #[test]
    fn test_export_from_checkpoint() {
        let (model, cfg) = fresh_model();
        let dir  = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path().join("fen_evaluator_model"));
        ckpt.save_config(&cfg).unwrap();
        ckpt.save_model(&model).unwrap();

        let onnx = dir.path().join("model.onnx");
        export_to_onnx(&ckpt, &onnx, &InferenceDevice::default()).unwrap();

        let graph = read_model(&onnx).unwrap().graph.unwrap();
        let fc2 = graph.initializer.iter().find(|t| t.name == "fc2.weight").unwrap();
        assert_eq!(tensor_values(fc2), to_vec(model.fc2.weight.val()));
    }

    #[test]
    fn test_export_rejects_config_that_disagrees_with_weights() {
        let (model, _) = fresh_model();
        let dir  = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path().join("fen_evaluator_model"));
        ckpt.save_model(&model).unwrap();
        ckpt.save_config(&EvaluationModelConfig::new().with_hidden(16)).unwrap();

        // burn loads the record as-is; the shape check against the config rejects it
        let onnx = dir.path().join("model.onnx");
        assert!(export_to_onnx(&ckpt, &onnx, &InferenceDevice::default()).is_err());
        assert!(!onnx.exists());
    }
}
