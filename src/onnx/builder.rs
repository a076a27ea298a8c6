use super::proto::{
    tensor_shape_proto::{dimension, Dimension},
    type_proto, AttributeProto, AttributeType, DataType, GraphProto, ModelProto, NodeProto,
    OperatorSetIdProto, StringStringEntryProto, TensorProto, TensorShapeProto, TypeProto,
    ValueInfoProto,
};

/// IR version that goes with opset 11
pub const IR_VERSION: i64 = 6;
pub const OPSET_VERSION: i64 = 11;

/// One axis of a declared input/output shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Dim {
    Fixed(i64),
    /// Symbolic size, e.g. "batch_size"
    Named(String),
}

impl Dim {
    pub fn named(name: &str) -> Self {
        Dim::Named(name.to_string())
    }
}

/// Accumulates nodes, initialisers and graph I/O, then wraps
/// them into a ModelProto.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    name:        String,
    nodes:       Vec<NodeProto>,
    initializer: Vec<TensorProto>,
    inputs:      Vec<ValueInfoProto>,
    outputs:     Vec<ValueInfoProto>,
}

impl GraphBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Default::default() }
    }

    pub fn input(&mut self, name: &str, dims: &[Dim]) -> &mut Self {
        self.inputs.push(float_value_info(name, dims));
        self
    }

    pub fn output(&mut self, name: &str, dims: &[Dim]) -> &mut Self {
        self.outputs.push(float_value_info(name, dims));
        self
    }

    /// Register a float constant (weights, biases) under `name`.
    pub fn initializer(&mut self, name: &str, dims: &[usize], values: &[f32]) -> &mut Self {
        self.initializer.push(float_tensor(name, dims, values));
        self
    }

    pub fn node(
        &mut self,
        op_type:    &str,
        inputs:     &[&str],
        outputs:    &[&str],
        attributes: Vec<AttributeProto>,
    ) -> &mut Self {
        let name = format!("{}_{}", op_type, self.nodes.len());
        self.nodes.push(NodeProto {
            input:     inputs.iter().map(|s| s.to_string()).collect(),
            output:    outputs.iter().map(|s| s.to_string()).collect(),
            name,
            op_type:   op_type.to_string(),
            attribute: attributes,
            ..Default::default()
        });
        self
    }

    /// Finish the graph as a standalone model.
    pub fn build(self, producer: &str, metadata: Vec<(String, String)>) -> ModelProto {
        let graph = GraphProto {
            node:        self.nodes,
            name:        self.name,
            initializer: self.initializer,
            input:       self.inputs,
            output:      self.outputs,
            ..Default::default()
        };

        ModelProto {
            ir_version:       IR_VERSION,
            opset_import:     vec![OperatorSetIdProto { domain: String::new(), version: OPSET_VERSION }],
            producer_name:    producer.to_string(),
            producer_version: env!("CARGO_PKG_VERSION").to_string(),
            graph:            Some(graph),
            metadata_props:   metadata
                .into_iter()
                .map(|(key, value)| StringStringEntryProto { key, value })
                .collect(),
            ..Default::default()
        }
    }
}

// ─── Attribute constructors ───────────────────────────────────────────────────

pub fn attr_int(name: &str, value: i64) -> AttributeProto {
    AttributeProto {
        name:   name.to_string(),
        r#type: AttributeType::Int as i32,
        i:      value,
        ..Default::default()
    }
}

pub fn attr_ints(name: &str, values: &[i64]) -> AttributeProto {
    AttributeProto {
        name:   name.to_string(),
        r#type: AttributeType::Ints as i32,
        ints:   values.to_vec(),
        ..Default::default()
    }
}

pub fn attr_float(name: &str, value: f32) -> AttributeProto {
    AttributeProto {
        name:   name.to_string(),
        r#type: AttributeType::Float as i32,
        f:      value,
        ..Default::default()
    }
}

// ─── Tensors and value infos ──────────────────────────────────────────────────

/// Float initialiser stored as little-endian raw bytes.
pub fn float_tensor(name: &str, dims: &[usize], values: &[f32]) -> TensorProto {
    TensorProto {
        dims:      dims.iter().map(|&d| d as i64).collect(),
        data_type: DataType::Float as i32,
        name:      name.to_string(),
        raw_data:  values.iter().flat_map(|v| v.to_le_bytes()).collect(),
        ..Default::default()
    }
}

/// Decode a float TensorProto written by float_tensor (or with float_data).
pub fn tensor_values(tensor: &TensorProto) -> Vec<f32> {
    if tensor.raw_data.is_empty() {
        return tensor.float_data.clone();
    }
    tensor
        .raw_data
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}

fn float_value_info(name: &str, dims: &[Dim]) -> ValueInfoProto {
    let dim = dims
        .iter()
        .map(|d| Dimension {
            value: Some(match d {
                Dim::Fixed(v) => dimension::Value::DimValue(*v),
                Dim::Named(p) => dimension::Value::DimParam(p.clone()),
            }),
            ..Default::default()
        })
        .collect();

    ValueInfoProto {
        name: name.to_string(),
        r#type: Some(TypeProto {
            value: Some(type_proto::Value::TensorType(type_proto::Tensor {
                elem_type: DataType::Float as i32,
                shape:     Some(TensorShapeProto { dim }),
            })),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Declared dims of a graph input/output, if it is a tensor.
pub fn value_info_dims(info: &ValueInfoProto) -> Option<Vec<Dim>> {
    let Some(TypeProto { value: Some(type_proto::Value::TensorType(t)), .. }) = &info.r#type else {
        return None;
    };
    let shape = t.shape.as_ref()?;
    Some(
        shape
            .dim
            .iter()
            .map(|d| match &d.value {
                Some(dimension::Value::DimValue(v)) => Dim::Fixed(*v),
                Some(dimension::Value::DimParam(p)) => Dim::Named(p.clone()),
                None => Dim::Named(String::new()),
            })
            .collect(),
    )
}
