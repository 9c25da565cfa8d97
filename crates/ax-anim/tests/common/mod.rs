//! In-memory GLB assembly for parser tests

#![allow(dead_code)]

use serde_json::{Value, json};

/// Accumulates float accessors into one binary chunk
#[derive(Default)]
pub struct GlbBuilder {
    bin: Vec<u8>,
    accessors: Vec<Value>,
    views: Vec<Value>,
}

impl GlbBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a tightly packed float accessor, returning its index
    pub fn floats(&mut self, data: &[f32], kind: &str) -> usize {
        let width = match kind {
            "VEC3" => 3,
            "VEC4" => 4,
            _ => 1,
        };
        let offset = self.bin.len();
        self.bin.extend(data.iter().flat_map(|f| f.to_le_bytes()));
        self.views.push(json!({
            "buffer": 0,
            "byteOffset": offset,
            "byteLength": data.len() * 4,
        }));
        self.accessors.push(json!({
            "bufferView": self.views.len() - 1,
            "componentType": 5126,
            "count": data.len() / width,
            "type": kind,
        }));
        self.accessors.len() - 1
    }

    /// Append an arbitrary accessor description
    pub fn raw_accessor(&mut self, accessor: Value) -> usize {
        self.accessors.push(accessor);
        self.accessors.len() - 1
    }

    /// Assemble the container
    pub fn build(self, nodes: Value, animations: Value) -> Vec<u8> {
        let doc = json!({
            "asset": { "version": "2.0" },
            "nodes": nodes,
            "animations": animations,
            "accessors": self.accessors,
            "bufferViews": self.views,
            "buffers": [{ "byteLength": self.bin.len() }],
        });
        let mut json = serde_json::to_vec(&doc).unwrap_or_default();
        while json.len() % 4 != 0 {
            json.push(b' ');
        }
        let mut bin = self.bin;
        while bin.len() % 4 != 0 {
            bin.push(0);
        }

        let mut out = Vec::new();
        out.extend_from_slice(b"glTF");
        out.extend_from_slice(&2u32.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&(json.len() as u32).to_le_bytes());
        out.extend_from_slice(&0x4E4F_534Au32.to_le_bytes());
        out.extend_from_slice(&json);
        out.extend_from_slice(&(bin.len() as u32).to_le_bytes());
        out.extend_from_slice(&0x004E_4942u32.to_le_bytes());
        out.extend_from_slice(&bin);
        let total = out.len() as u32;
        out[8..12].copy_from_slice(&total.to_le_bytes());
        out
    }
}

/// A rig of `hips` with child `spine`, and a "wave" clip plus an unnamed clip
pub fn rig_asset() -> Vec<u8> {
    let mut b = GlbBuilder::new();
    // Deliberately out of order
    let times = b.floats(&[2.0, 0.0, 1.0], "SCALAR");
    let moves = b.floats(&[2.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0], "VEC3");
    let turn_times = b.floats(&[0.0, 4.0], "SCALAR");
    let half = std::f32::consts::FRAC_1_SQRT_2;
    let turns = b.floats(&[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, half, half], "VEC4");
    let grow_times = b.floats(&[0.0, 1.0], "SCALAR");
    let grows = b.floats(&[1.0, 1.0, 1.0, 3.0, 3.0, 3.0], "VEC3");

    b.build(
        json!([
            { "name": "hips", "children": [1], "translation": [0.0, 1.0, 0.0] },
            { "name": "spine", "scale": [2.0, 2.0, 2.0] },
            { "children": [] }
        ]),
        json!([
            {
                "name": "wave",
                "channels": [
                    { "sampler": 0, "target": { "node": 0, "path": "translation" } },
                    { "sampler": 1, "target": { "node": 1, "path": "rotation" } },
                    { "sampler": 0, "target": { "path": "translation" } },
                    { "sampler": 0, "target": { "node": 2, "path": "weights" } }
                ],
                "samplers": [
                    { "input": times, "output": moves, "interpolation": "LINEAR" },
                    { "input": turn_times, "output": turns }
                ]
            },
            {
                "channels": [
                    { "sampler": 0, "target": { "node": 1, "path": "scale" } }
                ],
                "samplers": [
                    { "input": grow_times, "output": grows }
                ]
            }
        ]),
    )
}
