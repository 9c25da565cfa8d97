//! Binary glTF (GLB) animation parsing
//!
//! Only the parts that feed playback are read: node bind poses with their
//! parent links, and animation channels with their float accessors. Mesh,
//! skin and material data are ignored.
//!
//! Container layout (little-endian):
//!
//! ```text
//! 0   magic "glTF"
//! 4   version
//! 8   total length
//! 12  JSON chunk length
//! 16  JSON chunk type (0x4E4F534A)
//! 20  JSON text
//! ..  BIN chunk length, BIN chunk type (0x004E4942), BIN data
//! ```

use std::path::Path;

use glam::{Mat4, Quat, Vec3};
use serde::Deserialize;

use crate::clip::{AnimationClip, AnimationSet, NodeBindPose};
use crate::error::AssetError;
use crate::keyframe::{Keyframe, Track};

const MAGIC: &[u8; 4] = b"glTF";
const HEADER_LEN: usize = 12;
const CHUNK_HEADER_LEN: usize = 8;
const CHUNK_JSON: u32 = 0x4E4F_534A;
const CHUNK_BIN: u32 = 0x004E_4942;
const COMPONENT_FLOAT: u32 = 5126;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Document {
    #[serde(default)]
    nodes: Vec<Node>,
    #[serde(default)]
    animations: Vec<Animation>,
    #[serde(default)]
    accessors: Vec<Accessor>,
    #[serde(default)]
    buffer_views: Vec<BufferView>,
}

#[derive(Debug, Deserialize)]
struct Node {
    name: Option<String>,
    #[serde(default)]
    children: Vec<usize>,
    translation: Option<[f32; 3]>,
    rotation: Option<[f32; 4]>,
    scale: Option<[f32; 3]>,
    matrix: Option<[f32; 16]>,
}

#[derive(Debug, Deserialize)]
struct Animation {
    name: Option<String>,
    #[serde(default)]
    channels: Vec<Channel>,
    #[serde(default)]
    samplers: Vec<Sampler>,
}

#[derive(Debug, Deserialize)]
struct Channel {
    sampler: usize,
    target: ChannelTarget,
}

#[derive(Debug, Deserialize)]
struct ChannelTarget {
    node: Option<usize>,
    path: String,
}

#[derive(Debug, Deserialize)]
struct Sampler {
    input: usize,
    output: usize,
    interpolation: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Accessor {
    buffer_view: Option<usize>,
    #[serde(default)]
    byte_offset: usize,
    component_type: u32,
    count: usize,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BufferView {
    #[serde(default)]
    byte_offset: usize,
    byte_length: usize,
    byte_stride: Option<usize>,
}

/// The two chunks of a GLB container
struct Container<'a> {
    json: &'a [u8],
    bin: Option<&'a [u8]>,
}

fn read_u32(bytes: &[u8], offset: usize) -> Result<u32, AssetError> {
    let needed = offset + 4;
    bytes
        .get(offset..needed)
        .and_then(|s| <[u8; 4]>::try_from(s).ok())
        .map(u32::from_le_bytes)
        .ok_or(AssetError::Truncated {
            needed,
            actual: bytes.len(),
        })
}

fn split_container(bytes: &[u8]) -> Result<Container<'_>, AssetError> {
    let min = HEADER_LEN + CHUNK_HEADER_LEN;
    if bytes.len() < min {
        return Err(AssetError::Truncated {
            needed: min,
            actual: bytes.len(),
        });
    }
    if &bytes[0..4] != MAGIC {
        return Err(AssetError::BadMagic);
    }

    let json_len = read_u32(bytes, HEADER_LEN)? as usize;
    if read_u32(bytes, HEADER_LEN + 4)? != CHUNK_JSON {
        return Err(AssetError::MissingJsonChunk);
    }
    let json_start = min;
    let json_end = json_start.saturating_add(json_len);
    let json = bytes.get(json_start..json_end).ok_or(AssetError::Truncated {
        needed: json_end,
        actual: bytes.len(),
    })?;

    // The binary chunk is optional
    let mut bin = None;
    if bytes.len() >= json_end + CHUNK_HEADER_LEN {
        let bin_len = read_u32(bytes, json_end)? as usize;
        let bin_type = read_u32(bytes, json_end + 4)?;
        if bin_type == CHUNK_BIN {
            let start = json_end + CHUNK_HEADER_LEN;
            let end = start.saturating_add(bin_len);
            bin = Some(bytes.get(start..end).ok_or(AssetError::Truncated {
                needed: end,
                actual: bytes.len(),
            })?);
        }
    }

    Ok(Container { json, bin })
}

/// Read a float accessor of `width` components per element
fn read_floats(
    doc: &Document,
    bin: Option<&[u8]>,
    index: usize,
    expected: &'static str,
    width: usize,
) -> Result<Vec<f32>, AssetError> {
    let accessor = doc
        .accessors
        .get(index)
        .ok_or(AssetError::AccessorOutOfRange(index))?;
    if accessor.component_type != COMPONENT_FLOAT {
        return Err(AssetError::NonFloatAccessor {
            accessor: index,
            component_type: accessor.component_type,
        });
    }
    if accessor.kind != expected {
        return Err(AssetError::UnsupportedAccessorType {
            accessor: index,
            kind: accessor.kind.clone(),
            expected,
        });
    }
    let bin = bin.ok_or(AssetError::MissingBinChunk)?;
    let view = accessor
        .buffer_view
        .and_then(|v| doc.buffer_views.get(v))
        .ok_or(AssetError::AccessorOutOfRange(index))?;
    if accessor.count == 0 {
        return Ok(Vec::new());
    }

    let element = width * 4;
    let stride = view.byte_stride.unwrap_or(element).max(element);
    let out_of_range = AssetError::AccessorOutOfRange(index);
    let start = view
        .byte_offset
        .checked_add(accessor.byte_offset)
        .ok_or(out_of_range.clone())?;
    let end = stride
        .checked_mul(accessor.count - 1)
        .and_then(|n| n.checked_add(start))
        .and_then(|n| n.checked_add(element))
        .ok_or(out_of_range.clone())?;
    let view_end = view
        .byte_offset
        .checked_add(view.byte_length)
        .ok_or(out_of_range.clone())?;
    if end > view_end || end > bin.len() {
        return Err(out_of_range);
    }

    let mut values = Vec::with_capacity(accessor.count * width);
    for i in 0..accessor.count {
        let offset = start + i * stride;
        values.extend(
            bin[offset..offset + element]
                .chunks_exact(4)
                .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]])),
        );
    }
    Ok(values)
}

/// Node names, with `node_<i>` for unnamed nodes
fn node_names(doc: &Document) -> Vec<String> {
    doc.nodes
        .iter()
        .enumerate()
        .map(|(i, node)| match &node.name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => format!("node_{i}"),
        })
        .collect()
}

fn bind_poses(doc: &Document, names: &[String]) -> Vec<NodeBindPose> {
    let mut parents: Vec<Option<String>> = vec![None; doc.nodes.len()];
    for (i, node) in doc.nodes.iter().enumerate() {
        for &child in &node.children {
            match parents.get_mut(child) {
                Some(slot) => *slot = Some(names[i].clone()),
                None => tracing::warn!("Node '{}' lists missing child {}", names[i], child),
            }
        }
    }

    doc.nodes
        .iter()
        .zip(names)
        .zip(parents)
        .map(|((node, name), parent)| {
            let pose = match node.matrix {
                Some(m) => NodeBindPose::from_matrix(name.as_str(), &Mat4::from_cols_array(&m)),
                None => NodeBindPose::new(
                    name.as_str(),
                    node.translation.map_or(Vec3::ZERO, Vec3::from_array),
                    node.rotation.map_or(Quat::IDENTITY, Quat::from_array),
                    node.scale.map_or(Vec3::ONE, Vec3::from_array),
                ),
            };
            pose.with_parent(parent)
        })
        .collect()
}

/// Pair times with values; cubic-spline outputs keep only the value of each
/// (in-tangent, value, out-tangent) triple
fn keyframes<V: Copy>(times: &[f32], values: &[V], cubic: bool) -> Vec<Keyframe<V>> {
    let values: Vec<V> = if cubic {
        values.chunks_exact(3).map(|t| t[1]).collect()
    } else {
        values.to_vec()
    };
    if values.len() != times.len() {
        tracing::warn!(
            "Channel has {} times but {} values, unpaired keys dropped",
            times.len(),
            values.len()
        );
    }
    let mut keys: Vec<Keyframe<V>> = times
        .iter()
        .zip(values)
        .map(|(&time, value)| Keyframe::new(time, value))
        .collect();
    keys.sort_by(|a, b| a.time.total_cmp(&b.time));
    keys
}

fn vec3s(values: &[f32]) -> Vec<Vec3> {
    values.chunks_exact(3).map(Vec3::from_slice).collect()
}

fn quats(values: &[f32]) -> Vec<Quat> {
    values
        .chunks_exact(4)
        .map(|q| {
            let q = Quat::from_xyzw(q[0], q[1], q[2], q[3]);
            if q.length_squared() > 0.0 { q.normalize() } else { Quat::IDENTITY }
        })
        .collect()
}

fn parse_clip(
    doc: &Document,
    bin: Option<&[u8]>,
    index: usize,
    animation: &Animation,
    names: &[String],
) -> Result<AnimationClip, AssetError> {
    let clip_name = match &animation.name {
        Some(name) if !name.is_empty() => name.clone(),
        _ => format!("animation_{index}"),
    };
    let mut clip = AnimationClip::new(clip_name.clone());
    // Input timestamps count toward the duration even when unpaired
    let mut latest_input = 0.0f32;

    for (ci, channel) in animation.channels.iter().enumerate() {
        let Some(node) = channel.target.node else {
            tracing::warn!("Clip '{}' channel {} has no target node, skipped", clip_name, ci);
            continue;
        };
        let node_name = names.get(node).ok_or_else(|| AssetError::MissingNode {
            animation: clip_name.clone(),
            channel: ci,
            node,
        })?;
        let sampler = animation
            .samplers
            .get(channel.sampler)
            .ok_or_else(|| AssetError::MissingSampler {
                animation: clip_name.clone(),
                channel: ci,
                sampler: channel.sampler,
            })?;
        let cubic = match sampler.interpolation.as_deref() {
            None | Some("LINEAR") => false,
            Some("CUBICSPLINE") => {
                tracing::warn!("Clip '{}' channel {} is cubic, sampled linearly", clip_name, ci);
                true
            }
            Some(other) => {
                tracing::warn!("Clip '{}' channel {} uses {}, sampled linearly", clip_name, ci, other);
                false
            }
        };

        let path = channel.target.path.as_str();
        if !matches!(path, "translation" | "rotation" | "scale") {
            tracing::warn!("Clip '{}' channel {} animates '{}', skipped", clip_name, ci, path);
            continue;
        }

        let times = read_floats(doc, bin, sampler.input, "SCALAR", 1)?;
        latest_input = times.iter().copied().fold(latest_input, f32::max);
        let track: &mut Track = clip.tracks.entry(node_name.clone()).or_default();
        match path {
            "translation" => {
                let values = vec3s(&read_floats(doc, bin, sampler.output, "VEC3", 3)?);
                track.translation_keys = keyframes(&times, &values, cubic);
            }
            "rotation" => {
                let values = quats(&read_floats(doc, bin, sampler.output, "VEC4", 4)?);
                track.rotation_keys = keyframes(&times, &values, cubic);
            }
            _ => {
                let values = vec3s(&read_floats(doc, bin, sampler.output, "VEC3", 3)?);
                track.scale_keys = keyframes(&times, &values, cubic);
            }
        }
    }

    clip.tracks.retain(|_, track| !track.is_empty());
    clip.update_duration();
    clip.duration = clip.duration.max(latest_input);
    Ok(clip)
}

/// Parse every animation and node bind pose of a GLB asset
pub fn parse_animation_set(bytes: &[u8]) -> Result<AnimationSet, AssetError> {
    let container = split_container(bytes)?;
    let doc: Document = serde_json::from_slice(container.json)?;

    let names = node_names(&doc);
    let mut set = AnimationSet::default();
    for pose in bind_poses(&doc, &names) {
        if set.nodes.contains_key(&pose.name) {
            tracing::warn!("Duplicate node name '{}', keeping the first", pose.name);
            continue;
        }
        set.nodes.insert(pose.name.clone(), pose);
    }

    for (i, animation) in doc.animations.iter().enumerate() {
        let clip = parse_clip(&doc, container.bin, i, animation, &names)?;
        tracing::debug!(
            "Parsed clip '{}': {} tracks, {:.3}s",
            clip.name,
            clip.tracks.len(),
            clip.duration
        );
        set.clips.push(clip);
    }

    Ok(set)
}

/// Read and parse a GLB file
pub fn load_animation_set(path: impl AsRef<Path>) -> Result<AnimationSet, AssetError> {
    let path = path.as_ref();
    tracing::debug!("Loading animations from {}", path.display());
    let bytes = std::fs::read(path)?;
    parse_animation_set(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn container(json: &str, bin: Option<&[u8]>) -> Vec<u8> {
        let mut json = json.as_bytes().to_vec();
        while json.len() % 4 != 0 {
            json.push(b' ');
        }
        let mut out = Vec::new();
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&2u32.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&(json.len() as u32).to_le_bytes());
        out.extend_from_slice(&CHUNK_JSON.to_le_bytes());
        out.extend_from_slice(&json);
        if let Some(bin) = bin {
            out.extend_from_slice(&(bin.len() as u32).to_le_bytes());
            out.extend_from_slice(&CHUNK_BIN.to_le_bytes());
            out.extend_from_slice(bin);
        }
        let total = out.len() as u32;
        out[8..12].copy_from_slice(&total.to_le_bytes());
        out
    }

    #[test]
    fn test_split_container_finds_chunks() {
        let bytes = container("{}", Some(&[1u8, 2, 3, 4][..]));
        let c = split_container(&bytes).unwrap();
        assert_eq!(c.json, b"{}  ");
        assert_eq!(c.bin, Some(&[1u8, 2, 3, 4][..]));

        let bytes = container("{}", None);
        assert!(split_container(&bytes).unwrap().bin.is_none());
    }

    #[test]
    fn test_split_container_errors() {
        assert_eq!(
            split_container(b"glTF").err(),
            Some(AssetError::Truncated { needed: 20, actual: 4 })
        );

        let mut bytes = container("{}", None);
        bytes[0] = b'x';
        assert_eq!(split_container(&bytes).err(), Some(AssetError::BadMagic));

        let mut bytes = container("{}", None);
        bytes[16] = 0;
        assert_eq!(split_container(&bytes).err(), Some(AssetError::MissingJsonChunk));

        let mut bytes = container("{}", None);
        bytes[12] = 200;
        assert!(matches!(
            split_container(&bytes),
            Err(AssetError::Truncated { .. })
        ));
    }

    #[test]
    fn test_read_floats_honours_stride() {
        // Two VEC3 elements with 4 bytes of padding each
        let floats = [1.0f32, 2.0, 3.0, 99.0, 4.0, 5.0, 6.0, 99.0];
        let bin: Vec<u8> = floats.iter().flat_map(|f| f.to_le_bytes()).collect();
        let json = r#"{
            "accessors": [{"bufferView": 0, "componentType": 5126, "count": 2, "type": "VEC3"}],
            "bufferViews": [{"buffer": 0, "byteLength": 32, "byteStride": 16}]
        }"#;
        let doc: Document = serde_json::from_str(json).unwrap();
        let values = read_floats(&doc, Some(&bin), 0, "VEC3", 3).unwrap();
        assert_eq!(values, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_read_floats_rejects_bad_accessors() {
        let bin = vec![0u8; 8];
        let json = r#"{
            "accessors": [
                {"bufferView": 0, "componentType": 5123, "count": 2, "type": "SCALAR"},
                {"bufferView": 0, "componentType": 5126, "count": 2, "type": "VEC2"},
                {"bufferView": 0, "componentType": 5126, "count": 4, "type": "SCALAR"}
            ],
            "bufferViews": [{"buffer": 0, "byteLength": 8}]
        }"#;
        let doc: Document = serde_json::from_str(json).unwrap();
        assert_eq!(
            read_floats(&doc, Some(&bin), 0, "SCALAR", 1),
            Err(AssetError::NonFloatAccessor { accessor: 0, component_type: 5123 })
        );
        assert!(matches!(
            read_floats(&doc, Some(&bin), 1, "VEC3", 3),
            Err(AssetError::UnsupportedAccessorType { accessor: 1, .. })
        ));
        assert_eq!(
            read_floats(&doc, Some(&bin), 2, "SCALAR", 1),
            Err(AssetError::AccessorOutOfRange(2))
        );
        assert_eq!(
            read_floats(&doc, Some(&bin), 7, "SCALAR", 1),
            Err(AssetError::AccessorOutOfRange(7))
        );
        assert_eq!(
            read_floats(&doc, None, 2, "SCALAR", 1),
            Err(AssetError::MissingBinChunk)
        );
    }

    #[test]
    fn test_keyframes_sort_and_cubic() {
        let keys = keyframes(&[1.0, 0.0], &[10.0f32, 20.0], false);
        assert_eq!(keys[0], Keyframe::new(0.0, 20.0));
        assert_eq!(keys[1], Keyframe::new(1.0, 10.0));

        let keys = keyframes(&[0.0], &[7.0f32, 8.0, 9.0], true);
        assert_eq!(keys, vec![Keyframe::new(0.0, 8.0)]);
    }
}
