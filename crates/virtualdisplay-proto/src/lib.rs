// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Wire schema for the Virtualdisplay viewer protocol.
//!
//! Every message exchanged between the host page and the viewer iframe is a
//! plain JSON object discriminated by its `"type"` tag:
//!
//! * `mutation` – client → viewer, show/hide batches.
//! * `state` – viewer → client, node visibility reports.
//! * `config` – client → viewer, UI toggles and camera limits.
//! * `camera` – client → viewer, camera commands.
//! * `snapshot` – both ways (request without `data`, response with `data`).
//!
//! Inbound traffic shares the browser `message` channel with unrelated
//! senders; use [`wire::decode_inbound`] to accept only viewer-originated
//! shapes.

use serde::{Deserialize, Serialize};

pub mod wire;

/// Visibility instruction carried by a mutation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MutationKind {
    /// Make the node visible.
    Show,
    /// Make the node invisible.
    Hide,
}

impl MutationKind {
    /// The opposite instruction.
    pub fn inverse(self) -> Self {
        match self {
            MutationKind::Show => MutationKind::Hide,
            MutationKind::Hide => MutationKind::Show,
        }
    }

    /// Wire tag (`"show"` / `"hide"`).
    pub fn as_str(self) -> &'static str {
        match self {
            MutationKind::Show => "show",
            MutationKind::Hide => "hide",
        }
    }
}

/// Plain mutation as it travels on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct MutationDto {
    /// Show or hide.
    #[serde(rename = "type")]
    pub kind: MutationKind,
    /// Target node identifier.
    #[serde(rename = "nodeId")]
    pub node_id: String,
}

/// Kind of addressable scene element.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    /// A renderable mesh.
    Mesh,
    /// A material/geometry variant.
    Variant,
}

impl NodeType {
    /// Wire tag (`"mesh"` / `"variant"`).
    pub fn as_str(self) -> &'static str {
        match self {
            NodeType::Mesh => "mesh",
            NodeType::Variant => "variant",
        }
    }
}

/// Node record reported by the viewer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelNodeDto {
    /// Stable node identifier.
    pub id: String,
    /// Human readable node name.
    pub name: String,
    /// Node classification.
    #[serde(rename = "type")]
    pub node_type: NodeType,
    /// Current visibility in the viewer.
    pub visible: bool,
}

/// Viewer UI toggles. Absent fields keep the viewer default (enabled).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UiConfig {
    /// AR button.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ar_enabled: Option<bool>,
    /// Fullscreen button.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fullscreen_enabled: Option<bool>,
    /// Loading indicator overlay.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loading_indicator_enabled: Option<bool>,
}

impl UiConfig {
    /// Every toggle set to `enabled`.
    pub fn all(enabled: bool) -> Self {
        Self {
            ar_enabled: Some(enabled),
            fullscreen_enabled: Some(enabled),
            loading_indicator_enabled: Some(enabled),
        }
    }

    /// True when no toggle is set.
    pub fn is_empty(&self) -> bool {
        self.ar_enabled.is_none()
            && self.fullscreen_enabled.is_none()
            && self.loading_indicator_enabled.is_none()
    }
}

/// Initial camera placement and limits.
///
/// Angles are in degrees, zoom values are percentages (100 = default framing).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CameraConfig {
    /// Horizontal rotation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_rotate: Option<f64>,
    /// Vertical tilt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_tilt: Option<f64>,
    /// Zoom.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_zoom: Option<f64>,
    /// Lower zoom bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_zoom: Option<f64>,
    /// Upper zoom bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_zoom: Option<f64>,
    /// Lower tilt bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_tilt: Option<f64>,
    /// Upper tilt bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tilt: Option<f64>,
}

/// Payload of a `config` message.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ViewerConfig {
    /// UI toggles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui: Option<UiConfig>,
    /// Camera placement and limits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera: Option<CameraConfig>,
}

/// Camera command verb.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CameraAction {
    /// Absolute horizontal rotation in degrees.
    Rotate,
    /// Absolute vertical tilt in degrees.
    Tilt,
    /// Zoom percentage.
    Zoom,
    /// Return to the initial placement.
    Reset,
}

/// One camera command.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CameraCommand {
    /// Command verb.
    pub action: CameraAction,
    /// Argument; absent for `reset`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

/// Every protocol message, tagged by `"type"`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Message {
    /// Visibility batch (client → viewer).
    Mutation {
        /// Mutations in application order.
        mutations: Vec<MutationDto>,
    },
    /// Node visibility report (viewer → client).
    State {
        /// Reported nodes.
        nodes: Vec<ModelNodeDto>,
        /// True for the full inventory sent once after the viewer loads.
        #[serde(rename = "isInitial", default)]
        is_initial: bool,
    },
    /// Viewer configuration (client → viewer).
    Config {
        /// UI and camera configuration.
        config: ViewerConfig,
    },
    /// Camera command batch (client → viewer).
    Camera {
        /// Commands in execution order.
        commands: Vec<CameraCommand>,
    },
    /// Snapshot request (no `data`) or developed snapshot (with `data`).
    Snapshot {
        /// Requested file name; used to match responses to requests.
        filename: String,
        /// Encoded image data (viewer → client only).
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<String>,
    },
}

impl Message {
    /// Wire tag of this message.
    pub fn type_name(&self) -> &'static str {
        match self {
            Message::Mutation { .. } => "mutation",
            Message::State { .. } => "state",
            Message::Config { .. } => "config",
            Message::Camera { .. } => "camera",
            Message::Snapshot { .. } => "snapshot",
        }
    }
}
