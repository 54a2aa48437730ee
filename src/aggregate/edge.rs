//! Value-stream map edges
//!
//! Edges keep the canvas styling they were created with so that export and import are
//! lossless. The flow kind is an explicit tag when the edge was created by this crate and is
//! otherwise inferred from the data bag and the dash pattern.

use crate::value_objects::{AttributeBag, EdgeId, FlowKind, NodeId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Stroke styling of an edge
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeStyle {
    /// Line width
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
    /// Line color
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,
    /// Dash pattern, `"0"` or absent for a solid line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_dasharray: Option<String>,
    /// Any other style keys
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl EdgeStyle {
    /// Solid or dashed stroke
    pub fn new(width: f64, stroke: Option<&str>, dasharray: Option<&str>) -> Self {
        Self {
            stroke_width: Some(width),
            stroke: stroke.map(str::to_string),
            stroke_dasharray: dasharray.map(str::to_string),
            extra: IndexMap::new(),
        }
    }

    /// Whether the stroke is dashed
    pub fn is_dashed(&self) -> bool {
        self.stroke_dasharray
            .as_deref()
            .map(str::trim)
            .map_or(false, |dash| !dash.is_empty() && dash != "0")
    }
}

/// Arrowhead shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MarkerKind {
    /// Filled arrowhead
    ArrowClosed,
    /// Open arrowhead
    ArrowOpen,
    /// Marker this crate does not know about
    Custom(String),
}

impl MarkerKind {
    /// Create a marker kind from a string
    pub fn from_str(s: &str) -> Self {
        match s {
            "arrowclosed" => MarkerKind::ArrowClosed,
            "arrow" => MarkerKind::ArrowOpen,
            _ => MarkerKind::Custom(s.to_string()),
        }
    }

    /// Get the string representation of the marker kind
    pub fn as_str(&self) -> &str {
        match self {
            MarkerKind::ArrowClosed => "arrowclosed",
            MarkerKind::ArrowOpen => "arrow",
            MarkerKind::Custom(s) => s,
        }
    }
}

impl From<String> for MarkerKind {
    fn from(s: String) -> Self {
        MarkerKind::from_str(&s)
    }
}

impl From<MarkerKind> for String {
    fn from(kind: MarkerKind) -> Self {
        kind.as_str().to_string()
    }
}

/// Arrowhead at the end of an edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeMarker {
    /// Arrowhead shape
    #[serde(rename = "type")]
    pub kind: MarkerKind,
    /// Arrowhead color
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl EdgeMarker {
    /// Filled arrowhead
    pub fn closed(color: Option<&str>) -> Self {
        Self {
            kind: MarkerKind::ArrowClosed,
            color: color.map(str::to_string),
        }
    }

    /// Open arrowhead
    pub fn open() -> Self {
        Self {
            kind: MarkerKind::ArrowOpen,
            color: None,
        }
    }
}

/// An edge of a value-stream map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VsmEdge {
    /// Unique identifier within the map
    pub id: EdgeId,
    /// Upstream node
    pub source: NodeId,
    /// Downstream node
    pub target: NodeId,
    /// Explicit flow tag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow: Option<FlowKind>,
    /// Attribute bag (transport time and cost, kanban and simulation flags)
    #[serde(default)]
    pub data: AttributeBag,
    /// Stroke styling
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<EdgeStyle>,
    /// Arrowhead
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker_end: Option<EdgeMarker>,
    /// Optional caption
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Animated stroke
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub animated: bool,
    /// Presentation keys the domain does not interpret (type, handles, ...)
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl VsmEdge {
    /// Create an unstyled edge
    pub fn new(id: impl Into<EdgeId>, source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            flow: None,
            data: AttributeBag::new(),
            style: None,
            marker_end: None,
            label: None,
            animated: false,
            extra: IndexMap::new(),
        }
    }

    /// An edge drawn by hand, styled for its flow kind
    ///
    /// Material is a solid closed arrow, information a dashed open arrow marked `manual`, and
    /// electronic an animated cyan dash.
    pub fn connection(
        id: impl Into<EdgeId>,
        source: impl Into<NodeId>,
        target: impl Into<NodeId>,
        flow: FlowKind,
    ) -> Self {
        let edge = Self::new(id, source, target)
            .with_flow(flow)
            .with_path_type("smoothstep");
        match flow {
            FlowKind::Material => edge
                .with_style(EdgeStyle::new(2.0, None, None))
                .with_marker(EdgeMarker::closed(None)),
            FlowKind::Information => {
                let mut edge = edge
                    .with_style(EdgeStyle::new(1.5, None, Some("5 5")))
                    .with_marker(EdgeMarker::open());
                edge.data.set("type", "manual");
                edge
            }
            FlowKind::Electronic => {
                let mut edge = edge
                    .with_style(EdgeStyle::new(2.0, Some("#00ffff"), Some("5 5")))
                    .with_marker(EdgeMarker::closed(None));
                edge.data.set("type", "electronic");
                edge.data.set("infoType", "electronic");
                edge.animated = true;
                edge
            }
        }
    }

    /// Tag the flow kind
    pub fn with_flow(mut self, flow: FlowKind) -> Self {
        self.flow = Some(flow);
        self
    }

    /// Set the stroke styling
    pub fn with_style(mut self, style: EdgeStyle) -> Self {
        self.style = Some(style);
        self
    }

    /// Set the arrowhead
    pub fn with_marker(mut self, marker: EdgeMarker) -> Self {
        self.marker_end = Some(marker);
        self
    }

    /// Set the caption
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the canvas edge type (`smoothstep`, `step`, ...)
    pub fn with_path_type(mut self, path_type: &str) -> Self {
        self.extra.insert("type".to_string(), Value::from(path_type));
        self
    }

    /// Flow kind of the edge
    ///
    /// Resolution order: the explicit tag, the `type`/`infoType` data keys, the edge symbol
    /// (push arrows are material, kanban cards information), then a dashed stroke. Anything else is material flow.
    pub fn flow(&self) -> FlowKind {
        if let Some(flow) = self.flow {
            return flow;
        }
        let info_type = self
            .data
            .text("type")
            .or_else(|| self.data.text("infoType"));
        match info_type {
            Some("electronic") => return FlowKind::Electronic,
            Some("information") | Some("manual") => return FlowKind::Information,
            Some("material") => return FlowKind::Material,
            _ => {}
        }
        match self.data.text("symbolType") {
            Some("push_arrow") => return FlowKind::Material,
            Some(symbol) if symbol.starts_with("kanban") || symbol == "signal_kanban" => {
                return FlowKind::Information
            }
            _ => {}
        }
        if self.style.as_ref().map_or(false, EdgeStyle::is_dashed) {
            return FlowKind::Information;
        }
        FlowKind::Material
    }

    /// Whether the edge touches the node
    pub fn touches(&self, node: &NodeId) -> bool {
        &self.source == node || &self.target == node
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Test Coverage
    ///
    /// ```mermaid
    /// graph TD
    ///     E[VsmEdge] --> F[Flow inference]
    ///     E --> S[Style]
    ///     E --> W[Wire format]
    /// ```

    #[test]
    fn test_flow_inference_order() {
        let tagged = VsmEdge::new("e1", "a", "b").with_flow(FlowKind::Electronic);
        assert_eq!(tagged.flow(), FlowKind::Electronic);

        let mut manual = VsmEdge::new("e2", "a", "b");
        manual.data.set("type", "manual");
        assert_eq!(manual.flow(), FlowKind::Information);

        let dashed = VsmEdge::new("e3", "a", "b").with_style(EdgeStyle::new(1.5, None, Some("5 5")));
        assert_eq!(dashed.flow(), FlowKind::Information);

        let push = VsmEdge::new("e4", "a", "b").with_style(EdgeStyle::new(2.0, Some("#fff"), Some("0")));
        assert_eq!(push.flow(), FlowKind::Material);

        let mut arrow = VsmEdge::new("e5", "a", "b").with_style(EdgeStyle::new(2.0, None, Some("5 5")));
        arrow.data.set("symbolType", "push_arrow");
        assert_eq!(arrow.flow(), FlowKind::Material);

        let mut withdrawal = VsmEdge::new("e6", "a", "b");
        withdrawal.data.set("symbolType", "kanban_withdrawal");
        assert_eq!(withdrawal.flow(), FlowKind::Information);
    }

    #[test]
    fn test_connection_styling() {
        let material = VsmEdge::connection("m", "a", "b", FlowKind::Material);
        assert!(!material.style.as_ref().unwrap().is_dashed());
        assert_eq!(material.extra.get("type"), Some(&json!("smoothstep")));

        let info = VsmEdge::connection("i", "a", "b", FlowKind::Information);
        assert_eq!(info.marker_end.as_ref().unwrap().kind, MarkerKind::ArrowOpen);
        assert_eq!(info.data.text("type"), Some("manual"));
        assert_eq!(info.style.as_ref().unwrap().stroke_width, Some(1.5));

        let electronic = VsmEdge::connection("x", "a", "b", FlowKind::Electronic);
        assert!(electronic.animated);
        assert_eq!(electronic.style.as_ref().unwrap().stroke.as_deref(), Some("#00ffff"));

        let mut untagged = electronic.clone();
        untagged.flow = None;
        assert_eq!(untagged.flow(), FlowKind::Electronic);
    }

    #[test]
    fn test_wire_format_round_trip() {
        let raw = json!({
            "id": "info_ctrl_s_1",
            "source": "node_control",
            "target": "node_supp_1",
            "data": {},
            "style": { "strokeWidth": 1.5, "stroke": "#0078d4", "strokeDasharray": "5,5" },
            "markerEnd": { "type": "arrowclosed", "color": "#0078d4" },
            "animated": true,
            "type": "smoothstep",
            "sourceHandle": "right"
        });
        let edge: VsmEdge = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(edge.marker_end.as_ref().unwrap().kind, MarkerKind::ArrowClosed);
        assert_eq!(edge.extra.get("sourceHandle"), Some(&json!("right")));
        assert_eq!(edge.flow(), FlowKind::Information);

        assert_eq!(serde_json::to_value(&edge).unwrap(), raw);
    }
}
