//! Value-stream map aggregate

pub mod coupling;
mod edge;
mod flow;
mod node;
mod value_stream_map;

pub use coupling::{DurationLookup, NoProjects};
pub use edge::{EdgeMarker, EdgeStyle, MarkerKind, VsmEdge};
pub use flow::MaterialFlow;
pub use node::VsmNode;
pub use value_stream_map::ValueStreamMap;
