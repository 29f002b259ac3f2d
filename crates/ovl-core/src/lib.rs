pub mod geometry;
pub mod id;
pub mod model;
pub mod scene;

pub use geometry::{Bounds, TextSize, estimate_text_size, text_bounds};
pub use id::ElementId;
pub use model::*;
pub use scene::{SceneDocument, SceneGraph};
