pub mod adapter;
pub mod background;
pub mod config;
pub mod edit;
pub mod editor;
pub mod error;
pub mod headless;
pub mod history;
pub mod layers;
pub mod order;
pub mod spacing;
pub mod store;
pub mod task;

pub use adapter::{Completion, ExportedImage, SceneAdapter, TaskOutput};
pub use background::Background;
pub use config::{ConfigError, EditorConfig};
pub use edit::{PropertyEdit, opacity_percent};
pub use editor::{Editor, Notice, NoticeLevel, Selection};
pub use error::{AdapterError, EditorError, EditorResult, StoreError};
pub use headless::HeadlessScene;
pub use history::{HISTORY_CAPACITY, HistoryEngine, Snapshot};
pub use layers::LayerStore;
pub use order::Direction;
pub use spacing::{Axis, SpacingHint, SpacingHintEngine, compute_hints};
pub use store::{FileStore, MemoryStore, PersistedState, StateStore};
pub use task::{TaskGuard, TaskKind, TaskTicket};
