//! CollabPad Core Library
//!
//! Platform-agnostic canvas editing, document tree and undo history for the
//! CollabPad whiteboard. Rendering, file pickers and export live in the host.

pub mod camera;
pub mod canvas;
pub mod config;
pub mod document;
pub mod elements;
pub mod event_handler;
pub mod history;
pub mod image_cache;
pub mod input;
pub mod poll;
pub mod selection;
pub mod session;
pub mod storage;
pub mod tools;
pub mod widget;

pub use camera::{Camera, to_canvas};
pub use canvas::{Canvas, ChangeKind, Preferences, SubscriptionId};
pub use config::{CanvasConfig, ConfigError};
pub use document::{DocumentTree, Notebook, NotebookId, Page, PageId};
pub use elements::{Element, ElementDraft, ElementId, ElementKind, ElementPatch};
pub use event_handler::EventHandler;
pub use history::{History, HistoryBook, MAX_UNDO_HISTORY};
pub use image_cache::{ImageCache, LoadedImage};
pub use input::{InputState, Key, KeyEvent, Modifiers, MouseButton, PointerEvent};
pub use poll::{Poll, PollOption, Question, UserId};
pub use selection::{ManipulationState, TransformPreview};
pub use session::{Participant, Session, SessionError, SessionManager};
pub use storage::{BlobStore, MemoryStorage, PersistedState, StorageError};
pub use tools::{ToolKind, ToolManager, ToolSettings};
pub use widget::{WidgetManager, WidgetState};
