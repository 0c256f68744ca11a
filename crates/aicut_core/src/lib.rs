pub mod captions;
pub mod editing;
pub mod error;
pub mod projection;
pub mod settings;
pub mod store;
pub mod types;

pub use captions::{align_captions, AlignmentOutcome, CaptionSpan, DropReason, DroppedCaption};
pub use editing::Editor;
pub use error::{CoreError, Result};
pub use projection::{project, Projection};
pub use settings::EditorSettings;
pub use store::ClipStore;
pub use types::{Clip, ClipKind, TimeUs};
