//! Cuetrace: source-position mapping for live-coded pattern editors.
//!
//! A document is split into setup statements and pattern blocks, the blocks
//! are assembled into one evaluable unit, and every location the engine
//! reports in that unit is translated back to a range of the document so the
//! editor can highlight it while the pattern plays.

pub mod assemble;
pub mod config;
pub mod editor;
pub mod engine;
pub mod error;
pub mod highlight;
pub mod mapping;
pub mod render;
pub mod session;
pub mod source;

pub use config::Config;
pub use editor::{DocumentSource, Editor};
pub use engine::{ActiveEvent, Evaluation, MiniEngine, PatternEngine};
pub use error::{ConfigError, EvaluationError};
pub use highlight::{DriverState, HighlightDriver, MarkSink};
pub use mapping::MappingContext;
pub use render::Decorations;
pub use session::{EvalStatus, LiveSession};
pub use source::TextRange;
