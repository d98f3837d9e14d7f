mod engine;
mod metrics;
mod scene;
mod style;

pub use engine::layout_invoice;
pub use metrics::{text_width, wrap_text};
pub use scene::{Align, Block, BlockKind, Corners, Document, Node, Page, Rect, Rule, Stroke, Text};
pub use style::{Color, Style};
