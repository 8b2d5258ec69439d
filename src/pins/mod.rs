use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod generator;
pub mod layout;
pub mod panel;
pub mod store;

pub use generator::MetricsGenerator;

pub const MIN_CARD_WIDTH: f32 = 400.0;
pub const MAX_CARD_WIDTH: f32 = 1200.0;
pub const MIN_CARD_HEIGHT: f32 = 300.0;
pub const MAX_CARD_HEIGHT: f32 = 1000.0;

pub const DEFAULT_CARD_SIZE: Size = Size {
    width: 550.0,
    height: 400.0,
};

/// Top-left offset of a card on the canvas, in logical pixels.
/// Both axes stay non-negative; mutations clamp rather than reject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    /// Clamp to the card bounds. Applied at the resize-affordance boundary,
    /// not inside the layout engine.
    pub fn clamp_to_bounds(self) -> Size {
        Size {
            width: self.width.clamp(MIN_CARD_WIDTH, MAX_CARD_WIDTH),
            height: self.height.clamp(MIN_CARD_HEIGHT, MAX_CARD_HEIGHT),
        }
    }
}

/// One pinned assistant answer placed on the workspace canvas.
///
/// The `generator` is a derived capability, never persisted: it is rebuilt
/// from `(category, query)` after deserialization. A missing generator
/// degrades the metrics grid in the view, nothing else.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PinnedItem {
    pub id: String,
    pub query: String,
    pub response: String,
    pub category: String,
    pub timestamp: DateTime<Local>,
    pub position: Position,
    pub size: Size,
    #[serde(skip)]
    pub generator: Option<MetricsGenerator>,
}

impl PinnedItem {
    /// Build a new item for insertion at `index` in the pinned list.
    pub fn new(index: usize, query: String, response: String, category: String) -> Self {
        let generator = Some(MetricsGenerator::new(&category, &query));
        Self {
            id: Uuid::new_v4().to_string(),
            query,
            response,
            category,
            timestamp: Local::now(),
            position: layout::staggered_position(index),
            size: DEFAULT_CARD_SIZE,
            generator,
        }
    }

    pub fn rebuild_generator(&mut self) {
        self.generator = Some(MetricsGenerator::new(&self.category, &self.query));
    }
}
