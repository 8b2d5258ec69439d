//! Pure geometry for the pinned canvas: the two-column auto-arrange grid and
//! drag/resize arithmetic. No side effects, no randomness; clamping of sizes
//! is the caller's job at the resize-affordance boundary.

use super::{PinnedItem, Position, Size};

const GRID_MARGIN: i32 = 30;
const COLUMN_STRIDE: i32 = 580;
const ROW_STRIDE: i32 = 430;

/// Grid slot for a card at `index` in the pinned list: two columns, rows
/// stacked downwards.
pub fn staggered_position(index: usize) -> Position {
    let index = index as i32;
    Position {
        x: GRID_MARGIN + (index % 2) * COLUMN_STRIDE,
        y: GRID_MARGIN + (index / 2) * ROW_STRIDE,
    }
}

/// Recompute every position from list order alone. Sizes, ids and the rest
/// of each item pass through untouched.
pub fn auto_arrange(items: Vec<PinnedItem>) -> Vec<PinnedItem> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, mut item)| {
            item.position = staggered_position(index);
            item
        })
        .collect()
}

/// Translate an item by a drag delta, clamped so neither axis goes negative.
pub fn apply_drag(item: &PinnedItem, dx: f32, dy: f32) -> Position {
    Position {
        x: (item.position.x as f32 + dx).round().max(0.0) as i32,
        y: (item.position.y as f32 + dy).round().max(0.0) as i32,
    }
}

/// Grow or shrink an item by a resize delta. Unclamped: only the
/// bottom/right handles exist, and the view clamps before committing.
pub fn apply_resize(item: &PinnedItem, dw: f32, dh: f32) -> Size {
    Size {
        width: item.size.width + dw,
        height: item.size.height + dh,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item_at(x: i32, y: i32) -> PinnedItem {
        let mut item = PinnedItem::new(
            0,
            "测试".to_string(),
            "测试".to_string(),
            "综合分析".to_string(),
        );
        item.position = Position { x, y };
        item
    }

    #[test]
    fn auto_arrange_is_deterministic_over_insertion_order() {
        let items = vec![item_at(999, 999), item_at(5, 5), item_at(0, 0)];
        let ids: Vec<String> = items.iter().map(|item| item.id.clone()).collect();

        let arranged = auto_arrange(items);
        let positions: Vec<Position> = arranged.iter().map(|item| item.position).collect();
        assert_eq!(
            positions,
            vec![
                Position { x: 30, y: 30 },
                Position { x: 610, y: 30 },
                Position { x: 30, y: 460 },
            ]
        );
        // Order and identity survive the pass.
        let arranged_ids: Vec<String> = arranged.iter().map(|item| item.id.clone()).collect();
        assert_eq!(arranged_ids, ids);
    }

    #[test]
    fn drag_clamps_to_the_canvas_origin() {
        let item = item_at(40, 20);
        assert_eq!(
            apply_drag(&item, -100.0, -100.0),
            Position { x: 0, y: 0 }
        );
        assert_eq!(
            apply_drag(&item, 10.4, 9.6),
            Position { x: 50, y: 30 }
        );
    }

    #[test]
    fn resize_adds_deltas_without_clamping() {
        let item = item_at(0, 0);
        let grown = apply_resize(&item, 100.0, -50.0);
        assert_eq!(grown.width, item.size.width + 100.0);
        assert_eq!(grown.height, item.size.height - 50.0);

        // The affordance boundary clamps, not the engine.
        let shrunk = apply_resize(&item, -10_000.0, -10_000.0).clamp_to_bounds();
        assert_eq!(shrunk.width, crate::pins::MIN_CARD_WIDTH);
        assert_eq!(shrunk.height, crate::pins::MIN_CARD_HEIGHT);
    }
}
