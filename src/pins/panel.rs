//! The single authoritative pinned list for the app session. All mutation
//! goes through here, and every committed mutation re-syncs the persisted
//! copy in mutation order. An empty list deletes the persisted file instead
//! of writing `[]`; that asymmetry lives here, not in the store.

use super::store::PinStore;
use super::{layout, PinnedItem, Position, Size};

pub struct PanelStore {
    items: Vec<PinnedItem>,
    store: PinStore,
}

impl PanelStore {
    /// Open against a persisted store, seeding from whatever it holds.
    pub fn open(store: PinStore) -> Self {
        let items = store.load().unwrap_or_default();
        if !items.is_empty() {
            log::info!("restored {} pinned item(s)", items.len());
        }
        Self { items, store }
    }

    pub fn items(&self) -> &[PinnedItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&PinnedItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Append a new pinned answer. Callers guarantee a non-empty query.
    pub fn pin(&mut self, query: String, response: String, category: String) {
        let item = PinnedItem::new(self.items.len(), query, response, category);
        log::info!("pinned {} under {}", item.id, item.category);
        self.items.push(item);
        self.sync();
    }

    /// Remove by id; unknown ids are a silent no-op.
    pub fn unpin(&mut self, id: &str) {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        if self.items.len() != before {
            self.sync();
        }
    }

    pub fn update_position(&mut self, id: &str, position: Position) {
        if let Some(item) = self.items.iter_mut().find(|item| item.id == id) {
            item.position = position;
            self.sync();
        }
    }

    pub fn update_size(&mut self, id: &str, size: Size) {
        if let Some(item) = self.items.iter_mut().find(|item| item.id == id) {
            item.size = size;
            self.sync();
        }
    }

    /// Empty the list. Destructive and irreversible; the view keeps this
    /// behind an explicit confirmation dialog.
    pub fn clear_all(&mut self) {
        if self.items.is_empty() {
            return;
        }
        log::info!("cleared {} pinned item(s)", self.items.len());
        self.items.clear();
        self.sync();
    }

    /// Reset every position to the deterministic two-column grid.
    pub fn auto_arrange(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.items = layout::auto_arrange(std::mem::take(&mut self.items));
        self.sync();
    }

    fn sync(&self) {
        let result = if self.items.is_empty() {
            self.store.delete()
        } else {
            self.store.save(&self.items)
        };
        if let Err(err) = result {
            log::warn!("failed to persist pinned items: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pins::DEFAULT_CARD_SIZE;

    fn open_panel(dir: &tempfile::TempDir) -> PanelStore {
        PanelStore::open(PinStore::new(dir.path().join("pins.json")))
    }

    fn pin_loan_question(panel: &mut PanelStore) {
        panel.pin(
            "本月不良贷款率是多少？".to_string(),
            "当前不良贷款率为1.35%，较上季度下降0.04个百分点。".to_string(),
            "贷款业务".to_string(),
        );
    }

    #[test]
    fn pin_appends_with_staggered_position_and_default_size() {
        let dir = tempfile::tempdir().expect("temp dir should create");
        let mut panel = open_panel(&dir);

        pin_loan_question(&mut panel);
        assert_eq!(panel.len(), 1);
        let item = &panel.items()[0];
        assert_eq!(item.category, "贷款业务");
        assert_eq!(item.position, Position { x: 30, y: 30 });
        assert_eq!(item.size, DEFAULT_CARD_SIZE);
        assert!(item.generator.is_some());
    }

    #[test]
    fn mutations_survive_a_reload() {
        let dir = tempfile::tempdir().expect("temp dir should create");
        let id;
        {
            let mut panel = open_panel(&dir);
            pin_loan_question(&mut panel);
            id = panel.items()[0].id.clone();
            panel.update_position(&id, Position { x: 200, y: 150 });
            panel.update_size(
                &id,
                Size {
                    width: 700.0,
                    height: 500.0,
                },
            );
        }

        let reloaded = open_panel(&dir);
        assert_eq!(reloaded.len(), 1);
        let item = reloaded.get(&id).expect("item should survive reload");
        assert_eq!(item.position, Position { x: 200, y: 150 });
        assert_eq!(item.size.width, 700.0);
        assert!(item.generator.is_some());
    }

    #[test]
    fn unpinning_the_last_item_deletes_the_persisted_file() {
        let dir = tempfile::tempdir().expect("temp dir should create");
        let store_probe = PinStore::new(dir.path().join("pins.json"));
        let mut panel = open_panel(&dir);

        pin_loan_question(&mut panel);
        assert!(store_probe.exists());

        let id = panel.items()[0].id.clone();
        panel.unpin(&id);
        assert!(panel.is_empty());
        assert!(!store_probe.exists());
        assert!(store_probe.load().is_none());
    }

    #[test]
    fn unknown_id_mutations_are_silent_no_ops() {
        let dir = tempfile::tempdir().expect("temp dir should create");
        let store_probe = PinStore::new(dir.path().join("pins.json"));
        let mut panel = open_panel(&dir);
        pin_loan_question(&mut panel);

        panel.unpin("no-such-id");
        panel.update_position("no-such-id", Position { x: 1, y: 1 });
        panel.update_size(
            "no-such-id",
            Size {
                width: 500.0,
                height: 400.0,
            },
        );
        assert_eq!(panel.len(), 1);
        assert_eq!(panel.items()[0].position, Position { x: 30, y: 30 });
        assert!(store_probe.exists());
    }

    #[test]
    fn clear_all_empties_the_list_and_the_file() {
        let dir = tempfile::tempdir().expect("temp dir should create");
        let store_probe = PinStore::new(dir.path().join("pins.json"));
        let mut panel = open_panel(&dir);

        pin_loan_question(&mut panel);
        panel.pin(
            "存款增长趋势".to_string(),
            "存款余额858亿元。".to_string(),
            "存款业务".to_string(),
        );
        panel.clear_all();

        assert!(panel.is_empty());
        assert!(!store_probe.exists());
    }

    #[test]
    fn auto_arrange_resets_positions_in_insertion_order() {
        let dir = tempfile::tempdir().expect("temp dir should create");
        let mut panel = open_panel(&dir);
        for n in 0..3 {
            panel.pin(
                format!("问题{n}"),
                format!("回答{n}"),
                "综合分析".to_string(),
            );
        }
        let first = panel.items()[0].id.clone();
        panel.update_position(&first, Position { x: 900, y: 900 });

        panel.auto_arrange();
        let positions: Vec<Position> = panel.items().iter().map(|item| item.position).collect();
        assert_eq!(
            positions,
            vec![
                Position { x: 30, y: 30 },
                Position { x: 610, y: 30 },
                Position { x: 30, y: 460 },
            ]
        );
    }
}
