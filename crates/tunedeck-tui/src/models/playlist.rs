// Playlist view-model: playlist list, the loaded window of items of the
// current playlist, and the selection cursor.

use tunedeck_api::model::{ActiveItemInfo, PlaylistInfo, PlaylistItem, PlaylistItemsResult, PlaylistRef};
use tunedeck_api::Range;

#[derive(Debug, Clone, Default)]
pub struct PlaylistModel {
    playlists: Vec<PlaylistInfo>,
    items: PlaylistItemsResult,
    /// Absolute item index within the current playlist.
    cursor: usize,
}

impl PlaylistModel {
    pub fn playlists(&self) -> &[PlaylistInfo] {
        &self.playlists
    }

    /// Replace the playlist list. Returns whether it changed.
    pub fn apply_playlists(&mut self, playlists: Vec<PlaylistInfo>) -> bool {
        if self.playlists == playlists {
            return false;
        }
        let previous = self.current_id().map(str::to_string);
        self.playlists = playlists;
        if previous.as_deref() != self.current_id() {
            self.clear_items();
        }
        true
    }

    /// Replace the loaded window of items. Returns whether it changed.
    pub fn apply_items(&mut self, items: PlaylistItemsResult) -> bool {
        if self.items == items {
            return false;
        }
        self.items = items;
        self.clamp_cursor();
        true
    }

    fn clear_items(&mut self) {
        self.items = PlaylistItemsResult::default();
        self.cursor = 0;
    }

    /// The playlist marked current by the player, falling back to the first.
    pub fn current(&self) -> Option<&PlaylistInfo> {
        self.playlists
            .iter()
            .find(|p| p.is_current)
            .or_else(|| self.playlists.first())
    }

    pub fn current_id(&self) -> Option<&str> {
        self.current().map(|p| p.id.as_str())
    }

    pub fn current_ref(&self) -> Option<PlaylistRef> {
        self.current().map(|p| PlaylistRef::Id(p.id.clone()))
    }

    /// The playlist `delta` positions away from the current one, wrapping.
    pub fn neighbour(&self, delta: i32) -> Option<&PlaylistInfo> {
        let len = self.playlists.len();
        if len == 0 {
            return None;
        }
        let current = self.playlists.iter().position(|p| p.is_current).unwrap_or(0) as i64;
        let index = (current + i64::from(delta)).rem_euclid(len as i64) as usize;
        self.playlists.get(index)
    }

    pub fn total_count(&self) -> usize {
        self.items.total_count as usize
    }

    pub fn items_offset(&self) -> usize {
        self.items.offset as usize
    }

    pub fn loaded_items(&self) -> &[PlaylistItem] {
        &self.items.items
    }

    /// Item at an absolute index, when it falls inside the loaded window.
    pub fn item(&self, index: usize) -> Option<&PlaylistItem> {
        index
            .checked_sub(self.items_offset())
            .and_then(|i| self.items.items.get(i))
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn move_cursor(&mut self, delta: i32) -> bool {
        let total = self.total_count();
        if total == 0 {
            return false;
        }
        let target = (self.cursor as i64 + i64::from(delta)).clamp(0, total as i64 - 1) as usize;
        if target == self.cursor {
            return false;
        }
        self.cursor = target;
        true
    }

    fn clamp_cursor(&mut self) {
        let total = self.total_count();
        self.cursor = if total == 0 { 0 } else { self.cursor.min(total - 1) };
    }

    /// Move the cursor to the active item when it belongs to the current
    /// playlist.
    pub fn follow(&mut self, active: &ActiveItemInfo) -> bool {
        if !active.is_active() || self.current_id() != Some(active.playlist_id.as_str()) {
            return false;
        }
        let index = active.index as usize;
        if index == self.cursor {
            return false;
        }
        self.cursor = index;
        // Items of a freshly selected playlist may not have arrived yet.
        if self.total_count() > 0 {
            self.clamp_cursor();
        }
        true
    }

    /// Page-aligned item range that contains the cursor.
    pub fn window(&self, page_size: u32) -> Range {
        let page = page_size.max(1);
        let cursor = u32::try_from(self.cursor).unwrap_or(u32::MAX);
        Range::new(cursor - cursor % page, page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playlist(id: &str, index: u32, current: bool) -> PlaylistInfo {
        PlaylistInfo {
            id: id.into(),
            index,
            title: format!("List {id}"),
            is_current: current,
            item_count: 10,
            total_time: 0.0,
        }
    }

    fn items(offset: u32, total: u32, loaded: usize) -> PlaylistItemsResult {
        PlaylistItemsResult {
            offset,
            total_count: total,
            items: (0..loaded)
                .map(|i| PlaylistItem {
                    columns: vec![format!("track {}", offset as usize + i)],
                })
                .collect(),
        }
    }

    #[test]
    fn current_falls_back_to_first() {
        let mut model = PlaylistModel::default();
        assert!(model.current().is_none());

        model.apply_playlists(vec![playlist("a", 0, false), playlist("b", 1, false)]);
        assert_eq!(model.current_id(), Some("a"));

        model.apply_playlists(vec![playlist("a", 0, false), playlist("b", 1, true)]);
        assert_eq!(model.current_id(), Some("b"));
        assert_eq!(model.current_ref(), Some(PlaylistRef::Id("b".into())));
    }

    #[test]
    fn unchanged_playlists_report_no_change() {
        let mut model = PlaylistModel::default();
        assert!(model.apply_playlists(vec![playlist("a", 0, true)]));
        assert!(!model.apply_playlists(vec![playlist("a", 0, true)]));
    }

    #[test]
    fn switching_playlist_drops_items() {
        let mut model = PlaylistModel::default();
        model.apply_playlists(vec![playlist("a", 0, true), playlist("b", 1, false)]);
        model.apply_items(items(0, 5, 5));
        model.move_cursor(3);

        model.apply_playlists(vec![playlist("a", 0, false), playlist("b", 1, true)]);
        assert_eq!(model.total_count(), 0);
        assert_eq!(model.cursor(), 0);
    }

    #[test]
    fn neighbour_wraps() {
        let mut model = PlaylistModel::default();
        model.apply_playlists(vec![
            playlist("a", 0, false),
            playlist("b", 1, false),
            playlist("c", 2, true),
        ]);
        assert_eq!(model.neighbour(1).unwrap().id, "a");
        assert_eq!(model.neighbour(-1).unwrap().id, "b");
        assert_eq!(model.neighbour(0).unwrap().id, "c");
    }

    #[test]
    fn cursor_is_clamped_to_total() {
        let mut model = PlaylistModel::default();
        model.apply_playlists(vec![playlist("a", 0, true)]);
        model.apply_items(items(0, 4, 4));

        assert!(model.move_cursor(10));
        assert_eq!(model.cursor(), 3);
        assert!(!model.move_cursor(1));
        assert!(model.move_cursor(-10));
        assert_eq!(model.cursor(), 0);

        model.move_cursor(3);
        model.apply_items(items(0, 2, 2));
        assert_eq!(model.cursor(), 1);
    }

    #[test]
    fn item_lookup_respects_window_offset() {
        let mut model = PlaylistModel::default();
        model.apply_playlists(vec![playlist("a", 0, true)]);
        model.apply_items(items(100, 300, 50));

        assert!(model.item(99).is_none());
        assert_eq!(model.item(100).unwrap().columns[0], "track 100");
        assert_eq!(model.item(149).unwrap().columns[0], "track 149");
        assert!(model.item(150).is_none());
    }

    #[test]
    fn follow_only_tracks_current_playlist() {
        let mut model = PlaylistModel::default();
        model.apply_playlists(vec![playlist("a", 0, true)]);
        model.apply_items(items(0, 10, 10));

        let mut active = ActiveItemInfo {
            playlist_id: "other".into(),
            playlist_index: 1,
            index: 7,
            ..ActiveItemInfo::default()
        };
        assert!(!model.follow(&active));

        active.playlist_id = "a".into();
        assert!(model.follow(&active));
        assert_eq!(model.cursor(), 7);
        assert!(!model.follow(&active));
    }

    #[test]
    fn window_is_page_aligned() {
        let mut model = PlaylistModel::default();
        model.apply_playlists(vec![playlist("a", 0, true)]);
        model.apply_items(items(0, 2000, 10));

        assert_eq!(model.window(500), Range::new(0, 500));
        model.move_cursor(742);
        assert_eq!(model.window(500), Range::new(500, 500));
    }
}
