// File browser view-model.

use std::cmp::Ordering;

use tunedeck_api::model::{BrowserEntries, BrowserRoots, FileSystemEntry};

#[derive(Debug, Clone, Default)]
pub struct BrowserModel {
    roots: Vec<FileSystemEntry>,
    /// `None` while showing the root list.
    path: Option<String>,
    entries: Vec<FileSystemEntry>,
    path_separator: String,
    cursor: usize,
}

impl BrowserModel {
    pub fn apply_roots(&mut self, roots: BrowserRoots) -> bool {
        let changed = self.roots != roots.roots || self.path.is_some();
        self.roots = roots.roots;
        self.path_separator = roots.path_separator;
        self.path = None;
        self.entries.clear();
        if changed {
            self.cursor = 0;
        }
        changed
    }

    /// Show the contents of `path`. Directories sort first, then by name
    /// ignoring case.
    pub fn apply_entries(&mut self, path: String, listing: BrowserEntries) -> bool {
        let mut entries = listing.entries;
        entries.sort_by(compare_entries);

        let same_dir = self.path.as_deref() == Some(path.as_str());
        if same_dir && self.entries == entries {
            return false;
        }
        if !same_dir {
            self.cursor = 0;
        }
        if !listing.path_separator.is_empty() {
            self.path_separator = listing.path_separator;
        }
        self.path = Some(path);
        self.entries = entries;
        self.clamp_cursor();
        true
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn is_at_roots(&self) -> bool {
        self.path.is_none()
    }

    pub fn visible(&self) -> &[FileSystemEntry] {
        match self.path {
            Some(_) => &self.entries,
            None => &self.roots,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn selected(&self) -> Option<&FileSystemEntry> {
        self.visible().get(self.cursor)
    }

    pub fn move_cursor(&mut self, delta: i32) -> bool {
        let len = self.visible().len();
        if len == 0 {
            return false;
        }
        let target = (self.cursor as i64 + i64::from(delta)).clamp(0, len as i64 - 1) as usize;
        if target == self.cursor {
            return false;
        }
        self.cursor = target;
        true
    }

    fn clamp_cursor(&mut self) {
        let len = self.visible().len();
        self.cursor = if len == 0 { 0 } else { self.cursor.min(len - 1) };
    }

    /// Where "go up" leads: `Some(None)` for the root list, `Some(Some(dir))`
    /// for a parent directory, `None` when already at the roots.
    pub fn parent(&self) -> Option<Option<String>> {
        let path = self.path.as_deref()?;
        if self.roots.iter().any(|r| r.path == path) {
            return Some(None);
        }

        let separator = if self.path_separator.is_empty() {
            "/"
        } else {
            self.path_separator.as_str()
        };
        let trimmed = path.strip_suffix(separator).unwrap_or(path);
        match trimmed.rsplit_once(separator) {
            Some((parent, _)) if !parent.is_empty() => {
                // A root is addressed by its own spelling (`D:\`, not `D:`).
                let root = self
                    .roots
                    .iter()
                    .find(|r| r.path.trim_end_matches(separator) == parent);
                Some(Some(root.map_or_else(|| parent.to_string(), |r| r.path.clone())))
            }
            _ => Some(None),
        }
    }

    /// Path shown above the listing.
    pub fn breadcrumb(&self) -> String {
        self.path.clone().unwrap_or_else(|| "Roots".to_string())
    }
}

fn compare_entries(a: &FileSystemEntry, b: &FileSystemEntry) -> Ordering {
    b.is_directory()
        .cmp(&a.is_directory())
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
}
