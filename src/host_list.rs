use crate::models::HostRecord;

/// Filterable, scrollable list of hosts with a single cursor.
///
/// `cursor` and `offset` index into the filtered view, never into the
/// underlying records, which stay untouched for the lifetime of the list.
#[derive(Debug, Clone)]
pub struct HostList {
    hosts: Vec<HostRecord>,
    filter: String,
    visible: Vec<usize>,
    cursor: Option<usize>,
    offset: usize,
    page_size: usize,
}

impl HostList {
    pub fn new(hosts: Vec<HostRecord>) -> Self {
        let mut list = Self {
            hosts,
            filter: String::new(),
            visible: Vec::new(),
            cursor: None,
            offset: 0,
            page_size: 1,
        };
        list.apply_filter();
        list
    }

    pub fn hosts(&self) -> &[HostRecord] {
        &self.hosts
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    /// Records passing the current filter, in config order.
    pub fn visible(&self) -> impl Iterator<Item = &HostRecord> {
        self.visible.iter().map(|&idx| &self.hosts[idx])
    }

    pub fn highlighted(&self) -> Option<&HostRecord> {
        self.cursor
            .and_then(|pos| self.visible.get(pos))
            .map(|&idx| &self.hosts[idx])
    }

    pub fn activate(&self) -> Option<HostRecord> {
        self.highlighted().cloned()
    }

    #[cfg(test)]
    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.filter = filter.into();
        self.apply_filter();
    }

    pub fn push_filter_char(&mut self, c: char) {
        self.filter.push(c);
        self.apply_filter();
    }

    pub fn pop_filter_char(&mut self) {
        if self.filter.pop().is_some() {
            self.apply_filter();
        }
    }

    pub fn clear_filter(&mut self) {
        if !self.filter.is_empty() {
            self.filter.clear();
            self.apply_filter();
        }
    }

    fn apply_filter(&mut self) {
        let previous = self.cursor.and_then(|pos| self.visible.get(pos).copied());
        let needle = self.filter.to_lowercase();

        self.visible = self
            .hosts
            .iter()
            .enumerate()
            .filter(|(_, host)| host.filter_value().to_lowercase().contains(&needle))
            .map(|(i, _)| i)
            .collect();

        // Keep the highlighted record if it survived the filter.
        self.cursor = if self.visible.is_empty() {
            None
        } else {
            Some(
                previous
                    .and_then(|idx| self.visible.iter().position(|&v| v == idx))
                    .unwrap_or(0),
            )
        };
        self.scroll_to_cursor();
    }

    pub fn select_next(&mut self) {
        if let Some(pos) = self.cursor {
            self.cursor = Some((pos + 1) % self.visible.len());
            self.scroll_to_cursor();
        }
    }

    pub fn select_previous(&mut self) {
        if let Some(pos) = self.cursor {
            let total = self.visible.len();
            self.cursor = Some((pos + total - 1) % total);
            self.scroll_to_cursor();
        }
    }

    pub fn page_down(&mut self) {
        if let Some(pos) = self.cursor {
            self.cursor = Some((pos + self.page_size).min(self.visible.len() - 1));
            self.scroll_to_cursor();
        }
    }

    pub fn page_up(&mut self) {
        if let Some(pos) = self.cursor {
            self.cursor = Some(pos.saturating_sub(self.page_size));
            self.scroll_to_cursor();
        }
    }

    pub fn select_first(&mut self) {
        if self.cursor.is_some() {
            self.cursor = Some(0);
            self.scroll_to_cursor();
        }
    }

    pub fn select_last(&mut self) {
        if self.cursor.is_some() {
            self.cursor = Some(self.visible.len() - 1);
            self.scroll_to_cursor();
        }
    }

    /// Number of entries that fit on screen changed.
    pub fn resize(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.scroll_to_cursor();
    }

    fn scroll_to_cursor(&mut self) {
        let Some(pos) = self.cursor else {
            self.offset = 0;
            return;
        };
        if pos < self.offset {
            self.offset = pos;
        } else if pos >= self.offset + self.page_size {
            self.offset = pos + 1 - self.page_size;
        }
        // Don't leave empty rows at the bottom when the window grows.
        self.offset = self
            .offset
            .min(self.visible.len().saturating_sub(self.page_size));
    }
}
