// ── Keyed, sortable table model ──
//
// The display surface the reconciler targets: rows are indexed by a
// stable key, order is derived from the sort column, and selection is
// tracked by key so resorts and reconcile passes never move the user's
// focus to a different logical row.

use std::collections::{HashMap, HashSet};

/// One column of a table: header text plus alignment.
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub title: &'static str,
    pub right_align: bool,
}

impl Column {
    pub const fn left(title: &'static str) -> Self {
        Self { title, right_align: false }
    }

    pub const fn right(title: &'static str) -> Self {
        Self { title, right_align: true }
    }
}

/// Row describer: one definition point per displayed entity type.
pub trait TableRow {
    fn columns() -> &'static [Column];
    /// Display cells, same length and order as [`columns()`](Self::columns).
    fn cells(&self) -> Vec<String>;
}

/// What a reconcile pass actually did. Mostly interesting to tests; the
/// UI only needs row counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub inserted: usize,
    pub updated: usize,
    pub removed: usize,
}

/// Keyed row storage with a derived sort order and key-stable selection.
#[derive(Debug)]
pub struct TableModel {
    columns: &'static [Column],
    rows: HashMap<String, Vec<String>>,
    order: Vec<String>,
    sort_col: usize,
    sort_desc: bool,
    selected: Option<String>,
}

impl TableModel {
    pub fn new<R: TableRow>() -> Self {
        Self {
            columns: R::columns(),
            rows: HashMap::new(),
            order: Vec::new(),
            sort_col: 0,
            sort_desc: false,
            selected: None,
        }
    }

    pub fn columns(&self) -> &'static [Column] {
        self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Diff/merge `rows` into the table.
    ///
    /// Every incoming key is upserted; every key that was present before
    /// the pass but absent from `rows` is deleted. Keys that persist
    /// keep their row identity, so sort order and selection stay stable.
    pub fn reconcile<R: TableRow>(&mut self, rows: &HashMap<String, R>) -> ReconcileOutcome {
        let mut to_delete: HashSet<String> = self.rows.keys().cloned().collect();
        let mut outcome = ReconcileOutcome::default();

        for (key, row) in rows {
            to_delete.remove(key);
            if self.rows.insert(key.clone(), row.cells()).is_some() {
                outcome.updated += 1;
            } else {
                outcome.inserted += 1;
            }
        }

        for key in &to_delete {
            self.rows.remove(key);
            outcome.removed += 1;
        }

        self.resort();
        outcome
    }

    /// Set the sort column; selecting the current column again flips
    /// the direction.
    pub fn sort_by(&mut self, col: usize) {
        if col >= self.columns.len() {
            return;
        }
        if col == self.sort_col {
            self.sort_desc = !self.sort_desc;
        } else {
            self.sort_col = col;
            self.sort_desc = false;
        }
        self.resort();
    }

    pub fn sort_col(&self) -> usize {
        self.sort_col
    }

    /// Key at a display position, if any.
    pub fn key_at(&self, index: usize) -> Option<&str> {
        self.order.get(index).map(String::as_str)
    }

    /// Rows in display order: `(key, cells)`.
    pub fn rows_in_order(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.order.iter().filter_map(|key| {
            self.rows
                .get(key)
                .map(|cells| (key.as_str(), cells.as_slice()))
        })
    }

    // ── Selection ────────────────────────────────────────────────────

    pub fn selected_key(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Display position of the selected row, if it still exists.
    pub fn selected_index(&self) -> Option<usize> {
        let selected = self.selected.as_deref()?;
        self.order.iter().position(|key| key == selected)
    }

    pub fn select_key(&mut self, key: &str) {
        self.selected = Some(key.to_owned());
    }

    /// Move the selection by `delta` display positions, clamped.
    /// Returns the newly selected key, if any rows exist.
    pub fn move_selection(&mut self, delta: isize) -> Option<&str> {
        if self.order.is_empty() {
            return None;
        }
        let current = self.selected_index().unwrap_or(0);
        let last = self.order.len() - 1;
        let next = current.saturating_add_signed(delta).min(last);
        self.selected = Some(self.order[next].clone());
        self.selected.as_deref()
    }

    // ── Private helpers ──────────────────────────────────────────────

    /// Rebuild `order` from the sort column. Lexicographic on the cell
    /// text with the key as tiebreak, which keeps equal cells stable.
    fn resort(&mut self) {
        let col = self.sort_col;
        let mut order: Vec<String> = self.rows.keys().cloned().collect();
        order.sort_by(|a, b| {
            let cell = |key: &String| {
                self.rows
                    .get(key)
                    .and_then(|cells| cells.get(col))
                    .map(String::as_str)
                    .unwrap_or("")
            };
            cell(a).cmp(cell(b)).then_with(|| a.cmp(b))
        });
        if self.sort_desc {
            order.reverse();
        }
        self.order = order;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct PairRow {
        name: String,
        value: String,
    }

    impl PairRow {
        fn new(name: &str, value: &str) -> Self {
            Self { name: name.into(), value: value.into() }
        }
    }

    impl TableRow for PairRow {
        fn columns() -> &'static [Column] {
            const COLUMNS: [Column; 2] = [Column::left("Name"), Column::right("Value")];
            &COLUMNS
        }

        fn cells(&self) -> Vec<String> {
            vec![self.name.clone(), self.value.clone()]
        }
    }

    fn rows(entries: &[(&str, &str)]) -> HashMap<String, PairRow> {
        entries
            .iter()
            .map(|&(key, value)| (key.to_owned(), PairRow::new(key, value)))
            .collect()
    }

    fn keys_in_order(table: &TableModel) -> Vec<String> {
        table.rows_in_order().map(|(key, _)| key.to_owned()).collect()
    }

    #[test]
    fn reconcile_inserts_updates_and_removes() {
        let mut table = TableModel::new::<PairRow>();
        table.reconcile(&rows(&[("A", "1"), ("B", "2"), ("C", "3")]));
        assert_eq!(table.len(), 3);

        let outcome = table.reconcile(&rows(&[("B", "2"), ("C", "30"), ("D", "4")]));

        assert_eq!(outcome, ReconcileOutcome { inserted: 1, updated: 2, removed: 1 });
        assert_eq!(keys_in_order(&table), ["B", "C", "D"]);
        let c_cells: Vec<_> = table
            .rows_in_order()
            .find(|(key, _)| *key == "C")
            .map(|(_, cells)| cells.to_vec())
            .unwrap();
        assert_eq!(c_cells[1], "30");
    }

    #[test]
    fn reconcile_is_idempotent() {
        let mut table = TableModel::new::<PairRow>();
        let same = rows(&[("A", "1"), ("B", "2")]);
        table.reconcile(&same);
        let outcome = table.reconcile(&same);

        assert_eq!(outcome.inserted, 0);
        assert_eq!(outcome.removed, 0);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn selection_follows_key_across_resort() {
        let mut table = TableModel::new::<PairRow>();
        table.reconcile(&rows(&[("a", "3"), ("b", "1"), ("c", "2")]));
        table.select_key("b");
        assert_eq!(table.selected_index(), Some(1));

        // Sort by the value column: order becomes b, c, a.
        table.sort_by(1);
        assert_eq!(keys_in_order(&table), ["b", "c", "a"]);
        assert_eq!(table.selected_key(), Some("b"));
        assert_eq!(table.selected_index(), Some(0));

        // Flip direction: selection still follows the key.
        table.sort_by(1);
        assert_eq!(keys_in_order(&table), ["a", "c", "b"]);
        assert_eq!(table.selected_index(), Some(2));
    }

    #[test]
    fn selection_survives_reconcile_when_key_persists() {
        let mut table = TableModel::new::<PairRow>();
        table.reconcile(&rows(&[("a", "1"), ("b", "2")]));
        table.select_key("b");

        table.reconcile(&rows(&[("b", "20"), ("c", "3")]));
        assert_eq!(table.selected_key(), Some("b"));
        assert!(table.selected_index().is_some());
    }

    #[test]
    fn orphaned_selection_degrades_to_no_position() {
        let mut table = TableModel::new::<PairRow>();
        table.reconcile(&rows(&[("a", "1"), ("b", "2")]));
        table.select_key("b");

        table.reconcile(&rows(&[("a", "1")]));
        // Key is remembered but resolves to no display position.
        assert_eq!(table.selected_key(), Some("b"));
        assert_eq!(table.selected_index(), None);
    }

    #[test]
    fn move_selection_clamps_and_starts_at_top() {
        let mut table = TableModel::new::<PairRow>();
        table.reconcile(&rows(&[("a", "1"), ("b", "2"), ("c", "3")]));

        assert_eq!(table.move_selection(1), Some("b"));
        assert_eq!(table.move_selection(10), Some("c"));
        assert_eq!(table.move_selection(-10), Some("a"));

        let mut empty = TableModel::new::<PairRow>();
        assert_eq!(empty.move_selection(1), None);
    }
}
