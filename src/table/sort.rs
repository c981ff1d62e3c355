use std::cmp::Ordering;

/// One active sort key. Its position in the [`SortKeyList`] is its
/// priority; direction is per key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub column: String,
    pub ascending: bool,
}

impl SortKey {
    pub fn asc(column: impl Into<String>) -> Self {
        SortKey {
            column: column.into(),
            ascending: true,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        SortKey {
            column: column.into(),
            ascending: false,
        }
    }
}

/// What selecting a column that is not yet a sort key does to the list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ClickPolicy {
    /// New keys join at the end, below every existing key. Selecting an
    /// active key flips its direction in place.
    #[default]
    AppendLowest,
    /// New keys take over the front. Selecting an active key moves it back
    /// to the front and flips its direction.
    PromoteFront,
}

/// Ordered set of active sort keys. Index 0 is the primary key and every
/// column appears at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortKeyList {
    keys: Vec<SortKey>,
}

impl SortKeyList {
    pub fn new() -> Self {
        SortKeyList::default()
    }

    pub(crate) fn from_keys(keys: Vec<SortKey>) -> Self {
        SortKeyList { keys }
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SortKey> {
        self.keys.iter()
    }

    pub fn as_slice(&self) -> &[SortKey] {
        &self.keys
    }

    /// Priority of a column, 0 for the primary key. None when inactive.
    pub fn position(&self, column: &str) -> Option<usize> {
        self.keys.iter().position(|key| key.column == column)
    }

    /// The single state transition behind a header click: flip an active
    /// key, add an inactive one per policy.
    pub(crate) fn click(&mut self, column: &str, policy: ClickPolicy) {
        match self.position(column) {
            Some(idx) => match policy {
                ClickPolicy::AppendLowest => {
                    self.keys[idx].ascending = !self.keys[idx].ascending;
                }
                ClickPolicy::PromoteFront => {
                    let mut key = self.keys.remove(idx);
                    key.ascending = !key.ascending;
                    self.keys.insert(0, key);
                }
            },
            None => match policy {
                ClickPolicy::AppendLowest => self.keys.push(SortKey::asc(column)),
                ClickPolicy::PromoteFront => self.keys.insert(0, SortKey::asc(column)),
            },
        }
    }

    /// Drop a column from the list; the remaining keys close ranks.
    /// Inactive columns are a no-op.
    pub(crate) fn remove(&mut self, column: &str) {
        self.keys.retain(|key| key.column != column);
    }
}

/// Case-insensitive ordering for display values. Compares the case-folded
/// character streams first and breaks exact fold ties by byte order, so
/// equal-ignoring-case inputs still order deterministically.
pub fn compare_display(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));
    folded.then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn click_appends_new_key_ascending() {
        let mut keys = SortKeyList::new();
        keys.click("category", ClickPolicy::AppendLowest);
        keys.click("name", ClickPolicy::AppendLowest);
        assert_eq!(
            keys.as_slice(),
            &[SortKey::asc("category"), SortKey::asc("name")]
        );
    }

    #[test]
    fn click_flips_active_key_in_place() {
        let mut keys = SortKeyList::from_keys(vec![SortKey::asc("category"), SortKey::asc("name")]);
        keys.click("category", ClickPolicy::AppendLowest);
        assert_eq!(
            keys.as_slice(),
            &[SortKey::desc("category"), SortKey::asc("name")]
        );
        keys.click("category", ClickPolicy::AppendLowest);
        assert_eq!(keys.as_slice()[0], SortKey::asc("category"));
    }

    #[test]
    fn promote_front_inserts_new_key_first() {
        let mut keys = SortKeyList::from_keys(vec![SortKey::asc("category")]);
        keys.click("name", ClickPolicy::PromoteFront);
        assert_eq!(
            keys.as_slice(),
            &[SortKey::asc("name"), SortKey::asc("category")]
        );
    }

    #[test]
    fn promote_front_moves_active_key_back_to_front_and_flips() {
        let mut keys = SortKeyList::from_keys(vec![
            SortKey::asc("category"),
            SortKey::asc("name"),
            SortKey::asc("price"),
        ]);
        keys.click("price", ClickPolicy::PromoteFront);
        assert_eq!(
            keys.as_slice(),
            &[
                SortKey::desc("price"),
                SortKey::asc("category"),
                SortKey::asc("name"),
            ]
        );
    }

    #[test]
    fn remove_closes_ranks_and_ignores_inactive_columns() {
        let mut keys = SortKeyList::from_keys(vec![
            SortKey::asc("category"),
            SortKey::desc("name"),
            SortKey::asc("price"),
        ]);
        keys.remove("name");
        assert_eq!(
            keys.as_slice(),
            &[SortKey::asc("category"), SortKey::asc("price")]
        );
        keys.remove("name");
        assert_eq!(keys.len(), 2);
        assert_eq!(keys.position("price"), Some(1));
    }

    #[test]
    fn readding_a_removed_key_lands_at_the_end() {
        let mut keys = SortKeyList::from_keys(vec![
            SortKey::asc("category"),
            SortKey::desc("name"),
            SortKey::asc("price"),
        ]);
        keys.remove("name");
        keys.click("name", ClickPolicy::AppendLowest);
        // The old slot is gone; the key starts over, ascending and last.
        assert_eq!(
            keys.as_slice(),
            &[
                SortKey::asc("category"),
                SortKey::asc("price"),
                SortKey::asc("name"),
            ]
        );
    }

    #[test]
    fn compare_display_folds_case() {
        assert_eq!(compare_display("apple", "BANANA"), Ordering::Less);
        assert_eq!(compare_display("PEAS", "peach"), Ordering::Greater);
    }

    #[test]
    fn compare_display_breaks_fold_ties_by_bytes() {
        // "Apple" and "apple" fold equal; byte order keeps the result total.
        assert_eq!(compare_display("Apple", "apple"), Ordering::Less);
        assert_eq!(compare_display("apple", "Apple"), Ordering::Greater);
        assert_eq!(compare_display("apple", "apple"), Ordering::Equal);
    }

    #[test]
    fn compare_display_handles_multichar_folds() {
        // U+0130 folds to "i\u{307}": the folded streams tie, bytes decide.
        assert_eq!(compare_display("İ", "i\u{307}"), "İ".cmp("i\u{307}"));
        // With distinct tails the folded streams decide before any bytes.
        assert_eq!(compare_display("İa", "i\u{307}b"), Ordering::Less);
    }
}
