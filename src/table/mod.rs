//! Filterable, sortable view state over an immutable product list.
//!
//! A [`ProductTable`] owns the loaded products plus the current filter
//! criteria and sort keys. Every mutation re-derives a cached index view;
//! all read paths are cheap and side-effect free.

mod filter;
mod product;
mod sort;

pub use filter::FilterCriteria;
pub use product::{ColumnSpec, Field, Product, default_columns, sample_products};
pub use sort::{ClickPolicy, SortKey, SortKeyList, compare_display};

use std::cmp::Ordering;
use std::collections::HashSet;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("unknown column '{0}'")]
    UnknownColumn(String),
    #[error("duplicate product name '{0}'")]
    DuplicateProduct(String),
    #[error("duplicate column id '{0}'")]
    DuplicateColumn(String),
    #[error("duplicate sort key '{0}'")]
    DuplicateSortKey(String),
}

/// Where a column currently sits in the sort order, for header rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortHint {
    /// Position in the key list, 0 for the primary key.
    pub priority: usize,
    pub ascending: bool,
}

/// One entry of the grouped row sequence: a category header line or a
/// product row underneath it.
#[derive(Debug, PartialEq)]
pub enum RowEntry<'a> {
    Category(&'a str),
    Item(&'a Product),
}

/// The table itself. Products and columns are fixed at construction;
/// filter and sort state mutate through the methods below and the derived
/// row order follows immediately.
pub struct ProductTable {
    products: Vec<Product>,
    columns: Vec<ColumnSpec>,
    criteria: FilterCriteria,
    sort_keys: SortKeyList,
    click_policy: ClickPolicy,
    // Indices into products, filtered and sorted. Rebuilt on mutation.
    view: Vec<usize>,
}

impl ProductTable {
    /// Build a table sorted by the first declared column, ascending. With
    /// no columns the initial sort is empty.
    pub fn new(products: Vec<Product>, columns: Vec<ColumnSpec>) -> Result<Self, TableError> {
        let keys = match columns.first() {
            Some(column) => vec![SortKey::asc(column.id.as_str())],
            None => Vec::new(),
        };
        ProductTable::with_sort(products, columns, keys)
    }

    /// Build a table with an explicit initial key list. Rejects duplicate
    /// column ids, duplicate product names, keys naming unknown columns
    /// and columns appearing twice in the key list.
    pub fn with_sort(
        products: Vec<Product>,
        columns: Vec<ColumnSpec>,
        keys: Vec<SortKey>,
    ) -> Result<Self, TableError> {
        ProductTable::validate(&products, &columns, &keys)?;
        let mut table = ProductTable {
            products,
            columns,
            criteria: FilterCriteria::default(),
            sort_keys: SortKeyList::from_keys(keys),
            click_policy: ClickPolicy::default(),
            view: Vec::new(),
        };
        table.rebuild();
        Ok(table)
    }

    fn validate(
        products: &[Product],
        columns: &[ColumnSpec],
        keys: &[SortKey],
    ) -> Result<(), TableError> {
        let mut ids = HashSet::new();
        for column in columns {
            if !ids.insert(column.id.as_str()) {
                return Err(TableError::DuplicateColumn(column.id.clone()));
            }
        }
        let mut names = HashSet::new();
        for product in products {
            if !names.insert(product.name.as_str()) {
                return Err(TableError::DuplicateProduct(product.name.clone()));
            }
        }
        let mut key_columns = HashSet::new();
        for key in keys {
            if !columns.iter().any(|column| column.id == key.column) {
                return Err(TableError::UnknownColumn(key.column.clone()));
            }
            if !key_columns.insert(key.column.as_str()) {
                return Err(TableError::DuplicateSortKey(key.column.clone()));
            }
        }
        Ok(())
    }

    pub fn set_click_policy(&mut self, policy: ClickPolicy) {
        self.click_policy = policy;
    }

    pub fn click_policy(&self) -> ClickPolicy {
        self.click_policy
    }

    /// Replace the filter text. Dependent row order updates before this
    /// returns.
    pub fn set_filter_text(&mut self, text: impl Into<String>) {
        self.criteria.set_text(text);
        self.rebuild();
    }

    pub fn set_in_stock_only(&mut self, only: bool) {
        self.criteria.set_in_stock_only(only);
        self.rebuild();
    }

    /// A header click on `column`: flip its direction when it is already a
    /// sort key, otherwise add it per the active [`ClickPolicy`]. Unknown
    /// columns leave the state untouched.
    pub fn click_column(&mut self, column: &str) -> Result<(), TableError> {
        self.check_column(column)?;
        self.sort_keys.click(column, self.click_policy);
        self.rebuild();
        Ok(())
    }

    /// Retire a column from the sort order. Known but inactive columns
    /// are a no-op; unknown columns error without touching the state.
    pub fn remove_column(&mut self, column: &str) -> Result<(), TableError> {
        self.check_column(column)?;
        self.sort_keys.remove(column);
        self.rebuild();
        Ok(())
    }

    /// The derived rows: filtered, then ordered by the key cascade.
    pub fn rows(&self) -> Vec<&Product> {
        self.view.iter().map(|&idx| &self.products[idx]).collect()
    }

    /// The derived rows with a category entry in front of every run of
    /// rows sharing a category. Runs follow the derived order, so a
    /// category can appear more than once unless it leads the sort.
    pub fn grouped_rows(&self) -> Vec<RowEntry<'_>> {
        let mut entries = Vec::new();
        let mut last_category: Option<&str> = None;
        for &idx in &self.view {
            let product = &self.products[idx];
            if last_category != Some(product.category.as_str()) {
                entries.push(RowEntry::Category(product.category.as_str()));
                last_category = Some(product.category.as_str());
            }
            entries.push(RowEntry::Item(product));
        }
        entries
    }

    /// Sort hint for one column id, None when the column is not a key or
    /// not declared.
    pub fn hint(&self, column: &str) -> Option<SortHint> {
        self.check_column(column).ok()?;
        let priority = self.sort_keys.position(column)?;
        Some(SortHint {
            priority,
            ascending: self.sort_keys.as_slice()[priority].ascending,
        })
    }

    /// Hints aligned with [`columns`](Self::columns), one slot per column.
    pub fn header_hints(&self) -> Vec<Option<SortHint>> {
        self.columns
            .iter()
            .map(|column| self.hint(&column.id))
            .collect()
    }

    pub fn filter(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn sort_keys(&self) -> &SortKeyList {
        &self.sort_keys
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    fn check_column(&self, column: &str) -> Result<(), TableError> {
        if self.columns.iter().any(|c| c.id == column) {
            Ok(())
        } else {
            Err(TableError::UnknownColumn(column.to_string()))
        }
    }

    // Filter in source order, then stable-sort the surviving indices.
    fn rebuild(&mut self) {
        let mut view: Vec<usize> = (0..self.products.len())
            .filter(|&idx| self.criteria.passes(&self.products[idx]))
            .collect();
        if !self.sort_keys.is_empty() {
            view.sort_by(|&a, &b| self.compare_rows(&self.products[a], &self.products[b]));
        }
        self.view = view;
    }

    // Key cascade: the first key whose values differ decides. All keys
    // equal keeps the filtered order, sort_by being stable.
    fn compare_rows(&self, a: &Product, b: &Product) -> Ordering {
        for key in self.sort_keys.iter() {
            let Some(field) = self.field_of(&key.column) else {
                continue;
            };
            let ord = compare_display(field.value(a), field.value(b));
            let ord = if key.ascending { ord } else { ord.reverse() };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }

    fn field_of(&self, column: &str) -> Option<Field> {
        self.columns
            .iter()
            .find(|c| c.id == column)
            .map(|c| c.field)
    }
}
