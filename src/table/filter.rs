use super::product::Product;

/// The two narrowing inputs: free text matched against the product name
/// and the in-stock-only flag. Both are conjunctive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    text: String,
    in_stock_only: bool,
}

impl FilterCriteria {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn in_stock_only(&self) -> bool {
        self.in_stock_only
    }

    pub(crate) fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub(crate) fn set_in_stock_only(&mut self, only: bool) {
        self.in_stock_only = only;
    }

    /// Whether a product survives the current criteria. Text matching is a
    /// case-insensitive substring test on the name; empty text matches all.
    pub fn passes(&self, product: &Product) -> bool {
        if !self.text.is_empty()
            && !product
                .name
                .to_lowercase()
                .contains(&self.text.to_lowercase())
        {
            return false;
        }
        if self.in_stock_only && !product.stocked {
            return false;
        }
        true
    }
}
