/// One row of the table. Products are immutable once loaded; the table
/// never hands out mutable access to them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub category: String,
    pub name: String,
    pub price: String,
    pub stocked: bool,
}

impl Product {
    pub fn new(
        category: impl Into<String>,
        name: impl Into<String>,
        price: impl Into<String>,
        stocked: bool,
    ) -> Self {
        Product {
            category: category.into(),
            name: name.into(),
            price: price.into(),
            stocked,
        }
    }
}

/// Which product attribute a column reads. Columns are polymorphic only
/// over the field they display, never over arbitrary shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Category,
    Name,
    Price,
    Stocked,
}

impl Field {
    /// The display and comparison value of this field on a product.
    pub fn value<'a>(&self, product: &'a Product) -> &'a str {
        match self {
            Field::Category => &product.category,
            Field::Name => &product.name,
            Field::Price => &product.price,
            Field::Stocked => {
                if product.stocked {
                    "yes"
                } else {
                    "no"
                }
            }
        }
    }
}

/// A declared column: stable id, header label and the field it reads.
/// The column set is fixed when the table is built.
#[derive(Debug, Clone)]
pub struct ColumnSpec {
    pub id: String,
    pub label: String,
    pub field: Field,
}

impl ColumnSpec {
    pub fn new(id: impl Into<String>, label: impl Into<String>, field: Field) -> Self {
        ColumnSpec {
            id: id.into(),
            label: label.into(),
            field,
        }
    }
}

/// The reference column set: category, name and price.
pub fn default_columns() -> Vec<ColumnSpec> {
    vec![
        ColumnSpec::new("category", "Category", Field::Category),
        ColumnSpec::new("name", "Product", Field::Name),
        ColumnSpec::new("price", "Price", Field::Price),
    ]
}

/// The six seed products shown when no data file is given.
pub fn sample_products() -> Vec<Product> {
    vec![
        Product::new("Fruits", "Apple", "$1", true),
        Product::new("Fruits", "Dragonfruit", "$1", true),
        Product::new("Fruits", "Passionfruit", "$2", false),
        Product::new("Vegetables", "Spinach", "$2", true),
        Product::new("Vegetables", "Pumpkin", "$4", false),
        Product::new("Vegetables", "Peas", "$1", true),
    ]
}
