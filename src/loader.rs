use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;

use polars::prelude::*;
use tracing::{debug, info};

use crate::domain::AppError;
use crate::table::Product;

#[derive(Debug)]
enum FileType {
    CSV,
    PARQUET,
}

#[derive(Debug)]
struct FileInfo {
    path: PathBuf,
    file_size: u64,
    file_type: FileType,
}

/// Load products from a CSV or Parquet file. The file must carry the
/// columns category, name, price and stocked; extra columns are ignored.
pub fn load_products(path: &Path) -> Result<Vec<Product>, AppError> {
    let file_info = get_file_info(path)?;
    debug!("File info: {:?}", file_info);

    let frame = match file_info.file_type {
        FileType::CSV => scan_csv(&file_info.path)?,
        FileType::PARQUET => scan_parquet(&file_info.path)?,
    };

    let start_time = Instant::now();
    let df = frame.collect()?;

    let categories = string_column(&df, "category")?;
    let names = string_column(&df, "name")?;
    let prices = string_column(&df, "price")?;
    let stocked = bool_column(&df, "stocked")?;

    let mut products = Vec::with_capacity(df.height());
    let rows = categories.into_iter().zip(names).zip(prices).zip(stocked);
    for (((category, name), price), stocked) in rows {
        products.push(Product {
            category,
            name,
            price,
            stocked,
        });
    }

    let data_loading_duration = start_time.elapsed().as_millis();
    info!(
        "Loaded {} products from {} ({} bytes) in {data_loading_duration}ms ...",
        products.len(),
        file_info.path.display(),
        file_info.file_size
    );
    Ok(products)
}

fn get_file_info(path: &Path) -> Result<FileInfo, AppError> {
    let metadata = fs::metadata(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => AppError::FileNotFound,
        ErrorKind::PermissionDenied => AppError::PermissionDenied,
        _ => AppError::Io(e),
    })?;
    if !metadata.is_file() {
        return Err(AppError::LoadingFailed("Not a file!".into()));
    }

    let file_size = metadata.len();
    let file_type = detect_file_type(path)?;

    Ok(FileInfo {
        path: path.to_path_buf(),
        file_size,
        file_type,
    })
}

fn detect_file_type(path: &Path) -> Result<FileType, AppError> {
    match path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_uppercase())
        .as_deref()
    {
        Some("CSV") => Ok(FileType::CSV),
        Some("PARQUET") | Some("PQ") => Ok(FileType::PARQUET),
        _ => Err(AppError::UnknownFileType),
    }
}

fn scan_csv(path: &Path) -> Result<LazyFrame, PolarsError> {
    LazyCsvReader::new(PlPath::Local(path.into()))
        .with_has_header(true)
        .finish()
}

fn scan_parquet(path: &Path) -> Result<LazyFrame, PolarsError> {
    LazyFrame::scan_parquet(PlPath::Local(path.into()), ScanArgsParquet::default())
}

// Whatever the source dtype, the cell becomes a single-line string.
// Nulls come out empty.
fn string_column(df: &DataFrame, name: &str) -> Result<Vec<String>, AppError> {
    let col = column(df, name)?.cast(&DataType::String)?;
    let series = col.str()?;
    let mut data = Vec::with_capacity(series.len());
    for value in series.into_iter() {
        let ss = match value {
            Some(s) => s.replace("\r\n", " ").replace("\n", " "),
            None => String::new(),
        };
        data.push(ss);
    }
    Ok(data)
}

fn bool_column(df: &DataFrame, name: &str) -> Result<Vec<bool>, AppError> {
    let col = column(df, name)?;
    if col.dtype() == &DataType::Boolean {
        return Ok(col.bool()?.into_iter().map(|v| v.unwrap_or(false)).collect());
    }
    let col = col.cast(&DataType::String)?;
    let series = col.str()?;
    series
        .into_iter()
        .map(|value| parse_stocked(name, value.unwrap_or_default()))
        .collect()
}

fn parse_stocked(column: &str, value: &str) -> Result<bool, AppError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        other => Err(AppError::LoadingFailed(format!(
            "column '{column}' has non-boolean value '{other}'"
        ))),
    }
}

fn column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column, AppError> {
    df.column(name)
        .map_err(|_| AppError::LoadingFailed(format!("missing column '{name}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_csv(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        if let Err(e) = fs::write(&path, content) {
            panic!("write failed: {e}");
        }
        path
    }

    #[test]
    fn loads_a_csv_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            &dir,
            "products.csv",
            "category,name,price,stocked\n\
             Fruits,Apple,$1,true\n\
             Vegetables,Pumpkin,$4,false\n",
        );
        let products = load_products(&path).unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0], Product::new("Fruits", "Apple", "$1", true));
        assert_eq!(products[1], Product::new("Vegetables", "Pumpkin", "$4", false));
    }

    #[test]
    fn loads_a_parquet_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("products.parquet");
        let mut frame = df!(
            "category" => ["Fruits", "Vegetables"],
            "name" => ["Apple", "Peas"],
            "price" => ["$1", "$1"],
            "stocked" => [true, true],
        )
        .unwrap();
        let file = fs::File::create(&path).unwrap();
        ParquetWriter::new(file).finish(&mut frame).unwrap();

        let products = load_products(&path).unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0], Product::new("Fruits", "Apple", "$1", true));
        assert_eq!(products[1].name, "Peas");
    }

    #[test]
    fn numeric_prices_become_strings() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            &dir,
            "products.csv",
            "category,name,price,stocked\nFruits,Apple,1,true\n",
        );
        let products = load_products(&path).unwrap();
        assert_eq!(products[0].price, "1");
    }

    #[test]
    fn missing_column_is_reported_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            &dir,
            "products.csv",
            "category,name,price\nFruits,Apple,$1\n",
        );
        let err = load_products(&path).unwrap_err();
        match err {
            AppError::LoadingFailed(msg) => assert!(msg.contains("stocked"), "{msg}"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_boolean_stock_values_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            &dir,
            "products.csv",
            "category,name,price,stocked\nFruits,Apple,$1,maybe\n",
        );
        let err = load_products(&path).unwrap_err();
        match err {
            AppError::LoadingFailed(msg) => assert!(msg.contains("maybe"), "{msg}"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn yes_and_no_count_as_booleans() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            &dir,
            "products.csv",
            "category,name,price,stocked\nFruits,Apple,$1,yes\nFruits,Banana,$2,no\n",
        );
        let products = load_products(&path).unwrap();
        assert!(products[0].stocked);
        assert!(!products[1].stocked);
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "products.txt", "category,name,price,stocked\n");
        assert!(matches!(
            load_products(&path),
            Err(AppError::UnknownFileType)
        ));
    }

    #[test]
    fn missing_file_is_reported_as_such() {
        assert!(matches!(
            load_products(Path::new("/no/such/products.csv")),
            Err(AppError::FileNotFound)
        ));
    }
}
