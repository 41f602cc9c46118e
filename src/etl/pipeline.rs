// etl/pipeline.rs
use crate::db::connection::Database;
use crate::db::restaurants::replace_restaurants;
use crate::domain::listing::Listing;
use crate::etl::clean::{city_from_path, clean_table, RawTable};
use crate::etl::EtlError;
use csv::{ReaderBuilder, Trim};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub struct EtlSummary {
    pub files: usize,
    pub rows: usize,
    pub cities: Vec<String>,
}

/// `.csv` files directly inside `dir`, sorted by file name.
pub fn discover_sources(dir: &Path) -> Result<Vec<PathBuf>, EtlError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(EtlError::NoSourceFiles(dir.to_path_buf()))
        }
        Err(e) => {
            return Err(EtlError::Io {
                path: dir.to_path_buf(),
                msg: e.to_string(),
            })
        }
    };

    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| EtlError::Io {
                path: dir.to_path_buf(),
                msg: e.to_string(),
            })?
            .path();

        let is_csv = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);

        if is_csv && path.is_file() {
            files.push(path);
        }
    }

    if files.is_empty() {
        return Err(EtlError::NoSourceFiles(dir.to_path_buf()));
    }

    files.sort();
    Ok(files)
}

pub fn read_source(path: &Path) -> Result<RawTable, EtlError> {
    let csv_err = |e: csv::Error| EtlError::Csv {
        path: path.to_path_buf(),
        msg: e.to_string(),
    };

    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_path(path)
        .map_err(csv_err)?;

    let headers = reader.headers().map_err(csv_err)?.clone();

    let mut records = Vec::new();
    for result in reader.records() {
        records.push(result.map_err(csv_err)?);
    }

    Ok(RawTable { headers, records })
}

/// Read, normalize and concatenate every source file, in discovery order.
pub fn extract_and_clean(files: &[PathBuf]) -> Result<Vec<Listing>, EtlError> {
    let mut all = Vec::new();

    for file in files {
        let city = city_from_path(file);
        info!("Processing data for: {city}");

        let table = read_source(file)?;
        let cleaned = clean_table(&table, &city);
        info!("{}: {} rows", city, cleaned.len());

        all.extend(cleaned);
    }

    Ok(all)
}

/// Rebuild the `restaurants` table from the `.csv` files in `data_dir`.
///
/// Every file is parsed before the database is touched, and the load runs in
/// one transaction, so a failed run leaves the previous table in place.
pub fn run_etl(data_dir: &Path, db: &Database) -> Result<EtlSummary, EtlError> {
    info!("Starting ETL from {}", data_dir.display());

    let summary = load_all(data_dir, db)?;
    info!(
        "ETL finished: {} rows from {} files ({}) loaded into {}",
        summary.rows,
        summary.files,
        summary.cities.join(", "),
        db.path().display()
    );
    Ok(summary)
}

fn load_all(data_dir: &Path, db: &Database) -> Result<EtlSummary, EtlError> {
    let files = discover_sources(data_dir)?;
    let names: Vec<String> = files
        .iter()
        .filter_map(|f| f.file_name().map(|n| n.to_string_lossy().into_owned()))
        .collect();
    info!("CSV files found: {:?}", names);

    let listings = extract_and_clean(&files)?;
    let cities = files.iter().map(|f| city_from_path(f)).collect();

    info!("Loading {} rows into {}", listings.len(), db.path().display());
    let rows = db
        .with_conn(|conn| replace_restaurants(conn, &listings))
        .map_err(|e| EtlError::Db(e.to_string()))?;

    Ok(EtlSummary {
        files: files.len(),
        rows,
        cities,
    })
}
