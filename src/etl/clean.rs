// etl/clean.rs
use crate::domain::listing::{Listing, PriceLevel, CUISINE_NOT_SPECIFIED, UNAVAILABLE};
use csv::StringRecord;
use std::collections::HashMap;
use std::path::Path;

/// A parsed source file: header row plus records, cells still raw text.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: StringRecord,
    pub records: Vec<StringRecord>,
}

/// "palma_de_mallorca.csv" -> "Palma de mallorca"
pub fn city_from_path(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().replace('_', " "))
        .unwrap_or_default();

    let mut chars = stem.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    let rest = chars.as_str().to_lowercase();

    let mut city: String = first.to_uppercase().collect();
    city.push_str(&rest);
    city
}

/// Numeric cell or zero. NaN and infinities count as failed coercions.
pub fn coerce_f64(raw: Option<&str>) -> f64 {
    raw.map(str::trim)
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Integral count or zero. Decimal text ("12.0") is truncated.
pub fn coerce_count(raw: Option<&str>) -> i64 {
    let Some(s) = raw.map(str::trim) else {
        return 0;
    };
    if let Ok(n) = s.parse::<i64>() {
        return n;
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => v.trunc() as i64,
        _ => 0,
    }
}

fn text_or(raw: Option<&str>, fallback: &str) -> String {
    match raw.map(str::trim) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => fallback.to_string(),
    }
}

/// Normalize one city's table into the fixed `restaurants` shape.
///
/// Never fails: anything malformed or missing is replaced by its default.
pub fn clean_table(table: &RawTable, city: &str) -> Vec<Listing> {
    let index: HashMap<&str, usize> = table
        .headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.trim(), i))
        .collect();

    table
        .records
        .iter()
        .map(|record| {
            // None when the column is absent or the row is short.
            let cell = |col: &str| index.get(col).and_then(|&i| record.get(i));

            Listing {
                name: text_or(cell("name"), UNAVAILABLE),
                address: text_or(cell("address"), UNAVAILABLE),
                cuisine: text_or(cell("cuisine"), CUISINE_NOT_SPECIFIED),
                rating: coerce_f64(cell("rating")),
                price_level: PriceLevel::from_symbols(cell("price_level")),
                num_reviews: coerce_count(cell("num_reviews")),
                subrating_rate_food: coerce_f64(cell("subrating_rate_food")),
                subrating_rate_service: coerce_f64(cell("subrating_rate_service")),
                subrating_rate_atmosphere: coerce_f64(cell("subrating_rate_atmosphere")),
                url: text_or(cell("url"), UNAVAILABLE),
                city: city.to_string(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable {
            headers: StringRecord::from(headers.to_vec()),
            records: rows.iter().map(|r| StringRecord::from(r.to_vec())).collect(),
        }
    }

    #[test]
    fn city_names_come_from_file_stems() {
        assert_eq!(city_from_path(&PathBuf::from("data/madrid.csv")), "Madrid");
        assert_eq!(
            city_from_path(&PathBuf::from("palma_de_mallorca.csv")),
            "Palma de mallorca"
        );
        assert_eq!(city_from_path(&PathBuf::from("BARCELONA.CSV")), "Barcelona");
    }

    #[test]
    fn price_symbols_map_to_levels() {
        assert_eq!(PriceLevel::from_symbols(Some("€")), PriceLevel::Low);
        assert_eq!(PriceLevel::from_symbols(Some("€€ - €€€")), PriceLevel::Medium);
        assert_eq!(PriceLevel::from_symbols(Some(" €€€€ ")), PriceLevel::High);
        assert_eq!(PriceLevel::from_symbols(Some("€€")), PriceLevel::Unspecified);
        assert_eq!(PriceLevel::from_symbols(Some("")), PriceLevel::Unspecified);
        assert_eq!(PriceLevel::from_symbols(None), PriceLevel::Unspecified);
    }

    #[test]
    fn numeric_coercion_falls_back_to_zero() {
        assert_eq!(coerce_f64(Some("4.5")), 4.5);
        assert_eq!(coerce_f64(Some(" 3 ")), 3.0);
        assert_eq!(coerce_f64(Some("n/a")), 0.0);
        assert_eq!(coerce_f64(Some("NaN")), 0.0);
        assert_eq!(coerce_f64(Some("inf")), 0.0);
        assert_eq!(coerce_f64(None), 0.0);

        assert_eq!(coerce_count(Some("120")), 120);
        assert_eq!(coerce_count(Some("120.0")), 120);
        assert_eq!(coerce_count(Some("1,200")), 0);
        assert_eq!(coerce_count(None), 0);
    }

    #[test]
    fn example_row_is_normalized() {
        let t = table(&["name", "price_level", "rating"], &[&["Casa Pepe", "€€€€", "4.5"]]);
        let rows = clean_table(&t, "Madrid");

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.price_level, PriceLevel::High);
        assert_eq!(row.rating, 4.5);
        assert_eq!(row.city, "Madrid");
    }

    #[test]
    fn absent_columns_get_defaults() {
        let t = table(&["name", "rating"], &[&["Bar Tomás", "4.1"]]);
        let row = &clean_table(&t, "Barcelona")[0];

        assert_eq!(row.address, UNAVAILABLE);
        assert_eq!(row.url, UNAVAILABLE);
        assert_eq!(row.cuisine, CUISINE_NOT_SPECIFIED);
        assert_eq!(row.price_level, PriceLevel::Unspecified);
        assert_eq!(row.num_reviews, 0);
        assert_eq!(row.subrating_rate_food, 0.0);
        assert_eq!(row.subrating_rate_service, 0.0);
        assert_eq!(row.subrating_rate_atmosphere, 0.0);
    }

    #[test]
    fn empty_and_short_cells_are_backfilled() {
        let t = table(
            &["name", "cuisine", "subrating_rate_food", "url"],
            &[&["El Xampanyet", "", "x"], &["Quimet"]],
        );
        let rows = clean_table(&t, "Barcelona");

        assert_eq!(rows[0].cuisine, CUISINE_NOT_SPECIFIED);
        assert_eq!(rows[0].subrating_rate_food, 0.0);
        assert_eq!(rows[0].url, UNAVAILABLE);
        assert_eq!(rows[1].name, "Quimet");
        assert_eq!(rows[1].cuisine, CUISINE_NOT_SPECIFIED);
    }

    #[test]
    fn extra_columns_are_ignored() {
        let t = table(&["name", "phone", "cuisine"], &[&["Sobrino de Botín", "+34", "Spanish"]]);
        let row = &clean_table(&t, "Madrid")[0];
        assert_eq!(row.name, "Sobrino de Botín");
        assert_eq!(row.cuisine, "Spanish");
    }
}
