use std::fmt;

/// Placeholder for textual columns a source file does not carry at all.
pub const UNAVAILABLE: &str = "Unavailable";

/// Cuisine for rows whose source has no cuisine value.
pub const CUISINE_NOT_SPECIFIED: &str = "Not specified";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceLevel {
    Low,
    Medium,
    High,
    Unspecified,
}

impl PriceLevel {
    /// Map the currency-symbol scale used by the listing sites.
    /// Anything outside the scale (including a missing cell) is `Unspecified`.
    pub fn from_symbols(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("€") => PriceLevel::Low,
            Some("€€ - €€€") => PriceLevel::Medium,
            Some("€€€€") => PriceLevel::High,
            _ => PriceLevel::Unspecified,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PriceLevel::Low => "Low",
            PriceLevel::Medium => "Medium",
            PriceLevel::High => "High",
            PriceLevel::Unspecified => "Unspecified",
        }
    }
}

impl fmt::Display for PriceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One restaurant in one city, shaped exactly like a `restaurants` row.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub name: String,
    pub address: String,
    pub cuisine: String,
    pub rating: f64,
    pub price_level: PriceLevel,
    pub num_reviews: i64,
    pub subrating_rate_food: f64,
    pub subrating_rate_service: f64,
    pub subrating_rate_atmosphere: f64,
    pub url: String,
    pub city: String,
}
