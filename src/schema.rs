use serde::{Deserialize, Serialize};
use std::fmt;

/// Output column set for daily sales reports.
pub const SALES_KEYS: [&str; 16] = [
    "Provider",
    "Provider Country",
    "Vendor Identifier",
    "Artist / Show",
    "Title",
    "Label/Studio/Network",
    "Product Type Identifier",
    "Begin Date",
    "End Date",
    "Customer Currency",
    "Country Code",
    "Royalty Currency",
    "Apple Identifier",
    "Asset/Content Flavor",
    "Vendor Offer Code",
    "Primary Genre",
];

/// Output column set for periodic earnings (financial) reports.
pub const EARNINGS_KEYS: [&str; 10] = [
    "Start Date",
    "End Date",
    "Vendor Identifier",
    "Partner Share Currency",
    "Sales or Return",
    "Apple Identifier",
    "Product Type Identifier",
    "Title",
    "Country Of Sale",
    "Customer Currency",
];

/// The fixed region enumeration a financial run fans out over.
pub const FINANCE_REGIONS: [&str; 24] = [
    "AE", "AU", "CA", "CH", "DK", "EU", "GB", "HK", "ID", "IL", "IN", "JP", "MX", "NO", "NZ",
    "RU", "SA", "SE", "SG", "TR", "TW", "US", "WW", "ZA",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    Sales,
    Financial,
}

impl ReportType {
    /// Case-insensitive parse; returns `None` for anything but the two known values.
    pub fn parse(raw: &str) -> Option<ReportType> {
        match raw.to_ascii_lowercase().as_str() {
            "sales" => Some(ReportType::Sales),
            "financial" => Some(ReportType::Financial),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::Sales => "sales",
            ReportType::Financial => "financial",
        }
    }

    /// The fixed column schema the consolidated dataset must conform to.
    pub fn keys(&self) -> &'static [&'static str] {
        match self {
            ReportType::Sales => &SALES_KEYS,
            ReportType::Financial => &EARNINGS_KEYS,
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
