//! Static catalogs: available indicators, per-page series menus, the state
//! table used by the regional map, and the Treasury curve tenors.

use crate::domain::{IndicatorInfo, IndicatorPage};

/// `(id, name, category)` served by `GET /api/indicators`.
pub const INDICATORS: [(&str, &str, &str); 8] = [
    ("FEDFUNDS", "Federal Funds Effective Rate", "Interest Rates"),
    ("DFF", "Federal Funds Rate (Daily)", "Interest Rates"),
    ("UNRATE", "Unemployment Rate", "Labor Market"),
    ("CPIAUCSL", "Consumer Price Index for All Urban Consumers", "Inflation"),
    ("GDPC1", "Real Gross Domestic Product", "National Accounts"),
    ("PAYEMS", "All Employees, Total Nonfarm", "Labor Market"),
    (
        "T10Y2Y",
        "10-Year Treasury Constant Maturity Minus 2-Year Treasury",
        "Interest Rates",
    ),
    ("SP500", "S&P 500", "Financial Markets"),
];

pub const INTEREST_RATES_CATEGORY: &str = "Interest Rates";

/// Series summarised on the dashboard, in card order.
pub const DASHBOARD_SERIES: [&str; 4] = ["FEDFUNDS", "UNRATE", "CPIAUCSL", "GDPC1"];

pub fn indicator_catalog() -> Vec<IndicatorInfo> {
    INDICATORS
        .iter()
        .map(|(id, name, category)| IndicatorInfo {
            id: id.to_string(),
            name: name.to_string(),
            category: category.to_string(),
        })
        .collect()
}

const INFLATION_SERIES: [(&str, &str); 4] = [
    ("CPIAUCSL", "Consumer Price Index (All Urban Consumers)"),
    ("PCEPI", "Personal Consumption Expenditures Price Index"),
    ("CPILFESL", "Core CPI (Less Food and Energy)"),
    ("CORESTICKM159SFRBATL", "Sticky Price CPI"),
];

const UNEMPLOYMENT_SERIES: [(&str, &str); 5] = [
    ("UNRATE", "Unemployment Rate"),
    ("PAYEMS", "Total Nonfarm Payrolls"),
    ("ICSA", "Initial Jobless Claims"),
    ("LNS11300000", "Labor Force Participation Rate"),
    ("LNS12032194", "Long-term Unemployed (27+ weeks)"),
];

const GDP_SERIES: [(&str, &str); 4] = [
    ("GDPC1", "Real Gross Domestic Product"),
    ("A191RL1Q225SBEA", "Real GDP per Capita"),
    ("GDP", "Nominal Gross Domestic Product"),
    ("A191RI1Q225SBEA", "Real GDP Percent Change"),
];

/// Fixed series menu of a page.
///
/// The interest-rate page builds its menu from the live catalog instead; this
/// returns the catalog's interest-rate entries as its static fallback.
pub fn page_series(page: IndicatorPage) -> Vec<(String, String)> {
    let fixed: &[(&str, &str)] = match page {
        IndicatorPage::InterestRates => {
            return INDICATORS
                .iter()
                .filter(|(_, _, cat)| *cat == INTEREST_RATES_CATEGORY)
                .map(|(id, name, _)| (id.to_string(), name.to_string()))
                .collect();
        }
        IndicatorPage::Inflation => &INFLATION_SERIES,
        IndicatorPage::Unemployment => &UNEMPLOYMENT_SERIES,
        IndicatorPage::Gdp => &GDP_SERIES,
    };
    fixed
        .iter()
        .map(|(id, name)| (id.to_string(), name.to_string()))
        .collect()
}

/// Which page a series id belongs to; lets `fed page --series ID` pick the page.
pub fn page_for_series(series_id: &str) -> Option<IndicatorPage> {
    [
        IndicatorPage::InterestRates,
        IndicatorPage::Inflation,
        IndicatorPage::Unemployment,
        IndicatorPage::Gdp,
    ]
    .into_iter()
    .find(|page| page_series(*page).iter().any(|(id, _)| id == series_id))
}

/// Presentation metadata of a dashboard card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardMeta {
    pub series_id: &'static str,
    pub title: &'static str,
    pub units: &'static str,
    pub trend: Trend,
    pub description: &'static str,
    /// Accent colour as RGB.
    pub color: (u8, u8, u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
    Neutral,
}

impl Trend {
    pub fn arrow(self) -> &'static str {
        match self {
            Trend::Up => "↑",
            Trend::Down => "↓",
            Trend::Neutral => "→",
        }
    }
}

pub const KEY_INDICATORS: [CardMeta; 4] = [
    CardMeta {
        series_id: "FEDFUNDS",
        title: "Federal Funds Rate",
        units: "%",
        trend: Trend::Neutral,
        description: "The target interest rate set by the Federal Open Market Committee, used by banks to charge each other for short-term loans to meet their reserve requirements.",
        color: (0x1f, 0x77, 0xb4),
    },
    CardMeta {
        series_id: "UNRATE",
        title: "Unemployment Rate",
        units: "%",
        trend: Trend::Down,
        description: "The percentage of the total labor force that is unemployed yet actively seeking employment.",
        color: (0xff, 0x7f, 0x0e),
    },
    CardMeta {
        series_id: "CPIAUCSL",
        title: "Consumer Price Index",
        units: "",
        trend: Trend::Up,
        description: "A measure of the average change over time in the prices paid by urban consumers for a market basket of consumer goods and services.",
        color: (0x2c, 0xa0, 0x2c),
    },
    CardMeta {
        series_id: "GDPC1",
        title: "Real GDP",
        units: "$B",
        trend: Trend::Up,
        description: "The inflation-adjusted value of the goods and services produced by labor and property in the United States.",
        color: (0xd6, 0x27, 0x28),
    },
];

pub fn card_meta(series_id: &str) -> Option<&'static CardMeta> {
    KEY_INDICATORS.iter().find(|c| c.series_id == series_id)
}

/// Treasury constant-maturity series, shortest tenor first.
pub const YIELD_CURVE_TENORS: [(&str, &str); 11] = [
    ("1 Mo", "DGS1MO"),
    ("3 Mo", "DGS3MO"),
    ("6 Mo", "DGS6MO"),
    ("1 Yr", "DGS1"),
    ("2 Yr", "DGS2"),
    ("3 Yr", "DGS3"),
    ("5 Yr", "DGS5"),
    ("7 Yr", "DGS7"),
    ("10 Yr", "DGS10"),
    ("20 Yr", "DGS20"),
    ("30 Yr", "DGS30"),
];

/// Postal code and name of the 50 states plus DC.
pub const STATES: [(&str, &str); 51] = [
    ("AL", "Alabama"),
    ("AK", "Alaska"),
    ("AZ", "Arizona"),
    ("AR", "Arkansas"),
    ("CA", "California"),
    ("CO", "Colorado"),
    ("CT", "Connecticut"),
    ("DE", "Delaware"),
    ("FL", "Florida"),
    ("GA", "Georgia"),
    ("HI", "Hawaii"),
    ("ID", "Idaho"),
    ("IL", "Illinois"),
    ("IN", "Indiana"),
    ("IA", "Iowa"),
    ("KS", "Kansas"),
    ("KY", "Kentucky"),
    ("LA", "Louisiana"),
    ("ME", "Maine"),
    ("MD", "Maryland"),
    ("MA", "Massachusetts"),
    ("MI", "Michigan"),
    ("MN", "Minnesota"),
    ("MS", "Mississippi"),
    ("MO", "Missouri"),
    ("MT", "Montana"),
    ("NE", "Nebraska"),
    ("NV", "Nevada"),
    ("NH", "New Hampshire"),
    ("NJ", "New Jersey"),
    ("NM", "New Mexico"),
    ("NY", "New York"),
    ("NC", "North Carolina"),
    ("ND", "North Dakota"),
    ("OH", "Ohio"),
    ("OK", "Oklahoma"),
    ("OR", "Oregon"),
    ("PA", "Pennsylvania"),
    ("RI", "Rhode Island"),
    ("SC", "South Carolina"),
    ("SD", "South Dakota"),
    ("TN", "Tennessee"),
    ("TX", "Texas"),
    ("UT", "Utah"),
    ("VT", "Vermont"),
    ("VA", "Virginia"),
    ("WA", "Washington"),
    ("WV", "West Virginia"),
    ("WI", "Wisconsin"),
    ("WY", "Wyoming"),
    ("DC", "District of Columbia"),
];

pub fn state_name(code: &str) -> Option<&'static str> {
    STATES
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(code))
        .map(|(_, name)| *name)
}

/// Substitute a state code into a series pattern.
pub fn state_series_id(pattern: &str, state_code: &str) -> String {
    pattern.replace("{state_code}", state_code)
}

/// Fallback id tried when the pattern's series does not exist: the code is
/// moved to the front (`MEDLISPRI{state_code}` -> `{code}MEDLISPRI`).
pub fn alternative_series_id(pattern: &str, state_code: &str) -> String {
    format!("{state_code}{}", pattern.replace("{state_code}", ""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interest_rate_menu_comes_from_catalog() {
        let ids: Vec<String> = page_series(IndicatorPage::InterestRates)
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        assert_eq!(ids, vec!["FEDFUNDS", "DFF", "T10Y2Y"]);
    }

    #[test]
    fn deep_links_resolve_pages() {
        assert_eq!(page_for_series("PAYEMS"), Some(IndicatorPage::Unemployment));
        assert_eq!(page_for_series("PCEPI"), Some(IndicatorPage::Inflation));
        assert_eq!(page_for_series("T10Y2Y"), Some(IndicatorPage::InterestRates));
        assert_eq!(page_for_series("SP500"), None);
    }

    #[test]
    fn state_series_patterns() {
        assert_eq!(state_series_id("{state_code}UR", "CA"), "CAUR");
        assert_eq!(state_series_id("MEDLISPRI{state_code}", "TX"), "MEDLISPRITX");
        assert_eq!(alternative_series_id("MEDLISPRI{state_code}", "TX"), "TXMEDLISPRI");
        assert_eq!(alternative_series_id("{state_code}PCPI", "NY"), "NYPCPI");
    }

    #[test]
    fn state_table_is_complete() {
        assert_eq!(STATES.len(), 51);
        assert_eq!(state_name("dc"), Some("District of Columbia"));
        assert_eq!(state_name("ZZ"), None);
    }

    #[test]
    fn every_dashboard_series_has_a_card() {
        for id in DASHBOARD_SERIES {
            assert!(card_meta(id).is_some(), "{id}");
        }
    }
}
