// src/specs/stats.rs
//! Per-place statistics pages (climate, health, housing sections).
//!
//! Each section renders a comparison table whose first column is the label and
//! second column the place's own value (later columns are state/national
//! averages, ignored). Values carry units ("37.8 in.") and are reduced to a
//! plain number here, so the source table already holds clean numerics.

use crate::config::consts::{col, CLIMATE, HEALTH, HOUSING};
use crate::core::html::table_value_after_label;
use crate::error::FieldError;
use crate::normalize::extract_number;

/// One column of a section: which row label feeds it.
#[derive(Clone, Copy, Debug)]
pub struct StatField {
    pub column: &'static str,
    pub label: &'static str,
}

#[derive(Clone, Copy, Debug)]
pub struct StatPage {
    pub concern: &'static str,
    /// Path segment of the section on the site.
    pub section: &'static str,
    pub fields: &'static [StatField],
}

const fn f(column: &'static str, label: &'static str) -> StatField {
    StatField { column, label }
}

pub const CLIMATE_PAGE: StatPage = StatPage {
    concern: CLIMATE,
    section: "climate",
    fields: &[
        f(col::RAINFALL, "Rainfall"),
        f(col::SNOWFALL, "Snowfall"),
        f(col::PRECIPITATION, "Precipitation"),
        f(col::SUNSHINE, "Sunny"),
        f(col::UV, "UV Index"),
        f(col::ABOVE_90, "Days > 90"),
        f(col::BELOW_30, "Days < 32"),
        f(col::BELOW_0, "Days < 0"),
        f(col::HOT_SCORE, "Summer Comfort"),
        f(col::COLD_SCORE, "Winter Comfort"),
    ],
};

pub const HEALTH_PAGE: StatPage = StatPage {
    concern: HEALTH,
    section: "health",
    fields: &[
        f(col::PHYSICIANS, "Physicians"),
        f(col::HEALTH_COSTS, "Health Cost"),
        f(col::WATER_QUALITY, "Water Quality"),
        f(col::AIR_QUALITY, "Air Quality"),
    ],
};

pub const HOUSING_PAGE: StatPage = StatPage {
    concern: HOUSING,
    section: "housing",
    fields: &[
        f(col::MEDIAN_HOME_COST, "Median Home Cost"),
        f(col::HOME_INSURANCE, "Home Insurance"),
    ],
};

impl StatPage {
    pub fn columns(&self) -> Vec<&'static str> {
        self.fields.iter().map(|f| f.column).collect()
    }

    pub fn url(&self, base: &str, state_name: &str, place: &str) -> String {
        format!("{}/{}/city/{}/{}", base.trim_end_matches('/'), self.section, state_name, place)
    }

    /// One result per field, in `fields` order.
    pub fn parse(&self, doc: &str) -> Vec<Result<String, FieldError>> {
        self.fields
            .iter()
            .map(|field| {
                let raw = table_value_after_label(doc, field.label)
                    .ok_or(FieldError::NotFound(field.column))?;
                extract_number(&raw)
                    .map(|x| x.to_string())
                    .ok_or(FieldError::Unparseable { field: field.column, raw })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_page_yields_partial_row() {
        let doc = "<table>
            <tr><td>Rainfall</td><td>37.8 in.</td><td>38.1 in.</td></tr>
            <tr><td>Snowfall</td><td>?</td><td>27.8 in.</td></tr>
            <tr><td>Days &gt; 90&deg; F</td><td>11.2 days</td></tr>
            <tr><td>UV Index</td><td>4.1</td></tr></table>";
        let got = CLIMATE_PAGE.parse(doc);
        assert_eq!(got.len(), CLIMATE_PAGE.fields.len());
        assert_eq!(got[0], Ok(s!("37.8")));
        assert!(matches!(got[1], Err(FieldError::Unparseable { field: "Snowfall", .. })));
        assert_eq!(got[2], Err(FieldError::NotFound(col::PRECIPITATION)));
        assert_eq!(got[4], Ok(s!("4.1")));
        assert_eq!(got[5], Ok(s!("11.2")));
    }

    #[test]
    fn section_urls() {
        assert_eq!(
            HEALTH_PAGE.url("https://b.net", "illinois", "springfield"),
            "https://b.net/health/city/illinois/springfield"
        );
        assert_eq!(HOUSING_PAGE.columns(), vec![col::MEDIAN_HOME_COST, col::HOME_INSURANCE]);
    }
}
