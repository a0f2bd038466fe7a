// src/features.rs
//! Columns computed from the master rather than fetched.

use crate::config::consts::col;
use crate::normalize::{extract_number, round_to};
use crate::table::{Cell, Table};

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometres.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (p1, p2) = (lat1.to_radians(), lat2.to_radians());
    let dp = (lat2 - lat1).to_radians();
    let dl = (lon2 - lon1).to_radians();
    let a = (dp / 2.0).sin().powi(2) + p1.cos() * p2.cos() * (dl / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}

fn coordinates(table: &Table) -> Vec<Option<(f64, f64)>> {
    let (Some(lat), Some(lon)) = (table.column(col::LATITUDE), table.column(col::LONGITUDE)) else {
        return vec![None; table.len()];
    };
    table
        .rows()
        .iter()
        .map(|r| {
            let y = r[lat].as_value().and_then(extract_number)?;
            let x = r[lon].as_value().and_then(extract_number)?;
            Some((y, x))
        })
        .collect()
}

/// `TempleDistance` cells for `master`: km to the nearest temple, one decimal.
/// Rows without coordinates (or no temples at all) are `Missing`.
pub fn nearest_temple_km(master: &Table, temples: &Table) -> Vec<Cell> {
    let sites: Vec<(f64, f64)> = coordinates(temples).into_iter().flatten().collect();
    coordinates(master)
        .into_iter()
        .map(|here| {
            let (lat, lon) = here?;
            sites
                .iter()
                .map(|&(tl, tn)| haversine_km(lat, lon, tl, tn))
                .min_by(f64::total_cmp)
                .map(|d| round_to(d, 1))
        })
        .map(Cell::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_distance() {
        // Springfield IL to Nauvoo IL, about 170 km
        let d = haversine_km(39.7817, -89.6501, 40.5503, -91.3846);
        assert!((160.0..180.0).contains(&d), "{d}");
        assert_eq!(haversine_km(1.0, 2.0, 1.0, 2.0), 0.0);
    }

    #[test]
    fn nearest_or_missing() {
        let mut m = Table::new(cols![col::PLACE, col::LATITUDE, col::LONGITUDE]);
        m.push_row(vec![Cell::value("a"), Cell::value("0"), Cell::value("0")]);
        m.push_row(vec![Cell::value("b"), Cell::Missing, Cell::value("0")]);
        let mut t = Table::new(cols![col::NAME, col::LATITUDE, col::LONGITUDE]);
        t.push_row(vec![Cell::value("far"), Cell::value("10"), Cell::value("0")]);
        t.push_row(vec![Cell::value("near"), Cell::value("1"), Cell::value("0")]);

        let cells = nearest_temple_km(&m, &t);
        assert_eq!(cells[0], Cell::value("111.2"));
        assert_eq!(cells[1], Cell::Missing);

        let none = nearest_temple_km(&m, &Table::new(cols![col::NAME, col::LATITUDE, col::LONGITUDE]));
        assert_eq!(none[0], Cell::Missing);
    }
}
