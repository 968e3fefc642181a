/// A country known to the map, placed at its approximate centroid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Country {
    pub name: &'static str,
    pub iso3: &'static str,
    pub lat: f64,
    pub lon: f64,
}

const fn country(name: &'static str, iso3: &'static str, lat: f64, lon: f64) -> Country {
    Country { name, iso3, lat, lon }
}

/// Standard English short names.
pub static COUNTRIES: &[Country] = &[
    country("Algeria", "DZA", 28.0, 2.6),
    country("Angola", "AGO", -12.3, 17.5),
    country("Argentina", "ARG", -34.0, -64.0),
    country("Australia", "AUS", -25.0, 134.0),
    country("Austria", "AUT", 47.5, 14.5),
    country("Belgium", "BEL", 50.6, 4.7),
    country("Bolivia", "BOL", -16.7, -64.7),
    country("Bosnia and Herzegovina", "BIH", 44.2, 17.8),
    country("Brazil", "BRA", -10.8, -52.9),
    country("Bulgaria", "BGR", 42.7, 25.5),
    country("Cameroon", "CMR", 5.7, 12.7),
    country("Canada", "CAN", 56.1, -106.3),
    country("Chile", "CHL", -35.7, -71.5),
    country("China", "CHN", 35.9, 104.2),
    country("Colombia", "COL", 4.6, -74.3),
    country("Costa Rica", "CRI", 9.7, -83.8),
    country("Croatia", "HRV", 45.1, 15.2),
    country("Cuba", "CUB", 21.5, -77.8),
    country("Czech Republic", "CZE", 49.8, 15.5),
    country("Czechia", "CZE", 49.8, 15.5),
    country("Democratic Republic of the Congo", "COD", -4.0, 21.8),
    country("Denmark", "DNK", 56.3, 9.5),
    country("Ecuador", "ECU", -1.8, -78.2),
    country("Egypt", "EGY", 26.8, 30.8),
    country("France", "FRA", 46.2, 2.2),
    country("Germany", "DEU", 51.2, 10.5),
    country("Ghana", "GHA", 7.9, -1.0),
    country("Greece", "GRC", 39.1, 21.8),
    country("Haiti", "HTI", 19.0, -72.3),
    country("Honduras", "HND", 15.2, -86.2),
    country("Hungary", "HUN", 47.2, 19.5),
    country("Iceland", "ISL", 64.9, -19.0),
    country("Indonesia", "IDN", -0.8, 113.9),
    country("Iran", "IRN", 32.4, 53.7),
    country("Iraq", "IRQ", 33.2, 43.7),
    country("Ireland", "IRL", 53.4, -8.2),
    country("Israel", "ISR", 31.0, 34.9),
    country("Italy", "ITA", 41.9, 12.6),
    country("Ivory Coast", "CIV", 7.5, -5.5),
    country("Jamaica", "JAM", 18.1, -77.3),
    country("Japan", "JPN", 36.2, 138.3),
    country("Kuwait", "KWT", 29.3, 47.5),
    country("Mexico", "MEX", 23.6, -102.6),
    country("Morocco", "MAR", 31.8, -7.1),
    country("Netherlands", "NLD", 52.1, 5.3),
    country("New Zealand", "NZL", -40.9, 174.9),
    country("Nigeria", "NGA", 9.1, 8.7),
    country("North Korea", "PRK", 40.3, 127.5),
    country("Norway", "NOR", 60.5, 8.5),
    country("Panama", "PAN", 8.5, -80.8),
    country("Paraguay", "PRY", -23.4, -58.4),
    country("Peru", "PER", -9.2, -75.0),
    country("Poland", "POL", 51.9, 19.1),
    country("Portugal", "PRT", 39.4, -8.2),
    country("Qatar", "QAT", 25.4, 51.2),
    country("Romania", "ROU", 45.9, 25.0),
    country("Russia", "RUS", 61.5, 105.3),
    country("Saudi Arabia", "SAU", 23.9, 45.1),
    country("Senegal", "SEN", 14.5, -14.5),
    country("Serbia", "SRB", 44.0, 21.0),
    country("Slovakia", "SVK", 48.7, 19.7),
    country("Slovenia", "SVN", 46.2, 15.0),
    country("South Africa", "ZAF", -30.6, 22.9),
    country("South Korea", "KOR", 35.9, 127.8),
    country("Spain", "ESP", 40.5, -3.7),
    country("Sweden", "SWE", 60.1, 18.6),
    country("Switzerland", "CHE", 46.8, 8.2),
    country("Togo", "TGO", 8.6, 0.8),
    country("Trinidad and Tobago", "TTO", 10.7, -61.2),
    country("Tunisia", "TUN", 33.9, 9.5),
    country("Turkey", "TUR", 39.0, 35.2),
    country("Ukraine", "UKR", 48.4, 31.2),
    country("United Arab Emirates", "ARE", 23.4, 53.8),
    country("United Kingdom", "GBR", 55.4, -3.4),
    country("United States", "USA", 37.1, -95.7),
    country("Uruguay", "URY", -32.5, -55.8),
];

/// Case-insensitive exact lookup by country name.
pub fn lookup(name: &str) -> Option<&'static Country> {
    let name = name.trim();
    COUNTRIES.iter().find(|c| c.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_winners_by_standard_name() {
        assert_eq!(lookup("Uruguay").map(|c| c.iso3), Some("URY"));
        assert_eq!(lookup("brazil").map(|c| c.iso3), Some("BRA"));
        assert_eq!(lookup(" Italy ").map(|c| c.iso3), Some("ITA"));
    }

    #[test]
    fn historical_names_are_not_matched() {
        assert!(lookup("Germany FR").is_none());
        assert!(lookup("England").is_none());
    }

    #[test]
    fn centroids_are_on_the_globe() {
        for c in COUNTRIES {
            assert!((-90.0..=90.0).contains(&c.lat), "{}", c.name);
            assert!((-180.0..=180.0).contains(&c.lon), "{}", c.name);
            assert_eq!(c.iso3.len(), 3);
        }
    }
}
