// SPDX-FileCopyrightText: 2026 Statroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reference data: mapping human names onto each data source's code space.
//!
//! The five sources use disjoint identifier schemes. World Bank and IMF use
//! ISO 3166 alpha-3, Comtrade uses UN numeric codes, FAOSTAT uses its own
//! area/item/element numbers, and OWID addresses charts by slug.

/// One code space a name can be resolved in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodeTable {
    Iso3,
    UnNumeric,
    FaoArea,
    FaoItem,
    FaoElement,
    OwidChart,
}

/// Name-to-code lookup. Implementations must be cheap and side-effect free.
pub trait ReferenceData: Send + Sync {
    /// Resolve `name` in `table`, or `None` if it has no entry.
    fn resolve(&self, table: CodeTable, name: &str) -> Option<String>;
}

struct Country {
    name: &'static str,
    aliases: &'static [&'static str],
    iso3: &'static str,
    /// Comtrade reporter/partner code.
    un: &'static str,
    fao: &'static str,
}

const fn country(
    name: &'static str,
    aliases: &'static [&'static str],
    iso3: &'static str,
    un: &'static str,
    fao: &'static str,
) -> Country {
    Country {
        name,
        aliases,
        iso3,
        un,
        fao,
    }
}

const COUNTRIES: &[Country] = &[
    country("nigeria", &[], "NGA", "566", "159"),
    country("ghana", &[], "GHA", "288", "81"),
    country("kenya", &[], "KEN", "404", "114"),
    country("south africa", &[], "ZAF", "710", "202"),
    country("egypt", &[], "EGY", "818", "59"),
    country("ethiopia", &[], "ETH", "231", "238"),
    country("tanzania", &["united republic of tanzania"], "TZA", "834", "215"),
    country("uganda", &[], "UGA", "800", "226"),
    country("senegal", &[], "SEN", "686", "195"),
    country("cote d'ivoire", &["ivory coast", "côte d'ivoire"], "CIV", "384", "107"),
    country("morocco", &[], "MAR", "504", "143"),
    country("algeria", &[], "DZA", "012", "4"),
    country("rwanda", &[], "RWA", "646", "184"),
    country(
        "united states",
        &["usa", "us", "united states of america", "america"],
        "USA",
        "842",
        "231",
    ),
    country("canada", &[], "CAN", "124", "33"),
    country("mexico", &[], "MEX", "484", "138"),
    country("brazil", &[], "BRA", "076", "21"),
    country("argentina", &[], "ARG", "032", "9"),
    country("chile", &[], "CHL", "152", "40"),
    country("colombia", &[], "COL", "170", "44"),
    country("peru", &[], "PER", "604", "170"),
    country("united kingdom", &["uk", "britain", "great britain"], "GBR", "826", "229"),
    country("germany", &[], "DEU", "276", "79"),
    country("france", &[], "FRA", "251", "68"),
    country("italy", &[], "ITA", "381", "106"),
    country("spain", &[], "ESP", "724", "203"),
    country("netherlands", &["holland"], "NLD", "528", "150"),
    country("switzerland", &[], "CHE", "757", "211"),
    country("russia", &["russian federation"], "RUS", "643", "185"),
    country("turkey", &["türkiye", "turkiye"], "TUR", "792", "223"),
    country("saudi arabia", &[], "SAU", "682", "194"),
    country("china", &["prc", "people's republic of china"], "CHN", "156", "351"),
    country("india", &[], "IND", "699", "100"),
    country("japan", &[], "JPN", "392", "110"),
    country("south korea", &["korea", "republic of korea"], "KOR", "410", "117"),
    country("indonesia", &[], "IDN", "360", "101"),
    country("vietnam", &["viet nam"], "VNM", "704", "237"),
    country("thailand", &[], "THA", "764", "216"),
    country("philippines", &[], "PHL", "608", "171"),
    country("pakistan", &[], "PAK", "586", "165"),
    country("bangladesh", &[], "BGD", "050", "16"),
    country("australia", &[], "AUS", "036", "10"),
];

/// Comtrade partner code for the world aggregate.
pub const WORLD_PARTNER: &str = "0";

const FAO_ITEMS: &[(&str, &str)] = &[
    ("maize", "56"),
    ("corn", "56"),
    ("wheat", "15"),
    ("rice", "27"),
    ("soybeans", "236"),
    ("soya beans", "236"),
    ("cassava", "125"),
    ("sorghum", "83"),
    ("potatoes", "116"),
    ("sugar cane", "156"),
    ("coffee", "656"),
    ("cocoa", "661"),
];

const FAO_ELEMENTS: &[(&str, &str)] = &[
    ("area harvested", "5312"),
    ("yield", "5412"),
    ("production", "5510"),
];

const OWID_CHARTS: &[(&str, &str)] = &[
    ("life expectancy", "life-expectancy"),
    ("co2 emissions per capita", "co-emissions-per-capita"),
    ("co2 emissions", "co-emissions-per-capita"),
    ("gdp per capita", "gdp-per-capita-worldbank"),
    ("population", "population"),
    ("child mortality", "child-mortality"),
    ("extreme poverty", "share-of-population-in-extreme-poverty"),
    ("access to electricity", "share-of-the-population-with-access-to-electricity"),
    ("renewable energy share", "renewable-share-energy"),
];

/// Built-in reference tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticReferenceData;

impl StaticReferenceData {
    fn country(name: &str) -> Option<&'static Country> {
        let key = normalize(name);
        let iso = key.to_ascii_uppercase();
        COUNTRIES.iter().find(|c| {
            c.name == key || c.aliases.contains(&key.as_str()) || c.iso3 == iso
        })
    }
}

impl ReferenceData for StaticReferenceData {
    fn resolve(&self, table: CodeTable, name: &str) -> Option<String> {
        match table {
            CodeTable::Iso3 => Self::country(name)
                .map(|c| c.iso3.to_string())
                .or_else(|| looks_like_iso3(name).then(|| name.trim().to_ascii_uppercase())),
            CodeTable::UnNumeric => Self::country(name)
                .map(|c| c.un.to_string())
                .or_else(|| is_numeric_code(name).then(|| name.trim().to_string())),
            CodeTable::FaoArea => Self::country(name)
                .map(|c| c.fao.to_string())
                .or_else(|| is_numeric_code(name).then(|| name.trim().to_string())),
            CodeTable::FaoItem => lookup_pair(FAO_ITEMS, name),
            CodeTable::FaoElement => lookup_pair(FAO_ELEMENTS, name),
            CodeTable::OwidChart => lookup_pair(OWID_CHARTS, name)
                .or_else(|| looks_like_slug(name).then(|| name.trim().to_string())),
        }
    }
}

fn lookup_pair(table: &[(&str, &str)], name: &str) -> Option<String> {
    if is_numeric_code(name) {
        return Some(name.trim().to_string());
    }
    let key = normalize(name);
    table
        .iter()
        .find(|(label, _)| *label == key)
        .map(|(_, code)| code.to_string())
}

fn normalize(name: &str) -> String {
    let lower = name.trim().to_lowercase();
    lower
        .strip_prefix("the ")
        .map(str::to_string)
        .unwrap_or(lower)
}

fn looks_like_iso3(name: &str) -> bool {
    let trimmed = name.trim();
    trimmed.len() == 3 && trimmed.chars().all(|c| c.is_ascii_alphabetic())
}

fn is_numeric_code(name: &str) -> bool {
    let trimmed = name.trim();
    !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit())
}

/// Lowercase alphanumerics and hyphens, e.g. `life-expectancy`.
fn looks_like_slug(name: &str) -> bool {
    let trimmed = name.trim();
    !trimmed.is_empty()
        && trimmed
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(table: CodeTable, name: &str) -> Option<String> {
        StaticReferenceData.resolve(table, name)
    }

    #[test]
    fn country_names_resolve_in_every_country_table() {
        assert_eq!(resolve(CodeTable::Iso3, "Nigeria").as_deref(), Some("NGA"));
        assert_eq!(resolve(CodeTable::UnNumeric, "Nigeria").as_deref(), Some("566"));
        assert_eq!(resolve(CodeTable::FaoArea, "Nigeria").as_deref(), Some("159"));
    }

    #[test]
    fn aliases_and_articles_are_accepted() {
        assert_eq!(resolve(CodeTable::Iso3, "The United States").as_deref(), Some("USA"));
        assert_eq!(resolve(CodeTable::Iso3, "UK").as_deref(), Some("GBR"));
        assert_eq!(resolve(CodeTable::UnNumeric, "ivory coast").as_deref(), Some("384"));
    }

    #[test]
    fn iso3_input_passes_through() {
        assert_eq!(resolve(CodeTable::Iso3, "gha").as_deref(), Some("GHA"));
        // Not in the table but shaped like a code.
        assert_eq!(resolve(CodeTable::Iso3, "BWA").as_deref(), Some("BWA"));
        // Known ISO3 maps into the other code spaces.
        assert_eq!(resolve(CodeTable::FaoArea, "KEN").as_deref(), Some("114"));
    }

    #[test]
    fn unknown_country_is_none() {
        assert_eq!(resolve(CodeTable::Iso3, "Atlantis"), None);
        assert_eq!(resolve(CodeTable::UnNumeric, "Atlantis"), None);
        assert_eq!(resolve(CodeTable::FaoArea, "Atlantis"), None);
    }

    #[test]
    fn code_spaces_are_disjoint() {
        // The same country has different identifiers per source.
        assert_eq!(resolve(CodeTable::UnNumeric, "United States").as_deref(), Some("842"));
        assert_eq!(resolve(CodeTable::FaoArea, "United States").as_deref(), Some("231"));
        assert_eq!(resolve(CodeTable::UnNumeric, "Ethiopia").as_deref(), Some("231"));
        assert_eq!(resolve(CodeTable::FaoItem, "Nigeria"), None);
    }

    #[test]
    fn fao_items_and_elements() {
        assert_eq!(resolve(CodeTable::FaoItem, "Maize").as_deref(), Some("56"));
        assert_eq!(resolve(CodeTable::FaoItem, "56").as_deref(), Some("56"));
        assert_eq!(resolve(CodeTable::FaoElement, "Production").as_deref(), Some("5510"));
        assert_eq!(resolve(CodeTable::FaoItem, "unobtainium"), None);
    }

    #[test]
    fn owid_names_and_slugs() {
        assert_eq!(
            resolve(CodeTable::OwidChart, "Life expectancy").as_deref(),
            Some("life-expectancy")
        );
        assert_eq!(
            resolve(CodeTable::OwidChart, "share-of-population-urban").as_deref(),
            Some("share-of-population-urban")
        );
        assert_eq!(resolve(CodeTable::OwidChart, "Some Unknown Chart"), None);
    }
}
