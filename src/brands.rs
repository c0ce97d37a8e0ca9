//! Hotel brand → logo resolution.
//!
//! Upstream brand metadata is missing as often as not, so resolution walks
//! the brand, chain, type, subtype and display name fields and degrades from
//! exact match to substring match before handing back the fallback logo.

/// Logo shown when no rule matches.
pub const FALLBACK_LOGO: &str = "fallback_logo.png";

/// Logo returned for names like "W Austin".
pub const W_HOTELS_LOGO: &str = "w_hotels.png";

/// Brand token → logo file. Checked in order during substring matching, so
/// sub-brands come before anything they contain.
pub const BRAND_LOGOS: &[(&str, &str)] = &[
    ("conrad", "conrad.png"),
    ("embassysuites", "embassy_suites.png"),
    ("grandhyatt", "grand_hyatt.png"),
    ("hyattregency", "hyatt_regency.png"),
    ("parkhyatt", "park_hyatt.png"),
    ("thompson", "thompson.png"),
    ("jwmarriott", "jw_marriott.png"),
    ("renaissance", "renaissance.png"),
    ("residenceinn", "residence_inn.png"),
    ("stregis", "st_regis.png"),
    ("ritzcarlton", "ritz_carlton.png"),
    ("westin", "westin.png"),
    ("edition", "edition.png"),
    ("intercontinental", "intercontinental.png"),
    ("kimpton", "kimpton.png"),
    ("mandarinoriental", "mandarin_oriental.png"),
    ("fourseasons", "four_seasons.png"),
    ("waldorfastoria", "waldorf_astoria.png"),
    ("whotels", W_HOTELS_LOGO),
];

/// Irregular spelling → canonical brand token.
pub const BRAND_ALIASES: &[(&str, &str)] = &[
    ("st.regis", "stregis"),
    ("saintregis", "stregis"),
    ("ritz-carlton", "ritzcarlton"),
    ("ritz", "ritzcarlton"),
    ("residenceinnbymarriott", "residenceinn"),
    ("residenceinnmarriott", "residenceinn"),
    ("four seasons", "fourseasons"),
    ("inter-continental", "intercontinental"),
];

/// Lowercases, spells out `&`, and drops everything that is not `[a-z0-9]`.
pub fn normalize_brand(text: &str) -> String {
    text.trim()
        .to_lowercase()
        .replace('&', "and")
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

/// The brand-ish fields of a hotel property, in lookup priority order.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrandFields<'a> {
    pub brand: Option<&'a str>,
    pub chain: Option<&'a str>,
    pub kind: Option<&'a str>,
    pub subtype: Option<&'a str>,
    pub name: &'a str,
}

impl<'a> BrandFields<'a> {
    fn candidates(&self) -> impl Iterator<Item = &'a str> {
        [self.brand, self.chain, self.kind, self.subtype, Some(self.name)]
            .into_iter()
            .flatten()
            .filter(|c| !c.trim().is_empty())
    }
}

/// Ordered brand and alias rules.
///
/// Alias keys are stored normalized so punctuated spellings such as
/// `ritz-carlton` take part in both the exact and the substring alias steps.
#[derive(Debug, Clone)]
pub struct LogoTable {
    logos: Vec<(String, String)>,
    aliases: Vec<(String, String)>,
    fallback: String,
}

impl Default for LogoTable {
    fn default() -> Self {
        Self::new(BRAND_LOGOS, BRAND_ALIASES, FALLBACK_LOGO)
    }
}

impl LogoTable {
    pub fn new(logos: &[(&str, &str)], aliases: &[(&str, &str)], fallback: &str) -> Self {
        Self {
            logos: logos
                .iter()
                .map(|(k, v)| (normalize_brand(k), (*v).to_string()))
                .collect(),
            aliases: aliases
                .iter()
                .map(|(k, v)| (normalize_brand(k), normalize_brand(v)))
                .filter(|(k, _)| !k.is_empty())
                .collect(),
            fallback: fallback.to_string(),
        }
    }

    fn logo(&self, token: &str) -> Option<&str> {
        self.logos
            .iter()
            .find(|(key, _)| key == token)
            .map(|(_, logo)| logo.as_str())
    }

    fn canonical<'t>(&'t self, token: &'t str) -> &'t str {
        self.aliases
            .iter()
            .find(|(raw, _)| raw == token)
            .map(|(_, canonical)| canonical.as_str())
            .unwrap_or(token)
    }

    fn match_token(&self, token: &str) -> Option<&str> {
        if token.is_empty() {
            return None;
        }
        let token = self.canonical(token);

        if let Some(logo) = self.logo(token) {
            return Some(logo);
        }

        if let Some((_, logo)) = self.logos.iter().find(|(key, _)| token.contains(key.as_str())) {
            return Some(logo.as_str());
        }

        self.aliases
            .iter()
            .filter(|(raw, _)| token.contains(raw.as_str()))
            .find_map(|(_, canonical)| self.logo(canonical))
    }

    /// Logo asset for a property. Never empty: unmatched properties get the
    /// fallback asset.
    pub fn resolve(&self, fields: &BrandFields<'_>) -> &str {
        if fields.name.trim().to_lowercase().starts_with("w ") {
            return self.logo("whotels").unwrap_or(W_HOTELS_LOGO);
        }

        fields
            .candidates()
            .find_map(|candidate| self.match_token(&normalize_brand(candidate)))
            .unwrap_or(self.fallback.as_str())
    }

    /// Joins an asset id onto the logo base URL.
    pub fn url_for(base_url: &str, asset: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), asset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> BrandFields<'_> {
        BrandFields {
            name,
            ..Default::default()
        }
    }

    #[test]
    fn normalizes_punctuation_and_ampersand() {
        assert_eq!(normalize_brand("  The Ritz-Carlton, Boston "), "theritzcarltonboston");
        assert_eq!(normalize_brand("Hotels & Resorts"), "hotelsandresorts");
        assert_eq!(normalize_brand("St. Regis"), "stregis");
    }

    #[test]
    fn ritz_carlton_from_brand_text() {
        let table = LogoTable::default();
        let fields = BrandFields {
            brand: Some("The Ritz-Carlton, Boston"),
            name: "Some Name",
            ..Default::default()
        };
        assert_eq!(table.resolve(&fields), "ritz_carlton.png");
        assert_eq!(table.resolve(&named("Ritz-Carlton")), "ritz_carlton.png");
    }

    #[test]
    fn w_prefix_is_w_hotels_not_westin() {
        let table = LogoTable::default();
        assert_eq!(table.resolve(&named("W Austin")), W_HOTELS_LOGO);
        assert_eq!(table.resolve(&named("  w new york - times square")), W_HOTELS_LOGO);
        assert_eq!(table.resolve(&named("The Westin Austin Downtown")), "westin.png");
    }

    #[test]
    fn unknown_brand_falls_back() {
        let table = LogoTable::default();
        assert_eq!(table.resolve(&named("Obscure Boutique Inn")), FALLBACK_LOGO);
        assert_eq!(table.resolve(&named("")), FALLBACK_LOGO);
    }

    #[test]
    fn fields_are_tried_in_priority_order() {
        let table = LogoTable::default();
        let fields = BrandFields {
            brand: Some("Kimpton"),
            chain: Some("InterContinental Hotels Group"),
            name: "Kimpton Hotel Monaco",
            ..Default::default()
        };
        assert_eq!(table.resolve(&fields), "kimpton.png");

        let fields = BrandFields {
            brand: Some("Unknown"),
            chain: Some("Hyatt"),
            subtype: Some("Park Hyatt"),
            name: "Somewhere",
            ..Default::default()
        };
        assert_eq!(table.resolve(&fields), "park_hyatt.png");
    }

    #[test]
    fn alias_substrings_map_through() {
        let table = LogoTable::default();
        assert_eq!(table.resolve(&named("The Saint Regis New York")), "st_regis.png");
        assert_eq!(table.resolve(&named("Four Seasons Resort Maui")), "four_seasons.png");
        assert_eq!(table.resolve(&named("Residence Inn by Marriott")), "residence_inn.png");
    }

    #[test]
    fn table_order_is_respected() {
        let table = LogoTable::new(
            &[("parkhyatt", "park.png"), ("hyatt", "hyatt.png")],
            &[],
            "none.png",
        );
        assert_eq!(table.resolve(&named("Park Hyatt Tokyo")), "park.png");
        assert_eq!(table.resolve(&named("Hyatt Place")), "hyatt.png");
        assert_eq!(table.resolve(&named("Motel")), "none.png");
    }

    #[test]
    fn url_for_joins_cleanly() {
        assert_eq!(LogoTable::url_for("/assets/logos/", "kimpton.png"), "/assets/logos/kimpton.png");
    }
}
