//! Collapses prose aircraft descriptions ("Boeing 737-800 (Winglets)
//! Passenger") into compact display codes ("B737-800").

use regex::Regex;
use std::sync::OnceLock;

/// One canonicalization rule. Every needle in `all` must occur, and when
/// `any` is non-empty at least one of its needles must occur too.
#[derive(Debug, Clone, Copy)]
pub struct AircraftRule {
    pub all: &'static [&'static str],
    pub any: &'static [&'static str],
    pub code: &'static str,
}

impl AircraftRule {
    const fn all(all: &'static [&'static str], code: &'static str) -> Self {
        Self { all, any: &[], code }
    }

    const fn any(all: &'static [&'static str], any: &'static [&'static str], code: &'static str) -> Self {
        Self { all, any, code }
    }

    pub fn matches(&self, lowered: &str) -> bool {
        self.all.iter().all(|needle| lowered.contains(needle))
            && (self.any.is_empty() || self.any.iter().any(|needle| lowered.contains(needle)))
    }
}

/// Tried top to bottom. Sub-variants sit above their family so a bare
/// family rule never shadows them.
pub const AIRCRAFT_RULES: &[AircraftRule] = &[
    // Airbus
    AircraftRule::all(&["a321", "neo"], "A321neo"),
    AircraftRule::all(&["a321"], "A321"),
    AircraftRule::all(&["a220", "300"], "A220-300"),
    AircraftRule::all(&["a220", "100"], "A220-100"),
    AircraftRule::all(&["a319"], "A319"),
    AircraftRule::all(&["a320"], "A320"),
    AircraftRule::all(&["a330"], "A330"),
    AircraftRule::all(&["a350"], "A350"),
    // Boeing widebodies and 757s
    AircraftRule::all(&["767", "400"], "B767-400"),
    AircraftRule::all(&["767", "300"], "B767-300"),
    AircraftRule::all(&["757", "300"], "B757-300"),
    AircraftRule::all(&["757", "200"], "B757-200"),
    AircraftRule::all(&["787", "10"], "B787-10"),
    AircraftRule::all(&["787", "9"], "B787-9"),
    AircraftRule::all(&["787", "8"], "B787-8"),
    // 737 family
    AircraftRule::any(&["737"], &["900", "max 9"], "B737-900"),
    AircraftRule::any(&["737"], &["800", "max 8"], "B737-800"),
    AircraftRule::all(&["737", "700"], "B737-700"),
    AircraftRule::all(&["737"], "B737"),
    // Regional jets
    AircraftRule::all(&["crj", "900"], "CRJ 900"),
    AircraftRule::all(&["crj", "700"], "CRJ 700"),
    AircraftRule::all(&["crj", "200"], "CRJ 200"),
    AircraftRule::all(&["crj"], "CRJ"),
];

fn embraer_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?:embraer|erj|e)[\s-]?(\d{3})").expect("valid embraer pattern"))
}

fn vendor_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(boeing|airbus|embraer|bombardier|canadair|\bseries\b)")
            .expect("valid vendor pattern")
    })
}

fn junk_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-z0-9\- ]").expect("valid junk pattern"))
}

/// Returns the display code for an aircraft description.
///
/// Falls back to the description with vendor words and punctuation removed,
/// upper-cased. If nothing survives the cleanup, the input is returned as
/// given. Empty input gives an empty string.
pub fn canonicalize(description: &str) -> String {
    let lowered = description.to_lowercase();
    if lowered.trim().is_empty() {
        return String::new();
    }

    if let Some(rule) = AIRCRAFT_RULES.iter().find(|r| r.matches(&lowered)) {
        return rule.code.to_string();
    }

    if let Some(caps) = embraer_re().captures(&lowered) {
        return format!("E{}", &caps[1]);
    }

    let stripped = vendor_re().replace_all(&lowered, "");
    let cleaned = junk_re().replace_all(&stripped, "");
    let cleaned = cleaned.trim().to_uppercase();
    if cleaned.is_empty() {
        description.to_string()
    } else {
        cleaned
    }
}
