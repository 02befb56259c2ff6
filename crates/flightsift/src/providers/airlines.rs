//! IATA airline designators and the names airlines go by in email text.

/// Two-character designator -> airline name.
pub const AIRLINE_CODES: &[(&str, &str)] = &[
    ("AA", "American Airlines"),
    ("AC", "Air Canada"),
    ("AD", "Azul"),
    ("AF", "Air France"),
    ("AI", "Air India"),
    ("AK", "AirAsia"),
    ("AM", "Aeromexico"),
    ("AS", "Alaska Airlines"),
    ("AV", "Avianca"),
    ("AY", "Finnair"),
    ("AZ", "ITA Airways"),
    ("B6", "JetBlue"),
    ("BA", "British Airways"),
    ("BR", "EVA Air"),
    ("CA", "Air China"),
    ("CI", "China Airlines"),
    ("CM", "Copa Airlines"),
    ("CX", "Cathay Pacific"),
    ("CZ", "China Southern"),
    ("DL", "Delta"),
    ("EI", "Aer Lingus"),
    ("EK", "Emirates"),
    ("EY", "Etihad"),
    ("F9", "Frontier"),
    ("FI", "Icelandair"),
    ("FJ", "Fiji Airways"),
    ("FR", "Ryanair"),
    ("G3", "GOL"),
    ("G4", "Allegiant"),
    ("GF", "Gulf Air"),
    ("HA", "Hawaiian Airlines"),
    ("IB", "Iberia"),
    ("JL", "Japan Airlines"),
    ("KE", "Korean Air"),
    ("KL", "KLM"),
    ("LA", "LATAM"),
    ("LH", "Lufthansa"),
    ("LX", "Swiss"),
    ("MH", "Malaysia Airlines"),
    ("MU", "China Eastern"),
    ("MX", "Breeze Airways"),
    ("NH", "ANA"),
    ("NK", "Spirit"),
    ("NZ", "Air New Zealand"),
    ("OS", "Austrian"),
    ("OZ", "Asiana"),
    ("PR", "Philippine Airlines"),
    ("QF", "Qantas"),
    ("QR", "Qatar Airways"),
    ("SK", "SAS"),
    ("SQ", "Singapore Airlines"),
    ("SV", "Saudia"),
    ("SY", "Sun Country"),
    ("TG", "Thai Airways"),
    ("TK", "Turkish Airlines"),
    ("TP", "TAP Portugal"),
    ("U2", "easyJet"),
    ("UA", "United"),
    ("VA", "Virgin Australia"),
    ("VN", "Vietnam Airlines"),
    ("VS", "Virgin Atlantic"),
    ("VY", "Vueling"),
    ("WN", "Southwest"),
    ("WS", "WestJet"),
    ("WY", "Oman Air"),
    ("Y4", "Volaris"),
    ("DY", "Norwegian"),
];

/// Lowercase name variations -> designator. Longer names first so that
/// "american airlines" wins over "american".
pub const AIRLINE_NAME_VARIATIONS: &[(&str, &str)] = &[
    ("american airlines", "AA"),
    ("alaska airlines", "AS"),
    ("hawaiian airlines", "HA"),
    ("british airways", "BA"),
    ("virgin atlantic", "VS"),
    ("virgin australia", "VA"),
    ("air canada", "AC"),
    ("air france", "AF"),
    ("air india", "AI"),
    ("air new zealand", "NZ"),
    ("aer lingus", "EI"),
    ("turkish airlines", "TK"),
    ("qatar airways", "QR"),
    ("singapore airlines", "SQ"),
    ("cathay pacific", "CX"),
    ("japan airlines", "JL"),
    ("korean air", "KE"),
    ("sun country", "SY"),
    ("spirit airlines", "NK"),
    ("frontier airlines", "F9"),
    ("united airlines", "UA"),
    ("delta air lines", "DL"),
    ("southwest airlines", "WN"),
    ("jetblue airways", "B6"),
    ("breeze airways", "MX"),
    ("jetblue", "B6"),
    ("delta", "DL"),
    ("united", "UA"),
    ("southwest", "WN"),
    ("spirit", "NK"),
    ("frontier", "F9"),
    ("allegiant", "G4"),
    ("lufthansa", "LH"),
    ("emirates", "EK"),
    ("qantas", "QF"),
    ("westjet", "WS"),
    ("icelandair", "FI"),
    ("ryanair", "FR"),
    ("easyjet", "U2"),
    ("aeromexico", "AM"),
    ("avianca", "AV"),
    ("volaris", "Y4"),
    ("klm", "KL"),
    ("iberia", "IB"),
    ("finnair", "AY"),
];

/// Hubs and focus cities by designator.
pub const AIRLINE_HUBS: &[(&str, &[&str])] = &[
    ("AA", &["DFW", "CLT", "MIA", "ORD", "PHX", "PHL", "LAX", "JFK", "DCA", "LGA"]),
    ("DL", &["ATL", "MSP", "DTW", "SLC", "SEA", "LAX", "JFK", "LGA", "BOS", "AUS"]),
    ("UA", &["ORD", "DEN", "IAH", "EWR", "SFO", "LAX", "IAD", "GUM"]),
    ("WN", &["DAL", "HOU", "LAS", "PHX", "DEN", "MDW", "BWI", "OAK", "LAX", "SAN"]),
    ("B6", &["JFK", "BOS", "FLL", "MCO", "LAX", "LGB", "SJU", "EWR", "TPA"]),
    ("AS", &["SEA", "PDX", "SFO", "LAX", "ANC", "SAN"]),
    ("NK", &["FLL", "LAS", "MCO", "ORD", "DFW", "ATL", "LAX"]),
    ("F9", &["DEN", "LAS", "ORD", "MCO", "PHX", "ATL"]),
    ("HA", &["HNL", "OGG", "LIH", "KOA", "LAX", "SFO", "SEA"]),
    ("AC", &["YYZ", "YVR", "YUL", "YYC", "YEG"]),
    ("WS", &["YYC", "YYZ", "YVR", "YWG", "YEG"]),
    ("BA", &["LHR", "LGW", "JFK", "BOS", "MIA"]),
    ("LH", &["FRA", "MUC", "JFK", "ORD", "LAX"]),
    ("AF", &["CDG", "ORY", "JFK", "LAX", "MIA"]),
    ("KL", &["AMS", "JFK", "ATL", "LAX", "SFO"]),
    ("VS", &["LHR", "MAN", "JFK", "LAX", "SFO", "BOS", "MIA", "ATL"]),
    ("EK", &["DXB", "JFK", "LAX", "SFO", "ORD", "BOS", "IAD", "IAH", "DFW", "SEA", "MIA"]),
    ("EY", &["AUH", "JFK", "ORD", "LAX", "IAD"]),
    ("QR", &["DOH", "JFK", "ORD", "LAX", "IAH", "MIA", "ATL", "BOS", "DFW", "IAD", "PHL", "SEA"]),
    ("TK", &["IST", "JFK", "ORD", "LAX", "SFO", "MIA", "IAH", "IAD", "ATL", "BOS"]),
    ("CX", &["HKG", "JFK", "LAX", "SFO", "ORD", "BOS"]),
    ("SQ", &["SIN", "JFK", "LAX", "SFO", "IAH", "EWR", "SEA"]),
    ("JL", &["NRT", "HND", "JFK", "LAX", "SFO", "ORD", "DFW", "BOS", "SEA"]),
    ("NH", &["NRT", "HND", "JFK", "LAX", "SFO", "ORD", "IAH", "IAD", "SEA"]),
    ("KE", &["ICN", "JFK", "LAX", "SFO", "ATL", "IAD", "ORD", "SEA", "DFW", "LAS"]),
    ("QF", &["SYD", "MEL", "BNE", "LAX", "SFO", "DFW", "JFK"]),
];

/// Airports served by nearly every large carrier.
pub const MAJOR_AIRPORTS: &[&str] = &[
    "JFK", "LAX", "ORD", "DFW", "DEN", "SFO", "SEA", "ATL", "MIA", "BOS", "EWR", "IAD", "IAH",
    "PHX", "LAS", "MCO", "CLT", "MSP", "DTW", "PHL", "LHR", "CDG", "FRA", "AMS", "DXB", "SIN",
    "HKG", "NRT", "ICN", "SYD",
];

/// How plausible it is that an airline flies to an airport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AirportAffinity {
    /// No data either way.
    Unknown,
    /// A major airport most carriers serve.
    Served,
    /// A hub or focus city of the airline.
    Hub,
}

/// Rates `airport` for the airline with designator `airline_code`.
pub fn airport_affinity(airline_code: &str, airport: &str) -> AirportAffinity {
    let hubs = AIRLINE_HUBS
        .iter()
        .find(|(code, _)| code.eq_ignore_ascii_case(airline_code))
        .map(|(_, hubs)| *hubs)
        .unwrap_or_default();
    if hubs.iter().any(|hub| hub.eq_ignore_ascii_case(airport)) {
        AirportAffinity::Hub
    } else if MAJOR_AIRPORTS.iter().any(|major| major.eq_ignore_ascii_case(airport)) {
        AirportAffinity::Served
    } else {
        AirportAffinity::Unknown
    }
}

/// The airline has a hub list to check routes against.
pub fn has_hub_data(airline_code: &str) -> bool {
    AIRLINE_HUBS
        .iter()
        .any(|(code, _)| code.eq_ignore_ascii_case(airline_code))
}

/// Looks up the airline name for a designator.
pub fn airline_for_code(code: &str) -> Option<&'static str> {
    AIRLINE_CODES
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(code))
        .map(|(_, name)| *name)
}

pub fn is_airline_code(code: &str) -> bool {
    airline_for_code(code).is_some()
}

/// Maps an airline name (any known variation) to its designator.
pub fn code_for_airline_name(name: &str) -> Option<&'static str> {
    let name = name.trim().to_lowercase();
    AIRLINE_NAME_VARIATIONS
        .iter()
        .find(|(variation, _)| *variation == name)
        .map(|(_, code)| *code)
        .or_else(|| {
            AIRLINE_CODES
                .iter()
                .find(|(_, n)| n.to_lowercase() == name)
                .map(|(c, _)| *c)
        })
}

/// A single word that names an airline on its own ("UNITED", "Alaska").
pub fn is_airline_name(word: &str) -> bool {
    let word = word.trim();
    if word.is_empty() {
        return false;
    }
    code_for_airline_name(word).is_some()
        || AIRLINE_CODES.iter().any(|(_, name)| {
            name.split_whitespace()
                .next()
                .is_some_and(|first| first.eq_ignore_ascii_case(word))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_airline_for_code() {
        assert_eq!(airline_for_code("B6"), Some("JetBlue"));
        assert_eq!(airline_for_code("dl"), Some("Delta"));
        assert_eq!(airline_for_code("ZZ"), None);
    }

    #[test]
    fn test_code_for_airline_name() {
        assert_eq!(code_for_airline_name("American Airlines"), Some("AA"));
        assert_eq!(code_for_airline_name(" jetBlue "), Some("B6"));
        assert_eq!(code_for_airline_name("Copa Airlines"), Some("CM"));
        assert_eq!(code_for_airline_name("Imaginary Air"), None);
    }

    #[test]
    fn test_is_airline_name() {
        assert!(is_airline_name("UNITED"));
        assert!(is_airline_name("Alaska"));
        assert!(is_airline_name("qantas"));
        assert!(!is_airline_name("EJZOSU"));
        assert!(!is_airline_name(""));
    }

    #[test]
    fn test_airport_affinity() {
        assert_eq!(airport_affinity("B6", "BOS"), AirportAffinity::Hub);
        assert_eq!(airport_affinity("b6", "LAS"), AirportAffinity::Served);
        assert_eq!(airport_affinity("B6", "FAI"), AirportAffinity::Unknown);
        assert_eq!(airport_affinity("AS", "ANC"), AirportAffinity::Hub);
        assert_eq!(airport_affinity("ZZ", "JFK"), AirportAffinity::Served);
        assert!(has_hub_data("QF"));
        assert!(!has_hub_data("ZZ"));
    }

    #[test]
    fn test_hub_designators_are_known() {
        for (code, _) in AIRLINE_HUBS {
            assert!(is_airline_code(code), "{} has hubs but no name", code);
        }
    }

    #[test]
    fn test_codes_are_unique() {
        let mut codes: Vec<_> = AIRLINE_CODES.iter().map(|(c, _)| *c).collect();
        codes.sort_unstable();
        let before = codes.len();
        codes.dedup();
        assert_eq!(before, codes.len());
    }
}
