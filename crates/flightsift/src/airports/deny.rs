//! Three-letter tokens that read as ordinary words or abbreviations.
//!
//! Several of these are real airport codes (SAT, MAN, DAY, ...). They are
//! still never accepted as bare codes; a route through San Antonio has to
//! come from a city name.

pub const DEFAULT_DENIED_AIRPORT_CODES: &[&str] = &[
    // Common English words
    "THE", "AND", "FOR", "YOU", "ARE", "NOT", "BUT", "ALL", "ANY", "CAN", "HAS", "HAD", "HER",
    "WAS", "ONE", "OUR", "OUT", "DAY", "GET", "HIM", "HIS", "HOW", "MAN", "NEW", "NOW", "OLD",
    "SEE", "TWO", "WAY", "WHO", "DID", "ITS", "LET", "PUT", "SAY", "SHE", "TOO", "USE", "YES",
    "OFF", "TOP", "WIN", "BIG", "END", "SET", "RUN", "ADD", "POP", "RAP", "LOS", "FLY", "AIR",
    "BAG", "CAR", "ROW", "SUN", "SAT", "PER", "VIA", "NON", "OWN", "YET", "FEW", "FAR",
    // Months and weekdays
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC", "MON",
    "TUE", "WED", "THU", "FRI",
    // Business and money abbreviations
    "LLC", "INC", "LTD", "USA", "USD", "EUR", "GBP", "CAD", "AUD", "MXN", "FEE", "TAX", "VAT",
    "APP", "FAQ", "VIP", "ATM", "CEO", "CIA", "FBI", "TSA", "TBD", "TBA", "PNR", "REF", "MIN",
    "MAX", "HRS", "AVE", "EST", "EDT", "PST", "PDT", "CST", "CDT", "MST", "MDT", "UTC", "GMT",
    "PDF", "URL", "WWW", "COM", "NET", "ORG", "API", "SMS",
];
