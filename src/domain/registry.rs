use crate::domain::model::Branch;

/// Fortiline Waterworks branches in Florida, grouped roughly south to north.
const FLORIDA_BRANCHES: &[(&str, &str)] = &[
    ("Miami", "14202 SW 142nd Ave, Miami, FL 33186"),
    ("Pompano Beach", "2250 N Andrews Ave, Pompano Beach, FL 33069"),
    ("Riviera Beach", "6759 White Dr, Riviera Beach, FL 33407"),
    ("Fort Pierce", "3904 Selvitz Rd, Fort Pierce, FL 34982"),
    // Gulf coast + central
    ("Fort Myers", "4810 Laredo Ave, Fort Myers, FL 33905"),
    ("Sarasota", "2074 47th Street, Sarasota, FL 34234"),
    ("Tampa", "1031 S 86th Street, Tampa, FL 33619"),
    ("Dundee", "225 W Frederick Ave, Dundee, FL 33838"),
    ("Kissimmee", "731 Duncan Ave, Kissimmee, FL 34744"),
    // Orlando area
    ("Apopka", "3636 Fudge Rd, Apopka, FL 32703"),
    ("Sanford", "2291 West Airport Blvd, Sanford, FL 32771"),
    ("Port Orange", "700 Oak Heights Ct, Port Orange, FL 32129"),
    ("Ocala", "3518 SW 13th St, Ocala, FL 34474"),
    // North Florida
    ("St Augustine", "3780 Deerpark Blvd, St Augustine, Fl 32033"),
    ("Jacksonville", "6982 Highway Ave, Jacksonville, FL 32254"),
    ("Lake City", "3847 US-441, Lake City, FL 32025"),
    // Panhandle
    ("Panama City", "1417 Transmitter Rd, Fl 32401"),
];

pub fn florida_branches() -> Vec<Branch> {
    FLORIDA_BRANCHES
        .iter()
        .map(|(name, address)| Branch::new(*name, *address))
        .collect()
}
