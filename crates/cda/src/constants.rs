//! Namespaces and coding systems referenced by CDA fragments.

use serde::Serialize;

/// Default namespace of CDA R2 documents.
pub const HL7_V3_NS: &str = "urn:hl7-org:v3";

/// XML Schema instance namespace, used for `xsi:type` on `value` elements.
pub const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Australian CDA extension namespace (specimen container and parent identifiers).
pub const EXT_NS: &str = "http://ns.electronichealth.net.au/Ci/Cda/Extensions/3.0";

/// Status code given to organizers whose owning result carries no overall status.
pub const DEFAULT_ORGANIZER_STATUS: &str = "completed";

/// Coding systems the terminology table draws its codes from, with their registered OIDs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum CodingSystem {
    /// NCTIS Data Components.
    Nctis,
    /// SNOMED CT-AU.
    Snomed,
    /// Logical Observation Identifiers Names and Codes.
    Loinc,
}

impl CodingSystem {
    pub const ALL: [CodingSystem; 3] = [CodingSystem::Nctis, CodingSystem::Snomed, CodingSystem::Loinc];

    /// Returns the OID written to `@codeSystem`.
    pub fn oid(self) -> &'static str {
        match self {
            CodingSystem::Nctis => "1.2.36.1.2001.1001.101",
            CodingSystem::Snomed => "2.16.840.1.113883.6.96",
            CodingSystem::Loinc => "2.16.840.1.113883.6.1",
        }
    }

    /// Returns the human-readable name written to `@codeSystemName`.
    pub fn name(self) -> &'static str {
        match self {
            CodingSystem::Nctis => "NCTIS Data Components",
            CodingSystem::Snomed => "SNOMED CT-AU",
            CodingSystem::Loinc => "LOINC",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_coding_system_oids_are_unique() {
        let oids: HashSet<_> = CodingSystem::ALL.iter().map(|s| s.oid()).collect();
        assert_eq!(oids.len(), CodingSystem::ALL.len());
    }
}
