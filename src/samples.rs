//! Built-in library of sample healthcare claims.

use serde::Serialize;

/// A canned claim used for demos and smoke tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SampleClaim {
    pub name: &'static str,
    /// Whether the scenario describes fraud. Only used for the badge.
    pub is_fraud: bool,
    pub text: &'static str,
}

impl SampleClaim {
    pub fn badge(&self) -> &'static str {
        if self.is_fraud {
            "🚨 FRAUD"
        } else {
            "✅ LEGITIMATE"
        }
    }

    /// First `max_chars` characters, with `...` when cut.
    pub fn preview(&self, max_chars: usize) -> String {
        match self.text.char_indices().nth(max_chars) {
            Some((idx, _)) => format!("{}...", &self.text[..idx]),
            None => self.text.to_string(),
        }
    }
}

pub const SAMPLE_CLAIMS: [SampleClaim; 6] = [
    SampleClaim {
        name: "Legitimate Office Visit",
        is_fraud: false,
        text: "Medical claim #CLM-2024-001
Member ID: MEM-456789
Provider: Dr. Sarah Chen, Internal Medicine
Date of Service: 2024-12-10
Billed Amount: $185
Description: Annual wellness visit for established patient. Preventive care exam with routine blood work. Member has consistent visit history with this in-network provider. Diagnosis codes and procedure codes align correctly. Standard reimbursement request.",
    },
    SampleClaim {
        name: "Upcoding Scheme",
        is_fraud: true,
        text: "Medical claim #CLM-2024-045
Member ID: MEM-123456
Provider: QuickCare Medical Center (Out-of-Network)
Date of Service: 2024-12-12
Billed Amount: $47,500
Description: Provider billing for complex surgical procedures but documentation shows only routine office visit. Four similar high-complexity claims for same patient in 6 months. Diagnosis codes (routine checkup) don't match procedure codes (major surgery). Provider has pattern of upcoding across multiple patients. Medical necessity not established.",
    },
    SampleClaim {
        name: "Phantom Billing",
        is_fraud: true,
        text: "Medical claim #CLM-2024-089
Member ID: MEM-789012
Provider: Metro Health Services
Date of Service: 2024-12-08
Billed Amount: $12,000
Description: Provider billing for services member never received. Member confirmed they were out of state on date of service. Provider submitting claims for same patient on multiple dates when patient was traveling. Pattern of billing for non-existent appointments. Provider address flagged as residential location.",
    },
    SampleClaim {
        name: "Prescription Drug Diversion",
        is_fraud: true,
        text: "Pharmacy claim #CLM-2024-112
Member ID: MEM-345678
Provider: Valley Pharmacy (Out-of-Network)
Date of Service: 2024-12-05
Billed Amount: $8,500
Description: Multiple high-cost controlled substance prescriptions filled at out-of-network pharmacy far from member's home. Same medications refilled early repeatedly. Prescriber has no prior relationship with patient. Pharmacy has pattern of early refills and doctor shopping indicators. Member has 8 different prescribers in 3 months.",
    },
    SampleClaim {
        name: "Legitimate Preventive Care",
        is_fraud: false,
        text: "Medical claim #CLM-2024-067
Member ID: MEM-234567
Provider: Healthy Smiles Dental (In-Network)
Date of Service: 2024-12-11
Billed Amount: $0 (Preventive - 100% coverage)
Description: Routine dental cleaning and examination. Annual preventive care for established patient. No unusual procedures. Diagnosis codes normal. Member has regular 6-month dental visit history with this provider. Claim within expected cost range for preventive services.",
    },
    SampleClaim {
        name: "Unbundling Fraud",
        is_fraud: true,
        text: "Medical claim #CLM-2024-134
Member ID: MEM-567890
Provider: Advanced Diagnostics Lab
Date of Service: 2024-12-13
Billed Amount: $15,000
Description: Lab billing each component test separately instead of bundled panel code. Same blood draw billed 15 times. Procedures that should be billed as single comprehensive metabolic panel unbundled into individual tests. Significantly inflated reimbursement. Provider has pattern of unbundling across multiple claims.",
    },
];

/// Look up a sample by name, ignoring ASCII case.
pub fn find_sample(name: &str) -> Option<&'static SampleClaim> {
    SAMPLE_CLAIMS
        .iter()
        .find(|s| s.name.eq_ignore_ascii_case(name.trim()))
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_sample() {
        let sample = find_sample("legitimate office visit").unwrap();
        assert!(!sample.is_fraud);
        assert!(sample.text.contains("CLM-2024-001"));
        assert!(find_sample("Custom").is_none());
    }

    #[test]
    fn test_fraud_labels() {
        let fraud: Vec<_> = SAMPLE_CLAIMS
            .iter()
            .filter(|s| s.is_fraud)
            .map(|s| s.name)
            .collect();
        assert_eq!(
            fraud,
            vec![
                "Upcoding Scheme",
                "Phantom Billing",
                "Prescription Drug Diversion",
                "Unbundling Fraud"
            ]
        );
    }

    #[test]
    fn test_preview() {
        let sample = &SAMPLE_CLAIMS[0];
        let preview = sample.preview(20);
        assert_eq!(preview, "Medical claim #CLM-2...");
        assert_eq!(sample.preview(10_000), sample.text);
        assert_eq!(word_count("a  b\nc"), 3);
    }
}
