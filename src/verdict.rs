// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Verdict report returned by the analysis service, and its shape validation

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{ClaimError, Result};

/// Final verdict for a claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Valid,
    Invalid,
    Suspicious,
}

impl Verdict {
    pub const ALL: [Verdict; 3] = [Verdict::Valid, Verdict::Invalid, Verdict::Suspicious];

    /// Wire name, as used in the response schema enum
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Valid => "Valid",
            Verdict::Invalid => "Invalid",
            Verdict::Suspicious => "Suspicious",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Verdict::Valid => "Claim Valid",
            Verdict::Invalid => "Claim Invalid",
            Verdict::Suspicious => "Claim Suspicious",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Policy rule checks evaluated by the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyChecks {
    pub policy_active: bool,
    pub incident_covered: bool,
    pub time_limit_ok: bool,
}

impl PolicyChecks {
    /// The three checks with their display labels, in display order
    pub fn items(&self) -> [(&'static str, bool); 3] {
        [
            ("Policy is active and in good standing", self.policy_active),
            ("Incident type is covered by policy", self.incident_covered),
            ("Claim filed within allowed time limit", self.time_limit_ok),
        ]
    }

    pub fn all_passed(&self) -> bool {
        self.policy_active && self.incident_covered && self.time_limit_ok
    }
}

/// Structured result of a claim analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerdictReport {
    pub final_verdict: Verdict,
    /// 0 (clean) to 100 (almost certainly fraudulent)
    pub fraud_score: f64,
    pub summary: String,
    /// Currency string, `$0` when nothing is payable
    pub estimated_payout: String,
    pub policy_checks: PolicyChecks,
}

/// Colour class of a fraud score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FraudBand {
    Low,
    Elevated,
    High,
}

impl FraudBand {
    pub fn from_score(score: f64) -> Self {
        if score > 70.0 {
            FraudBand::High
        } else if score > 40.0 {
            FraudBand::Elevated
        } else {
            FraudBand::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FraudBand::Low => "low",
            FraudBand::Elevated => "elevated",
            FraudBand::High => "high",
        }
    }
}

impl VerdictReport {
    /// Parse and validate the text the model returned.
    ///
    /// Any deviation from the schema is terminal; there is no partial report.
    pub fn from_model_text(text: &str) -> Result<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ClaimError::EmptyResponse);
        }

        let value: serde_json::Value = serde_json::from_str(text).map_err(|e| {
            ClaimError::MalformedResponse(format!("Failed to parse AI response as JSON: {}", e))
        })?;

        let report: VerdictReport = serde_json::from_value(value).map_err(|e| {
            ClaimError::MalformedResponse(format!(
                "AI response is malformed or missing required fields: {}",
                e
            ))
        })?;

        report.validate()?;
        Ok(report)
    }

    /// Range checks serde cannot express
    pub fn validate(&self) -> Result<()> {
        if !self.fraud_score.is_finite() || !(0.0..=100.0).contains(&self.fraud_score) {
            return Err(ClaimError::MalformedResponse(format!(
                "fraudScore {} is outside 0-100",
                self.fraud_score
            )));
        }
        Ok(())
    }

    pub fn fraud_band(&self) -> FraudBand {
        FraudBand::from_score(self.fraud_score)
    }

    /// Score as shown to the user
    pub fn display_score(&self) -> u32 {
        self.fraud_score.round() as u32
    }
}

/// JSON schema the model response must conform to
pub fn response_schema() -> serde_json::Value {
    let verdicts: Vec<&str> = Verdict::ALL.iter().map(Verdict::as_str).collect();

    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "finalVerdict": {
                "type": "STRING",
                "description": "The final verdict for the claim.",
                "enum": verdicts,
            },
            "fraudScore": {
                "type": "NUMBER",
                "description": "Fraud score from 0 to 100.",
            },
            "summary": {
                "type": "STRING",
                "description": "Summary of findings.",
            },
            "estimatedPayout": {
                "type": "STRING",
                "description": "Currency string or '$0'.",
            },
            "policyChecks": {
                "type": "OBJECT",
                "properties": {
                    "policyActive": { "type": "BOOLEAN" },
                    "incidentCovered": { "type": "BOOLEAN" },
                    "timeLimitOk": { "type": "BOOLEAN" },
                },
                "required": ["policyActive", "incidentCovered", "timeLimitOk"],
            },
        },
        "required": ["finalVerdict", "fraudScore", "summary", "estimatedPayout", "policyChecks"],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{
        "finalVerdict": "Suspicious",
        "fraudScore": 64.5,
        "summary": "Invoice date precedes the incident.",
        "estimatedPayout": "$1,250.00",
        "policyChecks": { "policyActive": true, "incidentCovered": true, "timeLimitOk": false }
    }"#;

    #[test]
    fn test_parses_valid_report() {
        let report = VerdictReport::from_model_text(VALID).unwrap();
        assert_eq!(report.final_verdict, Verdict::Suspicious);
        assert_eq!(report.display_score(), 65);
        assert_eq!(report.estimated_payout, "$1,250.00");
        assert!(!report.policy_checks.time_limit_ok);
        assert!(!report.policy_checks.all_passed());
        assert_eq!(report.fraud_band(), FraudBand::Elevated);
    }

    #[test]
    fn test_empty_text() {
        assert!(matches!(VerdictReport::from_model_text("  \n"), Err(ClaimError::EmptyResponse)));
    }

    #[test]
    fn test_not_json() {
        let err = VerdictReport::from_model_text("The claim looks valid.").unwrap_err();
        assert!(err.to_string().contains("Failed to parse AI response as JSON"));
    }

    #[test]
    fn test_missing_policy_checks() {
        let text = r#"{"finalVerdict":"Valid","fraudScore":3,"summary":"ok","estimatedPayout":"$10"}"#;
        let err = VerdictReport::from_model_text(text).unwrap_err();
        assert!(err.to_string().contains("missing required fields"));
    }

    #[test]
    fn test_unknown_verdict_rejected() {
        let text = VALID.replace("Suspicious", "Approved");
        assert!(matches!(
            VerdictReport::from_model_text(&text),
            Err(ClaimError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_score_as_string_rejected() {
        let text = VALID.replace("64.5", "\"64.5\"");
        assert!(matches!(
            VerdictReport::from_model_text(&text),
            Err(ClaimError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_score_out_of_range_rejected() {
        let text = VALID.replace("64.5", "120");
        let err = VerdictReport::from_model_text(&text).unwrap_err();
        assert!(err.to_string().contains("outside 0-100"));

        let text = VALID.replace("64.5", "-1");
        assert!(VerdictReport::from_model_text(&text).is_err());
    }

    #[test]
    fn test_band_boundaries() {
        assert_eq!(FraudBand::from_score(0.0), FraudBand::Low);
        assert_eq!(FraudBand::from_score(40.0), FraudBand::Low);
        assert_eq!(FraudBand::from_score(41.0), FraudBand::Elevated);
        assert_eq!(FraudBand::from_score(70.0), FraudBand::Elevated);
        assert_eq!(FraudBand::from_score(71.0), FraudBand::High);
        assert_eq!(FraudBand::from_score(100.0), FraudBand::High);
    }

    #[test]
    fn test_wire_names_round_trip_through_serde() {
        let report = VerdictReport::from_model_text(VALID).unwrap();
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["finalVerdict"], "Suspicious");
        assert_eq!(value["policyChecks"]["timeLimitOk"], false);
    }

    #[test]
    fn test_schema_lists_required_fields() {
        let schema = response_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(
            required,
            ["finalVerdict", "fraudScore", "summary", "estimatedPayout", "policyChecks"]
        );
        assert_eq!(schema["properties"]["finalVerdict"]["enum"][2], "Suspicious");
    }
}
