//! Target schemas and the aggregate extraction record.
//!
//! The `*List` wrappers and `InstitutionInfo` are the per-call response
//! shapes sent to the completion service (they derive `JsonSchema`); the
//! aggregate [`InstitutionProfile`] is assembled once per document by the
//! pipeline driver and is immutable downstream.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An academic program offered by a department.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct Program {
    pub name: String,
    #[serde(default)]
    pub degree_type: Option<String>,
    #[serde(default)]
    pub duration_years: Option<u32>,
    #[serde(default)]
    pub credit_hours: Option<u32>,
    #[serde(default)]
    pub eligibility_criteria: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub source_chunk_ids: Vec<String>,
}

/// An academic department and the programs it owns.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct Department {
    pub name: String,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub head_of_department: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub programs: Vec<Program>,
    #[serde(default)]
    pub source_chunk_ids: Vec<String>,
}

/// A campus facility.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct Facility {
    pub name: String,
    #[serde(default)]
    pub facility_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub capacity: Option<u32>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub source_chunk_ids: Vec<String>,
}

/// One fee line item.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FeeItem {
    #[serde(default)]
    pub program_name: Option<String>,
    #[serde(default)]
    pub fee_type: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub source_chunk_ids: Vec<String>,
}

fn default_currency() -> String {
    "PKR".to_string()
}

impl Default for FeeItem {
    fn default() -> Self {
        Self {
            program_name: None,
            fee_type: None,
            amount: None,
            frequency: None,
            currency: default_currency(),
            source_chunk_ids: Vec::new(),
        }
    }
}

/// Admission criteria, process and deadlines.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct AdmissionInfo {
    #[serde(default)]
    pub eligibility_criteria: Option<String>,
    #[serde(default)]
    pub application_process: Option<String>,
    #[serde(default)]
    pub test_requirements: Vec<String>,
    #[serde(default)]
    pub documents_required: Vec<String>,
    #[serde(default)]
    pub important_dates: Vec<String>,
    #[serde(default)]
    pub source_chunk_ids: Vec<String>,
}

impl AdmissionInfo {
    /// True when any field carries data.
    pub fn has_content(&self) -> bool {
        self.eligibility_criteria.as_deref().is_some_and(|s| !s.is_empty())
            || self.application_process.as_deref().is_some_and(|s| !s.is_empty())
            || !self.test_requirements.is_empty()
            || !self.documents_required.is_empty()
            || !self.important_dates.is_empty()
    }
}

/// Institution-level contact details.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ContactInfo {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub social_media: HashMap<String, String>,
}

/// Response shape for a departments batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct DepartmentList {
    #[serde(default)]
    pub items: Vec<Department>,
}

/// Response shape for a facilities batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct FacilityList {
    #[serde(default)]
    pub items: Vec<Facility>,
}

/// Response shape for a fees batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct FeeList {
    #[serde(default)]
    pub items: Vec<FeeItem>,
}

/// Response shape for the institution-info window call.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct InstitutionInfo {
    #[serde(default = "default_institution_name")]
    pub name: String,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

fn default_institution_name() -> String {
    "Unknown Institution".to_string()
}

impl Default for InstitutionInfo {
    fn default() -> Self {
        Self {
            name: default_institution_name(),
            short_name: None,
            location: None,
        }
    }
}

/// Run metadata attached to the aggregate record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionMetadata {
    pub extraction_timestamp: DateTime<Utc>,
    pub total_chunks_processed: usize,
    pub total_pages: u32,

    /// Heuristic per-section confidence, keyed by section name
    #[serde(default)]
    pub confidence_scores: HashMap<String, f64>,

    #[serde(default)]
    pub warnings: Vec<String>,
}

impl Default for ExtractionMetadata {
    fn default() -> Self {
        Self {
            extraction_timestamp: Utc::now(),
            total_chunks_processed: 0,
            total_pages: 0,
            confidence_scores: HashMap::new(),
            warnings: Vec::new(),
        }
    }
}

/// The aggregate extraction record for one institution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstitutionProfile {
    pub schema_version: String,
    pub institution_name: String,
    #[serde(default)]
    pub institution_short_name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,

    #[serde(default)]
    pub departments: Vec<Department>,
    #[serde(default)]
    pub facilities: Vec<Facility>,
    #[serde(default)]
    pub fee_structure: Vec<FeeItem>,
    #[serde(default)]
    pub admissions: Option<AdmissionInfo>,
    #[serde(default)]
    pub contact: Option<ContactInfo>,

    pub metadata: ExtractionMetadata,
}

/// Version tag stamped on every aggregate record.
pub const SCHEMA_VERSION: &str = "v1.0.0";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_deserialize_from_empty_object() {
        let info: InstitutionInfo = serde_json::from_str("{}").unwrap();
        assert_eq!(info.name, "Unknown Institution");

        let fees: FeeList = serde_json::from_str("{}").unwrap();
        assert!(fees.items.is_empty());

        let fee: FeeItem = serde_json::from_str("{}").unwrap();
        assert_eq!(fee.currency, "PKR");
    }

    #[test]
    fn test_admission_info_has_content() {
        assert!(!AdmissionInfo::default().has_content());

        let with_dates = AdmissionInfo {
            important_dates: vec!["Apply by 31 July".to_string()],
            ..Default::default()
        };
        assert!(with_dates.has_content());

        let with_empty_text = AdmissionInfo {
            eligibility_criteria: Some(String::new()),
            ..Default::default()
        };
        assert!(!with_empty_text.has_content());
    }

    #[test]
    fn test_department_list_schema_names_items() {
        let schema = serde_json::to_value(schemars::schema_for!(DepartmentList)).unwrap();
        let rendered = schema.to_string();
        assert!(rendered.contains("items"));
        assert!(rendered.contains("programs"));
    }
}
