use std::fmt;

use serde::{Deserialize, Serialize};

use super::academic::{ClassSectionResponse, GenericResponse, TermResponse};
use super::user::StudentResponse;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnrollmentStatus {
    Pending,
    Approved,
    Rejected,
}

impl EnrollmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrollmentStatus::Pending => "PENDING",
            EnrollmentStatus::Approved => "APPROVED",
            EnrollmentStatus::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EnrollmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(EnrollmentStatus::Pending),
            "APPROVED" => Ok(EnrollmentStatus::Approved),
            "REJECTED" => Ok(EnrollmentStatus::Rejected),
            other => Err(format!("Unknown enrollment status: {}", other)),
        }
    }
}

/// Body of `PATCH /enrollment/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateEnrollmentStatus {
    pub status: EnrollmentStatus,
    pub enrollment_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollmentResponse {
    pub status: EnrollmentStatus,
    pub student: StudentResponse,
    pub class_section: ClassSectionResponse,
    pub term: TermResponse,
    #[serde(default)]
    pub request_log: Option<GenericResponse>,
}

/// Registrar-side filter for `GET /enrollment/filter`. Unset ids are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrollmentFilter {
    pub department_id: Option<String>,
    pub program_id: Option<String>,
    pub class_section_id: Option<String>,
    pub term_id: Option<String>,
}

impl EnrollmentFilter {
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        [
            ("department_id", &self.department_id),
            ("program_id", &self.program_id),
            ("class_section_id", &self.class_section_id),
            ("term_id", &self.term_id),
        ]
        .into_iter()
        .filter_map(|(key, value)| {
            value
                .as_ref()
                .filter(|v| !v.is_empty())
                .map(|v| (key.to_string(), v.clone()))
        })
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.query_pairs().is_empty()
    }
}
