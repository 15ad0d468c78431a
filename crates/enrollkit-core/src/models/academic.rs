use std::fmt;

use serde::{Deserialize, Serialize};

use super::structure::CourseOfferingResponse;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SemesterPeriod {
    First,
    Second,
    Summer,
}

impl SemesterPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            SemesterPeriod::First => "FIRST",
            SemesterPeriod::Second => "SECOND",
            SemesterPeriod::Summer => "SUMMER",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TermStatus {
    Draft,
    Open,
    Closed,
    Archived,
}

impl TermStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TermStatus::Draft => "DRAFT",
            TermStatus::Open => "OPEN",
            TermStatus::Closed => "CLOSED",
            TermStatus::Archived => "ARCHIVED",
        }
    }
}

impl fmt::Display for TermStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TermStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DRAFT" => Ok(TermStatus::Draft),
            "OPEN" => Ok(TermStatus::Open),
            "CLOSED" => Ok(TermStatus::Closed),
            "ARCHIVED" => Ok(TermStatus::Archived),
            other => Err(format!("Unknown term status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClassSectionStatus {
    Open,
    Close,
    Cancelled,
}

/// Message envelope the server attaches to mutating responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenericResponse {
    pub message: String,
    #[serde(default)]
    pub status_code: Option<u16>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermResponse {
    pub id: String,
    pub created_at: String,
    pub academic_year_start: i32,
    pub academic_year_end: i32,
    pub enrollment_start: String,
    pub enrollment_end: String,
    pub semester_period: SemesterPeriod,
    pub status: TermStatus,
    #[serde(default)]
    pub request_log: Option<GenericResponse>,
}

/// One entry of `POST /academic-structure/register-term`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermRequest {
    pub academic_year_start: i32,
    pub academic_year_end: i32,
    pub enrollment_start: String,
    pub enrollment_end: String,
    pub semester_period: SemesterPeriod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TermStatus>,
}

impl TermResponse {
    /// e.g. "AY 2026-2027 FIRST"
    pub fn label(&self) -> String {
        format!(
            "AY {}-{} {}",
            self.academic_year_start,
            self.academic_year_end,
            self.semester_period.as_str()
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassSectionResponse {
    pub id: String,
    pub created_at: String,
    pub section_code: String,
    pub student_capacity: u32,
    pub current_student_cnt: u32,
    pub status: ClassSectionStatus,
    /// Course offering, curriculum and course details, passed through as-is.
    pub course_offering_details: serde_json::Value,
    #[serde(default)]
    pub request_log: Option<GenericResponse>,
}

/// One entry of `POST /academic-structure/register/class-section`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassSectionRequest {
    pub course_offering_id: String,
    pub section_code: String,
    pub student_capacity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ClassSectionStatus>,
}

impl ClassSectionResponse {
    /// The nested course offering, when the server sent the full shape.
    pub fn course_offering(&self) -> Option<CourseOfferingResponse> {
        serde_json::from_value(self.course_offering_details.clone()).ok()
    }

    pub fn seats_left(&self) -> u32 {
        self.student_capacity.saturating_sub(self.current_student_cnt)
    }

    pub fn is_full(&self) -> bool {
        self.seats_left() == 0
    }
}
