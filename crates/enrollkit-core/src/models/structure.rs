//! Campus and curriculum structure: buildings, rooms, departments, programs,
//! curricula, courses, course offerings, professor assignments and class
//! schedules.

use std::fmt;

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use super::academic::{ClassSectionResponse, GenericResponse, TermResponse};
use super::user::UserResponse;

// ============================================================================
// Status enums
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CurriculumStatus {
    Draft,
    Active,
    Retired,
}

impl CurriculumStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CurriculumStatus::Draft => "Draft",
            CurriculumStatus::Active => "Active",
            CurriculumStatus::Retired => "Retired",
        }
    }
}

impl fmt::Display for CurriculumStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CurriculumStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(CurriculumStatus::Draft),
            "active" => Ok(CurriculumStatus::Active),
            "retired" => Ok(CurriculumStatus::Retired),
            other => Err(format!("Unknown curriculum status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CourseOfferingStatus {
    Pending,
    Approved,
    Cancelled,
}

impl CourseOfferingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CourseOfferingStatus::Pending => "PENDING",
            CourseOfferingStatus::Approved => "APPROVED",
            CourseOfferingStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for CourseOfferingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CourseOfferingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(CourseOfferingStatus::Pending),
            "APPROVED" => Ok(CourseOfferingStatus::Approved),
            "CANCELLED" => Ok(CourseOfferingStatus::Cancelled),
            other => Err(format!("Unknown course offering status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProfessorStatus {
    Active,
    NotActive,
    Suspended,
    OnLeave,
}

// ============================================================================
// Locations
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildingRequest {
    pub name: String,
    pub room_capacity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildingResponse {
    pub id: String,
    pub created_at: String,
    pub name: String,
    pub room_capacity: u32,
    #[serde(default)]
    pub request_log: Option<GenericResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_code: Option<String>,
    pub building_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomResponse {
    pub id: String,
    pub created_at: String,
    #[serde(default)]
    pub room_code: Option<String>,
    pub building_details: BuildingResponse,
    #[serde(default)]
    pub request_log: Option<GenericResponse>,
}

// ============================================================================
// Departments and programs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepartmentRequest {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepartmentResponse {
    pub id: String,
    pub created_at: String,
    pub title: String,
    #[serde(default)]
    pub department_code: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub request_log: Option<GenericResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramRequest {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramResponse {
    pub id: String,
    pub created_at: String,
    pub title: String,
    #[serde(default)]
    pub program_code: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub department_details: Option<DepartmentResponse>,
    #[serde(default)]
    pub request_log: Option<GenericResponse>,
}

// ============================================================================
// Curricula and courses
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurriculumRequest {
    pub title: String,
    pub effective_from: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_to: Option<i32>,
    pub status: CurriculumStatus,
    pub program_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurriculumResponse {
    pub id: String,
    pub created_at: String,
    pub title: String,
    pub effective_from: i32,
    #[serde(default)]
    pub effective_to: Option<i32>,
    pub status: CurriculumStatus,
    #[serde(default)]
    pub program_details: Option<ProgramResponse>,
    #[serde(default)]
    pub request_log: Option<GenericResponse>,
}

impl CurriculumResponse {
    /// e.g. "2024-2028", or "2024-" while open-ended
    pub fn effective_years(&self) -> String {
        match self.effective_to {
            Some(to) => format!("{}-{}", self.effective_from, to),
            None => format!("{}-", self.effective_from),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseRequest {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_code: Option<String>,
    pub units: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseResponse {
    pub id: String,
    pub created_at: String,
    pub title: String,
    #[serde(default)]
    pub course_code: Option<String>,
    pub units: u32,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub request_log: Option<GenericResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurriculumCourseRequest {
    pub year_level: u32,
    pub semester: u32,
    pub is_required: bool,
    pub curriculum_id: String,
    pub course_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurriculumCourseResponse {
    pub id: String,
    pub created_at: String,
    pub is_required: bool,
    pub curriculum_details: CurriculumResponse,
    pub course_details: CourseResponse,
    #[serde(default)]
    pub request_log: Option<GenericResponse>,
}

// ============================================================================
// Offerings, professor assignments and schedules
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseOfferingRequest {
    pub term_id: String,
    pub curriculum_course_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<CourseOfferingStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseOfferingResponse {
    pub id: String,
    pub created_at: String,
    pub term_details: TermResponse,
    pub curriculum_course_details: CurriculumCourseResponse,
    pub status: CourseOfferingStatus,
    #[serde(default)]
    pub request_log: Option<GenericResponse>,
}

impl CourseOfferingResponse {
    pub fn course(&self) -> &CourseResponse {
        &self.curriculum_course_details.course_details
    }
}

/// Body of `POST /academic-structure/assign/professor/class-section`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfessorClassSectionRequest {
    pub prof_id: String,
    pub class_section_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfessorAssignmentResponse {
    pub id: String,
    pub created_at: String,
    pub professor_details: UserResponse,
    pub professor_status: ProfessorStatus,
    pub university_code: String,
    pub course_offering_details: CourseOfferingResponse,
    pub class_section_details: ClassSectionResponse,
    #[serde(default)]
    pub request_log: Option<GenericResponse>,
}

/// Body of `POST /academic-structure/assign/schedule/class-section`.
/// `day_of_week` runs 1 (Monday) to 7 (Sunday).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassScheduleRequest {
    pub class_section_id: String,
    pub room_id: String,
    pub day_of_week: u8,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassScheduleResponse {
    pub id: String,
    pub created_at: String,
    pub day_of_week: u8,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub class_section_details: ClassSectionResponse,
    pub room_details: RoomResponse,
    #[serde(default)]
    pub request_log: Option<GenericResponse>,
}

impl ClassScheduleResponse {
    pub fn weekday(&self) -> Option<Weekday> {
        weekday_from_number(self.day_of_week)
    }
}

/// Map the server's 1 = Monday .. 7 = Sunday numbering.
pub fn weekday_from_number(day: u8) -> Option<Weekday> {
    match day {
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        7 => Some(Weekday::Sun),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curriculum_status_wire_form() {
        let json = serde_json::to_string(&CurriculumStatus::Active).unwrap();
        assert_eq!(json, "\"Active\"");
        assert_eq!("RETIRED".parse::<CurriculumStatus>(), Ok(CurriculumStatus::Retired));
    }

    #[test]
    fn test_professor_status_wire_form() {
        let status: ProfessorStatus = serde_json::from_str("\"ON_LEAVE\"").unwrap();
        assert_eq!(status, ProfessorStatus::OnLeave);
        let status: ProfessorStatus = serde_json::from_str("\"NOT_ACTIVE\"").unwrap();
        assert_eq!(status, ProfessorStatus::NotActive);
    }

    #[test]
    fn test_weekday_numbering() {
        assert_eq!(weekday_from_number(1), Some(Weekday::Mon));
        assert_eq!(weekday_from_number(7), Some(Weekday::Sun));
        assert_eq!(weekday_from_number(0), None);
        assert_eq!(weekday_from_number(8), None);
    }

    #[test]
    fn test_schedule_request_times() {
        let request = ClassScheduleRequest {
            class_section_id: "cs1".to_string(),
            room_id: "r1".to_string(),
            day_of_week: 3,
            start_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["start_time"], "08:00:00");
        assert_eq!(value["end_time"], "09:30:00");
    }

    #[test]
    fn test_curriculum_effective_years() {
        let json = r#"{
            "id": "c1", "created_at": "2026-01-18T10:51:00",
            "title": "BSCS 2024", "effective_from": 2024, "status": "Draft"
        }"#;
        let curriculum: CurriculumResponse = serde_json::from_str(json).unwrap();
        assert_eq!(curriculum.effective_years(), "2024-");
        assert!(curriculum.program_details.is_none());
    }
}
