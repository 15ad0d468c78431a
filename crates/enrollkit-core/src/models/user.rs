use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserRole {
    Administrator,
    Registrar,
    Dean,
    #[serde(rename = "Program Chair")]
    ProgramChair,
    Professor,
    Student,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Administrator => "Administrator",
            UserRole::Registrar => "Registrar",
            UserRole::Dean => "Dean",
            UserRole::ProgramChair => "Program Chair",
            UserRole::Professor => "Professor",
            UserRole::Student => "Student",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserGender {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserStatus {
    Approved,
    Rejected,
    Pending,
}

/// Body of `POST /user/registration`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationRequest {
    pub email: String,
    pub cellphone_number: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,

    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    pub gender: UserGender,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complete_address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub created_at: DateTime<Utc>,

    pub first_name: String,
    #[serde(default)]
    pub middle_name: Option<String>,
    pub last_name: String,
    #[serde(default)]
    pub suffix: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
    pub gender: UserGender,
    #[serde(default)]
    pub complete_address: Option<String>,

    pub email: String,
    pub cellphone_number: String,
    #[serde(default)]
    pub role: Option<UserRole>,
    #[serde(default)]
    pub is_active: bool,
}

impl UserResponse {
    /// Name formatted for display: "First M. Last Suffix"
    pub fn display_name(&self) -> String {
        let mut name = self.first_name.clone();
        if let Some(initial) = self
            .middle_name
            .as_deref()
            .and_then(|m| m.trim().chars().next())
        {
            name.push_str(&format!(" {}.", initial));
        }
        name.push(' ');
        name.push_str(&self.last_name);
        if let Some(suffix) = self.suffix.as_deref().filter(|s| !s.is_empty()) {
            name.push(' ');
            name.push_str(suffix);
        }
        name
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub university_code: String,
    pub status: UserStatus,
    #[serde(default)]
    pub last_school_attended: Option<String>,
    #[serde(default)]
    pub program_enrolled_date: Option<NaiveDate>,
    pub year_level: u32,
}

/// Dean and program chair profiles. Role-specific fields are passed through.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const STUDENT_JSON: &str = r#"{
        "id": "5b0c",
        "created_at": "2026-01-15T09:29:00Z",
        "first_name": "Maria",
        "middle_name": "Santos",
        "last_name": "Reyes",
        "suffix": null,
        "age": 19,
        "gender": "Female",
        "complete_address": "Malabon City",
        "email": "maria@school.edu",
        "cellphone_number": "09171234567",
        "role": "Student",
        "is_active": true,
        "university_code": "2026-0001",
        "status": "Pending",
        "last_school_attended": null,
        "program_enrolled_date": "2026-01-10",
        "year_level": 1
    }"#;

    #[test]
    fn test_parse_student_response() {
        let student: StudentResponse =
            serde_json::from_str(STUDENT_JSON).expect("Failed to parse student test JSON");
        assert_eq!(student.user.role, Some(UserRole::Student));
        assert_eq!(student.status, UserStatus::Pending);
        assert_eq!(student.year_level, 1);
        assert_eq!(student.user.display_name(), "Maria S. Reyes");
    }

    #[test]
    fn test_program_chair_role_wire_name() {
        let json = serde_json::to_string(&UserRole::ProgramChair).unwrap();
        assert_eq!(json, "\"Program Chair\"");
        let role: UserRole = serde_json::from_str("\"Program Chair\"").unwrap();
        assert_eq!(role, UserRole::ProgramChair);
    }

    #[test]
    fn test_employee_keeps_extra_fields() {
        let json = r#"{
            "id": "d1", "created_at": "2026-01-24T11:26:00Z",
            "first_name": "Jose", "last_name": "Cruz", "gender": "Male",
            "email": "dean@school.edu", "cellphone_number": "09170000000",
            "role": "Dean", "is_active": true,
            "department": {"name": "College of Engineering"}
        }"#;
        let dean: EmployeeResponse = serde_json::from_str(json).unwrap();
        assert_eq!(dean.user.role, Some(UserRole::Dean));
        assert!(dean.extra.contains_key("department"));
        assert_eq!(dean.user.display_name(), "Jose Cruz");
    }

    #[test]
    fn test_registration_request_omits_absent_fields() {
        let request = RegistrationRequest {
            email: "a@b.co".to_string(),
            cellphone_number: "09171234567".to_string(),
            password: "password123".to_string(),
            role: None,
            first_name: "Ana".to_string(),
            middle_name: None,
            last_name: "Lim".to_string(),
            suffix: None,
            age: None,
            gender: UserGender::Female,
            complete_address: None,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("role").is_none());
        assert!(value.get("middle_name").is_none());
        assert_eq!(value["gender"], "Female");
    }
}
