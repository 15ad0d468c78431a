//! Data models for the enrollment API.
//!
//! These are pass-through DTOs; business rules live on the server.
//!
//! - `UserRole`, `UserGender`, `UserStatus` and user/student/employee profiles
//! - `RegistrationRequest`: body of the unauthenticated registration call
//! - Terms and class sections: `TermResponse`, `ClassSectionResponse`
//! - Campus and curriculum structure in [`structure`]
//! - Enrollment: `EnrollmentResponse`, `UpdateEnrollmentStatus`, `EnrollmentFilter`

pub mod academic;
pub mod enrollment;
pub mod structure;
pub mod user;

pub use academic::{
    ClassSectionRequest, ClassSectionResponse, ClassSectionStatus, GenericResponse,
    SemesterPeriod, TermRequest, TermResponse, TermStatus,
};
pub use enrollment::{EnrollmentFilter, EnrollmentResponse, EnrollmentStatus, UpdateEnrollmentStatus};
pub use structure::{
    BuildingRequest, BuildingResponse, ClassScheduleRequest, ClassScheduleResponse,
    CourseOfferingRequest, CourseOfferingResponse, CourseOfferingStatus, CourseRequest,
    CourseResponse, CurriculumCourseRequest, CurriculumCourseResponse, CurriculumRequest,
    CurriculumResponse, CurriculumStatus, DepartmentRequest, DepartmentResponse,
    ProfessorAssignmentResponse, ProfessorClassSectionRequest, ProfessorStatus, ProgramRequest,
    ProgramResponse, RoomRequest, RoomResponse,
};
pub use user::{
    EmployeeResponse, RegistrationRequest, StudentResponse, UserGender, UserResponse, UserRole,
    UserStatus,
};
