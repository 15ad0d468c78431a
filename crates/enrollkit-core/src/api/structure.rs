//! Academic structure endpoints (`/academic-structure/...`).
//!
//! Registration calls are restricted to administrators and registrars on the
//! server; listing calls are also open to deans and program chairs. All of
//! them go through the secured pipeline.

use crate::models::{
    BuildingRequest, BuildingResponse, ClassScheduleRequest, ClassScheduleResponse,
    ClassSectionRequest, ClassSectionResponse, CourseOfferingRequest, CourseOfferingResponse,
    CourseOfferingStatus, CourseRequest, CourseResponse, CurriculumCourseRequest,
    CurriculumCourseResponse, CurriculumRequest, CurriculumResponse, CurriculumStatus,
    DepartmentRequest, DepartmentResponse, GenericResponse, ProfessorAssignmentResponse,
    ProfessorClassSectionRequest, ProgramRequest, ProgramResponse, RoomRequest, RoomResponse,
    TermRequest, TermResponse, TermStatus,
};

use super::{ApiClient, OutboundRequest, SessionError};

const BASE: &str = "/academic-structure";

impl ApiClient {
    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, SessionError>
    where
        B: serde::Serialize,
        T: serde::de::DeserializeOwned,
    {
        let request = OutboundRequest::post(format!("{}{}", BASE, path)).json(body)?;
        self.fetch(request).await
    }

    async fn patch_empty(&self, path: String) -> Result<GenericResponse, SessionError> {
        self.fetch(OutboundRequest::patch(format!("{}{}", BASE, path)))
            .await
    }

    async fn list<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, SessionError> {
        self.get(&format!("{}{}", BASE, path)).await
    }

    // ===== Buildings and rooms =====

    pub async fn register_building(
        &self,
        building: &BuildingRequest,
    ) -> Result<BuildingResponse, SessionError> {
        self.post_json("/register-building", building).await
    }

    pub async fn list_buildings(&self) -> Result<Vec<BuildingResponse>, SessionError> {
        self.list("/list-buildings").await
    }

    pub async fn register_rooms(&self, rooms: &[RoomRequest]) -> Result<Vec<RoomResponse>, SessionError> {
        self.post_json("/register-room", &rooms).await
    }

    pub async fn rooms_by_building(&self, building_id: &str) -> Result<Vec<RoomResponse>, SessionError> {
        self.list(&format!("/list-rooms/building/{}", building_id)).await
    }

    // ===== Departments and programs =====

    pub async fn register_department(
        &self,
        department: &DepartmentRequest,
    ) -> Result<DepartmentResponse, SessionError> {
        self.post_json("/register-department", department).await
    }

    pub async fn list_departments(&self) -> Result<Vec<DepartmentResponse>, SessionError> {
        self.list("/list-departments").await
    }

    /// House a department in a building (administrator only)
    pub async fn assign_department_building(
        &self,
        department_id: &str,
        building_id: &str,
    ) -> Result<GenericResponse, SessionError> {
        self.patch_empty(format!(
            "/department/{}/building/{}",
            department_id, building_id
        ))
        .await
    }

    pub async fn register_programs(
        &self,
        programs: &[ProgramRequest],
    ) -> Result<Vec<ProgramResponse>, SessionError> {
        self.post_json("/register-program", &programs).await
    }

    pub async fn programs_by_department(
        &self,
        department_id: &str,
    ) -> Result<Vec<ProgramResponse>, SessionError> {
        self.list(&format!("/list-programs/department/{}", department_id))
            .await
    }

    // ===== Curricula and courses =====

    pub async fn register_curriculum(
        &self,
        curriculum: &CurriculumRequest,
    ) -> Result<CurriculumResponse, SessionError> {
        self.post_json("/register-curriculum", curriculum).await
    }

    pub async fn curricula_by_program(
        &self,
        program_id: &str,
    ) -> Result<Vec<CurriculumResponse>, SessionError> {
        self.list(&format!("/list-curriculums/program/{}", program_id))
            .await
    }

    pub async fn update_curriculum_status(
        &self,
        curriculum_id: &str,
        status: CurriculumStatus,
    ) -> Result<GenericResponse, SessionError> {
        self.patch_empty(format!("/curriculum/{}/status/{}", curriculum_id, status))
            .await
    }

    pub async fn register_courses(
        &self,
        courses: &[CourseRequest],
    ) -> Result<Vec<CourseResponse>, SessionError> {
        self.post_json("/register-course", &courses).await
    }

    pub async fn list_courses(&self) -> Result<Vec<CourseResponse>, SessionError> {
        self.list("/list-courses").await
    }

    pub async fn register_curriculum_courses(
        &self,
        entries: &[CurriculumCourseRequest],
    ) -> Result<Vec<CurriculumCourseResponse>, SessionError> {
        self.post_json("/register-curriculum-course", &entries).await
    }

    /// Courses a curriculum schedules for one year level and semester
    pub async fn curriculum_courses(
        &self,
        curriculum_id: &str,
        year_level: u32,
        semester: u32,
    ) -> Result<Vec<CurriculumCourseResponse>, SessionError> {
        self.list(&format!(
            "/list-curriculum-courses/curriculum/{}/year_level/{}/semester/{}",
            curriculum_id, year_level, semester
        ))
        .await
    }

    // ===== Terms =====

    pub async fn register_terms(&self, terms: &[TermRequest]) -> Result<Vec<TermResponse>, SessionError> {
        self.post_json("/register-term", &terms).await
    }

    pub async fn update_term_status(
        &self,
        term_id: &str,
        status: TermStatus,
    ) -> Result<GenericResponse, SessionError> {
        self.patch_empty(format!("/term/{}/status/{}", term_id, status))
            .await
    }

    /// Terms of the current academic year
    pub async fn active_year_terms(&self) -> Result<Vec<TermResponse>, SessionError> {
        self.list("/term/active-year").await
    }

    /// Terms whose enrollment window is open
    pub async fn active_enrollment_terms(&self) -> Result<Vec<TermResponse>, SessionError> {
        self.list("/term/active-enrollment").await
    }

    // ===== Offerings, sections and schedules =====

    pub async fn register_course_offering(
        &self,
        offering: &CourseOfferingRequest,
    ) -> Result<CourseOfferingResponse, SessionError> {
        self.post_json("/register-course-offering", offering).await
    }

    pub async fn course_offerings_by_term(
        &self,
        term_id: &str,
    ) -> Result<Vec<CourseOfferingResponse>, SessionError> {
        self.list(&format!("/list-course-offerings/term/{}", term_id))
            .await
    }

    pub async fn update_course_offering_status(
        &self,
        offering_id: &str,
        status: CourseOfferingStatus,
    ) -> Result<GenericResponse, SessionError> {
        self.patch_empty(format!("/course-offering/{}/status/{}", offering_id, status))
            .await
    }

    pub async fn register_class_sections(
        &self,
        sections: &[ClassSectionRequest],
    ) -> Result<Vec<ClassSectionResponse>, SessionError> {
        self.post_json("/register/class-section", &sections).await
    }

    pub async fn assign_professor(
        &self,
        assignment: &ProfessorClassSectionRequest,
    ) -> Result<Vec<ProfessorAssignmentResponse>, SessionError> {
        self.post_json("/assign/professor/class-section", assignment)
            .await
    }

    pub async fn assign_class_schedule(
        &self,
        schedule: &ClassScheduleRequest,
    ) -> Result<ClassScheduleResponse, SessionError> {
        self.post_json("/assign/schedule/class-section", schedule)
            .await
    }

    pub async fn class_schedules_by_section(
        &self,
        class_section_id: &str,
    ) -> Result<Vec<ClassScheduleResponse>, SessionError> {
        self.list(&format!(
            "/list-class-schedules/class-section/{}",
            class_section_id
        ))
        .await
    }
}
