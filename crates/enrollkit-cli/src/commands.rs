use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use enrollkit_core::auth::CredentialStore;
use enrollkit_core::models::{
    ClassSectionResponse, EnrollmentFilter, EnrollmentResponse, EnrollmentStatus,
    RegistrationRequest, TermResponse, UpdateEnrollmentStatus, UserRole,
};
use enrollkit_core::{ApiClient, AuthenticationError, Config, Credentials, SessionError};
use tracing::{debug, warn};

use crate::{CatalogView, Cli, Command, EnrollmentAction, StudentView};

pub async fn register(config: &Config, file: &Path) -> Result<()> {
    let contents = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let request: RegistrationRequest =
        serde_json::from_str(&contents).context("Failed to parse registration JSON")?;

    let api = ApiClient::from_config(config)?;
    let user = api.register(&request).await?;
    println!("Registered {} <{}> (id {})", user.display_name(), user.email, user.id);
    if !user.is_active {
        println!("The account is pending approval.");
    }
    Ok(())
}

pub fn forget(config: &Config, email: Option<&str>) -> Result<()> {
    let email = email
        .or(config.last_email.as_deref())
        .ok_or_else(|| anyhow!("No email given and none remembered"))?;
    CredentialStore::delete(email)?;
    println!("Forgot the password for {}", email);
    Ok(())
}

fn resolve_email(config: &Config, cli: &Cli) -> Result<String> {
    if let Some(ref email) = cli.email {
        return Ok(email.trim().to_string());
    }
    if let Some(ref email) = config.last_email {
        return Ok(email.clone());
    }
    let email = prompt_line("Email: ")?;
    if email.is_empty() {
        bail!("An email is required");
    }
    Ok(email)
}

fn prompt_line(label: &str) -> Result<String> {
    use std::io::Write;
    eprint!("{}", label);
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// A remembered password the server refused, or one that no longer passes
/// local validation. Either way it will never work again.
fn is_stale_password(error: &SessionError) -> bool {
    matches!(
        error,
        SessionError::Validation(_)
            | SessionError::Authentication(AuthenticationError::Rejected { .. })
    )
}

/// Sign in with the remembered password, or prompt for one.
async fn sign_in(api: &ApiClient, email: &str, remember: bool) -> Result<()> {
    if let Some(password) = CredentialStore::get_password(email) {
        debug!(email = email, "Using remembered password");
        match api.session().authenticate(&Credentials::new(email, password)).await {
            Ok(_) => return Ok(()),
            Err(e) if is_stale_password(&e) => {
                warn!(email = email, error = %e, "Remembered password was rejected, forgetting it");
                eprintln!("The remembered password was rejected.");
                if let Err(e) = CredentialStore::delete(email) {
                    warn!(error = %e, "Failed to forget rejected password");
                }
            }
            Err(e) => return Err(e.into()),
        }
    }

    let password = rpassword::prompt_password(format!("Password for {}: ", email))
        .context("Failed to read password")?;
    api.session()
        .authenticate(&Credentials::new(email, password.clone()))
        .await?;

    if remember {
        if let Err(e) = CredentialStore::store(email, &password) {
            warn!(error = %e, "Failed to remember password");
        }
    }
    Ok(())
}

pub async fn run_signed_in(config: &mut Config, cli: &Cli) -> Result<()> {
    // The cookie jar lives only as long as this process, so there is never
    // a server session to resume here; every run signs in.
    let api = ApiClient::from_config(config)?;

    let email = resolve_email(config, cli)?;
    sign_in(&api, &email, cli.remember).await?;
    if config.last_email.as_deref() != Some(email.as_str()) {
        config.last_email = Some(email);
        if let Err(e) = config.save() {
            warn!(error = %e, "Failed to save config");
        }
    }

    let result = run(&api, &cli.command).await;

    // The process is ending either way; drop the local token even if the
    // server could not be reached.
    if let Err(e) = api.sign_out().await {
        warn!(error = %e, "Sign-out failed");
        api.session().clear();
    }

    result
}

async fn run(api: &ApiClient, command: &Command) -> Result<()> {
    match command {
        Command::SignIn => {
            let session = api
                .session()
                .session()
                .ok_or_else(|| anyhow!("Not signed in"))?;
            let role = session.role.map(|r| r.to_string()).unwrap_or_else(|| "unknown".to_string());
            println!(
                "Signed in as {} - token valid for {} more minutes",
                role,
                session.minutes_until_expiry(Utc::now())
            );
        }
        Command::Whoami => whoami(api).await?,
        Command::Student { view } => student(api, view).await?,
        Command::Sections => {
            let sections = api.allowed_sections().await?;
            if sections.is_empty() {
                println!("No sections open for enrollment.");
            }
            for section in &sections {
                print_section(section);
            }
        }
        Command::Enroll {
            student_id,
            class_section_id,
        } => {
            let enrollment = api.enroll_student(student_id, class_section_id).await?;
            print_enrollment(&enrollment);
        }
        Command::Enrollments { action } => enrollments(api, action).await?,
        Command::Catalog { view } => catalog(api, view).await?,
        Command::Register { .. } | Command::Forget => {}
    }
    Ok(())
}

async fn whoami(api: &ApiClient) -> Result<()> {
    let role = api.session().session().and_then(|s| s.role);
    match role {
        Some(UserRole::Dean) => {
            let dean = api.current_dean().await?;
            println!("{} <{}> - Dean", dean.user.display_name(), dean.user.email);
        }
        Some(UserRole::ProgramChair) => {
            let chair = api.current_program_chair().await?;
            println!("{} <{}> - Program Chair", chair.user.display_name(), chair.user.email);
        }
        Some(UserRole::Student) | None => {
            let student = api.current_student().await?;
            println!(
                "{} <{}> - Student {} (year {}, {:?})",
                student.user.display_name(),
                student.user.email,
                student.university_code,
                student.year_level,
                student.status
            );
        }
        Some(other) => println!("Signed in as {}", other),
    }
    Ok(())
}

async fn student(api: &ApiClient, view: &StudentView) -> Result<()> {
    match view {
        StudentView::Profile => {
            let student = api.current_student().await?;
            println!("{}", serde_json::to_string_pretty(&student)?);
        }
        StudentView::Enrollments => {
            let enrollments = api.my_enrollments().await?;
            if enrollments.is_empty() {
                println!("No enrollments yet.");
            }
            for enrollment in &enrollments {
                print_enrollment(enrollment);
            }
        }
        StudentView::CurrentTerm => print_term(&api.my_current_term().await?),
        StudentView::NextTerm => print_term(&api.my_next_term().await?),
    }
    Ok(())
}

async fn enrollments(api: &ApiClient, action: &EnrollmentAction) -> Result<()> {
    let results = match action {
        EnrollmentAction::List {
            status,
            department,
            program,
            section,
            term,
        } => {
            let filter = EnrollmentFilter {
                department_id: department.clone(),
                program_id: program.clone(),
                class_section_id: section.clone(),
                term_id: term.clone(),
            };
            match (status, filter.is_empty()) {
                (Some(status), true) => api.enrollments_by_status(*status).await?,
                (Some(_), false) => bail!("--status cannot be combined with id filters"),
                (None, true) => api.all_enrollments().await?,
                (None, false) => api.filtered_enrollments(&filter).await?,
            }
        }
        EnrollmentAction::Approve { ids } => {
            update_status(api, EnrollmentStatus::Approved, ids).await?
        }
        EnrollmentAction::Reject { ids } => {
            update_status(api, EnrollmentStatus::Rejected, ids).await?
        }
    };

    if results.is_empty() {
        println!("No enrollments found.");
    }
    for enrollment in &results {
        print_enrollment(enrollment);
    }
    Ok(())
}

async fn catalog(api: &ApiClient, view: &CatalogView) -> Result<()> {
    match view {
        CatalogView::Buildings => {
            for b in api.list_buildings().await? {
                println!("{:<24} rooms {:>3} (id {})", b.name, b.room_capacity, b.id);
            }
        }
        CatalogView::Rooms { building_id } => {
            for r in api.rooms_by_building(building_id).await? {
                println!(
                    "{:<10} {} (id {})",
                    r.room_code.as_deref().unwrap_or("-"),
                    r.building_details.name,
                    r.id
                );
            }
        }
        CatalogView::Departments => {
            for d in api.list_departments().await? {
                println!("{:<8} {} (id {})", d.department_code.as_deref().unwrap_or("-"), d.title, d.id);
            }
        }
        CatalogView::Programs { department_id } => {
            for p in api.programs_by_department(department_id).await? {
                println!("{:<8} {} (id {})", p.program_code.as_deref().unwrap_or("-"), p.title, p.id);
            }
        }
        CatalogView::Curricula { program_id } => {
            for c in api.curricula_by_program(program_id).await? {
                println!("{:<30} {:<10} {:?} (id {})", c.title, c.effective_years(), c.status, c.id);
            }
        }
        CatalogView::Courses => {
            for c in api.list_courses().await? {
                println!("{:<8} {:<40} {} units", c.course_code.as_deref().unwrap_or("-"), c.title, c.units);
            }
        }
        CatalogView::CurriculumCourses {
            curriculum_id,
            year_level,
            semester,
        } => {
            for entry in api.curriculum_courses(curriculum_id, *year_level, *semester).await? {
                let course = &entry.course_details;
                println!(
                    "{:<8} {:<40} {}",
                    course.course_code.as_deref().unwrap_or("-"),
                    course.title,
                    if entry.is_required { "required" } else { "elective" }
                );
            }
        }
        CatalogView::Terms { enrollment } => {
            let terms = if *enrollment {
                api.active_enrollment_terms().await?
            } else {
                api.active_year_terms().await?
            };
            if terms.is_empty() {
                println!("No active terms.");
            }
            for term in &terms {
                print_term(term);
            }
        }
        CatalogView::Offerings { term_id } => {
            for o in api.course_offerings_by_term(term_id).await? {
                let course = o.course();
                println!(
                    "{:<8} {:<40} {} (id {})",
                    course.course_code.as_deref().unwrap_or("-"),
                    course.title,
                    o.status,
                    o.id
                );
            }
        }
        CatalogView::Schedules { class_section_id } => {
            for s in api.class_schedules_by_section(class_section_id).await? {
                let day = s
                    .weekday()
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| format!("day {}", s.day_of_week));
                println!(
                    "{:<4} {}-{} {}",
                    day,
                    s.start_time.format("%H:%M"),
                    s.end_time.format("%H:%M"),
                    s.room_details.room_code.as_deref().unwrap_or("-")
                );
            }
        }
        CatalogView::SetTermStatus { term_id, status } => {
            println!("{}", api.update_term_status(term_id, *status).await?.message);
        }
        CatalogView::SetCurriculumStatus {
            curriculum_id,
            status,
        } => {
            println!("{}", api.update_curriculum_status(curriculum_id, *status).await?.message);
        }
        CatalogView::SetOfferingStatus {
            offering_id,
            status,
        } => {
            println!(
                "{}",
                api.update_course_offering_status(offering_id, *status).await?.message
            );
        }
    }
    Ok(())
}

async fn update_status(
    api: &ApiClient,
    status: EnrollmentStatus,
    ids: &[String],
) -> Result<Vec<EnrollmentResponse>> {
    let update = UpdateEnrollmentStatus {
        status,
        enrollment_ids: ids.to_vec(),
    };
    Ok(api.update_enrollment_status(&update).await?)
}

fn print_enrollment(enrollment: &EnrollmentResponse) {
    println!(
        "{:<9} {:<30} {:<12} {}",
        enrollment.status,
        enrollment.student.user.display_name(),
        enrollment.class_section.section_code,
        enrollment.term.label()
    );
}

fn print_section(section: &ClassSectionResponse) {
    let course = section
        .course_offering()
        .map(|o| o.course().title.clone())
        .unwrap_or_default();
    println!(
        "{:<12} {:<30} {:>3} seats left {:?} (id {})",
        section.section_code,
        course,
        section.seats_left(),
        section.status,
        section.id
    );
}

fn print_term(term: &TermResponse) {
    println!(
        "{} [{:?}] enrollment {} to {}",
        term.label(),
        term.status,
        term.enrollment_start,
        term.enrollment_end
    );
}
