//! enrollkit - command-line access to the university enrollment service.
//!
//! Each invocation is its own process, so a command signs in first, runs,
//! and signs out before exiting.

mod commands;

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use enrollkit_core::models::{CourseOfferingStatus, CurriculumStatus, EnrollmentStatus, TermStatus};
use enrollkit_core::Config;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "enrollkit", version, about = "University enrollment from the command line")]
struct Cli {
    /// Account email (defaults to the last one used)
    #[arg(long, global = true, env = "ENROLLKIT_EMAIL")]
    email: Option<String>,

    /// API base URL, e.g. https://enroll.example.edu/api
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Remember the password in the OS keychain
    #[arg(long, global = true)]
    remember: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Submit a registration from a JSON file
    Register { file: PathBuf },
    /// Check credentials and show the session expiry
    SignIn,
    /// Show the signed-in profile
    Whoami,
    /// Student views
    Student {
        #[command(subcommand)]
        view: StudentView,
    },
    /// Sections the signed-in student may enroll in
    Sections,
    /// Enroll a student in a class section
    Enroll {
        student_id: String,
        class_section_id: String,
    },
    /// Registrar enrollment management
    Enrollments {
        #[command(subcommand)]
        action: EnrollmentAction,
    },
    /// Campus, curriculum and term structure
    Catalog {
        #[command(subcommand)]
        view: CatalogView,
    },
    /// Remove the remembered password
    Forget,
}

#[derive(Debug, Subcommand)]
enum CatalogView {
    Buildings,
    Rooms {
        building_id: String,
    },
    Departments,
    Programs {
        department_id: String,
    },
    Curricula {
        program_id: String,
    },
    Courses,
    /// Courses a curriculum schedules for one year level and semester
    CurriculumCourses {
        curriculum_id: String,
        year_level: u32,
        semester: u32,
    },
    Terms {
        /// Only terms whose enrollment window is open
        #[arg(long)]
        enrollment: bool,
    },
    Offerings {
        term_id: String,
    },
    Schedules {
        class_section_id: String,
    },
    /// Change a term's status (registrar only)
    SetTermStatus {
        term_id: String,
        status: TermStatus,
    },
    /// Change a curriculum's status (registrar only)
    SetCurriculumStatus {
        curriculum_id: String,
        status: CurriculumStatus,
    },
    /// Change a course offering's status
    SetOfferingStatus {
        offering_id: String,
        status: CourseOfferingStatus,
    },
}

#[derive(Debug, Subcommand)]
enum StudentView {
    Profile,
    Enrollments,
    CurrentTerm,
    NextTerm,
}

#[derive(Debug, Subcommand)]
enum EnrollmentAction {
    List {
        #[arg(long)]
        status: Option<EnrollmentStatus>,
        #[arg(long)]
        department: Option<String>,
        #[arg(long)]
        program: Option<String>,
        #[arg(long)]
        section: Option<String>,
        #[arg(long)]
        term: Option<String>,
    },
    Approve {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    Reject {
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();

    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(ref url) = cli.base_url {
        config.base_url = url.clone();
    }
    info!(base_url = %config.base_url, "enrollkit starting");

    match cli.command {
        Command::Register { ref file } => commands::register(&config, file).await,
        Command::Forget => commands::forget(&config, cli.email.as_deref()),
        _ => commands::run_signed_in(&mut config, &cli).await,
    }
}
