//! Campus CLI: command-line client for the course-management backend.
//!
//! Set CAMPUS_API_URL (or API_URL). `campus login` stores the session token in
//! CAMPUS_SESSION_PATH; every other command reuses it.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use campus_api_client::{
    ApiClient, CollectingNotifier, FileSessionStore, Notification, Notifier, SessionContext,
    UploadFile,
};
use campus_cli::{
    course_table, init_tracing, material_table, print_notifications, require, staged_view,
    user_table, DashboardSummary, OutputFormat,
};
use campus_core::models::{CourseRequest, RegisterRequest, Role, SessionUser};
use campus_core::{navigation_for, AppError, Config, Screen};
use campus_editor::{
    confirm_and_delete, delete_course_cascade, CommitReport, DeleteConfirmation, EditSession,
    UploadOutcome, UserField, UserForm,
};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "campus", about = "Course management CLI")]
struct Cli {
    /// Output format
    #[arg(long, value_enum, global = true, default_value = "table")]
    format: OutputFormat,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// End the current session
    Logout,
    /// Create a student account
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        contact: Option<i64>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        age: Option<u32>,
    },
    /// Show the signed-in user
    Whoami,
    /// Role-specific overview
    Dashboard,
    /// Course operations
    Course {
        #[command(subcommand)]
        sub: CourseCommands,
    },
    /// Instructor accounts (administrators only)
    Instructor {
        #[command(subcommand)]
        sub: UserCommands,
    },
    /// Student accounts (administrators only)
    Student {
        #[command(subcommand)]
        sub: UserCommands,
    },
}

#[derive(Subcommand)]
enum CourseCommands {
    /// List all courses
    List,
    /// Show one course and its materials
    Get { id: i64 },
    /// Create a course, optionally with materials
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: String,
        /// File to upload as course material (repeatable)
        #[arg(long = "file")]
        files: Vec<PathBuf>,
    },
    /// Change a course's name or description
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete a course and all of its materials
    Delete {
        id: i64,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
    /// List a course's materials
    Materials { id: i64 },
    /// Download one material
    Download {
        material_id: i64,
        /// Course the material belongs to, used to pick the file name
        #[arg(long)]
        course: Option<i64>,
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Stage field and material changes, then save them together
    Edit {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// File to upload (repeatable)
        #[arg(long)]
        add: Vec<PathBuf>,
        /// Material id to delete (repeatable)
        #[arg(long)]
        remove: Vec<i64>,
        /// Material id to keep after all (repeatable)
        #[arg(long)]
        restore: Vec<i64>,
        /// Show the staged changes and discard them
        #[arg(long)]
        cancel: bool,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    List,
    Create {
        #[command(flatten)]
        fields: UserFields,
    },
    Update {
        id: i64,
        #[command(flatten)]
        fields: UserFields,
    },
    Delete {
        id: i64,
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args)]
struct UserFields {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    password: Option<String>,
    #[arg(long)]
    contact: Option<String>,
    /// Students only
    #[arg(long)]
    address: Option<String>,
    /// Students only
    #[arg(long)]
    age: Option<String>,
    /// Instructors only
    #[arg(long)]
    qualification: Option<String>,
}

impl UserFields {
    fn apply(self, form: &mut UserForm) -> anyhow::Result<()> {
        let values = [
            (UserField::Name, "name", self.name),
            (UserField::Email, "email", self.email),
            (UserField::Password, "password", self.password),
            (UserField::ContactNumber, "contact", self.contact),
            (UserField::Address, "address", self.address),
            (UserField::Age, "age", self.age),
            (UserField::Qualification, "qualification", self.qualification),
        ];
        for (field, flag, value) in values {
            if let Some(value) = value {
                if !form.set(field, value) {
                    anyhow::bail!(
                        "--{} does not apply to {} accounts",
                        flag,
                        form.role().label().to_lowercase()
                    );
                }
            }
        }
        Ok(())
    }
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

struct App {
    client: ApiClient,
    notifier: Arc<CollectingNotifier>,
    config: Config,
    format: OutputFormat,
}

impl App {
    fn emit<T: Serialize>(&self, value: &T, table: impl FnOnce(&T) -> String) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Json => print_json(value),
            OutputFormat::Table => {
                println!("{}", table(value));
                Ok(())
            }
        }
    }

    fn current_user(&self) -> anyhow::Result<SessionUser> {
        match self.client.session().user() {
            Some(user) if self.client.session().is_authenticated() => Ok(user),
            _ => anyhow::bail!("Not logged in. Run `campus login` first."),
        }
    }

    fn success(&self, message: impl Into<String>) {
        self.notifier.notify(Notification::success(message));
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = Config::from_env().context("Invalid configuration")?;
    let store = Arc::new(FileSessionStore::new(config.session_path.clone()));
    let session = SessionContext::load_at_startup(store);
    let notifier = Arc::new(CollectingNotifier::new());
    let client = ApiClient::from_config(&config, session, notifier.clone())
        .context("Failed to create API client. Check CAMPUS_API_URL (or API_URL)")?;

    let app = App {
        client,
        notifier,
        config,
        format: cli.format,
    };
    let result = run(&app, cli.command).await;
    print_notifications(app.notifier.drain());
    result
}

async fn run(app: &App, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Login { email, password } => {
            let user = app.client.login(&email, &password).await?;
            app.success(format!(
                "Welcome, {} ({})",
                user.display_name(),
                user.role.label()
            ));
            app.emit(&user, |u| {
                format!("Signed in as {} ({})", u.display_name(), u.role.label())
            })
        }
        Commands::Logout => {
            app.client.logout()?;
            app.success("Logged out");
            Ok(())
        }
        Commands::Register {
            name,
            email,
            password,
            contact,
            address,
            age,
        } => {
            let form = RegisterRequest {
                name,
                email,
                password,
                contact_number: contact,
                address,
                age,
            };
            app.client.register(form).await?;
            app.success("Registration successful. Please log in.");
            Ok(())
        }
        Commands::Whoami => {
            let user = app.current_user()?;
            app.emit(&user, |u| {
                let mut lines = vec![
                    format!("Name:  {}", u.display_name()),
                    format!("Email: {}", u.email.as_deref().unwrap_or("-")),
                    format!("Role:  {}", u.role.label()),
                ];
                for (key, value) in &u.extra {
                    lines.push(format!("{}: {}", key, value));
                }
                lines.join("\n")
            })
        }
        Commands::Dashboard => dashboard(app).await,
        Commands::Course { sub } => course(app, sub).await,
        Commands::Instructor { sub } => users(app, Role::Instructor, sub).await,
        Commands::Student { sub } => users(app, Role::Student, sub).await,
    }
}

async fn dashboard(app: &App) -> anyhow::Result<()> {
    let user = app.current_user()?;
    let client = &app.client;

    let summary = if user.role == Role::Admin {
        let (courses, instructors, students) = tokio::try_join!(
            client.list_courses(),
            client.list_users(Some(Role::Instructor)),
            client.list_users(Some(Role::Student)),
        )?;
        let mut summary = DashboardSummary::new(&user, courses.len());
        summary.instructors = Some(instructors.len());
        summary.students = Some(students.len());
        summary
    } else {
        DashboardSummary::new(&user, client.list_courses().await?.len())
    };
    app.emit(&summary, DashboardSummary::render)
}

async fn course(app: &App, command: CourseCommands) -> anyhow::Result<()> {
    let user = app.current_user()?;
    let caps = app.client.session().capabilities();
    let client = &app.client;

    match command {
        CourseCommands::List => {
            let courses = client.list_courses().await?;
            app.emit(&courses, |c| course_table(c))
        }
        CourseCommands::Get { id } => {
            let (course, materials) =
                tokio::try_join!(client.get_course(id), client.list_materials(id))?;
            let value = serde_json::json!({ "course": course, "materials": materials });
            app.emit(&value, |_| {
                format!(
                    "{}\n\n{}\n\n{}",
                    course.name,
                    course.description,
                    material_table(&materials)
                )
            })
        }
        CourseCommands::Create {
            name,
            description,
            files,
        } => {
            require(caps.can_create, user.role, "create courses")?;
            let mut session = EditSession::default();
            session.open_create();
            session.store_mut().set_name(name);
            session.store_mut().set_description(description);
            stage_files(app, &mut session, &files)?;
            commit(app, &mut session).await
        }
        CourseCommands::Update {
            id,
            name,
            description,
        } => {
            require(caps.can_edit, user.role, "edit courses")?;
            let course = client.get_course(id).await?;
            let request = CourseRequest::new(
                name.unwrap_or(course.name),
                description.unwrap_or(course.description),
            );
            request.validate_form()?;
            client.update_course(id, &request).await?;
            app.success(format!("Course {} updated", id));
            app.emit(&request, |r| format!("{}\n{}", r.name, r.description))
        }
        CourseCommands::Delete { id, yes } => {
            require(caps.can_delete, user.role, "delete courses")?;
            let mut courses = client.list_courses().await?;
            let Some(course) = courses.iter().find(|c| c.id == id) else {
                anyhow::bail!("Course {} not found", id);
            };

            let mut confirmation = DeleteConfirmation::new();
            confirmation.request(id);
            if !yes {
                println!(
                    "Course '{}' and all of its materials will be deleted. Re-run with --yes to confirm.",
                    course.name
                );
                confirmation.cancel();
                return Ok(());
            }

            let removed = confirm_and_delete(&mut confirmation, &mut courses, |c| c.id, |id| async move {
                let outcome = delete_course_cascade(client, id).await?;
                if outcome.has_orphaned_materials() {
                    app.notifier.notify(Notification::info(format!(
                        "Course {} deleted, but some materials could not be removed",
                        id
                    )));
                }
                Ok::<(), AppError>(())
            })
            .await?;
            if let Some(course) = removed {
                app.success(format!("Course '{}' deleted", course.name));
            }
            app.emit(&courses, |c| course_table(c))
        }
        CourseCommands::Materials { id } => {
            let materials = client.list_materials(id).await?;
            app.emit(&materials, |m| material_table(m))
        }
        CourseCommands::Download {
            material_id,
            course,
            output,
        } => {
            let output = match (output, course) {
                (Some(path), _) => path,
                (None, Some(course_id)) => {
                    let materials = client.list_materials(course_id).await?;
                    materials
                        .iter()
                        .find(|m| m.id == Some(material_id))
                        .map(|m| PathBuf::from(m.download_name()))
                        .with_context(|| {
                            format!("Material {} is not part of course {}", material_id, course_id)
                        })?
                }
                (None, None) => PathBuf::from(format!("material-{}", material_id)),
            };
            let bytes = client.download_material(material_id).await?;
            tokio::fs::write(&output, &bytes)
                .await
                .with_context(|| format!("Failed to write {}", output.display()))?;
            app.success(format!(
                "Saved {} ({} bytes)",
                output.display(),
                bytes.len()
            ));
            Ok(())
        }
        CourseCommands::Edit {
            id,
            name,
            description,
            add,
            remove,
            restore,
            cancel,
        } => {
            require(caps.can_edit, user.role, "edit courses")?;
            let course = client.get_course(id).await?;

            let mut session = EditSession::default();
            let ticket = session.begin_edit(&course);
            let materials = client.list_materials(id).await?;
            session.materials_loaded(ticket, materials);

            if let Some(name) = name {
                session.store_mut().set_name(name);
            }
            if let Some(description) = description {
                session.store_mut().set_description(description);
            }
            for material_id in remove {
                if !session.store_mut().stage_deletion(material_id) {
                    anyhow::bail!("Material {} is not part of course {}", material_id, id);
                }
            }
            for material_id in restore {
                session.store_mut().unstage_deletion(material_id);
            }
            stage_files(app, &mut session, &add)?;

            if app.format == OutputFormat::Table {
                println!("{}\n", staged_view(session.store()));
            }

            if cancel {
                session.cancel();
                app.notifier
                    .notify(Notification::info("Changes discarded"));
                let materials = session.store().materials().to_vec();
                return app.emit(&materials, |m| material_table(m));
            }
            commit(app, &mut session).await
        }
    }
}

/// Stage local files, enforcing the configured upload limit.
fn stage_files(app: &App, session: &mut EditSession, files: &[PathBuf]) -> anyhow::Result<()> {
    for path in files {
        let file = UploadFile::from_path(path)?;
        session.store_mut().stage_addition(file);
    }
    let total = session.store().pending_upload_bytes();
    if total > app.config.max_upload_bytes {
        session.cancel();
        anyhow::bail!(
            "Selected files total {} bytes, over the {} byte upload limit",
            total,
            app.config.max_upload_bytes
        );
    }
    Ok(())
}

async fn commit(app: &App, session: &mut EditSession) -> anyhow::Result<()> {
    let report = session
        .confirm(&app.client)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    let notification = if report.is_complete() {
        Notification::success(report.summary())
    } else {
        Notification::info(report.summary())
    };
    app.notifier.notify(notification);

    let value = report_json(&report, session);
    app.emit(&value, |_| material_table(session.store().materials()))
}

fn report_json(report: &CommitReport, session: &EditSession) -> serde_json::Value {
    let failures: Vec<serde_json::Value> = report
        .deletion_failures
        .iter()
        .map(|(id, e)| serde_json::json!({ "id": id, "error": e.to_string() }))
        .collect();
    let upload_error = match &report.upload {
        UploadOutcome::Failed(e) => Some(e.to_string()),
        _ => None,
    };
    serde_json::json!({
        "courseId": report.course_id,
        "deleted": report.deleted,
        "deletionFailures": failures,
        "uploaded": report.upload.uploaded_count(),
        "uploadError": upload_error,
        "refreshFailed": report.refresh_failed,
        "materials": session.store().materials(),
    })
}

async fn users(app: &App, role: Role, command: UserCommands) -> anyhow::Result<()> {
    let user = app.current_user()?;
    let screen = match role {
        Role::Instructor => Screen::Instructors,
        _ => Screen::Students,
    };
    let plural = format!("{}s", role.label().to_lowercase());
    require(
        navigation_for(user.role).iter().any(|n| n.screen == screen),
        user.role,
        &format!("manage {}", plural),
    )?;
    let caps = app.client.session().capabilities();
    let client = &app.client;

    match command {
        UserCommands::List => {
            let users = client.list_users(Some(role)).await?;
            app.emit(&users, |u| user_table(u))
        }
        UserCommands::Create { fields } => {
            require(caps.can_create, user.role, &format!("create {}", plural))?;
            let mut form = UserForm::for_create(role);
            fields.apply(&mut form)?;
            let request = validated(&form)?;
            client.create_user(&request).await?;
            app.success(format!("{} created", role.label()));
            Ok(())
        }
        UserCommands::Update { id, fields } => {
            require(caps.can_edit, user.role, &format!("edit {}", plural))?;
            let existing = client.get_user(id).await?;
            let mut form = UserForm::for_edit(&existing);
            fields.apply(&mut form)?;
            if !form.is_dirty() {
                app.notifier.notify(Notification::info("Nothing to update"));
                return Ok(());
            }
            let request = validated(&form)?;
            client.update_user(id, &request).await?;
            app.success(format!("{} {} updated", role.label(), id));
            Ok(())
        }
        UserCommands::Delete { id, yes } => {
            require(caps.can_delete, user.role, &format!("delete {}", plural))?;
            let mut users = client.list_users(Some(role)).await?;
            let Some(target) = users.iter().find(|u| u.id == id) else {
                anyhow::bail!("{} {} not found", role.label(), id);
            };

            let mut confirmation = DeleteConfirmation::new();
            confirmation.request(id);
            if !yes {
                println!(
                    "{} '{}' will be deleted. Re-run with --yes to confirm.",
                    role.label(),
                    target.name
                );
                confirmation.cancel();
                return Ok(());
            }

            let removed = confirm_and_delete(&mut confirmation, &mut users, |u| u.id, |id| async move {
                client.delete_user(id).await
            })
            .await?;
            if let Some(removed) = removed {
                app.success(format!("{} '{}' deleted", role.label(), removed.name));
            }
            app.emit(&users, |u| user_table(u))
        }
    }
}

fn validated(form: &UserForm) -> anyhow::Result<campus_core::models::UserRequest> {
    form.to_request().map_err(|errors| {
        for (field, message) in &errors {
            eprintln!("  {}: {}", field, message);
        }
        anyhow::anyhow!("Invalid {} details", form.role().label().to_lowercase())
    })
}
