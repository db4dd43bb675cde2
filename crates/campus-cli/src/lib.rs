use campus_api_client::{Notification, NotificationLevel};
use campus_core::models::{Course, Material, Role, SessionUser, User};
use campus_core::{navigation_for, Capabilities, NavItem};
use campus_editor::{MaterialRow, StagingStore};
use serde::Serialize;

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Initialize tracing for the CLI. Logs go to stderr so stdout stays parseable.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

/// Fail with a readable message when the current role lacks a capability.
pub fn require(allowed: bool, role: Role, action: &str) -> anyhow::Result<()> {
    if allowed {
        Ok(())
    } else {
        anyhow::bail!("{} accounts cannot {}", role.label(), action)
    }
}

/// Render rows as a left-aligned text table.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let line = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = vec![line(headers.to_vec())];
    out.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    for row in rows {
        out.push(line(row.iter().map(String::as_str).collect()));
    }
    out.join("\n")
}

pub fn course_table(courses: &[Course]) -> String {
    let rows: Vec<Vec<String>> = courses
        .iter()
        .map(|c| {
            vec![
                c.id.to_string(),
                truncate_string(&c.name, 30),
                truncate_string(&c.description, 50),
                c.created_at
                    .map(|t| t.format("%Y-%m-%d").to_string())
                    .unwrap_or_default(),
            ]
        })
        .collect();
    render_table(&["ID", "NAME", "DESCRIPTION", "CREATED"], &rows)
}

pub fn material_table(materials: &[Material]) -> String {
    let rows: Vec<Vec<String>> = materials
        .iter()
        .map(|m| {
            vec![
                m.id.map(|id| id.to_string()).unwrap_or_default(),
                truncate_string(&m.name, 40),
                m.content_type.clone().unwrap_or_default(),
                m.size.map(|s| format_bytes(s.max(0) as u64)).unwrap_or_default(),
            ]
        })
        .collect();
    render_table(&["ID", "NAME", "TYPE", "SIZE"], &rows)
}

pub fn user_table(users: &[User]) -> String {
    let rows: Vec<Vec<String>> = users
        .iter()
        .map(|u| {
            let detail = match (&u.student, &u.instructor) {
                (Some(s), _) => s
                    .age
                    .map(|a| format!("age {}", a))
                    .into_iter()
                    .chain(s.address.clone())
                    .collect::<Vec<_>>()
                    .join(", "),
                (None, Some(i)) => i.qualification.clone().unwrap_or_default(),
                (None, None) => String::new(),
            };
            vec![
                u.id.to_string(),
                truncate_string(&u.name, 25),
                truncate_string(&u.email, 30),
                u.contact_number.map(|n| n.to_string()).unwrap_or_default(),
                truncate_string(&detail, 30),
            ]
        })
        .collect();
    render_table(&["ID", "NAME", "EMAIL", "CONTACT", "DETAILS"], &rows)
}

/// The staged material list as the edit dialog shows it.
pub fn staged_view(store: &StagingStore) -> String {
    let rows: Vec<Vec<String>> = store
        .rows()
        .into_iter()
        .map(|row| match row {
            MaterialRow::Existing {
                material,
                pending_deletion,
            } => vec![
                material.id.map(|id| id.to_string()).unwrap_or_default(),
                truncate_string(&material.name, 40),
                if pending_deletion {
                    "will be deleted".to_string()
                } else {
                    String::new()
                },
            ],
            MaterialRow::Addition(pending) => vec![
                pending.temp_id.to_string(),
                truncate_string(pending.display_name(), 40),
                format!("pending upload ({})", format_bytes(pending.size())),
            ],
        })
        .collect();
    render_table(&["ID", "NAME", "STATUS"], &rows)
}

pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

/// Role-specific landing screen.
#[derive(Debug, Serialize)]
pub struct DashboardSummary {
    pub user: String,
    pub role: Role,
    pub courses: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructors: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub students: Option<usize>,
    pub capabilities: Capabilities,
    pub navigation: Vec<NavItem>,
}

impl DashboardSummary {
    pub fn new(user: &SessionUser, courses: usize) -> Self {
        Self {
            user: user.display_name().to_string(),
            role: user.role,
            courses,
            instructors: None,
            students: None,
            capabilities: Capabilities::for_role(user.role),
            navigation: navigation_for(user.role),
        }
    }

    pub fn render(&self) -> String {
        let mut lines = vec![
            format!("{} dashboard, signed in as {}", self.role.label(), self.user),
            String::new(),
            format!("Courses:     {}", self.courses),
        ];
        if let Some(n) = self.instructors {
            lines.push(format!("Instructors: {}", n));
        }
        if let Some(n) = self.students {
            lines.push(format!("Students:    {}", n));
        }
        lines.push(String::new());
        lines.push(format!(
            "Navigate: {}",
            self.navigation
                .iter()
                .map(|n| n.title)
                .collect::<Vec<_>>()
                .join(" | ")
        ));
        lines.join("\n")
    }
}

/// Print collected notifications to stderr.
pub fn print_notifications(notifications: Vec<Notification>) {
    for n in notifications {
        let tag = match n.level {
            NotificationLevel::Success => "ok",
            NotificationLevel::Info => "info",
            NotificationLevel::Error => "error",
        };
        eprintln!("[{}] {}", tag, n.message);
    }
}
