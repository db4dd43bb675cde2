//! Role capabilities and navigation
//!
//! A role is resolved once into a `Capabilities` record which is then handed
//! to every screen; screens never compare role strings themselves.

use serde::Serialize;

use crate::models::Role;

/// What the current user may do with managed records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub can_create: bool,
    pub can_edit: bool,
    pub can_delete: bool,
    pub can_view: bool,
}

impl Capabilities {
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::Admin => Capabilities {
                can_create: true,
                can_edit: true,
                can_delete: true,
                can_view: true,
            },
            Role::Instructor => Capabilities {
                can_create: true,
                can_edit: true,
                can_delete: false,
                can_view: true,
            },
            Role::Student => Capabilities::read_only(),
        }
    }

    pub fn read_only() -> Self {
        Capabilities {
            can_create: false,
            can_edit: false,
            can_delete: false,
            can_view: true,
        }
    }

    /// Whether any row action besides viewing should be offered.
    pub fn can_manage(&self) -> bool {
        self.can_create || self.can_edit || self.can_delete
    }
}

/// Screens reachable from the dashboard navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Screen {
    Dashboard,
    Courses,
    Instructors,
    Students,
    Profile,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub screen: Screen,
    pub path: &'static str,
    pub title: &'static str,
}

const fn nav(screen: Screen, path: &'static str, title: &'static str) -> NavItem {
    NavItem {
        screen,
        path,
        title,
    }
}

/// Navigation entries for a role. User management is admin-only and sits
/// between Courses and Profile.
pub fn navigation_for(role: Role) -> Vec<NavItem> {
    let mut items = vec![
        nav(Screen::Dashboard, "/home", "Dashboard"),
        nav(Screen::Courses, "/courses", "Courses"),
        nav(Screen::Profile, "/profile", "Profile"),
    ];

    if role == Role::Admin {
        items.splice(
            2..2,
            [
                nav(Screen::Instructors, "/instructors", "Instructors"),
                nav(Screen::Students, "/students", "Students"),
            ],
        );
    }
    items
}
