//! Form state for the instructor and student dialogs.
//!
//! Inputs are kept as the raw text the user typed; parsing and validation
//! happen once in [`UserForm::to_request`], which reports every invalid field
//! at the same time.

use campus_core::models::{InstructorProfile, Role, StudentProfile, User, UserRequest};
use campus_core::validation::{form_errors, FormErrors};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserField {
    Name,
    Email,
    Password,
    ContactNumber,
    Address,
    Age,
    Qualification,
}

impl UserField {
    /// Key used in [`FormErrors`].
    pub fn key(&self) -> &'static str {
        match self {
            UserField::Name => "name",
            UserField::Email => "email",
            UserField::Password => "password",
            UserField::ContactNumber => "contact_number",
            UserField::Address => "address",
            UserField::Age => "age",
            UserField::Qualification => "qualification",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            UserField::Name => "Name",
            UserField::Email => "Email",
            UserField::Password => "Password",
            UserField::ContactNumber => "Contact number",
            UserField::Address => "Address",
            UserField::Age => "Age",
            UserField::Qualification => "Qualification",
        }
    }
}

const COMMON_FIELDS: [UserField; 4] = [
    UserField::Name,
    UserField::Email,
    UserField::Password,
    UserField::ContactNumber,
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Values {
    name: String,
    email: String,
    password: String,
    contact_number: String,
    address: String,
    age: String,
    qualification: String,
}

impl Values {
    fn slot(&mut self, field: UserField) -> &mut String {
        match field {
            UserField::Name => &mut self.name,
            UserField::Email => &mut self.email,
            UserField::Password => &mut self.password,
            UserField::ContactNumber => &mut self.contact_number,
            UserField::Address => &mut self.address,
            UserField::Age => &mut self.age,
            UserField::Qualification => &mut self.qualification,
        }
    }

    fn get(&self, field: UserField) -> &str {
        match field {
            UserField::Name => &self.name,
            UserField::Email => &self.email,
            UserField::Password => &self.password,
            UserField::ContactNumber => &self.contact_number,
            UserField::Address => &self.address,
            UserField::Age => &self.age,
            UserField::Qualification => &self.qualification,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UserForm {
    role: Role,
    user_id: Option<i64>,
    initial: Values,
    values: Values,
}

impl UserForm {
    /// Empty form for a new user of `role`.
    pub fn for_create(role: Role) -> Self {
        Self {
            role,
            user_id: None,
            initial: Values::default(),
            values: Values::default(),
        }
    }

    /// Form prefilled from an existing record. The password starts empty and
    /// is only sent when the user types a new one.
    pub fn for_edit(user: &User) -> Self {
        let student = user.student.clone().unwrap_or_default();
        let instructor = user.instructor.clone().unwrap_or_default();
        let values = Values {
            name: user.name.clone(),
            email: user.email.clone(),
            password: String::new(),
            contact_number: user
                .contact_number
                .map(|n| n.to_string())
                .unwrap_or_default(),
            address: student.address.unwrap_or_default(),
            age: student.age.map(|a| a.to_string()).unwrap_or_default(),
            qualification: instructor.qualification.unwrap_or_default(),
        };
        Self {
            role: user.role,
            user_id: Some(user.id),
            initial: values.clone(),
            values,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn user_id(&self) -> Option<i64> {
        self.user_id
    }

    pub fn is_creating(&self) -> bool {
        self.user_id.is_none()
    }

    /// Inputs shown for this form's role, in display order.
    pub fn fields(&self) -> Vec<UserField> {
        let mut fields = COMMON_FIELDS.to_vec();
        match self.role {
            Role::Student => fields.extend([UserField::Address, UserField::Age]),
            Role::Instructor => fields.push(UserField::Qualification),
            Role::Admin => {}
        }
        fields
    }

    /// Update one input. Returns false for fields the role does not have.
    pub fn set(&mut self, field: UserField, value: impl Into<String>) -> bool {
        if !self.fields().contains(&field) {
            return false;
        }
        *self.values.slot(field) = value.into();
        true
    }

    pub fn get(&self, field: UserField) -> &str {
        self.values.get(field)
    }

    pub fn is_dirty(&self) -> bool {
        self.values != self.initial
    }

    /// Discard edits and return to the values the form was opened with.
    pub fn reset(&mut self) {
        self.values = self.initial.clone();
    }

    /// Build the request body, or the per-field messages when invalid.
    pub fn to_request(&self) -> Result<UserRequest, FormErrors> {
        let mut errors = FormErrors::new();
        let v = &self.values;

        let contact_number = parse_optional::<i64>(&v.contact_number).unwrap_or_else(|_| {
            errors.insert(
                UserField::ContactNumber.key().to_string(),
                "Contact number must contain digits only".to_string(),
            );
            None
        });

        let password = Some(v.password.clone()).filter(|p| !p.is_empty());
        if self.is_creating() && password.is_none() {
            errors.insert(
                UserField::Password.key().to_string(),
                "Password is required".to_string(),
            );
        }

        let (student, instructor) = match self.role {
            Role::Student => {
                let age = parse_optional::<u32>(&v.age).unwrap_or_else(|_| {
                    errors.insert(
                        UserField::Age.key().to_string(),
                        "Age must be a whole number".to_string(),
                    );
                    None
                });
                let profile = StudentProfile {
                    address: non_empty(&v.address),
                    age,
                };
                if let Err(e) = profile.validate() {
                    merge(&mut errors, form_errors(&e));
                }
                (Some(profile), None)
            }
            Role::Instructor => (
                None,
                Some(InstructorProfile {
                    qualification: non_empty(&v.qualification),
                }),
            ),
            Role::Admin => (None, None),
        };

        let request = UserRequest {
            name: v.name.trim().to_string(),
            email: v.email.trim().to_string(),
            password,
            role: self.role,
            contact_number,
            student,
            instructor,
        };
        if let Err(e) = request.validate() {
            merge(&mut errors, form_errors(&e));
        }

        if errors.is_empty() {
            Ok(request)
        } else {
            Err(errors)
        }
    }
}

fn parse_optional<T: std::str::FromStr>(raw: &str) -> Result<Option<T>, T::Err> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse().map(Some)
}

fn non_empty(raw: &str) -> Option<String> {
    Some(raw.trim().to_string()).filter(|s| !s.is_empty())
}

/// Keep the first message per field.
fn merge(errors: &mut FormErrors, more: FormErrors) {
    for (field, message) in more {
        errors.entry(field).or_insert(message);
    }
}
