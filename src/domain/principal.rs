//! Authenticated caller identity

/// Role carried in the access token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Renter,
    Staff,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Renter => "renter",
            Self::Staff => "staff",
            Self::Admin => "admin",
        }
    }

    /// Unknown roles get the least privilege.
    pub fn from_str(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "staff" => Self::Staff,
            "admin" => Self::Admin,
            _ => Self::Renter,
        }
    }
}

/// Who is calling an operation
#[derive(Debug, Clone)]
pub struct Principal {
    pub user_id: String,
    pub username: String,
    pub email: Option<String>,
    pub role: Role,
}

impl Principal {
    pub fn new(user_id: impl Into<String>, username: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
            email: None,
            role,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn is_staff(&self) -> bool {
        matches!(self.role, Role::Staff | Role::Admin)
    }
}
