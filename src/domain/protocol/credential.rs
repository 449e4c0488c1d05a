use std::fmt;

/// HTTP credential presented to the provider.
#[derive(Clone, PartialEq, Eq, Default)]
pub enum Credential {
    #[default]
    Anonymous,
    Basic {
        user: String,
        password: String,
    },
    /// OAuth style token, used when only one half of the user/password pair is configured.
    BearerToken(String),
}

impl Credential {
    pub fn from_pair(user: Option<String>, password: Option<String>) -> Self {
        match (non_empty(user), non_empty(password)) {
            (Some(user), Some(password)) => Credential::Basic { user, password },
            (Some(token), None) | (None, Some(token)) => Credential::BearerToken(token),
            (None, None) => Credential::Anonymous,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Credential::Anonymous)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

// Secrets never reach the logs.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::Anonymous => write!(f, "Anonymous"),
            Credential::Basic { user, .. } => write!(f, "Basic {{ user: {:?}, password: <redacted> }}", user),
            Credential::BearerToken(_) => write!(f, "BearerToken(<redacted>)"),
        }
    }
}
