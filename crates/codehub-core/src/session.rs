//! Explicit session context passed to every API call.
//!
//! A [`Session`] is either anonymous or carries the signed-in user's id and
//! bearer token. It is created at start-up, replaced on login, and cleared
//! on logout; nothing reads credentials from shared global state.

/// Identity and bearer token of a signed-in user.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    user_id: String,
    token: String,
}

impl Credentials {
    pub fn new(user_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            token: token.into(),
        }
    }

    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user_id", &self.user_id)
            .field("token", &"[redacted]")
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    credentials: Option<Credentials>,
}

impl Session {
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn logged_in(user_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            credentials: Some(Credentials::new(user_id, token)),
        }
    }

    /// Replace the current identity, e.g. after a successful sign-in.
    pub fn login(&mut self, user_id: impl Into<String>, token: impl Into<String>) {
        self.credentials = Some(Credentials::new(user_id, token));
    }

    pub fn logout(&mut self) {
        self.credentials = None;
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.credentials.is_some()
    }

    #[must_use]
    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.credentials.as_ref().map(Credentials::user_id)
    }

    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.credentials.as_ref().map(Credentials::token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_session_has_no_identity() {
        let session = Session::anonymous();
        assert!(!session.is_authenticated());
        assert!(session.user_id().is_none());
        assert!(session.token().is_none());
    }

    #[test]
    fn login_then_logout() {
        let mut session = Session::anonymous();
        session.login("u-1", "tok");
        assert!(session.is_authenticated());
        assert_eq!(session.user_id(), Some("u-1"));
        assert_eq!(session.token(), Some("tok"));

        session.login("u-2", "tok-2");
        assert_eq!(session.user_id(), Some("u-2"));

        session.logout();
        assert_eq!(session, Session::anonymous());
    }

    #[test]
    fn debug_redacts_token() {
        let session = Session::logged_in("u-1", "very-secret-token");
        let debug = format!("{session:?}");
        assert!(debug.contains("u-1"));
        assert!(!debug.contains("very-secret-token"));
    }
}
