//! 注册页状态

use std::sync::Arc;
use tokio::sync::watch;

use crate::auth::AuthRepository;
use crate::session::SessionManager;

const MIN_USERNAME_LEN: usize = 3;
const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RegisterState {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub is_loading: bool,
    pub error_message: Option<String>,
    pub is_success: bool,
}

impl RegisterState {
    /// 提交前的本地校验，返回第一条错误
    pub fn validate(&self) -> Result<(), String> {
        if self.username.trim().is_empty() {
            return Err("Username cannot be empty".into());
        }
        if self.username.chars().count() < MIN_USERNAME_LEN {
            return Err("Username must be at least 3 characters".into());
        }
        if self.email.trim().is_empty() {
            return Err("Email cannot be empty".into());
        }
        if !self.email.contains('@') || !self.email.contains('.') {
            return Err("Invalid email format".into());
        }
        if self.password.trim().is_empty() {
            return Err("Password cannot be empty".into());
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err("Password must be at least 6 characters".into());
        }
        if self.password != self.confirm_password {
            return Err("Passwords do not match".into());
        }
        Ok(())
    }
}

pub struct RegisterScreen {
    state: watch::Sender<RegisterState>,
    auth: Arc<dyn AuthRepository>,
    session: Arc<dyn SessionManager>,
}

impl RegisterScreen {
    pub fn new(auth: Arc<dyn AuthRepository>, session: Arc<dyn SessionManager>) -> Self {
        Self {
            state: watch::Sender::new(RegisterState::default()),
            auth,
            session,
        }
    }

    pub fn state(&self) -> watch::Receiver<RegisterState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> RegisterState {
        self.state.borrow().clone()
    }

    pub fn on_username_change(&self, value: &str) {
        self.edit(|s| s.username = value.to_owned());
    }

    pub fn on_email_change(&self, value: &str) {
        self.edit(|s| s.email = value.to_owned());
    }

    pub fn on_password_change(&self, value: &str) {
        self.edit(|s| s.password = value.to_owned());
    }

    pub fn on_confirm_password_change(&self, value: &str) {
        self.edit(|s| s.confirm_password = value.to_owned());
    }

    fn edit(&self, change: impl FnOnce(&mut RegisterState)) {
        self.state.send_modify(|s| {
            change(s);
            s.error_message = None;
        });
    }

    pub async fn register(&self) {
        let mut request = None;
        self.state.send_if_modified(|s| {
            if s.is_loading {
                return false;
            }
            match s.validate() {
                Ok(()) => {
                    s.is_loading = true;
                    s.error_message = None;
                    request = Some((s.username.clone(), s.email.clone(), s.password.clone()));
                }
                Err(msg) => s.error_message = Some(msg),
            }
            true
        });

        let Some((username, email, password)) = request else {
            return;
        };

        let outcome = match self.auth.register(&username, &email, &password).await {
            Ok(username) => self.session.save_session(&username).await,
            Err(e) => Err(e),
        };

        self.state.send_modify(|s| {
            s.is_loading = false;
            match outcome {
                Ok(()) => s.is_success = true,
                Err(e) => s.error_message = Some(e.user_message()),
            }
        });
    }

    pub fn clear_error(&self) {
        self.state.send_modify(|s| s.error_message = None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{LocalAuthRepository, USERNAME_TAKEN};
    use crate::database::db::open_in_memory;
    use crate::session::MemorySessionManager;
    use std::time::Duration;

    fn filled() -> RegisterState {
        RegisterState {
            username: "newbie".into(),
            email: "newbie@example.com".into(),
            password: "secret1".into(),
            confirm_password: "secret1".into(),
            ..RegisterState::default()
        }
    }

    #[test]
    fn validation_messages_in_order() {
        let cases: [(fn(&mut RegisterState), &str); 7] = [
            (|s| s.username = " ".into(), "Username cannot be empty"),
            (|s| s.username = "ab".into(), "Username must be at least 3 characters"),
            (|s| s.email = "".into(), "Email cannot be empty"),
            (|s| s.email = "newbie@example".into(), "Invalid email format"),
            (|s| s.password = "".into(), "Password cannot be empty"),
            (|s| s.password = "12345".into(), "Password must be at least 6 characters"),
            (|s| s.confirm_password = "secret2".into(), "Passwords do not match"),
        ];

        for (mutate, expected) in cases {
            let mut state = filled();
            mutate(&mut state);
            assert_eq!(state.validate(), Err(expected.to_string()));
        }
        assert_eq!(filled().validate(), Ok(()));
    }

    async fn screen() -> (RegisterScreen, Arc<MemorySessionManager>) {
        let auth = Arc::new(LocalAuthRepository::new(open_in_memory().await, Duration::ZERO));
        let session = Arc::new(MemorySessionManager::new());
        (RegisterScreen::new(auth, session.clone()), session)
    }

    #[tokio::test]
    async fn successful_registration_logs_in() {
        let (screen, session) = screen().await;
        screen.on_username_change("newbie");
        screen.on_email_change("newbie@example.com");
        screen.on_password_change("secret1");
        screen.on_confirm_password_change("secret1");
        screen.register().await;

        let state = screen.snapshot();
        assert!(state.is_success);
        assert!(!state.is_loading);
        assert_eq!(session.username().as_deref(), Some("newbie"));
    }

    #[tokio::test]
    async fn taken_username_is_reported() {
        let (screen, session) = screen().await;
        screen.on_username_change("admin");
        screen.on_email_change("other@example.com");
        screen.on_password_change("secret1");
        screen.on_confirm_password_change("secret1");
        screen.register().await;

        assert_eq!(screen.snapshot().error_message.as_deref(), Some(USERNAME_TAKEN));
        assert!(!session.is_logged_in());

        screen.on_email_change("again@example.com");
        assert_eq!(screen.snapshot().error_message, None);
    }

    #[tokio::test]
    async fn invalid_form_is_not_submitted() {
        let (screen, session) = screen().await;
        screen.on_username_change("ab");
        screen.register().await;

        let state = screen.snapshot();
        assert_eq!(
            state.error_message.as_deref(),
            Some("Username must be at least 3 characters")
        );
        assert!(!state.is_loading);
        assert!(!session.is_logged_in());
    }
}
