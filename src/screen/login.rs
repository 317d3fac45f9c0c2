//! 登录页状态
//!
//! Idle -> Submitting -> Success | Error；出错后编辑任一字段回到 Idle。

use std::sync::Arc;
use tokio::sync::watch;

use crate::auth::AuthRepository;
use crate::session::SessionManager;

pub const EMPTY_USERNAME: &str = "Username cannot be empty";
pub const EMPTY_PASSWORD: &str = "Password cannot be empty";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoginPhase {
    #[default]
    Idle,
    Submitting,
    Success,
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoginState {
    pub username: String,
    pub password: String,
    pub phase: LoginPhase,
}

impl LoginState {
    pub fn is_loading(&self) -> bool {
        self.phase == LoginPhase::Submitting
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.phase {
            LoginPhase::Error(msg) => Some(msg),
            _ => None,
        }
    }
}

pub struct LoginScreen {
    state: watch::Sender<LoginState>,
    auth: Arc<dyn AuthRepository>,
    session: Arc<dyn SessionManager>,
}

impl LoginScreen {
    pub fn new(auth: Arc<dyn AuthRepository>, session: Arc<dyn SessionManager>) -> Self {
        Self {
            state: watch::Sender::new(LoginState::default()),
            auth,
            session,
        }
    }

    pub fn state(&self) -> watch::Receiver<LoginState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> LoginState {
        self.state.borrow().clone()
    }

    pub fn on_username_change(&self, username: &str) {
        self.state.send_modify(|s| {
            s.username = username.to_owned();
            leave_error(s);
        });
    }

    pub fn on_password_change(&self, password: &str) {
        self.state.send_modify(|s| {
            s.password = password.to_owned();
            leave_error(s);
        });
    }

    /// 提交登录；提交中重复调用会被忽略
    pub async fn login(&self) {
        let mut credentials = None;
        self.state.send_if_modified(|s| {
            if s.phase == LoginPhase::Submitting {
                return false;
            }
            if s.username.trim().is_empty() {
                s.phase = LoginPhase::Error(EMPTY_USERNAME.to_string());
            } else if s.password.trim().is_empty() {
                s.phase = LoginPhase::Error(EMPTY_PASSWORD.to_string());
            } else {
                s.phase = LoginPhase::Submitting;
                credentials = Some((s.username.clone(), s.password.clone()));
            }
            true
        });

        let Some((username, password)) = credentials else {
            return;
        };

        let outcome = match self.auth.login(&username, &password).await {
            Ok(username) => self.session.save_session(&username).await,
            Err(e) => Err(e),
        };

        self.state.send_modify(|s| {
            s.phase = match outcome {
                Ok(()) => LoginPhase::Success,
                Err(e) => LoginPhase::Error(e.user_message()),
            };
        });
    }

    pub fn clear_error(&self) {
        self.state.send_modify(leave_error);
    }

    /// 导航完成后重置成功标记
    pub fn reset_login_success(&self) {
        self.state.send_modify(|s| {
            if s.phase == LoginPhase::Success {
                s.phase = LoginPhase::Idle;
            }
        });
    }
}

fn leave_error(state: &mut LoginState) {
    if matches!(state.phase, LoginPhase::Error(_)) {
        state.phase = LoginPhase::Idle;
    }
}
