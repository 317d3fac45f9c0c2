//! 启动页：根据会话决定进入首页还是登录页

use std::sync::Arc;
use tokio::sync::watch;

use crate::session::SessionManager;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Home,
    Login,
}

pub struct SplashScreen {
    session: Arc<dyn SessionManager>,
}

impl SplashScreen {
    pub fn new(session: Arc<dyn SessionManager>) -> Self {
        Self { session }
    }

    pub fn is_user_logged_in(&self) -> watch::Receiver<bool> {
        self.session.observe_logged_in()
    }

    pub fn start_destination(&self) -> Destination {
        if self.session.is_logged_in() {
            Destination::Home
        } else {
            Destination::Login
        }
    }
}
