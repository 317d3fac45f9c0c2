//! 页面状态
//!
//! 每个页面持有一份可观察的状态快照，意图方法修改状态或调用服务；
//! 页面启动的后台订阅挂在 [`scope::ScreenScope`] 上，随页面一起销毁。

pub mod detail;
pub mod home;
pub mod library;
pub mod login;
pub mod register;
pub mod scope;
pub mod splash;

pub use detail::{DetailScreen, DetailState};
pub use home::{HomeScreen, HomeState};
pub use library::{LibraryScreen, LibraryState};
pub use login::{LoginPhase, LoginScreen, LoginState};
pub use register::{RegisterScreen, RegisterState};
pub use splash::{Destination, SplashScreen};
