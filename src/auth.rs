//! 本地认证
//!
//! 凭据与内置白名单比对，带模拟延迟；成功后把用户资料写入 users 表。

use async_trait::async_trait;
use parking_lot::Mutex;
use sea_orm::DatabaseConnection;
use std::collections::HashMap;
use std::time::Duration;

use crate::database::repository::users_repository::{default_profile, UsersRepository};
use crate::error::AppError;

pub const INVALID_CREDENTIALS: &str = "Invalid username or password";
pub const USERNAME_TAKEN: &str = "Username already exists";
pub const EMAIL_TAKEN: &str = "Email already registered";

#[async_trait]
pub trait AuthRepository: Send + Sync {
    /// 成功时返回用户名
    async fn login(&self, username: &str, password: &str) -> Result<String, AppError>;
    /// 成功时返回用户名
    async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<String, AppError>;
}

#[derive(Debug, Clone)]
struct Account {
    email: String,
    password: String,
}

pub struct LocalAuthRepository {
    db: DatabaseConnection,
    accounts: Mutex<HashMap<String, Account>>,
    latency: Duration,
}

impl LocalAuthRepository {
    pub fn new(db: DatabaseConnection, latency: Duration) -> Self {
        let accounts = HashMap::from([
            (
                "admin".to_string(),
                Account {
                    email: "admin@example.com".to_string(),
                    password: "1234".to_string(),
                },
            ),
            (
                "user".to_string(),
                Account {
                    email: "user@example.com".to_string(),
                    password: "password".to_string(),
                },
            ),
        ]);

        Self {
            db,
            accounts: Mutex::new(accounts),
            latency,
        }
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    async fn store_profile(&self, username: &str, email: &str) -> Result<(), AppError> {
        let mut profile = default_profile(username);
        profile.email = email.to_owned();
        UsersRepository::upsert(&self.db, profile)
            .await
            .map_err(AppError::unknown)
    }
}

#[async_trait]
impl AuthRepository for LocalAuthRepository {
    async fn login(&self, username: &str, password: &str) -> Result<String, AppError> {
        self.simulate_latency().await;

        let account = self
            .accounts
            .lock()
            .get(username)
            .filter(|a| a.password == password)
            .cloned();

        match account {
            Some(account) => {
                self.store_profile(username, &account.email).await?;
                log::info!("用户登录成功: {}", username);
                Ok(username.to_owned())
            }
            None => {
                log::info!("登录失败: {}", username);
                Err(AppError::Validation(INVALID_CREDENTIALS.to_string()))
            }
        }
    }

    async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<String, AppError> {
        self.simulate_latency().await;

        {
            let mut accounts = self.accounts.lock();
            if accounts.contains_key(username) {
                return Err(AppError::Validation(USERNAME_TAKEN.to_string()));
            }
            if accounts.values().any(|a| a.email == email) {
                return Err(AppError::Validation(EMAIL_TAKEN.to_string()));
            }
            accounts.insert(
                username.to_owned(),
                Account {
                    email: email.to_owned(),
                    password: password.to_owned(),
                },
            );
        }

        if let Err(e) = self.store_profile(username, email).await {
            // 资料未写入时撤销白名单条目，否则重试会被判为用户名已存在
            self.accounts.lock().remove(username);
            log::error!("注册失败: {} {}", username, e);
            return Err(e);
        }
        log::info!("新用户注册: {}", username);
        Ok(username.to_owned())
    }
}
