use async_trait::async_trait;
use serde_json::json;

use crate::error::Result;
use crate::models::{AuthSettings, LoginFailurePolicy, Session, User};
use crate::services::{AccountBackend, AppwriteClient};
use crate::utils::unique_id;

/// Appwrite account API: sign-up, email sessions, current user, logout.
#[derive(Clone)]
pub struct AuthService {
    client: AppwriteClient,
    login_failure_policy: LoginFailurePolicy,
}

impl AuthService {
    pub fn new(client: AppwriteClient, settings: &AuthSettings) -> Self {
        Self {
            client,
            login_failure_policy: settings.login_failure_policy,
        }
    }

    pub fn login_failure_policy(&self) -> LoginFailurePolicy {
        self.login_failure_policy
    }

    pub async fn is_signed_in(&self) -> Result<bool> {
        Ok(self.get_current_user().await?.is_some())
    }
}

#[async_trait]
impl AccountBackend for AuthService {
    async fn create_account(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<Option<Session>> {
        let body = json!({
            "userId": unique_id(),
            "email": email,
            "password": password,
            "name": name,
        });

        let user: User = self
            .client
            .post_json("/account", &body)
            .await
            .map_err(|err| {
                log::error!("auth :: create_account :: {}", err);
                err
            })?;

        log::info!("Created account {} for {}", user.id, user.email);

        self.login(email, password).await
    }

    async fn login(&self, email: &str, password: &str) -> Result<Option<Session>> {
        let body = json!({
            "email": email,
            "password": password,
        });

        match self
            .client
            .post_json::<_, Session>("/account/sessions/email", &body)
            .await
        {
            Ok(session) => {
                log::info!("Started session {} for user {}", session.id, session.user_id);
                Ok(Some(session))
            }
            Err(err) => match self.login_failure_policy {
                LoginFailurePolicy::Propagate => {
                    log::warn!("auth :: login :: {}", err);
                    Err(err)
                }
                LoginFailurePolicy::TreatAsSignedOut => {
                    log::warn!("auth :: login :: {} (treating as signed out)", err);
                    Ok(None)
                }
            },
        }
    }

    async fn get_current_user(&self) -> Result<Option<User>> {
        match self.client.get::<User>("/account", &[]).await {
            Ok(user) => Ok(Some(user)),
            Err(err) if err.is_unauthorized() => {
                log::debug!("auth :: get_current_user :: no active session");
                Ok(None)
            }
            Err(err) => {
                log::error!("auth :: get_current_user :: {}", err);
                Err(err)
            }
        }
    }

    async fn logout(&self) -> Result<()> {
        self.client.delete("/account/sessions").await.map_err(|err| {
            log::error!("auth :: logout :: {}", err);
            err
        })
    }

    async fn logout_current(&self) -> Result<()> {
        self.client
            .delete("/account/sessions/current")
            .await
            .map_err(|err| {
                log::error!("auth :: logout_current :: {}", err);
                err
            })
    }
}
