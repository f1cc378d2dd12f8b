use async_trait::async_trait;

use crate::error::{AppError, AppResult};
use crate::services::{SessionProvider, UserIdentity};

/// Session backed by the identity recorded in configuration, limited to one sign-in domain.
pub struct ConfiguredSession {
    email: Option<String>,
    allowed_domain: String,
}

impl ConfiguredSession {
    pub fn new(email: Option<String>, allowed_domain: String) -> Self {
        Self {
            email,
            allowed_domain,
        }
    }
}

#[async_trait]
impl SessionProvider for ConfiguredSession {
    async fn current_user(&self) -> AppResult<Option<UserIdentity>> {
        let Some(email) = self.email.as_deref() else {
            return Ok(None);
        };

        let email = email.trim().to_lowercase();
        let domain = email.rsplit_once('@').map(|(_, domain)| domain);
        if domain != Some(self.allowed_domain.to_lowercase().as_str()) {
            return Err(AppError::Unauthenticated(format!(
                "only @{} email addresses are allowed to sign in",
                self.allowed_domain
            )));
        }

        Ok(Some(UserIdentity { email }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn no_email_means_signed_out() {
        let session = ConfiguredSession::new(None, "skyslope.com".to_string());
        assert_eq!(session.current_user().await.expect("lookup"), None);
    }

    #[tokio::test]
    async fn accepts_allowed_domain_case_insensitively() {
        let session =
            ConfiguredSession::new(Some(" Zach@SkySlope.com ".to_string()), "skyslope.com".into());
        let user = session.current_user().await.expect("lookup");
        assert_eq!(
            user,
            Some(UserIdentity {
                email: "zach@skyslope.com".to_string()
            })
        );
    }

    #[tokio::test]
    async fn rejects_other_domains() {
        let session =
            ConfiguredSession::new(Some("zach@gmail.com".to_string()), "skyslope.com".into());
        let err = session.current_user().await.unwrap_err();
        assert!(matches!(err, AppError::Unauthenticated(ref msg) if msg.contains("@skyslope.com")));
    }
}
