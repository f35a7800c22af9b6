//! Access gate in front of the upload form.
//!
//! The identity provider is an external collaborator; the core only asks
//! whether a user is signed in and obtains a token silently before handing
//! out a [`Session`].

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::AuthError;
use crate::intake::{Session, Validator};
use crate::models::config::{AuthConfig, UserProfile};

/// A redirect-based identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    fn is_authenticated(&self) -> bool;

    fn user(&self) -> Option<UserProfile>;

    /// URL the user should be sent to in order to sign in.
    fn login_with_redirect(&self) -> String;

    fn logout(&self);

    /// Obtain an access token without user interaction.
    async fn access_token(&self) -> Result<String, AuthError>;
}

/// A signed-in user with a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admission {
    pub user: Option<UserProfile>,
    pub token: String,
}

/// Gate deciding whether the upload form is reachable.
pub struct AccessGate<'a, P: IdentityProvider + ?Sized> {
    provider: &'a P,
    required: bool,
}

impl<'a, P: IdentityProvider + ?Sized> AccessGate<'a, P> {
    pub fn new(provider: &'a P) -> Self {
        Self {
            provider,
            required: true,
        }
    }

    /// Let everyone through when `required` is false.
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Check the provider and fetch a token for a signed-in user.
    pub async fn admit(&self) -> Result<Option<Admission>, AuthError> {
        if !self.provider.is_authenticated() {
            if !self.required {
                debug!("Authentication not required, admitting anonymous user");
                return Ok(None);
            }
            return Err(AuthError::LoginRequired {
                redirect: self.provider.login_with_redirect(),
            });
        }

        let token = self.provider.access_token().await?;
        let user = self.provider.user();
        info!(
            "Admitted {}",
            user.as_ref().map(|u| u.name.as_str()).unwrap_or("signed-in user")
        );

        Ok(Some(Admission { user, token }))
    }

    /// Admit the user and open a fresh session.
    pub async fn open_session(&self, validator: Validator) -> Result<Session, AuthError> {
        self.admit().await?;
        Ok(Session::with_validator(validator))
    }
}

/// Identity provider backed by configuration.
#[derive(Debug)]
pub struct StaticIdentity {
    login_url: String,
    state: std::sync::Mutex<Option<(UserProfile, Option<String>)>>,
}

impl StaticIdentity {
    pub fn from_config(config: &AuthConfig) -> Self {
        Self {
            login_url: config.login_url.clone(),
            state: std::sync::Mutex::new(
                config
                    .user
                    .clone()
                    .map(|user| (user, config.access_token.clone())),
            ),
        }
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut Option<(UserProfile, Option<String>)>) -> T) -> T {
        let mut guard = self.state.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut guard)
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
    fn is_authenticated(&self) -> bool {
        self.with_state(|s| s.is_some())
    }

    fn user(&self) -> Option<UserProfile> {
        self.with_state(|s| s.as_ref().map(|(user, _)| user.clone()))
    }

    fn login_with_redirect(&self) -> String {
        self.login_url.clone()
    }

    fn logout(&self) {
        self.with_state(|s| *s = None);
    }

    async fn access_token(&self) -> Result<String, AuthError> {
        self.with_state(|s| match s {
            Some((_, Some(token))) => Ok(token.clone()),
            Some((_, None)) => Err(AuthError::Token("no token configured".to_string())),
            None => Err(AuthError::LoginRequired {
                redirect: self.login_url.clone(),
            }),
        })
    }
}
