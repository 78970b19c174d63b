//! Login, registration, and the signed-in profile.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use shopfront_core::{Email, Profile, Role};
use tracing::{info, instrument};

use super::to_body;
use crate::error::{ClientError, Result};
use crate::http::{ApiClient, FetchOptions};

/// A new account.
#[derive(Debug)]
pub struct Registration {
    pub username: String,
    pub email: Email,
    pub password: SecretString,
    pub role: Role,
}

impl Registration {
    /// Validate raw form input.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidInput` for a blank username or password
    /// or a malformed email.
    pub fn new(username: &str, email: &str, password: SecretString, role: Role) -> Result<Self> {
        let username = username.trim();
        if username.is_empty() {
            return Err(ClientError::InvalidInput("username is required".into()));
        }
        if password.expose_secret().is_empty() {
            return Err(ClientError::InvalidInput("password is required".into()));
        }
        Ok(Self {
            username: username.to_owned(),
            email: Email::parse(email)?,
            password,
            role,
        })
    }
}

#[derive(Serialize)]
struct RegistrationBody<'a> {
    username: &'a str,
    password: &'a str,
    email: &'a str,
    role: &'a str,
}

#[derive(Serialize)]
struct LoginBody<'a> {
    nameoremail: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    #[serde(default)]
    token: Option<String>,
}

impl ApiClient {
    /// Sign in and store the returned credential.
    ///
    /// # Errors
    ///
    /// Returns error if the backend rejects the login, the response has no
    /// token, or the credential cannot be stored.
    #[instrument(skip(self, password))]
    pub async fn login(&self, name_or_email: &str, password: &SecretString) -> Result<()> {
        let body = to_body(&LoginBody {
            nameoremail: name_or_email.trim(),
            password: password.expose_secret(),
        })?;
        let response: LoginResponse = self
            .call_json("/login", FetchOptions::post(body), "login")
            .await?;

        let token = response
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ClientError::Api {
                status: 200,
                message: "login response did not include a token".into(),
            })?;
        self.session().set_credential(&token)?;
        info!("Signed in");
        Ok(())
    }

    /// Create an account. Does not sign in.
    ///
    /// # Errors
    ///
    /// Returns error if the backend rejects the registration.
    #[instrument(skip(self, registration), fields(username = %registration.username))]
    pub async fn register(&self, registration: &Registration) -> Result<()> {
        let body = to_body(&RegistrationBody {
            username: &registration.username,
            password: registration.password.expose_secret(),
            email: registration.email.as_str(),
            role: registration.role.as_str(),
        })?;
        self.call("/registration", FetchOptions::post(body)).await?;
        info!("Registered account");
        Ok(())
    }

    /// The signed-in account.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotAuthenticated` without a stored credential,
    /// or the backend's error.
    #[instrument(skip(self))]
    pub async fn profile(&self) -> Result<Profile> {
        self.require_credential()?;
        self.call_json("/profile", FetchOptions::get().auth(), "profile")
            .await
    }

    /// Forget the stored credential.
    ///
    /// # Errors
    ///
    /// Returns error if the credential store cannot be written.
    pub fn logout(&self) -> Result<()> {
        self.session().clear_credential()?;
        info!("Signed out");
        Ok(())
    }

    /// The signed-in account, if it is an admin.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Forbidden` for non-admin accounts.
    pub async fn require_admin(&self) -> Result<Profile> {
        let profile = self.profile().await?;
        if profile.is_admin() {
            Ok(profile)
        } else {
            Err(ClientError::Forbidden(format!(
                "{} is not an admin (role: {})",
                profile.username, profile.role
            )))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::Router;
    use axum::extract::Json;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{get, post};
    use serde_json::{Value, json};

    use super::*;
    use crate::testing::{client_for, signed_in, spawn};

    fn app() -> Router {
        Router::new()
            .route(
                "/login",
                post(|Json(body): Json<Value>| async move {
                    match (body["nameoremail"].as_str(), body["password"].as_str()) {
                        (Some("alice"), Some("pw")) => {
                            (StatusCode::OK, Json(json!({"token": "jwt-alice"})))
                        }
                        (Some("empty"), _) => (StatusCode::OK, Json(json!({}))),
                        _ => (
                            StatusCode::UNAUTHORIZED,
                            Json(json!("Invalid username or password")),
                        ),
                    }
                }),
            )
            .route(
                "/registration",
                post(|Json(body): Json<Value>| async move {
                    if body["username"] == "taken" {
                        return (StatusCode::CONFLICT, "Username or email already exists\n");
                    }
                    assert_eq!(body["role"], "user");
                    assert_eq!(body["email"], "new@shop.test");
                    (StatusCode::OK, "registered")
                }),
            )
            .route(
                "/profile",
                get(|headers: HeaderMap| async move {
                    let auth = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_owned();
                    match auth.as_str() {
                        "Bearer jwt-alice" => (
                            StatusCode::OK,
                            Json(json!({"username": "alice", "email": "a@shop.test", "role": "admin"})),
                        ),
                        "Bearer jwt-bob" => (
                            StatusCode::OK,
                            Json(json!({"username": "bob", "email": "b@shop.test", "role": "user"})),
                        ),
                        _ => (StatusCode::UNAUTHORIZED, Json(json!("Invalid token"))),
                    }
                }),
            )
    }

    fn secret(s: &str) -> SecretString {
        SecretString::from(s.to_owned())
    }

    #[tokio::test]
    async fn test_login_stores_credential() {
        let base = spawn(app()).await;
        let client = client_for(&base);
        client.login(" alice ", &secret("pw")).await.unwrap();
        assert_eq!(
            client.session().get_credential().unwrap().expose_secret(),
            "jwt-alice"
        );
        assert_eq!(client.profile().await.unwrap().username, "alice");
    }

    #[tokio::test]
    async fn test_login_failure_and_missing_token() {
        let base = spawn(app()).await;
        let client = client_for(&base);

        let err = client.login("alice", &secret("wrong")).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Api { status: 401, ref message } if message == "Invalid username or password"
        ));

        assert!(client.login("empty", &secret("pw")).await.is_err());
        assert!(client.session().get_credential().is_none());
    }

    #[tokio::test]
    async fn test_register() {
        let base = spawn(app()).await;
        let client = client_for(&base);
        let registration =
            Registration::new("newbie", "new@shop.test", secret("pw"), Role::User).unwrap();
        client.register(&registration).await.unwrap();

        let taken = Registration::new("taken", "t@shop.test", secret("pw"), Role::User).unwrap();
        let err = client.register(&taken).await.unwrap_err();
        assert_eq!(err.status(), Some(409));
        assert_eq!(
            err.to_string(),
            "Username or email already exists (HTTP 409)"
        );
    }

    #[test]
    fn test_registration_validation() {
        assert!(Registration::new(" ", "a@b.co", secret("pw"), Role::User).is_err());
        assert!(Registration::new("a", "not-an-email", secret("pw"), Role::User).is_err());
        assert!(Registration::new("a", "a@b.co", secret(""), Role::User).is_err());
    }

    #[tokio::test]
    async fn test_profile_requires_credential() {
        let client = client_for("http://127.0.0.1:9");
        assert!(matches!(
            client.profile().await,
            Err(ClientError::NotAuthenticated)
        ));
    }

    #[tokio::test]
    async fn test_require_admin() {
        let base = spawn(app()).await;
        assert!(signed_in(&base, "jwt-alice").require_admin().await.is_ok());
        assert!(matches!(
            signed_in(&base, "jwt-bob").require_admin().await,
            Err(ClientError::Forbidden(_))
        ));
        assert!(signed_in(&base, "stale").require_admin().await.unwrap_err().is_unauthorized());
    }

    #[test]
    fn test_logout_clears_credential() {
        let client = signed_in("http://127.0.0.1:9", "tok");
        client.logout().unwrap();
        assert!(client.session().get_credential().is_none());
    }
}
