//! Account commands.
//!
//! # Usage
//!
//! ```bash
//! # Sign in (password from --password, SHOPFRONT_PASSWORD, or stdin)
//! shop login alice
//!
//! # Create an account
//! shop register -u alice -e alice@example.com -p hunter22
//!
//! # Show the signed-in account
//! shop profile
//!
//! # Sign out
//! shop logout
//! ```

use std::io::{self, BufRead, Write};

use secrecy::{ExposeSecret, SecretString};
use shopfront_client::Registration;
use shopfront_core::Role;

use super::{CommandError, Context};

/// Sign in and store the credential.
pub async fn login(
    ctx: &Context,
    name_or_email: &str,
    password: Option<String>,
) -> Result<(), CommandError> {
    let password = match password {
        Some(password) => SecretString::from(password),
        None => read_password(io::stdin().lock())?,
    };
    if password.expose_secret().is_empty() {
        return Err(CommandError::InvalidArgument(
            "password is required (use --password, SHOPFRONT_PASSWORD, or stdin)".into(),
        ));
    }

    ctx.client.login(name_or_email, &password).await?;
    ctx.done(&format!("Signed in as {}", name_or_email.trim()))
}

/// Read a password from the first line of `input`.
fn read_password(mut input: impl BufRead) -> Result<SecretString, CommandError> {
    let mut line = String::new();
    input.read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']).to_owned();
    Ok(SecretString::from(password))
}

/// Forget the stored credential.
pub fn logout(ctx: &Context) -> Result<(), CommandError> {
    ctx.client.logout()?;
    ctx.done("Signed out")
}

/// Create an account.
pub async fn register(
    ctx: &Context,
    username: &str,
    email: &str,
    password: String,
    role: Role,
) -> Result<(), CommandError> {
    let registration = Registration::new(username, email, SecretString::from(password), role)?;
    ctx.client.register(&registration).await?;
    ctx.done(&format!(
        "Registered {} - sign in with `shop login {}`",
        registration.username, registration.username
    ))
}

/// Show the signed-in account.
pub async fn profile(ctx: &Context) -> Result<(), CommandError> {
    let profile = ctx.client.profile().await?;
    ctx.emit(&profile, |out: &mut dyn Write| {
        writeln!(out, "Username: {}", profile.username)?;
        writeln!(out, "Email:    {}", profile.email)?;
        writeln!(out, "Role:     {}", profile.role)
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_read_password_first_line() {
        let password = read_password("s3cret\r\nignored\n".as_bytes()).unwrap();
        assert_eq!(password.expose_secret(), "s3cret");
    }

    #[test]
    fn test_read_password_empty_input() {
        let password = read_password("".as_bytes()).unwrap();
        assert!(password.expose_secret().is_empty());
    }
}
