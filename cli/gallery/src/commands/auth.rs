use anyhow::{Result, bail};
use bpaf::Bpaf;
use gallery_rust_sdk::models::guard::{GuardDecision, LOGIN_PATH, guard};
use gallery_rust_sdk::providers::auth::Session;
use tracing::{debug, instrument};

use super::Gallery;
use crate::utils::message;

pub const GALLERY_PASSWORD_VAR: &str = "GALLERY_PASSWORD";

/// Log in to and out of the admin API
#[derive(Debug, Bpaf, Clone)]
pub enum AuthCommands {
    /// Log in with email and password
    #[bpaf(command)]
    Login {
        /// Email address of the admin account
        #[bpaf(long, argument("EMAIL"))]
        email: String,

        /// Password of the admin account
        #[bpaf(long, env(GALLERY_PASSWORD_VAR), argument("PASSWORD"))]
        password: Option<String>,
    },

    /// Log out and forget the stored token
    #[bpaf(command)]
    Logout,

    /// Show the logged in user
    #[bpaf(command)]
    Whoami,
}

impl AuthCommands {
    #[instrument(name = "auth", skip_all)]
    pub async fn handle(self, gallery: Gallery) -> Result<()> {
        let mut client = gallery.client;
        let mut session = Session::new(gallery.token_store);

        match self {
            AuthCommands::Login { email, password } => {
                let Some(password) = password.filter(|password| !password.is_empty()) else {
                    bail!("no password given, pass '--password' or set ${GALLERY_PASSWORD_VAR}");
                };

                let authenticated = session.init(&mut client).await?;
                if let GuardDecision::Redirect(_) = guard(LOGIN_PATH, authenticated) {
                    let email = session.user().map(|user| user.email.as_str()).unwrap_or("");
                    message::plain(format!(
                        "Already logged in as {email}, run 'gallery auth logout' first"
                    ));
                    return Ok(());
                }

                let user = session.login(&mut client, &email, &password).await?;
                debug!(email = %user.email, "logged in");
                message::updated(format!("Logged in as {}", user.email));
            },
            AuthCommands::Logout => {
                session.logout(&mut client)?;
                message::deleted("Logged out");
            },
            AuthCommands::Whoami => {
                session.init(&mut client).await?;
                let Some(user) = session.user() else {
                    bail!("not logged in, run 'gallery auth login --email <email>'");
                };
                match &user.full_name {
                    Some(name) => println!("{name} <{}>", user.email),
                    None => println!("{}", user.email),
                }
            },
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use gallery_rust_sdk::providers::auth::{AuthError, MemoryTokenStore, TokenStore};
    use gallery_rust_sdk::providers::catalog::test_helpers::user;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::commands::test_helpers::mock_gallery;

    fn login(password: Option<&str>) -> AuthCommands {
        AuthCommands::Login {
            email: "admin@example.com".to_string(),
            password: password.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn login_stores_token() {
        let store = MemoryTokenStore::default();
        let (gallery, mock, _dir) = mock_gallery(store.clone());
        mock.push_body(json!({ "access_token": "abc", "token_type": "bearer" }));
        mock.push_response(&user("admin@example.com"));

        login(Some("secret")).handle(gallery).await.unwrap();

        assert_eq!(store.load().unwrap().as_deref(), Some("abc"));
        assert_eq!(mock.remaining(), 0);
    }

    #[tokio::test]
    async fn login_when_logged_in_does_nothing() {
        let store = MemoryTokenStore::with_token("abc");
        let (gallery, mock, _dir) = mock_gallery(store.clone());
        mock.push_response(&user("admin@example.com"));

        login(Some("secret")).handle(gallery).await.unwrap();

        assert_eq!(store.load().unwrap().as_deref(), Some("abc"));
        assert_eq!(mock.remaining(), 0);
    }

    #[tokio::test]
    async fn wrong_password_is_auth_error() {
        let (gallery, mock, _dir) = mock_gallery(MemoryTokenStore::default());
        mock.push_error_response(401, "Incorrect email or password");

        let err = login(Some("wrong")).handle(gallery).await.unwrap_err();

        assert!(
            matches!(err.downcast_ref::<AuthError>(), Some(AuthError::Login(_))),
            "{err:?}"
        );
    }

    #[tokio::test]
    async fn login_without_user_keeps_no_token() {
        let store = MemoryTokenStore::default();
        let (gallery, mock, _dir) = mock_gallery(store.clone());
        mock.push_body(json!({ "access_token": "abc", "token_type": "bearer" }));
        mock.push_error_response(500, "database unavailable");

        let err = login(Some("secret")).handle(gallery).await.unwrap_err();

        assert!(
            matches!(err.downcast_ref::<AuthError>(), Some(AuthError::UserUnavailable)),
            "{err:?}"
        );
        assert_eq!(store.load().unwrap(), None);
        assert_eq!(mock.token(), None);
    }

    #[tokio::test]
    async fn login_requires_password() {
        let (gallery, mock, _dir) = mock_gallery(MemoryTokenStore::default());

        let err = login(None).handle(gallery).await.unwrap_err();

        assert!(err.to_string().starts_with("no password given"), "{err}");
        assert_eq!(mock.remaining(), 0);
    }

    #[tokio::test]
    async fn logout_clears_token() {
        let store = MemoryTokenStore::with_token("abc");
        let (gallery, mock, _dir) = mock_gallery(store.clone());

        AuthCommands::Logout.handle(gallery).await.unwrap();

        assert_eq!(store.load().unwrap(), None);
        assert_eq!(mock.token(), None);
    }

    #[tokio::test]
    async fn whoami_without_session_fails() {
        let (gallery, _mock, _dir) = mock_gallery(MemoryTokenStore::default());

        let err = AuthCommands::Whoami.handle(gallery).await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "not logged in, run 'gallery auth login --email <email>'"
        );
    }
}
