//! Authentication session for the admin API.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use gallery_catalog::CatalogClientError;
use gallery_catalog::types::{LoginRequest, User};
use gallery_core::{
    StateFileError,
    acquire_lock,
    read_json,
    remove_state_file,
    serialize_atomically,
    traceable_path,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::providers::catalog::ClientTrait;

pub const CREDENTIALS_FILENAME: &str = "credentials.json";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("failed to access stored credentials")]
    Store(#[from] StateFileError),
    #[error("login failed")]
    Login(#[source] CatalogClientError),
    #[error("logged in, but the user could not be loaded")]
    UserUnavailable,
    #[error("failed to configure catalog client")]
    Client(#[source] CatalogClientError),
}

/// Where the access token lives between sessions.
pub trait TokenStore {
    fn load(&self) -> Result<Option<String>, AuthError>;
    fn store(&self, token: &str) -> Result<(), AuthError>;
    fn clear(&self) -> Result<(), AuthError>;
}

impl<T: TokenStore + ?Sized> TokenStore for Box<T> {
    fn load(&self) -> Result<Option<String>, AuthError> {
        (**self).load()
    }

    fn store(&self, token: &str) -> Result<(), AuthError> {
        (**self).store(token)
    }

    fn clear(&self) -> Result<(), AuthError> {
        (**self).clear()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredToken {
    access_token: String,
}

/// Keeps the token in a JSON file.
///
/// The file is written through a temporary file,
/// which is only readable by the current user.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The default store in `data_dir`.
    pub fn in_dir(data_dir: impl AsRef<Path>) -> Self {
        Self::new(data_dir.as_ref().join(CREDENTIALS_FILENAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>, AuthError> {
        let stored = read_json::<StoredToken>(&self.path)?;
        Ok(stored.map(|stored| stored.access_token))
    }

    fn store(&self, token: &str) -> Result<(), AuthError> {
        debug!(path = traceable_path(&self.path), "storing access token");
        let lock = acquire_lock(&self.path)?;
        serialize_atomically(
            &StoredToken {
                access_token: token.to_string(),
            },
            &self.path,
            lock,
        )?;
        Ok(())
    }

    fn clear(&self) -> Result<(), AuthError> {
        debug!(path = traceable_path(&self.path), "removing access token");
        let lock = acquire_lock(&self.path)?;
        remove_state_file(&self.path, lock)?;
        Ok(())
    }
}

/// Keeps the token in memory, clones share the same token.
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStore(Arc<Mutex<Option<String>>>);

impl MemoryTokenStore {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self(Arc::new(Mutex::new(Some(token.into()))))
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>, AuthError> {
        Ok(self.0.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn store(&self, token: &str) -> Result<(), AuthError> {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), AuthError> {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// The signed in state of the admin user.
///
/// A session is authenticated only when it has both a token
/// and the user that token belongs to.
#[derive(Debug)]
pub struct Session<S> {
    store: S,
    token: Option<String>,
    user: Option<User>,
    error: Option<String>,
}

impl<S: TokenStore> Session<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            token: None,
            user: None,
            error: None,
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Message of the last failed login.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some() && self.user.is_some()
    }

    /// Restore a stored token and look up its user.
    ///
    /// Returns whether the session ended up authenticated.
    pub async fn init(&mut self, client: &mut impl ClientTrait) -> Result<bool, AuthError> {
        let Some(token) = self.store.load()? else {
            debug!("no stored access token");
            return Ok(false);
        };

        client.set_token(Some(token.clone())).map_err(AuthError::Client)?;
        self.token = Some(token);
        Ok(self.fetch_user(client).await.is_some())
    }

    /// Exchange credentials for a token, then load the user.
    ///
    /// On failure the server's explanation is kept in [Session::error].
    pub async fn login(
        &mut self,
        client: &mut impl ClientTrait,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        self.error = None;

        let credentials = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let token = match client.login(&credentials).await {
            Ok(token) => token,
            Err(err) => {
                self.error = Some(err.detail().unwrap_or_else(|| err.to_string()));
                return Err(AuthError::Login(err));
            },
        };

        client
            .set_token(Some(token.access_token.clone()))
            .map_err(AuthError::Client)?;
        self.store.store(&token.access_token)?;
        self.token = Some(token.access_token);

        self.fetch_user(client)
            .await
            .ok_or(AuthError::UserUnavailable)
    }

    /// Load the user of the current token.
    ///
    /// Any failure signs the session out, nothing is reported.
    pub async fn fetch_user(&mut self, client: &mut impl ClientTrait) -> Option<User> {
        self.token.as_ref()?;

        match client.current_user().await {
            Ok(user) => {
                debug!(email = %user.email, "loaded current user");
                self.user = Some(user.clone());
                Some(user)
            },
            Err(err) => {
                debug!(error = %err, "could not load current user, signing out");
                self.clear_auth(client);
                None
            },
        }
    }

    pub fn logout(&mut self, client: &mut impl ClientTrait) -> Result<(), AuthError> {
        self.token = None;
        self.user = None;
        self.error = None;
        client.set_token(None).map_err(AuthError::Client)?;
        self.store.clear()
    }

    fn clear_auth(&mut self, client: &mut impl ClientTrait) {
        if let Err(err) = self.logout(client) {
            warn!(error = %err, "failed to clear stored credentials");
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::providers::catalog::MockClient;
    use crate::providers::catalog::test_helpers::user;

    #[tokio::test]
    async fn login_stores_token_and_loads_user() {
        let mut client = MockClient::default();
        client.push_body(json!({ "access_token": "abc", "token_type": "bearer" }));
        client.push_response(&user("admin@example.com"));
        let store = MemoryTokenStore::default();
        let mut session = Session::new(store.clone());

        let user = session
            .login(&mut client, "admin@example.com", "secret")
            .await
            .unwrap();

        assert_eq!(user.email, "admin@example.com");
        assert!(session.is_authenticated());
        assert_eq!(store.load().unwrap().as_deref(), Some("abc"));
        assert_eq!(client.token().as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn failed_login_records_server_detail() {
        let mut client = MockClient::default();
        client.push_error_response(401, "Incorrect email or password");
        let mut session = Session::new(MemoryTokenStore::default());

        let err = session
            .login(&mut client, "admin@example.com", "wrong")
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::Login(_)), "{err:?}");
        assert_eq!(session.error(), Some("Incorrect email or password"));
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn invalid_stored_token_signs_out_silently() {
        let mut client = MockClient::default();
        client.push_error_response(401, "Could not validate credentials");
        let store = MemoryTokenStore::with_token("expired");
        let mut session = Session::new(store.clone());

        let authenticated = session.init(&mut client).await.unwrap();

        assert!(!authenticated);
        assert_eq!(session.token(), None);
        assert_eq!(session.error(), None);
        assert_eq!(store.load().unwrap(), None);
        assert_eq!(client.token(), None);
    }

    #[tokio::test]
    async fn init_without_stored_token_makes_no_request() {
        let mut client = MockClient::default();
        let mut session = Session::new(MemoryTokenStore::default());

        assert!(!session.init(&mut client).await.unwrap());
        assert_eq!(session.fetch_user(&mut client).await, None);
    }

    #[test]
    fn file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::in_dir(dir.path().join("data"));

        assert_eq!(store.load().unwrap(), None);
        store.store("abc").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("abc"));
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        // clearing twice is fine
        store.clear().unwrap();
    }
}
