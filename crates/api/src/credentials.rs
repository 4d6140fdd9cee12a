//! OAuth credentials for the Slides API.
//!
//! The token file uses the authorized-user layout written by Google's client
//! libraries, so an existing `token.json` keeps working. When the stored token
//! is missing or unusable the installed-app flow runs: a loopback listener
//! receives the authorization code after the user consents in a browser.

use crate::loopback::CallbackListener;
use chrono::{DateTime, Duration, Utc};
use reqwest::blocking::Client;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use slides_core::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration as StdDuration;
use uuid::Uuid;

/// Read/write access to presentations.
pub const PRESENTATIONS_SCOPE: &str = "https://www.googleapis.com/auth/presentations";

const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Tokens this close to expiry are treated as expired.
const EXPIRY_SKEW_SECS: i64 = 60;

/// How long to wait for the user to finish consenting in the browser.
const DEFAULT_CALLBACK_TIMEOUT: StdDuration = StdDuration::from_secs(300);

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

fn default_auth_uri() -> String {
    DEFAULT_AUTH_URI.to_string()
}

/// A persisted authorized-user credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorizedUser {
    /// Current access token.
    #[serde(default)]
    pub token: Option<String>,

    #[serde(default)]
    pub refresh_token: Option<String>,

    #[serde(default = "default_token_uri")]
    pub token_uri: String,

    pub client_id: String,
    pub client_secret: String,

    #[serde(default)]
    pub scopes: Vec<String>,

    /// When `token` stops being accepted. Unknown expiry counts as not expired.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

impl AuthorizedUser {
    /// Load a credential from a token file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            Error::Credentials(format!("Malformed token file {}: {}", path.display(), e))
        })
    }

    /// Write the credential to a token file, replacing it.
    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, serde_json::to_string(self)?)?;
        Ok(())
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry
            .is_some_and(|expiry| now + Duration::seconds(EXPIRY_SKEW_SECS) >= expiry)
    }

    /// Whether the access token can be used as is.
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        self.token.is_some() && !self.is_expired(now)
    }

    /// Whether every requested scope was granted.
    pub fn has_scopes(&self, scopes: &[String]) -> bool {
        scopes.iter().all(|s| self.scopes.contains(s))
    }

    /// The access token, or an error if there is none.
    pub fn access_token(&self) -> Result<&str> {
        self.token
            .as_deref()
            .ok_or_else(|| Error::Credentials("Credential has no access token".into()))
    }

    /// Merge a token endpoint response into this credential.
    ///
    /// The refresh token and scopes are kept when the response omits them.
    fn apply(&mut self, response: TokenResponse, now: DateTime<Utc>) {
        self.token = Some(response.access_token);
        self.expiry = response.expires_in.map(|secs| now + Duration::seconds(secs));
        if let Some(refresh_token) = response.refresh_token {
            self.refresh_token = Some(refresh_token);
        }
        if let Some(scope) = response.scope {
            self.scopes = scope.split_whitespace().map(str::to_string).collect();
        }
    }
}

/// OAuth client registration, read from a client secret file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,

    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,

    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

#[derive(Debug, Deserialize)]
struct ClientSecretsFile {
    installed: Option<ClientSecrets>,
    web: Option<ClientSecrets>,
}

impl ClientSecrets {
    /// Load an `installed` (or `web`) client registration.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let file: ClientSecretsFile = serde_json::from_str(&content).map_err(|e| {
            Error::Credentials(format!("Malformed client secret file {}: {}", path.display(), e))
        })?;

        file.installed.or(file.web).ok_or_else(|| {
            Error::Credentials(format!(
                "Client secret file {} has neither an 'installed' nor a 'web' section",
                path.display()
            ))
        })
    }
}

/// Token endpoint response.
#[derive(Debug, Clone, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    scope: Option<String>,
}

/// Something that hands out a usable credential.
pub trait CredentialProvider {
    /// Return a valid credential, refreshing or re-authorizing as needed.
    fn load_or_refresh_credentials(&self) -> Result<AuthorizedUser>;
}

/// The two ways of obtaining a fresh access token.
pub trait OAuthFlow {
    /// Exchange the refresh token for a new access token.
    fn refresh(&self, credentials: &AuthorizedUser) -> Result<AuthorizedUser>;

    /// Ask the user to grant `scopes` and return the issued credential.
    fn authorize(&self, scopes: &[String]) -> Result<AuthorizedUser>;
}

/// Credential cache backed by a token file.
#[derive(Debug, Clone)]
pub struct TokenFileProvider<F> {
    token_path: PathBuf,
    scopes: Vec<String>,
    flow: F,
}

impl<F: OAuthFlow> TokenFileProvider<F> {
    /// Create a provider for `token_path` requesting the presentations scope.
    pub fn new(token_path: impl Into<PathBuf>, flow: F) -> Self {
        Self {
            token_path: token_path.into(),
            scopes: vec![PRESENTATIONS_SCOPE.to_string()],
            flow,
        }
    }

    /// Request a different set of scopes.
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    fn load(&self) -> Result<Option<AuthorizedUser>> {
        if !self.token_path.exists() {
            log::debug!("No token file at {}", self.token_path.display());
            return Ok(None);
        }
        AuthorizedUser::from_file(&self.token_path).map(Some)
    }
}

impl<F: OAuthFlow> CredentialProvider for TokenFileProvider<F> {
    fn load_or_refresh_credentials(&self) -> Result<AuthorizedUser> {
        let now = Utc::now();

        let credentials = match self.load()? {
            Some(creds) if creds.is_valid(now) && creds.has_scopes(&self.scopes) => {
                log::debug!("Using cached token from {}", self.token_path.display());
                return Ok(creds);
            }
            Some(creds) if creds.refresh_token.is_some() && creds.has_scopes(&self.scopes) => {
                log::info!("Access token expired, refreshing");
                self.flow.refresh(&creds)?
            }
            Some(_) => {
                log::info!("Stored credential cannot be refreshed, re-authorizing");
                self.flow.authorize(&self.scopes)?
            }
            None => self.flow.authorize(&self.scopes)?,
        };

        credentials.save(&self.token_path)?;
        log::info!("Saved credential to {}", self.token_path.display());
        Ok(credentials)
    }
}

/// Installed-application OAuth flow against Google's endpoints.
#[derive(Debug, Clone)]
pub struct InstalledAppFlow {
    client_secrets_path: PathBuf,
    client: Client,
    open_browser: bool,
    callback_timeout: StdDuration,
}

impl InstalledAppFlow {
    /// Create a flow; the client secret file is only read if consent is needed.
    pub fn new(client_secrets_path: impl Into<PathBuf>) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| Error::Authorization(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client_secrets_path: client_secrets_path.into(),
            client,
            open_browser: true,
            callback_timeout: DEFAULT_CALLBACK_TIMEOUT,
        })
    }

    /// Set whether to launch a browser for the consent page.
    pub fn with_open_browser(mut self, open_browser: bool) -> Self {
        self.open_browser = open_browser;
        self
    }

    /// Set how long to wait for the browser redirect.
    pub fn with_callback_timeout(mut self, timeout: StdDuration) -> Self {
        self.callback_timeout = timeout;
        self
    }

    fn request_token(&self, token_uri: &str, params: &[(&str, &str)]) -> Result<TokenResponse> {
        let response = self
            .client
            .post(token_uri)
            .form(params)
            .send()
            .map_err(|e| Error::Authorization(format!("Token request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| Error::Authorization(format!("Failed to read token response: {}", e)))?;

        if !status.is_success() {
            return Err(Error::Authorization(format!(
                "Token endpoint returned {}: {}",
                status,
                body.trim()
            )));
        }

        serde_json::from_str(&body)
            .map_err(|e| Error::Authorization(format!("Malformed token response: {}", e)))
    }
}

impl OAuthFlow for InstalledAppFlow {
    fn refresh(&self, credentials: &AuthorizedUser) -> Result<AuthorizedUser> {
        let refresh_token = credentials
            .refresh_token
            .as_deref()
            .ok_or_else(|| Error::Credentials("Credential has no refresh token".into()))?;

        let response = self.request_token(
            &credentials.token_uri,
            &[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
                ("client_id", &credentials.client_id),
                ("client_secret", &credentials.client_secret),
            ],
        )?;

        let mut refreshed = credentials.clone();
        refreshed.apply(response, Utc::now());
        Ok(refreshed)
    }

    fn authorize(&self, scopes: &[String]) -> Result<AuthorizedUser> {
        let secrets = ClientSecrets::from_file(&self.client_secrets_path)?;

        let listener = CallbackListener::bind(self.callback_timeout)?;
        let redirect_uri = listener.redirect_uri()?;
        let state = Uuid::new_v4().simple().to_string();
        let url = authorization_url(&secrets, &redirect_uri, scopes, &state)?;

        println!("Please visit this URL to authorize this application: {}", url);
        if self.open_browser {
            if let Err(e) = open::that(url.as_str()) {
                log::warn!("Could not open a browser: {}", e);
            }
        }

        let code = listener.wait_for_code(&state)?;
        log::debug!("Received authorization code, exchanging for tokens");

        let response = self.request_token(
            &secrets.token_uri,
            &[
                ("grant_type", "authorization_code"),
                ("code", &code),
                ("redirect_uri", &redirect_uri),
                ("client_id", &secrets.client_id),
                ("client_secret", &secrets.client_secret),
            ],
        )?;

        let mut credentials = AuthorizedUser {
            token: None,
            refresh_token: None,
            token_uri: secrets.token_uri,
            client_id: secrets.client_id,
            client_secret: secrets.client_secret,
            scopes: scopes.to_vec(),
            expiry: None,
        };
        credentials.apply(response, Utc::now());
        Ok(credentials)
    }
}

/// Build the consent page URL.
fn authorization_url(
    secrets: &ClientSecrets,
    redirect_uri: &str,
    scopes: &[String],
    state: &str,
) -> Result<Url> {
    Url::parse_with_params(
        &secrets.auth_uri,
        &[
            ("response_type", "code"),
            ("client_id", secrets.client_id.as_str()),
            ("redirect_uri", redirect_uri),
            ("scope", scopes.join(" ").as_str()),
            ("state", state),
            ("access_type", "offline"),
            ("prompt", "consent"),
        ],
    )
    .map_err(|e| Error::Credentials(format!("Invalid auth_uri '{}': {}", secrets.auth_uri, e)))
}
