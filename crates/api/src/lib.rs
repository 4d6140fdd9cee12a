//! Google Slides REST backend.
//!
//! Provides the credential gate, the remote capability used by the tool
//! (create slide, create shape, insert text, get presentation), and the
//! slide mutator built on top of it.

pub mod client;
pub mod credentials;
pub mod loopback;
pub mod mutator;
pub mod requests;

pub use client::{HttpSlidesClient, SlidesApi};
pub use credentials::{
    AuthorizedUser, ClientSecrets, CredentialProvider, InstalledAppFlow, OAuthFlow,
    TokenFileProvider, PRESENTATIONS_SCOPE,
};
pub use mutator::{SlideMutator, DEFAULT_TEXT_BOX_ID};
