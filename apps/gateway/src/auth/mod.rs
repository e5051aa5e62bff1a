pub mod claims;
pub mod credentials;
pub mod error;
pub mod google;
pub mod oauth_bridge;
pub mod pkce;
pub mod token;

pub use claims::{Credentials, Identity, ProviderProfile, TokenClaims};
pub use credentials::CredentialExchange;
pub use error::{AuthError, DecodeReason};
pub use google::GoogleClient;
pub use oauth_bridge::OAuthBridge;
pub use token::TokenDecoder;
