//! Credential provider capability
//!
//! The platform API that creates and asserts public-key credentials is
//! consumed only through this trait.

use async_trait::async_trait;

use crate::passkey::errors::ProviderError;
use crate::passkey::types::{CreationOptions, PublicKeyCredential, RequestOptions};

/// Creates and asserts public-key credentials on behalf of the user
///
/// Both operations may suspend while the user answers a biometric or PIN
/// prompt. `Ok(None)` means the provider completed without producing a
/// credential.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Create a new credential
    ///
    /// # Errors
    /// Returns an error if the user cancels, the prompt times out, or the
    /// authenticator fails.
    async fn create(
        &self,
        options: &CreationOptions,
    ) -> Result<Option<PublicKeyCredential>, ProviderError>;

    /// Assert one of the credentials listed in `options.allow_credentials`
    ///
    /// # Errors
    /// Returns an error if the user cancels, the prompt times out, the
    /// credential is unknown, or verification fails.
    async fn get(&self, options: &RequestOptions)
        -> Result<Option<PublicKeyCredential>, ProviderError>;
}
