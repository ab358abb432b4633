/// Object-store credentials resolved once at startup.
///
/// Values are redacted in `Debug` output — error messages and logs must
/// reference the env var NAME, never the value.
#[derive(Clone)]
pub struct ResolvedObjectStoreSecrets {
    pub access_key: String,
    pub secret_key: String,
}

impl std::fmt::Debug for ResolvedObjectStoreSecrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedObjectStoreSecrets")
            .field("access_key", &"<REDACTED>")
            .field("secret_key", &"<REDACTED>")
            .finish()
    }
}
