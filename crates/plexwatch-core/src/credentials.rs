use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::ConfigValidationError;
use crate::error::{Result, WatchdogError};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerCredentials {
    pub host: String,
    pub token: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheDecision {
    Keep,
    Overwrite,
}

/// Asked when credentials given on the command line differ from the cache.
pub trait Confirm {
    fn confirm_overwrite(&self, cached: &ServerCredentials, provided: &ServerCredentials) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&ServerCredentials, &ServerCredentials) -> bool,
{
    fn confirm_overwrite(&self, cached: &ServerCredentials, provided: &ServerCredentials) -> bool {
        self(cached, provided)
    }
}

pub fn decide(
    cached: Option<&ServerCredentials>,
    provided: &ServerCredentials,
    confirm: &dyn Confirm,
) -> CacheDecision {
    match cached {
        None => CacheDecision::Overwrite,
        Some(cached) if cached == provided => CacheDecision::Keep,
        Some(cached) => {
            warn!("Plex host and/or token differ from the cached ones!");
            if confirm.confirm_overwrite(cached, provided) {
                CacheDecision::Overwrite
            } else {
                CacheDecision::Keep
            }
        }
    }
}

/// Picks the credentials to connect with and reports whether the cache must
/// be rewritten.
pub fn resolve_credentials(
    cached: Option<ServerCredentials>,
    provided: Option<ServerCredentials>,
    confirm: &dyn Confirm,
) -> Result<(ServerCredentials, bool)> {
    match (cached, provided) {
        (cached, Some(provided)) => match decide(cached.as_ref(), &provided, confirm) {
            CacheDecision::Overwrite => Ok((provided, true)),
            CacheDecision::Keep => Ok((cached.unwrap_or(provided), false)),
        },
        (Some(cached), None) => Ok((cached, false)),
        (None, None) => Err(ConfigValidationError::MissingCredentials.into()),
    }
}

#[derive(Debug, Clone)]
pub struct CredentialCache {
    path: PathBuf,
}

impl CredentialCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> Result<Option<ServerCredentials>> {
        if !self.path.exists() {
            return Ok(None);
        }
        info!("Found Plex configuration from cache: {}", self.path.display());
        let bytes = fs::read(&self.path)?;
        let credentials = serde_json::from_slice(&bytes).map_err(|err| {
            WatchdogError::Cache(format!("unable to parse {}: {err}", self.path.display()))
        })?;
        Ok(Some(credentials))
    }

    pub fn save(&self, credentials: &ServerCredentials) -> Result<()> {
        info!("Saving Plex configuration to cache: {}", self.path.display());
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let bytes = serde_json::to_vec(credentials)
            .map_err(|err| WatchdogError::Cache(err.to_string()))?;
        fs::write(&self.path, bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds(host: &str, token: &str) -> ServerCredentials {
        ServerCredentials {
            host: host.into(),
            token: token.into(),
        }
    }

    fn never(_: &ServerCredentials, _: &ServerCredentials) -> bool {
        panic!("confirmation should not be requested")
    }

    #[test]
    fn provided_without_cache_is_saved() {
        let provided = creds("http://plex:32400", "abc");
        assert_eq!(decide(None, &provided, &never), CacheDecision::Overwrite);
    }

    #[test]
    fn identical_credentials_are_kept() {
        let provided = creds("http://plex:32400", "abc");
        assert_eq!(
            decide(Some(&provided.clone()), &provided, &never),
            CacheDecision::Keep
        );
    }

    #[test]
    fn differing_credentials_follow_confirmation() {
        let cached = creds("http://plex:32400", "old");
        let provided = creds("http://plex:32400", "new");
        let yes = |_: &ServerCredentials, _: &ServerCredentials| true;
        let no = |_: &ServerCredentials, _: &ServerCredentials| false;
        assert_eq!(decide(Some(&cached), &provided, &yes), CacheDecision::Overwrite);
        assert_eq!(decide(Some(&cached), &provided, &no), CacheDecision::Keep);
    }

    #[test]
    fn resolve_keeps_cache_when_declined() {
        let no = |_: &ServerCredentials, _: &ServerCredentials| false;
        let (chosen, save) = resolve_credentials(
            Some(creds("http://a", "old")),
            Some(creds("http://b", "new")),
            &no,
        )
        .expect("resolve");
        assert_eq!(chosen, creds("http://a", "old"));
        assert!(!save);
    }

    #[test]
    fn resolve_without_any_credentials_fails() {
        let err = resolve_credentials(None, None, &never).expect_err("should fail");
        assert!(matches!(
            err,
            WatchdogError::Config(ConfigValidationError::MissingCredentials)
        ));
    }

    #[test]
    fn cache_roundtrip_creates_parent_dirs() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = CredentialCache::new(dir.path().join("nested").join("credentials.json"));
        assert_eq!(cache.load().expect("load"), None);

        let stored = creds("http://localhost:32400", "token");
        cache.save(&stored).expect("save");
        assert_eq!(cache.load().expect("load"), Some(stored));
    }

    #[test]
    fn corrupt_cache_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("credentials.json");
        fs::write(&path, b"not json").expect("write");
        let err = CredentialCache::new(path).load().expect_err("should fail");
        assert!(matches!(err, WatchdogError::Cache(_)));
    }
}
