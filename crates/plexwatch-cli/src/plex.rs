use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde::Deserialize;
use tracing::{debug, info};

use plexwatch_core::prelude::*;

const TOKEN_HEADER: &str = "X-Plex-Token";

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(rename = "MediaContainer")]
    media_container: T,
}

#[derive(Debug, Deserialize)]
struct IdentityContainer {
    #[serde(default)]
    version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SectionsContainer {
    #[serde(rename = "Directory", default)]
    directories: Vec<PlexDirectory>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
struct PlexDirectory {
    key: String,
    title: String,
    #[serde(default)]
    refreshing: bool,
    #[serde(rename = "Location", default)]
    locations: Vec<PlexLocation>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
struct PlexLocation {
    path: String,
}

impl From<&PlexDirectory> for SectionListing {
    fn from(value: &PlexDirectory) -> Self {
        SectionListing::new(
            value.title.clone(),
            value.locations.iter().map(|location| location.path.clone()),
        )
    }
}

fn parse_sections(body: &str) -> Result<Vec<PlexDirectory>> {
    let envelope: Envelope<SectionsContainer> = serde_json::from_str(body)
        .map_err(|err| WatchdogError::Remote(format!("unexpected section listing: {err}")))?;
    Ok(envelope.media_container.directories)
}

fn parse_version(body: &str) -> Result<Option<String>> {
    let envelope: Envelope<IdentityContainer> = serde_json::from_str(body)
        .map_err(|err| WatchdogError::Connection(format!("unexpected identity response: {err}")))?;
    Ok(envelope.media_container.version)
}

/// Plex Media Server over its HTTP API.
pub struct PlexClient {
    http: reqwest::Client,
    base_url: String,
    /// Section title to Plex section key, refreshed on every listing.
    keys: RwLock<HashMap<String, String>>,
}

impl std::fmt::Debug for PlexClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlexClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl PlexClient {
    pub fn new(credentials: &ServerCredentials) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let token = HeaderValue::from_str(&credentials.token)
            .map_err(|err| WatchdogError::Connection(format!("invalid token: {err}")))?;
        headers.insert(TOKEN_HEADER, token);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|err| WatchdogError::Connection(err.to_string()))?;

        Ok(Self {
            http,
            base_url: credentials.host.trim_end_matches('/').to_owned(),
            keys: RwLock::new(HashMap::new()),
        })
    }

    /// Builds the client and checks that the server answers with the token.
    pub async fn connect(credentials: &ServerCredentials) -> Result<Self> {
        let client = Self::new(credentials)?;
        let body = client
            .get_text("/identity", &[])
            .await
            .map_err(|err| WatchdogError::Connection(err.to_string()))?;
        info!("Connected to Plex server");
        if let Some(version) = parse_version(&body)? {
            info!("Plex version: {}", version);
        }
        Ok(client)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_text(&self, path: &str, query: &[(&str, &str)]) -> Result<String> {
        let response = self
            .http
            .get(self.url(path))
            .query(query)
            .send()
            .await
            .map_err(|err| WatchdogError::Remote(err.to_string()))?
            .error_for_status()
            .map_err(|err| WatchdogError::Remote(err.to_string()))?;
        response
            .text()
            .await
            .map_err(|err| WatchdogError::Remote(err.to_string()))
    }

    async fn directories(&self) -> Result<Vec<PlexDirectory>> {
        let body = self.get_text("/library/sections", &[]).await?;
        let directories = parse_sections(&body)?;
        let mut keys = self.keys.write();
        keys.clear();
        keys.extend(
            directories
                .iter()
                .map(|directory| (directory.title.clone(), directory.key.clone())),
        );
        Ok(directories)
    }

    async fn section_key(&self, section_title: &str) -> Result<String> {
        let cached = self.keys.read().get(section_title).cloned();
        if let Some(key) = cached {
            return Ok(key);
        }
        self.directories()
            .await?
            .into_iter()
            .find(|directory| directory.title == section_title)
            .map(|directory| directory.key)
            .ok_or_else(|| WatchdogError::UnknownSection(section_title.to_owned()))
    }
}

#[async_trait]
impl MediaServer for PlexClient {
    async fn sections(&self) -> Result<Vec<SectionListing>> {
        let directories = self.directories().await?;
        Ok(directories.iter().map(SectionListing::from).collect())
    }

    async fn is_refreshing(&self, section_title: &str) -> Result<bool> {
        self.directories()
            .await?
            .into_iter()
            .find(|directory| directory.title == section_title)
            .map(|directory| directory.refreshing)
            .ok_or_else(|| WatchdogError::UnknownSection(section_title.to_owned()))
    }

    async fn scan_path(&self, section_title: &str, scannable_path: &str) -> Result<()> {
        let key = self.section_key(section_title).await?;
        debug!("refreshing section {} ({}) at {}", section_title, key, scannable_path);
        self.get_text(
            &format!("/library/sections/{key}/refresh"),
            &[("path", scannable_path)],
        )
        .await
        .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECTIONS: &str = r#"{
        "MediaContainer": {
            "size": 2,
            "Directory": [
                {
                    "key": "1",
                    "title": "Movies",
                    "type": "movie",
                    "refreshing": true,
                    "Location": [
                        { "id": 1, "path": "/mnt/media/Movies" },
                        { "id": 4, "path": "/mnt/media/Extra" }
                    ]
                },
                {
                    "key": "2",
                    "title": "TV Shows",
                    "type": "show",
                    "Location": [{ "id": 2, "path": "D:\\TV Shows" }]
                }
            ]
        }
    }"#;

    #[test]
    fn parses_section_listing() {
        let directories = parse_sections(SECTIONS).expect("parse");
        assert_eq!(directories.len(), 2);
        assert!(directories[0].refreshing);
        assert!(!directories[1].refreshing);

        let listing: Vec<SectionListing> = directories.iter().map(SectionListing::from).collect();
        assert_eq!(
            listing,
            vec![
                SectionListing::new("Movies", ["/mnt/media/Movies", "/mnt/media/Extra"]),
                SectionListing::new("TV Shows", [r"D:\TV Shows"]),
            ]
        );
    }

    #[test]
    fn empty_container_has_no_sections() {
        let directories = parse_sections(r#"{"MediaContainer": {"size": 0}}"#).expect("parse");
        assert!(directories.is_empty());
    }

    #[test]
    fn malformed_listing_is_remote_error() {
        let err = parse_sections("<MediaContainer/>").expect_err("should fail");
        assert!(matches!(err, WatchdogError::Remote(_)));
    }

    #[test]
    fn parses_identity_version() {
        let version = parse_version(r#"{"MediaContainer": {"version": "1.40.2.8395"}}"#)
            .expect("parse");
        assert_eq!(version.as_deref(), Some("1.40.2.8395"));
    }

    #[test]
    fn host_trailing_slash_is_trimmed() {
        let client = PlexClient::new(&ServerCredentials {
            host: "http://localhost:32400/".into(),
            token: "token".into(),
        })
        .expect("client");
        assert_eq!(
            client.url("/library/sections"),
            "http://localhost:32400/library/sections"
        );
    }
}
