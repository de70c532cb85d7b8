use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One library section as reported by the media server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SectionListing {
    pub title: String,
    pub locations: Vec<String>,
}

impl SectionListing {
    pub fn new(
        title: impl Into<String>,
        locations: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            title: title.into(),
            locations: locations.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
pub trait MediaServer: Send + Sync {
    async fn sections(&self) -> Result<Vec<SectionListing>>;
    async fn is_refreshing(&self, section_title: &str) -> Result<bool>;
    async fn scan_path(&self, section_title: &str, scannable_path: &str) -> Result<()>;
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use mockall::mock;

    mock! {
        pub Server {}

        #[async_trait]
        impl MediaServer for Server {
            async fn sections(&self) -> Result<Vec<SectionListing>>;
            async fn is_refreshing(&self, section_title: &str) -> Result<bool>;
            async fn scan_path(&self, section_title: &str, scannable_path: &str) -> Result<()>;
        }
    }
}
