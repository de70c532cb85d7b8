use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::matcher::{PathMatch, match_path};
use crate::remote::SectionListing;

/// A root directory the media server knows for a section, keyed by its final
/// component.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FolderMapping {
    pub leaf_folder_name: String,
    pub root_path: PathBuf,
}

impl FolderMapping {
    pub fn new(root: &str) -> Self {
        Self {
            leaf_folder_name: leaf_name(root).to_owned(),
            root_path: PathBuf::from(root),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LibrarySection {
    pub title: String,
    pub mappings: Vec<FolderMapping>,
}

/// Section title to folder mappings, in the order the server listed them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LibraryTopology {
    sections: Vec<LibrarySection>,
}

impl LibraryTopology {
    pub fn build(listing: &[SectionListing]) -> Self {
        let mut topology = Self::default();
        for section in listing {
            let index = match topology.position(&section.title) {
                Some(index) => index,
                None => {
                    topology.sections.push(LibrarySection {
                        title: section.title.clone(),
                        mappings: Vec::new(),
                    });
                    topology.sections.len() - 1
                }
            };
            topology.sections[index]
                .mappings
                .extend(section.locations.iter().map(|root| FolderMapping::new(root)));
        }
        topology
    }

    fn position(&self, title: &str) -> Option<usize> {
        self.sections.iter().position(|section| section.title == title)
    }

    pub fn sections(&self) -> &[LibrarySection] {
        &self.sections
    }

    pub fn mappings(&self, title: &str) -> Option<&[FolderMapping]> {
        self.position(title)
            .map(|index| self.sections[index].mappings.as_slice())
    }

    pub fn canonical_root(&self, title: &str) -> Option<&Path> {
        self.mappings(title)?
            .first()
            .map(|mapping| mapping.root_path.as_path())
    }

    pub fn mapping_count(&self) -> usize {
        self.sections.iter().map(|section| section.mappings.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping_count() == 0
    }

    pub fn library_paths(&self) -> BTreeSet<PathBuf> {
        self.sections
            .iter()
            .flat_map(|section| section.mappings.iter())
            .map(|mapping| mapping.root_path.clone())
            .collect()
    }

    pub fn find_sections(&self, path: &Path) -> Vec<PathMatch> {
        match_path(self, path)
    }
}

/// Final non-empty component of a remote path. Both separators are accepted
/// since the server may not share the local platform's conventions.
pub fn leaf_name(root: &str) -> &str {
    root.rsplit(|c| c == '/' || c == '\\')
        .find(|part| !part.is_empty())
        .unwrap_or("")
}
