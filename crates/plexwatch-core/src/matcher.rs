use std::ffi::OsStr;
use std::fmt;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::queue::ScanRequest;
use crate::topology::LibraryTopology;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct PathMatch {
    pub section_title: String,
    pub subpath: PathBuf,
}

impl From<PathMatch> for ScanRequest {
    fn from(value: PathMatch) -> Self {
        ScanRequest::new(value.section_title, value.subpath)
    }
}

impl fmt::Display for PathMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: '{}'", self.section_title, self.subpath.display())
    }
}

/// Every (section, subpath) the local path can be reported as.
///
/// Matching is lexical on path components: the local mount prefix and the
/// server's root prefix may differ, so only the suffix starting at a root's
/// leaf folder name is compared. The path is never resolved against the
/// filesystem. An empty result means the path is unmappable.
pub fn match_path(topology: &LibraryTopology, path: &Path) -> Vec<PathMatch> {
    let components: Vec<Component<'_>> = path.components().collect();
    let mut matches = Vec::new();

    for section in topology.sections() {
        for mapping in &section.mappings {
            if mapping.leaf_folder_name.is_empty() {
                continue;
            }
            let leaf = Component::Normal(OsStr::new(&mapping.leaf_folder_name));
            let position = components.iter().position(|component| *component == leaf);
            if let Some(index) = position {
                matches.push(PathMatch {
                    section_title: section.title.clone(),
                    subpath: subpath_after(&components[index + 1..]),
                });
            }
        }
    }

    matches
}

fn subpath_after(rest: &[Component<'_>]) -> PathBuf {
    if rest.is_empty() {
        return PathBuf::from(".");
    }
    rest.iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::SectionListing;

    fn topology() -> LibraryTopology {
        LibraryTopology::build(&[
            SectionListing::new("Movies", ["/mnt/media/Movies", "/mnt/media/Extra"]),
            SectionListing::new("TV Shows", ["D:/TV Shows"]),
            SectionListing::new("Kids", ["/volume2/Movies"]),
        ])
    }

    #[test]
    fn subpath_follows_leaf_folder() {
        let matches = match_path(
            &LibraryTopology::build(&[SectionListing::new("Movies", ["/mnt/media/Movies"])]),
            Path::new("/srv/nfs/Movies/Comedy/file.mkv"),
        );
        assert_eq!(
            matches,
            vec![PathMatch {
                section_title: "Movies".into(),
                subpath: PathBuf::from("Comedy/file.mkv"),
            }]
        );
    }

    #[test]
    fn leaf_as_last_component_yields_current_dir() {
        let matches = topology().find_sections(Path::new("/net/share/Extra"));
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].section_title, "Movies");
        assert_eq!(matches[0].subpath, PathBuf::from("."));
    }

    #[test]
    fn shared_leaf_matches_every_section() {
        let matches = topology().find_sections(Path::new("/nfs/Movies/Action"));
        let titles: Vec<_> = matches.iter().map(|m| m.section_title.as_str()).collect();
        assert_eq!(titles, ["Movies", "Kids"]);
        assert!(matches.iter().all(|m| m.subpath == Path::new("Action")));
    }

    #[test]
    fn leaf_with_spaces_matches() {
        let matches = topology().find_sections(Path::new("/mnt/nas/TV Shows/Show/Season 1"));
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].subpath, PathBuf::from("Show/Season 1"));
    }

    #[test]
    fn first_occurrence_of_leaf_wins() {
        let matches = topology().find_sections(Path::new("/a/Extra/b/Extra/c"));
        assert_eq!(matches[0].subpath, PathBuf::from("b/Extra/c"));
    }

    #[test]
    fn unknown_path_is_unmappable() {
        assert!(topology().find_sections(Path::new("/home/user/Downloads/file.mkv")).is_empty());
    }

    #[test]
    fn partial_component_does_not_match() {
        assert!(topology().find_sections(Path::new("/srv/MoviesOld/file.mkv")).is_empty());
    }
}
