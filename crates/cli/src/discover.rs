use crate::loading::LoadKind;
use crate::session::Session;
use locview_protocol::{EntryNode, QueryRequest, StoryListing, TextSlot, TreeNode};
use locview_tree::TreeBuilder;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const GAME_DIR_NAMES: [&str; 1] = ["UmamusumePrettyDerby"];
const DATA_DIR: &str = "UmamusumePrettyDerby_Jpn_Data";
const MAIN_STORY_QUERY: &str =
    "SELECT story_id_1, part_id, story_number, id FROM main_story_data WHERE story_id_1 > 0 LIMIT 200";

/// Steam library roots under `home` (native and Flatpak installs).
pub fn steam_roots(home: &Path) -> Vec<PathBuf> {
    vec![
        home.join(".steam/steam"),
        home.join(".local/share/Steam"),
        home.join(".var/app/com.valvesoftware.Steam/data/Steam"),
    ]
}

/// First game install found under the given Steam roots.
pub fn find_game_install_in(roots: &[PathBuf]) -> Option<PathBuf> {
    roots
        .iter()
        .map(|root| root.join("steamapps").join("common"))
        .filter(|apps| apps.is_dir())
        .flat_map(|apps| GAME_DIR_NAMES.into_iter().map(move |name| apps.join(name)))
        .find(|candidate| candidate.exists())
}

pub fn find_game_install_path() -> Option<PathBuf> {
    let home = dirs::home_dir()?;
    find_game_install_in(&steam_roots(&home))
}

fn has_master(dir: &Path) -> bool {
    dir.join("master").join("master.mdb").is_file()
}

/// Directory holding story data for a game path.
///
/// Accepts the `Persistent` directory itself, the game root, or an extracted
/// tree with `.../story/data`.
pub fn find_story_data_dir(game_path: &Path) -> Option<PathBuf> {
    if has_master(game_path) {
        return Some(game_path.to_path_buf());
    }

    let persistent = game_path.join(DATA_DIR).join("Persistent");
    if has_master(&persistent) {
        return Some(persistent);
    }

    let extracted = persistent
        .join("assets")
        .join("_gallopresources")
        .join("bundle")
        .join("resources")
        .join("story")
        .join("data");
    extracted.is_dir().then_some(extracted)
}

/// Extracted `storytimeline_*.json` files at least two directories deep.
pub fn scan_extracted_stories(base: &Path) -> Vec<StoryListing> {
    WalkDir::new(base)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                log::debug!("Skipping unreadable path: {err}");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| {
            let file_name = entry.file_name().to_str()?;
            let id = file_name
                .strip_prefix("storytimeline_")?
                .strip_suffix(".json")?
                .to_string();
            let rel = entry.path().strip_prefix(base).ok()?;
            let parts: Vec<String> = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            if parts.len() < 3 {
                return None;
            }
            Some(StoryListing {
                id,
                path: entry.path().to_string_lossy().into_owned(),
                rel_path: parts.join("/"),
                category: parts[0].clone(),
                group: parts[1].clone(),
            })
        })
        .collect()
}

fn main_story_listing(row: &[locview_protocol::Scalar]) -> Option<StoryListing> {
    let [story_id, part_id, _story_number, episode_id, ..] = row else {
        return None;
    };
    let id = story_id.to_string();
    Some(StoryListing {
        path: format!("native://{id}"),
        rel_path: format!("Main/Part{part_id}/Ep{episode_id}"),
        category: "Main".to_string(),
        group: format!("Part {part_id}"),
        id,
    })
}

/// Group listings by `{category}/{group}`, keeping listing order.
///
/// A story id already present in its group is skipped, so the first listing
/// of an id wins (database rows come before extracted files).
pub fn story_tree(listings: &[StoryListing]) -> Vec<TreeNode> {
    let mut builder = TreeBuilder::new();
    let mut seen = HashSet::new();
    for story in listings {
        let key = format!("{}/{}", story.category, story.group);
        if !seen.insert((key.clone(), story.id.as_str())) {
            log::debug!("Skipping duplicate story {} in {key}", story.id);
            continue;
        }
        let entry = EntryNode::new(
            story.id.clone(),
            story.rel_path.clone(),
            vec![TextSlot {
                content: story.path.clone(),
                multiline: false,
            }],
        );
        builder.push(&key, str::to_string, entry);
    }
    builder.finish()
}

impl Session {
    /// Stories from the master database plus any extracted timeline files.
    ///
    /// A failed database query is logged and the file scan still runs.
    pub async fn list_stories(&self, story_base_dir: &Path) -> Vec<StoryListing> {
        let _loading = self.begin(LoadKind::Discovery);
        let mut stories = Vec::new();

        let master = story_base_dir.join("master").join("master.mdb");
        if master.is_file() {
            let request = QueryRequest {
                store_path: master.to_string_lossy().into_owned(),
                query: MAIN_STORY_QUERY.to_string(),
                key: String::new(),
            };
            match self.query.query(&request).await {
                Ok(result) => stories.extend(
                    result
                        .rows
                        .iter()
                        .filter_map(|row| main_story_listing(row)),
                ),
                Err(err) => log::warn!("Failed to query {}: {err}", master.display()),
            }
        }

        stories.extend(scan_extracted_stories(story_base_dir));
        log::info!("Found {} stories under {}", stories.len(), story_base_dir.display());
        stories
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use locview_protocol::Scalar;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn finds_install_under_first_matching_root() {
        let temp = tempdir().unwrap();
        let roots = steam_roots(temp.path());
        assert_eq!(find_game_install_in(&roots), None);

        let game = roots[1].join("steamapps/common/UmamusumePrettyDerby");
        fs::create_dir_all(&game).unwrap();
        assert_eq!(find_game_install_in(&roots), Some(game));
    }

    #[test]
    fn story_dir_prefers_native_layout() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        assert_eq!(find_story_data_dir(root), None);

        let extracted = root.join(
            "UmamusumePrettyDerby_Jpn_Data/Persistent/assets/_gallopresources/bundle/resources/story/data",
        );
        fs::create_dir_all(&extracted).unwrap();
        assert_eq!(find_story_data_dir(root), Some(extracted));

        let persistent = root.join("UmamusumePrettyDerby_Jpn_Data/Persistent");
        fs::create_dir_all(persistent.join("master")).unwrap();
        fs::write(persistent.join("master/master.mdb"), b"").unwrap();
        assert_eq!(find_story_data_dir(root), Some(persistent.clone()));
        assert_eq!(find_story_data_dir(&persistent), Some(persistent));
    }

    #[test]
    fn scans_extracted_timelines_two_levels_deep() {
        let temp = tempdir().unwrap();
        let base = temp.path();
        fs::create_dir_all(base.join("02/0001")).unwrap();
        fs::write(base.join("02/0001/storytimeline_020001001.json"), "{}").unwrap();
        fs::write(base.join("02/0001/notes.json"), "{}").unwrap();
        fs::write(base.join("storytimeline_shallow.json"), "{}").unwrap();

        let stories = scan_extracted_stories(base);
        assert_eq!(stories.len(), 1);
        assert_eq!(stories[0].id, "020001001");
        assert_eq!(stories[0].rel_path, "02/0001/storytimeline_020001001.json");
        assert_eq!((stories[0].category.as_str(), stories[0].group.as_str()), ("02", "0001"));
    }

    #[test]
    fn main_story_rows_and_tree() {
        let row = vec![Scalar::Int(20001004), Scalar::Int(1), Scalar::Int(4), Scalar::Int(104)];
        let listing = main_story_listing(&row).unwrap();
        assert_eq!(listing.rel_path, "Main/Part1/Ep104");
        assert_eq!(listing.path, "native://20001004");
        assert!(main_story_listing(&row[..2]).is_none());

        let mut next = listing.clone();
        next.id = "20001005".to_string();
        let tree = story_tree(&[listing.clone(), next, listing]);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].id(), "Main/Part 1");

        let children = &tree[0].as_category().unwrap().children;
        let ids: Vec<_> = children.iter().map(|entry| entry.id.as_str()).collect();
        assert_eq!(ids, vec!["20001004", "20001005"]);
        assert!(children[1].next.is_none());
    }
}
