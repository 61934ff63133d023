//! Merge rules: combine the blocks already in the README with the folders
//! found on disk.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use foldertoc_markdown::{Block, split_section};
use foldertoc_shared::{
    AggregateConfig, Folder, FolderLink, ReadmeSection, RegenerateReport, SectionUpdate,
};

/// Merge existing managed blocks with the current folder list.
///
/// Output is all links followed by all sections, each group in first-seen
/// order. Links are unique by directory name. Stray text lines are dropped
/// with a warning. Counts and names of every change are recorded in `report`.
pub fn merge_blocks(
    existing: Vec<Block>,
    folders: &[Folder],
    config: &AggregateConfig,
    report: &mut RegenerateReport,
) -> Vec<Block> {
    let mut links: Vec<FolderLink> = Vec::new();
    let mut sections: Vec<ReadmeSection> = Vec::new();

    for block in existing {
        match block {
            Block::Link(link) => {
                if links.iter().any(|l| l.dir_name == link.dir_name) {
                    debug!(name = %link.dir_name, "dropping duplicate link");
                } else {
                    links.push(link);
                }
            }
            Block::Section(section) => sections.push(section),
            Block::Text(line) => {
                warn!(%line, "unrecognized line in managed region; dropping it");
                report.unrecognized_lines += 1;
            }
        }
    }

    if config.prune {
        prune_missing(&mut links, &mut sections, folders, report);
    }

    for folder in folders {
        if !links.iter().any(|l| l.dir_name == folder.name) {
            debug!(name = %folder.name, "adding link");
            links.push(FolderLink::new(folder.name.clone()));
            report.links_added.push(folder.name.clone());
        }

        if let Some(body) = &folder.readme {
            merge_section(&mut sections, &folder.name, body, config.section_update, report);
        }
    }

    links
        .into_iter()
        .map(Block::Link)
        .chain(sections.into_iter().map(Block::Section))
        .collect()
}

/// The sections a folder's README occupies once written and parsed back.
fn fragments(name: &str, body: &str) -> Vec<ReadmeSection> {
    let section = ReadmeSection::new(name, body);
    let parts = split_section(&section);
    if parts.is_empty() {
        vec![section]
    } else {
        parts
    }
}

/// Length of the run starting at `start` whose headings follow `parts`.
fn run_len(sections: &[ReadmeSection], start: usize, parts: &[ReadmeSection]) -> usize {
    sections[start..]
        .iter()
        .zip(parts)
        .take_while(|(s, p)| s.heading == p.heading)
        .count()
}

fn merge_section(
    sections: &mut Vec<ReadmeSection>,
    name: &str,
    body: &str,
    policy: SectionUpdate,
    report: &mut RegenerateReport,
) {
    let parts = fragments(name, body);
    if sections.windows(parts.len()).any(|w| w == parts.as_slice()) {
        return;
    }

    if policy == SectionUpdate::Refresh {
        if let Some(start) = sections.iter().position(|s| s.heading == name) {
            debug!(%name, "refreshing section body");
            let len = run_len(sections, start, &parts);
            sections.splice(start..start + len, parts);
            report.sections_refreshed.push(name.to_string());
            return;
        }
    }

    debug!(%name, "adding section");
    sections.extend(parts);
    report.sections_added.push(name.to_string());
}

/// Drop links and sections whose folder is no longer listed.
fn prune_missing(
    links: &mut Vec<FolderLink>,
    sections: &mut Vec<ReadmeSection>,
    folders: &[Folder],
    report: &mut RegenerateReport,
) {
    let present: HashSet<&str> = folders.iter().map(|f| f.name.as_str()).collect();
    let readmes: HashMap<&str, &str> = folders
        .iter()
        .filter_map(|f| Some((f.name.as_str(), f.readme.as_deref()?)))
        .collect();
    let mut pruned: Vec<String> = Vec::new();

    // Sections split out of a present folder's README belong to that folder.
    let mut owned = vec![false; sections.len()];
    for (i, section) in sections.iter().enumerate() {
        if let Some(body) = readmes.get(section.heading.as_str()) {
            let parts = fragments(&section.heading, body);
            let len = run_len(sections, i, &parts);
            owned[i..i + len].fill(true);
        }
    }

    links.retain(|l| {
        let keep = present.contains(l.dir_name.as_str());
        if !keep {
            pruned.push(l.dir_name.clone());
        }
        keep
    });
    let mut idx = 0;
    sections.retain(|s| {
        let keep = owned[idx] || present.contains(s.heading.as_str());
        idx += 1;
        if !keep && !pruned.contains(&s.heading) {
            pruned.push(s.heading.clone());
        }
        keep
    });

    for name in &pruned {
        debug!(%name, "pruned entry for missing folder");
    }
    report.pruned.extend(pruned);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn folder(name: &str, readme: Option<&str>) -> Folder {
        Folder {
            name: name.into(),
            readme: readme.map(String::from),
        }
    }

    fn link(name: &str) -> Block {
        Block::Link(FolderLink::new(name))
    }

    fn section(heading: &str, body: &str) -> Block {
        Block::Section(ReadmeSection::new(heading, body))
    }

    fn report() -> RegenerateReport {
        RegenerateReport::new("README.md")
    }

    #[test]
    fn new_folders_get_links_and_sections() {
        let mut rep = report();
        let blocks = merge_blocks(
            vec![],
            &[folder("alpha", Some("Hello")), folder("beta", None)],
            &AggregateConfig::default(),
            &mut rep,
        );
        assert_eq!(
            blocks,
            vec![link("alpha"), link("beta"), section("alpha", "Hello")]
        );
        assert_eq!(rep.links_added, vec!["alpha", "beta"]);
        assert_eq!(rep.sections_added, vec!["alpha"]);
    }

    #[test]
    fn existing_entries_keep_their_order() {
        let mut rep = report();
        let blocks = merge_blocks(
            vec![link("zeta"), link("alpha"), section("zeta", "Z")],
            &[folder("alpha", None), folder("mid", None), folder("zeta", Some("Z"))],
            &AggregateConfig::default(),
            &mut rep,
        );
        assert_eq!(
            blocks,
            vec![link("zeta"), link("alpha"), link("mid"), section("zeta", "Z")]
        );
        assert_eq!(rep.links_added, vec!["mid"]);
        assert!(rep.sections_added.is_empty());
    }

    #[test]
    fn duplicate_links_collapse_to_first() {
        let mut rep = report();
        let blocks = merge_blocks(
            vec![link("a"), link("b"), link("a")],
            &[],
            &AggregateConfig::default(),
            &mut rep,
        );
        assert_eq!(blocks, vec![link("a"), link("b")]);
    }

    #[test]
    fn text_lines_are_counted_and_dropped() {
        let mut rep = report();
        let blocks = merge_blocks(
            vec![Block::Text("hand-written".into()), link("a")],
            &[],
            &AggregateConfig::default(),
            &mut rep,
        );
        assert_eq!(blocks, vec![link("a")]);
        assert_eq!(rep.unrecognized_lines, 1);
    }

    #[test]
    fn refresh_replaces_changed_body_in_place() {
        let mut rep = report();
        let blocks = merge_blocks(
            vec![link("a"), link("b"), section("a", "old"), section("b", "B")],
            &[folder("a", Some("new")), folder("b", Some("B"))],
            &AggregateConfig::default(),
            &mut rep,
        );
        assert_eq!(
            blocks,
            vec![link("a"), link("b"), section("a", "new"), section("b", "B")]
        );
        assert_eq!(rep.sections_refreshed, vec!["a"]);
        assert!(rep.sections_added.is_empty());
    }

    #[test]
    fn append_policy_accumulates_changed_body() {
        let config = AggregateConfig {
            section_update: SectionUpdate::Append,
            ..AggregateConfig::default()
        };
        let mut rep = report();
        let blocks = merge_blocks(
            vec![link("a"), section("a", "old")],
            &[folder("a", Some("new"))],
            &config,
            &mut rep,
        );
        assert_eq!(
            blocks,
            vec![link("a"), section("a", "old"), section("a", "new")]
        );
        assert_eq!(rep.sections_added, vec!["a"]);

        let mut rep = report();
        let again = merge_blocks(blocks.clone(), &[folder("a", Some("new"))], &config, &mut rep);
        assert_eq!(again, blocks);
        assert!(rep.sections_added.is_empty());
    }

    #[test]
    fn stale_entries_survive_without_prune() {
        let mut rep = report();
        let blocks = merge_blocks(
            vec![link("gone"), section("gone", "bye")],
            &[],
            &AggregateConfig::default(),
            &mut rep,
        );
        assert_eq!(blocks, vec![link("gone"), section("gone", "bye")]);
        assert!(rep.pruned.is_empty());
    }

    #[test]
    fn prune_drops_missing_folders() {
        let config = AggregateConfig {
            prune: true,
            ..AggregateConfig::default()
        };
        let mut rep = report();
        let blocks = merge_blocks(
            vec![link("gone"), link("kept"), section("gone", "bye"), section("orphan", "x")],
            &[folder("kept", None)],
            &config,
            &mut rep,
        );
        assert_eq!(blocks, vec![link("kept")]);
        assert_eq!(rep.pruned, vec!["gone", "orphan"]);
    }

    const NESTED: &str = "Intro\n### Setup\n---\nnpm i";

    #[test]
    fn nested_heading_readme_is_merged_once() {
        let folders = [folder("alpha", Some(NESTED))];
        let mut rep = report();
        let blocks = merge_blocks(vec![], &folders, &AggregateConfig::default(), &mut rep);
        assert_eq!(
            blocks,
            vec![link("alpha"), section("alpha", "Intro"), section("Setup", "npm i")]
        );
        assert_eq!(rep.sections_added, vec!["alpha"]);

        for update in [SectionUpdate::Refresh, SectionUpdate::Append] {
            let config = AggregateConfig {
                section_update: update,
                ..AggregateConfig::default()
            };
            let mut rep = report();
            let again = merge_blocks(blocks.clone(), &folders, &config, &mut rep);
            assert_eq!(again, blocks);
            assert!(rep.sections_added.is_empty());
            assert!(rep.sections_refreshed.is_empty());
        }
    }

    #[test]
    fn refresh_replaces_every_nested_part() {
        let mut rep = report();
        let blocks = merge_blocks(
            vec![
                link("alpha"),
                section("alpha", "Intro"),
                section("Setup", "npm i"),
                section("notes", "hand-written"),
            ],
            &[folder("alpha", Some("Intro 2\n### Setup\n---\nnpm ci"))],
            &AggregateConfig::default(),
            &mut rep,
        );
        assert_eq!(
            blocks,
            vec![
                link("alpha"),
                section("alpha", "Intro 2"),
                section("Setup", "npm ci"),
                section("notes", "hand-written"),
            ]
        );
        assert_eq!(rep.sections_refreshed, vec!["alpha"]);
    }

    #[test]
    fn prune_keeps_nested_parts_of_present_folders() {
        let config = AggregateConfig {
            prune: true,
            ..AggregateConfig::default()
        };
        let mut rep = report();
        let existing = vec![
            link("alpha"),
            section("alpha", "Intro"),
            section("Setup", "npm i"),
            section("Setup", "stray"),
        ];
        let blocks = merge_blocks(existing, &[folder("alpha", Some(NESTED))], &config, &mut rep);
        assert_eq!(
            blocks,
            vec![link("alpha"), section("alpha", "Intro"), section("Setup", "npm i")]
        );
        assert_eq!(rep.pruned, vec!["Setup"]);
        assert!(rep.sections_refreshed.is_empty());
    }

    #[test]
    fn headings_compare_case_sensitively() {
        let mut rep = report();
        let blocks = merge_blocks(
            vec![link("Alpha"), section("Alpha", "upper")],
            &[folder("Alpha", Some("upper")), folder("alpha", Some("lower"))],
            &AggregateConfig::default(),
            &mut rep,
        );
        assert_eq!(
            blocks,
            vec![
                link("Alpha"),
                link("alpha"),
                section("Alpha", "upper"),
                section("alpha", "lower"),
            ]
        );
    }
}
