//! Enumeration of the paths handed to the cache save
//!
//! Paths use the glob conventions of the cache backend: a leading `!`
//! excludes a path that an earlier entry included.

/// Build the ordered list of cached paths
///
/// The cache root comes first, followed by exclusions for its scratch
/// subdirectories, then any extra paths supplied by the workflow.
pub fn cached_paths(root: &str, exclude_subdirs: &[String], additional: &[String]) -> Vec<String> {
    let trimmed = root.trim();
    let stripped = trimmed.trim_end_matches(['/', '\\']);
    // A filesystem root stays a root
    let root = if stripped.is_empty() && !trimmed.is_empty() {
        &trimmed[..1]
    } else {
        stripped
    };
    let separator = if root.ends_with(['/', '\\']) { "" } else { "/" };

    let mut paths = Vec::with_capacity(1 + exclude_subdirs.len() + additional.len());
    paths.push(root.to_string());

    for dir in exclude_subdirs {
        let dir = dir.trim().trim_matches(['/', '\\']);
        if !dir.is_empty() {
            paths.push(format!("!{}{}{}", root, separator, dir));
        }
    }

    for extra in additional {
        if !paths.contains(extra) {
            paths.push(extra.clone());
        }
    }

    paths
}

/// Split a `;` or newline separated path list, dropping blanks
pub fn split_path_list(raw: &str) -> Vec<String> {
    raw.split([';', '\n'])
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}
