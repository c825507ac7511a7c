//! Flattening a theme and its declared parent themes into one ordered list.
//!
//! The walk is depth-first with an explicit stack. Each frame holds a theme
//! and the parent specs it has not visited yet. Parents are resolved one at
//! a time in declaration order, and a theme is emitted once all its parents
//! are done, so every ancestor precedes its descendants.
//!
//! A theme reached through two different parents is emitted once per path.
//! Only a theme that is its own ancestor is an error.

use super::resolve::resolve_theme;
use crate::error::{ThemeError, ThemeResult};
use crate::source::ThemeSource;
use crate::types::{ResolvedTheme, ThemeSpec};
use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};
use tracing::debug;

struct Frame {
    theme: ResolvedTheme,
    pending: VecDeque<ThemeSpec>,
}

impl Frame {
    fn new(theme: ResolvedTheme) -> ThemeResult<Self> {
        let pending = theme.parents()?.into();
        Ok(Self { theme, pending })
    }
}

/// Expand `resolved` into `[...ancestors, resolved]`.
pub async fn process_theme(
    source: &dyn ThemeSource,
    resolved: ResolvedTheme,
    root_dir: Option<&Path>,
) -> ThemeResult<Vec<ResolvedTheme>> {
    let mut ordered = Vec::new();
    // Identities of the themes on the current path, keyed by package dir.
    let mut on_path: HashSet<PathBuf> = HashSet::new();
    on_path.insert(resolved.dir.clone());
    let mut stack = vec![Frame::new(resolved)?];

    loop {
        let next = match stack.last_mut() {
            Some(frame) => frame.pending.pop_front(),
            None => break,
        };

        match next {
            Some(spec) => {
                let parent = resolve_theme(source, &spec, root_dir).await?;
                if on_path.contains(&parent.dir) {
                    return Err(cycle_error(&stack, &parent));
                }
                debug!(parent = %parent.name, depth = stack.len(), "Descending into parent theme");
                on_path.insert(parent.dir.clone());
                stack.push(Frame::new(parent)?);
            }
            None => {
                if let Some(done) = stack.pop() {
                    on_path.remove(&done.theme.dir);
                    ordered.push(done.theme);
                }
            }
        }
    }

    Ok(ordered)
}

fn cycle_error(stack: &[Frame], repeated: &ResolvedTheme) -> ThemeError {
    let start = stack
        .iter()
        .position(|f| f.theme.dir == repeated.dir)
        .unwrap_or(0);
    let mut chain: Vec<String> = stack[start..]
        .iter()
        .map(|f| f.theme.name.clone())
        .collect();
    chain.push(repeated.name.clone());
    ThemeError::ThemeCycle { chain }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;
    use serde_json::json;

    async fn flatten(source: &MemorySource, root: &str) -> ThemeResult<Vec<String>> {
        let resolved = resolve_theme(source, &root.into(), None).await?;
        let themes = process_theme(source, resolved, None).await?;
        Ok(themes.into_iter().map(|t| t.name).collect())
    }

    #[tokio::test]
    async fn test_theme_without_parents_is_alone() {
        let source = MemorySource::new().with_package("solo");
        assert_eq!(flatten(&source, "solo").await.unwrap(), vec!["solo"]);
    }

    #[tokio::test]
    async fn test_parents_precede_child_in_declared_order() {
        let source = MemorySource::new()
            .with_document("child", json!({"__experimentalThemes": ["p1", "p2"]}))
            .unwrap()
            .with_document("p1", json!({"__experimentalThemes": ["gp"]}))
            .unwrap()
            .with_package("p2")
            .with_package("gp");

        assert_eq!(
            flatten(&source, "child").await.unwrap(),
            vec!["gp", "p1", "p2", "child"]
        );
    }

    #[tokio::test]
    async fn test_parents_resolved_sequentially() {
        let source = MemorySource::new()
            .with_document("child", json!({"__experimentalThemes": ["p1", "p2"]}))
            .unwrap()
            .with_document("p1", json!({"__experimentalThemes": ["gp"]}))
            .unwrap()
            .with_package("p2")
            .with_package("gp");

        flatten(&source, "child").await.unwrap();
        // gp is resolved before p2 because p1's subtree completes first
        assert_eq!(source.lookups(), vec!["child", "p1", "gp", "p2"]);
    }

    #[tokio::test]
    async fn test_diamond_repeats_shared_ancestor() {
        let source = MemorySource::new()
            .with_document("top", json!({"__experimentalThemes": ["left", "right"]}))
            .unwrap()
            .with_document("left", json!({"__experimentalThemes": ["base"]}))
            .unwrap()
            .with_document("right", json!({"__experimentalThemes": ["base"]}))
            .unwrap()
            .with_package("base");

        assert_eq!(
            flatten(&source, "top").await.unwrap(),
            vec!["base", "left", "base", "right", "top"]
        );
    }

    #[tokio::test]
    async fn test_empty_parent_list_is_leaf() {
        let source = MemorySource::new()
            .with_document("leaf", json!({"__experimentalThemes": []}))
            .unwrap();
        assert_eq!(flatten(&source, "leaf").await.unwrap(), vec!["leaf"]);
    }

    #[tokio::test]
    async fn test_self_reference_is_a_cycle() {
        let source = MemorySource::new()
            .with_document("loop", json!({"__experimentalThemes": ["loop"]}))
            .unwrap();
        let err = flatten(&source, "loop").await.unwrap_err();
        match err {
            ThemeError::ThemeCycle { chain } => assert_eq!(chain, vec!["loop", "loop"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_transitive_cycle_reports_chain() {
        let source = MemorySource::new()
            .with_document("site-theme", json!({"__experimentalThemes": ["a"]}))
            .unwrap()
            .with_document("a", json!({"__experimentalThemes": ["b"]}))
            .unwrap()
            .with_document("b", json!({"__experimentalThemes": ["a"]}))
            .unwrap();
        let err = flatten(&source, "site-theme").await.unwrap_err();
        match err {
            ThemeError::ThemeCycle { chain } => assert_eq!(chain, vec!["a", "b", "a"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_parent_resolution_failure_aborts() {
        let source = MemorySource::new()
            .with_document("child", json!({"__experimentalThemes": ["ghost"]}))
            .unwrap();
        let err = flatten(&source, "child").await.unwrap_err();
        assert!(matches!(err, ThemeError::PackageNotFound { .. }));
    }

    #[tokio::test]
    async fn test_parent_options_reach_parent_factory() {
        let source = MemorySource::new()
            .with_document(
                "child",
                json!({"__experimentalThemes": [
                    {"resolve": "parent", "options": {"basePath": "/docs"}}
                ]}),
            )
            .unwrap()
            .with_document("parent", json!({"basePath": "${options.basePath}"}))
            .unwrap();

        let resolved = resolve_theme(&source, &"child".into(), None).await.unwrap();
        let themes = process_theme(&source, resolved, None).await.unwrap();
        let parent = &themes[0];
        assert_eq!(parent.name, "parent");
        assert_eq!(parent.config.as_ref().unwrap().get("basePath").unwrap(), "/docs");
    }
}
