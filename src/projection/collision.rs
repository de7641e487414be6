//! Cross-root collision checks.
//!
//! Both checks run to completion before the first filesystem mutation of a
//! run; a failure here aborts with nothing touched.
use std::collections::BTreeSet;
use std::path::Path;

use super::{NamespaceProjection, TargetSet, UnitProjection};
use crate::error::ConfigError;

/// Fail if any two namespace roots claim the same target path, or one claims
/// a file where the other needs a directory.
///
/// Every unordered pair is compared; the error names both roots and lists the
/// conflicting paths in sorted order. For a file claimed as another root's
/// directory, the deeper path is listed.
///
/// # Errors
///
/// Returns [`ConfigError::Overlap`] for the first overlapping pair.
pub fn check_overlap(namespaces: &[NamespaceProjection]) -> Result<(), ConfigError> {
    for (i, first) in namespaces.iter().enumerate() {
        for second in namespaces.iter().skip(i + 1) {
            let shared: Vec<_> = first
                .targets
                .keys()
                .filter(|k| claims(&second.targets, k))
                .chain(
                    second
                        .targets
                        .keys()
                        .filter(|k| claims(&first.targets, k)),
                )
                .cloned()
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect();
            if !shared.is_empty() {
                return Err(ConfigError::Overlap {
                    first: first.root.clone(),
                    second: second.root.clone(),
                    paths: shared,
                });
            }
        }
    }
    Ok(())
}

/// Fail if a unit destination collides with another claim.
///
/// A unit link replaces everything at its destination, so it may not be the
/// target root (or an ancestor of it), share a destination with another
/// unit, or nest with any namespace target or other unit destination.
///
/// # Errors
///
/// Returns [`ConfigError::UnsafeDestination`] or [`ConfigError::UnitOverlap`].
pub fn check_units(
    target: &Path,
    namespaces: &[NamespaceProjection],
    units: &[UnitProjection],
) -> Result<(), ConfigError> {
    for (i, unit) in units.iter().enumerate() {
        if target.starts_with(&unit.destination) {
            return Err(ConfigError::UnsafeDestination {
                destination: unit.destination.clone(),
            });
        }

        for other in units.iter().skip(i + 1) {
            if nested(&unit.destination, &other.destination) {
                return Err(ConfigError::UnitOverlap {
                    root: unit.root.clone(),
                    destination: unit.destination.clone(),
                    other: format!(
                        "unit root {} linked at {}",
                        other.root.display(),
                        other.destination.display()
                    ),
                });
            }
        }

        for ns in namespaces {
            if let Some(rel) = ns
                .targets
                .keys()
                .find(|rel| nested(&unit.destination, &target.join(rel)))
            {
                return Err(ConfigError::UnitOverlap {
                    root: unit.root.clone(),
                    destination: unit.destination.clone(),
                    other: format!("{} from {}", rel.display(), ns.root.display()),
                });
            }
        }
    }
    Ok(())
}

/// `true` if `set` claims `rel` itself or any of its parent directories.
fn claims(set: &TargetSet, rel: &Path) -> bool {
    rel.ancestors().any(|a| set.contains_key(a))
}

/// `true` if either path is equal to or contains the other.
fn nested(a: &Path, b: &Path) -> bool {
    a.starts_with(b) || b.starts_with(a)
}

#[cfg(test)]
#[allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn ns(root: &str, targets: &[&str]) -> NamespaceProjection {
        let targets: TargetSet = targets
            .iter()
            .map(|t| (PathBuf::from(t), PathBuf::from(root).join(t)))
            .collect();
        NamespaceProjection {
            root: PathBuf::from(root),
            targets,
        }
    }

    fn unit(root: &str, destination: &str) -> UnitProjection {
        UnitProjection {
            root: PathBuf::from(root),
            destination: PathBuf::from(destination),
        }
    }

    #[test]
    fn disjoint_roots_pass() {
        let roots = [ns("/a", &[".zshrc"]), ns("/b", &[".bashrc"])];
        check_overlap(&roots).unwrap();
    }

    #[test]
    fn single_root_passes() {
        check_overlap(&[ns("/a", &[".zshrc"])]).unwrap();
        check_overlap(&[]).unwrap();
    }

    #[test]
    fn overlap_reports_pair_and_paths() {
        let roots = [
            ns("/a", &[".zshrc", ".config/x", ".only-a"]),
            ns("/b", &[".config/x", ".zshrc"]),
        ];
        let err = check_overlap(&roots).unwrap_err();
        match err {
            ConfigError::Overlap {
                first,
                second,
                paths,
            } => {
                assert_eq!(first, PathBuf::from("/a"));
                assert_eq!(second, PathBuf::from("/b"));
                assert_eq!(
                    paths,
                    vec![PathBuf::from(".config/x"), PathBuf::from(".zshrc")]
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn overlap_checks_non_adjacent_pairs() {
        let roots = [
            ns("/a", &[".x"]),
            ns("/b", &[".y"]),
            ns("/c", &[".x"]),
        ];
        let err = check_overlap(&roots).unwrap_err();
        assert!(err.to_string().contains("/a and /c"));
    }

    #[test]
    fn file_claimed_as_directory_elsewhere_is_overlap() {
        let roots = [
            ns("/a", &[".foo", ".zshrc"]),
            ns("/b", &[".foo/bar", ".foo/baz/qux", ".bashrc"]),
        ];
        match check_overlap(&roots).unwrap_err() {
            ConfigError::Overlap { paths, .. } => assert_eq!(
                paths,
                vec![PathBuf::from(".foo/bar"), PathBuf::from(".foo/baz/qux")]
            ),
            other => panic!("unexpected error: {other}"),
        }

        let reversed = [roots[1].clone(), roots[0].clone()];
        assert!(matches!(
            check_overlap(&reversed),
            Err(ConfigError::Overlap { .. })
        ));
    }

    #[test]
    fn shared_directories_are_not_overlap() {
        let roots = [
            ns("/a", &[".config/git/config"]),
            ns("/b", &[".config/nvim/init.lua", ".config/gitk"]),
        ];
        check_overlap(&roots).unwrap();
    }

    #[test]
    fn unit_replacing_target_root_is_rejected() {
        let err = check_units(Path::new("/home/u"), &[], &[unit("/n", "/home/u")]).unwrap_err();
        assert!(matches!(err, ConfigError::UnsafeDestination { .. }));

        let err = check_units(Path::new("/home/u"), &[], &[unit("/n", "/home")]).unwrap_err();
        assert!(matches!(err, ConfigError::UnsafeDestination { .. }));
    }

    #[test]
    fn unit_containing_namespace_target_is_rejected() {
        let err = check_units(
            Path::new("/home/u"),
            &[ns("/a", &[".config/nvim/init.lua"])],
            &[unit("/nvim", "/home/u/.config/nvim")],
        )
        .unwrap_err();
        assert!(err.to_string().contains(".config/nvim/init.lua"));
    }

    #[test]
    fn nested_units_are_rejected() {
        let err = check_units(
            Path::new("/home/u"),
            &[],
            &[
                unit("/bin", "/home/u/.local/bin"),
                unit("/local", "/home/u/.local"),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::UnitOverlap { .. }));
    }

    #[test]
    fn sibling_units_pass() {
        check_units(
            Path::new("/home/u"),
            &[ns("/a", &[".config/git/config"])],
            &[
                unit("/nvim", "/home/u/.config/nvim"),
                unit("/bin", "/home/u/.local/bin"),
            ],
        )
        .unwrap();
    }
}
