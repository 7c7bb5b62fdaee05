//! Property-based tests for classpath assembly and compiler arguments.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p stubgen-core --test classpath_properties
//! ```

use std::path::{Path, PathBuf};

use proptest::prelude::*;

use stubgen_core::{
    ClasspathBuilder, CompilerInvocationBuilder, CompilerSettings, GeneratedFileSet,
    PathListSeparator,
};

// ============================================================================
// Strategies
// ============================================================================

/// Absolute paths made of a few short segments, some with `.` and `..`.
fn absolute_entry() -> impl Strategy<Value = String> {
    prop::collection::vec(prop_oneof![
        4 => "[a-z]{1,4}",
        1 => Just(".".to_string()),
        1 => Just("..".to_string()),
    ], 1..5)
    .prop_map(|segments| format!("/{}.jar", segments.join("/")))
}

/// Relative paths resolved against the builder's base directory.
fn relative_entry() -> impl Strategy<Value = String> {
    "[a-z]{1,4}(/[a-z]{1,4}){0,2}".prop_map(|s| format!("lib/{}.jar", s))
}

fn any_entry() -> impl Strategy<Value = String> {
    prop_oneof![
        absolute_entry(),
        relative_entry(),
        absolute_entry().prop_map(|p| format!("file:{}", p)),
        absolute_entry().prop_map(|p| format!("file://{}", p)),
    ]
}

fn assemble(candidates: &[String], visible: &[String]) -> Vec<String> {
    ClasspathBuilder::new("/work/project")
        .separator(PathListSeparator::Unix)
        .entries(candidates.iter().map(String::as_str))
        .visible(visible.iter().map(String::as_str))
        .build()
        .unwrap()
        .to_strings()
}

// ============================================================================
// 1. Classpath Determinism
// ============================================================================

proptest! {
    /// Input order and duplicates never change the result.
    #[test]
    fn classpath_ignores_input_order(
        entries in prop::collection::vec(any_entry(), 0..12),
        seed in any::<u64>(),
    ) {
        let mut shuffled = entries.clone();
        // Cheap deterministic permutation driven by the seed.
        let len = shuffled.len();
        if len > 1 {
            for i in 0..len {
                let j = (seed.rotate_left(i as u32) as usize) % len;
                shuffled.swap(i, j);
            }
        }
        shuffled.extend(entries.iter().take(3).cloned());

        prop_assert_eq!(assemble(&entries, &[]), assemble(&shuffled, &[]));
    }

    /// Output is strictly ascending, so it is sorted and duplicate-free.
    #[test]
    fn classpath_is_strictly_ordered(entries in prop::collection::vec(any_entry(), 0..12)) {
        let cp = assemble(&entries, &[]);
        for pair in cp.windows(2) {
            prop_assert!(pair[0] < pair[1], "{:?} !< {:?}", pair[0], pair[1]);
        }
    }

    /// Every entry comes out absolute with no `.` or `..` components.
    #[test]
    fn classpath_entries_are_canonical(entries in prop::collection::vec(any_entry(), 1..8)) {
        for entry in assemble(&entries, &[]) {
            let path = Path::new(&entry);
            prop_assert!(path.is_absolute(), "not absolute: {}", entry);
            prop_assert!(
                !entry.split('/').any(|seg| seg == "." || seg == ".."),
                "not normalized: {}", entry
            );
            prop_assert!(!entry.starts_with("file:"), "URL kept: {}", entry);
        }
    }
}

// ============================================================================
// 2. Visible Entry Exclusion
// ============================================================================

proptest! {
    /// Nothing the running process already sees reaches the classpath.
    #[test]
    fn visible_entries_never_appear(
        entries in prop::collection::vec(any_entry(), 0..10),
        picks in prop::collection::vec(any::<prop::sample::Index>(), 0..4),
    ) {
        let visible: Vec<String> = if entries.is_empty() {
            Vec::new()
        } else {
            picks.iter().map(|i| entries[i.index(entries.len())].clone()).collect()
        };

        let with_visible = assemble(&entries, &visible);
        let visible_canonical = assemble(&visible, &[]);

        for entry in &visible_canonical {
            prop_assert!(!with_visible.contains(entry), "visible entry kept: {}", entry);
        }

        // Everything else survives.
        let all = assemble(&entries, &[]);
        let expected: Vec<String> = all
            .into_iter()
            .filter(|e| !visible_canonical.contains(e))
            .collect();
        prop_assert_eq!(with_visible, expected);
    }
}

// ============================================================================
// 3. Compiler Argument Shape
// ============================================================================

proptest! {
    /// Flags precede `-cp`/`-d`, and files follow in generation order.
    #[test]
    fn invocation_shape(
        source in prop::option::of("1\\.[5-8]|9|1[0-7]"),
        target in prop::option::of("1\\.[5-8]|9|1[0-7]"),
        debug in any::<bool>(),
        entries in prop::collection::vec(absolute_entry(), 0..5),
        files in prop::collection::vec("[A-Z][a-z]{1,6}", 0..6),
    ) {
        let classpath = ClasspathBuilder::new("/")
            .separator(PathListSeparator::Unix)
            .entries(entries.iter().map(String::as_str))
            .build()
            .unwrap();
        let generated: GeneratedFileSet = files
            .iter()
            .map(|f| PathBuf::from(format!("/gen/{}.java", f)))
            .collect();

        let mut settings = CompilerSettings::new().debug(debug);
        settings.source_level = source.clone();
        settings.target_level = target.clone();

        let invocation = CompilerInvocationBuilder::new("javac")
            .settings(settings)
            .separator(PathListSeparator::Unix)
            .build(&classpath, Path::new("/out"), &generated)
            .unwrap();
        let args = invocation.args();

        let mut expected = Vec::new();
        if let Some(s) = source {
            expected.push("-source".to_string());
            expected.push(s);
        }
        if let Some(t) = target {
            expected.push("-target".to_string());
            expected.push(t);
        }
        if debug {
            expected.push("-g".to_string());
        }
        expected.push("-cp".to_string());
        expected.push(classpath.join(PathListSeparator::Unix));
        expected.push("-d".to_string());
        expected.push("/out".to_string());
        expected.extend(generated.iter().map(|p| p.display().to_string()));

        prop_assert_eq!(args, expected.as_slice());
    }
}
