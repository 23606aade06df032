//! Semantic version ordering for Kubernetes and machine image versions
//!
//! Gardener versions are not always strict semver: machine images use forms
//! like `1312.3.0`, `18.04-LTS` or `v1.30`. [`parse_version`] accepts those and
//! maps them onto [`semver::Version`] so precedence rules apply uniformly.

use std::cmp::Ordering;

use semver::{BuildMetadata, Prerelease, Version};

/// Parse a version leniently
///
/// Accepts an optional `v` prefix, one to three numeric components (missing
/// components are zero, leading zeros are allowed), and an optional
/// `-pre-release` and `+build` suffix. Returns `None` for anything else.
pub fn parse_version(input: &str) -> Option<Version> {
    let input = input.trim();
    let input = input
        .strip_prefix('v')
        .or_else(|| input.strip_prefix('V'))
        .unwrap_or(input);

    let (rest, build) = match input.split_once('+') {
        Some((rest, build)) => (rest, Some(build)),
        None => (input, None),
    };
    let (core, pre) = match rest.split_once('-') {
        Some((core, pre)) => (core, Some(pre)),
        None => (rest, None),
    };

    let mut numbers = [0u64; 3];
    let mut count = 0;
    for part in core.split('.') {
        if count == numbers.len() || part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        numbers[count] = part.parse().ok()?;
        count += 1;
    }

    let mut version = Version::new(numbers[0], numbers[1], numbers[2]);
    if let Some(pre) = pre {
        version.pre = Prerelease::new(pre).ok()?;
    }
    if let Some(build) = build {
        version.build = BuildMetadata::new(build).ok()?;
    }
    Some(version)
}

/// Compare two versions by precedence, `None` if either does not parse
pub fn compare_versions(a: &str, b: &str) -> Option<Ordering> {
    let a = parse_version(a)?;
    let b = parse_version(b)?;
    Some(a.cmp_precedence(&b))
}

/// The greater of `desired` and `current`
///
/// `desired` is kept when `current` is absent, empty or unparseable, and when
/// `desired` itself cannot be parsed. Equal versions keep `desired`.
pub fn max_version<'a>(desired: &'a str, current: Option<&'a str>) -> &'a str {
    let Some(current) = current.filter(|c| !c.is_empty()) else {
        return desired;
    };
    match compare_versions(desired, current) {
        Some(Ordering::Less) => current,
        _ => desired,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    mod parsing {
        use super::*;

        #[rstest]
        #[case::full("1312.3.0", Version::new(1312, 3, 0))]
        #[case::two_components("1.30", Version::new(1, 30, 0))]
        #[case::one_component("7", Version::new(7, 0, 0))]
        #[case::v_prefix("v1.29.4", Version::new(1, 29, 4))]
        #[case::leading_zero("18.04", Version::new(18, 4, 0))]
        fn parses_release_versions(#[case] input: &str, #[case] expected: Version) {
            assert_eq!(parse_version(input), Some(expected));
        }

        #[test]
        fn keeps_pre_release() {
            let version = parse_version("18.04-LTS").expect("parsable");
            assert_eq!(version.major, 18);
            assert_eq!(version.minor, 4);
            assert_eq!(version.pre.as_str(), "LTS");
        }

        #[rstest]
        #[case::empty("")]
        #[case::word("latest")]
        #[case::four_components("1.2.3.4")]
        #[case::trailing_dot("1.2.")]
        #[case::negative("-1.2")]
        fn rejects_garbage(#[case] input: &str) {
            assert_eq!(parse_version(input), None);
        }
    }

    mod ordering {
        use super::*;

        #[rstest]
        #[case::current_bigger("1312.2.0", Some("1312.4.0"), "1312.4.0")]
        #[case::desired_bigger("1312.2.0", Some("1312.1.0"), "1312.2.0")]
        #[case::equal("1312.2.0", Some("1312.2.0"), "1312.2.0")]
        #[case::numeric_not_lexical("1.9.0", Some("1.10.0"), "1.10.0")]
        #[case::short_form_against_patch("1.30", Some("1.30.5"), "1.30.5")]
        #[case::pre_release_is_lower("18.04-LTS", Some("18.04"), "18.04")]
        #[case::current_absent("1312.2.0", None, "1312.2.0")]
        #[case::current_empty("1312.2.0", Some(""), "1312.2.0")]
        #[case::current_unparseable("1312.2.0", Some("latest"), "1312.2.0")]
        #[case::desired_unparseable("latest", Some("1312.4.0"), "latest")]
        fn max_version_never_downgrades(
            #[case] desired: &str,
            #[case] current: Option<&str>,
            #[case] expected: &str,
        ) {
            assert_eq!(max_version(desired, current), expected);
        }

        #[test]
        fn build_metadata_does_not_affect_precedence() {
            assert_eq!(
                compare_versions("1.2.3+a", "1.2.3+b"),
                Some(Ordering::Equal)
            );
        }
    }
}
