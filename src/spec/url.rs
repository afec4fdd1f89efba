//! URL path decomposition shared by the resolver, the merger and the matcher.
//!
//! Paths are compared segment-wise rather than as strings, so `/a//b/`,
//! `a/b` and `/a/b` all decompose to `["a", "b"]`.

use smallvec::SmallVec;
use std::borrow::Cow;

/// Maximum number of path segments kept inline before heap allocation.
pub const MAX_INLINE_SEGMENTS: usize = 8;

/// Decomposed path segments.
pub type Segments = SmallVec<[String; MAX_INLINE_SEGMENTS]>;

/// Percent-decode one path segment, keeping the raw text when the result
/// is not valid UTF-8.
#[must_use]
pub fn decode_segment(segment: &str) -> String {
    match urlencoding::decode(segment) {
        Ok(Cow::Borrowed(s)) => s.to_string(),
        Ok(Cow::Owned(s)) => s,
        Err(_) => segment.to_string(),
    }
}

/// Split a path on `/`, dropping empty segments and percent-decoding each one.
///
/// Anything after `?` or `#` is ignored.
#[must_use]
pub fn split_path(path: &str) -> Segments {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(decode_segment)
        .collect()
}

/// Reduce a `servers[].url` value to its path segments.
///
/// Absolute URLs are parsed with [`url::Url`]; relative ones are resolved
/// against a dummy host so only their path survives.
#[must_use]
pub fn server_path(server_url: &str) -> Segments {
    let parsed = url::Url::parse(server_url).or_else(|_| {
        url::Url::parse(&format!(
            "http://dummy/{}",
            server_url.trim_start_matches('/')
        ))
    });

    match parsed {
        Ok(u) => split_path(u.path()),
        Err(_) => split_path(server_url),
    }
}

/// Join segments back into a canonical absolute path (`/` for none).
#[must_use]
pub fn join_path<S: AsRef<str>>(segments: &[S]) -> String {
    if segments.is_empty() {
        return "/".to_string();
    }
    let mut out = String::with_capacity(segments.iter().map(|s| s.as_ref().len() + 1).sum());
    for s in segments {
        out.push('/');
        out.push_str(s.as_ref());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_path_normalizes_slashes() {
        assert_eq!(split_path("/a//b/").as_slice(), ["a", "b"]);
        assert_eq!(split_path("a/b").as_slice(), ["a", "b"]);
        assert!(split_path("/").is_empty());
        assert!(split_path("").is_empty());
    }

    #[test]
    fn test_split_path_strips_query_and_decodes() {
        assert_eq!(
            split_path("/jobs/my%20job?limit=10").as_slice(),
            ["jobs", "my job"]
        );
        assert_eq!(split_path("/a/b#frag").as_slice(), ["a", "b"]);
    }

    #[test]
    fn test_server_path_absolute_and_relative() {
        assert_eq!(
            server_path("http://localhost:6820/slurm/v0.0.40/").as_slice(),
            ["slurm", "v0.0.40"]
        );
        assert_eq!(server_path("/slurm/v0.0.40").as_slice(), ["slurm", "v0.0.40"]);
        assert_eq!(server_path("api").as_slice(), ["api"]);
        assert!(server_path("/").is_empty());
    }

    #[test]
    fn test_server_path_keeps_variables() {
        assert_eq!(
            server_path("https://example.com/{version}").as_slice(),
            ["{version}"]
        );
    }

    #[test]
    fn test_join_path() {
        assert_eq!(join_path::<&str>(&[]), "/");
        assert_eq!(join_path(&["a", "x", "{id}"]), "/a/x/{id}");
    }
}
