//! Domain Candidate Generation
//!
//! Expands a normalized business slug into the ordered list of hostnames
//! worth probing. Order encodes probe priority and is relied on by the
//! resolver's first-match short-circuit, so it is part of the contract:
//! extension-major (`.fr` before `.com` before `.net` before `.org`),
//! bare host before `www.` within each extension.

/// Extensions tried for every slug, in priority order.
const EXTENSIONS: &[&str] = &[".fr", ".com", ".net", ".org"];

/// Host prefixes tried per extension, bare form first.
const PREFIXES: &[&str] = &["", "www."];

/// Generate candidate hostnames for a normalized slug.
///
/// Eight candidates come from the slug itself. When the slug contains
/// hyphens, eight more from the hyphen-free spelling are appended after,
/// since French shops register both (`boulangerie-dupont.fr` and
/// `boulangeriedupont.fr`). At most 16 candidates, no duplicates, same
/// output for the same input.
///
/// An empty slug yields no candidates.
pub fn generate(slug: &str) -> Vec<String> {
    if slug.is_empty() {
        return Vec::new();
    }

    let mut candidates = expand(slug);

    let without_hyphens = slug.replace('-', "");
    if without_hyphens != slug && !without_hyphens.is_empty() {
        candidates.extend(expand(&without_hyphens));
    }

    candidates
}

fn expand(slug: &str) -> Vec<String> {
    let mut out = Vec::with_capacity(EXTENSIONS.len() * PREFIXES.len());
    for extension in EXTENSIONS {
        for prefix in PREFIXES {
            out.push(format!("{prefix}{slug}{extension}"));
        }
    }
    out
}
