//! Business Name Normalization
//!
//! Turns a raw company name into a slug usable as a domain-name label:
//! - Accented characters: Pâtisserie -> patisserie
//! - Legal form tokens: SARL, SAS, EURL, ... removed
//! - Punctuation dropped, whitespace collapsed to hyphens
//!
//! The output is always lowercase `[a-z0-9-]*` with no leading or trailing
//! hyphen. An empty slug means the name carried no usable characters and no
//! domain candidates can be generated from it.

use tracing::debug;

/// Latin-1 accented characters mapped to their ASCII equivalent.
/// Applied after lowercasing, so only lowercase forms are listed.
const ACCENT_REPLACEMENTS: &[(char, char)] = &[
    ('à', 'a'),
    ('â', 'a'),
    ('é', 'e'),
    ('è', 'e'),
    ('ê', 'e'),
    ('ù', 'u'),
    ('û', 'u'),
    ('ô', 'o'),
    ('ö', 'o'),
    ('ç', 'c'),
    ('î', 'i'),
    ('ï', 'i'),
];

/// French legal-form tokens removed from slugs.
/// Order matters - "sarl" must be tried before "sa", "sas" before "sa".
const LEGAL_FORM_TOKENS: &[&str] = &[
    "sarl", "sas", "sa", "eurl", "sci", "scp", "scop", "snc", "selarl",
];

/// Normalize a business name into a lowercase hyphenated slug.
///
/// Steps: lowercase, transliterate accents, drop everything that is not
/// `[a-z0-9]`, whitespace or hyphen, collapse whitespace runs to a single
/// hyphen, remove legal-form tokens appearing as hyphen-delimited segments,
/// trim edge hyphens.
///
/// Returns an empty string when nothing survives (punctuation-only input).
pub fn slugify(name: &str) -> String {
    let mut slug = name.trim().to_lowercase();

    for (accented, plain) in ACCENT_REPLACEMENTS {
        if slug.contains(*accented) {
            slug = slug.replace(*accented, &plain.to_string());
        }
    }

    slug = slug
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() || *c == '-')
        .collect();

    slug = slug.split_whitespace().collect::<Vec<&str>>().join("-");

    slug = remove_legal_forms(&slug);

    let slug = slug.trim_matches('-').to_string();
    debug!(name, slug, "normalized business name");
    slug
}

/// Remove legal-form tokens when they appear delimited by a hyphen on either
/// side (`-sarl` suffix position, `sarl-` prefix position). A name that is
/// nothing but a legal form ("SARL") is left alone: there is no hyphen, so
/// neither pattern applies.
fn remove_legal_forms(slug: &str) -> String {
    let mut result = slug.to_string();

    for token in LEGAL_FORM_TOKENS {
        let suffixed = format!("-{token}");
        let prefixed = format!("{token}-");

        if result.contains(&suffixed) {
            result = result.replace(&suffixed, "");
        }
        if result.contains(&prefixed) {
            result = result.replace(&prefixed, "");
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Accent transliteration
    // =========================================================================

    #[test]
    fn test_accents_become_ascii() {
        assert_eq!(slugify("Pâtisserie Léon"), "patisserie-leon");
        assert_eq!(slugify("Crêperie de l'Île"), "creperie-de-lile");
        assert_eq!(slugify("Garage Möller Frères"), "garage-moller-freres");
        assert_eq!(slugify("Maçonnerie Côté"), "maconnerie-cote");
    }

    #[test]
    fn test_uppercase_accents_are_lowercased_first() {
        assert_eq!(slugify("ÉPICERIE DU THÉÂTRE"), "epicerie-du-theatre");
    }

    #[test]
    fn test_characters_outside_the_table_are_dropped() {
        // Only the listed accents transliterate; anything else non-ASCII goes away.
        assert_eq!(slugify("Señor Tapas"), "seor-tapas");
        assert_eq!(slugify("Bücherei"), "bcherei");
    }

    // =========================================================================
    // Legal-form removal
    // =========================================================================

    #[test]
    fn test_trailing_legal_forms_removed() {
        assert_eq!(slugify("Boulangerie Dupont SARL"), "boulangerie-dupont");
        assert_eq!(slugify("Transports Morel SAS"), "transports-morel");
        assert_eq!(slugify("Cabinet Riva SELARL"), "cabinet-riva");
        assert_eq!(slugify("Atelier Brun EURL"), "atelier-brun");
    }

    #[test]
    fn test_leading_legal_forms_removed() {
        assert_eq!(slugify("SARL Boulangerie Dupont"), "boulangerie-dupont");
        assert_eq!(slugify("SCI Les Tilleuls"), "les-tilleuls");
    }

    #[test]
    fn test_interior_legal_forms_removed() {
        assert_eq!(slugify("Dupont SARL Menuiserie"), "dupont-menuiserie");
    }

    #[test]
    fn test_bare_legal_form_is_kept() {
        // No hyphen on either side, so neither pattern applies.
        assert_eq!(slugify("SARL"), "sarl");
        assert_eq!(slugify("sa"), "sa");
    }

    // =========================================================================
    // Character filtering and whitespace
    // =========================================================================

    #[test]
    fn test_punctuation_stripped() {
        assert_eq!(slugify("L'Atelier du Pain & Cie"), "latelier-du-pain-cie");
        assert_eq!(slugify("Café \"Chez Momo\""), "cafe-chez-momo");
        assert_eq!(slugify("Auto-École 2000"), "auto-ecole-2000");
    }

    #[test]
    fn test_whitespace_runs_collapse_to_one_hyphen() {
        assert_eq!(slugify("  Maison   Blanche\t Traiteur  "), "maison-blanche-traiteur");
    }

    #[test]
    fn test_existing_hyphens_survive() {
        assert_eq!(slugify("Jean-Pierre Coiffure"), "jean-pierre-coiffure");
    }

    // =========================================================================
    // Degenerate inputs
    // =========================================================================

    #[test]
    fn test_empty_and_punctuation_only_inputs() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("   "), "");
        assert_eq!(slugify("!!! ***"), "");
        assert_eq!(slugify("???"), "");
    }

    #[test]
    fn test_edge_hyphens_trimmed() {
        assert_eq!(slugify("- Dupont -"), "dupont");
        assert_eq!(slugify("SARL Dupont"), "dupont");
    }

    // =========================================================================
    // Output shape
    // =========================================================================

    #[test]
    fn test_output_matches_slug_alphabet() {
        let samples = [
            "Boulangerie Dupont SARL",
            "Crêperie de l'Île",
            "Café \"Chez Momo\" & Fils",
            "SCI Les Tilleuls",
            "Auto-École 2000",
            "ÉPICERIE DU THÉÂTRE",
        ];
        for sample in samples {
            let slug = slugify(sample);
            assert!(
                slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'),
                "slug {slug:?} for {sample:?} has characters outside [a-z0-9-]"
            );
            assert!(!slug.starts_with('-'), "slug {slug:?} starts with a hyphen");
            assert!(!slug.ends_with('-'), "slug {slug:?} ends with a hyphen");
        }
    }

    #[test]
    fn test_idempotent_on_normalized_output() {
        let samples = [
            "Boulangerie Dupont SARL",
            "Crêperie de l'Île",
            "Jean-Pierre Coiffure",
            "Auto-École 2000",
        ];
        for sample in samples {
            let once = slugify(sample);
            assert_eq!(slugify(&once), once, "second pass changed {sample:?}");
        }
    }
}
