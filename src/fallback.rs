//! Static repository listing served when nothing else is available.

use crate::model::RepositorySummary;

/// Build the default fallback listing for `owner`.
///
/// Returned in display order; served unmodified when the cache is empty and
/// the upstream fetch fails.
pub fn default_dataset(owner: &str) -> Vec<RepositorySummary> {
    vec![
        entry(
            1,
            owner,
            "pharmup",
            "Pharmacy management platform with inventory tracking and prescription workflows",
            "TypeScript",
            &["nextjs", "healthcare", "mongodb"],
        ),
        entry(
            2,
            owner,
            "seculearn",
            "Interactive security learning platform with hands-on challenges",
            "JavaScript",
            &["security", "education", "ctf"],
        ),
        entry(
            3,
            owner,
            "portfolio",
            "Personal portfolio with contact form, admin dashboard and project showcase",
            "TypeScript",
            &["portfolio", "nextjs", "tailwindcss"],
        ),
    ]
}

fn entry(
    id: u64,
    owner: &str,
    name: &str,
    description: &str,
    language: &str,
    topics: &[&str],
) -> RepositorySummary {
    RepositorySummary {
        id,
        name: name.to_string(),
        description: description.to_string(),
        url: format!("https://github.com/{}/{}", owner, name),
        language: language.to_string(),
        star_count: 0,
        updated_at: "2024-01-01T00:00:00Z".to_string(),
        topics: topics.iter().map(|t| t.to_string()).collect(),
        homepage: None,
        is_fork: false,
    }
}
