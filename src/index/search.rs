use crate::index::types::{Hook, IndexedRepo, SearchIndex};

pub const DEFAULT_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit<'a> {
    /// 0..=100
    pub score: u8,
    pub repository: &'a str,
    pub stars: u32,
    pub hook: &'a Hook,
}

/// Rank every hook in the index against `query`, best first.
///
/// Each query word is matched against the words of the hook's repository, id,
/// name and description. A word contained in a document word counts fully;
/// otherwise its closest Jaro-Winkler similarity counts. Ties go to the more
/// starred repository.
pub fn search<'a>(index: &'a SearchIndex, query: &str, limit: usize) -> Vec<SearchHit<'a>> {
    let terms = words(query);
    if terms.is_empty() {
        return Vec::new();
    }

    let mut hits: Vec<SearchHit<'a>> = index
        .repositories
        .iter()
        .flat_map(|repo| repo.hooks.iter().map(move |hook| (repo, hook)))
        .map(|(repo, hook)| SearchHit {
            score: score(&terms, &document_words(repo, hook)),
            repository: &repo.repository,
            stars: repo.stars,
            hook,
        })
        .collect();

    hits.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then(b.stars.cmp(&a.stars))
            .then_with(|| a.repository.cmp(b.repository))
            .then_with(|| a.hook.id.cmp(&b.hook.id))
    });
    hits.truncate(limit);
    hits
}

/// Hooks named by `[[owner:]project:]hook_id`.
///
/// A bare id matches in every repository. `project:id` matches repositories
/// whose name is `project`; `owner:project:id` matches one repository exactly.
pub fn find_hooks<'a>(index: &'a SearchIndex, query: &str) -> Vec<(&'a IndexedRepo, &'a Hook)> {
    let parts: Vec<&str> = query.split(':').collect();
    let hook_id = parts[parts.len() - 1];

    let repo_matches = |repo: &IndexedRepo| match parts.as_slice() {
        [_] => true,
        [project, _] => {
            repo.repository == *project || repo.repository.ends_with(&format!("/{project}"))
        }
        [owner, project, _] => repo.repository == format!("{owner}/{project}"),
        _ => false,
    };

    index
        .repositories
        .iter()
        .filter(|repo| repo_matches(repo))
        .flat_map(|repo| repo.hooks.iter().map(move |hook| (repo, hook)))
        .filter(|(_, hook)| hook.id == hook_id)
        .collect()
}

fn document_words(repo: &IndexedRepo, hook: &Hook) -> Vec<String> {
    let mut out = words(&repo.repository);
    out.extend(words(&hook.id));
    out.extend(words(&hook.name));
    if let Some(ref description) = hook.description {
        out.extend(words(description));
    }
    out
}

fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '-' || c == '_'))
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn score(terms: &[String], doc: &[String]) -> u8 {
    let total: f64 = terms
        .iter()
        .map(|term| {
            doc.iter()
                .map(|word| {
                    if word.contains(term.as_str()) {
                        1.0
                    } else {
                        strsim::jaro_winkler(term, word)
                    }
                })
                .fold(0.0, f64::max)
        })
        .sum();
    (total / terms.len() as f64 * 100.0).round() as u8
}
