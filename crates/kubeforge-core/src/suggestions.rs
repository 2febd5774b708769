//! Fuzzy matching for misspelled kind names
//!
//! Uses Levenshtein distance to turn `kind: Deploymnet` into a
//! "did you mean `Deployment`?" hint instead of a bare rejection.

use crate::model::Kind;

/// Maximum Levenshtein distance to consider for suggestions
const MAX_SUGGESTION_DISTANCE: usize = 3;

/// Short names kubectl users type out of habit
const KIND_ALIASES: &[(&str, Kind)] = &[
    ("deploy", Kind::Deployment),
    ("sts", Kind::StatefulSet),
    ("ds", Kind::DaemonSet),
    ("cj", Kind::CronJob),
    ("svc", Kind::Service),
    ("ing", Kind::Ingress),
    ("cm", Kind::ConfigMap),
    ("pvc", Kind::PersistentVolumeClaim),
    ("hpa", Kind::HorizontalPodAutoscaler),
];

/// Calculate Levenshtein distance between two strings
pub fn levenshtein(a: &str, b: &str) -> usize {
    strsim::levenshtein(a, b)
}

/// Find the closest candidates to `input`, best first
pub fn find_closest_matches<'a>(
    input: &str,
    candidates: &[&'a str],
    max_results: usize,
) -> Vec<&'a str> {
    let mut scored: Vec<(usize, &'a str)> = candidates
        .iter()
        .filter_map(|&candidate| {
            let distance = levenshtein(input, candidate);
            (distance <= MAX_SUGGESTION_DISTANCE && distance > 0).then_some((distance, candidate))
        })
        .collect();

    scored.sort_by_key(|(distance, _)| *distance);
    scored.truncate(max_results);
    scored.into_iter().map(|(_, c)| c).collect()
}

/// Suggest a supported kind for an unrecognized kind name
pub fn suggest_kind(input: &str) -> Option<String> {
    let lower = input.to_ascii_lowercase();

    // Wrong case is the most common mistake
    if let Some(kind) = Kind::ALL
        .iter()
        .find(|k| k.as_str().to_ascii_lowercase() == lower)
    {
        return Some(kind.as_str().to_string());
    }

    if let Some((_, kind)) = KIND_ALIASES.iter().find(|(alias, _)| *alias == lower) {
        return Some(kind.as_str().to_string());
    }

    let names: Vec<&str> = Kind::ALL.iter().map(|k| k.as_str()).collect();
    find_closest_matches(input, &names, 1)
        .first()
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein_distance() {
        assert_eq!(levenshtein("Service", "Servise"), 1);
        assert_eq!(levenshtein("Job", "Job"), 0);
    }

    #[test]
    fn test_find_closest_matches() {
        let matches = find_closest_matches("Secert", &["Secret", "Service", "Job"], 3);
        assert_eq!(matches.first(), Some(&"Secret"));
    }

    #[test]
    fn test_suggest_kind_typo() {
        assert_eq!(suggest_kind("Deploymnet").as_deref(), Some("Deployment"));
        assert_eq!(suggest_kind("Ingres").as_deref(), Some("Ingress"));
    }

    #[test]
    fn test_suggest_kind_case_and_alias() {
        assert_eq!(suggest_kind("configmap").as_deref(), Some("ConfigMap"));
        assert_eq!(suggest_kind("HPA").as_deref(), Some("HorizontalPodAutoscaler"));
    }

    #[test]
    fn test_suggest_kind_none_for_unrelated() {
        assert_eq!(suggest_kind("NetworkPolicy"), None);
    }
}
