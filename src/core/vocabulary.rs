use crate::domain::ports::DataProvider;
use crate::utils::error::Result;
use std::collections::BTreeSet;

/// Distinct vocabulary words starting with `prefix` (case-insensitive), sorted.
///
/// The filtering runs on the blocking pool; the caller gets the result back
/// on its own task.
pub async fn find_vocabulary<P>(provider: &P, prefix: &str) -> Result<Vec<String>>
where
    P: DataProvider + ?Sized,
{
    let words = provider.get_vocabulary().await?;
    let prefix = prefix.to_lowercase();

    let matches = tokio::task::spawn_blocking(move || filter_vocabulary(&words, &prefix)).await?;
    tracing::debug!(count = matches.len(), "vocabulary lookup finished");

    Ok(matches)
}

pub fn filter_vocabulary(words: &[String], prefix: &str) -> Vec<String> {
    let prefix = prefix.to_lowercase();
    words
        .iter()
        .map(|w| w.to_lowercase())
        .filter(|w| !w.is_empty() && w.starts_with(&prefix))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::fake::{default_vocabulary, FakeDataProvider};

    #[test]
    fn test_filter_dedups_and_sorts() {
        let words: Vec<String> = ["in", "Irure", "in", "id", "dolor"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(filter_vocabulary(&words, "i"), vec!["id", "in", "irure"]);
    }

    #[test]
    fn test_empty_prefix_returns_whole_vocabulary() {
        let words = default_vocabulary();
        let all = filter_vocabulary(&words, "");
        let distinct: BTreeSet<String> = words.into_iter().collect();
        assert_eq!(all.len(), distinct.len());
    }

    #[tokio::test]
    async fn test_lookup_is_case_insensitive() {
        let provider = FakeDataProvider::default();
        let upper = find_vocabulary(&provider, "DO").await.unwrap();
        let lower = find_vocabulary(&provider, "do").await.unwrap();
        assert_eq!(upper, lower);
        assert_eq!(lower, vec!["do", "dolor", "dolore"]);
    }

    #[tokio::test]
    async fn test_no_match() {
        let provider = FakeDataProvider::default();
        assert!(find_vocabulary(&provider, "zzz").await.unwrap().is_empty());
    }
}
