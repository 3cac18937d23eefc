//! Hashtag extraction and ranking.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use models::Post;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// `#` followed by letters, digits or underscores in any script.
static HASHTAG_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#([\p{L}\p{N}_]+)").expect("Invalid hashtag regex"));

/// Extract hashtags from post content.
///
/// Tags are lowercased and deduplicated, keeping first-occurrence order, so the
/// result depends only on `content`.
///
/// # Examples
/// ```
/// use service::hashtags::extract_hashtags;
///
/// let tags = extract_hashtags("Morning run #Almaty #running #almaty");
/// assert_eq!(tags, vec!["almaty", "running"]);
/// ```
pub fn extract_hashtags(content: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    HASHTAG_REGEX
        .captures_iter(content)
        .filter_map(|cap| cap.get(1).map(|m| m.as_str().to_lowercase()))
        .filter(|tag| seen.insert(tag.clone()))
        .collect()
}

/// Canonical form of a user-supplied tag: no leading `#`, trimmed, lowercase.
pub fn normalize_tag(tag: &str) -> String {
    tag.trim().trim_start_matches('#').to_lowercase()
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HashtagStat {
    pub tag: String,
    pub count: u64,
    pub score: f64,
}

/// Rank hashtags by recency-weighted frequency.
///
/// Each post contributes `1 / (1 + age_in_days)` to every tag it carries.
/// Ties fall back to raw count, then tag name.
pub fn popular_hashtags<'a, I>(posts: I, now: DateTime<Utc>, limit: usize) -> Vec<HashtagStat>
where
    I: IntoIterator<Item = &'a Post>,
{
    let mut stats: HashMap<&'a str, (u64, f64)> = HashMap::new();
    for post in posts {
        let weight = recency_weight(post.created_at, now);
        for tag in &post.hashtags {
            let entry = stats.entry(tag.as_str()).or_insert((0, 0.0));
            entry.0 += 1;
            entry.1 += weight;
        }
    }

    let mut ranked: Vec<HashtagStat> = stats
        .into_iter()
        .map(|(tag, (count, score))| HashtagStat { tag: tag.to_string(), count, score })
        .collect();
    ranked.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| b.count.cmp(&a.count))
            .then_with(|| a.tag.cmp(&b.tag))
    });
    ranked.truncate(limit);
    ranked
}

fn recency_weight(created_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let age_secs = (now - created_at).num_seconds().max(0) as f64;
    1.0 / (1.0 + age_secs / 86_400.0)
}
