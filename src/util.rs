use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

pub fn slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for ch in name.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        slug.push_str("group");
    }
    slug
}

pub fn stable_bucket(id: &str, buckets: usize) -> usize {
    if buckets == 0 {
        return 0;
    }

    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    (hasher.finish() % buckets as u64) as usize
}

pub fn format_percent(part: usize, whole: usize) -> String {
    if whole == 0 {
        return "0.0%".to_owned();
    }
    format!("{:.1}%", part as f64 * 100.0 / whole as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_normalizes_names() {
        assert_eq!(slug("Production"), "production");
        assert_eq!(slug("  Edge  Network/EU "), "edge-network-eu");
        assert_eq!(slug("!!"), "group");
    }

    #[test]
    fn stable_bucket_is_deterministic_and_bounded() {
        let first = stable_bucket("prod-001", 3);
        assert_eq!(first, stable_bucket("prod-001", 3));
        assert!(first < 3);
        assert_eq!(stable_bucket("anything", 0), 0);
    }

    #[test]
    fn percent_handles_empty_whole() {
        assert_eq!(format_percent(0, 0), "0.0%");
        assert_eq!(format_percent(1, 4), "25.0%");
    }
}
