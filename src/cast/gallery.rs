use super::CastEntry;
use crate::error::{Error, Result};

/// One fixed-capacity page of the cast gallery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryPage {
    /// 1-based page number within the gallery
    pub number: usize,
    pub entries: Vec<CastEntry>,
}

/// Split cast entries into consecutive pages of `capacity` entries each
pub fn build_pages(entries: &[CastEntry], capacity: usize) -> Result<Vec<GalleryPage>> {
    if capacity == 0 {
        return Err(Error::InvalidInput("gallery page capacity must be positive".to_string()));
    }

    Ok(entries
        .chunks(capacity)
        .enumerate()
        .map(|(i, chunk)| GalleryPage {
            number: i + 1,
            entries: chunk.to_vec(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cast(n: usize) -> Vec<CastEntry> {
        (0..n)
            .map(|i| CastEntry {
                name: format!("Actor {}", i),
                character: format!("Role {}", i),
                image_url: None,
            })
            .collect()
    }

    #[test]
    fn test_five_entries_fit_one_page() {
        let pages = build_pages(&cast(5), 16).unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].entries.len(), 5);
        assert_eq!(pages[0].number, 1);
    }

    #[test]
    fn test_page_counts() {
        for n in [0usize, 1, 15, 16, 17, 32, 33, 100] {
            let pages = build_pages(&cast(n), 16).unwrap();
            assert_eq!(pages.len(), n.div_ceil(16), "n={}", n);
            if let Some(last) = pages.last() {
                let expected = if n % 16 == 0 { 16 } else { n % 16 };
                assert_eq!(last.entries.len(), expected, "n={}", n);
            }
        }
    }

    #[test]
    fn test_pages_keep_source_order() {
        let pages = build_pages(&cast(20), 16).unwrap();
        assert_eq!(pages[1].entries[0].name, "Actor 16");
        assert_eq!(pages[1].number, 2);
    }

    #[test]
    fn test_zero_capacity_is_rejected() {
        assert!(matches!(build_pages(&cast(3), 0), Err(Error::InvalidInput(_))));
    }
}
