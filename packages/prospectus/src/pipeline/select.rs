//! Relevance selection - picks the chunk subset for one section schema and
//! slices it into batches.

use crate::types::TextChunk;

/// Extraction target for one section schema: topic tags, fallbacks, a
/// keyword net, the chunk cap and the task instruction.
#[derive(Debug, Clone)]
pub struct SectionTarget {
    pub name: String,
    pub primary_tags: Vec<String>,
    pub fallback_tags: Vec<String>,
    pub keywords: Vec<String>,
    pub max_chunks: usize,
    pub instruction: String,
}

impl SectionTarget {
    pub fn new(name: impl Into<String>, instruction: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            primary_tags: Vec::new(),
            fallback_tags: Vec::new(),
            keywords: Vec::new(),
            max_chunks: usize::MAX,
            instruction: instruction.into(),
        }
    }

    /// Section labels selected first.
    pub fn with_primary_tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.primary_tags = tags.into_iter().map(|t| t.into()).collect();
        self
    }

    /// Labels tried when no chunk carries a primary tag.
    pub fn with_fallback_tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.fallback_tags = tags.into_iter().map(|t| t.into()).collect();
        self
    }

    /// Lower-case keywords tried against chunk text as a last net before
    /// falling back to every chunk.
    pub fn with_keywords(mut self, keywords: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.keywords = keywords.into_iter().map(|k| k.into()).collect();
        self
    }

    /// Cap on selected chunks; larger sets are even-stride sampled.
    pub fn with_max_chunks(mut self, max_chunks: usize) -> Self {
        self.max_chunks = max_chunks;
        self
    }
}

/// Select the chunks likely relevant to `target`.
///
/// Fallback chain, first non-empty set wins: primary labels, fallback
/// labels, keyword match, the whole sequence. Oversized sets are bounded by
/// [`stride_sample`] so coverage spans the document instead of its head.
pub fn select_relevant<'a>(chunks: &'a [TextChunk], target: &SectionTarget) -> Vec<&'a TextChunk> {
    let by_label = |tags: &[String]| -> Vec<&TextChunk> {
        chunks
            .iter()
            .filter(|c| tags.iter().any(|t| c.section_label == *t))
            .collect()
    };

    let mut selected = by_label(&target.primary_tags);
    if selected.is_empty() {
        selected = by_label(&target.fallback_tags);
    }
    if selected.is_empty() && !target.keywords.is_empty() {
        selected = chunks
            .iter()
            .filter(|c| {
                let text = c.text.to_lowercase();
                target.keywords.iter().any(|k| text.contains(k.as_str()))
            })
            .collect();
    }
    if selected.is_empty() {
        selected = chunks.iter().collect();
    }

    stride_sample(selected, target.max_chunks)
}

/// Keep exactly `max` items at positions `floor(i * len / max)`, preserving
/// relative order and document coverage. Sets within the cap come back
/// untouched.
pub fn stride_sample<T: Copy>(items: Vec<T>, max: usize) -> Vec<T> {
    if max == 0 {
        return Vec::new();
    }
    let len = items.len();
    if len <= max {
        return items;
    }
    (0..max).map(|i| items[i * len / max]).collect()
}

/// Slice a selected subset into contiguous batches; the last batch may be
/// smaller.
pub fn batch_chunks<'a>(selected: &[&'a TextChunk], batch_size: usize) -> Vec<Vec<&'a TextChunk>> {
    selected
        .chunks(batch_size.max(1))
        .map(|batch| batch.to_vec())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChunkType;

    fn chunk(label: &str, text: &str, position: usize) -> TextChunk {
        TextChunk::new(text, ChunkType::Paragraph, 1, position, label, None)
    }

    fn target() -> SectionTarget {
        SectionTarget::new("fees", "Extract all tuition and fee information.")
            .with_primary_tags(["fees"])
            .with_fallback_tags(["general"])
            .with_keywords(["tuition", "scholarship"])
            .with_max_chunks(10)
    }

    #[test]
    fn test_primary_tags_win() {
        let chunks = vec![
            chunk("fees", "Fee schedule", 0),
            chunk("general", "Campus life", 1),
        ];
        let selected = select_relevant(&chunks, &target());
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].section_label, "fees");
    }

    #[test]
    fn test_fallback_tags_when_no_primary() {
        let chunks = vec![
            chunk("general", "Campus life", 0),
            chunk("admissions", "How to apply", 1),
        ];
        let selected = select_relevant(&chunks, &target());
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].section_label, "general");
    }

    #[test]
    fn test_keywords_when_no_labels_match() {
        let chunks = vec![
            chunk("admissions", "Tuition is payable each semester", 0),
            chunk("admissions", "Bring your documents", 1),
        ];
        let selected = select_relevant(&chunks, &target());
        assert_eq!(selected.len(), 1);
        assert!(selected[0].text.contains("Tuition"));
    }

    #[test]
    fn test_everything_as_last_resort() {
        let chunks = vec![
            chunk("admissions", "Entry test details", 0),
            chunk("contact", "Helpline numbers", 1),
        ];
        let selected = select_relevant(&chunks, &target());
        assert_eq!(selected.len(), 2);
    }

    #[test]
    fn test_stride_sample_exact_positions() {
        let items: Vec<usize> = (0..10).collect();
        let sampled = stride_sample(items.iter().collect(), 4);
        // floor(i * 10 / 4) for i in 0..4
        assert_eq!(sampled, vec![&0, &2, &5, &7]);
    }

    #[test]
    fn test_stride_sample_within_cap_untouched() {
        let items: Vec<usize> = (0..3).collect();
        let sampled = stride_sample(items.iter().collect(), 10);
        assert_eq!(sampled.len(), 3);
    }

    #[test]
    fn test_oversized_selection_is_sampled_not_truncated() {
        let chunks: Vec<TextChunk> = (0..30)
            .map(|i| chunk("fees", &format!("Fee item {i}"), i))
            .collect();
        let selected = select_relevant(&chunks, &target());

        assert_eq!(selected.len(), 10);
        // coverage spans the tail of the document, not just the head
        assert!(selected.last().unwrap().position_in_doc >= 27);
        let positions: Vec<usize> = selected.iter().map(|c| c.position_in_doc).collect();
        let mut sorted = positions.clone();
        sorted.sort_unstable();
        assert_eq!(positions, sorted);
    }

    #[test]
    fn test_batch_chunks_last_batch_short() {
        let chunks: Vec<TextChunk> = (0..7)
            .map(|i| chunk("fees", &format!("c{i}"), i))
            .collect();
        let refs: Vec<&TextChunk> = chunks.iter().collect();
        let batches = batch_chunks(&refs, 3);

        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].len(), 3);
        assert_eq!(batches[2].len(), 1);
    }
}
