use crate::model::entry::WordEntry;

/// Concatenates the per-word batches into one flat list of senses,
/// preserving batch order then within-batch order. One queried word
/// commonly resolves to several distinct senses, and each sense becomes
/// its own card downstream.
pub fn flatten(batches: Vec<Vec<WordEntry>>) -> Vec<WordEntry> {
    batches.into_iter().flatten().collect()
}

/// Keeps only the senses the API marks as featured. Secondary or rare
/// senses of the source word do not produce cards.
pub fn keep_featured_words(entries: Vec<WordEntry>) -> Vec<WordEntry> {
    entries.into_iter().filter(|entry| entry.featured).collect()
}

/// Prunes each sense down to its featured translations. The sense itself
/// is kept even when no translation survives; it still renders as a card
/// with no translation groups.
pub fn keep_featured_translations(mut entries: Vec<WordEntry>) -> Vec<WordEntry> {
    for entry in entries.iter_mut() {
        entry.translations.retain(|translation| translation.featured);
    }
    entries
}

/// The full normalization pipeline, always applied in this order.
pub fn normalize(batches: Vec<Vec<WordEntry>>) -> Vec<WordEntry> {
    let entries = flatten(batches);
    let entries = keep_featured_words(entries);
    keep_featured_translations(entries)
}
