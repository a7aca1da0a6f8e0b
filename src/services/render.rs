use crate::model::entry::WordEntry;
use crate::model::note::Note;

/// Renders one normalized sense into the front/back markup pair.
///
/// Both sides share a header with the source word and its part of
/// speech. Each translation then becomes a numbered group: the front
/// shows only a `__translation_N__` placeholder and the source-language
/// example sentences (the recall prompt must not leak the answer), the
/// back shows the translation text and both example sentences.
pub fn render_fields(entry: &WordEntry) -> (String, String) {
    let header = format!(
        "<div class='word'>{} <span class='type_word'>{}</span></div>",
        entry.text, entry.pos
    );

    let mut front_parts = vec![header.clone()];
    let mut back_parts = vec![header];

    for (i, translation) in entry.translations.iter().enumerate() {
        front_parts.push(format!(
            "<div class='group'><div class='translation_title'>__translation_{}__:</div><ul>",
            i + 1
        ));
        back_parts.push(format!(
            "<div class='group'><div class='meaning'>{}</div><ul>",
            translation.text
        ));

        for example in &translation.examples {
            front_parts.push(format!("<li>{}</li>", example.src));
            back_parts.push(format!("<li>{}<br><i>{}</i></li>", example.src, example.dst));
        }

        front_parts.push("</ul></div>".to_string());
        back_parts.push("</ul></div>".to_string());
    }

    (front_parts.join("<br>"), back_parts.join("<br>"))
}

/// Same rendering, packaged as the persisted note shape.
pub fn render_note(entry: &WordEntry) -> Note {
    let (front, back) = render_fields(entry);
    Note { front, back }
}
