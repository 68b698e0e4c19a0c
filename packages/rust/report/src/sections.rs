//! Section builders for the digest document.

use tracing::warn;
use tubedigest_shared::DigestPayload;

/// One renderable block of the digest, already formatted as Markdown.
#[derive(Debug, Clone)]
pub struct Section(pub String);

/// Leading section: optional title and description, then a provenance line.
pub fn title_section(title: Option<&str>, description: Option<&str>, model: &str) -> Section {
    let mut text = String::new();
    if let Some(title) = title {
        text.push_str(&format!("# {title}\n\n"));
    }
    if let Some(description) = description {
        text.push_str(&format!("{description}\n\n"));
    }
    text.push_str(&format!("*Document generated with model {model}.*\n\n"));
    Section(text)
}

/// Section for one analyzed video.
///
/// Falls back to the source file name when the payload has no title, and
/// renders an excerpt without a deep link when its timestamp cannot be
/// read as `HH:MM:SS`.
pub fn item_section(source_name: &str, payload: &DigestPayload) -> Section {
    let title = payload.title.as_deref().unwrap_or(source_name);
    let link = &payload.link;

    let mut text = format!("## {title}\n\n");
    text.push_str(&format!("Link to the original video: [{link}]({link})\n\n"));
    if let Some(analysis) = &payload.analysis {
        text.push_str(&format!("{analysis}\n\n"));
    }

    if payload.selected_speeches.is_empty() {
        text.push_str("**No excerpts selected.**\n\n");
        return Section(text);
    }

    text.push_str("### Selected excerpts:\n\n");
    for speech in &payload.selected_speeches {
        let clock = speech.timestamp.get(0..8).unwrap_or(&speech.timestamp);
        text.push_str(&format!("### Excerpt - Starting at {clock}\n\n"));

        match timestamp_seconds(&speech.timestamp) {
            Some(seconds) => {
                let deep_link = format!("{link}&t={seconds}s");
                text.push_str(&format!(
                    "Link to the excerpt: [{deep_link}]({deep_link})\n\n"
                ));
            }
            None => {
                warn!(
                    source = %source_name,
                    timestamp = %speech.timestamp,
                    "excerpt timestamp unreadable, linking without offset"
                );
                text.push_str(&format!("Link to the excerpt: [{link}]({link})\n\n"));
            }
        }

        text.push_str(&format!("{}\n\n", speech.analysis));
    }
    text.push('\n');

    Section(text)
}

/// Parse the leading `HH:MM:SS` of a timestamp into whole seconds.
pub fn timestamp_seconds(timestamp: &str) -> Option<u32> {
    let clock = timestamp.get(0..8)?;
    let mut parts = clock.split(':');
    let h: u32 = parts.next()?.parse().ok()?;
    let m: u32 = parts.next()?.parse().ok()?;
    let s: u32 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(h * 3600 + m * 60 + s)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
