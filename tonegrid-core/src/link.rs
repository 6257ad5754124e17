//! Share-link codec
//!
//! A composition serializes to a URL query string: `notes` is a comma-joined
//! list of `x, y, width` triplets in cell units (store order, so z-order
//! survives a round trip), followed by `bpm`, `loop`, and `time` fields.
//! Decoding is forgiving: a trailing partial triplet is ignored, malformed
//! chunks are skipped, and bad scalar fields leave the current value in
//! place. Nothing here ever fails the whole load.

use crate::project::Project;
use crate::types::time::{Timescale, CELL, CONTENT_CELLS};

/// Serialize a project to a query string (no leading `?`).
pub fn encode(project: &Project) -> String {
    let mut cells = Vec::with_capacity(project.store.len() * 3);
    for note in project.store.iter() {
        cells.push((note.x() / CELL).to_string());
        cells.push((note.y() / CELL).to_string());
        cells.push((note.width() / CELL).to_string());
    }
    format!(
        "notes={}&bpm={}&loop={}&time={}",
        cells.join(","),
        project.bpm,
        project.looping,
        project.timescale
    )
}

/// Apply a query string onto a project: the store is rebuilt from the
/// `notes` field, and tempo/loop/signature are overridden only by fields
/// that are present and well-formed.
///
/// Accepts a bare query, a `?`-prefixed query, or a full URL.
pub fn apply(query: &str, project: &mut Project) {
    let query = query
        .rsplit_once('?')
        .map(|(_, q)| q)
        .unwrap_or(query)
        .trim();

    project.store.clear();

    for (key, value) in query.split('&').filter_map(|p| p.split_once('=')) {
        match key {
            "notes" => {
                let values: Vec<&str> = value.split(',').collect();
                let mut i = 0;
                // Anything short of a full triplet at the tail is dropped.
                while i + 3 <= values.len() {
                    let chunk = (
                        values[i].trim().parse::<u32>(),
                        values[i + 1].trim().parse::<u32>(),
                        values[i + 2].trim().parse::<u32>(),
                    );
                    if let (Ok(x), Ok(y), Ok(w)) = chunk {
                        // Cap at the timeline extent so absurd values from a
                        // mangled link cannot overflow the pixel math.
                        let cap = CONTENT_CELLS as u32;
                        let range = project.range;
                        project.store.insert(
                            x.min(cap) as i32 * CELL,
                            y.min(cap) as i32 * CELL,
                            w.min(cap) as i32 * CELL,
                            &range,
                        );
                    }
                    i += 3;
                }
            }
            "bpm" => {
                if let Ok(bpm) = value.trim().parse::<u32>() {
                    if bpm > 0 {
                        project.bpm = bpm;
                    }
                }
            }
            "loop" => {
                project.looping = value.trim() == "true";
            }
            "time" => {
                if let Ok(ts) = value.parse::<Timescale>() {
                    project.timescale = ts;
                }
            }
            _ => {}
        }
    }
}

/// Decode a query string into a fresh project with built-in defaults.
pub fn decode(query: &str) -> Project {
    let mut project = Project::new();
    apply(query, &mut project);
    project
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let mut p = Project::new();
        let range = p.range;
        p.store.insert(0, 0, CELL, &range);
        p.store.insert(4 * CELL, 2 * CELL, 3 * CELL, &range);
        p.store.insert(4 * CELL, 2 * CELL, 3 * CELL, &range); // stacked duplicate
        p.bpm = 96;
        p.looping = true;
        p.timescale = "3/4".parse().unwrap();

        let decoded = decode(&encode(&p));
        assert_eq!(decoded, p);
    }

    #[test]
    fn test_encode_format() {
        let mut p = Project::new();
        let range = p.range;
        p.store.insert(CELL, 2 * CELL, 3 * CELL, &range);
        assert_eq!(encode(&p), "notes=1,2,3&bpm=140&loop=false&time=4/4");
    }

    #[test]
    fn test_decode_accepts_full_url() {
        let p = decode("https://example.com/roll?notes=0,0,2&bpm=90&loop=true&time=4/4");
        assert_eq!(p.store.len(), 1);
        assert_eq!(p.bpm, 90);
        assert!(p.looping);
    }

    #[test]
    fn test_decode_ignores_trailing_partial_triplet() {
        let p = decode("notes=0,0,2,5,3&bpm=120&loop=false&time=4/4");
        assert_eq!(p.store.len(), 1);
        let note = p.store.iter().next().unwrap();
        assert_eq!(note.x(), 0);
        assert_eq!(note.width(), 2 * CELL);
    }

    #[test]
    fn test_decode_skips_malformed_chunk() {
        let p = decode("notes=0,0,2,a,b,c,5,0,1");
        assert_eq!(p.store.len(), 2);
    }

    #[test]
    fn test_decode_missing_fields_keep_defaults() {
        let p = decode("notes=0,0,1");
        assert_eq!(p.bpm, 140);
        assert!(!p.looping);
        assert_eq!(p.timescale, Timescale::default());

        let p = decode("");
        assert!(p.store.is_empty());
    }

    #[test]
    fn test_decode_bad_scalars_keep_current() {
        let mut p = Project::new();
        p.bpm = 100;
        apply("notes=&bpm=zero&loop=maybe&time=4", &mut p);
        assert_eq!(p.bpm, 100);
        assert!(!p.looping); // anything but "true" reads as false
        assert_eq!(p.timescale, Timescale::default());
    }

    #[test]
    fn test_apply_replaces_store() {
        let mut p = Project::new();
        let range = p.range;
        p.store.insert(0, 0, CELL, &range);
        apply("notes=7,0,1", &mut p);
        assert_eq!(p.store.len(), 1);
        assert_eq!(p.store.iter().next().unwrap().x(), 7 * CELL);
    }
}
