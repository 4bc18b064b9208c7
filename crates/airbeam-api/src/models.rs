// Device payload models
//
// The recorder speaks two ad-hoc formats: an XML status document at `/info`
// and an HTML directory listing at `/recordings.html`. Both are reduced to
// plain Rust values here so the client never hands raw markup to callers.

use std::collections::BTreeSet;
use std::fmt;

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use scraper::{Html, Selector};

use crate::error::Error;

/// Href prefix of a downloadable recording in the recordings index.
pub const RECORDING_HREF_PREFIX: &str = "/recording/";

/// Value of `recording/available` when the camera is ready to record.
const AVAILABLE: &str = "YES";

// ── Status ──────────────────────────────────────────────────────────

/// Snapshot of the `/info` document. Re-fetched on every poll, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceStatus {
    /// `camera/available`
    pub camera_available: String,
    /// `recording/status`
    pub recording_status: String,
    /// `recording/available` -- `YES` once the camera can start a recording.
    pub recording_available: String,
    /// `recording/duration`, formatted `HH:MM:SS`.
    pub recording_duration: String,
    /// Name the device reports for itself.
    pub device_name: String,
}

impl DeviceStatus {
    /// Node paths read from the status document, in field order.
    const FIELDS: [&'static str; 5] = [
        "camera/available",
        "recording/status",
        "recording/available",
        "recording/duration",
        "name",
    ];

    /// Parse the `/info` XML document.
    ///
    /// Each field takes the text of the first element (in document order)
    /// whose trailing path matches, wherever it sits in the tree.
    pub fn from_xml(xml: &str) -> Result<Self, Error> {
        let mut values = scan_xml(xml, &Self::FIELDS)?.into_iter().zip(Self::FIELDS);
        let mut next = || match values.next() {
            Some((Some(value), _)) => Ok(value),
            Some((None, field)) => Err(Error::MissingField { field }),
            None => Err(Error::Xml("field table exhausted".into())),
        };

        Ok(Self {
            camera_available: next()?,
            recording_status: next()?,
            recording_available: next()?,
            recording_duration: next()?,
            device_name: next()?,
        })
    }

    /// Whether the camera is powered and ready to record.
    pub fn is_recording_available(&self) -> bool {
        self.recording_available == AVAILABLE
    }

    /// The reported duration of the current recording.
    pub fn duration(&self) -> RecordingDuration {
        RecordingDuration::parse(&self.recording_duration)
    }
}

/// Walk the document once, capturing the direct text of the first element
/// matching each of `paths`.
fn scan_xml(xml: &str, paths: &[&str]) -> Result<Vec<Option<String>>, Error> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let segments: Vec<Vec<&str>> = paths.iter().map(|p| p.split('/').collect()).collect();
    let mut found: Vec<Option<String>> = vec![None; paths.len()];
    let mut stack: Vec<String> = Vec::new();
    // (field index, depth of the element being captured)
    let mut capture: Option<(usize, usize)> = None;

    let open = |stack: &[String], found: &[Option<String>]| -> Option<usize> {
        segments.iter().enumerate().find_map(|(idx, segs)| {
            let matches = found.get(idx).is_some_and(Option::is_none)
                && stack.len() >= segs.len()
                && stack.iter().rev().zip(segs.iter().rev()).all(|(a, b)| a == b);
            matches.then_some(idx)
        })
    };

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                stack.push(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
                if capture.is_none() {
                    if let Some(idx) = open(&stack, &found) {
                        if let Some(slot) = found.get_mut(idx) {
                            *slot = Some(String::new());
                        }
                        capture = Some((idx, stack.len()));
                    }
                }
            }
            Ok(Event::Empty(e)) => {
                stack.push(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
                if capture.is_none() {
                    if let Some(slot) = open(&stack, &found).and_then(|i| found.get_mut(i)) {
                        *slot = Some(String::new());
                    }
                }
                stack.pop();
            }
            Ok(Event::End(_)) => {
                if capture.is_some_and(|(_, depth)| depth == stack.len()) {
                    capture = None;
                }
                stack.pop();
            }
            Ok(Event::Text(t)) => {
                if let Some((idx, depth)) = capture {
                    if depth == stack.len() {
                        let text = t.unescape().map_err(|e| Error::Xml(e.to_string()))?;
                        if let Some(Some(value)) = found.get_mut(idx) {
                            value.push_str(&text);
                        }
                    }
                }
            }
            Ok(Event::CData(c)) => {
                if let Some((idx, depth)) = capture {
                    if depth == stack.len() {
                        if let Some(Some(value)) = found.get_mut(idx) {
                            value.push_str(&String::from_utf8_lossy(&c.into_inner()));
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(Error::Xml(e.to_string())),
        }
    }

    Ok(found)
}

// ── Duration ────────────────────────────────────────────────────────

/// Parsed `recording/duration`.
///
/// An unparseable value is kept apart from a real zero so it can be logged,
/// but both mean "not recording" to callers of [`RecordingDuration::secs`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordingDuration {
    Elapsed(u64),
    Unknown(String),
}

impl RecordingDuration {
    /// Parse an `HH:MM:SS` string.
    pub fn parse(raw: &str) -> Self {
        let mut parts = raw.split(':').map(|part| part.trim().parse::<u64>());
        let elapsed = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(Ok(h)), Some(Ok(m)), Some(Ok(s)), None) => h
                .checked_mul(3600)
                .and_then(|h| m.checked_mul(60).and_then(|m| h.checked_add(m)))
                .and_then(|hm| hm.checked_add(s)),
            _ => None,
        };

        match elapsed {
            Some(secs) => Self::Elapsed(secs),
            None => Self::Unknown(raw.to_owned()),
        }
    }

    /// Total seconds; `0` when the value could not be parsed.
    pub fn secs(&self) -> u64 {
        match self {
            Self::Elapsed(secs) => *secs,
            Self::Unknown(_) => 0,
        }
    }
}

impl fmt::Display for RecordingDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Elapsed(secs) => write!(f, "{secs}s"),
            Self::Unknown(raw) => write!(f, "unknown ({raw:?})"),
        }
    }
}

// ── Recordings index ────────────────────────────────────────────────

/// Extract recording filenames from the `/recordings.html` listing.
///
/// Only anchors under [`RECORDING_HREF_PREFIX`] count; the filename is the
/// last path segment of the href.
pub fn recordings_from_index(html: &str) -> Result<BTreeSet<String>, Error> {
    let document = Html::parse_document(html);
    let anchors = Selector::parse("a[href]").map_err(|e| Error::Html(e.to_string()))?;

    Ok(document
        .select(&anchors)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| href.starts_with(RECORDING_HREF_PREFIX))
        .filter_map(|href| href.rsplit('/').next())
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
        .collect())
}
