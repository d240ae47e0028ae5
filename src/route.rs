//! URL fragment grammar.
//!
//! ```text
//! #/                                   home
//! #/about                              about
//! #/series/<series-id>                 series detail
//! #/read/<series-id>/<chapter>/<page>  reader
//! ```
//!
//! Anything else resolves to [`Route::Home`].

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

use crate::reader::Position;

/// Characters escaped when a series id is written into a fragment.
const ID_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    About,
    Series {
        id: String,
    },
    /// Indices are kept exactly as parsed; dispatch clamps them against the catalog.
    Read {
        series_id: String,
        chapter: i64,
        page: i64,
    },
}

impl Route {
    pub fn read(series_id: &str, at: Position) -> Self {
        Self::Read {
            series_id: series_id.to_owned(),
            chapter: index_to_i64(at.chapter),
            page: index_to_i64(at.page),
        }
    }

    /// The fragment (including the leading `#`) that resolves back to this route.
    pub fn fragment(&self) -> String {
        match self {
            Self::Home => "#/".to_owned(),
            Self::About => "#/about".to_owned(),
            Self::Series { id } => format!("#/series/{}", utf8_percent_encode(id, ID_SEGMENT)),
            Self::Read {
                series_id,
                chapter,
                page,
            } => format!("#/read/{}/{chapter}/{page}", utf8_percent_encode(series_id, ID_SEGMENT)),
        }
    }
}

/// Parses a fragment such as `#/read/s1/0/3`. The leading `#` is optional.
pub fn resolve(fragment: &str) -> Route {
    let hash = if fragment.is_empty() { "#/" } else { fragment };

    // The segment before the first `/` ("#" or "") never carries meaning.
    let mut segments = hash.split('/').skip(1);
    let path = segments.next();
    let first = segments.next();
    let second = segments.next();
    let third = segments.next();

    let route = match (path, first, second, third) {
        (Some("about"), ..) => Route::About,
        (Some("series"), Some(id), ..) if !id.is_empty() => Route::Series { id: decode_id(id) },
        (Some("read"), Some(id), Some(chapter), Some(page)) if !id.is_empty() => Route::Read {
            series_id: decode_id(id),
            chapter: parse_index(chapter),
            page: parse_index(page),
        },
        _ => Route::Home,
    };

    tracing::debug!(fragment, ?route, "resolved route");
    route
}

/// Lenient decimal parse: optional leading whitespace and sign, then the
/// longest run of ASCII digits. No digits at all yields 0. Saturates instead
/// of overflowing.
pub fn parse_index(raw: &str) -> i64 {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let value = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i64, |acc, digit| {
            acc.saturating_mul(10)
                .saturating_add(i64::from(digit - b'0'))
        });

    if negative { -value } else { value }
}

/// Browsers hand over `location.hash` percent-encoded.
fn decode_id(segment: &str) -> String {
    percent_decode_str(segment).decode_utf8_lossy().into_owned()
}

fn index_to_i64(index: usize) -> i64 {
    i64::try_from(index).unwrap_or(i64::MAX)
}
