//! URL helper functions

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS, NON_ALPHANUMERIC};

use super::normalize_tag;

/// Characters escaped inside a single path segment
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Encode one URL path segment
pub fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT).to_string()
}

/// Encode a query-string value the way `encodeURIComponent` does
pub fn encode_query_value(value: &str) -> String {
    const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
        .remove(b'-')
        .remove(b'_')
        .remove(b'.')
        .remove(b'!')
        .remove(b'~')
        .remove(b'*')
        .remove(b'\'')
        .remove(b'(')
        .remove(b')');
    utf8_percent_encode(value, COMPONENT).to_string()
}

/// Path of a post page
///
/// # Examples
/// ```ignore
/// post_path("hello world") // -> "/posts/hello%20world"
/// ```
pub fn post_path(slug: &str) -> String {
    format!("/posts/{}", encode_segment(slug))
}

/// Path of a tag page, built from the normalized tag
///
/// # Examples
/// ```ignore
/// tag_path("Machine Learning") // -> "/tags/machine-learning"
/// ```
pub fn tag_path(tag: &str) -> String {
    format!("/tags/{}", encode_segment(&normalize_tag(tag)))
}

/// Path of the search results page for a query
pub fn search_path(query: &str) -> String {
    format!("/search?q={}", encode_query_value(query))
}
