//! Embedded placeholder image.

use std::sync::OnceLock;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Light-red tile with a red broken-image glyph.
const PLACEHOLDER_SVG: &str = concat!(
    r##"<svg width="100" height="100" xmlns="http://www.w3.org/2000/svg">"##,
    r##"<rect width="100" height="100" fill="#efee2e2"/>"##,
    r##"<path d="M32 32v36h36v-6 20 20 0 0-20-20zm0 42c18.8 0 34-15.2 34-34s-15.2-34-34-34-34 15.2 -34 34 15.2 34 34 34z" fill="#ff6666"/>"##,
    "</svg>"
);

static PLACEHOLDER_URI: OnceLock<String> = OnceLock::new();

/// `data:` URI of the placeholder, usable offline.
pub fn placeholder_data_uri() -> &'static str {
    PLACEHOLDER_URI.get_or_init(|| {
        format!("data:image/svg+xml;base64,{}", STANDARD.encode(PLACEHOLDER_SVG))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uri_decodes_to_svg() {
        let uri = placeholder_data_uri();
        let encoded = uri.strip_prefix("data:image/svg+xml;base64,").unwrap();
        let decoded = STANDARD.decode(encoded).unwrap();
        let svg = String::from_utf8(decoded).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
    }

    #[test]
    fn test_uri_matches_published_placeholder() {
        assert_eq!(
            placeholder_data_uri(),
            concat!(
                "data:image/svg+xml;base64,",
                "PHN2ZyB3aWR0aD0iMTAwIiBoZWlnaHQ9IjEwMCIgeG1sbnM9Imh0dHA6Ly93d3cudzMub3JnLzIwMDAvc3ZnIj48",
                "cmVjdCB3aWR0aD0iMTAwIiBoZWlnaHQ9IjEwMCIgZmlsbD0iI2VmZWUyZTIiLz48cGF0aCBkPSJNMzIgMzJ2MzZo",
                "MzZ2LTYgMjAgMjAgMCAwLTIwLTIwem0wIDQyYzE4LjggMCAzNC0xNS4yIDM0LTM0cy0xNS4yLTM0LTM0LTM0LTM0",
                "IDE1LjIgLTM0IDM0IDE1LjIgMzQgMzQgMzR6IiBmaWxsPSIjZmY2NjY2Ii8+PC9zdmc+",
            )
        );
    }
}
