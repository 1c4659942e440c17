//! Google Drive link rewriting.

const DOWNLOAD_ENDPOINT: &str = "https://drive.google.com/uc?export=download&id=";

/// Rewrites a Drive/Docs sharing link (`.../d/<id>/...`) into a direct
/// download link. Links without a file id are returned unchanged.
pub fn convert_to_download_url(url: &str) -> String {
    if url.is_empty() {
        return String::new();
    }

    match extract_file_id(url) {
        Some(id) => format!("{DOWNLOAD_ENDPOINT}{id}"),
        None => url.to_string(),
    }
}

pub fn image_url(file_id: &str) -> String {
    format!("{DOWNLOAD_ENDPOINT}{file_id}")
}

/// Routes `target` through a relay that takes the destination as a trailing
/// query value, e.g. `https://api.allorigins.win/raw?url=`.
pub fn proxied_url(proxy_prefix: &str, target: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(target.as_bytes()).collect();
    format!("{proxy_prefix}{encoded}")
}

pub fn extract_file_id(url: &str) -> Option<&str> {
    url.match_indices("/d/").find_map(|(start, marker)| {
        let rest = &url[start + marker.len()..];
        let end = rest
            .find(|c: char| !is_file_id_char(c))
            .unwrap_or(rest.len());
        (end > 0).then(|| &rest[..end])
    })
}

fn is_file_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sharing_links_become_download_links() {
        let url = "https://docs.google.com/spreadsheets/d/1BxiMVs0XRA5nFMdKvBdBZjgmUUqptlbs74OgvE2upms/edit?usp=sharing";
        assert_eq!(
            convert_to_download_url(url),
            "https://drive.google.com/uc?export=download&id=1BxiMVs0XRA5nFMdKvBdBZjgmUUqptlbs74OgvE2upms"
        );

        let file = "https://drive.google.com/file/d/abc_DEF-123/view";
        assert_eq!(
            convert_to_download_url(file),
            "https://drive.google.com/uc?export=download&id=abc_DEF-123"
        );
    }

    #[test]
    fn links_without_file_id_pass_through() {
        assert_eq!(convert_to_download_url(""), "");
        assert_eq!(
            convert_to_download_url("https://example.com/report.xlsx"),
            "https://example.com/report.xlsx"
        );
    }

    #[test]
    fn skips_markers_without_an_id() {
        assert_eq!(extract_file_id("https://host/d//d/xyz?x=1"), Some("xyz"));
        assert_eq!(extract_file_id("https://host/d/"), None);
    }

    #[test]
    fn proxy_prefix_receives_encoded_target() {
        let proxied = proxied_url(
            "https://api.allorigins.win/raw?url=",
            "https://drive.google.com/uc?export=download&id=abc",
        );
        assert_eq!(
            proxied,
            "https://api.allorigins.win/raw?url=https%3A%2F%2Fdrive.google.com%2Fuc%3Fexport%3Ddownload%26id%3Dabc"
        );
    }
}
