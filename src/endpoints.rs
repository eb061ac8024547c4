use url::Url;

/// Makes sure `Url::join` appends to the configured path instead of replacing its last segment.
pub fn base_url(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
