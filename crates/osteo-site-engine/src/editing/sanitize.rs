/// Reduce an HTML fragment to the tags and attributes allowed in page content.
///
/// Parsing goes through `ammonia`, so entity-encoded schemes and
/// attributes without leading whitespace are seen the way a browser sees
/// them. `<script>` and `<style>` are dropped with their content; any other
/// tag outside the allowlist is unwrapped to its text. URLs keep only
/// http(s), mailto and tel schemes. Links are left without an added `rel`.
pub fn sanitize_html(html: &str) -> String {
    let mut cleaner = ammonia::Builder::default();
    cleaner
        .link_rel(None)
        .url_schemes(["http", "https", "mailto", "tel"].into_iter().collect())
        .add_generic_attributes(&["class"]);
    cleaner.clean(html).to_string()
}

/// Wrap plain text into an escaped paragraph
pub fn paragraph(text: &str) -> String {
    format!("<p>{}</p>", html_escape::encode_text(text))
}
