use ammonia;

/// Clean HTML content using the ammonia library.
///
/// Question prompts come from the remote quiz API and are rendered by the
/// browser, so only whitelisted tags (like <b>, <code>) survive; <script>
/// and friends are removed together with their content.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}
