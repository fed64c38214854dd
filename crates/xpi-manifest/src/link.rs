//! Update link derivation.

use std::borrow::Cow;

/// Token in a link template that stands for the new version.
pub const VERSION_PLACEHOLDER: &str = "@version@";

/// Expand every [`VERSION_PLACEHOLDER`] in `template` with the
/// percent-encoded `version`.
pub fn expand_template(template: &str, version: &str) -> String {
    template.replace(VERSION_PLACEHOLDER, &encode_version(version))
}

/// Derive a link for `new_version` from the link of `old_version`.
///
/// The first occurrence of the percent-encoded old version is replaced by
/// the percent-encoded new one. A link that does not contain the old
/// version is returned unchanged.
pub fn rebase_link(link: &str, old_version: &str, new_version: &str) -> String {
    let old = encode_version(old_version);
    if old.is_empty() {
        return link.to_string();
    }
    link.replacen(old.as_ref(), &encode_version(new_version), 1)
}

/// Percent-encode a version for use inside a URL.
pub fn encode_version(version: &str) -> Cow<'_, str> {
    urlencoding::encode(version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://y/@version@.xpi", "2.0", "https://y/2.0.xpi")]
    #[case("https://y/@version@/ext-@version@.xpi", "2.0", "https://y/2.0/ext-2.0.xpi")]
    #[case("https://y/latest.xpi", "2.0", "https://y/latest.xpi")]
    #[case("https://y/@version@.xpi", "1.0 beta+1", "https://y/1.0%20beta%2B1.xpi")]
    fn expands_template(#[case] template: &str, #[case] version: &str, #[case] expected: &str) {
        assert_eq!(expand_template(template, version), expected);
    }

    #[rstest]
    #[case("https://x/d?v=1.0.1", "1.0.1", "1.0.2", "https://x/d?v=1.0.2")]
    #[case("https://x/1.0.1/ext-1.0.1.xpi", "1.0.1", "1.0.2", "https://x/1.0.2/ext-1.0.1.xpi")]
    #[case("https://x/latest.xpi", "1.0.1", "1.0.2", "https://x/latest.xpi")]
    #[case("https://x/1.0%2B1.xpi", "1.0+1", "1.0+2", "https://x/1.0%2B2.xpi")]
    #[case("https://x/1.0.xpi", "", "2.0", "https://x/1.0.xpi")]
    fn rebases_link(
        #[case] link: &str,
        #[case] old: &str,
        #[case] new: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(rebase_link(link, old, new), expected);
    }
}
