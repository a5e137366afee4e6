//! Root-absolute → relative path rewriting.
//!
//! Source pages are authored as if served from the site root
//! (`href="/pages/about.html"`, `src="/assets/logo.png"`). The deployed tree
//! must work from any base URL, including `file://`, so every such reference
//! is rewritten relative to where the page lands in the output:
//!
//! | Prefix | depth 0 | depth 1 | depth 2 |
//! |---|---|---|---|
//! | `/pages/parts/` | `./pages/parts/` | `../pages/parts/` | `../../pages/parts/` |
//! | `/pages/` | `./pages/` | `../pages/` | `../../pages/` |
//! | `/assets/` | `./assets/` | `../assets/` | `../../assets/` |
//! | `/` (whole value) | `./` | `../index.html` | `../../index.html` |
//!
//! Matching is literal against attribute values (text right after `="` or
//! `='`). There is no HTML parsing: anything that does not start with one of
//! the prefixes passes through untouched. Because rewritten values no longer
//! start with `/`, rewriting twice at the same depth is a no-op.

use std::fmt;

/// How many directories below the output root a page is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OutputDepth {
    /// The entry page at the output root.
    Root,
    /// Pages under `pages/`.
    Page,
    /// Generated pages under `pages/parts/`.
    Nested,
}

impl OutputDepth {
    pub fn level(self) -> u8 {
        match self {
            OutputDepth::Root => 0,
            OutputDepth::Page => 1,
            OutputDepth::Nested => 2,
        }
    }

    /// Relative prefix that leads back to the output root.
    fn up(self) -> &'static str {
        match self {
            OutputDepth::Root => "./",
            OutputDepth::Page => "../",
            OutputDepth::Nested => "../../",
        }
    }

    /// Replacement for a bare `/` reference.
    fn root_link(self) -> &'static str {
        match self {
            OutputDepth::Root => "./",
            OutputDepth::Page => "../index.html",
            OutputDepth::Nested => "../../index.html",
        }
    }
}

impl TryFrom<u8> for OutputDepth {
    type Error = InvalidDepth;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            0 => Ok(OutputDepth::Root),
            1 => Ok(OutputDepth::Page),
            2 => Ok(OutputDepth::Nested),
            other => Err(InvalidDepth(other)),
        }
    }
}

impl fmt::Display for OutputDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.level())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("output depth must be 0, 1 or 2 (got {0})")]
pub struct InvalidDepth(pub u8);

/// Root-absolute prefixes, most specific first. `/pages/parts/` must be
/// tried before `/pages/`.
const PREFIXES: &[&str] = &["/pages/parts/", "/pages/", "/assets/"];

const QUOTES: &[char] = &['"', '\''];

/// A single literal substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub from: String,
    pub to: String,
}

/// The ordered substitution table for a depth.
pub fn rules(depth: OutputDepth) -> Vec<Rule> {
    let mut rules = Vec::with_capacity((PREFIXES.len() + 1) * QUOTES.len());
    for prefix in PREFIXES {
        let relative = format!("{}{}", depth.up(), prefix.trim_start_matches('/'));
        for quote in QUOTES {
            rules.push(Rule {
                from: format!("={quote}{prefix}"),
                to: format!("={quote}{relative}"),
            });
        }
    }
    for quote in QUOTES {
        rules.push(Rule {
            from: format!("={quote}/{quote}"),
            to: format!("={quote}{}{quote}", depth.root_link()),
        });
    }
    rules
}

/// Rewrite every root-absolute reference in `html` for a page at `depth`.
pub fn rewrite(html: &str, depth: OutputDepth) -> String {
    rules(depth)
        .iter()
        .fold(html.to_string(), |text, rule| {
            if text.contains(&rule.from) {
                text.replace(&rule.from, &rule.to)
            } else {
                text
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = concat!(
        r#"<a href="/">Home</a>"#,
        r#"<a href="/pages/about.html">About</a>"#,
        r#"<a href="/pages/parts/wheels.html">Wheels</a>"#,
        r#"<img src="/assets/logo.png" alt="Logo">"#,
    );

    #[test]
    fn depth_zero_table() {
        assert_eq!(
            rewrite(FIXTURE, OutputDepth::Root),
            concat!(
                r#"<a href="./">Home</a>"#,
                r#"<a href="./pages/about.html">About</a>"#,
                r#"<a href="./pages/parts/wheels.html">Wheels</a>"#,
                r#"<img src="./assets/logo.png" alt="Logo">"#,
            )
        );
    }

    #[test]
    fn depth_one_table() {
        assert_eq!(
            rewrite(FIXTURE, OutputDepth::Page),
            concat!(
                r#"<a href="../index.html">Home</a>"#,
                r#"<a href="../pages/about.html">About</a>"#,
                r#"<a href="../pages/parts/wheels.html">Wheels</a>"#,
                r#"<img src="../assets/logo.png" alt="Logo">"#,
            )
        );
    }

    #[test]
    fn depth_two_table() {
        assert_eq!(
            rewrite(FIXTURE, OutputDepth::Nested),
            concat!(
                r#"<a href="../../index.html">Home</a>"#,
                r#"<a href="../../pages/about.html">About</a>"#,
                r#"<a href="../../pages/parts/wheels.html">Wheels</a>"#,
                r#"<img src="../../assets/logo.png" alt="Logo">"#,
            )
        );
    }

    #[test]
    fn nested_prefix_is_not_double_rewritten() {
        let out = rewrite(r#"<a href="/pages/parts/x.html">"#, OutputDepth::Page);
        assert_eq!(out, r#"<a href="../pages/parts/x.html">"#);
        assert!(!out.contains("../../"));
    }

    #[test]
    fn single_quoted_attributes() {
        assert_eq!(
            rewrite("<a href='/'><img src='/assets/a.png'></a>", OutputDepth::Page),
            "<a href='../index.html'><img src='../assets/a.png'></a>"
        );
    }

    #[test]
    fn generated_data_attributes_are_rewritten() {
        let out = rewrite(
            r#"<img data-hd-src="/assets/images/slideshows/hero/a-hd.jpg">"#,
            OutputDepth::Root,
        );
        assert_eq!(
            out,
            r#"<img data-hd-src="./assets/images/slideshows/hero/a-hd.jpg">"#
        );
    }

    #[test]
    fn unmatched_references_untouched() {
        let html = concat!(
            r#"<a href="https://example.com/pages/x">x</a>"#,
            r#"<a href="/contact.html">c</a>"#,
            r##"<a href="#top">t</a>"##,
            r#"<link href="//cdn.example.com/a.css">"#,
            "text = \"/assets/\" in prose",
        );
        for depth in [OutputDepth::Root, OutputDepth::Page, OutputDepth::Nested] {
            assert_eq!(rewrite(html, depth), html);
        }
    }

    #[test]
    fn idempotent_per_depth() {
        for depth in [OutputDepth::Root, OutputDepth::Page, OutputDepth::Nested] {
            let once = rewrite(FIXTURE, depth);
            assert_eq!(rewrite(&once, depth), once);
        }
    }

    #[test]
    fn depth_from_level() {
        assert_eq!(OutputDepth::try_from(0), Ok(OutputDepth::Root));
        assert_eq!(OutputDepth::try_from(1), Ok(OutputDepth::Page));
        assert_eq!(OutputDepth::try_from(2), Ok(OutputDepth::Nested));
        assert_eq!(OutputDepth::try_from(3), Err(InvalidDepth(3)));
        assert_eq!(OutputDepth::Nested.to_string(), "2");
    }

    #[test]
    fn rules_are_most_specific_first() {
        let table = rules(OutputDepth::Page);
        let parts = table
            .iter()
            .position(|r| r.from == "=\"/pages/parts/")
            .unwrap();
        let pages = table.iter().position(|r| r.from == "=\"/pages/").unwrap();
        assert!(parts < pages);
    }
}
