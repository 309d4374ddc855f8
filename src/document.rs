use getset::Getters;
use scraper::{ElementRef, Html};
use url::Url;

use crate::{
    schema::{HiddenStateSnapshot, StateField},
    session::FetchedPage,
};

/// The latest page of a traversal.  This is all that flows from one step to the next.
#[derive(Debug, Getters)]
#[getset(get = "pub")]
pub struct DocumentState {
    url: Url,
    html: Html,
}

impl DocumentState {
    pub fn parse(url: Url, body: &[u8]) -> Self {
        let html = Html::parse_document(&String::from_utf8_lossy(body));
        Self { url, html }
    }

    pub fn hidden_state(&self) -> HiddenStateSnapshot {
        hidden_state(&self.html)
    }

    pub fn title(&self) -> Option<String> {
        self.html
            .select(selector!("title"))
            .next()
            .map(|title| title.text().collect())
    }

    /// `<input type="image" name=...>`, the kind of control that triggers a postback.
    pub fn image_button(&self, name: &str) -> Option<ElementRef<'_>> {
        self.inputs().find(|input| {
            input.value().attr("name") == Some(name) && input_type_is(input, "image")
        })
    }

    pub fn input_with_alt(&self, alt: &str) -> Option<ElementRef<'_>> {
        self.inputs()
            .find(|input| input.value().attr("alt") == Some(alt))
    }

    /// Heuristic: the wizard gives no explicit marker for its results page.
    pub fn is_results_page(&self, results_url: &Url) -> bool {
        self.title().is_some_and(|title| title.contains("Results"))
            || self.url.path() == results_url.path()
            || self
                .html
                .root_element()
                .text()
                .any(|text| text.contains("Your search returned"))
    }

    fn inputs(&self) -> impl Iterator<Item = ElementRef<'_>> {
        self.html.select(selector!("input"))
    }
}

impl From<FetchedPage> for DocumentState {
    fn from(page: FetchedPage) -> Self {
        Self::parse(page.url, &page.body)
    }
}

fn input_type_is(input: &ElementRef, kind: &str) -> bool {
    input
        .value()
        .attr("type")
        .is_some_and(|t| t.eq_ignore_ascii_case(kind))
}

/// Collects the recognized hidden fields.  Unrecognized names are dropped even if hidden,
/// and recognized names are dropped unless hidden.
pub fn hidden_state(html: &Html) -> HiddenStateSnapshot {
    html.select(selector!("input"))
        .filter(|input| input_type_is(input, "hidden"))
        .filter_map(|input| {
            let field = input.value().attr("name")?.parse::<StateField>().ok()?;
            let value = input.value().attr("value").unwrap_or_default();
            Some((field, value.to_owned()))
        })
        .collect()
}
