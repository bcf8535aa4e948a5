use lookalike::{ResultItem, SearchResponse};
use std::fmt;
use tracing::{debug, error, warn};

const NAME_FALLBACK: &str = "No name available";
const PRICE_FALLBACK: &str = "Price not available";
const LINK_LABEL: &str = "View Product";

#[derive(Clone, Debug, PartialEq)]
pub struct CardImage {
    pub url: Option<String>,
    pub alt: String,
    pub lazy: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProductLink {
    pub label: String,
    pub url: Option<String>,
    pub new_context: bool,
}

/// One rendered result.
#[derive(Clone, Debug, PartialEq)]
pub struct ResultCard {
    pub title: String,
    pub price: String,
    pub rating: Option<String>,
    pub similarity: String,
    pub image: CardImage,
    pub link: ProductLink,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.is_empty())
}

/// Similarity as a percentage with one decimal. Ties round up, so 0.0625
/// reads 6.3% rather than the 6.2% that `{:.1}` alone would give.
fn similarity_label(cosine_similarity: f64) -> String {
    let percent = (cosine_similarity * 1000.0).round() / 10.0;
    format!("{percent:.1}% Match")
}

impl From<&ResultItem> for ResultCard {
    fn from(item: &ResultItem) -> Self {
        let title = non_empty(&item.name).unwrap_or(NAME_FALLBACK).to_string();
        Self {
            price: non_empty(&item.price).unwrap_or(PRICE_FALLBACK).to_string(),
            rating: item.rating.as_ref().map(|rating| format!("⭐ {rating}")),
            similarity: similarity_label(item.cosine_similarity),
            image: CardImage {
                url: non_empty(&item.image_url).map(str::to_string),
                alt: title.clone(),
                lazy: true,
            },
            link: ProductLink {
                label: LINK_LABEL.to_string(),
                url: non_empty(&item.product_url).map(str::to_string),
                new_context: true,
            },
            title,
        }
    }
}

impl fmt::Display for ResultCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "  {}", self.price)?;
        if let Some(rating) = &self.rating {
            writeln!(f, "  {rating}")?;
        }
        write!(f, "  {}", self.similarity)?;
        if let Some(url) = &self.image.url {
            write!(f, "\n  Image: {url}")?;
        }
        if let Some(url) = &self.link.url {
            write!(f, "\n  {}: {url}", self.link.label)?;
        }
        Ok(())
    }
}

/// The results section: hidden until a response is displayed.
#[derive(Clone, Debug, PartialEq)]
pub struct ResultsView {
    pub hidden: bool,
    pub description: Option<String>,
    pub cards: Vec<ResultCard>,
}

impl Default for ResultsView {
    fn default() -> Self {
        Self {
            hidden: true,
            description: None,
            cards: vec![],
        }
    }
}

impl fmt::Display for ResultsView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hidden {
            return Ok(());
        }
        if let Some(description) = self.description.as_deref().filter(|d| !d.is_empty()) {
            writeln!(f, "Looking for: {description}")?;
        }
        writeln!(f, "{} similar item(s)", self.cards.len())?;
        for (i, card) in self.cards.iter().enumerate() {
            writeln!(f)?;
            writeln!(f, "[{}] {card}", i + 1)?;
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct ResultsRenderer {
    view: ResultsView,
}

impl ResultsRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the rendered cards with one card per result, in the order
    /// given. Results that aren't a list are logged and leave the view
    /// untouched; single items that can't be read are logged and skipped.
    /// Returns whether the view was redrawn.
    pub fn display(&mut self, response: &SearchResponse) -> bool {
        let Some(items) = response.data.items() else {
            error!(
                results = %response.data.results,
                "malformed response: expected results to be a list"
            );
            return false;
        };

        self.view.hidden = false;
        self.view.cards.clear();
        self.view.description = Some(response.data.description.clone());
        for (index, item) in items.into_iter().enumerate() {
            match item {
                Ok(item) => self.view.cards.push(ResultCard::from(&item)),
                Err(err) => warn!(index, "skipping unreadable result: {err}"),
            }
        }
        debug!(cards = self.view.cards.len(), "rendered results");
        true
    }

    /// Hide the section and drop all cards.
    pub fn clear(&mut self) {
        self.view = ResultsView::default();
    }

    pub fn view(&self) -> &ResultsView {
        &self.view
    }
}
