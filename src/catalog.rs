//! Data-driven category pages.
//!
//! When the source tree contains both a product catalog
//! (`data/catalog.json`) and a category template
//! (`templates/category.html`), one page per category is generated at
//! `pages/parts/<id>.html`. Either file missing turns the stage off; that is a
//! normal configuration, not an error.
//!
//! ## Catalog Format
//!
//! ```json
//! {
//!   "categories": [{
//!     "id": "wheels", "name": "Wheels", "japanese": "ホイール",
//!     "eyebrow": "Parts", "description": "...",
//!     "products": [
//!       { "id": "w1", "brand": "Rays", "title": "TE37", "price": 1899,
//!         "originalPrice": 2199, "badge": "sale" }
//!     ]
//!   }]
//! }
//! ```
//!
//! ## Template Placeholders
//!
//! `{{ID}}`, `{{NAME}}`, `{{JAPANESE}}`, `{{EYEBROW}}`, `{{DESCRIPTION}}` are
//! replaced with the HTML-escaped category fields; `{{PRODUCTS}}` with the
//! rendered product cards. Substitution is a single pass, so placeholder-like
//! text inside catalog values is never expanded.
//!
//! Generated pages go through the same expand/rewrite pipeline as
//! hand-written pages, at depth 2.

use crate::pages::{EmittedPage, PageError, RewrittenPage, SourcePage};
use crate::rewrite::OutputDepth;
use crate::slideshow::SlideshowSource;
use maud::{Markup, html};
use regex::{Captures, Regex};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;

/// Output directory (relative to the output root) for category pages.
pub const PARTS_OUTPUT_DIR: &str = "pages/parts";

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid catalog {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid category id {0:?}: must be non-empty and contain no path separators")]
    InvalidId(String),
    #[error("duplicate category id {0:?}: each category needs its own page")]
    DuplicateId(String),
    #[error(transparent)]
    Page(#[from] PageError),
}

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{(ID|NAME|JAPANESE|EYEBROW|DESCRIPTION|PRODUCTS)\}\}")
        .expect("valid placeholder regex")
});

#[derive(Debug, Clone, Deserialize)]
pub struct Catalog {
    pub categories: Vec<Category>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    /// Localized (Japanese) category name.
    #[serde(default)]
    pub japanese: String,
    #[serde(default)]
    pub eyebrow: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub products: Vec<Product>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub brand: String,
    pub title: String,
    pub price: f64,
    #[serde(default)]
    pub original_price: Option<f64>,
    #[serde(default)]
    pub badge: Option<Badge>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Badge {
    Sale,
    New,
}

impl Badge {
    pub fn label(self) -> &'static str {
        match self {
            Badge::Sale => "Sale",
            Badge::New => "New",
        }
    }

    fn modifier(self) -> &'static str {
        match self {
            Badge::Sale => "product-card__badge--sale",
            Badge::New => "product-card__badge--new",
        }
    }
}

impl Catalog {
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog: Catalog =
            serde_json::from_str(&content).map_err(|source| CatalogError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Category ids become filenames, so they must be plain names and unique.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut seen = HashSet::new();
        for category in &self.categories {
            let id = category.id.as_str();
            if id.is_empty() || id == "." || id == ".." || id.contains(['/', '\\']) {
                return Err(CatalogError::InvalidId(category.id.clone()));
            }
            if !seen.insert(id) {
                return Err(CatalogError::DuplicateId(category.id.clone()));
            }
        }
        Ok(())
    }
}

/// Format a price as US dollars: two decimals, comma thousands separators.
///
/// - `199.5` → `$199.50`
/// - `1234567.5` → `$1,234,567.50`
pub fn format_price(price: f64) -> String {
    let cents = (price.abs() * 100.0).round() as u64;
    let dollars = (cents / 100).to_string();
    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (i, digit) in dollars.chars().enumerate() {
        if i > 0 && (dollars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    let sign = if price < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${grouped}.{:02}", cents % 100)
}

/// Render one product card.
pub fn render_product_card(category_id: &str, product: &Product) -> Markup {
    html! {
        article.product-card data-category=(category_id) data-product=(product.id) {
            @if let Some(badge) = product.badge {
                span class={ "product-card__badge " (badge.modifier()) } { (badge.label()) }
            }
            p.product-card__brand { (product.brand) }
            h3.product-card__title { (product.title) }
            @if let Some(original) = product.original_price {
                p.product-card__price.product-card__price--discounted {
                    span.product-card__price-current { (format_price(product.price)) }
                    " "
                    s.product-card__price-original { (format_price(original)) }
                }
            } @else {
                p.product-card__price { (format_price(product.price)) }
            }
        }
    }
}

/// All product cards of a category, one per line.
pub fn render_products(category: &Category) -> String {
    category
        .products
        .iter()
        .map(|p| render_product_card(&category.id, p).into_string())
        .collect::<Vec<_>>()
        .join("\n")
}

fn escape(text: &str) -> String {
    html! { (text) }.into_string()
}

/// Fill the template's placeholders for one category.
pub fn fill_template(template: &str, category: &Category) -> String {
    let products = render_products(category);
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| match &caps[1] {
            "ID" => escape(&category.id),
            "NAME" => escape(&category.name),
            "JAPANESE" => escape(&category.japanese),
            "EYEBROW" => escape(&category.eyebrow),
            "DESCRIPTION" => escape(&category.description),
            _ => products.clone(),
        })
        .into_owned()
}

/// Result of the category stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogOutcome {
    Generated(Vec<EmittedPage>),
    /// Stage turned off; the reason names the missing input.
    Skipped(String),
}

/// Why the stage would be skipped, if it would.
pub fn skip_reason(catalog_path: &Path, template_path: &Path) -> Option<String> {
    let missing: Vec<String> = [catalog_path, template_path]
        .iter()
        .filter(|p| !p.is_file())
        .map(|p| p.display().to_string())
        .collect();
    if missing.is_empty() {
        None
    } else {
        Some(format!("not found: {}", missing.join(", ")))
    }
}

/// Render every category page in memory. Both inputs must exist.
pub fn render_all(
    catalog_path: &Path,
    template_path: &Path,
    slideshows: &SlideshowSource,
) -> Result<Vec<RewrittenPage>, CatalogError> {
    let catalog = Catalog::load(catalog_path)?;
    let template = fs::read_to_string(template_path).map_err(|source| CatalogError::Io {
        path: template_path.to_path_buf(),
        source,
    })?;

    let mut rendered = Vec::with_capacity(catalog.categories.len());
    for category in &catalog.categories {
        let page = SourcePage::new(
            template_path.to_path_buf(),
            Path::new(PARTS_OUTPUT_DIR).join(format!("{}.html", category.id)),
            OutputDepth::Nested,
            fill_template(&template, category),
        );
        rendered.push(page.expand(slideshows)?.rewrite());
    }
    Ok(rendered)
}

/// Generate every category page under `output_root/pages/parts/`.
pub fn generate(
    catalog_path: &Path,
    template_path: &Path,
    slideshows: &SlideshowSource,
    output_root: &Path,
) -> Result<CatalogOutcome, CatalogError> {
    if let Some(reason) = skip_reason(catalog_path, template_path) {
        return Ok(CatalogOutcome::Skipped(reason));
    }
    let emitted = render_all(catalog_path, template_path, slideshows)?
        .into_iter()
        .map(|page| page.write(output_root))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(CatalogOutcome::Generated(emitted))
}
