//! Product and category forms and their validated drafts.
//!
//! Handlers deserialize the raw HTML form into a `*Form`, then turn it into a
//! `*Draft` that the repositories write as-is.

use serde::Deserialize;

use mais_saude_core::catalog::ProductWithRelations;
use mais_saude_core::{CategoryId, Price, PriceError, Slug, SlugError};

/// Validation failures for catalog forms.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DraftError {
    #[error("o nome é obrigatório")]
    MissingName,
    #[error(transparent)]
    Slug(#[from] SlugError),
    #[error(transparent)]
    Price(#[from] PriceError),
    #[error("categoria inválida")]
    InvalidCategory,
    #[error("ordem inválida: use um número inteiro")]
    InvalidSort,
    #[error("URL de imagem inválida: {0}")]
    InvalidImageUrl(String),
}

/// Raw product form as posted by the edit page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductForm {
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: String,
    /// Blank for "Sob consulta".
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub category_id: String,
    /// Checkbox: present when checked.
    pub active: Option<String>,
    #[serde(default)]
    pub whatsapp_message: String,
    /// One URL per line.
    #[serde(default)]
    pub image_urls: String,
}

impl ProductForm {
    /// Prefill the edit form from a stored product.
    #[must_use]
    pub fn from_product(full: &ProductWithRelations) -> Self {
        let p = &full.product;
        Self {
            name: p.name.clone(),
            slug: p.slug.clone(),
            description: p.description.clone().unwrap_or_default(),
            price: p
                .price
                .map(|price| price.amount().to_string().replace('.', ","))
                .unwrap_or_default(),
            category_id: p.category_id.map(|id| id.to_string()).unwrap_or_default(),
            active: p.active.then(|| "on".to_owned()),
            whatsapp_message: p.whatsapp_message.clone().unwrap_or_default(),
            image_urls: full.image_urls().join("\n"),
        }
    }

    /// Empty form for a new, active product.
    #[must_use]
    pub fn new_product() -> Self {
        Self {
            active: Some("on".to_owned()),
            ..Self::default()
        }
    }
}

/// A validated product ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDraft {
    pub name: String,
    pub slug: Slug,
    pub description: Option<String>,
    pub price: Option<Price>,
    pub category_id: Option<CategoryId>,
    pub active: bool,
    pub whatsapp_message: Option<String>,
    /// Image URLs in display order.
    pub image_urls: Vec<String>,
}

impl TryFrom<&ProductForm> for ProductDraft {
    type Error = DraftError;

    fn try_from(form: &ProductForm) -> Result<Self, Self::Error> {
        let name = form.name.trim();
        if name.is_empty() {
            return Err(DraftError::MissingName);
        }

        let slug = Slug::from_input(Some(&form.slug), name)?;

        let price = match form.price.trim() {
            "" => None,
            raw => Some(Price::parse_input(raw)?),
        };

        let category_id = match form.category_id.trim() {
            "" => None,
            raw => Some(
                raw.parse::<CategoryId>()
                    .map_err(|_| DraftError::InvalidCategory)?,
            ),
        };

        Ok(Self {
            name: name.to_owned(),
            slug,
            description: non_blank(&form.description),
            price,
            category_id,
            active: form.active.is_some(),
            whatsapp_message: non_blank(&form.whatsapp_message),
            image_urls: parse_image_urls(&form.image_urls)?,
        })
    }
}

/// Raw category form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryForm {
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub sort: String,
}

/// A validated category ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDraft {
    pub name: String,
    pub slug: Slug,
    pub sort: i32,
}

impl TryFrom<&CategoryForm> for CategoryDraft {
    type Error = DraftError;

    fn try_from(form: &CategoryForm) -> Result<Self, Self::Error> {
        let name = form.name.trim();
        if name.is_empty() {
            return Err(DraftError::MissingName);
        }
        let sort = match form.sort.trim() {
            "" => 0,
            raw => raw.parse().map_err(|_| DraftError::InvalidSort)?,
        };
        Ok(Self {
            name: name.to_owned(),
            slug: Slug::from_input(Some(&form.slug), name)?,
            sort,
        })
    }
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_owned())
}

/// One URL per non-blank line; only `http(s)` URLs and site-relative paths.
fn parse_image_urls(raw: &str) -> Result<Vec<String>, DraftError> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            if line.starts_with('/') && !line.starts_with("//") {
                return Ok(line.to_owned());
            }
            match url::Url::parse(line) {
                Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(line.to_owned()),
                _ => Err(DraftError::InvalidImageUrl(line.to_owned())),
            }
        })
        .collect()
}
