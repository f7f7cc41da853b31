//! Seed the catalog from a YAML file.
//!
//! ```yaml
//! categories:
//!   - name: Medicamentos
//!     sort: 1
//!     products:
//!       - name: Dipirona 500mg 10 comprimidos
//!         price: "8,90"
//!         description: Analgésico e antitérmico.
//!         images:
//!           - https://cdn.exemplo.com/dipirona.jpg
//!       - name: Xarope para tosse
//!         whatsapp_message: Olá! Vocês têm xarope para tosse infantil?
//! ```
//!
//! Rows go through the same validation as the back-office forms. Anything
//! whose slug already exists is left untouched, so the file can be applied
//! repeatedly.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use mais_saude_admin::db::{self, CategoryRepository, ProductRepository, RepositoryError};
use mais_saude_admin::models::{CategoryDraft, CategoryForm, DraftError, ProductDraft, ProductForm};
use mais_saude_core::CategoryId;
use mais_saude_core::config::ConfigError;

use super::database_url;

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Could not read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{item}: {source}")]
    Invalid { item: String, source: DraftError },

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    categories: Vec<CategoryEntry>,
}

#[derive(Debug, Deserialize)]
struct CategoryEntry {
    name: String,
    #[serde(default)]
    slug: Option<String>,
    #[serde(default)]
    sort: i32,
    #[serde(default)]
    products: Vec<ProductEntry>,
}

#[derive(Debug, Deserialize)]
struct ProductEntry {
    name: String,
    #[serde(default)]
    slug: Option<String>,
    #[serde(default)]
    description: Option<String>,
    /// Blank or missing for "Sob consulta".
    #[serde(default)]
    price: Option<String>,
    #[serde(default = "default_active")]
    active: bool,
    #[serde(default)]
    whatsapp_message: Option<String>,
    #[serde(default)]
    images: Vec<String>,
}

const fn default_active() -> bool {
    true
}

impl CategoryEntry {
    fn draft(&self) -> Result<CategoryDraft, SeedError> {
        let form = CategoryForm {
            name: self.name.clone(),
            slug: self.slug.clone().unwrap_or_default(),
            sort: self.sort.to_string(),
        };
        CategoryDraft::try_from(&form).map_err(|source| SeedError::Invalid {
            item: format!("category \"{}\"", self.name),
            source,
        })
    }
}

impl ProductEntry {
    fn draft(&self, category_id: CategoryId) -> Result<ProductDraft, SeedError> {
        let form = ProductForm {
            name: self.name.clone(),
            slug: self.slug.clone().unwrap_or_default(),
            description: self.description.clone().unwrap_or_default(),
            price: self.price.clone().unwrap_or_default(),
            category_id: category_id.to_string(),
            active: self.active.then(|| "on".to_owned()),
            whatsapp_message: self.whatsapp_message.clone().unwrap_or_default(),
            image_urls: self.images.join("\n"),
        };
        ProductDraft::try_from(&form).map_err(|source| SeedError::Invalid {
            item: format!("product \"{}\"", self.name),
            source,
        })
    }
}

/// Counts reported after seeding.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub categories_inserted: usize,
    pub products_inserted: usize,
    pub skipped: usize,
}

/// Seed categories and products from `file_path`.
///
/// The whole file is validated before anything is written.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, an entry fails
/// validation, or a database operation fails.
pub async fn catalog(file_path: &str) -> Result<(), SeedError> {
    let content = tokio::fs::read_to_string(Path::new(file_path))
        .await
        .map_err(|source| SeedError::Read {
            path: file_path.to_owned(),
            source,
        })?;
    let file: CatalogFile = serde_yaml::from_str(&content)?;
    validate(&file)?;

    info!(
        path = %file_path,
        categories = file.categories.len(),
        "Parsed catalog file"
    );

    let url = database_url("ADMIN")?;
    let pool = db::create_pool(&url).await?;
    info!("Connected to database");

    let categories = CategoryRepository::new(&pool);
    let products = ProductRepository::new(&pool);

    let mut category_ids: HashMap<String, CategoryId> = categories
        .list()
        .await?
        .into_iter()
        .map(|c| (c.slug, c.id))
        .collect();
    let mut product_slugs: HashSet<String> = products
        .list(None)
        .await?
        .into_iter()
        .map(|p| p.product.slug)
        .collect();

    let mut summary = SeedSummary::default();

    for entry in &file.categories {
        let draft = entry.draft()?;
        let category_id = if let Some(id) = category_ids.get(draft.slug.as_str()) {
            summary.skipped += 1;
            *id
        } else {
            let category = categories.create(&draft).await?;
            info!(slug = %category.slug, "Inserted category");
            summary.categories_inserted += 1;
            category_ids.insert(category.slug, category.id);
            category.id
        };

        for product in &entry.products {
            let draft = product.draft(category_id)?;
            if product_slugs.contains(draft.slug.as_str()) {
                summary.skipped += 1;
                continue;
            }
            products.create(&draft).await?;
            info!(slug = %draft.slug, "Inserted product");
            summary.products_inserted += 1;
            product_slugs.insert(draft.slug.to_string());
        }
    }

    info!("Seeding complete!");
    info!("  Categories inserted: {}", summary.categories_inserted);
    info!("  Products inserted: {}", summary.products_inserted);
    if summary.skipped > 0 {
        warn!("  Skipped (slug already exists): {}", summary.skipped);
    }

    Ok(())
}

/// Check every entry with a placeholder category before touching the database.
fn validate(file: &CatalogFile) -> Result<(), SeedError> {
    let placeholder = CategoryId::generate();
    for entry in &file.categories {
        entry.draft()?;
        for product in &entry.products {
            product.draft(placeholder)?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
categories:
  - name: Higiene Pessoal
    sort: 2
    products:
      - name: Sabonete Líquido
        price: "12,50"
        images:
          - https://cdn.exemplo.com/sabonete.jpg
      - name: Protetor Solar FPS 50
        active: false
  - name: Vitaminas
"#;

    #[test]
    fn test_parse_catalog_file() {
        let file: CatalogFile = serde_yaml::from_str(SAMPLE).unwrap();
        assert_eq!(file.categories.len(), 2);

        let hygiene = &file.categories[0];
        assert_eq!(hygiene.draft().unwrap().slug.as_str(), "higiene-pessoal");
        assert_eq!(hygiene.products.len(), 2);
        assert!(hygiene.products[0].active);
        assert!(!hygiene.products[1].active);
        assert!(file.categories[1].products.is_empty());
        assert!(validate(&file).is_ok());
    }

    #[test]
    fn test_product_draft_uses_form_rules() {
        let file: CatalogFile = serde_yaml::from_str(SAMPLE).unwrap();
        let category_id = CategoryId::generate();

        let soap = file.categories[0].products[0].draft(category_id).unwrap();
        assert_eq!(soap.slug.as_str(), "sabonete-liquido");
        assert_eq!(soap.category_id, Some(category_id));
        assert!(soap.price.is_some());
        assert_eq!(soap.image_urls.len(), 1);

        let sunscreen = file.categories[0].products[1].draft(category_id).unwrap();
        assert!(sunscreen.price.is_none());
        assert!(!sunscreen.active);
    }

    #[test]
    fn test_invalid_entry_names_the_item() {
        let file: CatalogFile = serde_yaml::from_str(
            r#"
categories:
  - name: Bebês
    products:
      - name: Fralda
        images: ["ftp://exemplo.com/fralda.jpg"]
"#,
        )
        .unwrap();

        let err = validate(&file).unwrap_err();
        assert!(err.to_string().starts_with("product \"Fralda\""));
    }
}
