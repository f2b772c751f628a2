//! Seed the marketplace with bakers and their catalogues from a YAML file.
//!
//! ```yaml
//! bakers:
//!   - email: hello@crumbs.in
//!     password: crumbs-and-co
//!     shop_name: Crumbs & Co
//!     owner_name: Ravi Menon
//!     phone: "9000000000"
//!     business_license: BL-001
//!     tax_id: GST-001
//!     shop_address: 12 MG Road
//!     city: Pune
//!     state: Maharashtra
//!     zip_code: "411001"
//!     shop_description: Sourdough and laminated pastry
//!     products:
//!       - name: Country Sourdough
//!         category: Bread
//!         price: 180
//! ```
//!
//! Seeded shops are created verified. A baker whose email is already
//! registered is skipped.

use std::path::Path;

use serde::Deserialize;
use tracing::{error, info, warn};

use local_crust_server::models::{NewBaker, NewProduct};
use local_crust_server::services::auth::{AuthError, AuthService};

/// Top-level seed file.
#[derive(Debug, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub bakers: Vec<SeedBaker>,
}

/// One baker account with its shop and catalogue.
#[derive(Debug, Deserialize)]
pub struct SeedBaker {
    pub email: String,
    pub password: String,
    #[serde(flatten)]
    pub shop: NewBaker,
    #[serde(default)]
    pub products: Vec<NewProduct>,
}

/// Outcome counts of a seeding run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub created: usize,
    pub products: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Problems found in a seed file before touching the database.
#[must_use]
pub fn validate(seed: &SeedFile) -> Vec<String> {
    let mut errors = Vec::new();

    for (i, baker) in seed.bakers.iter().enumerate() {
        let label = if baker.shop.shop_name.trim().is_empty() {
            format!("baker #{}", i + 1)
        } else {
            baker.shop.shop_name.clone()
        };

        if baker.shop.shop_name.trim().is_empty() {
            errors.push(format!("{label}: shop_name is empty"));
        }
        if baker.shop.owner_name.trim().is_empty() {
            errors.push(format!("{label}: owner_name is empty"));
        }
        for product in &baker.products {
            if product.name.trim().is_empty() {
                errors.push(format!("{label}: product with empty name"));
            }
            if product.price.is_sign_negative() {
                errors.push(format!("{label}: {} has a negative price", product.name));
            }
        }
    }

    errors
}

/// Seed bakers from a YAML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, fails validation,
/// or the database is unreachable. Individual bakers that fail are logged
/// and counted.
pub async fn bakers(file_path: &str) -> Result<SeedSummary, Box<dyn std::error::Error>> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading seed file");
    let content = tokio::fs::read_to_string(path).await?;
    let seed: SeedFile = serde_yaml::from_str(&content)?;
    info!(bakers = seed.bakers.len(), "Parsed seed file");

    let errors = validate(&seed);
    if !errors.is_empty() {
        error!("Seed file validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(format!("{} validation errors found", errors.len()).into());
    }

    let pool = super::connect().await?;
    let auth = AuthService::new(&pool);
    let mut summary = SeedSummary::default();

    for baker in &seed.bakers {
        match auth
            .register_baker(&baker.email, &baker.password, &baker.shop, &baker.products, true)
            .await
        {
            Ok((_, shop)) => {
                info!(baker_id = %shop.id, products = baker.products.len(), "Seeded {}", shop.shop_name);
                summary.created += 1;
                summary.products += baker.products.len();
            }
            Err(AuthError::UserAlreadyExists) => {
                warn!("Skipping {}: email already registered", baker.email);
                summary.skipped += 1;
            }
            Err(e) => {
                error!("Failed to seed {}: {e}", baker.email);
                summary.failed += 1;
            }
        }
    }

    info!("Seeding complete!");
    info!("  Bakers created: {}", summary.created);
    info!("  Products created: {}", summary.products);
    info!("  Bakers skipped (already exist): {}", summary.skipped);
    if summary.failed > 0 {
        error!("  Bakers failed: {}", summary.failed);
    }

    Ok(summary)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    const SEED: &str = r#"
bakers:
  - email: hello@crumbs.in
    password: crumbs-and-co
    shop_name: Crumbs & Co
    owner_name: Ravi Menon
    phone: "9000000000"
    business_license: BL-001
    tax_id: GST-001
    shop_address: 12 MG Road
    city: Pune
    state: Maharashtra
    zip_code: "411001"
    shop_description: Sourdough and laminated pastry
    products:
      - name: Country Sourdough
        category: Bread
        price: 180
      - name: Almond Croissant
        category: Pastry
        price: 145.5
        description: Twice baked
"#;

    #[test]
    fn test_parse_seed_file() {
        let seed: SeedFile = serde_yaml::from_str(SEED).unwrap();
        assert_eq!(seed.bakers.len(), 1);
        let baker = &seed.bakers[0];
        assert_eq!(baker.shop.city, "Pune");
        assert_eq!(baker.products.len(), 2);
        assert_eq!(baker.products[1].description.as_deref(), Some("Twice baked"));
        assert!(validate(&seed).is_empty());
    }

    #[test]
    fn test_validate_reports_blank_fields() {
        let mut seed: SeedFile = serde_yaml::from_str(SEED).unwrap();
        seed.bakers[0].shop.owner_name = "  ".into();
        seed.bakers[0].products[0].name = String::new();

        let errors = validate(&seed);
        assert_eq!(errors.len(), 2);
        assert!(errors[0].starts_with("Crumbs & Co: owner_name"));
    }

    #[test]
    fn test_empty_file_has_no_bakers() {
        let seed: SeedFile = serde_yaml::from_str("{}").unwrap();
        assert!(seed.bakers.is_empty());
    }
}
