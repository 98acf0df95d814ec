//! Catalog store for books and supplies
//!
//! The catalog is loaded to completion once at startup and is read-only
//! afterwards. The backing store (a SQL database in production) is behind
//! the [`CatalogSource`] trait; each category query returns a name list and
//! a parallel price list, and the two are zipped into structured
//! [`CatalogItem`]s here. A failed query or a name/price length mismatch is
//! fatal at load time, so no turn ever observes a half-loaded catalog.

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;
use tracing::info;

use crate::value_objects::{CatalogItem, Course};

/// Errors surfaced while loading the catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The backing store failed to answer a category query
    #[error("catalog query for '{category}' failed: {reason}")]
    Query { category: String, reason: String },

    /// A category returned name and price lists of different lengths
    #[error("catalog category '{category}' returned {names} names but {prices} prices")]
    LengthMismatch {
        category: String,
        names: usize,
        prices: usize,
    },
}

/// Source of catalog data, queried once per category at startup.
///
/// Each query returns the category's item names and a parallel list of
/// prices, index-matched.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch the book list for one course
    async fn fetch_books(&self, course: Course) -> Result<(Vec<String>, Vec<f64>), CatalogError>;

    /// Fetch the supplies list
    async fn fetch_supplies(&self) -> Result<(Vec<String>, Vec<f64>), CatalogError>;
}

/// The loaded, immutable catalog
#[derive(Debug, Clone)]
pub struct Catalog {
    books: HashMap<Course, Vec<CatalogItem>>,
    supplies: Vec<CatalogItem>,
}

impl Catalog {
    /// Load every category to completion.
    ///
    /// This is the startup barrier: the turn router is only constructed
    /// with a fully loaded catalog, so turn processing can never race a
    /// pending fetch.
    pub async fn load(source: &dyn CatalogSource) -> Result<Self, CatalogError> {
        let mut books = HashMap::new();
        for course in Course::ALL {
            let (names, prices) = source.fetch_books(course).await?;
            let items = zip_category(course.utterance(), names, prices)?;
            info!(course = %course, items = items.len(), "catalog category loaded");
            books.insert(course, items);
        }

        let (names, prices) = source.fetch_supplies().await?;
        let supplies = zip_category("supplies", names, prices)?;
        info!(items = supplies.len(), "supplies catalog loaded");

        Ok(Self { books, supplies })
    }

    /// Book list for a course. Empty when the category had no rows; the
    /// router refuses selections against an empty category.
    pub fn books(&self, course: Course) -> &[CatalogItem] {
        self.books.get(&course).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The supplies list
    pub fn supplies(&self) -> &[CatalogItem] {
        &self.supplies
    }
}

fn zip_category(
    category: &str,
    names: Vec<String>,
    prices: Vec<f64>,
) -> Result<Vec<CatalogItem>, CatalogError> {
    if names.len() != prices.len() {
        return Err(CatalogError::LengthMismatch {
            category: category.to_string(),
            names: names.len(),
            prices: prices.len(),
        });
    }
    Ok(names
        .into_iter()
        .zip(prices)
        .map(|(name, price)| CatalogItem { name, price })
        .collect())
}

/// In-memory catalog source for tests and demos.
///
/// Holds the same parallel name/price lists the SQL queries would return.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalogSource {
    books: HashMap<Course, (Vec<String>, Vec<f64>)>,
    supplies: (Vec<String>, Vec<f64>),
}

impl MemoryCatalogSource {
    /// Empty source; every category loads as empty
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the book list for one course
    pub fn with_books(mut self, course: Course, items: &[(&str, f64)]) -> Self {
        self.books.insert(course, split_pairs(items));
        self
    }

    /// Set the supplies list
    pub fn with_supplies(mut self, items: &[(&str, f64)]) -> Self {
        self.supplies = split_pairs(items);
        self
    }
}

fn split_pairs(items: &[(&str, f64)]) -> (Vec<String>, Vec<f64>) {
    items
        .iter()
        .map(|(name, price)| (name.to_string(), *price))
        .unzip()
}

#[async_trait]
impl CatalogSource for MemoryCatalogSource {
    async fn fetch_books(&self, course: Course) -> Result<(Vec<String>, Vec<f64>), CatalogError> {
        Ok(self.books.get(&course).cloned().unwrap_or_default())
    }

    async fn fetch_supplies(&self) -> Result<(Vec<String>, Vec<f64>), CatalogError> {
        Ok(self.supplies.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MismatchedSource;

    #[async_trait]
    impl CatalogSource for MismatchedSource {
        async fn fetch_books(
            &self,
            _course: Course,
        ) -> Result<(Vec<String>, Vec<f64>), CatalogError> {
            Ok((vec!["Only Name".to_string()], vec![]))
        }

        async fn fetch_supplies(&self) -> Result<(Vec<String>, Vec<f64>), CatalogError> {
            Ok((vec![], vec![]))
        }
    }

    #[tokio::test]
    async fn load_zips_names_and_prices() {
        let source = MemoryCatalogSource::new()
            .with_books(Course::Biology, &[("Intro Bio", 50.0), ("Genetics", 80.0)])
            .with_supplies(&[("Notebook", 5.0)]);
        let catalog = Catalog::load(&source).await.unwrap();

        let bio = catalog.books(Course::Biology);
        assert_eq!(bio.len(), 2);
        assert_eq!(bio[0], CatalogItem::new("Intro Bio", 50.0));
        assert_eq!(catalog.supplies()[0].price, 5.0);
        assert!(catalog.books(Course::Math).is_empty());
    }

    #[tokio::test]
    async fn load_fails_on_parallel_length_mismatch() {
        let err = Catalog::load(&MismatchedSource).await.unwrap_err();
        match err {
            CatalogError::LengthMismatch { category, names, prices } => {
                assert_eq!(category, "biology");
                assert_eq!(names, 1);
                assert_eq!(prices, 0);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
