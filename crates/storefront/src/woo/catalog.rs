//! Catalog reads: products, categories, search.

use rust_decimal::prelude::ToPrimitive;
use tracing::{debug, instrument};
use woo_headless_core::StockStatus;

use crate::catalog::{PageRequest, ProductFilter};

use super::cache::{CacheKey, CacheValue};
use super::conversions::{
    convert_category, convert_product, convert_product_connection, convert_product_list,
};
use super::queries::OffsetPaginationInput;
use super::queries::catalog::{
    GetCategories, GetCategoryBySlug, GetFeaturedProducts, GetProductBySlug, GetProducts,
    ProductWhereArgs, ProductsOrderby, SearchProducts, get_category_by_slug,
    get_featured_products, get_product_by_slug, get_products, search_products,
};
use super::queries::NoVariables;
use super::types::{Category, Product, ProductConnection, ProductSummary};
use super::{WooClient, WooError};

/// Translate a listing filter into `where` args.
pub(super) fn product_where_args(filter: &ProductFilter, page: PageRequest) -> ProductWhereArgs {
    let (field, order) = filter.sort.orderby();
    ProductWhereArgs {
        category: filter.category.clone(),
        search: filter.search.clone(),
        orderby: vec![ProductsOrderby { field, order }],
        min_price: filter.min_price.and_then(|d| d.to_f64()),
        max_price: filter.max_price.and_then(|d| d.to_f64()),
        on_sale: filter.on_sale.then_some(true),
        stock_status: if filter.in_stock {
            vec![StockStatus::InStock, StockStatus::OnBackorder]
        } else {
            Vec::new()
        },
        offset_pagination: Some(OffsetPaginationInput {
            offset: page.offset(),
            size: page.per_page(),
        }),
    }
}

impl WooClient {
    /// Get one page of products.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, page), fields(page = page.page()))]
    pub async fn get_products(
        &self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> Result<ProductConnection, WooError> {
        let cache_key = CacheKey::Products {
            filter: filter.clone(),
            page,
        };

        // Search results are too varied to be worth caching
        let cacheable = filter.search.is_none();
        if cacheable
            && let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await
        {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let variables = get_products::Variables {
            where_: product_where_args(filter, page),
        };
        let data = self.query::<GetProducts>(variables).await?;
        let connection = convert_product_connection(data.products, self.currency());

        if cacheable {
            self.inner
                .cache
                .insert(cache_key, CacheValue::Products(connection.clone()))
                .await;
        }

        Ok(connection)
    }

    /// Get a product by its slug.
    ///
    /// # Errors
    ///
    /// Returns [`WooError::NotFound`] for unknown slugs, or an error if the
    /// API request fails.
    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn get_product_by_slug(&self, slug: &str) -> Result<Product, WooError> {
        let cache_key = CacheKey::Product(slug.to_string());

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let variables = get_product_by_slug::Variables {
            slug: slug.to_string(),
        };
        let data = self.query::<GetProductBySlug>(variables).await?;
        let product = data
            .product
            .ok_or_else(|| WooError::NotFound(format!("Product not found: {slug}")))?;
        let product = convert_product(product, self.currency());

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Get featured products for the home page.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_featured_products(&self, count: u32) -> Result<Vec<ProductSummary>, WooError> {
        let cache_key = CacheKey::Featured(count);

        if let Some(CacheValue::ProductList(products)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for featured products");
            return Ok(products);
        }

        let variables = get_featured_products::Variables {
            first: i64::from(count),
        };
        let data = self.query::<GetFeaturedProducts>(variables).await?;
        let products = convert_product_list(data.products, self.currency());

        self.inner
            .cache
            .insert(cache_key, CacheValue::ProductList(products.clone()))
            .await;

        Ok(products)
    }

    /// Quick product search for the suggestion dropdown. Never cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(query = %query))]
    pub async fn search_suggestions(
        &self,
        query: &str,
        count: u32,
    ) -> Result<Vec<ProductSummary>, WooError> {
        let variables = search_products::Variables {
            search: query.to_string(),
            first: i64::from(count),
        };
        let data = self.query::<SearchProducts>(variables).await?;
        Ok(convert_product_list(data.products, self.currency()))
    }

    /// Get all non-empty categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_categories(&self) -> Result<Vec<Category>, WooError> {
        if let Some(CacheValue::Categories(categories)) =
            self.inner.cache.get(&CacheKey::Categories).await
        {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let data = self.query::<GetCategories>(NoVariables {}).await?;
        let categories: Vec<Category> = data
            .product_categories
            .map(|c| c.nodes)
            .unwrap_or_default()
            .into_iter()
            .map(convert_category)
            .collect();

        self.inner
            .cache
            .insert(
                CacheKey::Categories,
                CacheValue::Categories(categories.clone()),
            )
            .await;

        Ok(categories)
    }

    /// Get a category by its slug.
    ///
    /// # Errors
    ///
    /// Returns [`WooError::NotFound`] for unknown slugs, or an error if the
    /// API request fails.
    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn get_category_by_slug(&self, slug: &str) -> Result<Category, WooError> {
        let cache_key = CacheKey::Category(slug.to_string());

        if let Some(CacheValue::Category(category)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for category");
            return Ok(*category);
        }

        let variables = get_category_by_slug::Variables {
            slug: slug.to_string(),
        };
        let data = self.query::<GetCategoryBySlug>(variables).await?;
        let category = data
            .product_category
            .map(convert_category)
            .ok_or_else(|| WooError::NotFound(format!("Category not found: {slug}")))?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Category(Box::new(category.clone())))
            .await;

        Ok(category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SortOrder;
    use rust_decimal::Decimal;

    #[test]
    fn test_where_args_from_filter() {
        let filter = ProductFilter {
            category: Some("hoodies".to_string()),
            sort: SortOrder::PriceAsc,
            min_price: Some(Decimal::new(1050, 2)),
            in_stock: true,
            ..ProductFilter::default()
        };
        let args = product_where_args(&filter, PageRequest::new(Some(3), 12));

        assert_eq!(args.category.as_deref(), Some("hoodies"));
        assert_eq!(
            args.orderby,
            vec![ProductsOrderby {
                field: "PRICE",
                order: "ASC"
            }]
        );
        assert_eq!(args.min_price, Some(10.5));
        assert_eq!(args.max_price, None);
        assert_eq!(args.on_sale, None);
        assert_eq!(args.stock_status.len(), 2);
        assert_eq!(
            args.offset_pagination,
            Some(OffsetPaginationInput {
                offset: 24,
                size: 12
            })
        );
    }

    #[test]
    fn test_same_page_same_request() {
        let filter = ProductFilter::default();
        let a = product_where_args(&filter, PageRequest::new(Some(2), 12));
        let b = product_where_args(&filter, PageRequest::new(Some(2), 12));
        assert_eq!(a, b);
    }
}
