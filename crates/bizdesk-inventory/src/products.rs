use bizdesk_core::filter::{RecordFilter, option_matches, search_matches};
use bizdesk_core::inventory::{Product, ProductCategory, ProductStatus, UnitOfMeasure};
use bizdesk_core::models::non_blank;
use bizdesk_core::{DeskError, FormErrors, Result};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductDraft {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: ProductCategory,
    pub unit_of_measure: UnitOfMeasure,
    #[serde(default)]
    pub unit_cost: Decimal,
    #[serde(default)]
    pub unit_price: Decimal,
    #[serde(default)]
    pub current_stock: Decimal,
    #[serde(default)]
    pub min_stock: Decimal,
    #[serde(default)]
    pub max_stock: Decimal,
    #[serde(default)]
    pub reorder_point: Decimal,
    #[serde(default)]
    pub supplier: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default = "default_status")]
    pub status: ProductStatus,
}

fn default_status() -> ProductStatus {
    ProductStatus::Active
}

impl ProductDraft {
    pub fn validate(&self) -> Result<()> {
        let mut errors = FormErrors::new();
        errors.min_len("code", &self.code, 3);
        errors.min_len("name", &self.name, 2);
        for (field, value) in [
            ("unit_cost", self.unit_cost),
            ("unit_price", self.unit_price),
            ("current_stock", self.current_stock),
            ("min_stock", self.min_stock),
            ("max_stock", self.max_stock),
            ("reorder_point", self.reorder_point),
        ] {
            errors.amount(field, value, Decimal::ZERO);
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockLevel {
    Out,
    Low,
    Normal,
    Over,
}

impl StockLevel {
    pub fn of(product: &Product) -> Self {
        if product.current_stock.is_zero() {
            Self::Out
        } else if product.current_stock <= product.min_stock {
            Self::Low
        } else if product.current_stock >= product.max_stock {
            Self::Over
        } else {
            Self::Normal
        }
    }
}

/// Stock band used by the product list filter. Bands may overlap: an empty
/// product is both `low` and `out`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockFilter {
    Low,
    Normal,
    High,
    Out,
}

impl StockFilter {
    fn matches(self, product: &Product) -> bool {
        let stock = product.current_stock;
        match self {
            Self::Low => stock <= product.min_stock,
            Self::Normal => stock > product.min_stock && stock < product.max_stock,
            Self::High => stock >= product.max_stock,
            Self::Out => stock.is_zero(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductFilter {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub category: Option<ProductCategory>,
    #[serde(default)]
    pub status: Option<ProductStatus>,
    #[serde(default)]
    pub stock: Option<StockFilter>,
}

impl RecordFilter<Product> for ProductFilter {
    fn matches(&self, product: &Product) -> bool {
        search_matches(
            self.search.as_deref(),
            &[
                product.name.as_str(),
                product.code.as_str(),
                product.description.as_str(),
            ],
        ) && option_matches(self.category.as_ref(), &product.category)
            && option_matches(self.status.as_ref(), &product.status)
            && self.stock.is_none_or(|band| band.matches(product))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryStats {
    pub total_products: usize,
    pub total_value: Decimal,
    pub low_stock_count: usize,
    pub out_of_stock_count: usize,
}

#[derive(Debug, Default)]
pub struct ProductCatalog {
    products: Vec<Product>,
}

impl ProductCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> &[Product] {
        &self.products
    }

    pub fn get(&self, id: Uuid) -> Option<&Product> {
        self.products.iter().find(|product| product.id == id)
    }

    pub fn create(&mut self, draft: ProductDraft) -> Result<Product> {
        draft.validate()?;
        let code = draft.code.trim().to_string();
        self.ensure_code_free(&code, None)?;

        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4(),
            code,
            name: draft.name.trim().to_string(),
            description: draft.description.trim().to_string(),
            category: draft.category,
            unit_of_measure: draft.unit_of_measure,
            unit_cost: draft.unit_cost,
            unit_price: draft.unit_price,
            current_stock: draft.current_stock,
            min_stock: draft.min_stock,
            max_stock: draft.max_stock,
            reorder_point: draft.reorder_point,
            status: draft.status,
            supplier: non_blank(draft.supplier.as_deref()),
            location: non_blank(draft.location.as_deref()),
            barcode: non_blank(draft.barcode.as_deref()),
            created_at: now,
            updated_at: now,
        };
        self.products.push(product.clone());
        Ok(product)
    }

    pub fn update(&mut self, id: Uuid, draft: ProductDraft) -> Result<Product> {
        draft.validate()?;
        let code = draft.code.trim().to_string();
        self.ensure_code_free(&code, Some(id))?;

        let product = self.get_mut(id)?;
        product.code = code;
        product.name = draft.name.trim().to_string();
        product.description = draft.description.trim().to_string();
        product.category = draft.category;
        product.unit_of_measure = draft.unit_of_measure;
        product.unit_cost = draft.unit_cost;
        product.unit_price = draft.unit_price;
        product.current_stock = draft.current_stock;
        product.min_stock = draft.min_stock;
        product.max_stock = draft.max_stock;
        product.reorder_point = draft.reorder_point;
        product.status = draft.status;
        product.supplier = non_blank(draft.supplier.as_deref());
        product.location = non_blank(draft.location.as_deref());
        product.barcode = non_blank(draft.barcode.as_deref());
        product.updated_at = Utc::now();
        Ok(product.clone())
    }

    pub fn delete(&mut self, id: Uuid) -> Result<Product> {
        let index = self
            .products
            .iter()
            .position(|product| product.id == id)
            .ok_or_else(|| DeskError::not_found("product", id))?;
        Ok(self.products.remove(index))
    }

    pub fn filter(&self, filter: &ProductFilter) -> Vec<&Product> {
        filter.apply(&self.products)
    }

    pub fn stats(&self) -> InventoryStats {
        InventoryStats {
            total_products: self.products.len(),
            total_value: self
                .products
                .iter()
                .map(|product| product.current_stock * product.unit_cost)
                .sum(),
            low_stock_count: self
                .products
                .iter()
                .filter(|product| {
                    product.current_stock > Decimal::ZERO
                        && product.current_stock <= product.min_stock
                })
                .count(),
            out_of_stock_count: self
                .products
                .iter()
                .filter(|product| product.current_stock.is_zero())
                .count(),
        }
    }

    pub(crate) fn get_mut(&mut self, id: Uuid) -> Result<&mut Product> {
        self.products
            .iter_mut()
            .find(|product| product.id == id)
            .ok_or_else(|| DeskError::not_found("product", id))
    }

    fn ensure_code_free(&self, code: &str, except: Option<Uuid>) -> Result<()> {
        if self
            .products
            .iter()
            .any(|product| product.code == code && Some(product.id) != except)
        {
            return Err(DeskError::DuplicateCode {
                entity: "product",
                code: code.to_string(),
            });
        }
        Ok(())
    }
}
