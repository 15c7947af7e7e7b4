//! 产品业务服务
//!
//! 每个操作只执行一条语句；影响行数为 0 或没有自增 ID 时返回 `message: "error"`。

use tracing::{info, warn};

use super::model::{
    CreateProductRequest, DeleteProductRequest, DeleteResponse, Product, ProductList,
    ProductResponse, UpdateProductRequest,
};
use crate::core::error::CoreError;
use crate::core::response::{Envelope, Message};
use crate::infrastructure::database::{Database, DbValue};

const LIST_PRODUCTS: &str = "SELECT product_id, product_name FROM products ORDER BY product_id";
const INSERT_PRODUCT: &str = "INSERT INTO products (product_name) VALUES (?)";
const UPDATE_PRODUCT: &str = "UPDATE products SET product_name = ? WHERE product_id = ?";
const DELETE_PRODUCT: &str = "DELETE FROM products WHERE product_id = ?";

#[derive(Clone)]
pub struct ProductService {
    db: Database,
}

impl ProductService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn list_products(&self) -> Result<ProductList, CoreError> {
        let products: Vec<Product> = self.db.fetch_all(LIST_PRODUCTS, &[]).await?;
        Ok(ProductList { products })
    }

    pub async fn create_product(
        &self,
        request: CreateProductRequest,
    ) -> Result<Envelope<ProductResponse>, CoreError> {
        let outcome = self
            .db
            .execute(INSERT_PRODUCT, &[DbValue::from(request.product_name.as_str())])
            .await?;

        let message = Message::from_flag(outcome.last_insert_id.is_some());
        match outcome.last_insert_id {
            Some(id) => info!("Created product {} ({:?})", id, request.product_name),
            None => warn!("Insert returned no id for {:?}", request.product_name),
        }

        Ok(Envelope::new(ProductResponse {
            message,
            product: Product {
                product_id: outcome.last_insert_id.unwrap_or_default(),
                product_name: request.product_name,
            },
        }))
    }

    pub async fn update_product(
        &self,
        request: UpdateProductRequest,
    ) -> Result<Envelope<ProductResponse>, CoreError> {
        let outcome = self
            .db
            .execute(
                UPDATE_PRODUCT,
                &[
                    DbValue::from(request.product_name.as_str()),
                    DbValue::Int(request.product_id),
                ],
            )
            .await?;

        let message = Message::from_flag(outcome.rows_affected > 0);
        if message.is_success() {
            info!("Updated product {}", request.product_id);
        } else {
            warn!("Update matched no product with id {}", request.product_id);
        }

        Ok(Envelope::new(ProductResponse {
            message,
            product: Product {
                product_id: request.product_id,
                product_name: request.product_name,
            },
        }))
    }

    pub async fn delete_product(
        &self,
        request: DeleteProductRequest,
    ) -> Result<Envelope<DeleteResponse>, CoreError> {
        let outcome = self
            .db
            .execute(DELETE_PRODUCT, &[DbValue::Int(request.product_id)])
            .await?;

        let message = Message::from_flag(outcome.rows_affected > 0);
        if message.is_success() {
            info!("Deleted product {}", request.product_id);
        } else {
            warn!("Delete matched no product with id {}", request.product_id);
        }

        Ok(Envelope::new(DeleteResponse {
            message,
            product_id: request.product_id,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn service() -> ProductService {
        let db = Database::sqlite_in_memory().await.unwrap();
        db.create_products_table().await.unwrap();
        ProductService::new(db)
    }

    fn create(name: &str) -> CreateProductRequest {
        CreateProductRequest {
            product_name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_echoes_generated_id() {
        let service = service().await;

        let envelope = service.create_product(create("Widget")).await.unwrap();

        assert_eq!(envelope.response.message, Message::Success);
        assert_eq!(
            envelope.response.product,
            Product {
                product_id: 1,
                product_name: "Widget".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_update_missing_id_is_business_error() {
        let service = service().await;
        service.create_product(create("Widget")).await.unwrap();

        let envelope = service
            .update_product(UpdateProductRequest {
                product_id: 99,
                product_name: "Gadget".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(envelope.response.message, Message::Error);
        assert_eq!(envelope.response.product.product_id, 99);

        let list = service.list_products().await.unwrap();
        assert_eq!(list.products[0].product_name, "Widget");
    }

    #[tokio::test]
    async fn test_delete_twice() {
        let service = service().await;
        service.create_product(create("Widget")).await.unwrap();

        let first = service
            .delete_product(DeleteProductRequest { product_id: 1 })
            .await
            .unwrap();
        let second = service
            .delete_product(DeleteProductRequest { product_id: 1 })
            .await
            .unwrap();

        assert_eq!(first.response.message, Message::Success);
        assert_eq!(second.response.message, Message::Error);
        assert!(service.list_products().await.unwrap().products.is_empty());
    }

    #[tokio::test]
    async fn test_missing_table_surfaces_as_internal_error() {
        let db = Database::sqlite_in_memory().await.unwrap();
        let service = ProductService::new(db);

        match service.list_products().await {
            Err(CoreError::InternalServerError(msg)) => assert!(msg.contains("products")),
            other => panic!("expected internal error, got {:?}", other.map(|l| l.products)),
        }
    }
}
