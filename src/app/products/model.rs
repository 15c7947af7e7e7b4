//! 产品数据模型与请求/响应体

use serde::{de, Deserialize, Deserializer, Serialize};

use crate::core::response::Message;

/// products 表中的一行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub product_id: i64,
    pub product_name: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub product_name: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    #[serde(deserialize_with = "product_id")]
    pub product_id: i64,
    pub product_name: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteProductRequest {
    #[serde(deserialize_with = "product_id")]
    pub product_id: i64,
}

/// GET 响应：`{ "products": [...] }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductList {
    pub products: Vec<Product>,
}

/// POST / PUT 响应体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductResponse {
    pub message: Message,
    pub product: Product,
}

/// DELETE 响应体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub message: Message,
    pub product_id: i64,
}

/// 浏览器表单提交的 ID 是字符串，这里同时接受整数与数字字符串
fn product_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Int(i64),
        Text(String),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Int(id) => Ok(id),
        RawId::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("product_id 不是有效的整数: {:?}", text))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_product_id_accepts_number_and_string() {
        let from_number: UpdateProductRequest =
            serde_json::from_value(json!({ "product_id": 3, "product_name": "Gadget" })).unwrap();
        let from_string: UpdateProductRequest =
            serde_json::from_value(json!({ "product_id": " 3 ", "product_name": "Gadget" }))
                .unwrap();

        assert_eq!(from_number.product_id, 3);
        assert_eq!(from_string.product_id, 3);
    }

    #[test]
    fn test_product_id_rejects_non_numeric() {
        let result: Result<DeleteProductRequest, _> =
            serde_json::from_value(json!({ "product_id": "abc" }));
        assert!(result.is_err());

        let result: Result<DeleteProductRequest, _> = serde_json::from_value(json!({}));
        assert!(result.is_err());
    }

    #[test]
    fn test_create_request_requires_name() {
        let result: Result<CreateProductRequest, _> = serde_json::from_value(json!({}));
        assert!(result.is_err());

        // 空字符串不做服务端校验
        let empty: CreateProductRequest =
            serde_json::from_value(json!({ "product_name": "" })).unwrap();
        assert_eq!(empty.product_name, "");
    }
}
