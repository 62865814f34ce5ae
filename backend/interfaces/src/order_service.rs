use std::sync::Arc;

use common_utils::errors::CustomResult;
use domain_types::{
    errors::ApiClientError,
    orders::{CreateOrderRequest, Order, OrdersQueueQuery},
};

/// Order placement and listing against the cafe backend
#[async_trait::async_trait]
pub trait OrderService: Send + Sync {
    async fn create_order(&self, request: CreateOrderRequest) -> CustomResult<Order, ApiClientError>;

    /// Orders of one customer, newest first
    async fn customer_orders(&self, phone: &str) -> CustomResult<Vec<Order>, ApiClientError>;

    /// Staff facing queue of open orders
    async fn orders_queue(&self, query: &OrdersQueueQuery)
        -> CustomResult<Vec<Order>, ApiClientError>;
}

#[async_trait::async_trait]
impl<T: OrderService + ?Sized> OrderService for Arc<T> {
    async fn create_order(&self, request: CreateOrderRequest) -> CustomResult<Order, ApiClientError> {
        (**self).create_order(request).await
    }

    async fn customer_orders(&self, phone: &str) -> CustomResult<Vec<Order>, ApiClientError> {
        (**self).customer_orders(phone).await
    }

    async fn orders_queue(
        &self,
        query: &OrdersQueueQuery,
    ) -> CustomResult<Vec<Order>, ApiClientError> {
        (**self).orders_queue(query).await
    }
}
