use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::OrderView;
use crate::domain::ports::OrderRepository;

pub struct OrderService<R> {
    repo: R,
}

impl<R: OrderRepository> OrderService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Convert the user's cart into an order. A blank or whitespace-only
    /// coupon code is treated as no coupon at all.
    pub fn checkout(
        &self,
        user_id: Uuid,
        coupon_code: Option<&str>,
    ) -> Result<OrderView, DomainError> {
        let code = coupon_code.map(str::trim).filter(|c| !c.is_empty());
        self.repo.checkout(user_id, code)
    }

    /// The caller's orders, most recent first.
    pub fn order_history(&self, user_id: Uuid) -> Result<Vec<OrderView>, DomainError> {
        self.repo.find_by_user(user_id)
    }

    /// Fetch one order, enforcing that the caller owns it. The store itself
    /// stays ownership-agnostic.
    pub fn order_by_id(&self, order_id: Uuid, user_id: Uuid) -> Result<OrderView, DomainError> {
        let order = self
            .repo
            .find_by_id(order_id)?
            .ok_or_else(|| DomainError::NotFound(format!("Order {order_id}")))?;

        if order.user_id != user_id {
            return Err(DomainError::Unauthorized);
        }
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;
    use std::sync::Mutex;

    use bigdecimal::BigDecimal;
    use chrono::Utc;

    use super::*;
    use crate::domain::order::OrderStatus;

    /// Fake store holding a fixed set of orders, recording the coupon code
    /// actually handed to `checkout`.
    struct FakeOrderRepo {
        orders: Vec<OrderView>,
        seen_coupon: Mutex<Option<Option<String>>>,
    }

    impl FakeOrderRepo {
        fn new(orders: Vec<OrderView>) -> Self {
            Self {
                orders,
                seen_coupon: Mutex::new(None),
            }
        }
    }

    fn order_for(user_id: Uuid) -> OrderView {
        OrderView {
            id: Uuid::new_v4(),
            user_id,
            total_amount: BigDecimal::from_str("10.00").unwrap(),
            coupon_code: None,
            discount: BigDecimal::from(0),
            final_amount: BigDecimal::from_str("10.00").unwrap(),
            status: OrderStatus::Completed,
            created_at: Utc::now(),
            lines: vec![],
        }
    }

    impl OrderRepository for FakeOrderRepo {
        fn checkout(
            &self,
            user_id: Uuid,
            coupon_code: Option<&str>,
        ) -> Result<OrderView, DomainError> {
            *self.seen_coupon.lock().unwrap() = Some(coupon_code.map(str::to_string));
            Ok(order_for(user_id))
        }

        fn find_by_id(&self, order_id: Uuid) -> Result<Option<OrderView>, DomainError> {
            Ok(self.orders.iter().find(|o| o.id == order_id).cloned())
        }

        fn find_by_user(&self, user_id: Uuid) -> Result<Vec<OrderView>, DomainError> {
            Ok(self
                .orders
                .iter()
                .filter(|o| o.user_id == user_id)
                .cloned()
                .collect())
        }
    }

    #[test]
    fn blank_coupon_code_becomes_none() {
        let service = OrderService::new(FakeOrderRepo::new(vec![]));

        service
            .checkout(Uuid::new_v4(), Some("   "))
            .expect("checkout should succeed");

        assert_eq!(*service.repo.seen_coupon.lock().unwrap(), Some(None));
    }

    #[test]
    fn coupon_code_is_trimmed() {
        let service = OrderService::new(FakeOrderRepo::new(vec![]));

        service
            .checkout(Uuid::new_v4(), Some(" SAVE10 "))
            .expect("checkout should succeed");

        assert_eq!(
            *service.repo.seen_coupon.lock().unwrap(),
            Some(Some("SAVE10".to_string()))
        );
    }

    #[test]
    fn order_by_id_rejects_other_users() {
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let order = order_for(owner);
        let order_id = order.id;
        let service = OrderService::new(FakeOrderRepo::new(vec![order]));

        let result = service.order_by_id(order_id, stranger);

        assert!(matches!(result, Err(DomainError::Unauthorized)));
    }

    #[test]
    fn order_by_id_returns_owned_order() {
        let owner = Uuid::new_v4();
        let order = order_for(owner);
        let order_id = order.id;
        let service = OrderService::new(FakeOrderRepo::new(vec![order]));

        let found = service.order_by_id(order_id, owner).expect("should find");
        assert_eq!(found.id, order_id);
    }

    #[test]
    fn order_by_id_reports_missing_orders() {
        let service = OrderService::new(FakeOrderRepo::new(vec![]));

        let result = service.order_by_id(Uuid::new_v4(), Uuid::new_v4());

        assert!(matches!(result, Err(DomainError::NotFound(_))));
    }
}
