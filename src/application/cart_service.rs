use uuid::Uuid;

use crate::domain::cart::CartLineView;
use crate::domain::errors::DomainError;
use crate::domain::ports::CartRepository;

pub struct CartService<R> {
    repo: R,
}

impl<R: CartRepository> CartService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn get_cart(&self, user_id: Uuid) -> Result<Vec<CartLineView>, DomainError> {
        self.repo.list(user_id)
    }

    pub fn add_to_cart(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<CartLineView, DomainError> {
        validate_quantity(quantity)?;
        self.repo.add(user_id, product_id, quantity)
    }

    pub fn update_quantity(
        &self,
        line_id: Uuid,
        quantity: i32,
        user_id: Uuid,
    ) -> Result<CartLineView, DomainError> {
        validate_quantity(quantity)?;
        self.repo.update_quantity(line_id, quantity, user_id)
    }

    pub fn remove_from_cart(&self, line_id: Uuid, user_id: Uuid) -> Result<(), DomainError> {
        self.repo.remove(line_id, user_id)
    }

    pub fn clear_cart(&self, user_id: Uuid) -> Result<(), DomainError> {
        self.repo.clear(user_id)
    }
}

fn validate_quantity(quantity: i32) -> Result<(), DomainError> {
    if quantity < 1 {
        return Err(DomainError::InvalidInput(
            "quantity must be at least 1".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::Utc;

    use super::*;

    /// Records calls so tests can assert the repository was never reached on
    /// invalid input.
    struct RecordingCartRepo {
        calls: Mutex<Vec<&'static str>>,
    }

    impl RecordingCartRepo {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
            }
        }

        fn line(user_id: Uuid, product_id: Uuid, quantity: i32) -> CartLineView {
            CartLineView {
                id: Uuid::new_v4(),
                user_id,
                product_id,
                quantity,
                created_at: Utc::now(),
            }
        }
    }

    impl CartRepository for RecordingCartRepo {
        fn list(&self, _user_id: Uuid) -> Result<Vec<CartLineView>, DomainError> {
            self.calls.lock().unwrap().push("list");
            Ok(vec![])
        }

        fn add(
            &self,
            user_id: Uuid,
            product_id: Uuid,
            quantity: i32,
        ) -> Result<CartLineView, DomainError> {
            self.calls.lock().unwrap().push("add");
            Ok(Self::line(user_id, product_id, quantity))
        }

        fn update_quantity(
            &self,
            _line_id: Uuid,
            quantity: i32,
            user_id: Uuid,
        ) -> Result<CartLineView, DomainError> {
            self.calls.lock().unwrap().push("update_quantity");
            Ok(Self::line(user_id, Uuid::new_v4(), quantity))
        }

        fn remove(&self, _line_id: Uuid, _user_id: Uuid) -> Result<(), DomainError> {
            self.calls.lock().unwrap().push("remove");
            Ok(())
        }

        fn clear(&self, _user_id: Uuid) -> Result<(), DomainError> {
            self.calls.lock().unwrap().push("clear");
            Ok(())
        }
    }

    #[test]
    fn add_rejects_zero_quantity_before_touching_the_repo() {
        let service = CartService::new(RecordingCartRepo::new());

        let result = service.add_to_cart(Uuid::new_v4(), Uuid::new_v4(), 0);

        assert!(matches!(result, Err(DomainError::InvalidInput(_))));
        assert!(service.repo.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn update_rejects_negative_quantity() {
        let service = CartService::new(RecordingCartRepo::new());

        let result = service.update_quantity(Uuid::new_v4(), -3, Uuid::new_v4());

        assert!(matches!(result, Err(DomainError::InvalidInput(_))));
        assert!(service.repo.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn valid_quantity_is_passed_through() {
        let service = CartService::new(RecordingCartRepo::new());
        let user_id = Uuid::new_v4();

        let line = service
            .add_to_cart(user_id, Uuid::new_v4(), 2)
            .expect("add should succeed");

        assert_eq!(line.user_id, user_id);
        assert_eq!(line.quantity, 2);
        assert_eq!(*service.repo.calls.lock().unwrap(), vec!["add"]);
    }
}
