use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::cart::CartLineView;
use crate::domain::errors::DomainError;
use crate::domain::ports::CartRepository;
use crate::schema::{cart_items, products};

use super::models::{CartItemRow, NewCartItemRow, ProductRow};

#[derive(Clone)]
pub struct DieselCartRepository {
    pool: DbPool,
}

impl DieselCartRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn to_view(row: CartItemRow) -> CartLineView {
    CartLineView {
        id: row.id,
        user_id: row.user_id,
        product_id: row.product_id,
        quantity: row.quantity,
        created_at: row.created_at,
    }
}

fn load_product(
    conn: &mut PgConnection,
    product_id: Uuid,
) -> Result<ProductRow, DomainError> {
    products::table
        .filter(products::id.eq(product_id))
        .select(ProductRow::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| DomainError::NotFound(format!("Product {product_id}")))
}

fn load_owned_item(
    conn: &mut PgConnection,
    line_id: Uuid,
    user_id: Uuid,
) -> Result<CartItemRow, DomainError> {
    let item: CartItemRow = cart_items::table
        .filter(cart_items::id.eq(line_id))
        .select(CartItemRow::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| DomainError::NotFound(format!("Cart item {line_id}")))?;

    if item.user_id != user_id {
        return Err(DomainError::Unauthorized);
    }
    Ok(item)
}

impl CartRepository for DieselCartRepository {
    fn list(&self, user_id: Uuid) -> Result<Vec<CartLineView>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = cart_items::table
            .filter(cart_items::user_id.eq(user_id))
            .select(CartItemRow::as_select())
            .load(&mut conn)?;

        Ok(rows.into_iter().map(to_view).collect())
    }

    fn add(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<CartLineView, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let product = load_product(conn, product_id)?;
            if product.stock < quantity {
                return Err(DomainError::InsufficientStock(product.name));
            }

            // One line per (user, product): increment an existing line
            // instead of inserting a duplicate.
            let existing: Option<CartItemRow> = cart_items::table
                .filter(cart_items::user_id.eq(user_id))
                .filter(cart_items::product_id.eq(product_id))
                .select(CartItemRow::as_select())
                .first(conn)
                .optional()?;

            let row = match existing {
                Some(item) => diesel::update(cart_items::table.filter(cart_items::id.eq(item.id)))
                    .set(cart_items::quantity.eq(item.quantity + quantity))
                    .returning(CartItemRow::as_returning())
                    .get_result(conn)?,
                None => diesel::insert_into(cart_items::table)
                    .values(&NewCartItemRow {
                        id: Uuid::new_v4(),
                        user_id,
                        product_id,
                        quantity,
                    })
                    .returning(CartItemRow::as_returning())
                    .get_result(conn)?,
            };

            Ok(to_view(row))
        })
    }

    fn update_quantity(
        &self,
        line_id: Uuid,
        quantity: i32,
        user_id: Uuid,
    ) -> Result<CartLineView, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let item = load_owned_item(conn, line_id, user_id)?;

            // Re-checked against live stock; nothing is reserved until
            // checkout, which validates again inside its own transaction.
            let product = load_product(conn, item.product_id)?;
            if product.stock < quantity {
                return Err(DomainError::InsufficientStock(product.name));
            }

            let row = diesel::update(cart_items::table.filter(cart_items::id.eq(item.id)))
                .set(cart_items::quantity.eq(quantity))
                .returning(CartItemRow::as_returning())
                .get_result(conn)?;

            Ok(to_view(row))
        })
    }

    fn remove(&self, line_id: Uuid, user_id: Uuid) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let item = load_owned_item(conn, line_id, user_id)?;
            diesel::delete(cart_items::table.filter(cart_items::id.eq(item.id))).execute(conn)?;
            Ok(())
        })
    }

    fn clear(&self, user_id: Uuid) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        diesel::delete(cart_items::table.filter(cart_items::user_id.eq(user_id)))
            .execute(&mut conn)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::DieselCartRepository;
    use crate::domain::errors::DomainError;
    use crate::domain::ports::CartRepository;
    use crate::infrastructure::testutil::{insert_product, setup_db};

    #[tokio::test]
    async fn add_creates_a_line_and_list_returns_it() {
        let (_container, pool) = setup_db().await;
        let repo = DieselCartRepository::new(pool.clone());
        let user_id = Uuid::new_v4();
        let product_id = insert_product(&pool, "Keyboard", "49.99", 10);

        let line = repo.add(user_id, product_id, 2).expect("add failed");
        assert_eq!(line.product_id, product_id);
        assert_eq!(line.quantity, 2);

        let lines = repo.list(user_id).expect("list failed");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].id, line.id);
    }

    #[tokio::test]
    async fn adding_same_product_twice_increments_the_line() {
        let (_container, pool) = setup_db().await;
        let repo = DieselCartRepository::new(pool.clone());
        let user_id = Uuid::new_v4();
        let product_id = insert_product(&pool, "Mouse", "19.99", 10);

        repo.add(user_id, product_id, 2).expect("first add failed");
        let line = repo.add(user_id, product_id, 3).expect("second add failed");

        assert_eq!(line.quantity, 5);
        assert_eq!(repo.list(user_id).expect("list failed").len(), 1);
    }

    #[tokio::test]
    async fn add_fails_for_unknown_product() {
        let (_container, pool) = setup_db().await;
        let repo = DieselCartRepository::new(pool);

        let result = repo.add(Uuid::new_v4(), Uuid::new_v4(), 1);

        assert!(matches!(result, Err(DomainError::NotFound(_))));
    }

    #[tokio::test]
    async fn add_fails_when_quantity_exceeds_stock() {
        let (_container, pool) = setup_db().await;
        let repo = DieselCartRepository::new(pool.clone());
        let product_id = insert_product(&pool, "Webcam", "89.99", 3);

        let result = repo.add(Uuid::new_v4(), product_id, 4);

        assert!(matches!(result, Err(DomainError::InsufficientStock(_))));
    }

    #[tokio::test]
    async fn update_quantity_rechecks_live_stock() {
        let (_container, pool) = setup_db().await;
        let repo = DieselCartRepository::new(pool.clone());
        let user_id = Uuid::new_v4();
        let product_id = insert_product(&pool, "Monitor", "199.00", 5);

        let line = repo.add(user_id, product_id, 1).expect("add failed");

        let updated = repo
            .update_quantity(line.id, 5, user_id)
            .expect("update failed");
        assert_eq!(updated.quantity, 5);

        let result = repo.update_quantity(line.id, 6, user_id);
        assert!(matches!(result, Err(DomainError::InsufficientStock(_))));
    }

    #[tokio::test]
    async fn update_and_remove_reject_other_users() {
        let (_container, pool) = setup_db().await;
        let repo = DieselCartRepository::new(pool.clone());
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let product_id = insert_product(&pool, "Desk", "299.00", 5);

        let line = repo.add(owner, product_id, 1).expect("add failed");

        assert!(matches!(
            repo.update_quantity(line.id, 2, stranger),
            Err(DomainError::Unauthorized)
        ));
        assert!(matches!(
            repo.remove(line.id, stranger),
            Err(DomainError::Unauthorized)
        ));
        // Still present for the owner after both rejected attempts.
        assert_eq!(repo.list(owner).expect("list failed").len(), 1);
    }

    #[tokio::test]
    async fn remove_deletes_the_line() {
        let (_container, pool) = setup_db().await;
        let repo = DieselCartRepository::new(pool.clone());
        let user_id = Uuid::new_v4();
        let product_id = insert_product(&pool, "Lamp", "24.99", 5);

        let line = repo.add(user_id, product_id, 1).expect("add failed");
        repo.remove(line.id, user_id).expect("remove failed");

        assert!(repo.list(user_id).expect("list failed").is_empty());
        assert!(matches!(
            repo.remove(line.id, user_id),
            Err(DomainError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn clear_is_idempotent() {
        let (_container, pool) = setup_db().await;
        let repo = DieselCartRepository::new(pool.clone());
        let user_id = Uuid::new_v4();
        let product_id = insert_product(&pool, "Chair", "149.00", 5);

        repo.add(user_id, product_id, 2).expect("add failed");
        repo.clear(user_id).expect("clear failed");
        assert!(repo.list(user_id).expect("list failed").is_empty());

        // Clearing an already-empty cart is a no-op.
        repo.clear(user_id).expect("second clear failed");
    }
}
