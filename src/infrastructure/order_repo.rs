use bigdecimal::BigDecimal;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::order::{cart_total, final_amount, OrderLineView, OrderStatus, OrderView};
use crate::domain::ports::OrderRepository;
use crate::schema::{cart_items, coupons, order_lines, orders, products};

use super::models::{
    CartItemRow, CouponRow, NewOrderLineRow, NewOrderRow, OrderLineRow, OrderRow, ProductRow,
};

#[derive(Clone)]
pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn to_view(order: OrderRow, lines: Vec<OrderLineRow>) -> Result<OrderView, DomainError> {
    let status = OrderStatus::parse(&order.status)
        .ok_or_else(|| DomainError::Internal(format!("Unknown order status '{}'", order.status)))?;

    Ok(OrderView {
        id: order.id,
        user_id: order.user_id,
        total_amount: order.total_amount,
        coupon_code: order.coupon_code,
        discount: order.discount,
        final_amount: order.final_amount,
        status,
        created_at: order.created_at,
        lines: lines
            .into_iter()
            .map(|l| OrderLineView {
                id: l.id,
                product_id: l.product_id,
                product_name: l.product_name,
                quantity: l.quantity,
                unit_price: l.unit_price,
            })
            .collect(),
    })
}

impl OrderRepository for DieselOrderRepository {
    fn checkout(&self, user_id: Uuid, coupon_code: Option<&str>) -> Result<OrderView, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let items: Vec<CartItemRow> = cart_items::table
                .filter(cart_items::user_id.eq(user_id))
                .order(cart_items::created_at.asc())
                .select(CartItemRow::as_select())
                .load(conn)?;

            if items.is_empty() {
                return Err(DomainError::EmptyCart);
            }

            // Validate every line before mutating anything. The rows are
            // locked with FOR UPDATE so a concurrent checkout touching the
            // same product cannot pass this check until we commit or roll
            // back; the check-then-decrement pair behaves atomically.
            let mut line_products: Vec<ProductRow> = Vec::with_capacity(items.len());
            for item in &items {
                let product: ProductRow = products::table
                    .filter(products::id.eq(item.product_id))
                    .select(ProductRow::as_select())
                    .for_update()
                    .first(conn)
                    .optional()?
                    .ok_or_else(|| DomainError::NotFound(format!("Product {}", item.product_id)))?;

                if product.stock < item.quantity {
                    return Err(DomainError::InsufficientStock(product.name));
                }
                line_products.push(product);
            }

            let total_amount = cart_total(
                items
                    .iter()
                    .zip(&line_products)
                    .map(|(item, product)| (&product.price, item.quantity)),
            );

            let (discount, applied_code) = match coupon_code {
                Some(code) => {
                    let coupon: CouponRow = coupons::table
                        .filter(coupons::code.eq(code))
                        .filter(coupons::active.eq(true))
                        .select(CouponRow::as_select())
                        .first(conn)
                        .optional()?
                        .ok_or(DomainError::InvalidCoupon)?;
                    (coupon.discount_amount, Some(coupon.code))
                }
                None => (BigDecimal::from(0), None),
            };

            let final_amount = final_amount(&total_amount, &discount);

            let order: OrderRow = diesel::insert_into(orders::table)
                .values(&NewOrderRow {
                    id: Uuid::new_v4(),
                    user_id,
                    total_amount,
                    coupon_code: applied_code,
                    discount,
                    final_amount,
                    status: OrderStatus::Completed.as_str().to_string(),
                })
                .returning(OrderRow::as_returning())
                .get_result(conn)?;

            // Snapshot each cart line and decrement its product's stock.
            // The decrement is conditional on sufficient stock as a second
            // line of defense; zero affected rows aborts the transaction.
            let new_lines: Vec<NewOrderLineRow> = items
                .iter()
                .zip(&line_products)
                .map(|(item, product)| NewOrderLineRow {
                    id: Uuid::new_v4(),
                    order_id: order.id,
                    product_id: product.id,
                    product_name: product.name.clone(),
                    quantity: item.quantity,
                    unit_price: product.price.clone(),
                })
                .collect();
            let lines: Vec<OrderLineRow> = diesel::insert_into(order_lines::table)
                .values(&new_lines)
                .returning(OrderLineRow::as_returning())
                .get_results(conn)?;

            for (item, product) in items.iter().zip(&line_products) {
                let updated = diesel::update(
                    products::table
                        .filter(products::id.eq(product.id))
                        .filter(products::stock.ge(item.quantity)),
                )
                .set(products::stock.eq(products::stock - item.quantity))
                .execute(conn)?;

                if updated == 0 {
                    return Err(DomainError::InsufficientStock(product.name.clone()));
                }
            }

            diesel::delete(cart_items::table.filter(cart_items::user_id.eq(user_id)))
                .execute(conn)?;

            to_view(order, lines)
        })
    }

    fn find_by_id(&self, order_id: Uuid) -> Result<Option<OrderView>, DomainError> {
        let mut conn = self.pool.get()?;

        let order = orders::table
            .filter(orders::id.eq(order_id))
            .select(OrderRow::as_select())
            .first(&mut conn)
            .optional()?;

        let Some(order) = order else {
            return Ok(None);
        };

        let lines = order_lines::table
            .filter(order_lines::order_id.eq(order.id))
            .select(OrderLineRow::as_select())
            .load(&mut conn)?;

        to_view(order, lines).map(Some)
    }

    fn find_by_user(&self, user_id: Uuid) -> Result<Vec<OrderView>, DomainError> {
        let mut conn = self.pool.get()?;

        let order_rows: Vec<OrderRow> = orders::table
            .filter(orders::user_id.eq(user_id))
            .order(orders::created_at.desc())
            .select(OrderRow::as_select())
            .load(&mut conn)?;

        let lines: Vec<OrderLineRow> = OrderLineRow::belonging_to(&order_rows)
            .select(OrderLineRow::as_select())
            .load(&mut conn)?;

        lines
            .grouped_by(&order_rows)
            .into_iter()
            .zip(order_rows)
            .map(|(lines, order)| to_view(order, lines))
            .collect()
    }
}
