pub mod application;
pub mod auth;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use application::cart_service::CartService;
use application::order_service::OrderService;
use infrastructure::cart_repo::DieselCartRepository;
use infrastructure::order_repo::DieselOrderRepository;

pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) {
    let mut conn = pool.get().expect("Failed to get DB connection for migrations");
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Failed to run database migrations");
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::cart::get_cart,
        handlers::cart::add_to_cart,
        handlers::cart::update_quantity,
        handlers::cart::remove_from_cart,
        handlers::orders::checkout,
        handlers::orders::order_history,
        handlers::orders::get_order,
    ),
    components(schemas(
        handlers::cart::AddToCartRequest,
        handlers::cart::UpdateQuantityRequest,
        handlers::cart::CartLineResponse,
        handlers::orders::CheckoutRequest,
        handlers::orders::OrderLineResponse,
        handlers::orders::OrderResponse,
    )),
    tags(
        (name = "cart", description = "Shopping cart management (buyer only)"),
        (name = "orders", description = "Checkout and order history (buyer only)")
    )
)]
pub struct ApiDoc;

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    pool: DbPool,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let cart_service = web::Data::new(CartService::new(DieselCartRepository::new(pool.clone())));
    let order_service = web::Data::new(OrderService::new(DieselOrderRepository::new(pool)));

    Ok(HttpServer::new(move || {
        App::new()
            .app_data(cart_service.clone())
            .app_data(order_service.clone())
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                errors::AppError::BadRequest(err.to_string()).into()
            }))
            .wrap(Logger::default())
            .service(
                web::scope("/api/cart")
                    .route("", web::get().to(handlers::cart::get_cart))
                    .route("", web::post().to(handlers::cart::add_to_cart))
                    .route("/{id}", web::put().to(handlers::cart::update_quantity))
                    .route("/{id}", web::delete().to(handlers::cart::remove_from_cart)),
            )
            .service(
                web::scope("/api/orders")
                    .route("/checkout", web::post().to(handlers::orders::checkout))
                    .route("", web::get().to(handlers::orders::order_history))
                    .route("/{id}", web::get().to(handlers::orders::get_order)),
            )
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
