//! In-process storefront backend for end-to-end tests.
//!
//! [`TestBackend`] serves the same routes, payload shapes, and plain-text
//! error responses as the real storefront server, backed by in-memory
//! tables. Tests seed it, point an [`ApiClient`] at it, and inspect the
//! tables afterwards.
//!
//! ```rust,ignore
//! let backend = TestBackend::spawn().await;
//! backend.add_user("alice", "alice@example.com", "secret", "user");
//! let client = backend.client();
//! client.login("alice", &SecretString::from("secret")).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::Router;
use axum::extract::{Json, Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use shopfront_client::{ApiClient, MemoryStorage, Session};
use tokio::net::TcpListener;

/// A registered account.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

/// A catalog row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredProduct {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: i64,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub image: String,
}

/// A cart row.
#[derive(Debug, Clone)]
pub struct CartRow {
    pub id: i64,
    pub user_id: i64,
    pub product_id: i64,
    pub quantity: i64,
}

/// An order row.
#[derive(Debug, Clone)]
pub struct StoredOrder {
    pub id: i64,
    pub user_id: i64,
    pub status: String,
    pub total_price: i64,
    pub created_at: DateTime<Utc>,
}

/// The backend's tables plus switches for failure scenarios.
#[derive(Debug)]
pub struct BackendState {
    pub users: Vec<User>,
    pub products: Vec<StoredProduct>,
    pub cart: Vec<CartRow>,
    pub orders: Vec<StoredOrder>,
    /// Every request as `METHOD /path`, in arrival order.
    pub requests: Vec<String>,
    /// Make `DELETE /cart/clear` fail.
    pub fail_cart_clear: bool,
    next_id: i64,
}

impl BackendState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn user_by_name(&self, username: &str) -> Option<&User> {
        self.users.iter().find(|u| u.username == username)
    }
}

type Shared = Arc<Mutex<BackendState>>;

fn lock(state: &Shared) -> MutexGuard<'_, BackendState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Where the server exposes the admin listing of every order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminListing {
    /// `GET /orders/getall`
    GetAll,
    /// `GET /orders/all`
    All,
    /// No dedicated listing.
    None,
}

/// A running in-process backend.
#[derive(Debug, Clone)]
pub struct TestBackend {
    pub base_url: String,
    state: Shared,
}

impl TestBackend {
    /// Start a backend with the standard routes.
    pub async fn spawn() -> Self {
        Self::spawn_with(AdminListing::GetAll).await
    }

    /// Start a backend exposing the admin listing at `listing`.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    #[allow(clippy::unwrap_used)]
    pub async fn spawn_with(listing: AdminListing) -> Self {
        let state: Shared = Arc::new(Mutex::new(BackendState {
            users: Vec::new(),
            products: Vec::new(),
            cart: Vec::new(),
            orders: Vec::new(),
            requests: Vec::new(),
            fail_cart_clear: false,
            next_id: 0,
        }));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = router(listing, state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    /// Lock the tables.
    pub fn state(&self) -> MutexGuard<'_, BackendState> {
        lock(&self.state)
    }

    /// Register an account directly, returning its ID.
    pub fn add_user(&self, username: &str, email: &str, password: &str, role: &str) -> i64 {
        let mut state = self.state();
        let id = state.next_id();
        state.users.push(User {
            id,
            username: username.to_owned(),
            email: email.to_owned(),
            password: password.to_owned(),
            role: role.to_owned(),
        });
        id
    }

    /// Add a product directly, returning its ID.
    pub fn add_product(&self, name: &str, price: i64, stock: i64) -> i64 {
        let mut state = self.state();
        let id = state.next_id();
        state.products.push(StoredProduct {
            id,
            name: name.to_owned(),
            description: format!("{name} description"),
            price,
            stock,
            image: String::new(),
        });
        id
    }

    /// Add an order directly, returning its ID.
    pub fn add_order(&self, user_id: i64, status: &str, total_price: i64) -> i64 {
        let mut state = self.state();
        let id = state.next_id();
        state.orders.push(StoredOrder {
            id,
            user_id,
            status: status.to_owned(),
            total_price,
            created_at: Utc::now(),
        });
        id
    }

    /// The requests received so far.
    pub fn requests(&self) -> Vec<String> {
        self.state().requests.clone()
    }

    /// A client with in-memory storage pointed at this backend.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[allow(clippy::unwrap_used)]
    pub fn client(&self) -> ApiClient {
        let session = Session::new(
            Arc::new(MemoryStorage::new()),
            Arc::new(MemoryStorage::new()),
        )
        .with_base_url_override(Some(self.base_url.clone()));
        ApiClient::new(session).unwrap()
    }
}

fn router(listing: AdminListing, state: Shared) -> Router {
    let mut app = Router::new()
        .route("/registration", post(registration))
        .route("/login", post(login))
        .route("/profile", get(profile))
        .route("/products", get(list_products).post(create_products))
        .route(
            "/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/cart/", get(get_cart))
        .route("/cart/add", post(add_cart))
        .route("/cart/remove", post(remove_cart))
        .route("/cart/clear", delete(clear_cart))
        .route("/orders/", get(my_orders).post(create_order))
        .route("/orders/update", post(update_status))
        .route("/orders/{id}", get(order_by_id));
    app = match listing {
        AdminListing::GetAll => app.route("/orders/getall", get(all_orders)),
        AdminListing::All => app.route("/orders/all", get(all_orders)),
        AdminListing::None => app,
    };
    app.layer(axum::middleware::from_fn_with_state(state.clone(), record))
        .with_state(state)
}

async fn record(
    State(state): State<Shared>,
    request: axum::extract::Request,
    next: axum::middleware::Next,
) -> Response {
    let line = format!("{} {}", request.method(), request.uri().path());
    lock(&state).requests.push(line);
    next.run(request).await
}

/// A plain-text error, newline-terminated like the server's.
fn text_error(status: StatusCode, message: &str) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        format!("{message}\n"),
    )
        .into_response()
}

fn message(text: &str) -> Response {
    Json(json!({ "message": text })).into_response()
}

/// Resolve the bearer token to a user.
fn authenticate(state: &BackendState, headers: &HeaderMap) -> Result<User, Response> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let Some(token) = value.strip_prefix("Bearer ").filter(|t| !t.is_empty()) else {
        return Err(text_error(StatusCode::UNAUTHORIZED, "Unauthorized"));
    };
    token
        .strip_prefix("token-")
        .and_then(|name| state.user_by_name(name))
        .cloned()
        .ok_or_else(|| text_error(StatusCode::UNAUTHORIZED, "Invalid token"))
}

fn parse_id(raw: &str) -> Result<i64, Response> {
    raw.parse()
        .map_err(|_| text_error(StatusCode::INTERNAL_SERVER_ERROR, "invalid param"))
}

#[derive(Deserialize)]
struct RegistrationBody {
    username: String,
    password: String,
    email: String,
    role: String,
}

async fn registration(State(state): State<Shared>, Json(body): Json<RegistrationBody>) -> Response {
    let mut state = lock(&state);
    if state
        .users
        .iter()
        .any(|u| u.username == body.username || u.email == body.email)
    {
        return text_error(StatusCode::CONFLICT, "Username or email already exists");
    }
    let id = state.next_id();
    state.users.push(User {
        id,
        username: body.username,
        email: body.email,
        password: body.password,
        role: body.role,
    });
    message("User registered!")
}

#[derive(Deserialize)]
struct LoginBody {
    nameoremail: String,
    password: String,
}

async fn login(State(state): State<Shared>, Json(body): Json<LoginBody>) -> Response {
    let state = lock(&state);
    let Some(user) = state
        .users
        .iter()
        .find(|u| u.username == body.nameoremail || u.email == body.nameoremail)
    else {
        return text_error(StatusCode::UNAUTHORIZED, "Invalid username or password");
    };
    if user.password != body.password {
        return text_error(StatusCode::UNAUTHORIZED, "Wrong password!");
    }
    Json(json!({ "token": format!("token-{}", user.username) })).into_response()
}

async fn profile(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = lock(&state);
    match authenticate(&state, &headers) {
        Ok(user) => Json(json!({
            "username": user.username,
            "email": user.email,
            "role": user.role,
        }))
        .into_response(),
        Err(response) => response,
    }
}

async fn list_products(State(state): State<Shared>) -> Response {
    let state = lock(&state);
    if state.products.is_empty() {
        return Json(Value::Null).into_response();
    }
    let listing: Vec<Value> = state
        .products
        .iter()
        .map(|p| json!({ "id": p.id, "name": p.name, "price": p.price, "image": p.image }))
        .collect();
    Json(listing).into_response()
}

async fn get_product(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let state = lock(&state);
    state.products.iter().find(|p| p.id == id).map_or_else(
        || text_error(StatusCode::NOT_FOUND, "product not found"),
        |p| Json(p.clone()).into_response(),
    )
}

async fn create_products(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(products): Json<Vec<StoredProduct>>,
) -> Response {
    let mut state = lock(&state);
    let user = match authenticate(&state, &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    if user.role != "admin" {
        return text_error(StatusCode::NOT_ACCEPTABLE, "User can't post products!");
    }
    for mut product in products {
        product.id = state.next_id();
        state.products.push(product);
    }
    message("Products posted!")
}

async fn update_product(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(update): Json<StoredProduct>,
) -> Response {
    let mut state = lock(&state);
    let user = match authenticate(&state, &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    if user.role != "admin" {
        return text_error(StatusCode::NOT_ACCEPTABLE, "User can't put products!");
    }
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    if let Some(product) = state.products.iter_mut().find(|p| p.id == id) {
        if !update.name.is_empty() {
            product.name = update.name;
        }
        if !update.description.is_empty() {
            product.description = update.description;
        }
        product.price = update.price;
        if update.stock != 0 {
            product.stock = update.stock;
        }
        if !update.image.is_empty() {
            product.image = update.image;
        }
    }
    message("Updated successfully!")
}

async fn delete_product(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let mut state = lock(&state);
    let user = match authenticate(&state, &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    if user.role != "admin" {
        return text_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "User can't to delete products!",
        );
    }
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    state.products.retain(|p| p.id != id);
    message("Deleted successfully!")
}

async fn get_cart(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = lock(&state);
    let user = match authenticate(&state, &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let lines: Vec<Value> = state
        .cart
        .iter()
        .filter(|row| row.user_id == user.id)
        .filter_map(|row| {
            let product = state.products.iter().find(|p| p.id == row.product_id)?;
            Some(json!({
                "id": row.id,
                "product_name": product.name,
                "product_price": product.price.to_string(),
                "quantity": row.quantity,
            }))
        })
        .collect();
    Json(lines).into_response()
}

#[derive(Deserialize)]
struct CartAdd {
    product_id: i64,
    quantity: i64,
}

async fn add_cart(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(items): Json<Vec<CartAdd>>,
) -> Response {
    let mut state = lock(&state);
    let user = match authenticate(&state, &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    for item in &items {
        let Some(product) = state.products.iter().find(|p| p.id == item.product_id) else {
            return text_error(StatusCode::INTERNAL_SERVER_ERROR, "Invalid product id");
        };
        if product.stock < item.quantity {
            return text_error(StatusCode::INTERNAL_SERVER_ERROR, "too much quantity");
        }
    }
    for item in items {
        let id = state.next_id();
        state.cart.push(CartRow {
            id,
            user_id: user.id,
            product_id: item.product_id,
            quantity: item.quantity,
        });
    }
    message("Cart added successfully!")
}

#[derive(Deserialize)]
struct IdBody {
    id: i64,
}

async fn remove_cart(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<IdBody>,
) -> Response {
    let mut state = lock(&state);
    let user = match authenticate(&state, &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    state
        .cart
        .retain(|row| !(row.user_id == user.id && row.id == body.id));
    message("Deleted successfully")
}

async fn clear_cart(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let mut state = lock(&state);
    let user = match authenticate(&state, &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    if state.fail_cart_clear {
        return text_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "error while clearing table",
        );
    }
    state.cart.retain(|row| row.user_id != user.id);
    message("Cleared successfully")
}

#[derive(Deserialize)]
struct OrderBody {
    status: String,
    total_price: i64,
    created_at: DateTime<Utc>,
}

async fn create_order(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<OrderBody>,
) -> Response {
    let mut state = lock(&state);
    let user = match authenticate(&state, &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let id = state.next_id();
    state.orders.push(StoredOrder {
        id,
        user_id: user.id,
        status: body.status,
        total_price: body.total_price,
        created_at: body.created_at,
    });
    message("order created!")
}

fn order_display(order: &StoredOrder) -> Value {
    json!({
        "id": order.id,
        "status": order.status,
        "total_price": order.total_price,
        "created_at": order.created_at,
    })
}

async fn my_orders(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = lock(&state);
    let user = match authenticate(&state, &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let orders: Vec<Value> = state
        .orders
        .iter()
        .filter(|o| o.user_id == user.id)
        .map(order_display)
        .collect();
    if orders.is_empty() {
        return Json(Value::Null).into_response();
    }
    Json(orders).into_response()
}

async fn order_by_id(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let state = lock(&state);
    let user = match authenticate(&state, &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    state
        .orders
        .iter()
        .find(|o| o.id == id && o.user_id == user.id)
        .map_or_else(
            || text_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server errror"),
            |o| Json(order_display(o)).into_response(),
        )
}

#[derive(Deserialize)]
struct StatusBody {
    id: i64,
    status: String,
}

async fn update_status(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<StatusBody>,
) -> Response {
    let mut state = lock(&state);
    let user = match authenticate(&state, &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    if user.role != "admin" {
        return text_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "only admin can change status",
        );
    }
    if let Some(order) = state.orders.iter_mut().find(|o| o.id == body.id) {
        order.status = body.status;
    }
    message("updated!")
}

async fn all_orders(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = lock(&state);
    let user = match authenticate(&state, &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    if user.role != "admin" {
        return text_error(StatusCode::METHOD_NOT_ALLOWED, "Permission denied");
    }
    if state.orders.is_empty() {
        return Json(Value::Null).into_response();
    }
    let orders: Vec<Value> = state
        .orders
        .iter()
        .map(|o| {
            json!({
                "user_id": o.user_id,
                "id": o.id,
                "status": o.status,
                "total_price": o.total_price,
                "created_at": o.created_at,
            })
        })
        .collect();
    Json(orders).into_response()
}
