use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tokio::net::TcpListener;

use rust_bookstore_client::catalog::{CatalogError, LOAD_FAILED, SAVE_FAILED};
use rust_bookstore_client::config::ClientConfig;
use rust_bookstore_client::http::{ApiError, HttpBookRepo};
use rust_bookstore_client::models::NewBook;
use rust_bookstore_client::repo::BookRepo;
use rust_bookstore_client::start_client;

// Note: the stub API has its own models rather than reusing the client's
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
struct StoredBook {
    id: i32,
    title: String,
    author: String,
    isbn: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
struct BookInput {
    title: String,
    author: String,
    isbn: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Request {
    List,
    Insert(BookInput),
    Update(i32, BookInput),
    Delete(i32),
}

#[derive(Default)]
struct Store {
    books: Vec<StoredBook>,
    next_id: i32,
    requests: Vec<Request>,
    fail_list: bool,
}

/// In-memory stand-in for the books API, serving the same routes
#[derive(Clone, Default)]
struct StubApi {
    store: Arc<Mutex<Store>>,
}

impl StubApi {
    fn requests(&self) -> Vec<Request> {
        self.store.lock().unwrap().requests.clone()
    }

    fn titles(&self) -> Vec<String> {
        let store = self.store.lock().unwrap();
        store.books.iter().map(|b| b.title.clone()).collect()
    }
}

fn build_stub(api: StubApi) -> Router {
    Router::new()
        .route("/books", get(list_books).post(insert_book))
        .route("/books/{id}", axum::routing::put(update_book).delete(delete_book))
        .with_state(api)
}

async fn list_books(
    State(api): State<StubApi>,
) -> Result<Json<Vec<StoredBook>>, (StatusCode, String)> {
    let mut store = api.store.lock().unwrap();
    store.requests.push(Request::List);
    if store.fail_list {
        return Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            "database unavailable".to_string(),
        ));
    }
    Ok(Json(store.books.clone()))
}

async fn insert_book(State(api): State<StubApi>, Json(input): Json<BookInput>) -> Json<StoredBook> {
    let mut store = api.store.lock().unwrap();
    store.requests.push(Request::Insert(input.clone()));
    store.next_id += 1;
    let book = StoredBook {
        id: store.next_id,
        title: input.title,
        author: input.author,
        isbn: input.isbn,
    };
    store.books.push(book.clone());
    Json(book)
}

async fn update_book(
    State(api): State<StubApi>,
    Path(id): Path<i32>,
    Json(input): Json<BookInput>,
) -> Result<Json<StoredBook>, (StatusCode, String)> {
    let mut store = api.store.lock().unwrap();
    store.requests.push(Request::Update(id, input.clone()));
    match store.books.iter_mut().find(|b| b.id == id) {
        Some(book) => {
            book.title = input.title;
            book.author = input.author;
            book.isbn = input.isbn;
            Ok(Json(book.clone()))
        }
        None => Err((
            StatusCode::NOT_FOUND,
            format!("No book found with ID: {}", id),
        )),
    }
}

async fn delete_book(State(api): State<StubApi>, Path(id): Path<i32>) -> StatusCode {
    let mut store = api.store.lock().unwrap();
    store.requests.push(Request::Delete(id));
    let before = store.books.len();
    store.books.retain(|b| b.id != id);
    if store.books.len() < before {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

/// Run the stub API on an ephemeral port in the background
async fn start_stub(api: StubApi) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = build_stub(api);
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

fn config_for(addr: SocketAddr) -> ClientConfig {
    ClientConfig::with_base_url(&format!("http://{addr}")).unwrap()
}

fn dune() -> BookInput {
    BookInput {
        title: "Dune".to_string(),
        author: "Herbert".to_string(),
        isbn: 9780441013593,
    }
}

#[tokio::test]
async fn catalog_round_trip_against_stub_api() {
    let api = StubApi::default();
    let addr = start_stub(api.clone()).await;
    let catalog = start_client(&config_for(addr));

    // Start with an empty catalog
    assert_eq!(0, catalog.load().await.unwrap());

    // Create a book through the form
    catalog.open_create().unwrap();
    catalog
        .edit_draft(|draft| {
            draft.title = "Dune".to_string();
            draft.author = "Herbert".to_string();
            draft.isbn = "9780441013593".to_string();
        })
        .unwrap();
    let created = catalog.submit().await.unwrap();
    assert_eq!(1, created.id);

    let state = catalog.snapshot();
    assert!(!state.form.is_open());
    assert_eq!(vec![created.clone()], state.books);
    assert_eq!(
        vec![Request::List, Request::Insert(dune()), Request::List],
        api.requests()
    );

    // Edit only the author; the whole record is sent with PUT
    catalog.open_edit(created.id).unwrap();
    catalog
        .edit_draft(|draft| draft.author = "Frank Herbert".to_string())
        .unwrap();
    let updated = catalog.submit().await.unwrap();
    assert_eq!(created.id, updated.id);
    assert_eq!("Frank Herbert", updated.author);

    let mut expected = dune();
    expected.author = "Frank Herbert".to_string();
    assert_eq!(
        Some(&Request::Update(1, expected)),
        api.requests().get(3)
    );
    assert_eq!(vec![updated.clone()], catalog.snapshot().books);

    // Delete it after confirming
    catalog.request_delete(updated.id).unwrap();
    catalog.confirm_delete().await.unwrap();
    assert_eq!(
        vec![Request::Delete(1), Request::List],
        api.requests()[5..].to_vec()
    );
    assert!(catalog.snapshot().books.is_empty());
    assert!(api.titles().is_empty());
}

#[tokio::test]
async fn server_error_on_startup_shows_banner() {
    let api = StubApi::default();
    api.store.lock().unwrap().fail_list = true;
    let addr = start_stub(api.clone()).await;
    let catalog = start_client(&config_for(addr));

    let result = catalog.load().await;

    assert!(matches!(result, Err(CatalogError::Request(_))));
    let state = catalog.snapshot();
    assert!(state.books.is_empty());
    assert_eq!(Some(LOAD_FAILED.to_string()), state.error);
    assert!(!catalog.is_busy());
}

#[tokio::test]
async fn updating_a_vanished_book_keeps_the_form_open() {
    let api = StubApi::default();
    let addr = start_stub(api.clone()).await;
    let catalog = start_client(&config_for(addr));

    catalog.open_create().unwrap();
    catalog
        .edit_draft(|draft| {
            draft.title = "Dune".to_string();
            draft.author = "Herbert".to_string();
            draft.isbn = "9780441013593".to_string();
        })
        .unwrap();
    let created = catalog.submit().await.unwrap();

    // Someone else deletes it behind our back
    api.store.lock().unwrap().books.clear();

    catalog.open_edit(created.id).unwrap();
    let result = catalog.submit().await;

    assert!(matches!(result, Err(CatalogError::Request(_))));
    let state = catalog.snapshot();
    assert_eq!(Some(created.id), state.form.editing_id());
    assert_eq!(Some(SAVE_FAILED.to_string()), state.error);
    assert_eq!(vec![created], state.books);
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let api = StubApi::default();
    let addr = start_stub(api.clone()).await;
    let repo = HttpBookRepo::new(&config_for(addr));

    let new_book = NewBook {
        title: "foo".to_string(),
        author: "bar".to_string(),
        isbn: 1,
    };
    let err = repo.update_book(99, new_book).await.unwrap_err();
    assert!(matches!(
        err,
        ApiError::StatusError { status, .. } if status == StatusCode::NOT_FOUND
    ));

    let err = repo.delete_book(99).await.unwrap_err();
    assert!(matches!(err, ApiError::StatusError { .. }));
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    // Grab a free port, then close it again so nothing is listening
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let repo = HttpBookRepo::new(&config_for(addr));
    let err = repo.list_books().await.unwrap_err();

    assert!(matches!(err, ApiError::TransportError(_)));
}
