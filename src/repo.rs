use crate::models::{Book, NewBook};
use std::error::Error;
use std::future::Future;

/// The `/books` collection as seen from the client.
pub trait BookRepo<E: Error> {
    fn list_books(&self) -> impl Future<Output = Result<Vec<Book>, E>> + Send;

    fn insert_book(&self, new_book: NewBook) -> impl Future<Output = Result<Book, E>> + Send;

    fn update_book(
        &self,
        id: i32,
        new_book: NewBook,
    ) -> impl Future<Output = Result<Book, E>> + Send;

    /// Succeeds on any 2xx status; the response body is ignored
    fn delete_book(&self, id: i32) -> impl Future<Output = Result<(), E>> + Send;
}
