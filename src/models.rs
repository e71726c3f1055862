use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub isbn: i64,
}

/// Body of `POST /books` and `PUT /books/{id}`: a book minus its server-assigned id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub isbn: i64,
}

impl Book {
    pub fn from_new(id: i32, new_book: NewBook) -> Self {
        Book {
            id,
            title: new_book.title,
            author: new_book.author,
            isbn: new_book.isbn,
        }
    }
}
