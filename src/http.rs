use std::error::Error;
use std::fmt;

use crate::config::ClientConfig;
use crate::models::{Book, NewBook};
use crate::repo::BookRepo;
use reqwest::{Client, Method, Response, StatusCode, Url};

#[derive(Debug)]
pub enum ApiError {
    UrlError(String),
    TransportError(reqwest::Error),
    StatusError {
        method: Method,
        url: Url,
        status: StatusCode,
    },
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        ApiError::TransportError(error)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::UrlError(path) => write!(f, "could not build a request URL for {path}"),
            ApiError::TransportError(e) => {
                write!(f, "problem talking to the books API: {e}")
            }
            ApiError::StatusError {
                method,
                url,
                status,
            } => {
                write!(f, "{method} {url} returned {status}")
            }
        }
    }
}

impl Error for ApiError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ApiError::TransportError(e) => Some(e),
            ApiError::UrlError(_) | ApiError::StatusError { .. } => None,
        }
    }
}

#[derive(Clone)]
pub struct HttpBookRepo {
    client: Client,
    base_url: Url,
}

impl HttpBookRepo {
    pub fn new(config: &ClientConfig) -> Self {
        HttpBookRepo {
            client: Client::new(),
            base_url: config.base_url.clone(),
        }
    }

    fn books_url(&self) -> Result<Url, ApiError> {
        self.base_url
            .join("books")
            .map_err(|_| ApiError::UrlError("books".to_string()))
    }

    fn book_url(&self, id: i32) -> Result<Url, ApiError> {
        let path = format!("books/{id}");
        self.base_url
            .join(&path)
            .map_err(|_| ApiError::UrlError(path))
    }
}

/// Treat any non-2xx status as a failure
fn check_status(method: Method, response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ApiError::StatusError {
            method,
            url: response.url().clone(),
            status,
        })
    }
}

impl BookRepo<ApiError> for HttpBookRepo {
    async fn list_books(&self) -> Result<Vec<Book>, ApiError> {
        let response = self.client.get(self.books_url()?).send().await?;

        let books = check_status(Method::GET, response)?
            .json::<Vec<Book>>()
            .await?;

        Ok(books)
    }

    async fn insert_book(&self, new_book: NewBook) -> Result<Book, ApiError> {
        let response = self
            .client
            .post(self.books_url()?)
            .json(&new_book)
            .send()
            .await?;

        let inserted_book = check_status(Method::POST, response)?.json::<Book>().await?;

        Ok(inserted_book)
    }

    async fn update_book(&self, id: i32, new_book: NewBook) -> Result<Book, ApiError> {
        let response = self
            .client
            .put(self.book_url(id)?)
            .json(&new_book)
            .send()
            .await?;

        let updated_book = check_status(Method::PUT, response)?.json::<Book>().await?;

        Ok(updated_book)
    }

    async fn delete_book(&self, id: i32) -> Result<(), ApiError> {
        let response = self.client.delete(self.book_url(id)?).send().await?;

        check_status(Method::DELETE, response)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_collection_and_item_urls() {
        let config = ClientConfig::with_base_url("http://example.com/api").unwrap();
        let repo = HttpBookRepo::new(&config);

        assert_eq!(
            "http://example.com/api/books",
            repo.books_url().unwrap().as_str()
        );
        assert_eq!(
            "http://example.com/api/books/3",
            repo.book_url(3).unwrap().as_str()
        );
    }

    #[test]
    fn status_error_names_the_request() {
        let err = ApiError::StatusError {
            method: Method::PUT,
            url: Url::parse("http://example.com/books/3").unwrap(),
            status: StatusCode::INTERNAL_SERVER_ERROR,
        };

        assert_eq!(
            "PUT http://example.com/books/3 returned 500 Internal Server Error",
            err.to_string()
        );
        assert!(err.source().is_none());
    }
}
