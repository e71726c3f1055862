//! The catalog controller. It owns everything the screen shows: the book list as
//! of the last successful fetch, the form, the pending delete confirmation and the
//! error banner. Every request goes through the repository; every successful
//! mutation is followed by a full re-fetch.

use std::error::Error;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{error, info, warn};

use crate::form::{Draft, DraftError, FormState};
use crate::models::Book;
use crate::observer::{CatalogEvent, CatalogObserver};
use crate::repo::BookRepo;

pub const LOAD_FAILED: &str = "Failed to load books.";
pub const SAVE_FAILED: &str = "Failed to save book.";
pub const DELETE_FAILED: &str = "Failed to delete book.";
pub const MISSING_FIELDS: &str = "Please fill in all fields.";
pub const INVALID_ISBN: &str = "ISBN must be a number.";

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("invalid draft: {0}")]
    Validation(#[from] DraftError),

    #[error("another request is still in progress")]
    Busy,

    #[error("the form is not open")]
    FormClosed,

    #[error("no delete is awaiting confirmation")]
    NoPendingDelete,

    #[error("no book with ID {0} in the catalog")]
    NotFound(i32),

    #[error("no book is selected")]
    NoSelection,

    #[error("request to the books API failed")]
    Request(#[source] Box<dyn Error + Send + Sync>),
}

/// A copy of everything the view needs to draw one frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogState {
    pub books: Vec<Book>,
    pub selected: usize,
    pub form: FormState,
    pub pending_delete: Option<Book>,
    pub error: Option<String>,
    pub busy: bool,
}

impl CatalogState {
    pub fn selected_book(&self) -> Option<&Book> {
        self.books.get(self.selected)
    }

    fn find(&self, id: i32) -> Option<&Book> {
        self.books.iter().find(|book| book.id == id)
    }
}

/// Clears the busy flag when the request that set it finishes, however it finishes
struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

pub struct Catalog<R, E> {
    repo: R,
    state: Mutex<CatalogState>,
    busy: AtomicBool,
    observers: Vec<Box<dyn CatalogObserver + Send + Sync>>,
    _error: PhantomData<fn() -> E>,
}

impl<R, E> Catalog<R, E>
where
    R: BookRepo<E> + Send + Sync,
    E: Error + Send + Sync + 'static,
{
    pub fn new(repo: R) -> Self {
        Catalog {
            repo,
            state: Mutex::new(CatalogState::default()),
            busy: AtomicBool::new(false),
            observers: Vec::new(),
            _error: PhantomData,
        }
    }

    pub fn with_observer(mut self, observer: impl CatalogObserver + Send + Sync + 'static) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    pub fn snapshot(&self) -> CatalogState {
        let mut snapshot = self.state().clone();
        snapshot.busy = self.is_busy();
        snapshot
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Fetch the whole collection and replace the local list with it
    pub async fn load(&self) -> Result<usize, CatalogError> {
        let _guard = self.begin()?;
        self.refresh().await
    }

    /// Create or update the record in the open form, then re-fetch the list.
    /// The form stays open with its draft intact if anything goes wrong.
    pub async fn submit(&self) -> Result<Book, CatalogError> {
        self.ensure_idle()?;

        let (editing_id, draft) = {
            let state = self.state();
            let draft = state.form.draft().cloned().ok_or(CatalogError::FormClosed)?;
            (state.form.editing_id(), draft)
        };

        let new_book = match draft.to_new_book() {
            Ok(new_book) => new_book,
            Err(err) => {
                let message = match err {
                    DraftError::Missing(_) => MISSING_FIELDS,
                    DraftError::InvalidIsbn(_) => INVALID_ISBN,
                };
                warn!("Not submitting invalid draft: {}", err);
                self.state().error = Some(message.to_string());
                self.notify(CatalogEvent::ValidationFailed);
                return Err(err.into());
            }
        };

        let _guard = self.begin()?;

        let result = match editing_id {
            Some(id) => self.repo.update_book(id, new_book).await,
            None => self.repo.insert_book(new_book).await,
        };

        let saved_book = match result {
            Ok(book) => book,
            Err(err) => {
                error!("Failed to save book: {}", describe(&err));
                self.state().error = Some(SAVE_FAILED.to_string());
                self.notify(CatalogEvent::SaveFailed);
                return Err(CatalogError::Request(Box::new(err)));
            }
        };

        match editing_id {
            Some(_) => info!("Updated book: {:?}", saved_book),
            None => info!("Inserted book: {:?}", saved_book),
        }
        self.notify(CatalogEvent::Saved { id: saved_book.id });

        // A failed refresh is reported by the banner; the save itself went through
        let _ = self.refresh().await;

        self.state().form.close();
        self.notify(CatalogEvent::FormClosed);

        Ok(saved_book)
    }

    /// Delete the book awaiting confirmation, then re-fetch the list
    pub async fn confirm_delete(&self) -> Result<(), CatalogError> {
        self.ensure_idle()?;

        let book = self
            .state()
            .pending_delete
            .take()
            .ok_or(CatalogError::NoPendingDelete)?;

        let _guard = match self.begin() {
            Ok(guard) => guard,
            Err(err) => {
                self.state().pending_delete = Some(book);
                return Err(err);
            }
        };

        if let Err(err) = self.repo.delete_book(book.id).await {
            error!("Failed to delete book with ID {}: {}", book.id, describe(&err));
            self.state().error = Some(DELETE_FAILED.to_string());
            self.notify(CatalogEvent::DeleteFailed { id: book.id });
            return Err(CatalogError::Request(Box::new(err)));
        }

        info!("Deleted book with ID: {}", book.id);
        self.notify(CatalogEvent::Deleted { id: book.id });

        let _ = self.refresh().await;

        Ok(())
    }

    pub fn open_create(&self) -> Result<(), CatalogError> {
        self.ensure_idle()?;
        {
            let mut state = self.state();
            state.form = FormState::creating();
            state.error = None;
        }
        self.notify(CatalogEvent::FormOpened { editing: None });
        Ok(())
    }

    pub fn open_edit(&self, id: i32) -> Result<(), CatalogError> {
        self.ensure_idle()?;
        {
            let mut state = self.state();
            let form = FormState::editing(state.find(id).ok_or(CatalogError::NotFound(id))?);
            state.form = form;
            state.error = None;
        }
        self.notify(CatalogEvent::FormOpened { editing: Some(id) });
        Ok(())
    }

    pub fn open_edit_selected(&self) -> Result<(), CatalogError> {
        let id = self.selected_id()?;
        self.open_edit(id)
    }

    /// Close the form and throw the draft away
    pub fn cancel_form(&self) {
        let was_open = {
            let mut state = self.state();
            let was_open = state.form.is_open();
            state.form.close();
            was_open
        };
        if was_open {
            self.notify(CatalogEvent::FormClosed);
        }
    }

    /// Apply `edit` to the open draft. Returns `None` when the form is closed.
    pub fn edit_draft<T>(&self, edit: impl FnOnce(&mut Draft) -> T) -> Option<T> {
        if self.is_busy() {
            return None;
        }
        self.state().form.draft_mut().map(edit)
    }

    /// Ask for confirmation before deleting `id`. Nothing is sent yet.
    pub fn request_delete(&self, id: i32) -> Result<(), CatalogError> {
        self.ensure_idle()?;
        {
            let mut state = self.state();
            let book = state.find(id).cloned().ok_or(CatalogError::NotFound(id))?;
            state.pending_delete = Some(book);
        }
        self.notify(CatalogEvent::DeleteRequested { id });
        Ok(())
    }

    pub fn request_delete_selected(&self) -> Result<(), CatalogError> {
        let id = self.selected_id()?;
        self.request_delete(id)
    }

    pub fn cancel_delete(&self) {
        let cancelled = self.state().pending_delete.take();
        if let Some(book) = cancelled {
            self.notify(CatalogEvent::DeleteCancelled { id: book.id });
        }
    }

    pub fn select_next(&self) {
        let mut state = self.state();
        if state.selected + 1 < state.books.len() {
            state.selected += 1;
        }
    }

    pub fn select_previous(&self) {
        let mut state = self.state();
        state.selected = state.selected.saturating_sub(1);
    }

    pub fn dismiss_error(&self) {
        self.state().error = None;
    }

    fn selected_id(&self) -> Result<i32, CatalogError> {
        self.state()
            .selected_book()
            .map(|book| book.id)
            .ok_or(CatalogError::NoSelection)
    }

    /// The Catalog Loader proper. Callers hold the busy guard.
    async fn refresh(&self) -> Result<usize, CatalogError> {
        match self.repo.list_books().await {
            Ok(books) => {
                let count = books.len();
                info!("Retrieved {} books from the API", count);
                {
                    let mut state = self.state();
                    state.books = books;
                    state.selected = state.selected.min(count.saturating_sub(1));
                    state.error = None;
                }
                self.notify(CatalogEvent::Loaded { count });
                Ok(count)
            }
            Err(err) => {
                error!("Failed to load books: {}", describe(&err));
                self.state().error = Some(LOAD_FAILED.to_string());
                self.notify(CatalogEvent::LoadFailed);
                Err(CatalogError::Request(Box::new(err)))
            }
        }
    }

    fn ensure_idle(&self) -> Result<(), CatalogError> {
        if self.is_busy() {
            self.notify(CatalogEvent::Rejected);
            Err(CatalogError::Busy)
        } else {
            Ok(())
        }
    }

    fn begin(&self) -> Result<BusyGuard<'_>, CatalogError> {
        match self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => Ok(BusyGuard { flag: &self.busy }),
            Err(_) => {
                self.notify(CatalogEvent::Rejected);
                Err(CatalogError::Busy)
            }
        }
    }

    fn state(&self) -> MutexGuard<'_, CatalogState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self, event: CatalogEvent) {
        for observer in &self.observers {
            observer.on_change(&event);
        }
    }
}

/// Render an error together with the chain of errors that caused it
pub(crate) fn describe(err: &(dyn Error + 'static)) -> String {
    let mut description = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        description.push_str(": ");
        description.push_str(&cause.to_string());
        source = cause.source();
    }
    description
}
