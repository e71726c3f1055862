use std::error::Error;
use std::sync::Arc;

use crossterm::event::KeyCode;
use ratatui::Frame;
use tokio::runtime::Handle;
use tracing::debug;

use super::view;
use crate::catalog::{Catalog, CatalogError, CatalogState};
use crate::form::Field;
use crate::repo::BookRepo;

/// What a key press asks the catalog to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    Quit,
    Ignore,
    Reload,
    OpenCreate,
    EditSelected,
    DeleteSelected,
    SelectNext,
    SelectPrevious,
    FocusNext,
    FocusPrevious,
    Type(char),
    Backspace,
    Submit,
    CancelForm,
    ConfirmDelete,
    CancelDelete,
}

/// Map a key to an action given what is currently on screen. While a request
/// is in flight the only thing accepted is quitting.
pub(crate) fn action_for(state: &CatalogState, code: KeyCode) -> Action {
    if state.busy {
        return match code {
            KeyCode::Char('q') => Action::Quit,
            _ => Action::Ignore,
        };
    }

    if state.pending_delete.is_some() {
        return match code {
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => Action::ConfirmDelete,
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => Action::CancelDelete,
            _ => Action::Ignore,
        };
    }

    if state.form.is_open() {
        return match code {
            KeyCode::Esc => Action::CancelForm,
            KeyCode::Enter => Action::Submit,
            KeyCode::Tab | KeyCode::Down => Action::FocusNext,
            KeyCode::BackTab | KeyCode::Up => Action::FocusPrevious,
            KeyCode::Backspace => Action::Backspace,
            KeyCode::Char(ch) => Action::Type(ch),
            _ => Action::Ignore,
        };
    }

    match code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('a') => Action::OpenCreate,
        KeyCode::Char('e') | KeyCode::Enter => Action::EditSelected,
        KeyCode::Char('d') | KeyCode::Delete => Action::DeleteSelected,
        KeyCode::Char('r') => Action::Reload,
        KeyCode::Down | KeyCode::Char('j') => Action::SelectNext,
        KeyCode::Up | KeyCode::Char('k') => Action::SelectPrevious,
        _ => Action::Ignore,
    }
}

/// Terminal-side state: the shared catalog plus which form field has focus.
pub struct App<R, E> {
    catalog: Arc<Catalog<R, E>>,
    runtime: Handle,
    focus: Field,
}

impl<R, E> App<R, E>
where
    R: BookRepo<E> + Send + Sync + 'static,
    E: Error + Send + Sync + 'static,
{
    pub fn new(catalog: Arc<Catalog<R, E>>, runtime: Handle) -> Self {
        Self {
            catalog,
            runtime,
            focus: Field::default(),
        }
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        view::draw(frame, &self.catalog.snapshot(), self.focus);
    }

    /// Handle one key press. Returns true when the user asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        let action = action_for(&self.catalog.snapshot(), code);
        if action == Action::Quit {
            return true;
        }

        if let Err(err) = self.perform(action) {
            debug!("Ignoring {:?}: {}", action, err);
        }
        false
    }

    fn perform(&mut self, action: Action) -> Result<(), CatalogError> {
        match action {
            Action::Quit | Action::Ignore => {}
            Action::Reload => self.spawn(|catalog| async move {
                let _ = catalog.load().await;
            }),
            Action::OpenCreate => {
                self.catalog.open_create()?;
                self.focus = Field::default();
            }
            Action::EditSelected => {
                self.catalog.open_edit_selected()?;
                self.focus = Field::default();
            }
            Action::DeleteSelected => self.catalog.request_delete_selected()?,
            Action::SelectNext => self.catalog.select_next(),
            Action::SelectPrevious => self.catalog.select_previous(),
            Action::FocusNext => self.focus = self.focus.next(),
            Action::FocusPrevious => self.focus = self.focus.previous(),
            Action::Type(ch) => {
                let focus = self.focus;
                if let Some(true) = self.catalog.edit_draft(|draft| draft.push_char(focus, ch)) {
                    self.catalog.dismiss_error();
                }
            }
            Action::Backspace => {
                let focus = self.focus;
                self.catalog.edit_draft(|draft| draft.backspace(focus));
            }
            Action::Submit => self.spawn(|catalog| async move {
                let _ = catalog.submit().await;
            }),
            Action::CancelForm => self.catalog.cancel_form(),
            Action::ConfirmDelete => self.spawn(|catalog| async move {
                let _ = catalog.confirm_delete().await;
            }),
            Action::CancelDelete => self.catalog.cancel_delete(),
        }
        Ok(())
    }

    /// Run a request in the background so the screen keeps redrawing. The
    /// catalog refuses anything else until it finishes.
    fn spawn<F, Fut>(&self, operation: F)
    where
        F: FnOnce(Arc<Catalog<R, E>>) -> Fut,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        self.runtime.spawn(operation(self.catalog.clone()));
    }
}
