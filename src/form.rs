//! The book form: a draft of the user's input plus the state machine that
//! decides whether a submit creates a new record or updates an existing one.

use std::fmt;

use crate::models::{Book, NewBook};

/// Unsaved form input. The ISBN stays as text until the draft is submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub title: String,
    pub author: String,
    pub isbn: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Field {
    #[default]
    Title,
    Author,
    Isbn,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Title, Field::Author, Field::Isbn];

    pub fn label(self) -> &'static str {
        match self {
            Field::Title => "Title",
            Field::Author => "Author",
            Field::Isbn => "ISBN",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Field::Title => Field::Author,
            Field::Author => Field::Isbn,
            Field::Isbn => Field::Title,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            Field::Title => Field::Isbn,
            Field::Author => Field::Title,
            Field::Isbn => Field::Author,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftError {
    Missing(Field),
    InvalidIsbn(String),
}

impl fmt::Display for DraftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DraftError::Missing(field) => write!(f, "{} is required", field.label()),
            DraftError::InvalidIsbn(value) => write!(f, "ISBN must be a number, got {value:?}"),
        }
    }
}

impl std::error::Error for DraftError {}

impl Draft {
    pub fn from_book(book: &Book) -> Self {
        Draft {
            title: book.title.clone(),
            author: book.author.clone(),
            isbn: book.isbn.to_string(),
        }
    }

    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::Title => &self.title,
            Field::Author => &self.author,
            Field::Isbn => &self.isbn,
        }
    }

    fn value_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Title => &mut self.title,
            Field::Author => &mut self.author,
            Field::Isbn => &mut self.isbn,
        }
    }

    /// Append a character to `field`. Returns false when the character is not accepted there.
    pub fn push_char(&mut self, field: Field, ch: char) -> bool {
        let accepted = match field {
            Field::Isbn => ch.is_ascii_digit() || ch == '-',
            Field::Title | Field::Author => !ch.is_control(),
        };
        if accepted {
            self.value_mut(field).push(ch);
        }
        accepted
    }

    pub fn backspace(&mut self, field: Field) {
        self.value_mut(field).pop();
    }

    /// Check that every field is filled in and turn the draft into a request payload.
    /// Hyphens in the ISBN are ignored.
    pub fn to_new_book(&self) -> Result<NewBook, DraftError> {
        let title = self.title.trim();
        let author = self.author.trim();
        let isbn = self.isbn.trim();

        for (field, value) in [
            (Field::Title, title),
            (Field::Author, author),
            (Field::Isbn, isbn),
        ] {
            if value.is_empty() {
                return Err(DraftError::Missing(field));
            }
        }

        let digits: String = isbn.chars().filter(|ch| *ch != '-').collect();
        let isbn = digits
            .parse::<i64>()
            .map_err(|_| DraftError::InvalidIsbn(isbn.to_string()))?;

        Ok(NewBook {
            title: title.to_string(),
            author: author.to_string(),
            isbn,
        })
    }
}

/// Whether the form is shown, and if so, which record a submit targets
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FormState {
    #[default]
    Closed,
    Creating(Draft),
    Editing { id: i32, draft: Draft },
}

impl FormState {
    pub fn creating() -> Self {
        FormState::Creating(Draft::default())
    }

    pub fn editing(book: &Book) -> Self {
        FormState::Editing {
            id: book.id,
            draft: Draft::from_book(book),
        }
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, FormState::Closed)
    }

    pub fn draft(&self) -> Option<&Draft> {
        match self {
            FormState::Closed => None,
            FormState::Creating(draft) | FormState::Editing { draft, .. } => Some(draft),
        }
    }

    pub fn draft_mut(&mut self) -> Option<&mut Draft> {
        match self {
            FormState::Closed => None,
            FormState::Creating(draft) | FormState::Editing { draft, .. } => Some(draft),
        }
    }

    /// The id of the record being edited, if any
    pub fn editing_id(&self) -> Option<i32> {
        match self {
            FormState::Editing { id, .. } => Some(*id),
            FormState::Closed | FormState::Creating(_) => None,
        }
    }

    pub fn close(&mut self) {
        *self = FormState::Closed;
    }
}
