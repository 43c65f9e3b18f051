use std::io;

use failure_derive::*;

/**
Failures raised while driving the handles.

An expired weak handle is not an error: `HandleWeak::lock` reports it as `None`.
 */
#[derive(Debug, Fail)]
pub enum Error {
    #[fail(display = "the {} handle is not bound to a value", handle)]
    Unbound { handle: &'static str },

    #[fail(display = "failed to write demonstration output")]
    Io(#[cause] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn unbound(handle: &'static str) -> Self {
        Error::Unbound { handle }
    }

    pub fn is_unbound(&self) -> bool {
        match self {
            Error::Unbound { .. } => true,
            _ => false,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}
