use super::{Error, ErrorKind, Result};
use crate::util::DynError;
use easy_ext::ext;

#[ext(ResultExt)]
pub(crate) impl<T, E> Result<T, E> {
    #[track_caller]
    fn fatal_ctx<S>(self, message: impl FnOnce() -> S) -> Result<T>
    where
        S: Into<String>,
        E: Into<Box<DynError>>,
    {
        // Not using closures (e.g. `map_err`), because `#[track_caller]`
        // doesn't propagate to them.
        match self {
            Ok(value) => Ok(value),
            Err(err) => Err(Error::from(ErrorKind::Fatal {
                message: message().into(),
                source: Some(err.into()),
            })),
        }
    }
}

#[ext(OptionExt)]
pub(crate) impl<T> Option<T> {
    #[track_caller]
    fn fatal_ctx<S>(self, message: impl FnOnce() -> S) -> Result<T>
    where
        S: Into<String>,
    {
        match self {
            Some(value) => Ok(value),
            None => Err(Error::from(ErrorKind::Fatal {
                message: message().into(),
                source: None,
            })),
        }
    }
}
