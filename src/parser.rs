pub(crate) mod xml;

use crate::ebook::errors::FormatError;

pub(crate) type ParserResult<T> = Result<T, FormatError>;

impl FormatError {
    pub(crate) fn unparsable(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unparsable(Box::new(error))
    }
}
