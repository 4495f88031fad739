use std::{
    error::Error,
    fmt::{Debug, Display, Formatter},
};

pub enum GoesFetchError {
    /// Bad user input; detected before any remote or filesystem access.
    Config(String),
    Download(String),
}

impl GoesFetchError {
    pub fn config(message: &str) -> Self {
        GoesFetchError::Config(message.into())
    }

    pub fn download(message: &str) -> Self {
        GoesFetchError::Download(message.into())
    }

    pub fn is_config(&self) -> bool {
        matches!(self, GoesFetchError::Config(_))
    }

    fn message(&self) -> &str {
        match self {
            GoesFetchError::Config(msg) => msg,
            GoesFetchError::Download(msg) => msg,
        }
    }
}

impl Debug for GoesFetchError {
    fn fmt(&self, f: &mut Formatter) -> Result<(), std::fmt::Error> {
        let kind = match self {
            GoesFetchError::Config(_) => "Config",
            GoesFetchError::Download(_) => "Download",
        };
        write!(f, "{}({})", kind, self.message())
    }
}

impl Display for GoesFetchError {
    fn fmt(&self, f: &mut Formatter) -> Result<(), std::fmt::Error> {
        write!(f, "{}", self.message())
    }
}

impl Error for GoesFetchError {}
