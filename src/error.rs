use std::fmt::{self, Display};
use std::path::PathBuf;

/// Color channel named in white point diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Channel::Red => "red",
            Channel::Green => "green",
            Channel::Blue => "blue",
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unable to read input directory '{}': {source}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to decode '{filename}': {source}")]
    Decode {
        filename: String,
        #[source]
        source: image::ImageError,
    },

    #[error("'{filename}': no pixels in the bright band, cannot estimate a white point")]
    NoWhitePixels { filename: String },

    #[error("'{filename}': white point {channel} channel is zero, correction ratio is undefined")]
    ZeroChannel { filename: String, channel: Channel },

    #[error("'{filename}': dimensions {found:?} differ from the batch dimensions {expected:?}")]
    DimensionMismatch {
        filename: String,
        expected: (u32, u32),
        found: (u32, u32),
    },

    #[error("unable to read config '{}': {source}", path.display())]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to parse config '{}': {source}", path.display())]
    ParseConfig {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("unable to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to encode '{}': {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
