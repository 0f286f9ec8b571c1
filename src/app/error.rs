use std::fmt::Display;

#[derive(Debug)]
pub enum VisionError {
    NotInitialised,
    InvalidFrame(String),
    RegionOutOfBounds {
        region: &'static str,
        frame_width: i32,
        frame_height: i32,
    },
    OpenCv(opencv::Error),
    Config(String),
    Io(std::io::Error),
}

impl Display for VisionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotInitialised => write!(f, "Processor used before init"),
            Self::InvalidFrame(reason) => write!(f, "Invalid frame: {}", reason),
            Self::RegionOutOfBounds {
                region,
                frame_width,
                frame_height,
            } => write!(
                f,
                "Region '{}' does not fit in {}x{} frame",
                region, frame_width, frame_height
            ),
            Self::OpenCv(e) => write!(f, "OpenCV error: {}", e),
            Self::Config(reason) => write!(f, "Config error: {}", reason),
            Self::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for VisionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::OpenCv(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<opencv::Error> for VisionError {
    fn from(e: opencv::Error) -> Self {
        Self::OpenCv(e)
    }
}

impl From<std::io::Error> for VisionError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for VisionError {
    fn from(e: serde_json::Error) -> Self {
        Self::Config(e.to_string())
    }
}
