use thiserror::Error;

/// Reasons why a contour does not describe a usable polygon
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Degeneracy {
    #[error("contour has {0} distinct vertices, at least 3 are required")]
    TooFewVertices(usize),
    #[error("contour contains non-finite coordinates")]
    NonFinite,
    #[error("contour encloses no area")]
    ZeroArea,
    #[error("contour intersects itself")]
    SelfIntersecting,
    #[error("contour visits the same vertex more than once")]
    DuplicateVertices,
}

/// Failures surfaced by a [`GeometryKernel`](crate::kernel::GeometryKernel)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum KernelError {
    #[error("degenerate geometry: {0}")]
    Degenerate(#[from] Degeneracy),
    #[error("geometry backend failure: {0}")]
    Backend(String),
}

/// Errors of a nesting run
#[derive(Debug, Error, Clone, PartialEq)]
pub enum NestError {
    #[error("degenerate geometry in {context}: {reason}")]
    DegenerateGeometry { context: String, reason: Degeneracy },
    #[error("item {item_id} does not fit in any open bin")]
    NoFit { item_id: usize },
    #[error("bin capacity of {max_bins} exceeded")]
    CapacityExceeded { max_bins: usize },
    #[error("invalid configuration: {0}")]
    Configuration(String),
    #[error(transparent)]
    Kernel(#[from] KernelError),
    #[error("failed to build thread pool: {0}")]
    ThreadPool(String),
}

impl NestError {
    /// Whether the error ends the whole run (as opposed to a single item)
    pub fn is_fatal(&self) -> bool {
        !matches!(self, NestError::NoFit { .. })
    }
}

pub type Result<T, E = NestError> = std::result::Result<T, E>;
