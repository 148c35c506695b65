use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KernelError {
    #[error(transparent)]
    Buffer(#[from] backend::Error),
    #[error("no scattering factors for atomic number {0}")]
    UnknownSpecies(u32),
    #[error("{what} has length {found}, expected {expected}")]
    Length {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("probe {probe:?} is larger than the transmission function {trans:?}")]
    ProbeTooLarge {
        probe: (usize, usize),
        trans: (usize, usize),
    },
}

pub type Result<T> = std::result::Result<T, KernelError>;

pub(crate) fn check_len(what: &'static str, expected: usize, found: usize) -> Result<()> {
    if expected != found {
        return Err(KernelError::Length { what, expected, found });
    }
    Ok(())
}
