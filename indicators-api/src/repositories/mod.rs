mod profile_repo;
mod repo_error;

pub use profile_repo::*;
pub use repo_error::RepositoryError;
