//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod catalog_repo;
pub mod mock_test_attempt_repo;
pub mod short_form_progress_repo;
pub mod video_progress_repo;

pub use catalog_repo::CatalogRepo;
pub use mock_test_attempt_repo::MockTestAttemptRepo;
pub use short_form_progress_repo::ShortFormProgressRepo;
pub use video_progress_repo::VideoProgressRepo;
