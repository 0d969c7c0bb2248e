//! Query parameter types shared by several handler modules.

use serde::Deserialize;
use studytrack_core::types::DbId;

/// `?user_id=&chapter_id=`
#[derive(Debug, Deserialize)]
pub struct UserChapterParams {
    pub user_id: DbId,
    pub chapter_id: DbId,
}

/// `?user_id=&subject_id=`
#[derive(Debug, Deserialize)]
pub struct UserSubjectParams {
    pub user_id: DbId,
    pub subject_id: DbId,
}
