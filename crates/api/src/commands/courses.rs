//! Course listing and account probe

use classbatch_domain::Result;
use tracing::info;

use crate::context::AppContext;
use crate::protocol::{CoursesReply, UserInfoReply};
use crate::utils::execute_command;

/// Active courses the user teaches.
pub async fn get_courses(ctx: &AppContext) -> Result<CoursesReply> {
    execute_command("courses::get_courses", async {
        let courses = ctx.classroom.list_courses().await?;
        info!(count = courses.len(), "Courses retrieved");
        Ok(CoursesReply { courses })
    })
    .await
}

/// Never fails; an unreachable account reports as unauthenticated.
pub async fn get_user_info(ctx: &AppContext) -> Result<UserInfoReply> {
    execute_command("courses::get_user_info", async {
        Ok(UserInfoReply { user_info: ctx.classroom.user_info().await })
    })
    .await
}
