//! Command execution helpers

use std::future::Future;
use std::time::Instant;

use classbatch_domain::Result as DomainResult;

use crate::utils::logging::log_command_execution;

/// Run a command, timing it and logging the outcome.
///
/// ```rust,ignore
/// execute_command("courses::get_courses", async { ctx.classroom.list_courses().await }).await
/// ```
pub async fn execute_command<Fut, T>(command_name: &str, command: Fut) -> DomainResult<T>
where
    Fut: Future<Output = DomainResult<T>>,
{
    let start = Instant::now();
    let result = command.await;
    log_command_execution(command_name, start.elapsed(), result.as_ref().map(|_| ()));
    result
}

#[cfg(test)]
mod tests {
    use classbatch_domain::ClassBatchError;

    use super::*;

    #[tokio::test]
    async fn passes_result_through() {
        assert_eq!(execute_command("test::ok", async { Ok(3) }).await, Ok(3));

        let err = execute_command::<_, ()>("test::fail", async {
            Err(ClassBatchError::Network("down".into()))
        })
        .await
        .unwrap_err();
        assert_eq!(err, ClassBatchError::Network("down".into()));
    }
}
