//! Authentication command

use classbatch_domain::Result;

use crate::context::AppContext;
use crate::protocol::TokenReply;
use crate::utils::execute_command;

/// Acquire a credential, prompting for consent if needed.
pub async fn authenticate(ctx: &AppContext) -> Result<TokenReply> {
    execute_command("auth::authenticate", async {
        let credential = ctx.credentials.acquire(true).await?;
        Ok(TokenReply { token: credential.secret().to_string() })
    })
    .await
}
