//! `chatflow ask` - one turn without the interactive loop.

use std::io::Write;

use anyhow::Result;
use futures_util::StreamExt;

use chatflow_core::pipeline::Reply;
use chatflow_core::session::get_or_create_session_id;
use chatflow_core::transport::validate_message;
use chatflow_infra::client_store::FileClientStore;
use chatflow_types::chat::ChatMessage;
use chatflow_types::generation::DeploymentMode;

use crate::state::AppState;

/// Send `message` as the first turn after the greeting and print the reply.
///
/// Streamed replies are printed as they arrive unless `json` is set.
pub async fn ask(state: &AppState, message: &str, json: bool) -> Result<()> {
    validate_message(message)?;

    let store = FileClientStore::in_data_dir(&state.data_dir);
    let session_id = get_or_create_session_id(&store).await?;
    let history = vec![ChatMessage::bot(state.config.greeting.clone())];

    let reply = state.transport.handle(&session_id, message, &history).await;

    if json {
        let mode: DeploymentMode = state.transport.mode();
        let out = serde_json::json!({
            "session_id": session_id.as_str(),
            "mode": mode,
            "reply": reply.into_text().await,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    match reply {
        Reply::Complete(text) => println!("{text}"),
        Reply::Stream(mut fragments) => {
            let mut stdout = std::io::stdout();
            while let Some(fragment) = fragments.next().await {
                write!(stdout, "{fragment}")?;
                stdout.flush()?;
            }
            writeln!(stdout)?;
        }
    }
    Ok(())
}
