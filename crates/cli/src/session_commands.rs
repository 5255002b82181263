use {anyhow::Result, clap::Subcommand, quandary_config::QuandaryConfig};

use quandary_gateway::services::open_session_store;

#[derive(Subcommand)]
pub enum SessionAction {
    /// Print a user's stored session as JSON.
    Show { user: String },
    /// Forget a user's conversation state.
    Clear { user: String },
}

pub async fn handle_sessions(config: &QuandaryConfig, action: SessionAction) -> Result<()> {
    let store = open_session_store(&config.sessions).await?;
    match action {
        SessionAction::Show { user } => match store.load(&user).await? {
            Some(session) => println!("{}", serde_json::to_string_pretty(&session)?),
            None => eprintln!("no session for {user}"),
        },
        SessionAction::Clear { user } => {
            if store.clear(&user).await? {
                eprintln!("cleared session for {user}");
            } else {
                eprintln!("no session for {user}");
            }
        },
    }
    Ok(())
}
