use rotoken::application_port::*;
use rotoken::logger::*;
use rotoken::server::*;
use rotoken::settings::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logger = Logger::new_bootstrap();

    let project_settings = parse_settings(cli.settings.as_deref())?;
    info!(?project_settings);
    logger.reload_from_config(&LogConfig::from(&project_settings.log))?;

    let server = Server::try_new(&project_settings).await?;

    if cli.clear {
        server.clear_refresh_tokens().await?;
    }

    let login = server
        .auth_service
        .login(LoginInput {
            username: cli.username,
            password: cli.password,
        })
        .await?;
    println!("Login:\n{}", serde_json::to_string_pretty(&login)?);

    let refreshed = server
        .auth_service
        .refresh(login.refresh_token.as_str())
        .await?;
    println!("Refresh:\n{}", serde_json::to_string_pretty(&refreshed)?);

    Ok(())
}
