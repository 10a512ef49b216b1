use super::Parser;

#[derive(Parser, Debug)]
pub struct Cli {
    #[arg(long)]
    pub settings: Option<String>,
    /// Remove every stored refresh token before running.
    #[arg(long)]
    pub clear: bool,
    #[arg(long, default_value = "dummy")]
    pub username: String,
    #[arg(long, default_value = "dummy")]
    pub password: String,
}
