use clap::{Parser, Subcommand};
use media_ratings_client::RatingsClient;
use serde::Serialize;

#[derive(Parser)]
#[command(name = "ratings-cli")]
#[command(about = "Command-line client for the Media Ratings API", long_about = None)]
struct Cli {
    #[arg(short, long, env = "MEDIA_RATINGS_URL", default_value = "http://localhost:8080")]
    url: String,

    /// Bearer token for protected commands
    #[arg(short, long, env = "MEDIA_RATINGS_TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the API is up
    Status,
    /// Create an account
    Register {
        username: String,
        password: String,
        #[arg(long, default_value = "")]
        email: String,
    },
    /// Log in and print a bearer token
    Login { username: String, password: String },
    /// Show a user's profile
    Profile { user_id: i64 },
    /// Change your own email address
    SetEmail { user_id: i64, email: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = RatingsClient::new(&cli.url);

    match cli.command {
        Commands::Status => println!("{}", client.status().await?),
        Commands::Register {
            username,
            password,
            email,
        } => print_json(&client.register(&username, &email, &password).await?)?,
        Commands::Login { username, password } => {
            print_json(&client.login(&username, &password).await?)?
        }
        Commands::Profile { user_id } => {
            print_json(&client.profile(require_token(&cli.token)?, user_id).await?)?
        }
        Commands::SetEmail { user_id, email } => print_json(
            &client
                .update_email(require_token(&cli.token)?, user_id, &email)
                .await?,
        )?,
    }

    Ok(())
}

fn require_token(token: &Option<String>) -> Result<&str, Box<dyn std::error::Error>> {
    token
        .as_deref()
        .ok_or_else(|| "this command needs --token (or MEDIA_RATINGS_TOKEN)".into())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
