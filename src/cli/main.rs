/**
 * Inquiry Circle - Command-Line Entry Point
 *
 * Owns the application context for one invocation: builds the configuration,
 * opens the durable session record, runs a single command and exits.
 */
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use inquiry_circle::client::conference::generate_room_name;
use inquiry_circle::client::{
    error_message, AppContext, DetachedHost, FileSessionStorage, Navigation,
};
use inquiry_circle::shared::models::CreateMessageRequest;
use inquiry_circle::shared::AppConfig;

#[derive(Parser)]
#[command(name = "circle")]
#[command(about = "Inquiry circle client", long_about = None)]
struct Cli {
    /// TOML configuration file; `IC_*` environment variables are used otherwise
    #[arg(long, env = "IC_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify an access key and store the session
    Login { key: String },
    /// Forget the stored session
    Logout,
    /// Show the stored session
    Status {
        /// Re-verify the key with the backend
        #[arg(long)]
        verify: bool,
    },
    /// Check backend health
    Health,
    /// List circles visible to the session
    Circles,
    /// List messages of a circle
    Messages { circle_id: i64 },
    /// Send a message to a circle (facilitators only)
    Send { circle_id: i64, content: String },
    /// Run the navigation guard for a path
    Navigate { path: String },
    /// Generate a conference room name for a circle
    RoomName {
        circle_id: String,
        #[arg(long)]
        session: Option<String>,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("inquiry_circle=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{}", message);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    let config = match &cli.config {
        Some(path) => AppConfig::from_toml_file(path),
        None => AppConfig::from_env(),
    }
    .map_err(|e| e.to_string())?;

    let storage = FileSessionStorage::new(config.session_path.clone());
    let mut ctx = AppContext::new(config, Box::new(storage), DetachedHost)
        .map_err(|e| error_message(&e))?;

    match cli.command {
        Commands::Login { key } => {
            if !ctx.login(&key).await {
                return Err(ctx
                    .session
                    .error()
                    .unwrap_or("Authentication failed")
                    .to_string());
            }
            let role = ctx.session.role().map(|r| r.to_string()).unwrap_or_default();
            println!("Logged in as {}", role);
            if let Some(circle) = ctx.session.circle() {
                println!("Circle: {} (#{})", circle.name, circle.id);
            }
        }
        Commands::Logout => {
            ctx.logout();
            println!("Logged out");
        }
        Commands::Status { verify } => {
            if !ctx.restore_session() {
                println!("Not logged in");
                return Ok(());
            }
            if verify && !ctx.session.check_auth_status().await {
                return Err("Stored key is no longer valid; session cleared".to_string());
            }
            let role = ctx.session.role().map(|r| r.to_string()).unwrap_or_default();
            println!("Role: {}", role);
            if let Some(key_id) = ctx.session.key_id() {
                println!("Key id: {}", key_id);
            }
            match ctx.session.circle() {
                Some(circle) => println!("Circle: {} (#{})", circle.name, circle.id),
                None => println!("Circle: none"),
            }
        }
        Commands::Health => {
            let health = ctx.api().health_check().await.map_err(|e| error_message(&e))?;
            println!("status: {}, database: {}", health.status, health.database);
        }
        Commands::Circles => {
            ctx.restore_session();
            let circles = ctx.api().list_circles().await.map_err(|e| error_message(&e))?;
            for circle in circles {
                println!(
                    "#{}\t{}\t{:?}\t{}",
                    circle.id,
                    circle.name,
                    circle.status,
                    circle.room_id.as_deref().unwrap_or("-")
                );
            }
        }
        Commands::Messages { circle_id } => {
            ctx.restore_session();
            let messages = ctx
                .api()
                .list_messages(circle_id)
                .await
                .map_err(|e| error_message(&e))?;
            for message in messages {
                println!("[{}] {}", message.sent_at.to_rfc3339(), message.content);
            }
        }
        Commands::Send { circle_id, content } => {
            ctx.restore_session();
            let request = CreateMessageRequest {
                circle_id,
                content,
                message_type: None,
            };
            let message = ctx
                .api()
                .send_message(&request)
                .await
                .map_err(|e| error_message(&e))?;
            println!("Sent message #{}", message.id);
        }
        Commands::Navigate { path } => match ctx.navigate(&path) {
            Navigation::Proceed(route) => println!("proceed: {}", route.name),
            Navigation::Redirect(location) => println!("redirect: {}", location.to_url_string()),
            Navigation::NotFound => println!("not found"),
        },
        Commands::RoomName { circle_id, session } => {
            println!("{}", generate_room_name(&circle_id, session.as_deref()));
        }
    }

    Ok(())
}
