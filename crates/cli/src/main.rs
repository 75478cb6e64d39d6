use clap::Parser;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "provdir", about = "Healthcare provider directory", version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "provdir.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Initialize the data directory, configuration and database
    Init {
        /// Data directory path
        #[arg(long, default_value = "/var/lib/provdir")]
        data_dir: String,
    },
    /// Show database location and record counts
    Status,
    /// Start the web console and JSON API
    Serve {
        /// Port to listen on
        #[arg(long, default_value = "8080")]
        port: u16,
    },
    /// Manage console users
    User {
        #[command(subcommand)]
        command: UserCommand,
    },
}

#[derive(clap::Subcommand)]
enum UserCommand {
    /// Create a user
    Add {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        /// Grant administrator rights
        #[arg(long)]
        admin: bool,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
    },
    /// Replace a user's password
    SetPassword {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { data_dir } => {
            commands::init::run(&data_dir).await?;
        }
        Commands::Status => {
            commands::status::run(&cli.config).await?;
        }
        Commands::Serve { port } => {
            commands::serve::run(&cli.config, port).await?;
        }
        Commands::User { command } => match command {
            UserCommand::Add {
                username,
                password,
                admin,
                first_name,
                last_name,
            } => {
                let opts = commands::user::AddUser {
                    username,
                    password,
                    admin,
                    first_name,
                    last_name,
                };
                commands::user::add(&cli.config, opts).await?;
            }
            UserCommand::SetPassword { username, password } => {
                commands::user::set_password(&cli.config, &username, &password).await?;
            }
        },
    }

    Ok(())
}
