use anyhow::Result;
use clap::Parser;
use safewatch::api::AlertStatus;
use safewatch::commands::{self, ConnectionOptions};
use safewatch::http::HttpMethod;

/// safewatch - Women Safety admin API client
///
/// Talk to the admin API of the women safety backend from the terminal.
/// Responses are printed to stdout as pretty JSON.
///
/// The session token is read from --token or SAFEWATCH_TOKEN.
///
/// Examples:
///   safewatch users list --page 1 --limit 20
///   safewatch -e staging emergencies resolve e1
///   safewatch request GET /analytics/users/monthly -p months=6
#[derive(Parser, Debug)]
#[command(author, version = env!("SAFEWATCH_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    connection: ConnectionOptions,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Send a request to any endpoint
    Request(RequestArgs),

    /// Manage app users
    Users {
        #[command(subcommand)]
        command: UsersCommand,
    },

    /// Manage emergency alerts
    Emergencies {
        #[command(subcommand)]
        command: EmergenciesCommand,
    },
}

#[derive(clap::Args, Debug)]
pub struct RequestArgs {
    /// HTTP method (GET, POST, PUT, PATCH, DELETE)
    #[arg(value_name = "METHOD")]
    pub method: HttpMethod,

    /// Endpoint path relative to the base URL, e.g. /users
    #[arg(value_name = "ENDPOINT")]
    pub endpoint: String,

    /// Query parameter, may be repeated
    #[arg(long = "param", short = 'p', value_name = "KEY=VALUE", value_parser = commands::parse_param)]
    pub params: Vec<(String, String)>,

    /// JSON request body
    #[arg(long, value_name = "JSON")]
    pub body: Option<String>,

    /// Send the request without credentials
    #[arg(long = "no-auth")]
    pub no_auth: bool,
}

#[derive(clap::Args, Debug, Default)]
pub struct PageArgs {
    #[arg(long)]
    pub page: Option<u32>,

    #[arg(long)]
    pub limit: Option<u32>,
}

#[derive(clap::Subcommand, Debug)]
enum UsersCommand {
    /// List users, newest first
    List {
        #[command(flatten)]
        page: PageArgs,

        /// Free-text search
        #[arg(long)]
        search: Option<String>,
    },

    /// Show one user
    Get {
        #[arg(value_name = "USER_ID")]
        id: String,
    },
}

#[derive(clap::Subcommand, Debug)]
enum EmergenciesCommand {
    /// List emergency alerts
    List {
        #[command(flatten)]
        page: PageArgs,

        /// active, resolved or all
        #[arg(long)]
        status: Option<AlertStatus>,
    },

    /// Mark an alert as resolved
    Resolve {
        #[arg(value_name = "ALERT_ID")]
        id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let client = cli.connection.build_client()?;

    let data = match cli.command {
        Commands::Request(args) => {
            commands::request(
                &client,
                args.method,
                &args.endpoint,
                &args.params,
                args.body.as_deref(),
                args.no_auth,
            )
            .await?
        }
        Commands::Users { command } => match command {
            UsersCommand::List { page, search } => {
                commands::list_users(&client, page.page, page.limit, search).await?
            }
            UsersCommand::Get { id } => commands::get_user(&client, &id).await?,
        },
        Commands::Emergencies { command } => match command {
            EmergenciesCommand::List { page, status } => {
                commands::list_emergencies(&client, page.page, page.limit, status).await?
            }
            EmergenciesCommand::Resolve { id } => {
                commands::resolve_emergency(&client, &id).await?
            }
        },
    };

    println!("{}", commands::render(&data)?);
    Ok(())
}
