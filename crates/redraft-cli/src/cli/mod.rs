//! CLI entry and dispatch.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use redraft_core::ApiClient;
use redraft_core::config::Config;
use redraft_core::session::FileSessionStore;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;
mod feedback;

#[derive(Parser)]
#[command(name = "redraft")]
#[command(version)]
#[command(about = "WordPress blog paraphrasing from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override the backend origin from config
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Log in to the Redraft backend
    Login {
        #[arg(long)]
        username: Option<String>,

        /// Password (prompted on stdin when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Log out and clear the stored session
    Logout,

    /// Register a new account
    Register {
        #[arg(long)]
        username: Option<String>,

        #[arg(long)]
        email: Option<String>,

        /// Password (prompted on stdin when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Request or complete a password reset
    PasswordReset {
        #[command(subcommand)]
        command: PasswordResetCommands,
    },

    /// Work with blog posts
    Posts {
        #[command(subcommand)]
        command: PostsCommands,
    },

    /// Paraphrase a post by title and URL
    Paraphrase {
        #[arg(long)]
        title: String,

        #[arg(long)]
        url: String,

        /// Write the paraphrased content to a file instead of stdout
        #[arg(long, value_name = "PATH")]
        out: Option<PathBuf>,
    },

    /// Re-paraphrase edited content with length and keyword hints
    Rewrite {
        #[arg(long)]
        title: String,

        /// Original post URL
        #[arg(long)]
        url: String,

        /// File with the edited content ("-" for stdin)
        #[arg(long, value_name = "PATH")]
        file: PathBuf,

        /// Target length in words
        #[arg(long, default_value_t = 500)]
        length: u32,

        /// SEO keyword to keep in the rewrite
        #[arg(long, default_value = "")]
        keyword: String,

        /// Write the result to a file instead of stdout
        #[arg(long, value_name = "PATH")]
        out: Option<PathBuf>,
    },

    /// Publish content to the blog
    Publish {
        #[arg(long)]
        title: String,

        /// Original post URL
        #[arg(long)]
        url: String,

        /// File with the content to publish ("-" for stdin)
        #[arg(long, value_name = "PATH")]
        file: PathBuf,
    },

    /// Save content as a blog draft
    Draft {
        #[arg(long)]
        title: String,

        /// Original post URL
        #[arg(long)]
        url: String,

        /// File with the draft content ("-" for stdin)
        #[arg(long, value_name = "PATH")]
        file: PathBuf,
    },

    /// Subscription status and plans
    Subscription {
        #[command(subcommand)]
        command: SubscriptionCommands,
    },

    /// Show the logged-in user's profile
    Profile {
        /// Ignore the cached profile and refetch
        #[arg(long)]
        refresh: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum PasswordResetCommands {
    /// Send a password-reset email
    Request {
        #[arg(long)]
        email: String,
    },
    /// Complete a reset using the uid and token from the email
    Confirm {
        #[arg(long)]
        uid: String,

        #[arg(long)]
        token: String,

        /// New password (prompted on stdin when omitted)
        #[arg(long)]
        new_password: Option<String>,
    },
}

#[derive(clap::Subcommand)]
enum PostsCommands {
    /// Pull fresh posts from your blog
    Fetch,
    /// List posts already pulled
    Fetched,
    /// List recently published posts
    Recent,
    /// List posts published through Redraft
    Posted,
}

#[derive(clap::Subcommand)]
enum SubscriptionCommands {
    /// Show your current subscription
    Show,
    /// List available plans
    Plans,
    /// Show one plan
    Plan {
        #[arg(value_name = "ID")]
        id: i64,
    },
    /// Subscribe to a plan
    Subscribe {
        #[arg(value_name = "ID")]
        plan_id: i64,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
    /// Set the backend origin
    SetUrl {
        #[arg(value_name = "URL")]
        url: String,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "redraft=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

/// Shared per-command context: resolved config, session store, and a client
/// factory carrying the command's return location.
struct AppContext {
    config: Config,
    base_url: String,
    store: Arc<FileSessionStore>,
}

impl AppContext {
    fn new(base_url_override: Option<String>) -> Result<Self> {
        let config = Config::load().context("load config")?;
        let base_url = match base_url_override {
            Some(url) => {
                url::Url::parse(&url).with_context(|| format!("Invalid backend base URL: {url}"))?;
                url.trim_end_matches('/').to_string()
            }
            None => config.effective_base_url()?,
        };
        Ok(Self {
            config,
            base_url,
            store: Arc::new(FileSessionStore::default_location()),
        })
    }

    /// Builds a client whose session-expiry redirect returns to `location`.
    fn client(&self, location: &str) -> ApiClient {
        ApiClient::new(
            &self.base_url,
            Arc::clone(&self.store) as Arc<dyn redraft_core::SessionStore>,
            Arc::new(feedback::LoginHintNavigator),
            Arc::new(feedback::TerminalNotifier),
        )
        .with_login_path(&self.config.login_path)
        .with_return_path(location)
    }
}

async fn dispatch(cli: Cli) -> Result<()> {
    // Config subcommands must work without a resolvable backend.
    if let Commands::Config { command } = &cli.command {
        return commands::config::run(command);
    }

    let ctx = AppContext::new(cli.base_url)?;

    match cli.command {
        Commands::Login {
            username,
            password,
        } => commands::auth::login(&ctx, username, password).await,
        Commands::Logout => commands::auth::logout(&ctx).await,
        Commands::Register {
            username,
            email,
            password,
        } => commands::auth::register(&ctx, username, email, password).await,
        Commands::PasswordReset { command } => match command {
            PasswordResetCommands::Request { email } => {
                commands::auth::request_password_reset(&ctx, &email).await
            }
            PasswordResetCommands::Confirm {
                uid,
                token,
                new_password,
            } => commands::auth::confirm_password_reset(&ctx, &uid, &token, new_password).await,
        },
        Commands::Posts { command } => match command {
            PostsCommands::Fetch => commands::posts::fetch(&ctx).await,
            PostsCommands::Fetched => commands::posts::fetched(&ctx).await,
            PostsCommands::Recent => commands::posts::recent(&ctx).await,
            PostsCommands::Posted => commands::posts::posted(&ctx).await,
        },
        Commands::Paraphrase {
            title,
            url,
            out,
        } => commands::paraphrase::paraphrase(&ctx, &title, &url, out.as_deref()).await,
        Commands::Rewrite {
            title,
            url,
            file,
            length,
            keyword,
            out,
        } => {
            commands::paraphrase::rewrite(&ctx, &title, &url, &file, length, &keyword, out.as_deref())
                .await
        }
        Commands::Publish {
            title,
            url,
            file,
        } => commands::posts::publish(&ctx, &title, &url, &file).await,
        Commands::Draft {
            title,
            url,
            file,
        } => commands::posts::draft(&ctx, &title, &url, &file).await,
        Commands::Subscription { command } => match command {
            SubscriptionCommands::Show => commands::account::subscription(&ctx).await,
            SubscriptionCommands::Plans => commands::account::plans(&ctx).await,
            SubscriptionCommands::Plan { id } => commands::account::plan(&ctx, id).await,
            SubscriptionCommands::Subscribe { plan_id } => {
                commands::account::subscribe(&ctx, plan_id).await
            }
        },
        Commands::Profile { refresh } => commands::account::profile(&ctx, refresh).await,
        Commands::Config { .. } => unreachable!("handled before backend resolution"),
    }
}
