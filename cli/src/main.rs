mod views;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use chirp::config::{ClientConfig, ConfigError};
use chirp::forms::{self, FormError, LoginForm, RegisterForm};
use chirp::net::api::ApiClient;
use chirp::net::error::ApiError;
use chirp::net::types::{ProfileUpdate, Tweet};
use chirp::router::{DEFAULT_AUTHENTICATED_ROUTE, ENTRY_ROUTE, History, Navigator, Route};
use chirp::state::feed::{NotificationList, ProfileCard, SuggestionList, TweetCard};
use chirp::state::session::SessionManager;
use chirp::state::token::FileTokenStore;
use chirp::util::auth::GuardDecision;
use clap::{Args, Parser, Subcommand};
use tracing::Level;

#[cfg(test)]
#[path = "main_test.rs"]
mod main_test;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Form(#[from] FormError),
    /// A backend call failed; the notice is already rendered for the user.
    #[error("{0}")]
    Notice(String),
    /// Authorization was denied and the session already moved to the entry view.
    #[error("redirected to sign in")]
    Redirected,
}

impl CliError {
    fn from_api(err: ApiError, fallback: &str, prefer_server_message: bool) -> Self {
        match views::notice(err, fallback, prefer_server_message) {
            Some(notice) => Self::Notice(notice),
            None => Self::Redirected,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "chirp", about = "Chirp social network from the terminal")]
struct Cli {
    /// Backend base URL. Overrides `CHIRP_API_URL`.
    #[arg(long)]
    api_url: Option<String>,

    /// Token file location.
    #[arg(long, env = "CHIRP_TOKEN_FILE")]
    token_file: Option<PathBuf>,

    /// Log requests and session changes to stderr.
    #[arg(short, long, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        password: String,
    },
    Register {
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        username: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        password: String,
    },
    Logout,
    Whoami,
    /// Timeline of followed users.
    Home,
    Explore {
        #[arg(long)]
        query: Option<String>,
    },
    Tweet(TweetCommand),
    Profile(ProfileCommand),
    Notifications(NotificationsCommand),
    Trends,
    /// Who to follow.
    Suggestions {
        /// Follow the suggested user with this id.
        #[arg(long)]
        follow: Option<String>,
    },
}

#[derive(Args, Debug)]
struct TweetCommand {
    #[command(subcommand)]
    command: TweetSubcommand,
}

#[derive(Subcommand, Debug)]
enum TweetSubcommand {
    Post { content: String },
    Show { id: String },
    Reply { id: String, content: String },
    Like { id: String },
    Unlike { id: String },
    Retweet { id: String },
    Unretweet { id: String },
}

#[derive(Args, Debug)]
struct ProfileCommand {
    #[command(subcommand)]
    command: ProfileSubcommand,
}

#[derive(Subcommand, Debug)]
enum ProfileSubcommand {
    Show {
        username: String,
    },
    Edit {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        bio: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        website: Option<String>,
    },
    Follow {
        username: String,
    },
    Unfollow {
        username: String,
    },
}

#[derive(Args, Debug)]
struct NotificationsCommand {
    #[command(subcommand)]
    command: NotificationsSubcommand,
}

#[derive(Subcommand, Debug)]
enum NotificationsSubcommand {
    List,
    Read { id: String },
}

impl Command {
    /// View the command renders; its guard runs before anything else.
    fn route(&self) -> Route {
        match self {
            Self::Login { .. } => Route::Login,
            Self::Register { .. } => Route::Register,
            Self::Logout | Self::Whoami | Self::Home | Self::Trends | Self::Suggestions { .. } => Route::Home,
            Self::Explore { query } => Route::Explore { query: query.clone() },
            Self::Tweet(tweet) => match &tweet.command {
                TweetSubcommand::Post { .. } => Route::Home,
                TweetSubcommand::Show { id }
                | TweetSubcommand::Reply { id, .. }
                | TweetSubcommand::Like { id }
                | TweetSubcommand::Unlike { id }
                | TweetSubcommand::Retweet { id }
                | TweetSubcommand::Unretweet { id } => Route::Tweet { id: id.clone() },
            },
            Self::Profile(profile) => match &profile.command {
                ProfileSubcommand::Edit { .. } => Route::EditProfile,
                ProfileSubcommand::Show { username }
                | ProfileSubcommand::Follow { username }
                | ProfileSubcommand::Unfollow { username } => Route::Profile { username: username.clone() },
            },
            Self::Notifications(_) => Route::Notifications,
        }
    }
}

/// Navigator that reports every view change on stderr.
#[derive(Debug, Default)]
struct TerminalNavigator {
    history: History,
}

impl Navigator for TerminalNavigator {
    fn navigate(&self, route: Route) {
        eprintln!("-> {route}");
        self.history.navigate(route);
    }

    fn reset(&self, route: Route) {
        eprintln!("-> {route}");
        self.history.reset(route);
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        // A forced sign-out ends the command like a guard redirect.
        Ok(()) | Err(CliError::Redirected) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = ClientConfig::from_env_with_api_url(cli.api_url.as_deref())?;
    if let Some(path) = cli.token_file {
        config.token_path = path;
    }

    let tokens = Arc::new(FileTokenStore::new(config.token_path.clone()));
    tracing::debug!(path = %tokens.path().display(), "token file");
    let api = ApiClient::new(&config, tokens)?;
    let navigator = Arc::new(TerminalNavigator::default());
    let session = SessionManager::new(api, navigator.clone());

    session.initialize().await;

    let route = cli.command.route();
    if let GuardDecision::Redirect(_) = session.enter(&route).await {
        return Ok(());
    }

    let ctx = Ctx { session: &session, navigator: navigator.as_ref() };
    match cli.command {
        Command::Login { email, password } => run_login(&ctx, LoginForm { email, password }).await,
        Command::Register { name, username, email, password } => {
            run_register(&ctx, RegisterForm { name, username, email, password }).await
        }
        Command::Logout => {
            session.logout();
            println!("Signed out");
            Ok(())
        }
        Command::Whoami => {
            if let Some(user) = session.user() {
                println!("{}", views::user_line(&user));
            }
            Ok(())
        }
        Command::Home => {
            let tweets = ctx
                .call(session.api().timeline(), "Failed to load tweets. Please try again later.")
                .await?;
            println!("{}", views::tweet_list(&tweets, "Your timeline is empty. Follow someone to see their chirps."));
            Ok(())
        }
        Command::Explore { query } => run_explore(&ctx, query).await,
        Command::Tweet(tweet) => run_tweet(&ctx, tweet.command).await,
        Command::Profile(profile) => run_profile(&ctx, profile.command).await,
        Command::Notifications(notifications) => run_notifications(&ctx, notifications.command).await,
        Command::Trends => run_trends(&ctx).await,
        Command::Suggestions { follow } => run_suggestions(&ctx, follow).await,
    }
}

/// Session plus navigator for the command being run.
struct Ctx<'a> {
    session: &'a SessionManager,
    navigator: &'a TerminalNavigator,
}

impl Ctx<'_> {
    /// Authorized call whose failure becomes the screen's fixed notice.
    async fn call<T>(
        &self,
        call: impl Future<Output = Result<T, ApiError>>,
        fallback: &str,
    ) -> Result<T, CliError> {
        self.session
            .authorized(call)
            .await
            .map_err(|e| CliError::from_api(e, fallback, false))
    }
}

async fn run_login(ctx: &Ctx<'_>, form: LoginForm) -> Result<(), CliError> {
    form.validate()?;
    let user = ctx
        .session
        .login(&form.email, &form.password)
        .await
        .map_err(|e| CliError::from_api(e, "Login failed. Please try again.", true))?;
    println!("Login successful! Signed in as {}", user.handle());
    ctx.navigator.navigate(DEFAULT_AUTHENTICATED_ROUTE);
    Ok(())
}

async fn run_register(ctx: &Ctx<'_>, form: RegisterForm) -> Result<(), CliError> {
    form.validate()?;
    ctx.session
        .register(&form.name, &form.username, &form.email, &form.password)
        .await
        .map_err(|e| CliError::from_api(e, "Registration failed. Please try again.", true))?;
    println!("Registration successful! Please sign in.");
    ctx.navigator.navigate(ENTRY_ROUTE);
    Ok(())
}

async fn run_explore(ctx: &Ctx<'_>, query: Option<String>) -> Result<(), CliError> {
    let api = ctx.session.api();
    let tweets = match query.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        Some(q) => ctx.call(api.search(q), "Search failed. Please try again.").await?,
        None => {
            ctx.call(api.explore(), "Failed to load tweets. Please try again later.")
                .await?
        }
    };
    println!("{}", views::tweet_list(&tweets, "No chirps found"));
    Ok(())
}

async fn run_tweet(ctx: &Ctx<'_>, command: TweetSubcommand) -> Result<(), CliError> {
    let api = ctx.session.api();
    match command {
        TweetSubcommand::Post { content } => {
            forms::validate_tweet(&content)?;
            let posted = ctx
                .call(api.create_tweet(&content, None), "Failed to post your chirp. Please try again.")
                .await?;
            println!("Chirp posted!\n{}", views::tweet(&posted));
        }
        TweetSubcommand::Reply { id, content } => {
            forms::validate_tweet(&content)?;
            let posted = ctx
                .call(api.create_tweet(&content, Some(&id)), "Failed to post your chirp. Please try again.")
                .await?;
            println!("Reply posted!\n{}", views::tweet(&posted));
        }
        TweetSubcommand::Show { id } => {
            let tweet = ctx
                .call(api.tweet(&id), "Failed to load tweet. Please try again later.")
                .await?;
            let replies = ctx
                .call(api.tweet_replies(&id), "Failed to load tweet. Please try again later.")
                .await?;
            println!("{}\n\nReplies\n\n{}", views::tweet(&tweet), views::tweet_list(&replies, "No replies yet"));
        }
        TweetSubcommand::Like { id } => set_tweet_flag(ctx, &id, TweetFlag::Like, true).await?,
        TweetSubcommand::Unlike { id } => set_tweet_flag(ctx, &id, TweetFlag::Like, false).await?,
        TweetSubcommand::Retweet { id } => set_tweet_flag(ctx, &id, TweetFlag::Retweet, true).await?,
        TweetSubcommand::Unretweet { id } => set_tweet_flag(ctx, &id, TweetFlag::Retweet, false).await?,
    }
    Ok(())
}

#[derive(Debug, Clone, Copy)]
enum TweetFlag {
    Like,
    Retweet,
}

/// Bring a like/retweet flag to `wanted`, toggling only when it differs.
async fn set_tweet_flag(ctx: &Ctx<'_>, id: &str, flag: TweetFlag, wanted: bool) -> Result<(), CliError> {
    let tweet: Tweet = ctx
        .call(ctx.session.api().tweet(id), "Failed to load tweet. Please try again later.")
        .await?;
    let mut card = TweetCard::new(tweet);
    let current = match flag {
        TweetFlag::Like => card.tweet.is_liked,
        TweetFlag::Retweet => card.tweet.is_retweeted,
    };
    if current != wanted {
        let result = match flag {
            TweetFlag::Like => card.toggle_like(ctx.session).await,
            TweetFlag::Retweet => card.toggle_retweet(ctx.session).await,
        };
        result.map_err(|e| CliError::from_api(e, "Failed to process your action", false))?;
    }
    println!("{}", views::tweet(&card.tweet));
    Ok(())
}

async fn run_profile(ctx: &Ctx<'_>, command: ProfileSubcommand) -> Result<(), CliError> {
    let api = ctx.session.api();
    match command {
        ProfileSubcommand::Show { username } => {
            let card = load_profile(ctx, &username).await?;
            let tweets = ctx
                .call(api.user_tweets(&username), "Failed to load profile. Please try again later.")
                .await?;
            println!("{}\n\n{}", views::profile(&card.profile, card.is_own(ctx.session)), views::tweet_list(&tweets, "No chirps yet"));
        }
        ProfileSubcommand::Edit { name, bio, location, website } => {
            let Some(me) = ctx.session.user() else {
                return Ok(());
            };
            let card = load_profile(ctx, &me.username).await?;
            let mut update = ProfileUpdate::from(&card.profile);
            if let Some(name) = name {
                update.name = name;
            }
            if let Some(bio) = bio {
                update.bio = bio;
            }
            if let Some(location) = location {
                update.location = location;
            }
            if let Some(website) = website {
                update.website = website;
            }
            forms::validate_profile(&update)?;
            let updated = ctx
                .call(api.update_profile(&update), "Failed to update profile. Please try again.")
                .await?;
            tracing::debug!(name = %updated["name"], "profile updated");
            println!("Profile updated successfully");
            ctx.navigator.navigate(Route::Profile { username: me.username });
        }
        ProfileSubcommand::Follow { username } => {
            let mut card = load_profile(ctx, &username).await?;
            if card.is_own(ctx.session) || card.profile.is_following {
                println!("{}", views::profile(&card.profile, card.is_own(ctx.session)));
                return Ok(());
            }
            card.follow(ctx.session)
                .await
                .map_err(|e| CliError::from_api(e, "Failed to follow user. Please try again.", false))?;
            println!("You are now following {}", card.profile.user.name);
        }
        ProfileSubcommand::Unfollow { username } => {
            let mut card = load_profile(ctx, &username).await?;
            if card.is_own(ctx.session) || !card.profile.is_following {
                println!("{}", views::profile(&card.profile, card.is_own(ctx.session)));
                return Ok(());
            }
            card.unfollow(ctx.session)
                .await
                .map_err(|e| CliError::from_api(e, "Failed to unfollow user. Please try again.", false))?;
            println!("You unfollowed {}", card.profile.user.name);
        }
    }
    Ok(())
}

async fn load_profile(ctx: &Ctx<'_>, username: &str) -> Result<ProfileCard, CliError> {
    let profile = ctx
        .call(ctx.session.api().user_profile(username), "Failed to load profile. Please try again later.")
        .await?;
    Ok(ProfileCard::new(profile))
}

async fn run_notifications(ctx: &Ctx<'_>, command: NotificationsSubcommand) -> Result<(), CliError> {
    let items = ctx
        .call(ctx.session.api().notifications(), "Failed to load notifications. Please try again later.")
        .await?;
    let mut list = NotificationList::new(items);
    if let NotificationsSubcommand::Read { id } = command {
        list.mark_read(ctx.session, &id)
            .await
            .map_err(|e| CliError::from_api(e, "Failed to update notification", false))?;
    }

    if list.items.is_empty() {
        println!("No notifications yet");
        return Ok(());
    }
    println!("{} unread", list.unread_count());
    for item in &list.items {
        println!("{}", views::notification(item));
    }
    Ok(())
}

async fn run_trends(ctx: &Ctx<'_>) -> Result<(), CliError> {
    // Sidebar data: a failure is logged, not shown.
    match ctx.session.authorized(ctx.session.api().trends()).await {
        Ok(trends) => {
            for trend in &trends {
                println!("{}", views::trend(trend));
            }
        }
        Err(e) => tracing::warn!(error = %e, "failed to load trends"),
    }
    Ok(())
}

async fn run_suggestions(ctx: &Ctx<'_>, follow: Option<String>) -> Result<(), CliError> {
    let users = match ctx.session.authorized(ctx.session.api().suggested_users()).await {
        Ok(users) => users,
        Err(e) => {
            tracing::warn!(error = %e, "failed to load suggestions");
            Vec::new()
        }
    };
    let mut panel = SuggestionList::new(users);
    if let Some(user_id) = follow {
        panel
            .follow(ctx.session, &user_id)
            .await
            .map_err(|e| CliError::from_api(e, "Failed to follow user", false))?;
        println!("User followed successfully");
    }
    for user in &panel.users {
        println!("[{}] {}", user.id, views::user_line(user));
    }
    Ok(())
}
