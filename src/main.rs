//! glimpse - a terminal client for self-hosted photo-sharing networks

use anyhow::Result;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use glimpse::api::{LikesClient, NewPost, PostsClient, UsersClient};
use glimpse::feed::{self, FeedTab, MediaResolver};
use glimpse::likes::{LikeSync, ToggleOutcome};
use glimpse::models::ProfileUpdate;
use glimpse::qr::ShareCard;
use glimpse::session::{self, IdentityClient};
use glimpse::{Config, auth};

fn main() -> Result<()> {
    // Initialize logging (RUST_LOG=debug for verbose output)
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match parse_args()? {
        // The TUI drives its own runtime
        Command::Run => run_tui(),
        Command::Help => {
            print_help();
            Ok(())
        }
        Command::Version => {
            println!("glimpse {}", glimpse::VERSION);
            Ok(())
        }
        command => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(run_command(command))
        }
    }
}

async fn run_command(command: Command) -> Result<()> {
    match command {
        Command::Login => login().await,
        Command::Logout => logout(),
        Command::Whoami => whoami(),
        Command::Feed {
            tab,
            category,
            limit,
        } => feed_cli(tab.as_deref(), category.as_deref(), limit).await,
        Command::Show { post_id } => show_cli(&post_id).await,
        Command::Like { post_id } => like_cli(&post_id).await,
        Command::Upload {
            file,
            title,
            category,
            bio,
        } => upload_cli(&file, &title, &category, &bio).await,
        Command::Profile { name, bio, avatar } => {
            profile_cli(name.as_deref(), bio.as_deref(), avatar.as_deref()).await
        }
        Command::Share => share_cli().await,
        Command::Run | Command::Help | Command::Version => unreachable!(),
    }
}

/// CLI commands
enum Command {
    Run,
    Login,
    Logout,
    Whoami,
    Feed {
        tab: Option<String>,
        category: Option<String>,
        limit: Option<usize>,
    },
    Show {
        post_id: String,
    },
    Like {
        post_id: String,
    },
    Upload {
        file: String,
        title: String,
        category: String,
        bio: String,
    },
    Profile {
        name: Option<String>,
        bio: Option<String>,
        avatar: Option<String>,
    },
    Share,
    Help,
    Version,
}

fn flag_value(args: &[String], names: &[&str]) -> Option<String> {
    args.iter()
        .position(|a| names.contains(&a.as_str()))
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn parse_args() -> Result<Command> {
    let args: Vec<String> = std::env::args().collect();

    if args.len() == 1 {
        return Ok(Command::Run);
    }

    match args[1].as_str() {
        "-h" | "--help" | "help" => Ok(Command::Help),
        "-v" | "--version" | "version" => Ok(Command::Version),

        "login" => Ok(Command::Login),
        "logout" => Ok(Command::Logout),
        "whoami" => Ok(Command::Whoami),
        "share" => Ok(Command::Share),

        "feed" => {
            let tab = args.get(2).filter(|a| !a.starts_with('-')).cloned();
            let category = flag_value(&args, &["--category", "-c"]);
            let limit = flag_value(&args, &["--limit", "-l"]).and_then(|s| s.parse().ok());
            Ok(Command::Feed {
                tab,
                category,
                limit,
            })
        }

        "show" => {
            let post_id = args
                .get(2)
                .ok_or_else(|| anyhow::anyhow!("Missing post id"))?
                .clone();
            Ok(Command::Show { post_id })
        }

        "like" => {
            let post_id = args
                .get(2)
                .ok_or_else(|| anyhow::anyhow!("Missing post id"))?
                .clone();
            Ok(Command::Like { post_id })
        }

        "upload" => {
            let file = args
                .get(2)
                .filter(|a| !a.starts_with('-'))
                .ok_or_else(|| anyhow::anyhow!("Missing media file"))?
                .clone();
            let title = flag_value(&args, &["--title", "-t"])
                .ok_or_else(|| anyhow::anyhow!("Missing --title"))?;
            let category = flag_value(&args, &["--category", "-c"])
                .ok_or_else(|| anyhow::anyhow!("Missing --category"))?;
            let bio = flag_value(&args, &["--bio", "-b"]).unwrap_or_default();
            Ok(Command::Upload {
                file,
                title,
                category,
                bio,
            })
        }

        "profile" => Ok(Command::Profile {
            name: flag_value(&args, &["--name"]),
            bio: flag_value(&args, &["--bio"]),
            avatar: flag_value(&args, &["--avatar"]),
        }),

        other => Err(anyhow::anyhow!(
            "Unknown command: {other}\nRun 'glimpse --help' for usage"
        )),
    }
}

fn print_help() {
    let config_path = Config::default_path()
        .map_or_else(|_| "Unknown".to_string(), |p| p.display().to_string());

    println!(
        r"{}
🔭 glimpse - a terminal client for photo-sharing networks

USAGE:
    glimpse                            Launch TUI
    glimpse [COMMAND]

COMMANDS:
    login                              Sign in via the identity provider
    logout                             Forget the stored session
    whoami                             Print the signed-in viewer id

    feed [tab] [OPTIONS]               Show the feed (tabs: following, explore, nearby)
      Options:
        -c, --category <name>          Filter by category
        -l, --limit <n>                Number of posts
      Examples:
        glimpse feed
        glimpse feed explore --category Food

    show <post-id>                     Show a single post
    like <post-id>                     Toggle your like on a post

    upload <file> [OPTIONS]            Upload a post
      Options:
        -t, --title <title>            Post title (required)
        -c, --category <name>          Category (required)
        -b, --bio <text>               Story text
      Example:
        glimpse upload sunset.jpg --title Sunset --category Travel

    profile [OPTIONS]                  Show your profile; with flags, save it
      Options:
        --name <name>                  Display name
        --bio <text>                   Bio text
        --avatar <url>                 Avatar URL

    share                              Print your profile QR payload

OPTIONS:
    -h, --help                         Show this help message
    -v, --version                      Show version information

KEYBINDINGS (TUI):
    Navigation
      j/↓  k/↑      Move down / up
      Tab           Cycle feed tab
      c             Cycle category
      Enter         Open post

    Actions
      l             Like / unlike
      n             Upload a post
      p             Profile
      r             Refresh
      o             Open media in browser
      q             Quit

CONFIG:
    {}
",
        glimpse::LOGO,
        config_path
    );
}

fn run_tui() -> Result<()> {
    glimpse::app::run()
}

async fn login() -> Result<()> {
    let config = Config::load()?;
    if config.identity.client_id.is_empty() {
        anyhow::bail!(
            "No identity client configured.\nSet [identity] client_id in {}",
            Config::default_path()?.display()
        );
    }

    let identity = IdentityClient::new(&config.identity);

    let auth_url = identity.authorize_url();
    println!("📋 Open this URL in your browser:\n\n  {auth_url}\n");

    // Try to open browser
    let _ = open::that(&auth_url);

    println!("Paste the authorization code here:");
    let mut code = String::new();
    std::io::stdin().read_line(&mut code)?;
    let code = code.trim();

    let tokens = identity.exchange_code(code).await?;
    let refresh_token = tokens.refresh_token.ok_or_else(|| {
        anyhow::anyhow!("The provider returned no refresh token; check the offline_access scope")
    })?;

    let info = identity.userinfo(&tokens.access_token).await?;

    auth::store_grant(&auth::Grant {
        viewer_id: info.sub.clone(),
        refresh_token,
    })?;

    let name = info.name.unwrap_or_else(|| info.sub.clone());
    println!("\n✓ Signed in as {name}");
    println!("✓ Session saved");

    Ok(())
}

fn logout() -> Result<()> {
    if auth::has_grant() {
        auth::clear_grant()?;
        println!("✓ Signed out");
    } else {
        println!("Not signed in.");
    }
    Ok(())
}

fn whoami() -> Result<()> {
    match auth::load_grant()? {
        Some(grant) => println!("{}", grant.viewer_id),
        None => println!("Not signed in. Run: glimpse login"),
    }
    Ok(())
}

async fn feed_cli(tab: Option<&str>, category: Option<&str>, limit: Option<usize>) -> Result<()> {
    let config = Config::load()?;
    let viewer = session::establish(&config.identity).await;

    let tab = match tab {
        Some(name) => {
            FeedTab::from_str(name).ok_or_else(|| anyhow::anyhow!("Unknown tab: {name}"))?
        }
        None => FeedTab::from_str(&config.default_tab).unwrap_or_default(),
    };

    let posts_client = PostsClient::new(&config.posts_url());
    let likes_client = LikesClient::new(&config.likes_url());
    let resolver = MediaResolver::from_config(&config);

    let records = posts_client.list().await?;
    let posts = feed::assemble(records, &resolver);
    let mut visible = feed::filter(&posts, tab, category);
    visible.truncate(limit.unwrap_or(config.post_limit));

    let post_ids: Vec<String> = visible.iter().map(|p| p.id.clone()).collect();
    let mut likes = LikeSync::new();
    likes.load(&likes_client, &post_ids, viewer.as_ref()).await;

    println!(
        "🔭 {} · {}",
        tab.name(),
        category.unwrap_or("All")
    );
    println!("{}", "─".repeat(60));

    for post in &visible {
        let state = likes.state(&post.id);
        let heart = if state.liked { "♥" } else { "♡" };
        println!("\n{} [{}] · @{} · {}", post.title, post.category, post.author_name, post.relative_time());
        if !post.body.is_empty() {
            println!("{}", post.preview(100));
        }
        println!(
            "{} {}  💬 {}  ({})",
            heart, state.count, post.comment_count, post.id
        );
    }

    Ok(())
}

async fn show_cli(post_id: &str) -> Result<()> {
    let config = Config::load()?;
    let viewer = session::establish(&config.identity).await;

    let posts_client = PostsClient::new(&config.posts_url());
    let likes_client = LikesClient::new(&config.likes_url());
    let resolver = MediaResolver::from_config(&config);

    let post = feed::assemble_one(posts_client.get(post_id).await?, &resolver);

    let mut likes = LikeSync::new();
    likes
        .load(&likes_client, &[post.id.clone()], viewer.as_ref())
        .await;
    let state = likes.state(&post.id);

    println!("{} [{}]", post.title, post.category);
    println!("@{} · {}", post.author_name, post.created_at.format("%Y-%m-%d %H:%M"));
    if !post.body.is_empty() {
        println!("\n{}", post.body);
    }
    if let Some(media) = &post.media_url {
        println!("\nmedia: {media}");
    }
    println!(
        "\n{} {}  💬 {}",
        if state.liked { "♥" } else { "♡" },
        state.count,
        post.comment_count
    );

    Ok(())
}

async fn like_cli(post_id: &str) -> Result<()> {
    let config = Config::load()?;
    let viewer = session::establish(&config.identity)
        .await
        .ok_or_else(|| anyhow::anyhow!("Not signed in. Run: glimpse login"))?;

    let likes_client = LikesClient::new(&config.likes_url());

    let mut likes = LikeSync::new();
    likes
        .load(&likes_client, &[post_id.to_string()], Some(&viewer))
        .await;

    match likes.toggle(&likes_client, &viewer, post_id).await? {
        ToggleOutcome::Committed(state) => {
            if state.liked {
                println!("♥ Liked ({} likes)", state.count);
            } else {
                println!("♡ Unliked ({} likes)", state.count);
            }
        }
        ToggleOutcome::RolledBack => {
            println!("❌ Like update failed; nothing changed");
        }
    }

    Ok(())
}

async fn upload_cli(file: &str, title: &str, category: &str, bio: &str) -> Result<()> {
    let config = Config::load()?;
    let viewer = session::establish(&config.identity)
        .await
        .ok_or_else(|| anyhow::anyhow!("Not signed in. Run: glimpse login"))?;

    let posts_client = PostsClient::new(&config.posts_url());
    let resolver = MediaResolver::from_config(&config);

    let draft = NewPost {
        title: title.to_string(),
        category: category.to_string(),
        bio: bio.to_string(),
        media: file.into(),
    };

    println!("📤 Uploading {file}...");
    let post = feed::assemble_one(posts_client.create(&draft, &viewer).await?, &resolver);
    println!("✓ Posted: {} ({})", post.title, post.id);

    Ok(())
}

async fn profile_cli(name: Option<&str>, bio: Option<&str>, avatar: Option<&str>) -> Result<()> {
    let config = Config::load()?;
    let viewer = session::establish(&config.identity)
        .await
        .ok_or_else(|| anyhow::anyhow!("Not signed in. Run: glimpse login"))?;

    let users_client = UsersClient::new(&config.users_url());
    let resolver = MediaResolver::from_config(&config);

    let current = users_client.fetch(&viewer.viewer_id, &viewer).await?;

    // With no flags this is a read; with any flag it is a whole-record save
    let record = if name.is_none() && bio.is_none() && avatar.is_none() {
        current
    } else {
        let update = ProfileUpdate {
            subject: viewer.viewer_id.clone(),
            name: name.map_or(current.name, String::from),
            bio: bio.map_or(current.bio, String::from),
            avatar_url: avatar.map(String::from).or(current.profile_picture),
        };
        let saved = users_client
            .update(&viewer.viewer_id, &update, &viewer)
            .await?;
        println!("✓ Profile updated\n");
        saved
    };

    let name = if record.name.is_empty() {
        "(no name)"
    } else {
        record.name.as_str()
    };
    println!("{name}");
    println!("ID: {}", viewer.viewer_id);
    if !record.bio.is_empty() {
        println!("\n{}", record.bio);
    }
    if let Some(avatar) = record.profile_picture.as_deref().and_then(|p| resolver.resolve(p)) {
        println!("\navatar: {avatar}");
    }

    Ok(())
}

async fn share_cli() -> Result<()> {
    let config = Config::load()?;
    let viewer = session::establish(&config.identity)
        .await
        .ok_or_else(|| anyhow::anyhow!("Not signed in. Run: glimpse login"))?;

    let users_client = UsersClient::new(&config.users_url());
    let record = users_client.fetch(&viewer.viewer_id, &viewer).await?;

    let card = ShareCard::new(&viewer.viewer_id, &record.name, &config.backend_url);
    println!("{}", card.payload()?);

    Ok(())
}
