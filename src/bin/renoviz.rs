//! CLI for Renoviz - AI room renovation renders.

use clap::{Args, Parser, Subcommand, ValueEnum};
use renoviz::{ImageEditor, RenovizConfig, RoomType, DOWNLOAD_FILE_NAME};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "renoviz")]
#[command(about = "Redesign a room photo in a chosen interior style via Gemini")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON config file
    #[arg(long, global = true, env = "RENOVIZ_CONFIG")]
    config: Option<PathBuf>,

    /// JSON style catalog replacing the built-in styles
    #[arg(long, global = true)]
    styles: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a renovation of a room photo
    Render(RenderArgs),

    /// List available design styles
    Styles,

    /// List room types
    Rooms,

    /// Check that the API key and model are usable
    Check(ServiceArgs),
}

#[derive(Args)]
struct RenderArgs {
    /// Photo of the room (max 5 MB)
    input: PathBuf,

    /// Style id or name (see `renoviz styles`)
    #[arg(short, long)]
    style: Option<String>,

    /// Room type
    #[arg(short, long, value_enum, default_value = "living-room")]
    room: RoomArg,

    /// Output file path (defaults to ./renovated-design.png)
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    service: ServiceArgs,
}

#[derive(Args)]
struct ServiceArgs {
    /// Gemini model (gemini-2.5-flash-image, gemini-3-pro-image-preview)
    #[arg(short, long)]
    model: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RoomArg {
    LivingRoom,
    Bedroom,
    Bathroom,
    Kitchen,
    Exterior,
}

impl From<RoomArg> for RoomType {
    fn from(arg: RoomArg) -> Self {
        match arg {
            RoomArg::LivingRoom => RoomType::LivingRoom,
            RoomArg::Bedroom => RoomType::Bedroom,
            RoomArg::Bathroom => RoomType::Bathroom,
            RoomArg::Kitchen => RoomType::Kitchen,
            RoomArg::Exterior => RoomType::BuildingExterior,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = RenovizConfig::load(cli.config.as_deref())?;
    if let Some(ref styles) = cli.styles {
        config.styles_path = Some(styles.clone());
    }

    match cli.command {
        Commands::Render(args) => {
            render(args, config, cli.json).await?;
        }
        Commands::Styles => {
            list_styles(&config, cli.json)?;
        }
        Commands::Rooms => {
            list_rooms(cli.json)?;
        }
        Commands::Check(args) => {
            check(args, config, cli.json).await?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn apply_service_args(config: &mut RenovizConfig, args: &ServiceArgs) -> anyhow::Result<()> {
    if let Some(ref model) = args.model {
        config.model = Some(model.clone());
    }
    if let Some(secs) = args.timeout {
        config.timeout_secs = secs;
    }
    config.validate()?;
    Ok(())
}

async fn render(args: RenderArgs, mut config: RenovizConfig, json_output: bool) -> anyhow::Result<()> {
    apply_service_args(&mut config, &args.service)?;

    let catalog = config.catalog()?;
    let style = match args.style.as_deref() {
        Some(key) => match catalog.get(key) {
            Some(style) => Some(style.clone()),
            None => anyhow::bail!("unknown style '{key}' (run `renoviz styles` for the list)"),
        },
        None => None,
    };

    let renovator = config.renovator()?;
    let mut session = config.session();

    let outcome = async {
        session.accept_file(&args.input).await?;
        session.select_room(args.room.into());
        if let Some(style) = style {
            session.select_style(style);
        }
        session.generate(&renovator).await
    }
    .await;

    if let Err(err) = outcome {
        let message = session.error().map(str::to_string).unwrap_or_else(|| err.user_message());
        if json_output {
            let result = serde_json::json!({
                "success": false,
                "error": message,
                "validation": err.is_validation(),
            });
            println!("{}", serde_json::to_string_pretty(&result)?);
            std::process::exit(1);
        }
        anyhow::bail!(message);
    }

    let view = session.view();
    let Some(download) = view.download() else {
        anyhow::bail!("no renovation was produced");
    };
    let output = args
        .output
        .unwrap_or_else(|| Path::new(".").join(DOWNLOAD_FILE_NAME));
    download.save_as(&output)?;

    let generated = session.generated().map(|g| (g.size(), g.mime_type().to_string()));
    let (size, mime_type) = generated.unwrap_or_default();

    if json_output {
        let result = serde_json::json!({
            "success": true,
            "output": output.display().to_string(),
            "size_bytes": size,
            "mime_type": mime_type,
            "room": session.room().to_string(),
            "style": session.style().map(|s| s.id.clone()),
            "provider": renovator.editor().kind().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!(
            "Renovated {} as {} ({}): {} ({} bytes, {})",
            args.input.display(),
            session.room(),
            session.style().map(|s| s.name.as_str()).unwrap_or("-"),
            output.display(),
            size,
            mime_type
        );
    }

    Ok(())
}

async fn check(args: ServiceArgs, mut config: RenovizConfig, json_output: bool) -> anyhow::Result<()> {
    apply_service_args(&mut config, &args)?;
    let renovator = config.renovator()?;
    let editor = renovator.editor();
    let result = editor.health_check().await;

    if json_output {
        let value = serde_json::json!({
            "provider": editor.kind().to_string(),
            "ok": result.is_ok(),
            "error": result.as_ref().err().map(|e| e.user_message()),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else if result.is_ok() {
        println!("✓ {} is reachable", editor.name());
    }

    result?;
    Ok(())
}

fn list_styles(config: &RenovizConfig, json_output: bool) -> anyhow::Result<()> {
    let catalog = config.catalog()?;

    if json_output {
        let styles: Vec<_> = catalog.iter().collect();
        println!("{}", serde_json::to_string_pretty(&styles)?);
    } else {
        println!("{} styles:\n", catalog.len());
        for style in catalog.iter() {
            println!("  {:<14} {}", style.id, style.name);
            println!("  {:<14} {}", "", style.prompt_description);
        }
    }

    Ok(())
}

fn list_rooms(json_output: bool) -> anyhow::Result<()> {
    if json_output {
        println!("{}", serde_json::to_string_pretty(&RoomType::ALL)?);
    } else {
        println!("Room types:\n");
        for (room, arg) in RoomType::ALL.iter().zip(RoomArg::value_variants()) {
            let flag = arg
                .to_possible_value()
                .map(|v| v.get_name().to_string())
                .unwrap_or_default();
            println!("  {:<12} {}", flag, room);
        }
    }

    Ok(())
}
