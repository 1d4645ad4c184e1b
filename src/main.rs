use clap::{Parser, Subcommand};
use photoshelf::config::{self, ViewerConfig};
use photoshelf::output;
use photoshelf::types::SortOrder;
use photoshelf::viewer::{PageRequest, Viewer};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Pagination flags shared by the timeline and group commands.
#[derive(clap::Args, Clone)]
struct PageArgs {
    /// Path of the last item of the previous page
    #[arg(long)]
    cursor: Option<String>,
    /// Items per page (clamped to the configured bounds)
    #[arg(long)]
    limit: Option<String>,
    /// asc or desc; anything else is desc
    #[arg(long)]
    order: Option<String>,
}

impl PageArgs {
    fn request(&self) -> PageRequest<'_> {
        PageRequest {
            cursor: self.cursor.as_deref(),
            limit: self.limit.as_deref(),
            order: self.order.as_deref(),
        }
    }
}

#[derive(Parser)]
#[command(name = "photoshelf")]
#[command(about = "Browse a photo library straight from the filesystem")]
#[command(long_about = "\
Browse a photo library straight from the filesystem

Folders are albums, path dates drive chronology. Nothing is imported and
nothing is written next to your photos; rendered thumbnails go to a
separate cache directory.

Dates are read from paths:

  Photos/
  ├── photoshelf.toml              # Optional viewer config
  ├── 2022/
  │   ├── 2022-05-01 Picnic/       # Dated folder → 2022-05-01
  │   │   └── IMG_0001.jpg
  │   └── May 3, 2022/             # Textual date, shown as \"May 3, 2022\"
  │       └── IMG_0002.jpg
  ├── Scans/                       # Undated: sorts after every dated image
  │   └── grandma.png
  └── .Trash-1000/                 # Hidden and ignored folders are skipped

Run 'photoshelf gen-config' to generate a documented photoshelf.toml.")]
#[command(version)]
struct Cli {
    /// Library root directory
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Config file (default: <root>/photoshelf.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print JSON payloads instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List a folder's subfolders and images
    List {
        /// Folder (or image) path relative to the root
        #[arg(default_value = "")]
        path: String,
    },
    /// Find folders whose path contains the query
    Search { query: String },
    /// Page through every image, newest first
    Timeline(PageArgs),
    /// Show the two-level date grouping of the library
    Hierarchy {
        /// asc or desc; anything else is desc
        #[arg(long)]
        order: Option<String>,
    },
    /// Page through the images of one subgroup
    Group {
        /// Subgroup key, as shown by `hierarchy`
        key: String,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Write a JPEG thumbnail of one image
    Thumbnail {
        /// Image path relative to the root
        path: String,
        /// Longest edge in pixels (clamped to the configured bounds)
        #[arg(long)]
        size: Option<String>,
        /// Output file
        #[arg(long)]
        out: PathBuf,
    },
    /// Build the timeline and hierarchy indexes
    Warm,
    /// Print a stock photoshelf.toml with all options documented
    GenConfig,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("photoshelf=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<ViewerConfig, config::ConfigError> {
    match &cli.config {
        Some(path) => config::load_config_file(path),
        None => config::load_config(&cli.root),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging();

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let viewer = Viewer::open(&cli.root, load_config(&cli)?)?;

    match &cli.command {
        Command::List { path } => {
            let listing = viewer.list_directory(path)?;
            if cli.json {
                print_json(&listing)?;
            } else {
                output::print_listing(&listing);
            }
        }
        Command::Search { query } => {
            let results = viewer.search(query);
            if cli.json {
                print_json(&results)?;
            } else {
                output::print_search(query, &results);
            }
        }
        Command::Timeline(page) => {
            let timeline = viewer.timeline(page.request())?;
            if cli.json {
                print_json(&timeline)?;
            } else {
                output::print_timeline(&timeline);
            }
        }
        Command::Hierarchy { order } => {
            let order = SortOrder::parse_lenient(order.as_deref());
            let hierarchy = viewer.hierarchy();
            if cli.json {
                print_json(&hierarchy.view(order))?;
            } else {
                output::print_hierarchy(&hierarchy, order);
            }
        }
        Command::Group { key, page } => {
            let images = viewer.group_images(key, page.request())?;
            if cli.json {
                print_json(&images)?;
            } else {
                output::print_group_page(key, &images);
            }
        }
        Command::Thumbnail { path, size, out } => {
            write_thumbnail(&viewer, path, size.as_deref(), out)?;
            if !cli.json {
                println!("{}", output::format_thumbnail_stats(&viewer.thumbnail_stats()));
            }
        }
        Command::Warm => {
            viewer.warm();
            let images = viewer.sorted_image_paths(SortOrder::Desc).len();
            let groups = viewer.hierarchy().top_groups().len();
            if cli.json {
                print_json(&serde_json::json!({ "images": images, "groups": groups }))?;
            } else {
                println!("Indexed {} images in {} groups", images, groups);
            }
        }
        Command::GenConfig => unreachable!("handled before opening the library"),
    }

    Ok(())
}

fn write_thumbnail(
    viewer: &Viewer,
    path: &str,
    size: Option<&str>,
    out: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let Some(thumb) = viewer.thumbnail(path, size)? else {
        return Err(format!("could not generate a thumbnail for {}", path).into());
    };
    if let Some(parent) = out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(out, &thumb.bytes)?;
    tracing::info!(
        path,
        out = %out.display(),
        bytes = thumb.bytes.len(),
        content_type = thumb.content_type,
        "thumbnail written"
    );
    Ok(())
}
