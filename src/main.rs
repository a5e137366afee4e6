use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use street_jewls::config::{self, BuildConfig};
use street_jewls::imaging::{OptimizeSettings, RustBackend};
use street_jewls::{optimize, output, site};

#[derive(Parser)]
#[command(name = "street-jewls")]
#[command(about = "Static site builder for the Street Jewls site")]
#[command(long_about = "\
Static site builder for the Street Jewls site

Pages are written as if served from the site root. The build copies assets,
expands slideshow tokens, rewrites root-absolute links to relative ones and
optionally generates category pages from a product catalog.

Source structure:

  ./
  ├── config.toml                    # Build config (optional)
  ├── assets/                        # Copied verbatim → dist/assets/
  │   └── images/slideshows/
  │       └── hero/                  # {{SLIDESHOW:hero}}
  │           ├── 01-ring.jpg        # Slides, in natural order
  │           ├── 01-ring.webp       # WebP companion (optional)
  │           └── 01-ring-hd.jpg     # HD companion (optional)
  ├── pages/
  │   ├── index.html                 # Entry page → dist/index.html
  │   └── about.html                 # → dist/pages/about.html
  ├── data/catalog.json              # Product catalog (optional)
  └── templates/category.html        # Category template (optional)
                                     # → dist/pages/parts/<id>.html

Run 'street-jewls optimize' to create the WebP and HD companions.
Run 'street-jewls gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Site source directory
    #[arg(long, default_value = ".", global = true)]
    source: PathBuf,

    /// Output directory (wiped on every build)
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Copy assets, emit pages and category pages
    Build,
    /// Validate the source tree without writing anything
    Check,
    /// Create optimized, WebP and HD variants of slideshow images
    Optimize,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Build => {
            let config = BuildConfig::load(&cli.source, &cli.output)?;
            println!(
                "==> Building {} \u{2192} {}",
                config.source.display(),
                config.output.display()
            );
            let summary = site::build(&config)?;
            output::print_build_output(&summary);
        }
        Command::Check => {
            let config = BuildConfig::load(&cli.source, &cli.output)?;
            println!("==> Checking {}", config.source.display());
            let summary = site::check(&config)?;
            output::print_check_output(&summary);
            println!("==> Source is valid");
        }
        Command::Optimize => {
            let site_config = config::load_config(&cli.source)?;
            let root = cli.source.join(&site_config.paths.slideshows);
            let settings = OptimizeSettings::from(&site_config.images);
            println!("==> Optimizing {}", root.display());
            println!(
                "    Max dimensions: {}x{}, JPEG {}%, HD JPEG {}%, WebP lossless",
                settings.max_width,
                settings.max_height,
                settings.jpeg_quality.value(),
                settings.hd_jpeg_quality.value()
            );
            let report = optimize::optimize(
                &root,
                &settings,
                &site_config.processing,
                &RustBackend::new(),
            )?;
            output::print_optimize_output(&report, Path::new(&site_config.paths.slideshows));
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
