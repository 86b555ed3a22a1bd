use clap::{Parser, Subcommand};
use rigid::{build, config, output};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rigid")]
#[command(about = "Static site generator with directory-cascading templates")]
#[command(long_about = "\
Static site generator with directory-cascading templates

Pages are markdown or HTML files. Templates placed in directories wrap every
page beneath them:

  site/
  ├── rigid.toml                 # Optional config (never copied)
  ├── _final.template            # Outer frame for the whole site
  ├── index.html.md              # → index.html
  ├── about.md                   # → about/index.html
  ├── css/site.css               # Copied as-is
  └── blog/
      ├── _partial.template      # Wraps every page under blog/
      ├── _current.template      # Only pages directly in blog/
      └── first-post.md          # → blog/first-post/index.html

Templates run nearest first: _current, then each _partial walking up, until a
_final template or the source root. A page can name its own template with
`template: path` in its front matter.

Run 'rigid gen-config' to generate a documented rigid.toml.")]
#[command(version)]
struct Cli {
    /// Source directory
    #[arg(long, default_value = ".", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "./_output", global = true)]
    target: PathBuf,

    /// Log each step of the build
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render all pages and publish the site to the target directory
    Build,
    /// Resolve every page's templates without rendering
    Check,
    /// Print a stock rigid.toml with all options documented
    GenConfig,
    /// Create a new site skeleton (not implemented)
    Init,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "rigid=debug" } else { "rigid=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Build => {
            println!("==> Building {}", cli.source.display());
            let report = build::build(&cli.source, &cli.target)?;
            output::print_build_output(&report);
        }
        Command::Check => {
            println!("==> Checking {}", cli.source.display());
            let report = build::check(&cli.source, &cli.target)?;
            output::print_check_output(&report);
            println!("==> Templates resolve");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::Init => {
            return Err("init is not implemented yet".into());
        }
    }

    Ok(())
}
