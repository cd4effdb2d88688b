use anyhow::Context;
use clap::Parser as ClapParser;
use std::io::{self, Write};
use std::path::PathBuf;
use techgen::{convert, ConvertConfig, LibraryDesc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
    let args = Args::parse();

    eprintln!("input file: {:?}", &args.library);
    if let Some(ref config) = args.config {
        eprintln!("config: {:?}", config);
    }
    match args.out {
        Some(ref out) => eprintln!("output: {:?}", out),
        None => eprintln!("output: stdout"),
    }
    lib2tech(args)?;
    eprintln!("Technology writing complete.");

    Ok(())
}

/// Arguments to [`lib2tech`].
#[derive(ClapParser)]
#[command(
    version,
    about,
    long_about = "Generate a technology description from a library of hand-drawn example cells"
)]
pub struct Args {
    /// The path to the input library, in TOML.
    library: PathBuf,
    /// A TOML file of conversion settings.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Tolerance for comparing coordinates across examples.
    ///
    /// Overrides the value in the configuration file.
    #[arg(short, long)]
    epsilon: Option<f64>,
    /// The path where the technology should be saved.
    ///
    /// The file and its parent directories will be created if necessary.
    /// If the file already exists, it will be overwritten.
    ///
    /// If unspecified, the output will be written to stdout.
    #[arg(short, long)]
    out: Option<PathBuf>,
}

/// Converts the library named by `args` and writes the resulting technology.
pub fn lib2tech(args: Args) -> anyhow::Result<()> {
    let mut config = match args.config {
        Some(ref path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {:?}.", path))?;
            ConvertConfig::from_toml_str(&text)
                .with_context(|| format!("Failed to parse config file {:?}.", path))?
        }
        None => ConvertConfig::default(),
    };
    if let Some(epsilon) = args.epsilon {
        config = config.with_epsilon(epsilon);
    }

    let text = std::fs::read_to_string(&args.library)
        .with_context(|| format!("Failed to read library {:?}.", args.library))?;
    let lib: LibraryDesc = toml::from_str(&text)
        .with_context(|| format!("Failed to parse library {:?}.", args.library))?;

    let conversion = convert(&lib, config);
    eprint!("{}", conversion.issues);

    let rendered = conversion
        .technology
        .to_toml_string()
        .with_context(|| "Failed to serialize technology.")?;
    if let Some(path) = args.out {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}.", parent))?;
        }
        std::fs::write(&path, rendered)
            .with_context(|| format!("Failed to export technology to {:?}.", path))?;
    } else {
        io::stdout()
            .lock()
            .write_all(rendered.as_bytes())
            .with_context(|| "Failed to export technology to stdout.")?;
    }

    if conversion.has_error() {
        anyhow::bail!(
            "{} cell(s) failed to convert; their primitives were left out.",
            conversion.issues.num_errors()
        )
    }
    Ok(())
}
