//! iccp - ICC profile tool for PNG files
//!
//! Extracts, embeds and inspects the profile in a PNG's iCCP chunk, and
//! creates greyscale input profiles.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Cursor, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use iccp_core::{CurveSpec, Profile, ProfileContainer, TagSignature, blackshift};
use serde_json::{Map, Value, json};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod png_file;

use png_file::PngFile;

#[derive(Parser)]
#[command(name = "iccp")]
#[command(author, version, about = "ICC profile tool for PNG files")]
#[command(long_about = "
Extract, embed and inspect the ICC profile of a PNG file (its iCCP
chunk), or create a greyscale input profile.

Examples:
  iccp image.png -o image.icc                 # Extract the profile
  iccp -m add -a grey.icc image.png -o out.png
  iccp -m view image.png                      # Dump header and tags
  iccp -m view --json image.png
  iccp -m mkgrey --black 0.05 -o grey.icc
")]
struct Cli {
    /// What to do with the input
    #[arg(short, long, value_enum, default_value_t = Mode::Export)]
    mode: Mode,

    /// Output file ('-' or 'stdout' for standard output)
    #[arg(short, long, default_value = "-")]
    output: String,

    /// Profile to embed (add mode)
    #[arg(short, long)]
    add: Option<PathBuf>,

    /// Input PNG (standard input if omitted)
    input: Option<PathBuf>,

    /// Black point for the generated tone curve (mkgrey mode)
    #[arg(long, default_value_t = 0.07)]
    black: f64,

    /// Machine-readable output (view mode)
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Write the embedded profile as-is
    Export,
    /// Embed a profile and write the resulting PNG
    Add,
    /// Print the decoded header and tags
    View,
    /// Write a new greyscale input profile
    Mkgrey,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut out = open_output(&cli.output)?;
    match cli.mode {
        Mode::Export => export(&cli, &mut out)?,
        Mode::Add => add(&cli, &mut out)?,
        Mode::View => view(&cli, &mut out)?,
        Mode::Mkgrey => mkgrey(&cli, &mut out)?,
    }
    out.flush().context("Failed to flush output")?;
    Ok(())
}

fn open_output(path: &str) -> Result<Box<dyn Write>> {
    if path == "-" || path == "stdout" {
        return Ok(Box::new(BufWriter::new(io::stdout().lock())));
    }
    let file = File::create(path).with_context(|| format!("Failed to create {}", path))?;
    Ok(Box::new(BufWriter::new(file)))
}

fn read_png(cli: &Cli) -> Result<PngFile> {
    match &cli.input {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
            PngFile::read(BufReader::new(file))
                .with_context(|| format!("Failed to read {}", path.display()))
        }
        None => {
            let mut data = Vec::new();
            io::stdin()
                .read_to_end(&mut data)
                .context("Failed to read standard input")?;
            PngFile::read(Cursor::new(data)).context("Failed to read PNG from standard input")
        }
    }
}

fn input_name(cli: &Cli) -> String {
    cli.input
        .as_ref()
        .map_or_else(|| "<stdin>".to_string(), |p| p.display().to_string())
}

fn export(cli: &Cli, out: &mut dyn Write) -> Result<()> {
    let png = read_png(cli)?;
    let Some(profile) = png.extract_profile_bytes() else {
        bail!("{} has no iCCP chunk", input_name(cli));
    };
    info!("Exporting {} byte profile", profile.len());
    out.write_all(profile)?;
    Ok(())
}

fn add(cli: &Cli, out: &mut dyn Write) -> Result<()> {
    let Some(add_path) = &cli.add else {
        bail!("add mode needs a profile: -a <file>");
    };
    let profile = std::fs::read(add_path)
        .with_context(|| format!("Failed to read {}", add_path.display()))?;

    let mut png = read_png(cli)?;
    info!("Embedding {} ({} bytes)", add_path.display(), profile.len());
    png.embed_profile_bytes(profile);
    png.write(out)
}

fn view(cli: &Cli, out: &mut dyn Write) -> Result<()> {
    let png = read_png(cli)?;
    let Some(mut profile) = Profile::from_container(&png).context("Failed to decode profile")?
    else {
        bail!("{} has no iCCP chunk", input_name(cli));
    };
    profile.set_name(input_name(cli));
    debug!("{} tags, {} warnings", profile.raw_tags().len(), profile.warnings().len());

    if cli.json {
        serde_json::to_writer_pretty(&mut *out, &profile_json(&profile))?;
        writeln!(out)?;
    } else {
        out.write_all(profile.dump().as_bytes())?;
    }
    Ok(())
}

fn profile_json(profile: &Profile) -> Value {
    let header: Map<String, Value> = profile
        .header
        .fields()
        .into_iter()
        .map(|(key, value)| (key.to_string(), Value::String(value)))
        .collect();
    let tags: Map<String, Value> = profile
        .raw_tags()
        .iter()
        .map(|(sig, element)| {
            let value = match profile.tag(sig) {
                Some(decoded) => json!({ "size": element.len(), "value": decoded.to_string() }),
                None => json!({ "size": element.len() }),
            };
            (sig.to_string(), value)
        })
        .collect();
    let warnings: Vec<String> = profile.warnings().iter().map(ToString::to_string).collect();

    json!({
        "name": profile.name(),
        "header": header,
        "tags": tags,
        "warnings": warnings,
    })
}

fn mkgrey(cli: &Cli, out: &mut dyn Write) -> Result<()> {
    if !(0.0..1.0).contains(&cli.black) {
        bail!("--black must be in [0, 1), got {}", cli.black);
    }
    let mut profile = Profile::new();
    profile.greyscale_input();
    profile.add_tags([(TagSignature::GRAY_TRC, CurveSpec::sampled(blackshift(cli.black)))])?;
    info!("Writing greyscale profile, black point {}", cli.black);
    profile.write(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["iccp"]).unwrap();
        assert_eq!(cli.mode, Mode::Export);
        assert_eq!(cli.output, "-");
        assert_eq!(cli.black, 0.07);
        assert!(cli.input.is_none());
    }

    #[test]
    fn test_cli_add_mode() {
        let cli =
            Cli::try_parse_from(["iccp", "-m", "add", "-a", "p.icc", "-o", "out.png", "in.png"])
                .unwrap();
        assert_eq!(cli.mode, Mode::Add);
        assert_eq!(cli.add, Some(PathBuf::from("p.icc")));
        assert_eq!(cli.input, Some(PathBuf::from("in.png")));
    }

    #[test]
    fn test_cli_rejects_unknown_mode() {
        assert!(Cli::try_parse_from(["iccp", "-m", "explode"]).is_err());
    }

    #[test]
    fn test_mkgrey_output() {
        let cli = Cli::try_parse_from(["iccp", "-m", "mkgrey"]).unwrap();
        let mut out = Vec::new();
        mkgrey(&cli, &mut out).unwrap();

        let declared = u32::from_be_bytes([out[0], out[1], out[2], out[3]]) as usize;
        assert_eq!(declared, out.len());
        let profile = Profile::from_bytes(&out[4..]).unwrap();
        assert!(profile.tag(TagSignature::GRAY_TRC).is_some());
    }

    #[test]
    fn test_profile_json_lists_every_tag() {
        let mut profile = Profile::new();
        profile.greyscale_input();
        profile
            .add_tags([(TagSignature::GRAY_TRC, CurveSpec::Gamma(2.2))])
            .unwrap();

        let value = profile_json(&profile);
        assert_eq!(value["name"], "<unknown>");
        assert_eq!(value["header"]["colourspace"], "GRAY");
        assert_eq!(value["tags"]["kTRC"]["size"], 14);
        assert_eq!(value["tags"]["cprt"]["value"], "Copyright unknown.");
        assert_eq!(value["warnings"], json!([]));
    }
}
