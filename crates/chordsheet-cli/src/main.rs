use anyhow::{bail, Context, Result};
use chordsheet::{Overrides, Pagination, Settings, Typesetter};
use clap::Parser;
use std::fs::{self, File};
use std::io::{self, BufWriter, IsTerminal, Read, Write};
use std::path::PathBuf;

use crate::postscript::PostScriptRenderer;
mod postscript;
mod rc;

const ABOUT: &str = "\
chordsheet: a lyrics and chords formatting program.

chordsheet reads text files holding the lyrics of one or many songs plus
chord information, and produces a print-ready PostScript song sheet with
chords set above the lyrics and chord diagrams at the end of every song.

Run \"chordsheet -h\" for the list of options.
";

#[derive(Parser)]
#[command(
    name = "chordsheet",
    version,
    about = "Lyrics and chords formatter",
    override_usage = "chordsheet [options] file [file ...]"
)]
struct Cli {
    /// About chordsheet
    #[arg(short = 'A')]
    about: bool,
    /// Single space lines without chords
    #[arg(short = 'a')]
    auto_space: bool,
    /// Set chord size [9]
    #[arg(short = 'c', value_name = "N")]
    chord_size: Option<i32>,
    /// Set chord font
    #[arg(short = 'C', value_name = "FONT")]
    chord_font: Option<String>,
    /// Dump chord definitions (text)
    #[arg(short = 'd')]
    dump_text: bool,
    /// Dump chord definitions (PostScript)
    #[arg(short = 'D')]
    dump_grids: bool,
    /// Disable extensions
    #[arg(short = 'e', conflicts_with = "enable_extensions")]
    disable_extensions: bool,
    /// Enable extensions
    #[arg(short = 'E')]
    enable_extensions: bool,
    /// Don't print grids for builtin "easy" chords
    #[arg(short = 'g')]
    no_easy_grids: bool,
    /// Disable printing of chord grids
    #[arg(short = 'G')]
    no_grids: bool,
    /// Generate a table of contents
    #[arg(short = 'i')]
    toc: bool,
    /// Turn off auto-adjust of chord definitions
    #[arg(short = 'J')]
    no_auto_adjust: bool,
    /// Even page numbers on the left
    #[arg(short = 'L')]
    even_left: bool,
    /// Only print lyrics
    #[arg(short = 'l')]
    lyrics_only: bool,
    /// Number logical pages, not physical
    #[arg(short = 'n')]
    number_logical: bool,
    /// Save the output to a file
    #[arg(short = 'o', value_name = "FILE")]
    output: Option<PathBuf>,
    /// Paper type (a4, letter, mletter)
    #[arg(short = 'P', value_name = "FORM")]
    paper: Option<String>,
    /// Starting page number [1]
    #[arg(short = 'p', value_name = "N")]
    first_page: Option<u32>,
    /// Set chord grid size [30]
    #[arg(short = 's', value_name = "N")]
    grid_size: Option<u32>,
    /// Set text size [12]
    #[arg(short = 't', value_name = "N")]
    text_size: Option<i32>,
    /// Set text font
    #[arg(short = 'T', value_name = "FONT")]
    text_font: Option<String>,
    /// Set warning verbosity level
    #[arg(short = 'W', value_name = "N", default_value_t = 0)]
    warning_level: u32,
    /// Transpose by N half-tones
    #[arg(short = 'x', value_name = "N", allow_hyphen_values = true)]
    transpose: Option<i32>,
    /// 2 pages per sheet
    #[arg(short = '2', conflicts_with = "four_up")]
    two_up: bool,
    /// 4 pages per sheet
    #[arg(short = '4')]
    four_up: bool,
    /// Song files; standard input when none are given
    files: Vec<PathBuf>,
}

/// Reject zero, which the numeric options never accept.
fn nonzero<T: Default + PartialEq>(value: Option<T>, what: &str) -> Result<Option<T>> {
    match value {
        Some(v) if v == T::default() => bail!("invalid value for {what}"),
        other => Ok(other),
    }
}

impl Cli {
    fn settings(&self) -> Result<Settings> {
        let pagination = if self.four_up {
            Pagination::Four
        } else if self.two_up {
            Pagination::Two
        } else {
            Pagination::One
        };
        let mut settings = Settings {
            pagination,
            transpose: nonzero(self.transpose, "transposition")?.unwrap_or(0),
            lyrics_only: self.lyrics_only,
            auto_space: self.auto_space,
            no_grids: self.no_grids,
            no_easy_grids: self.no_easy_grids,
            auto_adjust: !self.no_auto_adjust,
            table_of_contents: self.toc,
            number_logical: self.number_logical,
            first_page: nonzero(self.first_page, "initial page number")?,
            even_pages_left: self.even_left,
            warning_level: self.warning_level,
            ..Settings::default()
        };
        if let Some(size) = nonzero(self.grid_size, "grid_size")? {
            settings.grid_size = size as f64;
        }
        Ok(settings)
    }

    fn overrides(&self) -> Result<Overrides> {
        let extensions = match (self.enable_extensions, self.disable_extensions) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        };
        Ok(Overrides {
            text_font: self.text_font.clone(),
            text_size: nonzero(self.text_size, "text_size")?,
            chord_font: self.chord_font.clone(),
            chord_size: nonzero(self.chord_size, "chord_size")?,
            extensions,
            paper: self.paper.clone(),
        })
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // help and version go to stdout and are not failures
            let code = if err.use_stderr() { 1 } else { 0 };
            let _ = err.print();
            std::process::exit(code);
        }
    };
    if cli.about {
        print!("{ABOUT}");
        return Ok(());
    }

    let settings = cli.settings()?;
    let overrides = cli.overrides()?;
    let dump = cli.dump_text || cli.dump_grids;

    if cli.files.is_empty() && !dump && io::stdin().is_terminal() {
        bail!(
            "chordsheet does not expect you to type the song on your keyboard; \
             give a file name or redirect the input (chordsheet < song.cho > song.ps)"
        );
    }

    let out: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(
            File::create(path)
                .with_context(|| format!("unable to open \"{}\" for output", path.display()))?,
        ),
        None => {
            if io::stdout().is_terminal() && !cli.dump_text {
                bail!(
                    "chordsheet will not send PostScript to your terminal; \
                     redirect (>) or pipe (|) the output"
                );
            }
            Box::new(io::stdout().lock())
        }
    };

    let mut ts = Typesetter::new(settings, PostScriptRenderer::new(BufWriter::new(out)));
    rc::read_all(&mut ts)?;
    ts.apply_overrides(&overrides)?;

    if cli.dump_text {
        let text = ts.state().chords.dump_text();
        let mut out = ts.into_renderer().into_inner();
        out.write_all(text.as_bytes())?;
        out.flush()?;
        return Ok(());
    }

    let renderer = if cli.dump_grids {
        ts.dump_grids()?
    } else {
        if cli.files.is_empty() {
            let mut bytes = Vec::new();
            io::stdin()
                .read_to_end(&mut bytes)
                .context("reading standard input")?;
            ts.process_song("<stdin>", &String::from_utf8_lossy(&bytes))?;
        }
        for path in &cli.files {
            let bytes =
                fs::read(path).with_context(|| format!("cannot open {}", path.display()))?;
            ts.process_song(&path.display().to_string(), &String::from_utf8_lossy(&bytes))?;
        }
        ts.finish()?
    };
    renderer.into_inner().flush()?;
    Ok(())
}
